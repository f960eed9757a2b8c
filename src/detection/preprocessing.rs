use image::{DynamicImage, GrayImage, Luma};
use imageproc::integral_image::integral_image;

use crate::config::ThresholdConfig;
use crate::error::{PanelError, Result};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Convert a page to an inverted binary mask: dark strokes become foreground.
pub fn binarize(img: &DynamicImage, config: &ThresholdConfig) -> Result<GrayImage> {
    ensure_not_empty(img.width(), img.height())?;
    adaptive_threshold(&to_grayscale(img), config)
}

/// Local adaptive mean threshold with inverted output.
///
/// A pixel is foreground when it is at or below the rounded mean of its
/// `block_size` window minus `bias`. Near the image edge the window is filled
/// by repeating the nearest edge pixel, so every mean covers `block_size²` cells.
pub fn adaptive_threshold(gray: &GrayImage, config: &ThresholdConfig) -> Result<GrayImage> {
    config.validate()?;
    let (width, height) = gray.dimensions();
    ensure_not_empty(width, height)?;

    let radius = config.block_size / 2;
    let padded = replicate_border(gray, radius);

    // Entry (x, y) sums padded[0..x, 0..y]
    let integral = integral_image::<_, u64>(&padded);
    let sum_at = |x: u32, y: u32| integral.get_pixel(x, y)[0];
    let block = config.block_size;
    let count = block as u64 * block as u64;

    let mask = GrayImage::from_fn(width, height, |x, y| {
        // Pixel (x, y) sits at (x + radius, y + radius) in the padded image
        let (x1, y1) = (x + block, y + block);
        let sum = sum_at(x1, y1) + sum_at(x, y) - sum_at(x, y1) - sum_at(x1, y);
        let mean = (sum + count / 2) / count;

        let value = gray.get_pixel(x, y)[0] as i64;
        if value <= mean as i64 - config.bias as i64 {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });

    Ok(mask)
}

/// Pad `gray` by `radius` on every side, copying the nearest edge pixel outward.
fn replicate_border(gray: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width + 2 * radius, height + 2 * radius, |px, py| {
        let x = px.saturating_sub(radius).min(width - 1);
        let y = py.saturating_sub(radius).min(height - 1);
        *gray.get_pixel(x, y)
    })
}

fn ensure_not_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PanelError::InvalidImage(format!(
            "image has zero dimension ({width}x{height})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn uniform_image_is_all_background() {
        let gray = GrayImage::from_pixel(40, 30, Luma([200]));
        let mask = adaptive_threshold(&gray, &ThresholdConfig::default()).unwrap();
        assert!(mask.pixels().all(|p| p[0] == BACKGROUND));
    }

    #[test]
    fn dark_line_on_white_is_foreground() {
        let mut gray = GrayImage::from_pixel(40, 40, Luma([255]));
        for x in 5..35 {
            gray.put_pixel(x, 20, Luma([0]));
        }
        let mask = adaptive_threshold(&gray, &ThresholdConfig::default()).unwrap();

        for x in 5..35 {
            assert_eq!(mask.get_pixel(x, 20)[0], FOREGROUND, "x={x}");
        }
        assert_eq!(mask.get_pixel(20, 10)[0], BACKGROUND);
        assert_eq!(mask.get_pixel(2, 20)[0], BACKGROUND);
    }

    #[test]
    fn bias_suppresses_faint_variation() {
        let mut gray = GrayImage::from_pixel(21, 21, Luma([100]));
        gray.put_pixel(10, 10, Luma([99]));

        let mask = adaptive_threshold(&gray, &ThresholdConfig::default()).unwrap();
        assert_eq!(mask.get_pixel(10, 10)[0], BACKGROUND);

        let no_bias = ThresholdConfig {
            block_size: 11,
            bias: 0,
        };
        let mask = adaptive_threshold(&gray, &no_bias).unwrap();
        assert_eq!(mask.get_pixel(10, 10)[0], FOREGROUND);
    }

    #[test]
    fn edge_window_repeats_border_pixels() {
        // Column 0 is slightly darker; repeated outward it pulls the edge mean
        // down far enough that (0, y) is not foreground
        let gray = GrayImage::from_fn(20, 20, |x, _| if x == 0 { Luma([100]) } else { Luma([103]) });

        let mask = adaptive_threshold(&gray, &ThresholdConfig::default()).unwrap();

        assert_eq!(mask.get_pixel(0, 10)[0], BACKGROUND);
        assert_eq!(mask.get_pixel(0, 0)[0], BACKGROUND);
    }

    #[test]
    fn dark_corner_pixel_is_foreground() {
        let mut gray = GrayImage::from_pixel(20, 20, Luma([200]));
        gray.put_pixel(19, 19, Luma([0]));

        let mask = adaptive_threshold(&gray, &ThresholdConfig::default()).unwrap();

        assert_eq!(mask.get_pixel(19, 19)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(18, 19)[0], BACKGROUND);
    }

    #[test]
    fn mask_keeps_source_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(17, 9, image::Rgb([10, 200, 30])));
        let mask = binarize(&img, &ThresholdConfig::default()).unwrap();
        assert_eq!(mask.dimensions(), (17, 9));
    }

    #[test]
    fn rejects_empty_image() {
        let img = DynamicImage::new_luma8(0, 10);
        assert!(matches!(
            binarize(&img, &ThresholdConfig::default()),
            Err(PanelError::InvalidImage(_))
        ));
    }

    #[test]
    fn rejects_even_window() {
        let gray = GrayImage::from_pixel(10, 10, Luma([0]));
        let config = ThresholdConfig {
            block_size: 4,
            bias: 2,
        };
        assert!(matches!(
            adaptive_threshold(&gray, &config),
            Err(PanelError::InvalidConfig(_))
        ));
    }
}
