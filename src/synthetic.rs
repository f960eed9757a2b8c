//! Synthetic test pages with known panel geometry.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::error::{PanelError, Result};
use crate::models::BoundingBox;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 1200;

/// Panel layout of the default page as `(x, y, width, height)`.
const DEFAULT_LAYOUT: [(u32, u32, u32, u32); 4] = [
    (50, 50, 700, 300),
    (50, 400, 340, 350),
    (410, 400, 340, 350),
    (50, 800, 700, 350),
];

/// A white page with black-bordered panels filled with a halftone dot pattern.
#[derive(Debug, Clone)]
pub struct MockPage {
    pub width: u32,
    pub height: u32,
    panels: Vec<BoundingBox>,
    /// Border line thickness, drawn inward from each panel's edge
    pub border: u32,
    pub dot_spacing: u32,
    pub dot_radius: i32,
}

impl Default for MockPage {
    fn default() -> Self {
        let panels = DEFAULT_LAYOUT
            .iter()
            .map(|&(x, y, w, h)| BoundingBox::new(x, y, w, h))
            .collect::<Result<Vec<_>>>()
            .unwrap_or_default();

        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            panels,
            border: 5,
            dot_spacing: 20,
            dot_radius: 4,
        }
    }
}

impl MockPage {
    /// A page of arbitrary size and layout.
    pub fn new(width: u32, height: u32, panels: Vec<BoundingBox>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PanelError::InvalidImage(format!(
                "mock page has zero dimension ({width}x{height})"
            )));
        }
        if let Some(b) = panels.iter().find(|b| !b.is_within(width, height)) {
            return Err(PanelError::OutOfBounds {
                x: b.x(),
                y: b.y(),
                width: b.width(),
                height: b.height(),
                image_width: width,
                image_height: height,
            });
        }
        Ok(Self {
            width,
            height,
            panels,
            ..Self::default()
        })
    }

    /// The default four-panel layout stretched to `width` x `height`.
    pub fn scaled(width: u32, height: u32) -> Result<Self> {
        let sx = width as f64 / DEFAULT_WIDTH as f64;
        let sy = height as f64 / DEFAULT_HEIGHT as f64;
        let scale = |v: u32, s: f64| (v as f64 * s).round() as u32;

        let panels = DEFAULT_LAYOUT
            .iter()
            .map(|&(x, y, w, h)| BoundingBox::new(scale(x, sx), scale(y, sy), scale(w, sx), scale(h, sy)))
            .collect::<Result<Vec<_>>>()?;

        Self::new(width, height, panels)
    }

    /// Where the panels are, in reading order.
    pub fn panels(&self) -> &[BoundingBox] {
        &self.panels
    }

    pub fn render(&self) -> RgbImage {
        let mut page = RgbImage::from_pixel(self.width, self.height, WHITE);

        for panel in &self.panels {
            self.draw_halftone(&mut page, panel);
            self.draw_border(&mut page, panel);
        }

        page
    }

    fn draw_halftone(&self, page: &mut RgbImage, panel: &BoundingBox) {
        if self.dot_spacing == 0 || self.dot_radius <= 0 {
            return;
        }
        let inset = self.border + self.dot_spacing / 2;
        if panel.width() <= 2 * inset || panel.height() <= 2 * inset {
            return;
        }

        let (x0, y0) = (panel.x() + inset, panel.y() + inset);
        let (x1, y1) = (panel.right() - inset, panel.bottom() - inset);

        for cy in (y0..=y1).step_by(self.dot_spacing as usize) {
            for cx in (x0..=x1).step_by(self.dot_spacing as usize) {
                draw_filled_circle_mut(page, (cx as i32, cy as i32), self.dot_radius, BLACK);
            }
        }
    }

    fn draw_border(&self, page: &mut RgbImage, panel: &BoundingBox) {
        let thickness = self.border.min(panel.width() / 2).min(panel.height() / 2);
        for i in 0..thickness {
            let rect = Rect::at((panel.x() + i) as i32, (panel.y() + i) as i32)
                .of_size(panel.width() - 2 * i, panel.height() - 2 * i);
            draw_hollow_rect_mut(page, rect, BLACK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_has_four_panels() {
        let page = MockPage::default();
        assert_eq!(page.panels().len(), 4);
        assert_eq!(page.panels()[2], BoundingBox::new(410, 400, 340, 350).unwrap());
    }

    #[test]
    fn border_is_drawn_on_panel_edges() {
        let img = MockPage::default().render();
        assert_eq!(img.dimensions(), (800, 1200));
        assert_eq!(img.get_pixel(50, 50), &BLACK);
        assert_eq!(img.get_pixel(749, 349), &BLACK);
        assert_eq!(img.get_pixel(54, 200), &BLACK);
        assert_eq!(img.get_pixel(49, 50), &WHITE);
        assert_eq!(img.get_pixel(400, 375), &WHITE);
    }

    #[test]
    fn halftone_stays_inside_panels() {
        let img = MockPage::default().render();
        // first dot centre sits border + spacing / 2 inside the corner
        assert_eq!(img.get_pixel(65, 65), &BLACK);
        assert_eq!(img.get_pixel(20, 20), &WHITE);
    }

    #[test]
    fn scaled_layout_follows_page_size() {
        let page = MockPage::scaled(400, 600).unwrap();
        assert_eq!(page.panels()[0], BoundingBox::new(25, 25, 350, 150).unwrap());
        assert_eq!(page.render().dimensions(), (400, 600));
    }

    #[test]
    fn rejects_panels_outside_the_page() {
        let panel = BoundingBox::new(90, 0, 20, 20).unwrap();
        assert!(MockPage::new(100, 100, vec![panel]).is_err());
    }
}
