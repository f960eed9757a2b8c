use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};

use crate::models::{BoundingBox, Contour};

/// Find the outermost region boundaries in a binary mask.
///
/// Only outer borders with no enclosing region are returned; holes and
/// anything nested inside another region are skipped.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .filter_map(|c| Contour::from_points(c.points.iter().map(|p| (p.x, p.y))))
        .collect()
}

/// Candidate panel boxes, one per external region. Order is not significant.
pub fn extract_regions(mask: &GrayImage) -> Vec<BoundingBox> {
    find_external_contours(mask)
        .iter()
        .map(Contour::bounding_box)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_hollow_rect_mut;
    use imageproc::rect::Rect;

    fn ring(mask: &mut GrayImage, x: i32, y: i32, w: u32, h: u32) {
        draw_hollow_rect_mut(mask, Rect::at(x, y).of_size(w, h), Luma([255]));
    }

    #[test]
    fn empty_mask_has_no_regions() {
        let mask = GrayImage::new(50, 50);
        assert!(extract_regions(&mask).is_empty());
    }

    #[test]
    fn one_box_per_outer_region() {
        let mut mask = GrayImage::new(100, 100);
        ring(&mut mask, 5, 5, 30, 20);
        ring(&mut mask, 50, 60, 40, 30);

        let mut boxes = extract_regions(&mask);
        boxes.sort_by_key(|b| (b.y(), b.x()));
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(5, 5, 30, 20).unwrap(),
                BoundingBox::new(50, 60, 40, 30).unwrap(),
            ]
        );
    }

    #[test]
    fn nested_regions_are_ignored() {
        let mut mask = GrayImage::new(100, 100);
        ring(&mut mask, 10, 10, 80, 80);
        ring(&mut mask, 30, 30, 20, 20);
        mask.put_pixel(60, 60, Luma([255]));

        let boxes = extract_regions(&mask);
        assert_eq!(boxes, vec![BoundingBox::new(10, 10, 80, 80).unwrap()]);
    }

    #[test]
    fn region_touching_the_border_is_kept() {
        let mut mask = GrayImage::new(20, 20);
        for x in 0..20 {
            mask.put_pixel(x, 0, Luma([255]));
        }
        let boxes = extract_regions(&mask);
        assert_eq!(boxes, vec![BoundingBox::new(0, 0, 20, 1).unwrap()]);
    }
}
