use crate::config::FilterConfig;
use crate::models::BoundingBox;

/// Whether a box is plausibly a panel on a `page_area` pixel page.
pub fn is_panel_sized(bbox: &BoundingBox, page_area: u64, config: &FilterConfig) -> bool {
    let area = bbox.area() as f64;
    let page_area = page_area as f64;

    bbox.width() > config.min_dim
        && bbox.height() > config.min_dim
        && area > config.min_area_frac * page_area
        && area < config.max_area_frac * page_area
}

/// Drop candidates that are specks, thin lines or the page frame itself.
///
/// Survivors keep their input order.
pub fn filter_boxes(
    boxes: &[BoundingBox],
    image_width: u32,
    image_height: u32,
    config: &FilterConfig,
) -> Vec<BoundingBox> {
    let page_area = image_width as u64 * image_height as u64;

    boxes
        .iter()
        .filter(|b| is_panel_sized(b, page_area, config))
        .copied()
        .collect()
}
