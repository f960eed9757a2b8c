use std::cmp::Reverse;

use crate::models::BoundingBox;

/// Sort key placing panels top-to-bottom, then right-to-left.
pub fn reading_order_key(bbox: &BoundingBox) -> (u32, Reverse<u32>) {
    (bbox.y(), Reverse(bbox.x()))
}

/// Arrange panels top-to-bottom by top edge, right-to-left within a row.
///
/// Panels with identical `(y, x)` keep their relative order.
pub fn sort_reading_order(boxes: &[BoundingBox]) -> Vec<BoundingBox> {
    let mut ordered = boxes.to_vec();
    ordered.sort_by_key(reading_order_key);
    ordered
}
