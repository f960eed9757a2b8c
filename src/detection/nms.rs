use crate::models::BoundingBox;

/// Greedy non-maximum suppression over panel candidates.
///
/// Boxes are picked in order of their bottom edge, lowest on the page first.
/// Each pick removes every remaining box that it covers by more than
/// `overlap_thresh` of that box's *own* area, so a small box mostly inside a
/// large pick is dropped no matter how big the pick is.
///
/// Boxes sharing a bottom edge are picked larger area first, then by `x`, then
/// by `y`, which makes the result independent of input order.
///
/// The kept boxes are returned in pick order.
pub fn non_max_suppression(boxes: &[BoundingBox], overlap_thresh: f64) -> Vec<BoundingBox> {
    suppress_indices(boxes, overlap_thresh)
        .into_iter()
        .map(|i| boxes[i])
        .collect()
}

/// Indices into `boxes` kept by [`non_max_suppression`], in pick order.
pub fn suppress_indices(boxes: &[BoundingBox], overlap_thresh: f64) -> Vec<usize> {
    if boxes.is_empty() {
        return Vec::new();
    }

    // Ascending priority; picks are taken from the end
    let mut remaining: Vec<usize> = (0..boxes.len()).collect();
    remaining.sort_by_key(|&i| {
        let b = &boxes[i];
        (b.bottom(), b.area(), b.x(), b.y())
    });

    let mut picked = Vec::new();

    while let Some(pick) = remaining.pop() {
        let current = &boxes[pick];
        picked.push(pick);

        remaining.retain(|&i| boxes[i].overlap_ratio(current) <= overlap_thresh);
    }

    picked
}
