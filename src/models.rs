use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};

/// Axis-aligned box in page pixel coordinates, `(x, y)` is the top-left corner.
///
/// Width and height are always non-zero; use [`BoundingBox::new`] or
/// [`BoundingBox::new_within`] to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBox")]
pub struct BoundingBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl TryFrom<RawBox> for BoundingBox {
    type Error = PanelError;

    fn try_from(raw: RawBox) -> Result<Self> {
        BoundingBox::new(raw.x, raw.y, raw.width, raw.height)
    }
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PanelError::InvalidBox { width, height });
        }
        if x.checked_add(width - 1).is_none() || y.checked_add(height - 1).is_none() {
            return Err(PanelError::InvalidConfig(format!(
                "box ({x}, {y}) {width}x{height} overflows the coordinate range"
            )));
        }
        Ok(Self { x, y, width, height })
    }

    /// Build a box and check that it lies inside an `image_width` x `image_height` image.
    pub fn new_within(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self> {
        let bbox = Self::new(x, y, width, height)?;
        if !bbox.is_within(image_width, image_height) {
            return Err(PanelError::OutOfBounds {
                x,
                y,
                width,
                height,
                image_width,
                image_height,
            });
        }
        Ok(bbox)
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Last occupied column (inclusive).
    pub fn right(&self) -> u32 {
        self.x + self.width - 1
    }

    /// Last occupied row (inclusive).
    pub fn bottom(&self) -> u32 {
        self.y + self.height - 1
    }

    /// Number of pixels covered, boundaries included.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_within(&self, image_width: u32, image_height: u32) -> bool {
        self.right() < image_width && self.bottom() < image_height
    }

    /// Number of pixels shared with `other`.
    pub fn intersection_area(&self, other: &BoundingBox) -> u64 {
        let xx1 = self.x.max(other.x) as i64;
        let yy1 = self.y.max(other.y) as i64;
        let xx2 = self.right().min(other.right()) as i64;
        let yy2 = self.bottom().min(other.bottom()) as i64;

        let w = (xx2 - xx1 + 1).max(0);
        let h = (yy2 - yy1 + 1).max(0);
        (w * h) as u64
    }

    /// Fraction of this box covered by `other`.
    ///
    /// Not symmetric: the denominator is always `self`'s own area.
    pub fn overlap_ratio(&self, other: &BoundingBox) -> f64 {
        self.intersection_area(other) as f64 / self.area() as f64
    }
}

/// Extent of one connected region in a binary mask.
#[derive(Debug, Clone)]
pub struct Contour {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub point_count: usize,
}

impl Contour {
    /// Grow a contour from the boundary points of a region.
    ///
    /// Returns `None` for an empty point list or points with negative coordinates.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut contour: Option<Contour> = None;

        for (x, y) in points {
            let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
            match contour.as_mut() {
                Some(c) => {
                    c.min_x = c.min_x.min(x);
                    c.min_y = c.min_y.min(y);
                    c.max_x = c.max_x.max(x);
                    c.max_y = c.max_y.max(y);
                    c.point_count += 1;
                }
                None => {
                    contour = Some(Contour {
                        min_x: x,
                        min_y: y,
                        max_x: x,
                        max_y: y,
                        point_count: 1,
                    })
                }
            }
        }

        contour
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn bounding_box(&self) -> BoundingBox {
        // min <= max holds by construction, so width and height are at least 1
        BoundingBox {
            x: self.min_x,
            y: self.min_y,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Structured description of a single panel's content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelAnalysis {
    pub scene_description: String,
    pub characters: Vec<String>,
    pub actions: Vec<String>,
    /// Dialogue and sound effects found in the panel
    pub text_ocr: String,
    /// Set when the result is a placeholder rather than a real analysis
    pub mock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sized_boxes() {
        assert!(matches!(
            BoundingBox::new(10, 10, 0, 5),
            Err(PanelError::InvalidBox { width: 0, height: 5 })
        ));
        assert!(BoundingBox::new(10, 10, 5, 0).is_err());
    }

    #[test]
    fn new_within_checks_image_bounds() {
        assert!(BoundingBox::new_within(0, 0, 800, 1200, 800, 1200).is_ok());
        assert!(matches!(
            BoundingBox::new_within(1, 0, 800, 1200, 800, 1200),
            Err(PanelError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn inclusive_edges_and_area() {
        let b = BoundingBox::new(10, 20, 100, 50).unwrap();
        assert_eq!(b.right(), 109);
        assert_eq!(b.bottom(), 69);
        assert_eq!(b.area(), 5000);
    }

    #[test]
    fn overlap_ratio_is_relative_to_self() {
        let a = BoundingBox::new(0, 0, 100, 100).unwrap();
        let b = BoundingBox::new(10, 10, 100, 100).unwrap();
        assert_eq!(a.intersection_area(&b), 8100);
        assert!((b.overlap_ratio(&a) - 0.81).abs() < 1e-9);

        let small = BoundingBox::new(20, 20, 10, 10).unwrap();
        assert_eq!(small.overlap_ratio(&a), 1.0);
        assert!(a.overlap_ratio(&small) < 0.02);
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = BoundingBox::new(0, 0, 10, 10).unwrap();
        let b = BoundingBox::new(10, 0, 10, 10).unwrap();
        assert_eq!(a.intersection_area(&b), 0);
    }

    #[test]
    fn contour_from_points_tracks_extent() {
        let c = Contour::from_points(vec![(5, 7), (9, 3), (6, 12)]).unwrap();
        assert_eq!((c.min_x, c.min_y, c.max_x, c.max_y), (5, 3, 9, 12));
        assert_eq!(c.point_count, 3);
        assert_eq!(c.bounding_box(), BoundingBox::new(5, 3, 5, 10).unwrap());
        assert!(Contour::from_points(Vec::new()).is_none());
    }

    #[test]
    fn deserializing_rejects_invalid_boxes() {
        let ok: BoundingBox =
            serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(ok, BoundingBox::new(1, 2, 3, 4).unwrap());
        assert!(serde_json::from_str::<BoundingBox>(r#"{"x":1,"y":2,"width":0,"height":4}"#).is_err());
    }
}
