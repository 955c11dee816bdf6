//! Axis-aligned bounding box and the `fitToInt32` transform needed by the
//! Voronoi step in C3 (spec.md §3, §4.3).

use super::Point;
use serde::{Deserialize, Serialize};

/// Minimum/maximum X and Y of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

/// The documented "safe 31-bit range minus 1024" (spec.md §9 Open
/// Questions): the source carried two divergent `fitToInt32` variants, one
/// conservative and one aggressive; only the conservative, documented one is
/// implemented here.
pub const SAFE_31_BIT_MAX: i64 = (1i64 << 31) - 1 - 1024;

/// A reversible translate + uniform-scale transform produced by
/// [`BoundingBox::fit_to_int32`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl FitTransform {
    pub fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        let x = ((p.x as f64 + self.translate_x) * self.scale).round() as i64;
        let y = ((p.y as f64 + self.translate_y) * self.scale).round() as i64;
        Point::new(x, y)
    }

    pub fn invert(&self, p: Point) -> Point {
        let x = (p.x as f64 / self.scale - self.translate_x).round() as i64;
        let y = (p.y as f64 / self.scale - self.translate_y).round() as i64;
        Point::new(x, y)
    }
}

impl BoundingBox {
    pub fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = BoundingBox::new(first.x, first.y, first.x, first.y);
        for p in iter {
            bb.min_x = bb.min_x.min(p.x);
            bb.min_y = bb.min_y.min(p.y);
            bb.max_x = bb.max_x.max(p.x);
            bb.max_y = bb.max_y.max(p.y);
        }
        Some(bb)
    }

    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    pub fn is_within_safe_range(&self) -> bool {
        self.min_x.unsigned_abs() as i64 <= SAFE_31_BIT_MAX
            && self.max_x.unsigned_abs() as i64 <= SAFE_31_BIT_MAX
            && self.min_y.unsigned_abs() as i64 <= SAFE_31_BIT_MAX
            && self.max_y.unsigned_abs() as i64 <= SAFE_31_BIT_MAX
    }

    /// Returns a translation + uniform scale that maps this box into the
    /// safe 31-bit range. When the box already fits, returns the identity
    /// transform so that applying it is a no-op (round-trip law, spec.md
    /// §8).
    pub fn fit_to_int32(&self) -> FitTransform {
        if self.is_within_safe_range() {
            return FitTransform::identity();
        }
        let center_x = (self.min_x as f64 + self.max_x as f64) / 2.0;
        let center_y = (self.min_y as f64 + self.max_y as f64) / 2.0;
        let half_extent = ((self.width() as f64).max(self.height() as f64) / 2.0).max(1.0);
        let scale = SAFE_31_BIT_MAX as f64 / half_extent;
        FitTransform {
            translate_x: -center_x,
            translate_y: -center_y,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_when_already_safe() {
        let bb = BoundingBox::new(-1000, -1000, 1000, 1000);
        let t = bb.fit_to_int32();
        assert_eq!(t, FitTransform::identity());
    }

    #[test]
    fn fit_brings_large_box_in_range() {
        let bb = BoundingBox::new(-(1i64 << 40), -(1i64 << 40), 1i64 << 40, 1i64 << 40);
        let t = bb.fit_to_int32();
        let p_min = t.apply(Point::new(bb.min_x, bb.min_y));
        let p_max = t.apply(Point::new(bb.max_x, bb.max_y));
        assert!(p_min.x.unsigned_abs() as i64 <= SAFE_31_BIT_MAX + 1);
        assert!(p_max.x.unsigned_abs() as i64 <= SAFE_31_BIT_MAX + 1);
    }

    #[test]
    fn fit_then_invert_round_trips_when_already_safe() {
        let bb = BoundingBox::new(-1000, -1000, 1000, 1000);
        let t = bb.fit_to_int32();
        let p = Point::new(123, -456);
        assert_eq!(t.invert(t.apply(p)), p);
    }
}
