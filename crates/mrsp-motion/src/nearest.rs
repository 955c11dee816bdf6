//! Nearest-endpoint search (spec.md §4.4), grounded in
//! `original_source/multi/motionPlanner.cpp`'s `verysimple_get_nearest_path`.
//! The original widens the squared-distance accumulator to a 128-bit
//! intrinsic (or a `_mul128`-based equivalent on MSVC) specifically so
//! coordinates near the ±2^63 edge of the internal integer range never
//! overflow; `mrsp_core::geometry::distance_sq_i128` already provides that.

use mrsp_core::geometry::{distance_sq_i128, Path, Point};

/// Whether the paths being routed are logically open (either endpoint may
/// serve as the attachment point, and a path may be reversed to use its
/// back end first) or closed loops already rendered "closed-open" (spec.md
/// §4.5 step 4: front and back coincide, so only the front needs trying).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCloseMode {
    Open,
    Loop,
}

/// Finds the path (among the `valid` entries of `paths`) whose relevant
/// endpoint is nearest to `start_near`, returning its index and whether the
/// front endpoint won (as opposed to the back, which can only win in
/// [`PathCloseMode::Open`]). Returns `None` if every entry is invalid or
/// `paths` is empty.
pub fn nearest_path(
    start_near: Point,
    paths: &[Path],
    valid: &[bool],
    mode: PathCloseMode,
) -> Option<(usize, bool)> {
    let mut best_idx: Option<usize> = None;
    let mut best_isfront = true;
    let mut best_dist: i128 = i128::MAX;

    'paths: for (idx, path) in paths.iter().enumerate() {
        if !valid[idx] {
            continue;
        }
        let Some(front) = path.front() else { continue };
        let back = path.back().unwrap_or(front);

        let d_front = distance_sq_i128(start_near, front);
        if d_front < best_dist {
            best_idx = Some(idx);
            best_isfront = true;
            best_dist = d_front;
            if best_dist == 0 {
                break 'paths;
            }
        }

        if mode == PathCloseMode::Open && back != front {
            let d_back = distance_sq_i128(start_near, back);
            if d_back < best_dist {
                best_idx = Some(idx);
                best_isfront = false;
                best_dist = d_back;
                if best_dist == 0 {
                    break 'paths;
                }
            }
        }
    }

    best_idx.map(|idx| (idx, best_isfront))
}

/// Coordinate-wise "almost equal" test used to decide whether two toolpaths
/// can be fused without an explicit travel move, with the same fixed pixel
/// tolerance as the original's `almost_equal`.
pub const ALMOST_EQUAL_TOLERANCE: i64 = 3;

pub fn almost_equal(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= ALMOST_EQUAL_TOLERANCE && (a.y - b.y).abs() <= ALMOST_EQUAL_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(points: &[(i64, i64)]) -> Path {
        Path::open(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn picks_nearest_front_when_closer_than_any_back() {
        let paths = vec![open(&[(0, 0), (10, 0)]), open(&[(100, 100), (110, 100)])];
        let valid = vec![true, true];
        let (idx, isfront) = nearest_path(Point::new(1, 1), &paths, &valid, PathCloseMode::Open).unwrap();
        assert_eq!(idx, 0);
        assert!(isfront);
    }

    #[test]
    fn picks_back_endpoint_in_open_mode_when_nearer() {
        let paths = vec![open(&[(0, 0), (10, 0)])];
        let valid = vec![true];
        let (idx, isfront) =
            nearest_path(Point::new(11, 0), &paths, &valid, PathCloseMode::Open).unwrap();
        assert_eq!(idx, 0);
        assert!(!isfront);
    }

    #[test]
    fn loop_mode_never_considers_the_back_endpoint() {
        let paths = vec![open(&[(0, 0), (10, 0)])];
        let valid = vec![true];
        let (idx, isfront) =
            nearest_path(Point::new(11, 0), &paths, &valid, PathCloseMode::Loop).unwrap();
        assert_eq!(idx, 0);
        assert!(isfront);
    }

    #[test]
    fn skips_invalid_entries() {
        let paths = vec![open(&[(0, 0), (1, 0)]), open(&[(5, 5), (6, 5)])];
        let valid = vec![false, true];
        let (idx, _) = nearest_path(Point::new(0, 0), &paths, &valid, PathCloseMode::Open).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn almost_equal_respects_fixed_tolerance() {
        assert!(almost_equal(Point::new(0, 0), Point::new(2, -3)));
        assert!(!almost_equal(Point::new(0, 0), Point::new(4, 0)));
    }
}
