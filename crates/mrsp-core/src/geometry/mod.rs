//! 2D integer geometry primitives (spec.md §3) plus the pure-math helpers
//! (point-in-polygon, signed area, path orientation) that do not need an
//! external clipping kernel. The clipping/offsetting façade that *does* need
//! one lives in the sibling `mrsp-geom` crate, which depends on this one for
//! its vocabulary types.

mod bbox;
mod holed_polygon;
mod path;
mod point;
mod polygon_set;

pub use bbox::{BoundingBox, FitTransform};
pub use holed_polygon::HoledPolygon;
pub use path::Path;
pub use point::{Point, Point3};
pub use polygon_set::{FillRule, PolygonSet};

/// Signed area of a closed path (shoelace formula), in internal-unit^2.
/// Positive for counter-clockwise paths, negative for clockwise.
pub fn signed_area(path: &Path) -> f64 {
    let pts = &path.points;
    let n = pts.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc: f64 = 0.0;
    for i in 0..n {
        let p0 = pts[i];
        let p1 = pts[(i + 1) % n];
        acc += (p0.x as f64) * (p1.y as f64) - (p1.x as f64) * (p0.y as f64);
    }
    acc * 0.5
}

/// True if the path is wound counter-clockwise (positive signed area).
pub fn is_counter_clockwise(path: &Path) -> bool {
    signed_area(path) >= 0.0
}

/// Classic ray-casting point-in-polygon test against a single closed path.
///
/// Returns `true` for points strictly inside and for points considered to lie
/// on an edge, matching the grid snapper's "on or inside" acceptance
/// criterion (spec.md §4.2).
pub fn point_in_polygon(p: Point, path: &Path) -> PointLocation {
    let pts = &path.points;
    let n = pts.len();
    if n < 3 {
        return PointLocation::Outside;
    }
    // Boundary check first (exact, using the cross product on integer deltas).
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        if point_on_segment(p, a, b) {
            return PointLocation::Boundary;
        }
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        let intersects = ((pi.y as i64 > p.y as i64) != (pj.y as i64 > p.y as i64))
            && ((p.x as f64)
                < (pj.x - pi.x) as f64 * (p.y - pi.y) as f64 / (pj.y - pi.y) as f64
                    + pi.x as f64);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    if inside {
        PointLocation::Inside
    } else {
        PointLocation::Outside
    }
}

/// Result of a point-in-polygon test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    Inside,
    Outside,
    Boundary,
}

impl PointLocation {
    pub fn is_inside_or_boundary(self) -> bool {
        matches!(self, PointLocation::Inside | PointLocation::Boundary)
    }
}

fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    let cross = cross_i128(a, b, p);
    if cross != 0 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// 2D cross product of (b - a) x (c - a), widened to i128 so that
/// coordinates up to ±2^63 never overflow (spec.md §4.4).
pub fn cross_i128(a: Point, b: Point, c: Point) -> i128 {
    let ax = (b.x - a.x) as i128;
    let ay = (b.y - a.y) as i128;
    let bx = (c.x - a.x) as i128;
    let by = (c.y - a.y) as i128;
    ax * by - ay * bx
}

/// Squared Euclidean distance between two points, widened to i128 so that
/// `deltaX^2 + deltaY^2` never overflows for coordinates up to ±2^63.
pub fn distance_sq_i128(a: Point, b: Point) -> i128 {
    let dx = (a.x - b.x) as i128;
    let dy = (a.y - b.y) as i128;
    dx * dx + dy * dy
}

/// Enforces standard contour/hole orientation (spec.md §4.1 `orientPaths`):
/// outer contours counter-clockwise, holes clockwise, by nesting-depth
/// analysis. Paths are classified from largest to smallest absolute area; for
/// each path the enclosing parent is located via a point-in-polygon test
/// against already-classified roots, the nesting depth is inferred from the
/// parent's depth, and the path is reversed if its signed area doesn't match
/// the depth's required orientation (even depth = outer/CCW, odd = hole/CW).
pub fn orient_paths(paths: &[Path]) -> Vec<Path> {
    let info = nesting_info(paths);
    let mut result = paths.to_vec();
    for (i, n) in info.iter().enumerate() {
        let want_ccw = n.depth % 2 == 0;
        let is_ccw = signed_area(&result[i]) >= 0.0;
        if is_ccw != want_ccw {
            result[i].points.reverse();
        }
    }
    result
}

/// Nesting depth and immediate parent for each path, found by the same
/// pre-sort-by-area + point-in-polygon walk `orientPaths` uses (spec.md
/// §4.1). Depth 0 paths are top-level outer boundaries; odd depths are
/// holes; even depths ≥ 2 are islands nested inside a hole. Shared by
/// `orient_paths` and by the clip façade's path-set → polygon-with-holes
/// grouping in `mrsp-geom`.
#[derive(Debug, Clone, Copy)]
pub struct NestInfo {
    pub depth: u32,
    pub parent: Option<usize>,
}

pub fn nesting_info(paths: &[Path]) -> Vec<NestInfo> {
    let mut order: Vec<usize> = (0..paths.len()).collect();
    order.sort_by(|&a, &b| {
        signed_area(&paths[b])
            .abs()
            .partial_cmp(&signed_area(&paths[a]).abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut info: Vec<Option<NestInfo>> = vec![None; paths.len()];

    for &i in &order {
        let pi = &paths[i];
        if pi.points.len() < 3 {
            info[i] = Some(NestInfo {
                depth: 0,
                parent: None,
            });
            continue;
        }
        let test_point = pi.points[0];
        let mut best_parent: Option<(usize, u32)> = None;
        for &j in &order {
            if j == i {
                continue;
            }
            let Some(nj) = info[j] else { continue };
            if point_in_polygon(test_point, &paths[j]).is_inside_or_boundary() {
                let area_j = signed_area(&paths[j]).abs();
                let is_closer = match best_parent {
                    None => true,
                    Some((bp, _)) => area_j < signed_area(&paths[bp]).abs(),
                };
                if is_closer {
                    best_parent = Some((j, nj.depth));
                }
            }
        }
        let (my_depth, parent) = match best_parent {
            Some((p, d)) => (d + 1, Some(p)),
            None => (0, None),
        };
        info[i] = Some(NestInfo {
            depth: my_depth,
            parent,
        });
    }
    info.into_iter().map(|o| o.unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i64, y0: i64, side: i64, ccw: bool) -> Path {
        let pts = if ccw {
            vec![
                Point::new(x0, y0),
                Point::new(x0 + side, y0),
                Point::new(x0 + side, y0 + side),
                Point::new(x0, y0 + side),
            ]
        } else {
            vec![
                Point::new(x0, y0),
                Point::new(x0, y0 + side),
                Point::new(x0 + side, y0 + side),
                Point::new(x0 + side, y0),
            ]
        };
        Path::closed(pts)
    }

    #[test]
    fn signed_area_of_ccw_square_is_positive() {
        let sq = square(0, 0, 10, true);
        assert!(signed_area(&sq) > 0.0);
    }

    #[test]
    fn signed_area_of_cw_square_is_negative() {
        let sq = square(0, 0, 10, false);
        assert!(signed_area(&sq) < 0.0);
    }

    #[test]
    fn point_in_polygon_basic() {
        let sq = square(0, 0, 10, true);
        assert_eq!(point_in_polygon(Point::new(5, 5), &sq), PointLocation::Inside);
        assert_eq!(
            point_in_polygon(Point::new(20, 20), &sq),
            PointLocation::Outside
        );
        assert_eq!(point_in_polygon(Point::new(0, 5), &sq), PointLocation::Boundary);
    }

    #[test]
    fn orient_paths_fixes_outer_and_hole() {
        let outer = square(0, 0, 100, false); // wrong: should be CCW
        let hole = square(25, 25, 10, true); // wrong: should be CW
        let oriented = orient_paths(&[outer, hole]);
        assert!(signed_area(&oriented[0]) >= 0.0);
        assert!(signed_area(&oriented[1]) <= 0.0);
    }

    #[test]
    fn distance_sq_handles_large_coordinates() {
        let a = Point::new(i64::MIN / 2, 0);
        let b = Point::new(i64::MAX / 2, 0);
        let d = distance_sq_i128(a, b);
        assert!(d > 0);
    }
}
