//! Splits open paths into the portions lying inside vs. outside a support
//! region (spec.md §4.4: "split paths into the *inside* and *outside* sets
//! (clip-intersection and clip-difference)"). The original achieves this by
//! feeding the toolpaths to Clipper as an *open* subject against the
//! support's closed polygons and reading back `PolyTree` results for both
//! `ctIntersection` and `ctDifference`; the boolean-clipping façade in
//! `mrsp-geom` only clips closed subjects (it round-trips through a solid
//! boolean kernel), so this module walks each path's segments directly
//! against the support boundary, the same way `mrsp-medial::clip_extend`
//! clips medial-axis polylines to a single `HoledPolygon`, generalized to a
//! `PolygonSet` of (possibly several, possibly disjoint) support islands.
//!
//! A point counts as "inside the support" if it lies inside or on the
//! boundary of *any* support path; nested holes within the support are not
//! modeled, since support structures produced by this planner's callers are
//! simple filled islands rather than polygons-with-holes.

use mrsp_core::geometry::{point_in_polygon, Path, PolygonSet};

/// Returns `(inside, outside)` path sets. Each input path is walked
/// vertex-by-vertex; runs of consecutive inside (resp. outside) segments
/// become their own output path, split exactly at the boundary crossing.
pub fn split_inside_outside(paths: &[Path], support: &PolygonSet) -> (Vec<Path>, Vec<Path>) {
    let mut inside = Vec::new();
    let mut outside = Vec::new();
    for path in paths {
        let (ins, outs) = split_one(path, support);
        inside.extend(ins);
        outside.extend(outs);
    }
    (inside, outside)
}

fn split_one(path: &Path, support: &PolygonSet) -> (Vec<Path>, Vec<Path>) {
    let pts = &path.points;
    if pts.len() < 2 {
        return (Vec::new(), Vec::new());
    }

    let mut inside_runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut outside_runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    let mut prev_inside = point_in_set(pts[0], support);
    current.push((pts[0].x as f64, pts[0].y as f64));

    for w in pts.windows(2) {
        let a = w[0];
        let b = w[1];
        let p0 = (a.x as f64, a.y as f64);
        let p1 = (b.x as f64, b.y as f64);
        let mut inside = prev_inside;
        for (_t, pt) in boundary_crossings(p0, p1, support) {
            current.push(pt);
            if inside {
                inside_runs.push(std::mem::take(&mut current));
            } else {
                outside_runs.push(std::mem::take(&mut current));
            }
            current.push(pt);
            inside = !inside;
        }
        current.push(p1);
        prev_inside = inside;
    }
    if current.len() > 1 {
        if prev_inside {
            inside_runs.push(current);
        } else {
            outside_runs.push(current);
        }
    }

    let to_path = |run: Vec<(f64, f64)>| {
        Path::open(
            run.into_iter()
                .map(|(x, y)| mrsp_core::geometry::Point::new(x.round() as i64, y.round() as i64))
                .collect(),
        )
    };
    (
        inside_runs.into_iter().filter(|r| r.len() >= 2).map(to_path).collect(),
        outside_runs.into_iter().filter(|r| r.len() >= 2).map(to_path).collect(),
    )
}

fn point_in_set(p: mrsp_core::geometry::Point, support: &PolygonSet) -> bool {
    support
        .paths
        .iter()
        .any(|path| point_in_polygon(p, path).is_inside_or_boundary())
}

fn boundary_crossings(
    p0: (f64, f64),
    p1: (f64, f64),
    support: &PolygonSet,
) -> Vec<(f64, (f64, f64))> {
    let mut hits = Vec::new();
    for path in &support.paths {
        let n = path.points.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = path.points[i];
            let b = path.points[(i + 1) % n];
            if let Some(t) =
                segment_intersection_t(p0, p1, (a.x as f64, a.y as f64), (b.x as f64, b.y as f64))
            {
                let x = p0.0 + t * (p1.0 - p0.0);
                let y = p0.1 + t * (p1.1 - p0.1);
                hits.push((t, (x, y)));
            }
        }
    }
    hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    hits
}

fn segment_intersection_t(
    p0: (f64, f64),
    p1: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
) -> Option<f64> {
    let (x1, y1) = p0;
    let (x2, y2) = p1;
    let (x3, y3) = a;
    let (x4, y4) = b;
    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = ((x1 - x3) * (y1 - y2) - (y1 - y3) * (x1 - x2)) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::geometry::Point;

    fn square(side: i64) -> Path {
        Path::closed(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn path_entirely_inside_support_has_no_outside_part() {
        let support = PolygonSet::new(vec![square(100)]);
        let path = Path::open(vec![Point::new(10, 10), Point::new(90, 10)]);
        let (inside, outside) = split_inside_outside(&[path], &support);
        assert_eq!(inside.len(), 1);
        assert!(outside.is_empty());
    }

    #[test]
    fn path_crossing_support_boundary_splits_in_two() {
        let support = PolygonSet::new(vec![square(100)]);
        let path = Path::open(vec![Point::new(-50, 50), Point::new(150, 50)]);
        let (inside, outside) = split_inside_outside(&[path], &support);
        assert_eq!(inside.len(), 1);
        assert_eq!(outside.len(), 1);
    }

    #[test]
    fn path_entirely_outside_support_has_no_inside_part() {
        let support = PolygonSet::new(vec![square(10)]);
        let path = Path::open(vec![Point::new(1000, 1000), Point::new(1100, 1000)]);
        let (inside, outside) = split_inside_outside(&[path], &support);
        assert!(inside.is_empty());
        assert_eq!(outside.len(), 1);
    }
}
