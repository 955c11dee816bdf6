//! Clipping polylines against the source polygon, endpoint extension, and
//! short-polyline rejection (spec.md §4.3 step 6), grounded in
//! `original_source/multi/medialaxis.cpp`'s `prunedMedialAxis`
//! (`extend_path_start`/`extend_path_end`, `near_equal_points`, the
//! `TRY_TO_AVOID_EXTENDING_BIFURCATIONS` bifurcation guard, and the final
//! `length(line) < max_width` filter).

use mrsp_core::geometry::{point_in_polygon, HoledPolygon, Point, PointLocation};

/// Tolerance (in internal units) for treating two polyline endpoints as the
/// same bifurcation point.
const BIFURCATION_TOLERANCE: f64 = 2.0;

/// Clips every polyline to the inside of `hp`, splitting a polyline at each
/// boundary crossing and dropping the segments that fall outside.
pub fn clip_polylines(lines: &[Vec<(f64, f64)>], hp: &HoledPolygon) -> Vec<Vec<(f64, f64)>> {
    lines.iter().flat_map(|line| clip_one(line, hp)).collect()
}

fn clip_one(line: &[(f64, f64)], hp: &HoledPolygon) -> Vec<Vec<(f64, f64)>> {
    if line.len() < 2 {
        return Vec::new();
    }
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    let mut prev_inside = inside_holed_polygon(line[0], hp);
    if prev_inside {
        current.push(line[0]);
    }

    for w in line.windows(2) {
        let (p0, p1) = (w[0], w[1]);
        let crossings = boundary_crossings(p0, p1, hp);
        let mut last = p0;
        let mut inside = prev_inside;
        for (t, pt) in crossings {
            let _ = t;
            if inside {
                current.push(pt);
                runs.push(std::mem::take(&mut current));
            } else {
                current.push(pt);
            }
            inside = !inside;
            last = pt;
        }
        let _ = last;
        if inside {
            current.push(p1);
        }
        prev_inside = inside;
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.into_iter().filter(|r| r.len() >= 2).collect()
}

fn inside_holed_polygon(p: (f64, f64), hp: &HoledPolygon) -> bool {
    let pt = Point::new(p.0.round() as i64, p.1.round() as i64);
    if !point_in_polygon(pt, &hp.outer).is_inside_or_boundary() {
        return false;
    }
    !hp.holes
        .iter()
        .any(|h| point_in_polygon(pt, h) == PointLocation::Inside)
}

/// Parametric crossings (`t` in `(0, 1)`, increasing) of segment `(p0, p1)`
/// against every edge of `hp`'s outer path and holes.
fn boundary_crossings(p0: (f64, f64), p1: (f64, f64), hp: &HoledPolygon) -> Vec<(f64, (f64, f64))> {
    let mut hits = Vec::new();
    for path in hp.all_paths() {
        let n = path.points.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = path.points[i];
            let b = path.points[(i + 1) % n];
            if let Some(t) = segment_intersection_t(p0, p1, a.as_f64(), b.as_f64()) {
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

fn near_equal(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() <= BIFURCATION_TOLERANCE && (a.1 - b.1).abs() <= BIFURCATION_TOLERANCE
}

/// Extends each polyline's free endpoints outward along their local tangent
/// by `max_width + polyline_length`, unless that endpoint coincides with
/// more than one other polyline's endpoint — a bifurcation junction, which
/// the original avoids over-extending.
pub fn extend_endpoints(lines: &mut [Vec<(f64, f64)>], max_width: f64) {
    let fronts: Vec<(f64, f64)> = lines.iter().filter_map(|l| l.first().copied()).collect();
    let backs: Vec<(f64, f64)> = lines.iter().filter_map(|l| l.last().copied()).collect();

    for (idx, line) in lines.iter_mut().enumerate() {
        if line.len() < 2 {
            continue;
        }
        let length = polyline_length(line);
        let distance = max_width + length;

        let front = line[0];
        let shared_front = count_matches(&fronts, front) + count_matches(&backs, front) - 1;
        if shared_front <= 1 {
            let dir = unit_vec(line[1], line[0]);
            line[0] = (front.0 + dir.0 * distance, front.1 + dir.1 * distance);
        }

        let n = line.len();
        let back = line[n - 1];
        let shared_back = count_matches(&fronts, back) + count_matches(&backs, back) - 1;
        if shared_back <= 1 {
            let dir = unit_vec(line[n - 2], line[n - 1]);
            line[n - 1] = (back.0 + dir.0 * distance, back.1 + dir.1 * distance);
        }
        let _ = idx;
    }
}

fn count_matches(points: &[(f64, f64)], target: (f64, f64)) -> usize {
    points.iter().filter(|&&p| near_equal(p, target)).count()
}

fn unit_vec(from: (f64, f64), to: (f64, f64)) -> (f64, f64) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        (0.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

pub fn polyline_length(line: &[(f64, f64)]) -> f64 {
    line.windows(2)
        .map(|w| {
            let dx = w[1].0 - w[0].0;
            let dy = w[1].1 - w[0].1;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Drops polylines shorter than `max_width` (spec.md §4.3 step 6, final filter).
pub fn drop_short(lines: Vec<Vec<(f64, f64)>>, max_width: f64) -> Vec<Vec<(f64, f64)>> {
    lines
        .into_iter()
        .filter(|l| polyline_length(l) >= max_width)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::geometry::Path;

    fn square_hp(side: i64) -> HoledPolygon {
        HoledPolygon::new(
            Path::closed(vec![
                Point::new(0, 0),
                Point::new(side, 0),
                Point::new(side, side),
                Point::new(0, side),
            ]),
            Vec::new(),
        )
    }

    #[test]
    fn clip_drops_portion_outside_square() {
        let hp = square_hp(100);
        let line = vec![(-50.0, 50.0), (150.0, 50.0)];
        let clipped = clip_polylines(&[line], &hp);
        assert_eq!(clipped.len(), 1);
        assert!(clipped[0][0].0 >= -1e-6);
        assert!(clipped[0].last().unwrap().0 <= 100.0 + 1e-6);
    }

    #[test]
    fn drop_short_removes_tiny_polylines() {
        let lines = vec![vec![(0.0, 0.0), (1.0, 0.0)], vec![(0.0, 0.0), (100.0, 0.0)]];
        let kept = drop_short(lines, 50.0);
        assert_eq!(kept.len(), 1);
    }
}
