//! Polygon/polyline offsetting (spec.md §4.1 `offset`/`offset2`), bound to
//! `cavalier_contours::polyline::Polyline::parallel_offset` the way
//! `gcodekit5-designer::ops::perform_offset` and
//! `gcodekit5-camtools::gerber` already do, including guarding the kernel
//! call with `catch_unwind` against degenerate input.

use crate::convert::{clean_pline, path_to_pline};
use crate::error::{GeomError, GeomResult};
use cavalier_contours::polyline::{PlineSource, PlineVertex};
use mrsp_core::geometry::{Path, Point, PolygonSet};
use std::panic::AssertUnwindSafe;

/// Corner treatment where the offset kernel would otherwise fillet a convex
/// corner with an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    /// Keep the kernel's native arc fillet, tessellated into short chords.
    Round,
    /// Replace the fillet with a flat bevel between the two adjacent
    /// straight offset edges.
    Square,
    /// Replace the fillet with the sharp intersection point of the two
    /// adjacent straight offset edges, falling back to `Square` if the
    /// miter point would be implausibly far away.
    Miter,
}

/// Cap treatment for the two free ends of an open path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndType {
    /// Closed paths only: wraps the path as a closed loop before offsetting.
    Closed,
    /// A flat cut at the original endpoint.
    Butt,
    /// A square cap, extended outward by the offset amount.
    Square,
    /// A round cap, tessellated the same way `JoinStyle::Round` corners are.
    Round,
}

const MITER_LIMIT: f64 = 4.0;
const ARC_SEGMENT_ANGLE: f64 = std::f64::consts::PI / 12.0; // 15 degrees per chord

/// Offsets every path in `input` by `amount` (positive = outward for a
/// counter-clockwise contour), applying `join`/`end` corner treatment.
pub fn offset(
    amount: f64,
    input: &PolygonSet,
    join: JoinStyle,
    end: EndType,
) -> GeomResult<PolygonSet> {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let mut out_paths = Vec::new();
        for path in &input.paths {
            out_paths.extend(offset_one_path(path, amount, join, end));
        }
        out_paths
    }));
    match result {
        Ok(paths) => Ok(PolygonSet::with_fill(paths, input.fill)),
        Err(_) => Err(GeomError::InvalidGeometry(
            "offset kernel panicked".to_string(),
        )),
    }
}

/// `offset2(a, b, input) = offset(b, offset(a, input))`, performed with the
/// same join/end styles for both passes, matching spec.md §4.1's
/// description of reusing a single kernel instance for the composed call.
pub fn offset2(
    a: f64,
    b: f64,
    input: &PolygonSet,
    join: JoinStyle,
    end: EndType,
) -> GeomResult<PolygonSet> {
    let first = offset(a, input, join, end)?;
    offset(b, &first, join, end)
}

fn offset_one_path(path: &Path, amount: f64, join: JoinStyle, end: EndType) -> Vec<Path> {
    if path.points.len() < 2 {
        return Vec::new();
    }
    let prepared = if path.closed {
        path.clone()
    } else {
        prepare_open_path_ends(path, amount, end)
    };

    let mut pline = path_to_pline(&prepared);
    pline.set_is_closed(path.closed || end == EndType::Closed);

    let offsets = pline.parallel_offset(amount);
    offsets
        .into_iter()
        .map(|raw| {
            let cleaned = clean_pline(raw);
            flatten_with_join_style(&cleaned, join)
        })
        .collect()
}

/// For an open path with a square cap, extends the first/last points
/// outward along the local tangent by `amount`, the classic square-cap
/// construction; other end types leave the endpoints untouched (round caps
/// are produced by the kernel's own arc at a zero-length corner, flattened
/// like any other fillet).
fn prepare_open_path_ends(path: &Path, amount: f64, end: EndType) -> Path {
    if end != EndType::Square || path.points.len() < 2 {
        return path.clone();
    }
    let mut pts = path.points.clone();
    let n = pts.len();
    let d = amount.abs();

    let (x0, y0) = pts[0].as_f64();
    let (x1, y1) = pts[1].as_f64();
    let (tx, ty) = unit(x0 - x1, y0 - y1);
    pts[0] = Point::new((x0 + tx * d).round() as i64, (y0 + ty * d).round() as i64);

    let (xe, ye) = pts[n - 1].as_f64();
    let (xp, yp) = pts[n - 2].as_f64();
    let (tx2, ty2) = unit(xe - xp, ye - yp);
    pts[n - 1] = Point::new(
        (xe + tx2 * d).round() as i64,
        (ye + ty2 * d).round() as i64,
    );

    Path {
        points: pts,
        closed: false,
    }
}

fn unit(dx: f64, dy: f64) -> (f64, f64) {
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        (0.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

/// Walks the offset kernel's raw vertex/bulge output, replacing each arc
/// (a vertex with nonzero bulge) according to `join`: tessellated for
/// `Round`, collapsed to a flat bevel for `Square`, or replaced by the
/// sharp tangent-line intersection for `Miter`.
fn flatten_with_join_style(pline: &cavalier_contours::polyline::Polyline<f64>, join: JoinStyle) -> Path {
    let verts: Vec<PlineVertex<f64>> = pline.iter_vertexes().collect();
    let n = verts.len();
    if n == 0 {
        return Path {
            points: Vec::new(),
            closed: pline.is_closed(),
        };
    }

    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let v = verts[i];
        points.push(Point::new(v.x.round() as i64, v.y.round() as i64));
        if v.bulge.abs() < 1e-9 {
            continue;
        }
        let next_idx = if i + 1 < n {
            i + 1
        } else if pline.is_closed() {
            0
        } else {
            continue;
        };
        let v_next = verts[next_idx];
        match join {
            JoinStyle::Square => {
                // Nothing inserted: the chord between v and v_next is the bevel.
            }
            JoinStyle::Round => {
                points.extend(tessellate_arc(v, v_next));
            }
            JoinStyle::Miter => {
                if let Some(p) = miter_point(verts.as_slice(), i, next_idx, n, pline.is_closed()) {
                    points.push(p);
                } else {
                    // Degenerate/too-sharp miter: fall back to the bevel.
                }
            }
        }
    }

    Path {
        points,
        closed: pline.is_closed(),
    }
}

fn tessellate_arc(v: PlineVertex<f64>, v_next: PlineVertex<f64>) -> Vec<Point> {
    let Some((cx, cy, radius, start_angle, end_angle)) = arc_geometry(v, v_next) else {
        return Vec::new();
    };
    let sweep = end_angle - start_angle;
    let steps = ((sweep.abs() / ARC_SEGMENT_ANGLE).ceil() as usize).max(1);
    let mut pts = Vec::with_capacity(steps.saturating_sub(1));
    for step in 1..steps {
        let t = start_angle + sweep * (step as f64 / steps as f64);
        let x = cx + radius * t.cos();
        let y = cy + radius * t.sin();
        pts.push(Point::new(x.round() as i64, y.round() as i64));
    }
    pts
}

/// Bulge-to-arc conversion per `cavalier_contours`' convention: `bulge =
/// tan(includedAngle / 4)`, sign giving the turn direction.
fn arc_geometry(
    v: PlineVertex<f64>,
    v_next: PlineVertex<f64>,
) -> Option<(f64, f64, f64, f64, f64)> {
    let dx = v_next.x - v.x;
    let dy = v_next.y - v.y;
    let chord = (dx * dx + dy * dy).sqrt();
    if chord < 1e-9 {
        return None;
    }
    let included_angle = 4.0 * v.bulge.atan();
    let radius = chord / (2.0 * (included_angle / 2.0).sin()).abs();
    let mid_x = (v.x + v_next.x) / 2.0;
    let mid_y = (v.y + v_next.y) / 2.0;
    // Perpendicular offset from the chord midpoint to the arc center.
    let sagitta_dir = if v.bulge >= 0.0 { 1.0 } else { -1.0 };
    let (nx, ny) = unit(-dy, dx);
    let half_chord = chord / 2.0;
    let center_dist = (radius * radius - half_chord * half_chord).max(0.0).sqrt();
    let cx = mid_x + nx * center_dist * sagitta_dir;
    let cy = mid_y + ny * center_dist * sagitta_dir;
    let start_angle = (v.y - cy).atan2(v.x - cx);
    let mut end_angle = (v_next.y - cy).atan2(v_next.x - cx);
    if v.bulge >= 0.0 {
        while end_angle < start_angle {
            end_angle += std::f64::consts::TAU;
        }
    } else {
        while end_angle > start_angle {
            end_angle -= std::f64::consts::TAU;
        }
    }
    Some((cx, cy, radius, start_angle, end_angle))
}

/// Intersects the line through the vertex before the arc (tangent entering)
/// with the line through the vertex after the arc (tangent leaving),
/// bounded by [`MITER_LIMIT`] times the local chord length.
fn miter_point(
    verts: &[PlineVertex<f64>],
    arc_start: usize,
    arc_end: usize,
    n: usize,
    closed: bool,
) -> Option<Point> {
    let prev_idx = if arc_start == 0 {
        if closed {
            n - 1
        } else {
            return None;
        }
    } else {
        arc_start - 1
    };
    let next_idx = if arc_end + 1 >= n {
        if closed {
            0
        } else {
            return None;
        }
    } else {
        arc_end + 1
    };

    let p_prev = verts[prev_idx];
    let p_start = verts[arc_start];
    let p_end = verts[arc_end];
    let p_next = verts[next_idx];

    let (d1x, d1y) = unit(p_start.x - p_prev.x, p_start.y - p_prev.y);
    let (d2x, d2y) = unit(p_next.x - p_end.x, p_next.y - p_end.y);

    // Solve p_start + t*d1 == p_end + s*d2 for t (2D line intersection).
    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() < 1e-9 {
        return None;
    }
    let ex = p_end.x - p_start.x;
    let ey = p_end.y - p_start.y;
    let t = (ex * d2y - ey * d2x) / denom;
    let ix = p_start.x + t * d1x;
    let iy = p_start.y + t * d1y;

    let chord = ((p_end.x - p_start.x).powi(2) + (p_end.y - p_start.y).powi(2)).sqrt();
    let miter_len = ((ix - p_start.x).powi(2) + (iy - p_start.y).powi(2)).sqrt();
    if chord > 1e-9 && miter_len > MITER_LIMIT * chord.max(1.0) {
        return None;
    }
    Some(Point::new(ix.round() as i64, iy.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::geometry::signed_area;

    fn square(side: i64) -> Path {
        Path::closed(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn outward_offset_of_ccw_square_grows_area() {
        let set = PolygonSet::new(vec![square(100)]);
        let result = offset(10.0, &set, JoinStyle::Square, EndType::Closed).unwrap();
        assert!(!result.paths.is_empty());
        let area_before: f64 = signed_area(&square(100));
        let area_after: f64 = result.paths.iter().map(|p| signed_area(p).abs()).sum();
        assert!(area_after > area_before.abs());
    }

    #[test]
    fn inward_offset_of_ccw_square_shrinks_area() {
        let set = PolygonSet::new(vec![square(100)]);
        let result = offset(-10.0, &set, JoinStyle::Square, EndType::Closed).unwrap();
        let area_after: f64 = result.paths.iter().map(|p| signed_area(p).abs()).sum();
        assert!(area_after < 10000.0);
    }

    #[test]
    fn offset2_composes_two_passes() {
        let set = PolygonSet::new(vec![square(100)]);
        let composed = offset2(10.0, -10.0, &set, JoinStyle::Round, EndType::Closed).unwrap();
        assert!(!composed.paths.is_empty());
    }
}
