//! The dilate/erode/simple snapping algorithm itself (spec.md §4.2).

use crate::error::{SnapError, SnapResult};
use crate::spec::{GridSpec, SnapMode};
use mrsp_core::error::SnapFailure;
use mrsp_core::geometry::{point_in_polygon, Path, Point, PointLocation};

/// Snaps every path in `paths` onto `grid`. `is_hole[i]` tells the dilate/
/// erode algorithm whether `paths[i]` is an outer contour or a hole, which
/// flips the corner-acceptance rule (spec.md §4.2). Ignored in `Simple` mode.
pub fn snap_paths(paths: &[Path], is_hole: &[bool], grid: &GridSpec) -> SnapResult<Vec<Path>> {
    let mut out = Vec::with_capacity(paths.len());
    for (path, hole) in paths.iter().zip(is_hole.iter()) {
        if let Some(snapped) = snap_path(path, *hole, grid)? {
            out.push(snapped);
        }
    }
    Ok(out)
}

/// Snaps a single path. Returns `Ok(None)` when fewer than 3 vertices
/// survive simplification (spec.md §4.2: "Reject the path").
pub fn snap_path(path: &Path, is_hole: bool, grid: &GridSpec) -> SnapResult<Option<Path>> {
    let snapped_points = match grid.mode {
        SnapMode::Simple => simple_snap(path),
        SnapMode::Dilate | SnapMode::Erode => dilate_erode_snap(path, is_hole, grid)?,
    };

    let cleaned = simplify_output(&snapped_points, grid);
    if cleaned.len() < 3 {
        return Ok(None);
    }
    Ok(Some(Path {
        points: cleaned,
        closed: path.closed,
    }))
}

fn simple_snap(path: &Path) -> Vec<Point> {
    path.points
        .iter()
        .map(|p| round_to_any_grid(p.x as f64, p.y as f64))
        .collect()
}

/// Rounds to the nearest representable integer point; used only by
/// [`simple_snap`], which (per spec.md §4.2) ignores the grid spec's mode
/// distinctions and simply rounds coordinates as given by the caller's own
/// grid-scaled input. Kept as its own function so the intent at the call
/// site reads as "round", not "snap".
fn round_to_any_grid(x: f64, y: f64) -> Point {
    Point::new(x.round() as i64, y.round() as i64)
}

fn dilate_erode_snap(path: &Path, is_hole: bool, grid: &GridSpec) -> SnapResult<Vec<Point>> {
    let mut out = Vec::with_capacity(path.points.len());
    for (idx, &v) in path.points.iter().enumerate() {
        let snapped = snap_vertex(v, idx, path, is_hole, grid)?;
        out.push(snapped);
    }
    Ok(out)
}

/// Whether a grid corner at `(cx, cy)` is acceptable for this path, given
/// the snap mode and whether the path is a hole (spec.md §4.2): dilating a
/// contour or eroding a hole wants the corner outside-or-on-boundary;
/// eroding a contour or dilating a hole wants it inside-or-on-boundary.
fn corner_acceptable(location: PointLocation, mode: SnapMode, is_hole: bool) -> bool {
    if location == PointLocation::Boundary {
        return true;
    }
    let wants_outside = match mode {
        SnapMode::Dilate => !is_hole,
        SnapMode::Erode => is_hole,
        SnapMode::Simple => unreachable!("simple mode does not call corner_acceptable"),
    };
    if wants_outside {
        location == PointLocation::Outside
    } else {
        location == PointLocation::Inside
    }
}

fn snap_vertex(
    v: Point,
    vertex_index: usize,
    path: &Path,
    is_hole: bool,
    grid: &GridSpec,
) -> SnapResult<Point> {
    let (vx, vy) = v.as_f64();
    let on_line = grid.on_grid_line(vx, vy);

    // Stage 1: the single unit cell containing V (skipped when V already
    // sits on a grid line, per spec.md §4.2 "Edge cases").
    if !on_line {
        if let Some(best) = best_candidate(v, cell_corners(v, grid, 0), path, is_hole, grid) {
            if best.1 <= grid.maxdist {
                return Ok(best.0);
            }
        }
    }

    // Stage 2: widen to the neighboring cells (spec.md §4.2: 12 neighboring
    // cells when off-grid, 6 when already on a grid line along one axis —
    // approximated here as the full 4x4 candidate grid around the home
    // cell, matching the original implementation's 16-entry candidate-grid
    // buffer; the `on_line` case additionally restricts to a narrower ring
    // since the home cell's own corners are already on the boundary).
    let ring = if on_line { 1 } else { 2 };
    let candidates = cell_corners(v, grid, ring);
    if let Some((point, dist)) = best_candidate(v, candidates.clone(), path, is_hole, grid) {
        if dist <= grid.maxdist {
            return Ok(point);
        }
    }

    Err(SnapError::SnapFailed(SnapFailure {
        vertex_index,
        vertex: (v.x, v.y),
        candidates: candidates.into_iter().map(|p| (p.x, p.y)).collect(),
    }))
}

/// Every grid point within `ring` cells of V's home cell. `ring = 0` yields
/// the 4 corners of the home cell; `ring = 1` yields the 16 grid points
/// spanning a 4x4 block (the home cell plus its 8 neighbors); `ring = 2`
/// widens one step further.
fn cell_corners(v: Point, grid: &GridSpec, ring: i64) -> Vec<Point> {
    let (i0, j0) = grid.cell_of(v.x as f64, v.y as f64);
    let lo = -ring;
    let hi = ring + 1;
    let mut pts = Vec::new();
    for di in lo..=hi {
        for dj in lo..=hi {
            let (gx, gy) = grid.grid_point(i0 + di, j0 + dj);
            pts.push(Point::new(gx.round() as i64, gy.round() as i64));
        }
    }
    pts.sort_by_key(|p| (p.x, p.y));
    pts.dedup();
    pts
}

/// Picks the nearest acceptable candidate to `v`. Ties broken by
/// leftmost-bottommost (spec.md §4.2 "Ordering tie-break").
fn best_candidate(
    v: Point,
    candidates: Vec<Point>,
    path: &Path,
    is_hole: bool,
    grid: &GridSpec,
) -> Option<(Point, f64)> {
    let mut best: Option<(Point, f64)> = None;
    for c in candidates {
        let location = point_in_polygon(c, path);
        if !corner_acceptable(location, grid.mode, is_hole) {
            continue;
        }
        let dist = v.distance_to(&c);
        let better = match best {
            None => true,
            Some((bp, bd)) => {
                dist < bd - 1e-9
                    || ((dist - bd).abs() <= 1e-9 && (c.x, c.y) < (bp.x, bp.y))
            }
        };
        if better {
            best = Some((c, dist));
        }
    }
    best
}

/// Appends each snapped vertex only if it is the first, differs from the
/// previous output vertex, and (if `remove_redundant`) is not colinear with
/// the previous edge, tested with a cross product on grid-unit deltas
/// (spec.md §4.2).
fn simplify_output(points: &[Point], grid: &GridSpec) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() == Some(&p) {
            continue;
        }
        if grid.remove_redundant && out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            if is_colinear_grid_units(a, b, p, grid) {
                out.pop();
            }
        }
        out.push(p);
    }
    // Closing edge: if the path wraps, also check colinearity at the seam.
    if grid.remove_redundant && out.len() >= 3 {
        if is_colinear_grid_units(out[out.len() - 2], out[out.len() - 1], out[0], grid) {
            out.pop();
        }
    }
    out
}

fn is_colinear_grid_units(a: Point, b: Point, c: Point, grid: &GridSpec) -> bool {
    let to_units = |p: Point| -> (i64, i64) {
        (
            ((p.x as f64 - grid.shift_x) / grid.step_x).round() as i64,
            ((p.y as f64 - grid.shift_y) / grid.step_y).round() as i64,
        )
    };
    let (ax, ay) = to_units(a);
    let (bx, by) = to_units(b);
    let (cx, cy) = to_units(c);
    let d1x = (bx - ax) as i64;
    let d1y = (by - ay) as i64;
    let d2x = (cx - bx) as i64;
    let d2y = (cy - by) as i64;
    let cross: i64 = d1x.wrapping_mul(d2y) - d1y.wrapping_mul(d2x);
    cross == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: i64) -> Path {
        Path::closed(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn simple_mode_rounds_each_vertex() {
        let path = Path::closed(vec![Point::new(3, 3), Point::new(97, 4), Point::new(50, 96)]);
        let grid = GridSpec::new(10.0, 10.0, 50.0, SnapMode::Simple);
        let out = snap_path(&path, false, &grid).unwrap().unwrap();
        for p in &out.points {
            assert_eq!(p.x % 10, 0);
            assert_eq!(p.y % 10, 0);
        }
    }

    #[test]
    fn erode_mode_keeps_every_vertex_on_grid() {
        let path = square(97);
        let grid = GridSpec::new(10.0, 10.0, 50.0, SnapMode::Erode);
        let out = snap_path(&path, false, &grid).unwrap().unwrap();
        for p in &out.points {
            assert_eq!(((p.x as f64) / 10.0).fract(), 0.0);
            assert_eq!(((p.y as f64) / 10.0).fract(), 0.0);
        }
    }

    #[test]
    fn too_small_maxdist_fails() {
        let path = square(97);
        let grid = GridSpec::new(1000.0, 1000.0, 1.0, SnapMode::Erode);
        let result = snap_path(&path, false, &grid);
        assert!(result.is_err());
    }

    #[test]
    fn exact_grid_square_is_unchanged_up_to_order() {
        let path = square(100);
        let grid = GridSpec::new(10.0, 10.0, 50.0, SnapMode::Dilate);
        let out = snap_path(&path, false, &grid).unwrap().unwrap();
        assert_eq!(out.points.len(), 4);
    }
}
