//! The overhang-aware planner (spec.md §4.4 "Overhang-aware planner"),
//! grounded in `original_source/multi/motionPlanner.cpp`'s
//! `SaferOverhangingVerySimpleMotionPlanner`. Toolpaths that rest partly on
//! already-printed support and partly over open air are ordered so that,
//! wherever possible, writing continues from a point already backed by
//! support rather than jumping straight into an overhang.

use crate::error::{MotionError, MotionResult};
use crate::nearest::{almost_equal, nearest_path, PathCloseMode};
use crate::simple::{plan_remaining, simple_motion_plan, StartState};
use crate::split::split_inside_outside;
use mrsp_core::geometry::{Path, Point, PolygonSet};
use tracing::debug;

/// Orders `paths` given a `support` region that previous slices have
/// already committed to solid material. Paths are split into the portion
/// resting on `support` (*inside*) and the portion hanging over open space
/// (*outside*); the two sets are then concatenated in alternation,
/// preferring to keep writing inside support whenever `keep_start_inside_support`
/// demands it. Falls back to [`simple_motion_plan`] whenever either
/// partition is empty, since there is then nothing to prefer between.
pub fn overhang_aware_motion_plan(
    state: &mut StartState,
    mode: PathCloseMode,
    support: &PolygonSet,
    keep_start_inside_support: bool,
    paths: Vec<Path>,
) -> MotionResult<Vec<Path>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let (mut inside, mut outside) = split_inside_outside(&paths, support);
    if inside.is_empty() || outside.is_empty() {
        debug!(
            inside = inside.len(),
            outside = outside.len(),
            "support split left one partition empty, deferring to the simple planner"
        );
        return simple_motion_plan(state, mode, paths);
    }

    let mut valid_in = vec![true; inside.len()];
    let mut valid_out = vec![true; outside.len()];
    let mut numvalid_in = inside.len();
    let mut numvalid_out = outside.len();
    let mut numvalid = numvalid_in + numvalid_out;
    let mut output: Vec<Path> = Vec::with_capacity(paths.len() + paths.len() / 10);

    let (idx_in, isfront_in) = if state.take_first_call() {
        (0, true)
    } else {
        nearest_path(state.start_near(), &inside, &valid_in, mode).ok_or_else(|| {
            MotionError::Inconsistent("no inside path to seed the overhang planner".to_string())
        })?
    };
    add_in_path(
        state,
        keep_start_inside_support,
        mode,
        &mut inside,
        &mut valid_in,
        &mut numvalid_in,
        &outside,
        &valid_out,
        &mut numvalid,
        idx_in,
        isfront_in,
        &mut output,
    )?;

    let mut tryoutfirst = true;
    while numvalid > 0 {
        if numvalid_in == 0 {
            if numvalid_out == 0 {
                break;
            }
            plan_remaining(state, mode, &mut outside, &mut valid_out, &mut numvalid_out, &mut output)?;
            break;
        }
        if numvalid_out == 0 {
            plan_remaining(state, mode, &mut inside, &mut valid_in, &mut numvalid_in, &mut output)?;
            break;
        }

        let concatenated = if tryoutfirst {
            tryoutfirst = false;
            try_to_concat(state, mode, &outside, &mut valid_out, &mut numvalid_out, &mut numvalid, &mut output)?
                || {
                    tryoutfirst = true;
                    try_to_concat(state, mode, &inside, &mut valid_in, &mut numvalid_in, &mut numvalid, &mut output)?
                }
        } else {
            tryoutfirst = true;
            try_to_concat(state, mode, &inside, &mut valid_in, &mut numvalid_in, &mut numvalid, &mut output)?
                || {
                    tryoutfirst = false;
                    try_to_concat(state, mode, &outside, &mut valid_out, &mut numvalid_out, &mut numvalid, &mut output)?
                }
        };
        if concatenated {
            continue;
        }

        // could not concatenate: jump to the nearest still-unused inside path
        tryoutfirst = true;
        let (next_idx, next_isfront) = nearest_path(state.start_near(), &inside, &valid_in, mode)
            .ok_or_else(|| MotionError::Inconsistent("inside set exhausted unexpectedly".to_string()))?;
        add_in_path(
            state,
            keep_start_inside_support,
            mode,
            &mut inside,
            &mut valid_in,
            &mut numvalid_in,
            &outside,
            &valid_out,
            &mut numvalid,
            next_idx,
            next_isfront,
            &mut output,
        )?;
    }

    Ok(output)
}

/// Tries to fuse the nearest still-unused path in `paths` onto `output`'s
/// running end without a travel move, i.e. the nearest candidate's
/// attachment endpoint must be "almost equal" to `output`'s current back.
/// Leaves `paths`/`valid` untouched and returns `false` when no fusion is
/// possible; the candidate stays available for a later round.
#[allow(clippy::too_many_arguments)]
fn try_to_concat(
    state: &mut StartState,
    mode: PathCloseMode,
    paths: &[Path],
    valid: &mut [bool],
    this_numvalid: &mut usize,
    numvalid: &mut usize,
    output: &mut Vec<Path>,
) -> MotionResult<bool> {
    let (idx, isfront) = nearest_path(state.start_near(), paths, valid, mode)
        .ok_or_else(|| MotionError::Inconsistent("tryToConcat found no candidate".to_string()))?;

    let candidate_end = if isfront {
        paths[idx].front()
    } else {
        paths[idx].back()
    }
    .ok_or_else(|| MotionError::Inconsistent("empty candidate path in tryToConcat".to_string()))?;

    let out_back = output
        .last()
        .and_then(Path::back)
        .ok_or_else(|| MotionError::Inconsistent("tryToConcat called with empty output".to_string()))?;

    if !almost_equal(out_back, candidate_end) {
        return Ok(false);
    }

    let mut pts = paths[idx].points.clone();
    if !isfront {
        pts.reverse();
    }
    let last = output.last_mut().unwrap();
    last.points.extend(pts.into_iter().skip(1));
    state.set_start_near(last.back().unwrap());

    valid[idx] = false;
    *this_numvalid -= 1;
    *numvalid -= 1;
    Ok(true)
}

/// Commits the inside path at `idx_in` (or a deliberately shortened/reversed
/// version of it) to `output`, applying `keepStartInsideSupport`'s rule:
/// avoid starting a write from a point that is only reachable by first
/// crossing an already-committed outside (overhang) toolpath's endpoint.
#[allow(clippy::too_many_arguments)]
fn add_in_path(
    state: &mut StartState,
    keep_start_inside_support: bool,
    mode: PathCloseMode,
    inside: &mut [Path],
    valid_in: &mut [bool],
    numvalid_in: &mut usize,
    outside: &[Path],
    valid_out: &[bool],
    numvalid: &mut usize,
    idx_in: usize,
    isfront_in: bool,
    output: &mut Vec<Path>,
) -> MotionResult<()> {
    if !isfront_in {
        inside[idx_in] = inside[idx_in].reversed();
    }
    let mut copy_full_path = true;

    if keep_start_inside_support {
        let front = inside[idx_in]
            .front()
            .ok_or_else(|| MotionError::Inconsistent("empty inside path in addInPath".to_string()))?;
        let (idx_out1, isfront_out1) = nearest_path(front, outside, valid_out, mode)
            .ok_or_else(|| MotionError::Inconsistent("no outside path available in addInPath".to_string()))?;
        let candidate1 = endpoint(&outside[idx_out1], isfront_out1);
        let front_is_extended = almost_equal(front, candidate1);

        if front_is_extended {
            let back = inside[idx_in].back().unwrap();
            let (idx_out2, isfront_out2) = nearest_path(back, outside, valid_out, mode)
                .ok_or_else(|| MotionError::Inconsistent("no outside path available in addInPath".to_string()))?;
            let candidate2 = endpoint(&outside[idx_out2], isfront_out2);
            let back_is_extended = almost_equal(back, candidate2);

            if back_is_extended {
                copy_full_path = false;
                let pts = inside[idx_in].points.clone();
                match pts.len() {
                    0 | 1 => {
                        return Err(MotionError::Inconsistent(
                            "degenerate inside path in addInPath".to_string(),
                        ))
                    }
                    2 => {
                        let mean = midpoint(pts[0], pts[1]);
                        output.push(Path::open(vec![mean, pts[1]]));
                        inside[idx_in] = Path::open(vec![pts[0], mean]);
                    }
                    n => {
                        let mid = n / 2;
                        output.push(Path::open(pts[mid..].to_vec()));
                        inside[idx_in] = Path::open(pts[..=mid].to_vec());
                    }
                }
            } else {
                inside[idx_in] = inside[idx_in].reversed();
            }
        }
    }

    if copy_full_path {
        let path = std::mem::replace(&mut inside[idx_in], Path::open(Vec::new()));
        output.push(path);
        valid_in[idx_in] = false;
        *numvalid_in -= 1;
        *numvalid -= 1;
    }

    state.set_start_near(output.last().and_then(Path::back).unwrap());
    Ok(())
}

fn endpoint(path: &Path, isfront: bool) -> Point {
    if isfront {
        path.front()
    } else {
        path.back()
    }
    .expect("nearest_path never returns a path with no endpoints")
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2, (a.y + b.y) / 2)
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
    fn falls_back_to_simple_planner_when_no_path_touches_support() {
        let mut state = StartState::new();
        let support = PolygonSet::new(vec![square(10)]);
        let paths = vec![Path::open(vec![Point::new(1000, 0), Point::new(1010, 0)])];
        let result =
            overhang_aware_motion_plan(&mut state, PathCloseMode::Open, &support, false, paths).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn orders_overhang_and_supported_paths_without_losing_points() {
        let mut state = StartState::new();
        let support = PolygonSet::new(vec![square(100)]);
        let paths = vec![
            Path::open(vec![Point::new(10, 10), Point::new(90, 10)]), // fully inside
            Path::open(vec![Point::new(50, 150), Point::new(50, 200)]), // fully outside
        ];
        let total_points: usize = paths.iter().map(|p| p.points.len()).sum();
        let result =
            overhang_aware_motion_plan(&mut state, PathCloseMode::Open, &support, false, paths).unwrap();
        let result_points: usize = result.iter().map(|p| p.points.len()).sum();
        assert_eq!(result_points, total_points);
    }
}
