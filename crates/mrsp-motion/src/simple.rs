//! The greedy nearest-endpoint planner (spec.md §4.4 "Simple planner"),
//! grounded in `original_source/multi/motionPlanner.cpp`'s
//! `verySimpleMotionPlanner`/`verySimpleMotionPlannerHelper`.

use crate::error::{MotionError, MotionResult};
use crate::nearest::{nearest_path, PathCloseMode};
use mrsp_core::geometry::{Path, Point};

/// Carries the `start_near` point across calls to the planners, the way a
/// single `StartState` is threaded across slices in the original so that
/// the planner for slice N+1 continues from where slice N's toolpaths left
/// off instead of resetting to an arbitrary point.
#[derive(Debug, Clone, Copy)]
pub struct StartState {
    start_near: Point,
    initialized: bool,
}

impl StartState {
    /// A state with no prior history: the first call seeds `start_near`
    /// from the first input path it is given instead of an arbitrary point.
    pub fn new() -> Self {
        StartState {
            start_near: Point::new(0, 0),
            initialized: false,
        }
    }

    pub fn seeded_at(point: Point) -> Self {
        StartState {
            start_near: point,
            initialized: true,
        }
    }

    pub fn start_near(&self) -> Point {
        self.start_near
    }

    pub(crate) fn set_start_near(&mut self, point: Point) {
        self.start_near = point;
    }

    /// Consumes the "not yet initialized" flag, returning `true` only the
    /// first time it is called on a given state.
    pub(crate) fn take_first_call(&mut self) -> bool {
        let was_uninitialized = !self.initialized;
        self.initialized = true;
        was_uninitialized
    }
}

impl Default for StartState {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the main greedy loop shared by the simple planner and (as a
/// fallback) the overhang-aware planner once one of its partitions is
/// exhausted: repeatedly takes the nearest remaining path, reverses it if
/// its back endpoint won, and either fuses it onto the running output or
/// appends it as a new output path.
pub(crate) fn plan_remaining(
    state: &mut StartState,
    mode: PathCloseMode,
    paths: &mut Vec<Path>,
    valid: &mut [bool],
    numvalid: &mut usize,
    output: &mut Vec<Path>,
) -> MotionResult<()> {
    while *numvalid > 0 {
        let (idx, isfront) = nearest_path(state.start_near, paths, valid, mode).ok_or_else(|| {
            MotionError::Inconsistent(
                "nearest_path found nothing while numvalid > 0 in plan_remaining".to_string(),
            )
        })?;
        valid[idx] = false;
        *numvalid -= 1;

        let mut path = std::mem::replace(&mut paths[idx], Path::open(Vec::new()));
        if !isfront {
            path = path.reversed();
        }

        let should_fuse = match (output.last().and_then(Path::back), path.front()) {
            (Some(back), Some(front)) => back == front,
            _ => false,
        };
        if should_fuse {
            let last = output.last_mut().unwrap();
            last.points.extend(path.points.into_iter().skip(1));
        } else {
            output.push(path);
        }

        state.start_near = output.last().and_then(Path::back).unwrap();
    }
    Ok(())
}

/// The public entry point for spec.md §4.4's simple planner: orders `paths`
/// in place, fusing adjacent paths whose endpoints already coincide and
/// reversing any path whose back endpoint is the nearer attachment point.
pub fn simple_motion_plan(
    state: &mut StartState,
    mode: PathCloseMode,
    paths: Vec<Path>,
) -> MotionResult<Vec<Path>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let mut paths = paths;
    let mut valid = vec![true; paths.len()];
    let mut numvalid = paths.len();
    let mut output = Vec::with_capacity(paths.len());

    if !state.initialized {
        state.initialized = true;
        valid[0] = false;
        numvalid -= 1;
        let first = std::mem::replace(&mut paths[0], Path::open(Vec::new()));
        state.start_near = first.back().unwrap_or(Point::new(0, 0));
        output.push(first);
    }

    plan_remaining(state, mode, &mut paths, &mut valid, &mut numvalid, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(points: &[(i64, i64)]) -> Path {
        Path::open(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn orders_by_nearest_endpoint_and_reverses_as_needed() {
        let mut state = StartState::new();
        let paths = vec![
            open(&[(100, 0), (110, 0)]),
            open(&[(9, 0), (0, 0)]), // back end (0,0) is near the seeded start
        ];
        let result = simple_motion_plan(&mut state, PathCloseMode::Open, paths).unwrap();
        // first path becomes the seed (index 0 always seeds), second gets
        // visited next because its nearer endpoint (back) is closest to
        // where the seed path ended.
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn fuses_coincident_endpoints_into_one_output_path() {
        let mut state = StartState::new();
        let paths = vec![open(&[(0, 0), (10, 0)]), open(&[(10, 0), (20, 0)])];
        let result = simple_motion_plan(&mut state, PathCloseMode::Open, paths).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].points, vec![Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let mut state = StartState::new();
        let result = simple_motion_plan(&mut state, PathCloseMode::Open, Vec::new()).unwrap();
        assert!(result.is_empty());
    }
}
