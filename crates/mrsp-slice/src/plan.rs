//! Step 10: union the medial-axis lines into the toolpath set and run
//! motion planning (spec.md §4.5), grounded in
//! `original_source/multi/multislicer.cpp`'s end-of-`applyProcess` logic.
//!
//! The original supports both a "lumped" policy (contour toolpaths,
//! infilling toolpaths and every medial-axis sweep's lines all planned
//! together in one pass) and a "partitioned" one (contours planned first,
//! infillings/medial-axis planned separately) behind a compile-time
//! `LUMP_CONTOURS_AND_INFILLINGS_TOGETHER` flag that is always `true` in
//! that source tree; only the lumped policy is implemented here.

use crate::error::{tag, SliceResult};
use mrsp_core::{Path, PolygonSet};
use mrsp_motion::{overhang_aware_motion_plan, simple_motion_plan, PathCloseMode, StartState};

pub const STEP: &str = "motion_plan";

/// Support context for the overhang-aware planner, supplied by the caller
/// (the C6 scheduler) when a previous slice's committed contours are
/// available to plan against.
pub struct OverhangSupport<'a> {
    pub region: &'a PolygonSet,
    pub keep_start_inside_support: bool,
}

/// Merges every line source into one toolpath set and, if
/// `apply_motion_planner`, runs C4 over the result.
pub fn union_and_plan(
    process_index: usize,
    apply_motion_planner: bool,
    state: &mut StartState,
    support: Option<OverhangSupport<'_>>,
    mut toolpaths: Vec<Path>,
    infilling_toolpaths: Vec<Path>,
    infilling_medial_lines: Vec<Path>,
    contour_medial_lines: Vec<Path>,
) -> SliceResult<Vec<Path>> {
    toolpaths.extend(infilling_toolpaths);
    toolpaths.extend(infilling_medial_lines);
    toolpaths.extend(contour_medial_lines);

    if !apply_motion_planner {
        return Ok(toolpaths);
    }

    match support {
        Some(s) => overhang_aware_motion_plan(
            state,
            PathCloseMode::Open,
            s.region,
            s.keep_start_inside_support,
            toolpaths,
        )
        .map_err(tag(process_index, STEP)),
        None => simple_motion_plan(state, PathCloseMode::Open, toolpaths).map_err(tag(process_index, STEP)),
    }
}
