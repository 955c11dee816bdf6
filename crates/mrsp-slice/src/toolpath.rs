//! Steps 2-6: offset to the toolpath, snap/clearance/burr, emit as
//! closed-open paths, back-compute the committed contour, and discard
//! arcs already covered by a lower-resolution pass (spec.md §4.5),
//! grounded in `original_source/multi/multislicer.cpp`'s
//! `generateToolPath`/`doDiscardCommonToolPaths`.

use crate::error::{tag, SliceResult};
use mrsp_core::geometry::nesting_info;
use mrsp_core::spec::ProcessSpec;
use mrsp_core::{Path, PolygonSet};
use mrsp_geom::{offset, offset2, EndType, JoinStyle};
use mrsp_snap::{snap_paths, GridSpec, SnapMode};

pub const STEP_TOOLPATH: &str = "toolpath";
pub const STEP_SNAP: &str = "snap";
pub const STEP_DISCARD_COMMON: &str = "discard_common";

/// Step 2: `temp = offset(-radius, contour)`.
pub fn offset_to_toolpath(
    process_index: usize,
    process: &ProcessSpec,
    contour: &PolygonSet,
) -> SliceResult<PolygonSet> {
    offset(-(process.radius as f64), contour, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP_TOOLPATH))
}

/// Step 3: snap/clearance/burr. `next_same_kind` selects between the
/// dilate-only snap used against a dissimilar successor and the
/// opening-then-erode snap used between two same-kind tools; `maxdist`
/// is [`ProcessSpec::grid_maxdist`], passed in so callers that build one
/// `GridSpec` per process don't pay for it twice.
#[allow(clippy::too_many_arguments)]
pub fn snap_clearance_burr(
    process_index: usize,
    process: &ProcessSpec,
    next_same_kind: bool,
    maxdist: f64,
    grid: &GridSpec,
    temp: PolygonSet,
) -> SliceResult<PolygonSet> {
    if process.apply_snap {
        let opened = if next_same_kind {
            let safestep = process.safestep(maxdist);
            offset2(-safestep, safestep, &temp, JoinStyle::Round, EndType::Closed)
                .map_err(tag(process_index, STEP_SNAP))?
        } else {
            temp
        };
        let mode = if next_same_kind { SnapMode::Erode } else { SnapMode::Dilate };
        let mut grid = *grid;
        grid.mode = mode;
        snap_polygon_set(process_index, &opened, &grid)
    } else if process.add_internal_clearance {
        let r = process.radius as f64;
        offset2(-r, r, &temp, JoinStyle::Round, EndType::Closed).map_err(tag(process_index, STEP_TOOLPATH))
    } else if process.burr_length > 0 {
        // The original sets a miter limit before this offset but passes
        // `jtSquare`, which ignores it; what actually runs is a square join.
        let b = process.burr_length as f64;
        offset2(-b, b, &temp, JoinStyle::Square, EndType::Closed).map_err(tag(process_index, STEP_TOOLPATH))
    } else {
        Ok(temp)
    }
}

fn snap_polygon_set(process_index: usize, set: &PolygonSet, grid: &GridSpec) -> SliceResult<PolygonSet> {
    let info = nesting_info(&set.paths);
    let is_hole: Vec<bool> = info.iter().map(|n| n.depth % 2 == 1).collect();
    let snapped = snap_paths(&set.paths, &is_hole, grid).map_err(tag(process_index, STEP_SNAP))?;
    Ok(PolygonSet::with_fill(snapped, set.fill))
}

/// Step 4: emit every path as a closed-open path (first point repeated at
/// the end), appended to `toolpaths`.
pub fn emit_closed_open(toolpaths: &mut Vec<Path>, temp: &PolygonSet) {
    toolpaths.extend(temp.paths.iter().map(Path::as_closed_open));
}

/// Step 5: back-compute the committed contour as `offset(+radius, temp)`.
pub fn committed_contour(
    process_index: usize,
    process: &ProcessSpec,
    temp: &PolygonSet,
) -> SliceResult<PolygonSet> {
    offset(process.radius as f64, temp, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP_TOOLPATH))
}

/// Step 6: discard the arcs of `toolpaths` that lie within
/// `radius + radiusRemoveCommon` of `contours_already_filled`, keeping only
/// the part that does not overlap a lower-resolution pass's own toolpath.
/// Reuses the open/closed split already built for motion planning
/// (spec.md §4.4's clip-intersection/clip-difference), since "keep the
/// part outside this region" is exactly its *outside* half.
pub fn discard_common_arcs(
    process_index: usize,
    process: &ProcessSpec,
    toolpaths: Vec<Path>,
    contours_already_filled: &PolygonSet,
) -> SliceResult<Vec<Path>> {
    if process.radius_remove_common <= 0 || contours_already_filled.is_empty() {
        return Ok(toolpaths);
    }
    let inflate = process.radius as f64 + process.radius_remove_common as f64;
    let region = offset(inflate, contours_already_filled, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP_DISCARD_COMMON))?;
    let (_inside, outside) = mrsp_motion::split_inside_outside(&toolpaths, &region);
    Ok(outside)
}
