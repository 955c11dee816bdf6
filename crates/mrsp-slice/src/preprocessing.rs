//! Step 1: pre-processing removal of unreachable detail (spec.md §4.5),
//! grounded in `original_source/multi/multislicer.cpp`'s
//! `removeHighResDetails`/`overwriteHighResDetails`.

use crate::error::{tag, SliceResult};
use mrsp_core::spec::ProcessSpec;
use mrsp_core::PolygonSet;
use mrsp_geom::{clip, offset, offset2, ClipOp, EndType, JoinStyle};

pub const STEP: &str = "preprocessing";

/// Removes detail the next (finer or coarser) tool could never reproduce.
/// `next` is the following process in the same pass, when one exists;
/// `next_same_kind` says whether it operates on the same kind of material
/// (additive vs. subtractive) as `process`.
pub fn preprocess(
    process_index: usize,
    process: &ProcessSpec,
    next: Option<&ProcessSpec>,
    next_same_kind: bool,
    is_last_tool: bool,
    contours_to_fill: &PolygonSet,
) -> SliceResult<PolygonSet> {
    if !process.do_preprocessing || is_last_tool || next.is_none() {
        return Ok(contours_to_fill.clone());
    }
    let next = next.unwrap();

    if next_same_kind {
        let radius = process.radius as f64;
        let opened = offset2(-radius, radius, contours_to_fill, JoinStyle::Round, EndType::Closed)
            .map_err(tag(process_index, STEP))?;
        remove_high_res_details(process_index, process, next, &opened)
    } else {
        // No same-kind successor to preserve detail for: overwrite small
        // positive/negative detail directly, without opening first.
        overwrite_high_res_details(process_index, process, contours_to_fill)
    }
}

/// `removeHighResDetails`: preserves genuine narrow features at the current
/// tool's scale while discarding spurious detail `opened` introduced.
fn remove_high_res_details(
    process_index: usize,
    process: &ProcessSpec,
    next: &ProcessSpec,
    opened: &PolygonSet,
) -> SliceResult<PolygonSet> {
    let substep = process.substep();

    let closed = offset2(substep, -substep, opened, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP))?;

    let mut lowres = clip(ClipOp::Difference, &closed, opened, Default::default(), Default::default())
        .map_err(tag(process_index, STEP))?;

    // Small opening at the next (finer) tool's scale, to remove phantom
    // strips the difference above tends to leave behind.
    let next_radius = next.radius as f64;
    lowres = offset2(-next_radius, next_radius, &lowres, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP))?;

    let dilated = offset(process.dilatestep(), &lowres, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP))?;

    clip(ClipOp::Difference, opened, &dilated, Default::default(), Default::default())
        .map_err(tag(process_index, STEP))
}

/// `overwriteHighResDetails`: closes `contours` at the `negFactor` scale,
/// filling small negative detail (and, symmetrically, erasing small
/// positive detail) neither this tool nor its successor could resolve.
fn overwrite_high_res_details(
    process_index: usize,
    process: &ProcessSpec,
    contours: &PolygonSet,
) -> SliceResult<PolygonSet> {
    let neg_factor = process.neg_factor();
    offset2(neg_factor, -neg_factor, contours, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP))
}
