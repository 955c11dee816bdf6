//! Step 9: medial-axis recovery of narrow regions, run once over the
//! infilling area and once over the main contour (spec.md §4.5), grounded
//! in `original_source/multi/medialaxis.cpp`'s use from the multislicer.

use crate::error::{tag, SliceResult};
use crate::holes::group_into_holed_polygons;
use mrsp_core::spec::ProcessSpec;
use mrsp_core::{Path, PolygonSet};
use mrsp_geom::{offset, EndType, JoinStyle};
use mrsp_medial::medial_axis;

pub const STEP: &str = "medial_axis";

/// Accumulated effect of running the medial-axis recovery over one shape
/// (the infilling area, or the main contour) across every factor in
/// `medial_axis_factors`, from large (coarse) to small (fine).
pub struct MedialOutput {
    /// Raw medial-axis polylines, to be emitted as toolpaths.
    pub lines: Vec<Path>,
    /// `offset(+radius, lines)` for each factor, kept independently for
    /// cross-slice dependency tracking (one contour per factor level).
    pub inflated_contours: Vec<PolygonSet>,
    /// The shape with every recovered line's inflated footprint subtracted
    /// out, i.e. what remains unrecovered after the whole sweep.
    pub remaining_shape: PolygonSet,
}

/// Runs the sweep described by spec.md §4.5 step 9 over `shape`, using
/// `factors` (already validated strictly-decreasing by
/// [`ProcessSpec::validate`]).
pub fn recover_medial_axis(
    process_index: usize,
    process: &ProcessSpec,
    factors: &[f64],
    shape: &PolygonSet,
) -> SliceResult<MedialOutput> {
    let radius = process.radius as f64;
    let mut current = shape.clone();
    let mut lines = Vec::new();
    let mut inflated_contours = Vec::new();

    for &f in factors {
        if current.is_empty() {
            break;
        }
        let eroded = offset(-radius * f, &current, JoinStyle::Round, EndType::Closed)
            .map_err(tag(process_index, STEP))?;
        if eroded.is_empty() {
            continue;
        }

        let min_width = radius * f / 2.0;
        let max_width = radius * f * 2.0;
        let mut factor_lines = Vec::new();
        for hp in group_into_holed_polygons(&eroded.paths) {
            let found = medial_axis(&hp, min_width, max_width).map_err(tag(process_index, STEP))?;
            factor_lines.extend(found);
        }
        if factor_lines.is_empty() {
            continue;
        }

        let line_set = PolygonSet::new(factor_lines.clone());
        let inflated = offset(radius, &line_set, JoinStyle::Round, EndType::Round)
            .map_err(tag(process_index, STEP))?;

        current = subtract(process_index, &current, &inflated)?;
        lines.extend(factor_lines);
        inflated_contours.push(inflated);
    }

    Ok(MedialOutput { lines, inflated_contours, remaining_shape: current })
}

fn subtract(process_index: usize, a: &PolygonSet, b: &PolygonSet) -> SliceResult<PolygonSet> {
    mrsp_geom::clip(
        mrsp_geom::ClipOp::Difference,
        a,
        b,
        Default::default(),
        Default::default(),
    )
    .map_err(tag(process_index, STEP))
}
