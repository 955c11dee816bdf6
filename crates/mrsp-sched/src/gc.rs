//! Garbage collection (spec.md §4.6 "Garbage collection"): once a raw
//! slice/result/feedback contour is both unreferenced and far enough
//! behind the current sweep Z, it is dropped. The retention span is
//! `4.1 * sliceHeight_0`, grounded in `original_source/multi/3d.cpp`'s
//! `removeUsedSlicesNotReachableInZ`/`removeUsedSlicesBelowZ`.

use crate::dependencies::gc_retention_span;
use crate::toolpath_manager::ToolpathManager;
use mrsp_core::slices::RawSlice;
use mrsp_core::spec::{GlobalSpec, ProcessSpec};

/// Drops raw slices and committed results that are both unreferenced and
/// past `current_z` by more than the retention span.
pub fn collect(
    processes: &[ProcessSpec],
    global: &GlobalSpec,
    current_z: f64,
    raws: &mut [RawSlice],
    tm: &mut ToolpathManager,
    num_requiring: impl Fn(usize, usize) -> usize,
) {
    let span = gc_retention_span(processes);
    if span <= 0.0 {
        return;
    }
    let past_threshold = |z: f64| -> bool {
        if global.slice_upwards {
            current_z - z > span
        } else {
            z - current_z > span
        }
    };

    for raw in raws.iter_mut() {
        if raw.num_remaining_uses == 0 && raw.was_used && past_threshold(raw.z) {
            raw.polygons = mrsp_core::PolygonSet::empty();
        }
    }

    tm.remove_used_slices_past_z(current_z - span, global.slice_upwards, &num_requiring);
    tm.remove_additional_contours_past_z(current_z - span, global.slice_upwards);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::slices::ResultSingleTool;
    use mrsp_core::spec::VoxelProfile;
    use mrsp_core::PolygonSet;

    #[test]
    fn drops_fully_released_raw_slice_past_threshold() {
        let mut processes = vec![ProcessSpec::new(75, 10)];
        processes[0].profile = Some(VoxelProfile::constant(75.0, 50.0, 100.0));
        let global = GlobalSpec::default();
        let mut raws = vec![RawSlice::empty(0.0)];
        raws[0].deliver(PolygonSet::empty());
        raws[0].was_used = true;
        raws[0].num_remaining_uses = 0;

        let mut tm = ToolpathManager::new(1);
        collect(&processes, &global, 1000.0, &mut raws, &mut tm, |_, _| 0);
        assert!(raws[0].polygons.is_empty());
    }

    #[test]
    fn keeps_results_still_required() {
        let mut processes = vec![ProcessSpec::new(75, 10)];
        processes[0].profile = Some(VoxelProfile::constant(75.0, 50.0, 100.0));
        let global = GlobalSpec::default();
        let mut tm = ToolpathManager::new(1);
        let mut result = ResultSingleTool::new(0.0, 0);
        result.used = true;
        tm.slices_for_tool[0].push(result);
        let mut raws: Vec<RawSlice> = Vec::new();

        collect(&processes, &global, 1000.0, &mut raws, &mut tm, |_, _| 1);
        assert_eq!(tm.slices_for_tool[0].len(), 1);
    }
}
