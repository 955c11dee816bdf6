//! Cross-slice contour dependencies (spec.md §4.6 "Cross-slice contour
//! dependencies (surface / always-supported / overhang)"): for every
//! `OutputSlice` whose process asks for support, overhang, or surface
//! differentiation, find the neighboring `OutputSlice`s within a Z window
//! and wire up `required_contours_for_*` / `num_slices_requiring_this_one`.

use mrsp_core::slices::OutputSlice;
use mrsp_core::spec::{GlobalSpec, ProcessSpec};

/// `4.1 * sliceHeight_0` where tool 0 is always the coarsest (spec.md §4.6
/// "Garbage collection"); exposed so the scheduler's GC sweep shares it.
pub fn gc_retention_span(processes: &[ProcessSpec]) -> f64 {
    let Some(coarsest) = processes.first().and_then(|p| p.profile.as_ref()) else {
        return 0.0;
    };
    4.1 * coarsest.slice_height()
}

/// Populates `required_contours_for_support/overhang/surface` and
/// `num_slices_requiring_this_one` on every slice in `outputs`, using each
/// process's voxel profile and the global extent factors. `outputs` must
/// already be in output order.
pub fn compute_cross_slice_dependencies(
    processes: &[ProcessSpec],
    global: &GlobalSpec,
    outputs: &mut [OutputSlice],
) {
    // Reset before recomputation so this can be re-run idempotently.
    for o in outputs.iter_mut() {
        o.required_contours_for_support.clear();
        o.required_contours_for_overhang.clear();
        o.required_contours_for_surface.clear();
        o.num_slices_requiring_this_one = 0;
        o.recompute_required_after_support = false;
        o.recompute_required_after_overhang = false;
    }

    for i in 0..outputs.len() {
        let tool = outputs[i].tool;
        let Some(process) = processes.get(tool) else { continue };
        let Some(profile) = process.profile.as_ref() else { continue };

        let wants_support = global.overhang_always_supported;
        let wants_overhang = !global.overhang_always_supported;
        let wants_surface = global.differentiate_surface;
        if !wants_support && !wants_overhang && !wants_surface {
            continue;
        }

        let base_extent = profile.voxel_semi_height();
        let support_window = base_extent * global.always_supported_extent_factor + 0.1;
        let overhang_window = base_extent * global.consider_overhang_extent_factor + 0.1;
        let surface_window = base_extent * global.differentiate_surface_extent_factor + 0.1;

        let z = outputs[i].z;
        let below_is_support = global.slice_upwards; // "below" = already printed, one-sided per slicing direction

        let mut support = Vec::new();
        let mut overhang = Vec::new();
        let mut surface = Vec::new();

        for (j, other) in outputs.iter().enumerate() {
            if j == i {
                continue;
            }
            let dz = other.z - z;
            let is_below = if below_is_support { dz < 0.0 } else { dz > 0.0 };
            let is_above = !is_below && dz != 0.0;

            if wants_support && is_below && dz.abs() <= support_window {
                support.push(j);
            }
            if wants_overhang && is_below && dz.abs() <= overhang_window {
                overhang.push(j);
            }
            if wants_surface && (is_below || is_above) && dz.abs() <= surface_window {
                surface.push(j);
            }
        }

        let has_overhang = !overhang.is_empty();
        let has_surface = !surface.is_empty();
        let recompute_after_support = !support.is_empty() && !has_overhang;
        let recompute_after_overhang = has_overhang != has_surface;

        for &j in &support {
            outputs[j].num_slices_requiring_this_one += 1;
        }
        for &j in &overhang {
            outputs[j].num_slices_requiring_this_one += 1;
        }
        for &j in &surface {
            outputs[j].num_slices_requiring_this_one += 1;
        }

        let o = &mut outputs[i];
        o.required_contours_for_support = support;
        o.required_contours_for_overhang = overhang;
        o.required_contours_for_surface = surface;
        o.recompute_required_after_support = recompute_after_support;
        o.recompute_required_after_overhang = recompute_after_overhang;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::spec::VoxelProfile;

    fn outputs_at(zs: &[f64]) -> Vec<OutputSlice> {
        zs.iter().map(|&z| OutputSlice::new(z, 0)).collect()
    }

    #[test]
    fn no_windowed_features_leaves_dependencies_empty() {
        let mut processes = vec![ProcessSpec::new(10, 1)];
        processes[0].profile = Some(VoxelProfile::constant(10.0, 5.0, 10.0));
        let global = GlobalSpec::default();
        let mut outputs = outputs_at(&[0.0, 10.0, 20.0]);
        compute_cross_slice_dependencies(&processes, &global, &mut outputs);
        assert!(outputs.iter().all(|o| o.required_contours_for_support.is_empty()));
    }

    #[test]
    fn support_window_references_slices_below() {
        let mut processes = vec![ProcessSpec::new(10, 1)];
        processes[0].profile = Some(VoxelProfile::constant(10.0, 5.0, 10.0));
        let mut global = GlobalSpec::default();
        global.overhang_always_supported = true;
        global.always_supported_extent_factor = 1.0;
        let mut outputs = outputs_at(&[0.0, 4.0, 20.0]);
        compute_cross_slice_dependencies(&processes, &global, &mut outputs);
        assert_eq!(outputs[1].required_contours_for_support, vec![0]);
        assert_eq!(outputs[0].num_slices_requiring_this_one, 1);
    }
}
