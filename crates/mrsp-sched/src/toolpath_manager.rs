//! The toolpath manager (spec.md §3 `ToolpathManager`, §4.6): remembers
//! previously computed per-process contours, combines them with each
//! process's vertical voxel profile to reconstruct the already-filled
//! volume at an arbitrary Z, and subtracts that from new raw slices.
//! Grounded in `original_source/multi/3d.cpp`'s `ToolpathManager` (the
//! `applyContours`/`updateInputWithProfilesFromPreviousSlices` pair).

use crate::error::{SchedError, SchedResult};
use mrsp_core::error::CoreError;
use mrsp_core::slices::ResultSingleTool;
use mrsp_core::spec::{GlobalSpec, ProcessSpec};
use mrsp_core::PolygonSet;
use mrsp_geom::{clip, offset, ClipOp, EndType, JoinStyle};

/// Owns, per process, the ordered arena of committed [`ResultSingleTool`]s
/// (spec.md §9 Design Notes: "place all ResultSingleTools in per-tool
/// arenas indexed by position").
#[derive(Debug, Default)]
pub struct ToolpathManager {
    pub slices_for_tool: Vec<Vec<ResultSingleTool>>,
    /// Feedback contours keyed by Z, delivered by the caller out-of-band
    /// (spec.md §4.6 "Feedback contours").
    additional_additive_contours: Vec<(f64, PolygonSet)>,
}

impl ToolpathManager {
    pub fn new(num_processes: usize) -> Self {
        Self {
            slices_for_tool: (0..num_processes).map(|_| Vec::new()).collect(),
            additional_additive_contours: Vec::new(),
        }
    }

    /// Stores an externally measured additive contour at `z`, consumed by
    /// the next call to [`Self::update_input_with_profiles_from_previous_slices`]
    /// at a matching Z (spec.md §4.6 "Feedback contours").
    pub fn take_additional_additive_contours(&mut self, z: f64, contours: PolygonSet) {
        self.additional_additive_contours.push((z, contours));
    }

    fn use_contours_already_filled(k: usize, global: &GlobalSpec, process: &ProcessSpec) -> bool {
        k > 0 && !global.addsub_workflow_mode && process.radius_remove_common > 0
    }

    /// spec.md §4.6's core reconstruction: "start from the union of the
    /// required raw slices ...; subtract previously committed contours at
    /// each stored Z via `updateInputWithProfilesFromPreviousSlices`."
    /// Returns `(initial_contour, contours_already_filled)`.
    pub fn update_input_with_profiles_from_previous_slices(
        &self,
        processes: &[ProcessSpec],
        global: &GlobalSpec,
        raw_slice: &PolygonSet,
        z: f64,
        tool: usize,
    ) -> SchedResult<(PolygonSet, PolygonSet)> {
        let process_is_additive = !global.addsub_workflow_mode || tool == 0;
        let compute_already_filled = Self::use_contours_already_filled(tool, global, &processes[tool]);

        let mut subject = PolygonSet::empty();
        let mut clip_with = PolygonSet::empty();
        let mut already_filled = PolygonSet::empty();

        let mut ignore_stored_additive = false;
        for (fz, contours) in &self.additional_additive_contours {
            if (fz - z).abs() < global.z_epsilon {
                self.apply_contours(
                    contours,
                    0,
                    global,
                    process_is_additive,
                    compute_already_filled,
                    0.0,
                    &mut subject,
                    &mut clip_with,
                    &mut already_filled,
                )?;
                ignore_stored_additive = global.ignore_redundant_additive_contours;
                break;
            }
        }

        for (k, process) in processes.iter().enumerate() {
            if ignore_stored_additive {
                let contour_is_additive = !global.addsub_workflow_mode || k == 0;
                if contour_is_additive {
                    continue;
                }
            }
            let Some(profile) = process.profile.as_ref() else { continue };
            for stored in &self.slices_for_tool[k] {
                if stored.contours.is_empty() {
                    continue;
                }
                let current_width = profile.width(z - stored.z);
                if current_width <= 0.0 {
                    continue;
                }
                let diffwidth = process.radius as f64 - current_width;

                let source = if stored.infilling_contours.is_empty() {
                    &stored.contours
                } else {
                    &stored.infilling_contours[0] // each entry already independently offset; union below folds in the rest
                };
                self.apply_contours(
                    source,
                    k,
                    global,
                    process_is_additive,
                    compute_already_filled,
                    diffwidth,
                    &mut subject,
                    &mut clip_with,
                    &mut already_filled,
                )?;
                for extra in stored.infilling_contours.iter().skip(1) {
                    self.apply_contours(
                        extra,
                        k,
                        global,
                        process_is_additive,
                        compute_already_filled,
                        diffwidth,
                        &mut subject,
                        &mut clip_with,
                        &mut already_filled,
                    )?;
                }
                for medial in &stored.medial_axis_contours {
                    self.apply_contours(
                        medial,
                        k,
                        global,
                        process_is_additive,
                        compute_already_filled,
                        diffwidth,
                        &mut subject,
                        &mut clip_with,
                        &mut already_filled,
                    )?;
                }
            }
        }

        if process_is_additive {
            subject = union(raw_slice, &subject)?;
        } else {
            clip_with = union(raw_slice, &clip_with)?;
        }

        let initial_contour =
            clip(ClipOp::Difference, &subject, &clip_with, Default::default(), Default::default())
                .map_err(SchedError::Geom)?;

        Ok((initial_contour, already_filled))
    }

    /// Mirrors `ToolpathManager::applyContours`: folds one committed
    /// contour set (offset inward by `diffwidth` to account for the
    /// radius-vs-profile-width mismatch) into the running subject/clip/
    /// already-filled accumulators.
    #[allow(clippy::too_many_arguments)]
    fn apply_contours(
        &self,
        contours: &PolygonSet,
        ntool_contour: usize,
        global: &GlobalSpec,
        process_to_compute_is_additive: bool,
        compute_contours_already_filled: bool,
        diffwidth: f64,
        subject: &mut PolygonSet,
        clip_with: &mut PolygonSet,
        already_filled: &mut PolygonSet,
    ) -> SchedResult<()> {
        if contours.is_empty() {
            return Ok(());
        }
        let aux = if diffwidth == 0.0 {
            contours.clone()
        } else {
            offset(-diffwidth, contours, JoinStyle::Round, EndType::Closed).map_err(SchedError::Geom)?
        };
        if aux.is_empty() {
            return Ok(());
        }

        if global.addsub_workflow_mode {
            if ntool_contour == 0 {
                if process_to_compute_is_additive {
                    *clip_with = union(clip_with, &aux)?;
                } else {
                    *subject = union(subject, &aux)?;
                }
            } else if !process_to_compute_is_additive {
                *clip_with = union(clip_with, &aux)?;
            } else {
                // spec.md §9 Design Notes: documented as unreachable given
                // the "first 'add', all subsequent 'sub'" schedule
                // convention; a manual schedule that violates it is a bug.
                return Err(SchedError::Misuse(CoreError::BugMarker(
                    "applyContours: processToComputeIsAdditive true with a subtractive-tool contour (ntool_contour != 0)"
                        .to_string(),
                ).to_string()));
            }
        } else {
            debug_assert!(process_to_compute_is_additive, "non-addsub runs are always additive");
            if process_to_compute_is_additive {
                *clip_with = union(clip_with, &aux)?;
            }
            if compute_contours_already_filled {
                *already_filled = union(already_filled, &aux)?;
            }
        }
        Ok(())
    }

    /// `removeUsedSlicesNotReachableInZ` / `removeUsedSlicesBelowZ`: drops
    /// committed `ResultSingleTool`s no longer referenced by any pending
    /// `OutputSlice` once their Z has receded far enough behind the
    /// current sweep position (spec.md §4.6 "Garbage collection"),
    /// grounded in `original_source/multi/3d.hpp`'s two GC method names.
    pub fn remove_used_slices_past_z(&mut self, z: f64, slice_upwards: bool, num_requiring: impl Fn(usize, usize) -> usize) {
        for (tool, slices) in self.slices_for_tool.iter_mut().enumerate() {
            slices.retain(|s| {
                let past = if slice_upwards { s.z < z } else { s.z > z };
                !(s.used && past && num_requiring(tool, s.tool) == 0)
            });
        }
    }

    pub fn remove_additional_contours_past_z(&mut self, z: f64, slice_upwards: bool) {
        self.additional_additive_contours
            .retain(|(fz, _)| if slice_upwards { *fz >= z } else { *fz <= z });
    }
}

fn union(a: &PolygonSet, b: &PolygonSet) -> SchedResult<PolygonSet> {
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }
    clip(ClipOp::Union, a, b, Default::default(), Default::default()).map_err(SchedError::Geom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::geometry::{Path, Point};
    use mrsp_core::spec::VoxelProfile;

    fn square(side: i64) -> Path {
        Path::closed(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn additive_run_with_no_history_keeps_raw_slice() {
        let tm = ToolpathManager::new(1);
        let mut processes = vec![ProcessSpec::new(10, 1)];
        processes[0].profile = Some(VoxelProfile::constant(10.0, 5.0, 10.0));
        let global = GlobalSpec::default();
        let raw = PolygonSet::new(vec![square(100)]);
        let (initial, already_filled) = tm
            .update_input_with_profiles_from_previous_slices(&processes, &global, &raw, 0.0, 0)
            .unwrap();
        assert!(!initial.is_empty());
        assert!(already_filled.is_empty());
    }

    #[test]
    fn additive_run_subtracts_previous_committed_contour() {
        let mut tm = ToolpathManager::new(1);
        let mut processes = vec![ProcessSpec::new(10, 1)];
        processes[0].profile = Some(VoxelProfile::constant(10.0, 50.0, 10.0));
        let global = GlobalSpec::default();

        let mut previous = ResultSingleTool::new(0.0, 0);
        previous.contours = PolygonSet::new(vec![square(50)]);
        tm.slices_for_tool[0].push(previous);

        let raw = PolygonSet::new(vec![square(100)]);
        let (initial, _) = tm
            .update_input_with_profiles_from_previous_slices(&processes, &global, &raw, 1.0, 0)
            .unwrap();
        // The previously committed 50x50 square should have been carved
        // out of the 100x100 raw slice.
        assert!(!initial.is_empty());
    }

    #[test]
    fn feedback_contour_overrides_at_matching_z() {
        let mut tm = ToolpathManager::new(1);
        let processes = vec![ProcessSpec::new(10, 1)];
        let global = GlobalSpec::default();
        tm.take_additional_additive_contours(100.0, PolygonSet::new(vec![square(20)]));

        let raw = PolygonSet::new(vec![square(100)]);
        let (initial, _) = tm
            .update_input_with_profiles_from_previous_slices(&processes, &global, &raw, 100.0, 0)
            .unwrap();
        assert!(!initial.is_empty());
    }
}
