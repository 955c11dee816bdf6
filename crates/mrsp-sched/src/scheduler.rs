//! The top-level driver (spec.md §4.6 "Ready raw-slice processing loop",
//! "Output hand-out"), grounded in `original_source/multi/3d.hpp`'s
//! `SimpleSlicingScheduler`: owns the built schedule, the toolpath
//! manager's arenas, and the caller-facing `compute_next_input_slices` /
//! `give_next_output_slice` loop.

use crate::dependencies::compute_cross_slice_dependencies;
use crate::error::{SchedError, SchedResult};
use crate::gc;
use crate::schedule::{build_schedule, BuiltSchedule};
use crate::toolpath_manager::ToolpathManager;
use mrsp_core::slices::ResultSingleTool;
use mrsp_core::spec::{GlobalSpec, ProcessSpec};
use mrsp_core::PolygonSet;
use mrsp_geom::{clip, offset, ClipOp, EndType, JoinStyle};
use mrsp_slice::plan::OverhangSupport;
use mrsp_slice::{apply_phase1, apply_phase2, Phase1Output, ProcessPosition};
use mrsp_motion::StartState;

const GC_EVERY: usize = 8;

/// Partial per-output state between Phase-1 completion and Phase-2.
struct Pending {
    phase1: Phase1Output,
}

/// Drives the scheduled `(input, output, raw)` triple through Phase-1/
/// Phase-2, honoring cross-slice dependencies and periodic garbage
/// collection.
pub struct SimpleSlicingScheduler {
    processes: Vec<ProcessSpec>,
    global: GlobalSpec,
    schedule: BuiltSchedule,
    tm: ToolpathManager,
    motion_state: Vec<StartState>,
    pending: Vec<Option<Pending>>,
    phase1_done: Vec<bool>,
    next_input_idx: usize,
    next_give_idx: usize,
}

impl SimpleSlicingScheduler {
    pub fn new(processes: Vec<ProcessSpec>, global: GlobalSpec, zmin: f64, zmax: f64) -> Self {
        let mut schedule = build_schedule(&processes, &global, zmin, zmax);
        compute_cross_slice_dependencies(&processes, &global, &mut schedule.outputs);
        let tm = ToolpathManager::new(processes.len());
        let motion_state = (0..processes.len()).map(|_| StartState::new()).collect();
        let num_outputs = schedule.outputs.len();
        Self {
            processes,
            global,
            schedule,
            tm,
            motion_state,
            pending: (0..num_outputs).map(|_| None).collect(),
            phase1_done: vec![false; num_outputs],
            next_input_idx: 0,
            next_give_idx: 0,
        }
    }

    /// The Z values the mesh slicer should be asked for, in schedule order
    /// (spec.md §5 "RawSlice reception order matches the `rawZs` schedule").
    pub fn raw_zs(&self) -> Vec<f64> {
        self.schedule.raws.iter().map(|r| r.z).collect()
    }

    /// Delivers one raw slice's geometry (spec.md §5's "single contiguous
    /// read of a length-prefixed payload" boundary, already decoded by the
    /// caller).
    pub fn deliver_raw_slice(&mut self, raw_idx: usize, polygons: PolygonSet) -> SchedResult<()> {
        let raw = self
            .schedule
            .raws
            .get_mut(raw_idx)
            .ok_or_else(|| SchedError::Misuse(format!("no such raw slice {raw_idx}")))?;
        raw.deliver(polygons);
        Ok(())
    }

    /// Delivers an externally measured additive contour (spec.md §4.6
    /// "Feedback contours").
    pub fn deliver_feedback_contour(&mut self, z: f64, contours: PolygonSet) {
        self.tm.take_additional_additive_contours(z, contours);
    }

    fn raw_ready(&self, input_idx: usize) -> bool {
        match self.schedule.inputs.get(input_idx) {
            Some(input) => input
                .required_raw_slices
                .iter()
                .all(|&ri| self.schedule.raws[ri].is_filled()),
            None => false,
        }
    }

    /// spec.md §4.6 "Ready raw-slice processing loop": advances through
    /// every input whose required raw slices are resident, then retries
    /// every Phase-1-complete, Phase-2-pending slice.
    pub fn compute_next_input_slices(&mut self) -> SchedResult<()> {
        while self.next_input_idx < self.schedule.inputs.len() && self.raw_ready(self.next_input_idx) {
            self.compute_one_input(self.next_input_idx)?;
            self.next_input_idx += 1;
            if self.next_input_idx % GC_EVERY == 0 {
                self.garbage_collect();
            }
        }
        self.process_ready_slices_phase2()?;
        Ok(())
    }

    fn current_z(&self) -> f64 {
        self.schedule
            .inputs
            .get(self.next_input_idx.saturating_sub(1))
            .map(|i| i.z)
            .unwrap_or(0.0)
    }

    fn garbage_collect(&mut self) {
        let z = self.current_z();
        let outputs = &self.schedule.outputs;
        gc::collect(
            &self.processes,
            &self.global,
            z,
            &mut self.schedule.raws,
            &mut self.tm,
            |tool, _result_tool| {
                outputs
                    .iter()
                    .filter(|o| o.tool == tool)
                    .map(|o| o.num_slices_requiring_this_one)
                    .sum()
            },
        );
    }

    /// Builds the input contour for `input_idx`, runs Phase-1, and — if no
    /// Phase-2 dependencies are pending — runs Phase-2 immediately.
    fn compute_one_input(&mut self, input_idx: usize) -> SchedResult<()> {
        let (z, tool, output_index, required_raw) = {
            let input = &self.schedule.inputs[input_idx];
            (input.z, input.tool, input.output_index, input.required_raw_slices.clone())
        };
        let process = self.processes[tool].clone();

        let mut raw_union = PolygonSet::empty();
        for &ri in &required_raw {
            let raw = &self.schedule.raws[ri];
            let scaled = match &process.profile {
                Some(profile) if raw.z != z => {
                    let width = profile.width(z - raw.z);
                    if width <= 0.0 {
                        continue;
                    }
                    let diffwidth = process.radius as f64 - width;
                    if diffwidth == 0.0 {
                        raw.polygons.clone()
                    } else {
                        offset(-diffwidth, &raw.polygons, JoinStyle::Round, EndType::Closed)
                            .map_err(SchedError::Geom)?
                    }
                }
                _ => raw.polygons.clone(),
            };
            raw_union = union(&raw_union, &scaled)?;
        }

        let (mut contour, already_filled) = self
            .tm
            .update_input_with_profiles_from_previous_slices(&self.processes, &self.global, &raw_union, z, tool)?;

        if process.ensure_attachment_offset != 0.0 {
            contour = self.ensure_attachment(&contour, &process, &already_filled)?;
        }

        let support_union = self.gather_support_contours(output_index)?;
        if !support_union.is_empty() {
            let support = if process.support_offset != 0.0 {
                offset(process.support_offset, &support_union, JoinStyle::Round, EndType::Closed)
                    .map_err(SchedError::Geom)?
            } else {
                support_union
            };
            contour = clip(ClipOp::Intersection, &contour, &support, Default::default(), Default::default())
                .map_err(SchedError::Geom)?;
        }

        let pos = ProcessPosition::new(tool, self.processes.len(), self.global.addsub_workflow_mode);
        let next = self.processes.get(tool + 1).cloned();
        let phase1 = apply_phase1(pos, &process, next.as_ref(), &contour, &already_filled)?;

        self.phase1_done[output_index] = true;
        let has_deps = self.schedule.outputs[output_index].has_phase2_dependencies();
        if has_deps {
            self.pending[output_index] = Some(Pending { phase1 });
        } else {
            self.finish_phase2(output_index, phase1)?;
        }
        Ok(())
    }

    /// Union of the Phase-1 contours of `output_idx`'s support dependencies,
    /// used as the precomputed overhang support when Phase-2 runs inline
    /// (spec.md §4.6 "any precomputed overhang support").
    fn gather_support_contours(&self, output_idx: usize) -> SchedResult<PolygonSet> {
        let deps = self.schedule.outputs[output_idx].required_contours_for_support.clone();
        let mut acc = PolygonSet::empty();
        for dep in deps {
            let Some(contours) = self.dependency_contours(dep) else {
                return Err(SchedError::ScheduleInconsistent(format!(
                    "support dependency {dep} for output {output_idx} has no Phase-1 result yet"
                )));
            };
            acc = union(&acc, contours)?;
        }
        Ok(acc)
    }

    /// Looks up a dependency's best-available contour set: the finished
    /// committed result if Phase-2 already ran, otherwise the pending
    /// Phase-1 contour.
    fn dependency_contours(&self, output_idx: usize) -> Option<&PolygonSet> {
        let output = self.schedule.outputs.get(output_idx)?;
        if let Some(result_idx) = output.result_index {
            return self.tm.slices_for_tool[output.tool]
                .get(result_idx)
                .map(|r| &r.contours);
        }
        self.pending[output_idx].as_ref().map(|p| &p.phase1.contours)
    }

    /// spec.md §4.6 "ensure-attachment offset": erode, optionally remove
    /// narrow artefacts, inflate back, intersect with the already-filled
    /// union, and fuse to guarantee vertical attachment.
    fn ensure_attachment(
        &self,
        contour: &PolygonSet,
        process: &ProcessSpec,
        already_filled: &PolygonSet,
    ) -> SchedResult<PolygonSet> {
        let offset_amount = process.ensure_attachment_offset;
        let mut eroded = offset(-offset_amount, contour, JoinStyle::Round, EndType::Closed).map_err(SchedError::Geom)?;
        if process.ensure_attachment_minimal_offset > 0.0 {
            eroded = offset(
                -process.ensure_attachment_minimal_offset,
                &eroded,
                JoinStyle::Round,
                EndType::Closed,
            )
            .map_err(SchedError::Geom)?;
            eroded = offset(
                process.ensure_attachment_minimal_offset,
                &eroded,
                JoinStyle::Round,
                EndType::Closed,
            )
            .map_err(SchedError::Geom)?;
        }
        let inflated = offset(offset_amount, &eroded, JoinStyle::Round, EndType::Closed).map_err(SchedError::Geom)?;
        let attachment = if already_filled.is_empty() {
            inflated
        } else {
            clip(ClipOp::Intersection, &inflated, already_filled, Default::default(), Default::default())
                .map_err(SchedError::Geom)?
        };
        union(contour, &attachment)
    }

    /// spec.md §4.6 "processReadySlicesPhase2": re-examines every
    /// Phase-1-complete, Phase-2-pending slice; computes it once all of its
    /// dependencies have at least reached Phase-1.
    fn process_ready_slices_phase2(&mut self) -> SchedResult<()> {
        loop {
            let mut made_progress = false;
            let candidates: Vec<usize> = (0..self.schedule.outputs.len())
                .filter(|&i| self.pending[i].is_some() && !self.schedule.outputs[i].computed)
                .collect();

            for output_idx in candidates {
                let deps: Vec<usize> = self.schedule.outputs[output_idx]
                    .required_contours_for_overhang
                    .iter()
                    .chain(self.schedule.outputs[output_idx].required_contours_for_surface.iter())
                    .copied()
                    .collect();
                if deps.iter().any(|&d| !self.phase1_done[d]) {
                    continue;
                }

                let Some(Pending { phase1 }) = self.pending[output_idx].take() else { continue };
                self.finish_phase2(output_idx, phase1)?;
                made_progress = true;
            }

            if !made_progress {
                break;
            }
        }
        Ok(())
    }

    /// Runs Phase-2 for `output_idx`, commits the result into the per-tool
    /// arena, wires `OutputSlice::result_index`, and decrements the
    /// consumed dependencies' reference counts.
    fn finish_phase2(&mut self, output_idx: usize, phase1: Phase1Output) -> SchedResult<()> {
        let (z, tool) = {
            let o = &self.schedule.outputs[output_idx];
            (o.z, o.tool)
        };
        let process = self.processes[tool].clone();
        let pos = ProcessPosition::new(tool, self.processes.len(), self.global.addsub_workflow_mode);

        let overhang_deps = self.schedule.outputs[output_idx].required_contours_for_overhang.clone();
        let surface_deps = self.schedule.outputs[output_idx].required_contours_for_surface.clone();
        let support = self.build_overhang_support(&overhang_deps, &surface_deps)?;

        let mut result = apply_phase2(
            pos,
            &process,
            &self.global,
            &mut self.motion_state[tool],
            support.as_ref().map(|r| OverhangSupport {
                region: r,
                keep_start_inside_support: self.global.overhang_always_supported,
            }),
            phase1,
        )?;
        result.z = z;

        for dep in overhang_deps.iter().chain(surface_deps.iter()) {
            if let Some(o) = self.schedule.outputs.get_mut(*dep) {
                o.num_slices_requiring_this_one = o.num_slices_requiring_this_one.saturating_sub(1);
                if o.recompute_required_after_support || o.recompute_required_after_overhang {
                    if let Some(ri) = o.result_index {
                        self.tm.slices_for_tool[o.tool][ri].clear_contours_above_below();
                    }
                }
            }
        }

        let arena = &mut self.tm.slices_for_tool[tool];
        let result_index = arena.len();
        arena.push(result);
        self.phase1_done[output_idx] = true;
        let o = &mut self.schedule.outputs[output_idx];
        o.result_index = Some(result_index);
        o.computed = true;
        Ok(())
    }

    /// `differentiateSurfaceInfillings` asks for the intersection of above
    /// and below contours; otherwise the plain union of whichever
    /// dependency set is non-empty is used as the one-sided overhang
    /// support (spec.md §4.6).
    fn build_overhang_support(
        &self,
        overhang_deps: &[usize],
        surface_deps: &[usize],
    ) -> SchedResult<Option<PolygonSet>> {
        if overhang_deps.is_empty() && surface_deps.is_empty() {
            return Ok(None);
        }
        let overhang_union = self.union_dependency_contours(overhang_deps)?;
        if self.global.differentiate_surface_infillings && !surface_deps.is_empty() {
            let surface_union = self.union_dependency_contours(surface_deps)?;
            return Ok(Some(
                clip(ClipOp::Intersection, &overhang_union, &surface_union, Default::default(), Default::default())
                    .map_err(SchedError::Geom)?,
            ));
        }
        Ok(Some(overhang_union))
    }

    fn union_dependency_contours(&self, deps: &[usize]) -> SchedResult<PolygonSet> {
        let mut acc = PolygonSet::empty();
        for &dep in deps {
            if let Some(contours) = self.dependency_contours(dep) {
                acc = union(&acc, contours)?;
            }
        }
        Ok(acc)
    }

    /// spec.md §4.6 "Output hand-out": returns the next computed output
    /// slice in order, marking its underlying result as used.
    pub fn give_next_output_slice(&mut self) -> SchedResult<Option<&ResultSingleTool>> {
        let Some(output) = self.schedule.outputs.get(self.next_give_idx) else {
            return Ok(None);
        };
        if !output.computed {
            return Ok(None);
        }
        let tool = output.tool;
        let Some(result_idx) = output.result_index else {
            return Err(SchedError::ScheduleInconsistent(format!(
                "output {} is marked computed without a result",
                self.next_give_idx
            )));
        };
        self.tm.slices_for_tool[tool][result_idx].used = true;
        self.next_give_idx += 1;
        Ok(Some(&self.tm.slices_for_tool[tool][result_idx]))
    }

    pub fn is_finished(&self) -> bool {
        self.next_give_idx >= self.schedule.outputs.len()
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
    use mrsp_core::spec::{SchedulingMode, VoxelProfile};

    fn square(side: i64) -> Path {
        Path::closed(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn single_tool_uniform_schedule_runs_end_to_end() {
        let mut process = ProcessSpec::new(75, 10);
        process.apply_snap = false;
        process.profile = Some(VoxelProfile::constant(75.0, 50.0, 100.0));
        let mut global = GlobalSpec::default();
        global.scheduling_mode = SchedulingMode::Uniform;
        global.z_uniform_step = 100.0;

        let mut scheduler = SimpleSlicingScheduler::new(vec![process], global, 0.0, 100.0);
        let raw_zs = scheduler.raw_zs();
        assert_eq!(raw_zs.len(), 2);

        for idx in 0..raw_zs.len() {
            scheduler
                .deliver_raw_slice(idx, PolygonSet::new(vec![square(1000)]))
                .unwrap();
        }
        scheduler.compute_next_input_slices().unwrap();

        let mut handed_out = 0;
        while let Some(_result) = scheduler.give_next_output_slice().unwrap() {
            handed_out += 1;
        }
        assert_eq!(handed_out, 2);
        assert!(scheduler.is_finished());
    }
}
