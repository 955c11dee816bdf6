//! # mrsp-slice
//!
//! The C5 per-process single-Z pipeline (spec.md §4.5), grounded in
//! `original_source/multi/multislicer.cpp`'s `Multislicer::applyProcess`/
//! `applyProcesses`. Each step (preprocessing, toolpath offset, snap/
//! clearance/burr, common-arc discard, recursive contour, infilling,
//! medial-axis recovery, union + motion plan) lives in its own module;
//! this crate root wires them into the Phase-1/Phase-2 split the C6
//! scheduler drives (spec.md §4.6: "If no Phase-2 dependencies exist,
//! immediately run Phase-2...") and into [`apply_processes`], the
//! single-Z, all-tools entry point used for the concrete scenarios of
//! spec.md §8 and by callers that do not need cross-slice Phase-2
//! deferral at all.

pub mod error;
pub mod holes;
pub mod infilling;
pub mod medial;
pub mod plan;
pub mod preprocessing;
pub mod toolpath;

use error::{tag, SliceResult};
use mrsp_core::spec::{GlobalSpec, InfillingMode, ProcessSpec};
use mrsp_core::{Path, PolygonSet};
use mrsp_geom::{clip, orient_paths, ClipOp};
use mrsp_snap::{GridSpec, SnapMode};
use plan::OverhangSupport;

pub use mrsp_core::slices::ResultSingleTool;
pub use plan::union_and_plan;

/// Static, per-Z facts about where process `k` sits among the tools used
/// this run, derived the way `Multislicer::applyProcess`'s
/// "INTERIM HACK FOR add/sub" derives `nextProcessSameKind`/
/// `previousProcessSameKind`: in additive-only runs every process is the
/// same kind as its neighbors; in an addsub run, process 0 is the odd one
/// out (additive, with every later process subtractive relative to it).
#[derive(Debug, Clone, Copy)]
pub struct ProcessPosition {
    pub index: usize,
    pub is_last: bool,
    pub next_same_kind: bool,
}

impl ProcessPosition {
    pub fn new(index: usize, total: usize, addsub_workflow_mode: bool) -> Self {
        let is_last = index + 1 >= total;
        let next_same_kind = if index == 0 { !addsub_workflow_mode } else { true };
        ProcessPosition { index, is_last, next_same_kind }
    }
}

fn default_grid(process: &ProcessSpec) -> GridSpec {
    GridSpec::new(
        process.gridstep as f64,
        process.gridstep as f64,
        process.grid_maxdist(),
        SnapMode::Dilate,
    )
}

/// Output of Phase-1 (spec.md §4.5 steps 1-7), kept around so Phase-2 can
/// resume without recomputing the toolpath offset.
#[derive(Debug, Clone)]
pub struct Phase1Output {
    /// Step 5's committed contour, before any infilling/medial-axis ring
    /// is unioned in by Phase-2.
    pub contours: PolygonSet,
    /// Step 2-3's offset toolpath shape, still solid (pre closed-open
    /// emission); Phase-2's infilling and medial-axis steps erode this.
    pub temp: PolygonSet,
    /// Step 4/6's toolpaths (closed-open, common arcs already discarded).
    pub toolpaths: Vec<Path>,
    /// Step 7's recursive outer-ring independent contour, if requested.
    pub recursive_contour: Option<PolygonSet>,
}

/// Runs spec.md §4.5 steps 1-7 for process `k`.
#[allow(clippy::too_many_arguments)]
pub fn apply_phase1(
    pos: ProcessPosition,
    process: &ProcessSpec,
    next: Option<&ProcessSpec>,
    contours_to_fill: &PolygonSet,
    contours_already_filled: &PolygonSet,
) -> SliceResult<Phase1Output> {
    let grid = default_grid(process);
    let maxdist = process.grid_maxdist();

    let contour = preprocessing::preprocess(
        pos.index,
        process,
        next,
        pos.next_same_kind,
        pos.is_last,
        contours_to_fill,
    )?;

    let temp = toolpath::offset_to_toolpath(pos.index, process, &contour)?;
    let temp = toolpath::snap_clearance_burr(
        pos.index,
        process,
        pos.next_same_kind,
        maxdist,
        &grid,
        temp,
    )?;

    let mut toolpaths = Vec::new();
    toolpath::emit_closed_open(&mut toolpaths, &temp);

    let contours = toolpath::committed_contour(pos.index, process, &temp)?;

    let toolpaths = toolpath::discard_common_arcs(
        pos.index,
        process,
        toolpaths,
        contours_already_filled,
    )?;

    let recursive_contour = infilling::recursive_outer_ring_contour(
        pos.index,
        process,
        pos.next_same_kind,
        &toolpaths,
    )?;

    Ok(Phase1Output { contours, temp, toolpaths, recursive_contour })
}

/// Runs spec.md §4.5 steps 8-10 for process `k`, consuming the
/// [`Phase1Output`] and a [`mrsp_core::slices::ResultSingleTool`] scratch
/// slot the caller pre-populated with [`ResultSingleTool::new`].
pub fn apply_phase2(
    pos: ProcessPosition,
    process: &ProcessSpec,
    global: &GlobalSpec,
    state: &mut mrsp_motion::StartState,
    support: Option<OverhangSupport<'_>>,
    phase1: Phase1Output,
) -> SliceResult<ResultSingleTool> {
    let grid = default_grid(process);
    let has_custom_infillings = !matches!(process.infilling_mode, InfillingMode::None);
    let infilling_grid = if process.apply_snap { Some(&grid) } else { None };

    let infilling_out =
        infilling::compute_infilling(pos.index, process, &phase1.temp, infilling_grid)?;

    let medial_for_infilling = if let Some(areas) = &infilling_out.areas {
        if has_custom_infillings && !process.medial_axis_factors_for_infillings.is_empty() {
            Some(medial::recover_medial_axis(
                pos.index,
                process,
                &process.medial_axis_factors_for_infillings,
                areas,
            )?)
        } else {
            None
        }
    } else {
        None
    };

    let contour_shape = match &medial_for_infilling {
        Some(m) => m.remaining_shape.clone(),
        None => phase1.temp.clone(),
    };
    let medial_for_contour = if !process.medial_axis_factors.is_empty() {
        Some(medial::recover_medial_axis(
            pos.index,
            process,
            &process.medial_axis_factors,
            &contour_shape,
        )?)
    } else {
        None
    };

    let mut contours = phase1.contours;
    let mut medial_axis_contours = Vec::new();
    let mut infilling_contours = Vec::new();
    let mut contour_medial_lines = Vec::new();
    let mut infilling_medial_lines = Vec::new();

    if let Some(m) = medial_for_infilling {
        for ring in &m.inflated_contours {
            contours = union_rings(pos.index, &contours, ring)?;
        }
        infilling_contours.extend(m.inflated_contours);
        infilling_medial_lines = m.lines;
    }
    if let Some(m) = medial_for_contour {
        for ring in &m.inflated_contours {
            contours = union_rings(pos.index, &contours, ring)?;
        }
        medial_axis_contours.extend(m.inflated_contours);
        contour_medial_lines = m.lines;
    }

    if let Some(independent) = infilling_out.independent_contour {
        infilling_contours.push(independent);
    }

    let planned = union_and_plan(
        pos.index,
        global.apply_motion_planner,
        state,
        support,
        phase1.toolpaths,
        infilling_out.toolpaths,
        infilling_medial_lines,
        contour_medial_lines,
    )?;

    let mut result = ResultSingleTool::new(f64::NAN, pos.index);
    result.contours = contours;
    result.toolpaths = planned;
    result.infilling_areas = infilling_out.areas;
    result.medial_axis_contours = medial_axis_contours;
    result.infilling_contours = infilling_contours;
    result.phase1_complete = true;
    result.phase2_complete = true;
    Ok(result)
}

fn union_rings(process_index: usize, a: &PolygonSet, b: &PolygonSet) -> SliceResult<PolygonSet> {
    clip(ClipOp::Union, a, b, Default::default(), Default::default())
        .map_err(tag(process_index, "medial_axis_union"))
}

/// Single-Z, all-active-tools entry point, grounded in
/// `Multislicer::applyProcesses`: wraps the substractive-outer box,
/// threads `contours_to_fill`/`contours_already_filled` across every
/// process in order, and runs Phase-1 immediately followed by Phase-2 for
/// each (no cross-slice Phase-2 deferral — that's the C6 scheduler's job).
pub fn apply_processes(
    processes: &[ProcessSpec],
    global: &GlobalSpec,
    mut contours_to_fill: PolygonSet,
) -> SliceResult<Vec<ResultSingleTool>> {
    if global.substractive_outer {
        contours_to_fill = add_outer_box(&contours_to_fill, global.outer_limit_x, global.outer_limit_y);
    }
    if global.correct_input || global.substractive_outer {
        contours_to_fill.paths = orient_paths(&contours_to_fill.paths);
    }

    let mut contours_already_filled = PolygonSet::empty();
    let mut results = Vec::with_capacity(processes.len());
    let mut state = mrsp_motion::StartState::new();

    for (k, process) in processes.iter().enumerate() {
        let pos = ProcessPosition::new(k, processes.len(), global.addsub_workflow_mode);
        let next = processes.get(k + 1);

        if use_contours_already_filled(k, global, process) {
            let mut union_with = contours_already_filled.clone();
            if k > 0 {
                let prev = &results[k - 1];
                if !prev.infilling_contours.is_empty() {
                    for c in &prev.infilling_contours {
                        union_with = union_rings(k, &union_with, c)?;
                    }
                } else {
                    union_with = union_rings(k, &union_with, &prev.contours)?;
                }
                for c in &prev.medial_axis_contours {
                    union_with = union_rings(k, &union_with, c)?;
                }
            }
            contours_already_filled = union_with;
        }

        let phase1 = apply_phase1(pos, process, next, &contours_to_fill, &contours_already_filled)?;
        let mut result = apply_phase2(pos, process, global, &mut state, None, phase1)?;
        result.z = f64::NAN;

        if global.substractive_outer {
            result.toolpaths = remove_outer_box(
                &result.toolpaths,
                global.outer_limit_x,
                global.outer_limit_y,
            );
            if let Some(areas) = &result.infilling_areas {
                result.infilling_areas =
                    Some(remove_outer_box_set(areas, global.outer_limit_x, global.outer_limit_y));
            }
        }

        if pos.next_same_kind {
            let subtract_from = if result.infilling_contours.is_empty() {
                result.contours.clone()
            } else {
                let mut acc = PolygonSet::empty();
                for c in &result.infilling_contours {
                    acc = union_rings(k, &acc, c)?;
                }
                for c in &result.medial_axis_contours {
                    acc = union_rings(k, &acc, c)?;
                }
                acc
            };
            contours_to_fill = clip(
                ClipOp::Difference,
                &contours_to_fill,
                &subtract_from,
                Default::default(),
                Default::default(),
            )
            .map_err(tag(k, "addsub_subtract"))?;
        } else {
            // Addsub switch (spec.md §9 Design Notes references this as the
            // "should never occur" branch of `applyContours`; here it is
            // the documented, reachable per-process accumulation when the
            // *process itself* changes kind, not the toolpath-manager path).
            let mut removal = result.contours.clone();
            for c in &result.medial_axis_contours {
                removal = union_rings(k, &removal, c)?;
            }
            contours_to_fill = clip(
                ClipOp::Difference,
                &removal,
                &contours_to_fill,
                Default::default(),
                Default::default(),
            )
            .map_err(tag(k, "addsub_subtract"))?;
        }

        results.push(result);
    }

    Ok(results)
}

fn use_contours_already_filled(k: usize, global: &GlobalSpec, process: &ProcessSpec) -> bool {
    k > 0 && !global.addsub_workflow_mode && process.radius_remove_common > 0
}

/// Appends a fixed-size box at `(±limit_x, ±limit_y)`, making the fill
/// region substractive-safe even when the real outer limits aren't known
/// explicitly (spec.md §4.5 "Substractive-outer mode"; original `addOuter`).
fn add_outer_box(paths: &PolygonSet, limit_x: i64, limit_y: i64) -> PolygonSet {
    use mrsp_core::Point;
    let outer = Path::closed(vec![
        Point::new(limit_x, limit_y),
        Point::new(-limit_x, limit_y),
        Point::new(-limit_x, -limit_y),
        Point::new(limit_x, -limit_y),
    ]);
    let mut out = paths.clone();
    out.paths.push(outer);
    out
}

/// Drops whole paths whose bounding box touches or exceeds `±limit` on
/// either axis, undoing [`add_outer_box`]'s fixed box and anything that
/// grew out to meet it (original `removeOuter`'s `InOuter` predicate).
fn path_reaches_outer_limit(path: &Path, limit_x: i64, limit_y: i64) -> bool {
    let Some(bbox) = mrsp_core::geometry::BoundingBox::from_points(&path.points) else {
        return false;
    };
    bbox.min_x.abs() >= limit_x
        || bbox.max_x.abs() >= limit_x
        || bbox.min_y.abs() >= limit_y
        || bbox.max_y.abs() >= limit_y
}

fn remove_outer_box(paths: &[Path], limit_x: i64, limit_y: i64) -> Vec<Path> {
    paths
        .iter()
        .filter(|p| !path_reaches_outer_limit(p, limit_x, limit_y))
        .cloned()
        .collect()
}

fn remove_outer_box_set(set: &PolygonSet, limit_x: i64, limit_y: i64) -> PolygonSet {
    PolygonSet::with_fill(remove_outer_box(&set.paths, limit_x, limit_y), set.fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::Point;

    fn circle(radius: i64, segments: usize) -> Path {
        let pts: Vec<Point> = (0..segments)
            .map(|i| {
                let theta = (i as f64) / (segments as f64) * std::f64::consts::TAU;
                Point::new(
                    (radius as f64 * theta.cos()).round() as i64,
                    (radius as f64 * theta.sin()).round() as i64,
                )
            })
            .collect();
        Path::closed(pts)
    }

    fn square(side: i64) -> Path {
        Path::closed(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn single_tool_single_circle_produces_toolpath_and_contour() {
        let mut process = ProcessSpec::new(75, 10);
        process.apply_snap = true;
        let global = GlobalSpec::default();
        let input = PolygonSet::new(vec![circle(500, 128)]);

        let results = apply_processes(&[process], &global, input).expect("pipeline succeeds");
        assert_eq!(results.len(), 1);
        assert!(!results[0].contours.is_empty());
        assert!(!results[0].toolpaths.is_empty());
    }

    #[test]
    fn two_tool_additive_multislicing_narrows_contours_to_fill() {
        let mut coarse = ProcessSpec::new(75, 10);
        coarse.apply_snap = false;
        let mut fine = ProcessSpec::new(10, 1);
        fine.apply_snap = false;
        let global = GlobalSpec::default();
        let input = PolygonSet::new(vec![square(1000)]);

        let results =
            apply_processes(&[coarse, fine], &global, input).expect("pipeline succeeds");
        assert_eq!(results.len(), 2);
        assert!(!results[0].toolpaths.is_empty());
    }

    #[test]
    fn remove_outer_box_drops_only_paths_reaching_the_limit() {
        let inside = square(100);
        let reaching = Path::closed(vec![
            Point::new(-5000, -5000),
            Point::new(5000, -5000),
            Point::new(5000, 5000),
            Point::new(-5000, 5000),
        ]);
        let kept = remove_outer_box(&[inside.clone(), reaching], 5000, 5000);
        assert_eq!(kept, vec![inside]);
    }

    #[test]
    fn substractive_outer_mode_runs_end_to_end() {
        let mut process = ProcessSpec::new(75, 10);
        process.apply_snap = false;
        let mut global = GlobalSpec::default();
        global.substractive_outer = true;
        global.outer_limit_x = 10_000;
        global.outer_limit_y = 10_000;
        let input = PolygonSet::new(vec![square(1000)]);

        let results = apply_processes(&[process], &global, input).expect("pipeline succeeds");
        assert_eq!(results.len(), 1);
        // the fixed outer box itself must not leak into the emitted toolpaths
        for path in &results[0].toolpaths {
            assert!(!path_reaches_outer_limit(path, global.outer_limit_x, global.outer_limit_y));
        }
    }

    #[test]
    fn addsub_workflow_runs_both_processes() {
        let mut additive = ProcessSpec::new(75, 10);
        additive.apply_snap = false;
        let mut subtractive = ProcessSpec::new(75, 10);
        subtractive.apply_snap = false;
        let mut global = GlobalSpec::default();
        global.addsub_workflow_mode = true;
        let input = PolygonSet::new(vec![square(1000)]);

        let results = apply_processes(&[additive, subtractive], &global, input)
            .expect("addsub pipeline succeeds");
        assert_eq!(results.len(), 2);
    }
}
