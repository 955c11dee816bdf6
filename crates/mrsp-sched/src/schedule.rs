//! Building the input/output/raw slice schedule (spec.md §4.6 "Building the
//! schedule", "Output ordering", "Raw slice deduplication"), grounded in
//! `original_source/multi/3d.cpp`'s `recursiveSimpleInputScheduler` /
//! `computeSimpleOutputOrderForInputSlices` / `pruneInputZsAndCreateRawZs`.

use mrsp_core::slices::{InputSlice, OutputSlice, RawSlice};
use mrsp_core::spec::{GlobalSpec, ProcessSpec, SchedulingMode};

/// One `(Z, tool)` request before it has been assigned output/raw indices.
#[derive(Debug, Clone, Copy)]
struct RawEntry {
    z: f64,
    tool: usize,
}

/// Emits one entry per Z at `global.z_uniform_step`, for every index in
/// `active_tools`, over `[zmin, zmax]` (spec.md §4.6 mode = uniform).
fn build_uniform(zmin: f64, zmax: f64, step: f64, active_tools: &[usize]) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    if step <= 0.0 {
        return entries;
    }
    let mut z = zmin;
    while z <= zmax + 1e-9 {
        for &tool in active_tools {
            entries.push(RawEntry { z, tool });
        }
        z += step;
    }
    entries
}

/// `recursiveSimpleInputScheduler`: from the lowest-resolution active tool,
/// step at `sliceHeight`, recursively interleaving every higher-resolution
/// active tool's own slices into the gap up to the newly emitted Z.
/// `testSliceNotNearEnd` gives a tool 20% of its `sliceHeight` slack before
/// treating a step as having reached `zend`.
fn build_simple(
    processes: &[ProcessSpec],
    active_tools: &[usize],
    zbase: &mut [f64],
    zend: f64,
    tool_pos: usize,
    out: &mut Vec<RawEntry>,
) {
    if tool_pos >= active_tools.len() {
        return;
    }
    let tool = active_tools[tool_pos];
    let Some(profile) = &processes[tool].profile else {
        return;
    };
    let slice_height = profile.slice_height();
    if slice_height <= 0.0 {
        return;
    }
    let slack = slice_height * 0.2;

    loop {
        let z = zbase[tool];
        if z > zend + slack {
            break;
        }
        out.push(RawEntry { z, tool });
        if tool_pos + 1 < active_tools.len() {
            build_simple(processes, active_tools, zbase, z, tool_pos + 1, out);
        }
        zbase[tool] = z + slice_height;
        if zbase[tool] > zend + slack {
            break;
        }
    }
}

fn active_tool_indices(processes: &[ProcessSpec], global: &GlobalSpec) -> Vec<usize> {
    match &global.tool_subset {
        Some(subset) => subset.clone(),
        None => (0..processes.len()).collect(),
    }
}

/// Builds the raw `(Z, tool)` entries for the configured scheduling mode
/// (spec.md §4.6 "Building the schedule").
pub fn build_raw_schedule(processes: &[ProcessSpec], global: &GlobalSpec, zmin: f64, zmax: f64) -> Vec<(f64, usize)> {
    let active = active_tool_indices(processes, global);
    let entries = match global.scheduling_mode {
        SchedulingMode::Uniform => build_uniform(zmin, zmax, global.z_uniform_step, &active),
        SchedulingMode::Simple => {
            let mut zbase = vec![zmin; processes.len()];
            let mut out = Vec::new();
            build_simple(processes, &active, &mut zbase, zmax, 0, &mut out);
            out
        }
        SchedulingMode::Manual => global
            .manual_schedule
            .iter()
            .map(|e| RawEntry { z: e.z, tool: e.tool })
            .collect(),
    };
    entries.into_iter().map(|e| (e.z, e.tool)).collect()
}

/// Sorts input slices by Z (honoring `slice_upwards`), ties broken by tool
/// index ascending, and builds the `OutputSlice` slots in that same order
/// (spec.md §4.6 "Output ordering": "Assign OutputSlice indices in that
/// order").
pub fn order_inputs(mut entries: Vec<(f64, usize)>, slice_upwards: bool) -> Vec<(f64, usize)> {
    entries.sort_by(|a, b| {
        let z_cmp = if slice_upwards {
            a.0.partial_cmp(&b.0).unwrap()
        } else {
            b.0.partial_cmp(&a.0).unwrap()
        };
        z_cmp.then(a.1.cmp(&b.1))
    });
    entries
}

/// Output of [`build_schedule`]: the ordered `InputSlice`/`OutputSlice`
/// lists plus the deduplicated `RawSlice` list, with every cross-reference
/// already wired (spec.md §4.6 "Raw slice deduplication").
pub struct BuiltSchedule {
    pub inputs: Vec<InputSlice>,
    pub outputs: Vec<OutputSlice>,
    pub raws: Vec<RawSlice>,
}

/// Builds the full schedule: orders input slices, deduplicates raw slices
/// within `epsilon`, and (when `avoid_vertical_overwriting`) extends each
/// input slice's `required_raw_slices` to cover its voxel's vertical
/// support among finer-tool raw slices.
pub fn build_schedule(processes: &[ProcessSpec], global: &GlobalSpec, zmin: f64, zmax: f64) -> BuiltSchedule {
    let raw_entries = build_raw_schedule(processes, global, zmin, zmax);
    let ordered = order_inputs(raw_entries, global.slice_upwards);

    let mut inputs = Vec::with_capacity(ordered.len());
    let mut outputs = Vec::with_capacity(ordered.len());
    let mut raws: Vec<RawSlice> = Vec::new();

    for (output_index, &(z, tool)) in ordered.iter().enumerate() {
        outputs.push(OutputSlice::new(z, tool));

        let raw_index = match raws.last() {
            Some(last) if (last.z - z).abs() <= global.z_epsilon => raws.len() - 1,
            _ => {
                raws.push(RawSlice::empty(z));
                raws.len() - 1
            }
        };

        let input_index = inputs.len();
        let mut input = InputSlice::new(z, tool, output_index, raw_index);
        raws[raw_index].register_consumer(input_index);
        input.z = raws[raw_index].z; // unify Z with the raw slice it was folded into
        inputs.push(input);
    }

    if global.avoid_vertical_overwriting {
        extend_required_raw_slices(processes, &mut inputs, &raws);
    }

    BuiltSchedule { inputs, outputs, raws }
}

/// For each input slice, adds every raw slice belonging to a *finer* tool
/// whose Z falls within `[z - application_point, z + remainder]`, per
/// spec.md §4.6's `avoidVerticalOverwriting` clause.
fn extend_required_raw_slices(processes: &[ProcessSpec], inputs: &mut [InputSlice], raws: &[RawSlice]) {
    for input in inputs.iter_mut() {
        let Some(profile) = processes.get(input.tool).and_then(|p| p.profile.as_ref()) else {
            continue;
        };
        let lo = input.z - profile.application_point();
        let hi = input.z + profile.remainder();
        let mut required: Vec<usize> = vec![input.raw_index];
        for (idx, raw) in raws.iter().enumerate() {
            if idx == input.raw_index {
                continue;
            }
            if raw.z >= lo && raw.z <= hi {
                // Only finer tools (a higher tool index is, by convention,
                // finer) contribute extra vertical-overwrite dependencies.
                let finer_tool_present = raws[idx]
                    .map_raw_to_input
                    .iter()
                    .any(|&i2| inputs.get(i2).map(|o| o.tool > input.tool).unwrap_or(false));
                if finer_tool_present {
                    required.push(idx);
                }
            }
        }
        input.required_raw_slices = required;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::spec::VoxelProfile;

    fn process_with_profile(radius: i64, slice_height: f64) -> ProcessSpec {
        let mut p = ProcessSpec::new(radius, radius.max(1));
        p.profile = Some(VoxelProfile::constant(radius as f64, slice_height / 2.0, slice_height));
        p
    }

    #[test]
    fn uniform_mode_emits_every_tool_per_z() {
        let processes = vec![ProcessSpec::new(75, 10), ProcessSpec::new(10, 1)];
        let mut global = GlobalSpec::default();
        global.z_uniform_step = 50.0;
        let entries = build_raw_schedule(&processes, &global, 0.0, 100.0);
        assert_eq!(entries.len(), 6); // z = 0, 50, 100, each with 2 tools
    }

    #[test]
    fn simple_mode_interleaves_fine_between_coarse() {
        let processes = vec![process_with_profile(75, 100.0), process_with_profile(10, 25.0)];
        let global = GlobalSpec {
            scheduling_mode: SchedulingMode::Simple,
            ..GlobalSpec::default()
        };
        let entries = build_raw_schedule(&processes, &global, 0.0, 100.0);
        // Coarse tool steps at 0, 100; fine tool sandwiched at 25, 50, 75
        // between them (spec.md §8 scenario 5).
        assert!(entries.iter().any(|&(z, t)| t == 0 && (z - 0.0).abs() < 1e-6));
        assert!(entries.iter().any(|&(z, t)| t == 1 && (z - 25.0).abs() < 1e-6));
        assert!(entries.iter().any(|&(z, t)| t == 1 && (z - 75.0).abs() < 1e-6));
    }

    #[test]
    fn raw_slices_dedup_within_epsilon() {
        let processes = vec![ProcessSpec::new(75, 10), ProcessSpec::new(10, 1)];
        let mut global = GlobalSpec::default();
        global.z_epsilon = 0.5;
        global.z_uniform_step = 10.0;
        let built = build_schedule(&processes, &global, 0.0, 20.0);
        // Every Z has 2 tools but only one raw slice per Z.
        assert_eq!(built.raws.len(), 3);
        assert_eq!(built.inputs.len(), 6);
    }

    #[test]
    fn output_ordering_is_monotone_by_z_then_tool() {
        let processes = vec![ProcessSpec::new(75, 10), ProcessSpec::new(10, 1)];
        let global = GlobalSpec::default();
        let built = build_schedule(&processes, &global, 0.0, 10.0);
        for w in built.outputs.windows(2) {
            assert!(w[0].z < w[1].z || (w[0].z == w[1].z && w[0].tool < w[1].tool));
        }
    }
}
