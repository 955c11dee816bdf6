//! Scheduling mode and cross-cutting flags shared by every process (spec.md
//! §3 `GlobalSpec`).

use serde::{Deserialize, Serialize};

/// How input slices are generated across Z (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingMode {
    /// One input per Z at a uniform step, for every active tool.
    Uniform,
    /// Two-photon-style recursive interleaving from coarse to fine tools.
    Simple,
    /// Caller-provided `(Z, tool)` list, used verbatim.
    Manual,
}

/// A manually specified `(Z, tool)` schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualScheduleEntry {
    pub z: f64,
    pub tool: usize,
}

/// Cross-cutting scheduling and workflow configuration (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSpec {
    pub scheduling_mode: SchedulingMode,
    pub addsub_workflow_mode: bool,
    pub apply_motion_planner: bool,
    pub correct_input: bool,
    pub z_epsilon: f64,
    pub manual_schedule: Vec<ManualScheduleEntry>,
    /// Subset of tool indices to actually use; `None` means all tools.
    pub tool_subset: Option<Vec<usize>>,
    pub substractive_outer: bool,
    pub outer_limit_x: i64,
    pub outer_limit_y: i64,
    pub differentiate_surface: bool,
    /// When computing precomputed overhang support ahead of Phase-2, use the
    /// intersection of the above/below contours rather than just the
    /// one-sided set (spec.md §4.6 "Ready raw-slice processing loop").
    pub differentiate_surface_infillings: bool,
    pub overhang_always_supported: bool,
    pub slice_upwards: bool,
    pub avoid_vertical_overwriting: bool,
    pub ignore_redundant_additive_contours: bool,
    /// Uniform-mode Z step, in the mesh's native units.
    pub z_uniform_step: f64,
    /// Extent factors for cross-slice dependency windows (spec.md §4.6).
    pub always_supported_extent_factor: f64,
    pub consider_overhang_extent_factor: f64,
    pub differentiate_surface_extent_factor: f64,
}

impl Default for GlobalSpec {
    fn default() -> Self {
        Self {
            scheduling_mode: SchedulingMode::Uniform,
            addsub_workflow_mode: false,
            apply_motion_planner: true,
            correct_input: false,
            z_epsilon: 1e-6,
            manual_schedule: Vec::new(),
            tool_subset: None,
            substractive_outer: false,
            outer_limit_x: 0,
            outer_limit_y: 0,
            differentiate_surface: false,
            differentiate_surface_infillings: false,
            overhang_always_supported: false,
            slice_upwards: true,
            avoid_vertical_overwriting: false,
            ignore_redundant_additive_contours: true,
            z_uniform_step: 1.0,
            always_supported_extent_factor: 1.0,
            consider_overhang_extent_factor: 1.0,
            differentiate_surface_extent_factor: 1.0,
        }
    }
}

impl GlobalSpec {
    pub fn is_manual(&self) -> bool {
        matches!(self.scheduling_mode, SchedulingMode::Manual)
    }
}
