//! A scheduler-internal slot for one input slice's result (spec.md §3
//! `OutputSlice`).

/// A slot that transitions empty → phase-1 → phase-2 (computed) →
/// consumed-by-caller → freed. `result_index` is a non-owning back-reference
/// into the per-tool `ResultSingleTool` arena the scheduler owns (see
/// `mrsp-core::slices` module docs).
#[derive(Debug, Clone)]
pub struct OutputSlice {
    pub z: f64,
    pub tool: usize,
    pub computed: bool,
    pub result_index: Option<usize>,
    /// How many later slices still need this one as a cross-reference.
    pub num_slices_requiring_this_one: usize,
    /// Indices of other `OutputSlice`s whose Phase-1 result must be joined
    /// before this slice's Phase-1 can be used to compute support.
    pub required_contours_for_support: Vec<usize>,
    /// Indices of other `OutputSlice`s whose result must be joined before
    /// this slice's Phase-2 can account for overhang.
    pub required_contours_for_overhang: Vec<usize>,
    /// Indices of other `OutputSlice`s whose result must be joined before
    /// this slice's Phase-2 can differentiate a surface.
    pub required_contours_for_surface: Vec<usize>,
    /// Set iff this slice contributes to support but not overhang: once its
    /// support dependents are satisfied its above/below memoization must be
    /// cleared before overhang processing reuses it.
    pub recompute_required_after_support: bool,
    /// Set iff overhang differs from surface for this slice.
    pub recompute_required_after_overhang: bool,
}

impl OutputSlice {
    pub fn new(z: f64, tool: usize) -> Self {
        Self {
            z,
            tool,
            computed: false,
            result_index: None,
            num_slices_requiring_this_one: 0,
            required_contours_for_support: Vec::new(),
            required_contours_for_overhang: Vec::new(),
            required_contours_for_surface: Vec::new(),
            recompute_required_after_support: false,
            recompute_required_after_overhang: false,
        }
    }

    pub fn has_phase2_dependencies(&self) -> bool {
        !self.required_contours_for_overhang.is_empty()
            || !self.required_contours_for_surface.is_empty()
    }
}
