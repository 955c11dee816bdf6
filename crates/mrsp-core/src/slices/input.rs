//! A scheduler-internal `(Z, tool)` request (spec.md §3 `InputSlice`).

/// One `(Z, tool)` request; maps one-to-one to an `OutputSlice` and
/// many-to-one into `RawSlice`s.
#[derive(Debug, Clone)]
pub struct InputSlice {
    pub z: f64,
    pub tool: usize,
    /// Index of the `OutputSlice` this input slice produces.
    pub output_index: usize,
    /// Index of the primary raw slice this input slice reads (many input
    /// slices may share one raw slice).
    pub raw_index: usize,
    /// When `avoid_vertical_overwriting` is set: the full list of raw slices
    /// this input slice depends on (its own raw slice plus any finer-tool
    /// raw slices whose Z falls within the voxel's vertical support).
    pub required_raw_slices: Vec<usize>,
}

impl InputSlice {
    pub fn new(z: f64, tool: usize, output_index: usize, raw_index: usize) -> Self {
        Self {
            z,
            tool,
            output_index,
            raw_index,
            required_raw_slices: vec![raw_index],
        }
    }
}
