//! A `PolygonSet` sliced from the mesh at a specific Z (spec.md §3 `RawSlice`).

use crate::geometry::PolygonSet;

/// A cross-section delivered by the mesh slicer at one Z, plus the reference
/// counting the scheduler uses to know when it is safe to free.
#[derive(Debug, Clone)]
pub struct RawSlice {
    pub z: f64,
    pub polygons: PolygonSet,
    /// Number of input slices still needing to consume this raw slice.
    pub num_remaining_uses: usize,
    pub in_use: bool,
    pub was_used: bool,
    /// Indices of the input slices that will consume this raw slice.
    pub map_raw_to_input: Vec<usize>,
}

impl RawSlice {
    pub fn empty(z: f64) -> Self {
        Self {
            z,
            polygons: PolygonSet::empty(),
            num_remaining_uses: 0,
            in_use: false,
            was_used: false,
            map_raw_to_input: Vec::new(),
        }
    }

    pub fn is_filled(&self) -> bool {
        !self.polygons.paths.is_empty() || self.was_used
    }

    pub fn deliver(&mut self, polygons: PolygonSet) {
        self.polygons = polygons;
        self.in_use = true;
    }

    /// Registers one more consumer of this raw slice.
    pub fn register_consumer(&mut self, input_idx: usize) {
        self.map_raw_to_input.push(input_idx);
        self.num_remaining_uses += 1;
    }

    /// Called once an input slice has consumed this raw slice. Returns true
    /// if the reference count has reached zero (the slice may now be
    /// garbage-collected once its Z has been passed with a safety margin).
    pub fn release_one_use(&mut self) -> bool {
        self.was_used = true;
        if self.num_remaining_uses > 0 {
            self.num_remaining_uses -= 1;
        }
        self.num_remaining_uses == 0
    }
}
