//! A single outer closed path plus zero or more inner closed paths (spec.md §3).

use super::{is_counter_clockwise, Path};
use serde::{Deserialize, Serialize};

/// One outer closed path plus zero or more holes.
///
/// Invariant: the outer path is counter-clockwise, holes are clockwise,
/// holes lie inside the outer path, and `HoledPolygon`s within a set are
/// disjoint. Construction does not itself enforce orientation — callers
/// that build a `HoledPolygon` from raw kernel output should first run the
/// paths through [`crate::geometry::orient_paths`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoledPolygon {
    pub outer: Path,
    pub holes: Vec<Path>,
}

impl HoledPolygon {
    pub fn new(outer: Path, holes: Vec<Path>) -> Self {
        Self { outer, holes }
    }

    /// True if `outer` is CCW and every hole is CW, per the invariant.
    pub fn has_standard_orientation(&self) -> bool {
        is_counter_clockwise(&self.outer) && self.holes.iter().all(|h| !is_counter_clockwise(h))
    }

    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }
}
