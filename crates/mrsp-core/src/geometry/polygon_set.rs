//! An unordered collection of paths interpreted with a fill rule (spec.md §3).

use super::Path;
use serde::{Deserialize, Serialize};

/// The two standard polygon fill interpretations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl Default for FillRule {
    fn default() -> Self {
        FillRule::NonZero
    }
}

/// An unordered collection of paths, interpreted according to `fill`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonSet {
    pub paths: Vec<Path>,
    pub fill: FillRule,
}

impl PolygonSet {
    pub fn new(paths: Vec<Path>) -> Self {
        Self {
            paths,
            fill: FillRule::default(),
        }
    }

    pub fn with_fill(paths: Vec<Path>, fill: FillRule) -> Self {
        Self { paths, fill }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() || self.paths.iter().all(Path::is_empty)
    }

    pub fn extend(&mut self, other: PolygonSet) {
        self.paths.extend(other.paths);
    }
}

impl FromIterator<Path> for PolygonSet {
    fn from_iter<T: IntoIterator<Item = Path>>(iter: T) -> Self {
        PolygonSet::new(iter.into_iter().collect())
    }
}
