//! Error kinds shared across the workspace (spec §7).
//!
//! Each downstream crate defines its own fine-grained error enum and converts
//! into [`CoreError`] via `#[from]`, the way `gcodekit5-settings::error`
//! converts `ConfigError`/`PersistenceError` into `SettingsError`.

use thiserror::Error;

/// Vertex that a grid-snap operation could not place within `maxdist`.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapFailure {
    /// Index of the offending vertex within its path.
    pub vertex_index: usize,
    /// Coordinates of the offending vertex.
    pub vertex: (i64, i64),
    /// The candidate grid points that were considered and rejected.
    pub candidates: Vec<(i64, i64)>,
}

impl std::fmt::Display for SnapFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vertex #{} at ({}, {}), {} candidate grid point(s) considered",
            self.vertex_index, self.vertex.0, self.vertex.1, self.candidates.len()
        )
    }
}

/// The top-level error kinds named in spec.md §7.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed configuration file or missing required key.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Unrecognized option, missing per-process option, malformed schedule spec.
    #[error("arguments error: {0}")]
    ArgumentsError(String),

    /// The clipping/offsetting kernel rejected the input.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The grid snapper could not place a vertex within `maxdist`.
    #[error("snap failed: {0}")]
    SnapFailed(SnapFailure),

    /// A manual schedule demanded a cross-slice dependency before it
    /// completed Phase 1.
    #[error("schedule inconsistent: {0}")]
    ScheduleInconsistent(String),

    /// Short read/write, magic mismatch, unsupported version.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The mesh-slicer child exited unexpectedly or reported non-repairable
    /// geometry.
    #[error("slicer error: {0}")]
    SlicerError(String),

    /// A branch the original implementation's authors documented as
    /// unreachable was in fact reached (spec.md §9 Open Questions).
    #[error("bug marker reached: {0}")]
    BugMarker(String),
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::IoError(e.to_string())
    }
}

/// Result alias used throughout the workspace for the shared error kinds.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_failure_display_contains_vertex_index() {
        let failure = SnapFailure {
            vertex_index: 3,
            vertex: (10, 20),
            candidates: vec![(10, 20), (20, 20)],
        };
        let err = CoreError::SnapFailed(failure);
        let msg = err.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("10, 20"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::IoError(_)));
    }
}
