//! Error kind for the medial-axis extractor.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedialError {
    /// The Voronoi kernel rejected the input or panicked on degenerate
    /// geometry (spec.md §4.1's "Failure mode" applied to C3's own kernel).
    #[error("voronoi diagram construction failed: {0}")]
    VoronoiBuildFailed(String),
}

pub type MedialResult<T> = Result<T, MedialError>;

impl From<MedialError> for mrsp_core::error::CoreError {
    fn from(e: MedialError) -> Self {
        mrsp_core::error::CoreError::InvalidGeometry(e.to_string())
    }
}
