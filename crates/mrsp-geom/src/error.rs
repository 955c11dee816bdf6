//! Error kind for the geometry façade (spec.md §4.1 "Failure mode").

use thiserror::Error;

/// Any kernel exception — from the clipping backend or the offsetting
/// backend — is translated into this single `InvalidGeometry` kind and
/// propagated, per spec.md §4.1.
#[derive(Error, Debug)]
pub enum GeomError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type GeomResult<T> = Result<T, GeomError>;

impl From<GeomError> for mrsp_core::error::CoreError {
    fn from(e: GeomError) -> Self {
        match e {
            GeomError::InvalidGeometry(msg) => mrsp_core::error::CoreError::InvalidGeometry(msg),
        }
    }
}
