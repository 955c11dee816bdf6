//! Error kind for the grid snapper (spec.md §4.2, §7 `SnapFailed`).

use mrsp_core::error::{CoreError, SnapFailure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapError {
    /// A vertex could not be placed within `maxdist` of any acceptable grid
    /// point after widening the search to the neighboring cells. Carries the
    /// offending vertex, its index and the candidate grid considered.
    #[error("snap failed: {0}")]
    SnapFailed(SnapFailure),
}

pub type SnapResult<T> = Result<T, SnapError>;

impl From<SnapError> for CoreError {
    fn from(e: SnapError) -> Self {
        match e {
            SnapError::SnapFailed(f) => CoreError::SnapFailed(f),
        }
    }
}
