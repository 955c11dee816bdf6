//! Error kind for the motion planners.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotionError {
    /// The nearest-path search found no valid candidate while the caller's
    /// own bookkeeping still counted one as remaining, mirroring the
    /// `"NEVER HAPPEN in ..."` runtime errors the original planners raise
    /// when their invariants are violated.
    #[error("motion planner invariant violated: {0}")]
    Inconsistent(String),
}

pub type MotionResult<T> = Result<T, MotionError>;

impl From<MotionError> for mrsp_core::error::CoreError {
    fn from(e: MotionError) -> Self {
        mrsp_core::error::CoreError::BugMarker(e.to_string())
    }
}
