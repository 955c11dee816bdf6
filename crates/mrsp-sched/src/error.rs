//! Error kind for the scheduler and toolpath manager (spec.md §7:
//! `ScheduleInconsistent`, plus geometry/slicing failures bubbled up from
//! `mrsp-slice` and `mrsp-geom`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedError {
    /// A manual schedule demanded a cross-slice dependency before it had
    /// completed Phase-1 (spec.md §4.6 "this means the manual schedule has
    /// become inconsistent").
    #[error("schedule inconsistent: {0}")]
    ScheduleInconsistent(String),

    /// The caller asked for an input/output/raw slice index that does not
    /// exist, or delivered a raw slice out of the scheduled order.
    #[error("scheduler misuse: {0}")]
    Misuse(String),

    #[error(transparent)]
    Slice(#[from] mrsp_slice::error::SliceError),

    #[error(transparent)]
    Geom(#[from] mrsp_geom::GeomError),
}

pub type SchedResult<T> = Result<T, SchedError>;

impl From<SchedError> for mrsp_core::error::CoreError {
    fn from(e: SchedError) -> Self {
        match e {
            SchedError::ScheduleInconsistent(m) => mrsp_core::error::CoreError::ScheduleInconsistent(m),
            SchedError::Misuse(m) => mrsp_core::error::CoreError::ScheduleInconsistent(m),
            SchedError::Slice(s) => s.into(),
            SchedError::Geom(g) => mrsp_core::error::CoreError::InvalidGeometry(g.to_string()),
        }
    }
}
