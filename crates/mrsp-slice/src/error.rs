//! Error kind for the per-process pipeline (spec.md §4.5 "Error semantics":
//! "the multislicer labels it with the process index and the step name").

use thiserror::Error;

/// The underlying failure behind a [`SliceError`], independent of which
/// process/step it happened in.
#[derive(Error, Debug)]
pub enum StepFailure {
    #[error(transparent)]
    Geom(#[from] mrsp_geom::GeomError),
    #[error(transparent)]
    Snap(#[from] mrsp_snap::SnapError),
    #[error(transparent)]
    Medial(#[from] mrsp_medial::MedialError),
    #[error(transparent)]
    Motion(#[from] mrsp_motion::MotionError),
    #[error("{0}")]
    Inconsistent(String),
}

/// A step failure tagged with the process index and step name it occurred
/// in, so the caller can report exactly where in the pipeline things broke.
#[derive(Error, Debug)]
#[error("process #{process_index} step '{step}': {source}")]
pub struct SliceError {
    pub process_index: usize,
    pub step: &'static str,
    #[source]
    pub source: StepFailure,
}

pub type SliceResult<T> = Result<T, SliceError>;

impl SliceError {
    pub fn new(process_index: usize, step: &'static str, source: impl Into<StepFailure>) -> Self {
        SliceError { process_index, step, source: source.into() }
    }
}

impl From<SliceError> for mrsp_core::error::CoreError {
    fn from(e: SliceError) -> Self {
        match e.source {
            StepFailure::Geom(g) => mrsp_core::error::CoreError::InvalidGeometry(format!(
                "process #{} step '{}': {g}",
                e.process_index, e.step
            )),
            StepFailure::Snap(mrsp_snap::SnapError::SnapFailed(f)) => {
                mrsp_core::error::CoreError::SnapFailed(f)
            }
            other => mrsp_core::error::CoreError::SlicerError(format!(
                "process #{} step '{}': {other}",
                e.process_index, e.step
            )),
        }
    }
}

/// Small helper so pipeline steps can write `.map_err(tag(k, "step"))?`
/// instead of repeating the [`SliceError::new`] call at every site.
pub(crate) fn tag<E: Into<StepFailure>>(
    process_index: usize,
    step: &'static str,
) -> impl FnOnce(E) -> SliceError {
    move |e| SliceError::new(process_index, step, e)
}
