//! # mrsp-sched
//!
//! The C6 toolpath manager and 3D slicing scheduler (spec.md §4.6),
//! grounded in `original_source/multi/3d.hpp`/`3d.cpp`'s `ToolpathManager`
//! and `SimpleSlicingScheduler`. Builds the `(Z, tool)` schedule for a
//! run (uniform / two-photon "simple" / manual), wires up cross-slice
//! contour dependencies for support/overhang/surface differentiation,
//! drives each input through `mrsp-slice`'s Phase-1/Phase-2 split with
//! the toolpath manager's already-filled reconstruction in between, and
//! garbage-collects raw slices, committed results, and feedback contours
//! once they fall far enough behind the sweep.
//!
//! Per spec.md §9 Design Notes, `OutputSlice` never owns a
//! `ResultSingleTool` directly; the scheduler keeps one arena per tool in
//! [`toolpath_manager::ToolpathManager::slices_for_tool`] and
//! `OutputSlice::result_index` is a non-owning index into it.

pub mod dependencies;
pub mod error;
pub mod gc;
pub mod schedule;
pub mod scheduler;
pub mod toolpath_manager;

pub use error::{SchedError, SchedResult};
pub use scheduler::SimpleSlicingScheduler;
pub use toolpath_manager::ToolpathManager;
