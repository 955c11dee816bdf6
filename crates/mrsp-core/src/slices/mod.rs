//! Raw/input/output slice bookkeeping and the per-cell result (spec.md §3,
//! "Lifecycles"; §9 Design Notes on arena ownership).
//!
//! `OutputSlice` does not own a `ResultSingleTool`; it stores an `Option<usize>`
//! index into the per-tool arena the scheduler owns
//! (`ToolpathManager::slices_for_tool`, see `mrsp-sched`). This mirrors the
//! Design Notes' guidance to replace the source's shared-ownership cycle with
//! an arena + integer index, reconstructible after deserialization by walking
//! each tool's arena and writing back the owning `OutputSlice`'s index.

mod input;
mod output;
mod raw;
mod result;

pub use input::InputSlice;
pub use output::OutputSlice;
pub use raw::RawSlice;
pub use result::ResultSingleTool;
