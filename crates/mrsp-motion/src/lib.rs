//! # mrsp-motion
//!
//! The C4 motion planners (spec.md §4.4): turn an unordered bag of open
//! toolpaths into a single traversal order, minimizing travel moves and
//! fusing paths whose endpoints already coincide.
//!
//! [`simple::simple_motion_plan`] is the greedy nearest-endpoint planner used
//! everywhere by default; [`overhang::overhang_aware_motion_plan`] additionally
//! prefers to keep the pen down over already-supported material when a
//! support region from previous slices is available, grounded in
//! `original_source/multi/motionPlanner.cpp`'s two planner entry points.

mod error;
mod nearest;
mod overhang;
mod simple;
mod split;

pub use error::{MotionError, MotionResult};
pub use nearest::PathCloseMode;
pub use overhang::overhang_aware_motion_plan;
pub use simple::{simple_motion_plan, StartState};
pub use split::split_inside_outside;
