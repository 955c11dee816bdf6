//! # mrsp-core
//!
//! Shared data model for the multi-resolution toolpath planner: the 2D
//! geometry primitives (§3), the per-process and global configuration
//! structs, the raw/input/output slice bookkeeping types, and the error
//! kinds shared by every other crate in the workspace.
//!
//! This crate has no dependency on a concrete clipping/offsetting kernel —
//! that binding lives in `mrsp-geom`. Everything here is plain data plus the
//! pure-math helpers (point-in-polygon, signed area, orientation) that do not
//! require an external geometry kernel.

pub mod error;
pub mod geometry;
pub mod slices;
pub mod spec;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use geometry::{BoundingBox, HoledPolygon, Path, Point, Point3, PolygonSet};
pub use slices::{InputSlice, OutputSlice, RawSlice, ResultSingleTool};
pub use spec::{GlobalSpec, InfillingMode, ProcessSpec, SchedulingMode, VoxelProfile};
