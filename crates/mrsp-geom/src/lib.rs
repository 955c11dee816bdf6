//! # mrsp-geom
//!
//! The C1 geometry façade (spec.md §4.1): clipping (union/difference/
//! intersection/xor) and offsetting (positive/negative, join/end styles)
//! over [`mrsp_core::PolygonSet`], plus the composed `offset2` helper and
//! `orient_paths` re-export.
//!
//! The façade itself does not implement a clipping kernel — per spec.md §1
//! that is an external collaborator. It binds to the two real kernels the
//! teacher crate (`gcodekit5-camtools`/`gcodekit5-designer`) already uses:
//! `csgrs` (boolean ops, via its `Sketch`/multipolygon conversion) for
//! clipping, and `cavalier_contours` (`Polyline::parallel_offset`) for
//! offsetting. Any kernel panic or rejected input is translated into
//! [`GeomError::InvalidGeometry`] the way spec.md §4.1's "Failure mode"
//! requires.

mod clip;
mod convert;
mod error;
mod offset;

pub use clip::{clip, ClipOp};
pub use error::{GeomError, GeomResult};
pub use mrsp_core::geometry::orient_paths;
pub use offset::{offset, offset2, EndType, JoinStyle};
