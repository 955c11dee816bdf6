//! # mrsp-io
//!
//! External interfaces (spec.md §6), specified precisely enough at the
//! byte/flag level to be thin, fully tested adapter code rather than part
//! of the core algorithm crates: the paths-file binary container, the
//! mesh-slicer subprocess protocol, TOML configuration loading, CLI
//! argument parsing, and a minimal output-writer delegator standing in for
//! the out-of-scope DXF/SVG/GWL formatters.

pub mod cli;
pub mod config;
pub mod error;
pub mod pathsfile;
pub mod subprocess;
pub mod writer;

pub use error::{IoKindError, IoKindResult};
