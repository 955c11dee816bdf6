//! Error kinds for the external-interface crate (spec.md §6, §7).

use thiserror::Error;

/// Errors surfaced by the paths-file reader/writer, the mesh-slicer
/// subprocess client, CLI parsing and configuration loading.
#[derive(Error, Debug)]
pub enum IoKindError {
    /// Short read/write, magic mismatch, unsupported version.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The paths-file magic did not read back `"PATH"`.
    #[error("bad paths-file magic: expected \"PATH\", found {0:?}")]
    BadMagic([u8; 4]),

    /// The paths-file version is not one this reader understands.
    #[error("unsupported paths-file version: {0}")]
    UnsupportedVersion(u32),

    /// A `saveFormat` tag outside `{0, 1, 2}`.
    #[error("unsupported save format: {0}")]
    UnsupportedSaveFormat(i64),

    /// The mesh-slicer child exited unexpectedly or reported non-repairable
    /// geometry.
    #[error("mesh slicer error: {0}")]
    Slicer(String),

    /// Malformed configuration file or missing required key.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unrecognized option, missing per-process option, bad schedule spec.
    #[error("arguments error: {0}")]
    Arguments(String),

    /// TOML deserialization failure.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type IoKindResult<T> = Result<T, IoKindError>;

impl From<IoKindError> for mrsp_core::CoreError {
    fn from(e: IoKindError) -> Self {
        match e {
            IoKindError::Io(err) => mrsp_core::CoreError::IoError(err.to_string()),
            IoKindError::BadMagic(_) | IoKindError::UnsupportedVersion(_) | IoKindError::UnsupportedSaveFormat(_) => {
                mrsp_core::CoreError::IoError(e.to_string())
            }
            IoKindError::Slicer(msg) => mrsp_core::CoreError::SlicerError(msg),
            IoKindError::Config(msg) => mrsp_core::CoreError::ConfigError(msg),
            IoKindError::Arguments(msg) => mrsp_core::CoreError::ArgumentsError(msg),
            IoKindError::Toml(err) => mrsp_core::CoreError::ConfigError(err.to_string()),
        }
    }
}
