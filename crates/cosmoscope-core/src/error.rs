//! Error types for cosmoscope.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for cosmoscope operations.
#[derive(Error, Debug)]
pub enum CosmoError {
    /// Per-point arrays that must be parallel have different lengths.
    #[error("data size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An operation that needs at least one sample point got none.
    #[error("no surface points to process")]
    EmptyInput,

    /// The requested scalar channel is not one of charge, potential, surface-charge.
    #[error("unsupported color_by option: '{0}' (expected charge, potential or surface-charge)")]
    UnsupportedColorBy(String),

    /// No color map is registered under the given name.
    #[error("unknown color map '{0}'")]
    UnknownColorMap(String),

    /// A configuration value is out of its valid range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// A file could not be parsed.
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CosmoError {
    /// Shorthand for [`CosmoError::InvalidOption`].
    pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for cosmoscope operations.
pub type Result<T> = std::result::Result<T, CosmoError>;
