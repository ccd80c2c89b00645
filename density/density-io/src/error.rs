//! Error types for GeoJSON I/O.

use std::path::PathBuf;

use density_types::TypesError;
use thiserror::Error;

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading or writing layers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// JSON parsed but is not the GeoJSON we expect.
    #[error("invalid GeoJSON: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// A feature's geometry could not be turned into a record.
    #[error(transparent)]
    Geometry(#[from] TypesError),

    /// JSON syntax or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
