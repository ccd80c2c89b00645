//! Error types for layer assembly.

use density_types::Crs;
use thiserror::Error;

/// Result type alias for layer assembly.
pub type LayerResult<T> = Result<T, LayerError>;

/// Errors that can occur while attaching densities and classes to records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LayerError {
    /// A polygon has no entry in the density table.
    #[error("polygon '{id}' has no density entry")]
    MissingDensity {
        /// Polygon identifier.
        id: String,
    },

    /// A density falls outside the classification domain.
    #[error("density {value} of polygon '{id}' lies outside the class breaks")]
    ValueOutsideBreaks {
        /// Polygon identifier.
        id: String,
        /// The unclassifiable density.
        value: f64,
    },

    /// A layer was added to a document in a different CRS.
    #[error("layer CRS {layer} does not match document CRS {document}")]
    CrsMismatch {
        /// CRS of the document.
        document: Crs,
        /// CRS of the rejected layer.
        layer: Crs,
    },

    /// Style settings are out of range.
    #[error("invalid style: {0}")]
    InvalidStyle(String),
}

impl LayerError {
    /// Create an invalid style error.
    #[must_use]
    pub fn invalid_style(details: impl Into<String>) -> Self {
        Self::InvalidStyle(details.into())
    }

    /// Returns `true` for a density outside the breaks.
    #[must_use]
    pub const fn is_value_outside_breaks(&self) -> bool {
        matches!(self, Self::ValueOutsideBreaks { .. })
    }
}
