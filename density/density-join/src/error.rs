//! Error types for spatial join operations.

use density_types::Crs;
use thiserror::Error;

/// Result type alias for join operations.
pub type JoinResult<T> = Result<T, JoinError>;

/// Errors that can occur while joining points to polygons.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JoinError {
    /// Points and polygons carry different CRS tags.
    #[error("CRS mismatch: points are {points}, polygons are {polygons}; reproject before joining")]
    CrsMismatch {
        /// CRS of the point collection.
        points: Crs,
        /// CRS of the polygon collection.
        polygons: Crs,
    },

    /// One of the input collections is empty.
    #[error("cannot join: {0} collection is empty")]
    EmptyInput(&'static str),

    /// Join parameters are out of range.
    #[error("invalid join parameters: {0}")]
    InvalidParams(String),

    /// A partition referenced a polygon index past the end of the collection.
    #[error("partition references polygon {index}, collection has {len}")]
    PartitionOutOfRange {
        /// Offending polygon index.
        index: usize,
        /// Polygon count.
        len: usize,
    },

    /// Partial joins built over different point sets were merged.
    #[error("cannot merge partial joins over {left} and {right} points")]
    PartitionMismatch {
        /// Point count of the receiving partial join.
        left: usize,
        /// Point count of the merged-in partial join.
        right: usize,
    },
}

impl JoinError {
    /// Create an invalid parameters error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Returns `true` if this is a CRS mismatch.
    #[must_use]
    pub const fn is_crs_mismatch(&self) -> bool {
        matches!(self, Self::CrsMismatch { .. })
    }
}
