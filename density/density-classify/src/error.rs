//! Error types for classification.

use thiserror::Error;

/// Result type alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Errors that can occur while computing class breaks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassifyError {
    /// No values to classify.
    #[error("cannot classify an empty sequence")]
    EmptyInput,

    /// Fewer than two classes were requested.
    #[error("class count must be at least 2, got {0}")]
    InvalidClassCount(usize),

    /// An input value is NaN or infinite.
    #[error("value at index {index} is not finite ({value})")]
    NonFiniteValue {
        /// Position in the input sequence.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// The data has too few distinct values for the requested classes.
    #[error("{requested} classes requested but only {distinct} distinct values present")]
    InsufficientDistinctValues {
        /// Class count asked for.
        requested: usize,
        /// Distinct values available.
        distinct: usize,
    },

    /// Boundaries are not a strictly increasing sequence of finite values.
    #[error("invalid breaks: {0}")]
    InvalidBreaks(String),

    /// A classifier name did not match any known algorithm.
    #[error("unknown classifier '{0}' (expected equal-interval, quantile or natural-breaks)")]
    UnknownClassifier(String),

    /// A degenerate-input policy name was not recognised.
    #[error("unknown degenerate policy '{0}' (expected collapse or strict)")]
    UnknownPolicy(String),

    /// Classification parameters are out of range.
    #[error("invalid classification parameters: {0}")]
    InvalidParams(String),
}

impl ClassifyError {
    /// Create an invalid breaks error.
    #[must_use]
    pub fn invalid_breaks(details: impl Into<String>) -> Self {
        Self::InvalidBreaks(details.into())
    }

    /// Create an invalid parameters error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Returns `true` if the input had too few distinct values.
    #[must_use]
    pub const fn is_insufficient_distinct(&self) -> bool {
        matches!(self, Self::InsufficientDistinctValues { .. })
    }
}
