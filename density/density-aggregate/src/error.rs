//! Error types for density aggregation.

use density_types::TypesError;
use thiserror::Error;

/// Result type alias for aggregation operations.
pub type DensityResult<T> = Result<T, DensityError>;

/// Errors that can occur while counting and normalising.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DensityError {
    /// An association names a polygon that is not in the collection.
    #[error("association references unknown polygon '{0}'")]
    UnknownPolygon(String),

    /// Density parameters are out of range.
    #[error("invalid density parameters: {0}")]
    InvalidParams(String),

    /// Area lookup failed (geographic CRS, bad index).
    #[error(transparent)]
    Geometry(#[from] TypesError),
}

impl DensityError {
    /// Create an invalid parameters error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Returns `true` if areas were requested in a geographic CRS.
    #[must_use]
    pub const fn is_geographic_area(&self) -> bool {
        matches!(self, Self::Geometry(e) if e.is_geographic_area())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use density_types::Crs;

    #[test]
    fn test_error_display() {
        let err = DensityError::UnknownPolygon("tract-9".to_string());
        assert!(err.to_string().contains("tract-9"));

        let err = DensityError::invalid_params("factor must be positive");
        assert!(err.to_string().contains("factor must be positive"));
        assert!(!err.is_geographic_area());
    }

    #[test]
    fn test_geographic_area_passthrough() {
        let err: DensityError = TypesError::GeographicArea {
            id: "ward".to_string(),
            crs: Crs::wgs84(),
        }
        .into();
        assert!(err.is_geographic_area());
        assert!(err.to_string().contains("ward"));
    }
}
