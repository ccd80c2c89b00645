//! Error types for geometry construction and CRS handling.

use thiserror::Error;

use crate::crs::Crs;

/// Result type alias for geometry store operations.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised while building or querying geometry collections.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TypesError {
    /// A record has unusable geometry (non-finite coordinates, too few vertices).
    #[error("malformed geometry for '{id}': {reason}")]
    MalformedGeometry {
        /// Identifier of the offending record.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Two records in one collection share an identifier.
    #[error("duplicate identifier '{0}'")]
    DuplicateId(String),

    /// Planar area was requested in a degree-based CRS.
    #[error("planar area of '{id}' is meaningless in geographic CRS {crs}; reproject to an equal-area CRS first")]
    GeographicArea {
        /// Identifier of the polygon.
        id: String,
        /// The geographic CRS the collection is tagged with.
        crs: Crs,
    },

    /// A projection that expects geographic input was applied to other data.
    #[error("projection expects geographic (degree) input, collection is tagged {0}")]
    ProjectionSource(Crs),

    /// Projection parameters are unusable.
    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    /// Two collections were combined across CRS tags.
    #[error("CRS mismatch: {left} vs {right}")]
    CrsMismatch {
        /// CRS of the first operand.
        left: Crs,
        /// CRS of the second operand.
        right: Crs,
    },

    /// A positional lookup fell outside the collection.
    #[error("index {index} out of range for collection of {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Collection length.
        len: usize,
    },
}

impl TypesError {
    /// Create a malformed geometry error.
    #[must_use]
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a CRS mismatch error.
    #[must_use]
    pub fn crs_mismatch(left: &Crs, right: &Crs) -> Self {
        Self::CrsMismatch {
            left: left.clone(),
            right: right.clone(),
        }
    }

    /// Returns `true` if this is a CRS mismatch.
    #[must_use]
    pub const fn is_crs_mismatch(&self) -> bool {
        matches!(self, Self::CrsMismatch { .. })
    }

    /// Returns `true` if this is a geographic-area usage error.
    #[must_use]
    pub const fn is_geographic_area(&self) -> bool {
        matches!(self, Self::GeographicArea { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TypesError::malformed("tract-7", "ring has 2 vertices");
        let msg = err.to_string();
        assert!(msg.contains("tract-7"));
        assert!(msg.contains("2 vertices"));

        let err = TypesError::DuplicateId("a".into());
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_crs_mismatch_helper() {
        let err = TypesError::crs_mismatch(&Crs::wgs84(), &Crs::conus_albers());
        assert!(err.is_crs_mismatch());
        assert!(!err.is_geographic_area());
        let msg = err.to_string();
        assert!(msg.contains("EPSG:4326"));
        assert!(msg.contains("EPSG:5070"));
    }

    #[test]
    fn test_geographic_area_display() {
        let err = TypesError::GeographicArea {
            id: "county".into(),
            crs: Crs::wgs84(),
        };
        assert!(err.is_geographic_area());
        assert!(err.to_string().contains("equal-area"));
    }
}
