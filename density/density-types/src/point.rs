//! Point-located event records.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeValue, Attributes};
use crate::error::{TypesError, TypesResult};

/// A single event located at a coordinate.
///
/// Records are immutable once built; builder methods consume and return
/// `self`.
///
/// # Example
///
/// ```
/// use density_types::PointRecord;
///
/// let incident = PointRecord::new("inc-1", 502_113.0, 181_220.5)
///     .unwrap()
///     .with_attribute("category", "Burglary");
///
/// assert_eq!(incident.id(), "inc-1");
/// assert_eq!(incident.attribute("category").and_then(|v| v.as_text()), Some("Burglary"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointRecord {
    id: String,
    position: Point2<f64>,
    attributes: Attributes,
}

impl PointRecord {
    /// Create a point record.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::MalformedGeometry`] if either coordinate is
    /// NaN or infinite.
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> TypesResult<Self> {
        let id = id.into();
        if !x.is_finite() || !y.is_finite() {
            return Err(TypesError::malformed(
                id,
                format!("non-finite coordinate ({x}, {y})"),
            ));
        }
        Ok(Self {
            id,
            position: Point2::new(x, y),
            attributes: Attributes::new(),
        })
    }

    /// Create a point record from a position.
    ///
    /// # Errors
    ///
    /// Same as [`PointRecord::new`].
    pub fn at(id: impl Into<String>, position: Point2<f64>) -> TypesResult<Self> {
        Self::new(id, position.x, position.y)
    }

    /// Attach one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace the attribute mapping.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Record identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Position in the collection's CRS.
    #[must_use]
    pub const fn position(&self) -> &Point2<f64> {
        &self.position
    }

    /// All attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up one attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Same record moved to a new position, used by reprojection.
    pub(crate) fn relocated(&self, position: Point2<f64>) -> TypesResult<Self> {
        Ok(Self::at(self.id.clone(), position)?.with_attributes(self.attributes.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_point() {
        let p = PointRecord::new("p", 1.0, 2.0).unwrap();
        assert_eq!(p.position(), &Point2::new(1.0, 2.0));
        assert!(p.attributes().is_empty());
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = PointRecord::new("bad", f64::NAN, 0.0).unwrap_err();
        assert!(err.to_string().contains("bad"));
        assert!(PointRecord::new("inf", 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_attributes() {
        let p = PointRecord::new("p", 0.0, 0.0)
            .unwrap()
            .with_attribute("severity", 3.0)
            .with_attribute("open", true);
        assert_eq!(p.attribute("severity").and_then(AttributeValue::as_number), Some(3.0));
        assert_eq!(p.attribute("open"), Some(&AttributeValue::Bool(true)));
        assert!(p.attribute("missing").is_none());
    }

    #[test]
    fn test_relocated_keeps_attributes() {
        let p = PointRecord::new("p", 0.0, 0.0).unwrap().with_attribute("k", "v");
        let moved = p.relocated(Point2::new(3.0, 4.0)).unwrap();
        assert_eq!(moved.id(), "p");
        assert_eq!(moved.position(), &Point2::new(3.0, 4.0));
        assert_eq!(moved.attributes(), p.attributes());
    }
}
