//! Render-ready event points.

use density_join::JoinOutput;
use density_types::{AttributeValue, Attributes, Crs, Point2, PointCollection};
use hashbrown::HashMap;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point with its selected display attributes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointFeature {
    /// Point identifier.
    pub id: String,
    /// Location in the layer CRS.
    pub position: Point2<f64>,
    /// Containing polygon, if the point was assigned.
    pub polygon_id: Option<String>,
    /// Requested attributes only; absent ones are `Null`.
    pub attributes: Attributes,
}

/// Event points prepared for display, in input order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointLayer {
    crs: Crs,
    features: Vec<PointFeature>,
    display_attributes: Vec<String>,
    cluster: bool,
}

impl PointLayer {
    /// Package points with the chosen attributes and their polygon assignment.
    ///
    /// `cluster` is a hint for the renderer to group nearby markers.
    #[must_use]
    pub fn build(points: &PointCollection, joined: &JoinOutput, display_attributes: &[String], cluster: bool) -> Self {
        let assigned: HashMap<&str, &str> = joined
            .associations
            .iter()
            .map(|a| (a.point_id.as_str(), a.polygon_id.as_str()))
            .collect();

        let features: Vec<PointFeature> = points
            .iter()
            .map(|point| PointFeature {
                id: point.id().to_owned(),
                position: *point.position(),
                polygon_id: assigned.get(point.id()).map(|&p| p.to_owned()),
                attributes: display_attributes
                    .iter()
                    .map(|key| (key.clone(), point.attribute(key).cloned().unwrap_or(AttributeValue::Null)))
                    .collect(),
            })
            .collect();

        debug!(
            features = features.len(),
            attributes = display_attributes.len(),
            cluster,
            "Point layer built"
        );

        Self {
            crs: points.crs().clone(),
            features,
            display_attributes: display_attributes.to_vec(),
            cluster,
        }
    }

    /// CRS of the positions.
    #[must_use]
    pub const fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Features in input order.
    #[must_use]
    pub fn features(&self) -> &[PointFeature] {
        &self.features
    }

    /// Attribute keys carried by every feature.
    #[must_use]
    pub fn display_attributes(&self) -> &[String] {
        &self.display_attributes
    }

    /// Renderer clustering hint.
    #[must_use]
    pub const fn cluster(&self) -> bool {
        self.cluster
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the layer has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use density_join::Association;
    use density_types::PointRecord;

    #[test]
    fn test_build_selects_attributes() {
        let points = PointCollection::new(
            Crs::conus_albers(),
            vec![
                PointRecord::new("p1", 1.0, 2.0)
                    .unwrap()
                    .with_attribute("category", "Theft")
                    .with_attribute("internal", "secret"),
                PointRecord::new("p2", 3.0, 4.0).unwrap(),
            ],
        )
        .unwrap();
        let joined = JoinOutput {
            associations: vec![Association {
                point_id: "p1".to_string(),
                polygon_id: "tract-1".to_string(),
            }],
            unmatched: vec!["p2".to_string()],
            boundary_resolved: 0,
            point_count: 2,
        };

        let layer = PointLayer::build(&points, &joined, &["category".to_string()], true);
        assert_eq!(layer.len(), 2);
        assert!(layer.cluster());
        assert_eq!(layer.display_attributes(), &["category".to_string()]);

        let p1 = &layer.features()[0];
        assert_eq!(p1.polygon_id.as_deref(), Some("tract-1"));
        assert_eq!(p1.attributes.len(), 1);
        assert_eq!(p1.attributes["category"].as_text(), Some("Theft"));
        assert_eq!(p1.position, Point2::new(1.0, 2.0));

        let p2 = &layer.features()[1];
        assert_eq!(p2.polygon_id, None);
        assert!(p2.attributes["category"].is_null());
    }
}
