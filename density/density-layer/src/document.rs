//! Explicit composition of layers into one map.

use density_types::Crs;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::choropleth::ChoroplethLayer;
use crate::error::{LayerError, LayerResult};
use crate::legend::Legend;
use crate::points::PointLayer;

/// Any layer a map document can hold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum Layer {
    /// Classified polygons.
    Choropleth(ChoroplethLayer),
    /// Event markers.
    Points(PointLayer),
}

impl Layer {
    /// CRS of the layer geometry.
    #[must_use]
    pub const fn crs(&self) -> &Crs {
        match self {
            Self::Choropleth(layer) => layer.crs(),
            Self::Points(layer) => layer.crs(),
        }
    }

    /// Short kind name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Choropleth(_) => "choropleth",
            Self::Points(_) => "points",
        }
    }
}

impl From<ChoroplethLayer> for Layer {
    fn from(layer: ChoroplethLayer) -> Self {
        Self::Choropleth(layer)
    }
}

impl From<PointLayer> for Layer {
    fn from(layer: PointLayer) -> Self {
        Self::Points(layer)
    }
}

/// An ordered stack of layers sharing one CRS.
///
/// Documents are values: [`MapDocument::with_layer`] consumes the document and
/// returns a new one, so there is no shared map being mutated behind the
/// caller's back.
///
/// # Example
///
/// ```
/// use density_join::JoinOutput;
/// use density_layer::{MapDocument, PointLayer};
/// use density_types::{Crs, PointCollection, PointRecord};
///
/// let points = PointCollection::new(Crs::conus_albers(), vec![PointRecord::new("p", 0.0, 0.0).unwrap()]).unwrap();
/// let joined = JoinOutput { associations: vec![], unmatched: vec!["p".into()], boundary_resolved: 0, point_count: 1 };
///
/// let doc = MapDocument::compose(Crs::conus_albers())
///     .with_layer(PointLayer::build(&points, &joined, &[], false))
///     .unwrap();
/// assert_eq!(doc.layers().len(), 1);
///
/// // Layers in another CRS are refused
/// let wgs = PointCollection::new(Crs::wgs84(), vec![PointRecord::new("q", 0.0, 0.0).unwrap()]).unwrap();
/// assert!(doc.with_layer(PointLayer::build(&wgs, &joined, &[], false)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapDocument {
    crs: Crs,
    layers: Vec<Layer>,
}

impl MapDocument {
    /// Start an empty document in the given CRS.
    #[must_use]
    pub const fn compose(crs: Crs) -> Self {
        Self {
            crs,
            layers: Vec::new(),
        }
    }

    /// Append a layer on top of the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::CrsMismatch`] if the layer's CRS differs from the
    /// document's.
    pub fn with_layer(mut self, layer: impl Into<Layer>) -> LayerResult<Self> {
        let layer = layer.into();
        if layer.crs() != &self.crs {
            return Err(LayerError::CrsMismatch {
                document: self.crs,
                layer: layer.crs().clone(),
            });
        }
        debug!(kind = layer.kind(), position = self.layers.len(), "Layer added to map");
        self.layers.push(layer);
        Ok(self)
    }

    /// Document CRS.
    #[must_use]
    pub const fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Layers, bottom first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The first choropleth layer, if any.
    #[must_use]
    pub fn choropleth(&self) -> Option<&ChoroplethLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Choropleth(c) => Some(c),
            Layer::Points(_) => None,
        })
    }

    /// The first point layer, if any.
    #[must_use]
    pub fn points(&self) -> Option<&PointLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Points(p) => Some(p),
            Layer::Choropleth(_) => None,
        })
    }

    /// Legends of every classified layer, bottom first.
    #[must_use]
    pub fn legends(&self) -> Vec<&Legend> {
        self.layers
            .iter()
            .filter_map(|layer| match layer {
                Layer::Choropleth(c) => Some(c.legend()),
                Layer::Points(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use density_join::JoinOutput;
    use density_types::{PointCollection, PointRecord};

    fn point_layer(crs: Crs) -> PointLayer {
        let points = PointCollection::new(crs, vec![PointRecord::new("p", 1.0, 1.0).unwrap()]).unwrap();
        let joined = JoinOutput {
            associations: Vec::new(),
            unmatched: vec!["p".to_string()],
            boundary_resolved: 0,
            point_count: 1,
        };
        PointLayer::build(&points, &joined, &[], true)
    }

    #[test]
    fn test_compose() {
        let doc = MapDocument::compose(Crs::ease_grid2())
            .with_layer(point_layer(Crs::ease_grid2()))
            .unwrap();
        assert_eq!(doc.crs(), &Crs::ease_grid2());
        assert_eq!(doc.layers()[0].kind(), "points");
        assert!(doc.points().is_some());
        assert!(doc.choropleth().is_none());
        assert!(doc.legends().is_empty());
    }

    #[test]
    fn test_crs_mismatch() {
        let err = MapDocument::compose(Crs::ease_grid2())
            .with_layer(point_layer(Crs::conus_albers()))
            .unwrap_err();
        assert!(matches!(err, LayerError::CrsMismatch { .. }));
    }
}
