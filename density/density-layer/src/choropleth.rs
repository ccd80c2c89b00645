//! Polygon layer carrying density and class.

use density_aggregate::DensityTable;
use density_classify::Breaks;
use density_types::{Attributes, Crs, PolygonCollection, Shell};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LayerError, LayerResult};
use crate::legend::Legend;
use crate::style::{ChoroplethStyle, Rgb};

/// A polygon with its density attached.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChoroplethFeature {
    /// Polygon identifier.
    pub id: String,
    /// Geometry, copied unchanged from the polygon record.
    pub shells: Vec<Shell>,
    /// Area-normalised density.
    pub density: f64,
    /// Number of associated points.
    pub count: usize,
    /// Class index, or `None` for a degenerate polygon.
    pub bin_index: Option<usize>,
    /// Fill colour for the class.
    pub fill_color: Rgb,
    /// Polygon without a usable area; its density is a placeholder.
    pub degenerate: bool,
    /// Original polygon attributes.
    pub attributes: Attributes,
}

/// Classified polygon layer, in polygon order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChoroplethLayer {
    crs: Crs,
    features: Vec<ChoroplethFeature>,
    breaks: Breaks,
    style: ChoroplethStyle,
    legend: Legend,
}

impl ChoroplethLayer {
    /// Attach densities and classes to every polygon.
    ///
    /// Polygon order is preserved. A degenerate polygon never gets a class,
    /// even when its placeholder density falls inside the breaks, and is
    /// filled with the style's no-data colour.
    ///
    /// # Errors
    ///
    /// - [`LayerError::MissingDensity`] if a polygon has no density entry
    /// - [`LayerError::ValueOutsideBreaks`] if a regular density cannot be classified
    /// - [`LayerError::InvalidStyle`] for out-of-range opacities
    pub fn build(
        polygons: &PolygonCollection,
        densities: &DensityTable,
        breaks: &Breaks,
        style: &ChoroplethStyle,
    ) -> LayerResult<Self> {
        style.validate()?;
        let colors = style.palette.colors(breaks.class_count());
        let mut class_counts = vec![0; breaks.class_count()];

        let mut features = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            let entry = densities.get(polygon.id()).ok_or_else(|| LayerError::MissingDensity {
                id: polygon.id().to_owned(),
            })?;

            let bin_index = if entry.degenerate {
                warn!(polygon = polygon.id(), "Degenerate polygon left unclassified");
                None
            } else {
                let bin = breaks.bin_index(entry.density).ok_or_else(|| LayerError::ValueOutsideBreaks {
                    id: polygon.id().to_owned(),
                    value: entry.density,
                })?;
                Some(bin)
            };

            let fill_color = match bin_index {
                Some(bin) => {
                    class_counts[bin] += 1;
                    colors[bin]
                }
                None => style.no_data_color,
            };

            features.push(ChoroplethFeature {
                id: polygon.id().to_owned(),
                shells: polygon.shells().to_vec(),
                density: entry.density,
                count: entry.count,
                bin_index,
                fill_color,
                degenerate: entry.degenerate,
                attributes: polygon.attributes().clone(),
            });
        }

        let legend = Legend::new(style.legend_name.clone(), breaks, &colors, &class_counts);
        debug!(features = features.len(), classes = breaks.class_count(), "Choropleth layer built");

        Ok(Self {
            crs: polygons.crs().clone(),
            features,
            breaks: breaks.clone(),
            style: style.clone(),
            legend,
        })
    }

    /// CRS of the geometry.
    #[must_use]
    pub const fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Features in polygon order.
    #[must_use]
    pub fn features(&self) -> &[ChoroplethFeature] {
        &self.features
    }

    /// Feature by polygon id.
    #[must_use]
    pub fn feature(&self, id: &str) -> Option<&ChoroplethFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Class breaks used.
    #[must_use]
    pub const fn breaks(&self) -> &Breaks {
        &self.breaks
    }

    /// Styling.
    #[must_use]
    pub const fn style(&self) -> &ChoroplethStyle {
        &self.style
    }

    /// Legend with per-class feature counts.
    #[must_use]
    pub const fn legend(&self) -> &Legend {
        &self.legend
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
    use density_aggregate::{compute_densities, AssociationCounts, DensityParams};
    use density_join::Association;
    use density_types::{PolygonRecord, Ring};

    fn polygons() -> PolygonCollection {
        let rect = |id: &str, w: f64| {
            PolygonRecord::from_exterior(id, Ring::from_coords(&[(0.0, 0.0), (w, 0.0), (w, 1.0), (0.0, 1.0)]))
                .unwrap()
                .with_attribute("name", id.to_uppercase())
        };
        let sliver = PolygonRecord::from_exterior("flat", Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0)])).unwrap();
        PolygonCollection::new(Crs::conus_albers(), vec![rect("a", 1.0), rect("b", 2.0), rect("c", 4.0), sliver]).unwrap()
    }

    fn table(polys: &PolygonCollection, pairs: &[(&str, usize)]) -> DensityTable {
        let mut counts = AssociationCounts::new();
        for &(id, n) in pairs {
            for i in 0..n {
                counts.record(&Association {
                    point_id: format!("{id}{i}"),
                    polygon_id: id.to_string(),
                });
            }
        }
        compute_densities(polys, &counts, &DensityParams::default()).unwrap()
    }

    #[test]
    fn test_build_attaches_classes() {
        let polys = polygons();
        // Densities 8, 2, 0.5, 0 (degenerate)
        let densities = table(&polys, &[("a", 8), ("b", 4), ("c", 2)]);
        let breaks = Breaks::new(vec![0.5, 1.0, 8.0]).unwrap();
        let layer = ChoroplethLayer::build(&polys, &densities, &breaks, &ChoroplethStyle::default()).unwrap();

        let ids: Vec<&str> = layer.features().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "flat"]);

        let a = layer.feature("a").unwrap();
        assert_eq!(a.bin_index, Some(1));
        assert_eq!(a.count, 8);
        assert_eq!(a.attributes.get("name").and_then(|v| v.as_text()), Some("A"));
        assert_eq!(layer.feature("c").unwrap().bin_index, Some(0));

        let flat = layer.feature("flat").unwrap();
        assert!(flat.degenerate);
        assert_eq!(flat.bin_index, None);
        assert_eq!(flat.fill_color, ChoroplethStyle::default().no_data_color);

        let legend = layer.legend();
        assert_eq!(legend.len(), 2);
        assert_eq!(legend.entries[0].count, 1);
        assert_eq!(legend.entries[1].count, 2);
        assert_eq!(layer.crs(), &Crs::conus_albers());
    }

    #[test]
    fn test_degenerate_inside_breaks_stays_unclassified() {
        let polys = polygons();
        // "c" is empty, so 0 lies inside the breaks for both "c" and "flat"
        let densities = table(&polys, &[("a", 8), ("b", 4)]);
        let breaks = Breaks::new(vec![0.0, 1.0, 8.0]).unwrap();
        assert_eq!(breaks.bin_index(0.0), Some(0));
        let style = ChoroplethStyle::default();
        let layer = ChoroplethLayer::build(&polys, &densities, &breaks, &style).unwrap();

        let c = layer.feature("c").unwrap();
        assert!(!c.degenerate);
        assert_eq!(c.bin_index, Some(0));
        assert_ne!(c.fill_color, style.no_data_color);

        let flat = layer.feature("flat").unwrap();
        assert!(flat.degenerate);
        assert_eq!(flat.density, 0.0);
        assert_eq!(flat.bin_index, None);
        assert_eq!(flat.fill_color, style.no_data_color);

        let counts: Vec<usize> = layer.legend().entries.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![1, 2]);
    }

    #[test]
    fn test_value_outside_breaks() {
        let polys = polygons();
        let densities = table(&polys, &[("a", 8), ("b", 4), ("c", 2)]);
        let breaks = Breaks::new(vec![1.0, 2.0, 8.0]).unwrap();
        let err = ChoroplethLayer::build(&polys, &densities, &breaks, &ChoroplethStyle::default()).unwrap_err();
        assert!(matches!(err, LayerError::ValueOutsideBreaks { ref id, .. } if id == "c"));
    }

    #[test]
    fn test_missing_density() {
        let polys = polygons();
        let others = PolygonCollection::new(
            Crs::conus_albers(),
            vec![PolygonRecord::from_exterior("z", Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])).unwrap()],
        )
        .unwrap();
        let densities = table(&others, &[]);
        let breaks = Breaks::new(vec![0.0, 1.0]).unwrap();
        let err = ChoroplethLayer::build(&polys, &densities, &breaks, &ChoroplethStyle::default()).unwrap_err();
        assert!(matches!(err, LayerError::MissingDensity { ref id } if id == "a"));
    }
}
