//! Area-normalised density table.

use std::fmt;

use density_join::JoinOutput;
use density_types::PolygonCollection;
use hashbrown::HashMap;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::counts::AssociationCounts;
use crate::error::{DensityError, DensityResult};
use crate::params::DensityParams;

/// A recovered condition raised while computing densities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DensityWarning {
    /// The polygon's area is zero, or too small for a finite density; its
    /// density was set to 0.
    DegenerateGeometry {
        /// Identifier of the polygon.
        polygon_id: String,
    },
}

impl fmt::Display for DensityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGeometry { polygon_id } => {
                write!(f, "polygon '{polygon_id}' has zero or vanishing area; density set to 0")
            }
        }
    }
}

/// Density of one polygon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DensityEntry {
    /// Polygon identifier.
    pub polygon_id: String,
    /// Number of associated points.
    pub count: usize,
    /// Planar area in native squared units.
    pub area: f64,
    /// `count / (area * unit_conversion_factor)`, or 0 when degenerate.
    pub density: f64,
    /// Set when the area could not normalise the count and `density` is a
    /// placeholder.
    pub degenerate: bool,
}

/// One density entry for every polygon, in polygon order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "TableRepr", into = "TableRepr"))]
pub struct DensityTable {
    entries: Vec<DensityEntry>,
    unit_conversion_factor: f64,
    warnings: Vec<DensityWarning>,
    /// Polygon id to position in `entries`.
    index: HashMap<String, usize>,
}

/// Serialized form of [`DensityTable`]; the id index is rebuilt on load.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct TableRepr {
    entries: Vec<DensityEntry>,
    unit_conversion_factor: f64,
    warnings: Vec<DensityWarning>,
}

#[cfg(feature = "serde")]
impl From<TableRepr> for DensityTable {
    fn from(repr: TableRepr) -> Self {
        Self::new(repr.entries, repr.unit_conversion_factor, repr.warnings)
    }
}

#[cfg(feature = "serde")]
impl From<DensityTable> for TableRepr {
    fn from(table: DensityTable) -> Self {
        Self {
            entries: table.entries,
            unit_conversion_factor: table.unit_conversion_factor,
            warnings: table.warnings,
        }
    }
}

impl DensityTable {
    fn new(entries: Vec<DensityEntry>, unit_conversion_factor: f64, warnings: Vec<DensityWarning>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.polygon_id.clone(), i))
            .collect();
        Self {
            entries,
            unit_conversion_factor,
            warnings,
            index,
        }
    }

    /// All entries, in polygon order.
    #[must_use]
    pub fn entries(&self) -> &[DensityEntry] {
        &self.entries
    }

    /// Entry for a polygon id.
    #[must_use]
    pub fn get(&self, polygon_id: &str) -> Option<&DensityEntry> {
        self.index.get(polygon_id).and_then(|&i| self.entries.get(i))
    }

    /// Density values, in polygon order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.density).collect()
    }

    /// Sum of counts over all polygons.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Largest density, or `None` for an empty table.
    #[must_use]
    pub fn max_density(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.density).reduce(f64::max)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Factor used to convert areas.
    #[must_use]
    pub const fn unit_conversion_factor(&self) -> f64 {
        self.unit_conversion_factor
    }

    /// Warnings raised while building the table.
    #[must_use]
    pub fn warnings(&self) -> &[DensityWarning] {
        &self.warnings
    }
}

/// Compute a density for every polygon from precomputed counts.
///
/// Polygons with no associations get count 0 and density 0. A polygon whose
/// converted area is zero, or so small that the quotient would not be
/// finite, keeps its entry with `degenerate = true` and density 0, and a
/// [`DensityWarning::DegenerateGeometry`] is recorded.
///
/// # Errors
///
/// Returns [`DensityError::InvalidParams`] for a bad factor,
/// [`DensityError::UnknownPolygon`] if `counts` names a polygon outside the
/// collection, or [`DensityError::Geometry`] if the collection is in a
/// geographic CRS.
pub fn compute_densities(
    polygons: &PolygonCollection,
    counts: &AssociationCounts,
    params: &DensityParams,
) -> DensityResult<DensityTable> {
    params.validate()?;
    if let Some(id) = counts.unknown_ids(polygons).next() {
        return Err(DensityError::UnknownPolygon(id.to_owned()));
    }

    let factor = params.unit_conversion_factor;
    let mut entries = Vec::with_capacity(polygons.len());
    let mut warnings = Vec::new();

    for (i, polygon) in polygons.iter().enumerate() {
        let area = polygons.checked_area(i)?;
        let count = counts.count(polygon.id());
        let denom = area * factor;
        #[allow(clippy::cast_precision_loss)]
        let quotient = count as f64 / denom;
        // Subnormal areas underflow to 0 or overflow the reciprocal
        let degenerate = denom <= 0.0 || !denom.recip().is_finite() || !quotient.is_finite();

        let density = if degenerate {
            warn!(polygon = polygon.id(), count, area, "Degenerate polygon area, density set to 0");
            warnings.push(DensityWarning::DegenerateGeometry {
                polygon_id: polygon.id().to_owned(),
            });
            0.0
        } else {
            quotient
        };

        entries.push(DensityEntry {
            polygon_id: polygon.id().to_owned(),
            count,
            area,
            density,
            degenerate,
        });
    }

    let table = DensityTable::new(entries, factor, warnings);

    debug!(
        polygons = table.len(),
        occupied = counts.occupied(),
        degenerate = table.warnings.len(),
        "Densities computed"
    );

    Ok(table)
}

/// Count a join's associations and compute densities.
///
/// # Errors
///
/// Same as [`AssociationCounts::from_associations`] and [`compute_densities`].
///
/// # Example
///
/// ```
/// use density_aggregate::{aggregate, DensityParams};
/// use density_join::{join_points, JoinParams};
/// use density_types::{Crs, PointCollection, PointRecord, PolygonCollection, PolygonRecord, Ring};
///
/// let crs = Crs::conus_albers();
/// let polygons = PolygonCollection::new(crs.clone(), vec![
///     PolygonRecord::from_exterior("lot", Ring::from_coords(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)])).unwrap(),
/// ]).unwrap();
/// let points = PointCollection::new(crs, vec![
///     PointRecord::new("a", 0.5, 0.5).unwrap(),
///     PointRecord::new("b", 1.5, 1.5).unwrap(),
/// ]).unwrap();
///
/// let joined = join_points(&points, &polygons, &JoinParams::default()).unwrap();
/// let table = aggregate(&joined, &polygons, &DensityParams::default()).unwrap();
/// assert_eq!(table.get("lot").unwrap().density, 0.5);
/// ```
pub fn aggregate(
    joined: &JoinOutput,
    polygons: &PolygonCollection,
    params: &DensityParams,
) -> DensityResult<DensityTable> {
    let counts = AssociationCounts::from_associations(&joined.associations, polygons)?;
    let table = compute_densities(polygons, &counts, params)?;

    info!(
        polygons = table.len(),
        points = table.total_count(),
        factor = params.unit_conversion_factor,
        max_density = table.max_density().unwrap_or(0.0),
        "Density aggregation complete"
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use density_join::Association;
    use density_types::{Crs, PolygonRecord, Ring};

    fn rect(id: &str, w: f64, h: f64) -> PolygonRecord {
        PolygonRecord::from_exterior(id, Ring::from_coords(&[(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)])).unwrap()
    }

    /// Areas 1, 2 and 0 (a flat sliver).
    fn polygons() -> PolygonCollection {
        let sliver = PolygonRecord::from_exterior(
            "sliver",
            Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
        )
        .unwrap();
        PolygonCollection::new(Crs::conus_albers(), vec![rect("one", 1.0, 1.0), rect("two", 2.0, 1.0), sliver])
            .unwrap()
    }

    fn counts(pairs: &[(&str, usize)]) -> AssociationCounts {
        let mut counts = AssociationCounts::new();
        let mut n = 0;
        for &(id, k) in pairs {
            for _ in 0..k {
                n += 1;
                counts.record(&Association {
                    point_id: format!("p{n}"),
                    polygon_id: id.to_string(),
                });
            }
        }
        counts
    }

    #[test]
    fn test_reference_densities() {
        let table = compute_densities(&polygons(), &counts(&[("one", 2), ("two", 4)]), &DensityParams::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.values(), vec![2.0, 2.0, 0.0]);
        assert_eq!(table.total_count(), 6);

        let sliver = table.get("sliver").unwrap();
        assert!(sliver.degenerate);
        assert_eq!(sliver.count, 0);
        assert_eq!(
            table.warnings(),
            &[DensityWarning::DegenerateGeometry {
                polygon_id: "sliver".to_string()
            }]
        );
    }

    #[test]
    fn test_order_and_coverage() {
        let table = compute_densities(&polygons(), &AssociationCounts::new(), &DensityParams::default()).unwrap();
        let ids: Vec<&str> = table.entries().iter().map(|e| e.polygon_id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two", "sliver"]);
        assert!(table.values().iter().all(|&d| d == 0.0));
        assert_eq!(table.max_density(), Some(0.0));
    }

    #[test]
    fn test_unit_factor() {
        // A 1000 m x 1000 m tract with 5 events is 5 per square kilometre
        let polys = PolygonCollection::new(Crs::conus_albers(), vec![rect("km", 1000.0, 1000.0)]).unwrap();
        let table = compute_densities(&polys, &counts(&[("km", 5)]), &DensityParams::per_square_kilometre()).unwrap();
        assert_relative_eq!(table.entries()[0].density, 5.0, epsilon = 1e-9);
        assert_relative_eq!(table.unit_conversion_factor(), 1e-6);
    }

    #[test]
    fn test_unknown_polygon_in_counts() {
        let err = compute_densities(&polygons(), &counts(&[("ghost", 1)]), &DensityParams::default()).unwrap_err();
        assert!(matches!(err, DensityError::UnknownPolygon(_)));
    }

    #[test]
    fn test_geographic_crs_rejected() {
        let polys = PolygonCollection::new(Crs::wgs84(), vec![rect("deg", 1.0, 1.0)]).unwrap();
        let err = compute_densities(&polys, &AssociationCounts::new(), &DensityParams::default()).unwrap_err();
        assert!(err.is_geographic_area());
    }

    #[test]
    fn test_invalid_factor() {
        let err = compute_densities(
            &polygons(),
            &AssociationCounts::new(),
            &DensityParams::default().with_unit_factor(0.0),
        )
        .unwrap_err();
        assert!(matches!(err, DensityError::InvalidParams(_)));
    }

    #[test]
    fn test_warning_display() {
        let w = DensityWarning::DegenerateGeometry {
            polygon_id: "x".to_string(),
        };
        assert!(w.to_string().contains("zero or vanishing area"));
    }

    #[test]
    fn test_vanishing_area_is_degenerate() {
        // 1e-160 squared underflows to a subnormal, whose reciprocal is infinite
        let polys = PolygonCollection::new(Crs::conus_albers(), vec![rect("tiny", 1e-160, 1e-160), rect("one", 1.0, 1.0)])
            .unwrap();
        let table = compute_densities(&polys, &counts(&[("tiny", 1), ("one", 3)]), &DensityParams::default()).unwrap();

        let tiny = table.get("tiny").unwrap();
        assert!(tiny.degenerate);
        assert_eq!(tiny.count, 1);
        assert_eq!(tiny.density, 0.0);
        assert!(table.values().iter().all(|d| d.is_finite()));
        assert_eq!(table.max_density(), Some(3.0));
        assert_eq!(
            table.warnings(),
            &[DensityWarning::DegenerateGeometry {
                polygon_id: "tiny".to_string()
            }]
        );
    }

    #[test]
    fn test_factor_underflow_is_degenerate() {
        // A valid area times a tiny factor can still underflow to zero
        let polys = PolygonCollection::new(Crs::conus_albers(), vec![rect("small", 1e-200, 1.0)]).unwrap();
        let table = compute_densities(
            &polys,
            &counts(&[("small", 2)]),
            &DensityParams::default().with_unit_factor(1e-200),
        )
        .unwrap();
        assert!(table.entries()[0].degenerate);
        assert_eq!(table.entries()[0].density, 0.0);
        assert_eq!(table.warnings().len(), 1);
    }

    #[test]
    fn test_lookup_by_id() {
        let ids: Vec<String> = (0..500).map(|i| format!("tract-{i}")).collect();
        let polys = PolygonCollection::new(
            Crs::conus_albers(),
            ids.iter().map(|id| rect(id, 1.0, 1.0)).collect(),
        )
        .unwrap();
        let table = compute_densities(&polys, &counts(&[("tract-499", 2), ("tract-7", 1)]), &DensityParams::default())
            .unwrap();
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(table.get(id).unwrap(), &table.entries()[i]);
        }
        assert_eq!(table.get("tract-499").unwrap().count, 2);
        assert_eq!(table.get("tract-7").unwrap().density, 1.0);
        assert!(table.get("tract-500").is_none());
    }
}
