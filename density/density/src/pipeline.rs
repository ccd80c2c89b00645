//! End-to-end run: join, aggregate, classify, assemble.

use density_aggregate::{aggregate, DensityTable};
use density_classify::{classify, Classification};
use density_join::{join_points, JoinOutput};
use density_layer::{ChoroplethLayer, MapDocument, PointLayer};
use density_types::GeometryStore;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineResult, PipelineWarning};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Point-to-polygon associations.
    pub join: JoinOutput,
    /// One density entry per polygon.
    pub densities: DensityTable,
    /// Breaks over the non-degenerate densities.
    pub classification: Classification,
    /// Choropleth and point layers, in that order.
    pub document: MapDocument,
    /// Recovered conditions from every stage.
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineOutput {
    /// The choropleth layer.
    #[must_use]
    pub fn choropleth(&self) -> Option<&ChoroplethLayer> {
        self.document.choropleth()
    }

    /// The point layer.
    #[must_use]
    pub fn points(&self) -> Option<&PointLayer> {
        self.document.points()
    }
}

/// Run the pipeline over one geometry store.
///
/// The configuration is validated before any stage runs. If a reprojection is
/// configured both collections are projected first; otherwise they must
/// already share a CRS. Degenerate polygons are excluded from classification
/// and rendered with the style's no-data colour.
///
/// # Errors
///
/// Any stage's fatal error aborts the run: invalid configuration, CRS
/// mismatch, empty collections, too few distinct densities to classify, or a
/// failed reprojection.
///
/// # Example
///
/// ```
/// use density::{run, PipelineConfig};
/// use density::types::{
///     Crs, GeometryStore, PointCollection, PointRecord, PolygonCollection, PolygonRecord, Ring,
/// };
///
/// let square = |id: &str, x0: f64| {
///     PolygonRecord::from_exterior(
///         id,
///         Ring::from_coords(&[(x0, 0.0), (x0 + 1.0, 0.0), (x0 + 1.0, 1.0), (x0, 1.0)]),
///     )
///     .unwrap()
/// };
/// let crs = Crs::conus_albers();
/// let polygons = PolygonCollection::new(crs.clone(), vec![square("a", 0.0), square("b", 1.0)]).unwrap();
/// let points = PointCollection::new(
///     crs,
///     vec![
///         PointRecord::new("p1", 0.5, 0.5).unwrap(),
///         PointRecord::new("p2", 0.25, 0.5).unwrap(),
///         PointRecord::new("p3", 1.5, 0.5).unwrap(),
///     ],
/// )
/// .unwrap();
///
/// let output = run(&GeometryStore::new(points, polygons), &PipelineConfig::default()).unwrap();
/// assert_eq!(output.densities.values(), vec![2.0, 1.0]);
/// assert_eq!(output.classification.class_count(), 2);
/// ```
pub fn run(store: &GeometryStore, config: &PipelineConfig) -> PipelineResult<PipelineOutput> {
    config.validate()?;

    let projected;
    let store = match &config.reprojection {
        Some(reprojection) => {
            projected = store.reproject(reprojection)?;
            info!(target_crs = %reprojection.target(), "Reprojected inputs");
            &projected
        }
        None => store,
    };
    let (points, polygons) = (store.points(), store.polygons());

    let joined = join_points(points, polygons, &config.join)?;
    let densities = aggregate(&joined, polygons, &config.density)?;

    let values: Vec<f64> = densities
        .entries()
        .iter()
        .filter(|entry| !entry.degenerate)
        .map(|entry| entry.density)
        .collect();
    let classification = classify(&values, &config.classify)?;

    let choropleth = ChoroplethLayer::build(polygons, &densities, &classification.breaks, &config.style)?;
    let point_layer = PointLayer::build(points, &joined, &config.display_attributes, config.cluster_points);
    let document = MapDocument::compose(polygons.crs().clone())
        .with_layer(choropleth)?
        .with_layer(point_layer)?;

    let warnings: Vec<PipelineWarning> = densities
        .warnings()
        .iter()
        .cloned()
        .map(PipelineWarning::from)
        .chain(classification.warnings.iter().cloned().map(PipelineWarning::from))
        .collect();
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "Pipeline finished with warnings");
    }

    info!(
        points = joined.point_count,
        assigned = joined.assigned_count(),
        polygons = densities.len(),
        classes = classification.class_count(),
        crs = %polygons.crs(),
        "Pipeline complete"
    );

    Ok(PipelineOutput {
        join: joined,
        densities,
        classification,
        document,
        warnings,
    })
}
