//! The `run` command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use density::aggregate::{SQUARE_METRES_TO_SQUARE_KILOMETRES, SQUARE_METRES_TO_SQUARE_MILES};
use density::io::{load_points, load_polygons, save_choropleth, save_document, save_points, ReadOptions};
use density::types::{Crs, GeometryStore, Reprojection};
use density::{run as run_pipeline, BoundaryRule, ClassifierKind, PipelineConfig, PipelineOutput};
use tracing::{info, warn};

/// Equal-area projection applied before the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectionChoice {
    /// Albers conic, contiguous US (EPSG:5070)
    ConusAlbers,
    /// Global cylindrical equal-area (EPSG:6933)
    EaseGrid2,
}

impl ProjectionChoice {
    fn reprojection(self) -> Reprojection {
        match self {
            Self::ConusAlbers => Reprojection::conus_albers(),
            Self::EaseGrid2 => Reprojection::ease_grid2(),
        }
    }
}

/// Reporting unit for densities in a metre-based CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AreaUnit {
    /// Square miles
    SquareMiles,
    /// Square kilometres
    SquareKilometres,
}

impl AreaUnit {
    const fn factor(self) -> f64 {
        match self {
            Self::SquareMiles => SQUARE_METRES_TO_SQUARE_MILES,
            Self::SquareKilometres => SQUARE_METRES_TO_SQUARE_KILOMETRES,
        }
    }
}

/// Arguments for `density run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// GeoJSON FeatureCollection of Point features
    #[arg(long)]
    pub points: PathBuf,

    /// GeoJSON FeatureCollection of Polygon/MultiPolygon features
    #[arg(long)]
    pub polygons: PathBuf,

    /// EPSG code of the input coordinates
    #[arg(long, default_value_t = 4326)]
    pub epsg: u32,

    /// Property holding record ids (defaults to the feature id)
    #[arg(long)]
    pub id_property: Option<String>,

    /// Pipeline configuration JSON; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of classes
    #[arg(long)]
    pub classes: Option<usize>,

    /// Classifier: equal-interval, quantile or natural-breaks
    #[arg(long)]
    pub classifier: Option<ClassifierKind>,

    /// Boundary tie rule: first-in-order, lowest-id or exclude
    #[arg(long)]
    pub tie_rule: Option<BoundaryRule>,

    /// Multiplier from squared CRS units to the reporting unit
    #[arg(long, conflicts_with = "area_unit")]
    pub unit_factor: Option<f64>,

    /// Report densities per square mile or kilometre
    #[arg(long, value_enum)]
    pub area_unit: Option<AreaUnit>,

    /// Project inputs to an equal-area CRS before joining
    #[arg(long, value_enum)]
    pub project: Option<ProjectionChoice>,

    /// Point attributes to carry into the point layer (repeatable)
    #[arg(long = "attribute")]
    pub attributes: Vec<String>,

    /// Map document output (JSON)
    #[arg(long, short)]
    pub output: PathBuf,

    /// Also write the choropleth layer as GeoJSON
    #[arg(long)]
    pub choropleth_geojson: Option<PathBuf>,

    /// Also write the point layer as GeoJSON
    #[arg(long)]
    pub points_geojson: Option<PathBuf>,
}

/// Execute `density run`.
pub fn run(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;

    let mut options = ReadOptions::new(Crs::epsg(args.epsg));
    if let Some(property) = &args.id_property {
        options = options.with_id_property(property.clone());
    }
    let points = load_points(&args.points, &options)
        .with_context(|| format!("Failed to load points from {}", args.points.display()))?;
    let polygons = load_polygons(&args.polygons, &options)
        .with_context(|| format!("Failed to load polygons from {}", args.polygons.display()))?;

    let output = run_pipeline(&GeometryStore::new(points, polygons), &config).context("Pipeline failed")?;
    write_outputs(&output, args)?;
    report(&output);
    Ok(())
}

/// Load the configuration file (if any) and apply flag overrides.
pub fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(classes) = args.classes {
        config = config.with_class_count(classes);
    }
    if let Some(kind) = args.classifier {
        config = config.with_classifier_kind(kind);
    }
    if let Some(rule) = args.tie_rule {
        config = config.with_boundary_tie_rule(rule);
    }
    if let Some(factor) = args.unit_factor {
        config = config.with_unit_conversion_factor(factor);
    }
    if let Some(unit) = args.area_unit {
        config = config.with_unit_conversion_factor(unit.factor());
    }
    if let Some(choice) = args.project {
        config = config.with_reprojection(choice.reprojection());
    }
    if !args.attributes.is_empty() {
        config = config.with_display_attributes(args.attributes.iter().cloned());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn write_outputs(output: &PipelineOutput, args: &RunArgs) -> Result<()> {
    save_document(&output.document, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if let (Some(path), Some(layer)) = (&args.choropleth_geojson, output.choropleth()) {
        save_choropleth(layer, path).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let (Some(path), Some(layer)) = (&args.points_geojson, output.points()) {
        save_points(layer, path).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn report(output: &PipelineOutput) {
    for warning in &output.warnings {
        warn!("{warning}");
    }
    let breaks: Vec<String> = output
        .classification
        .breaks
        .boundaries()
        .iter()
        .map(|b| format!("{b:.4}"))
        .collect();
    info!(
        assigned = output.join.assigned_count(),
        unmatched = output.join.unmatched.len(),
        classifier = %output.classification.kind,
        gvf = output.classification.goodness_of_variance_fit,
        breaks = %breaks.join(", "),
        "Done"
    );
}
