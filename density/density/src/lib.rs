//! Point-density choropleths from event points and administrative polygons.
//!
//! This umbrella crate re-exports the `density-*` crates and adds the
//! end-to-end [`run`] that chains them under one validated
//! [`PipelineConfig`].
//!
//! # Quick Start
//!
//! ```no_run
//! use density::prelude::*;
//!
//! let options = ReadOptions::new(Crs::wgs84());
//! let points = load_points("calls.geojson", &options).unwrap();
//! let tracts = load_polygons("tracts.geojson", &options.with_id_property("GEOID")).unwrap();
//!
//! let config = PipelineConfig::default()
//!     .with_reprojection(Reprojection::conus_albers())
//!     .with_unit_conversion_factor(density::aggregate::SQUARE_METRES_TO_SQUARE_MILES)
//!     .with_classifier_kind(ClassifierKind::Quantile);
//!
//! let output = run(&GeometryStore::new(points, tracts), &config).unwrap();
//! for warning in &output.warnings {
//!     eprintln!("{warning}");
//! }
//! save_document(&output.document, "map.json").unwrap();
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Points, polygons, CRS tags and reprojection
//! - [`join`] - Point-in-polygon join with boundary tie rules
//! - [`aggregate`] - Per-polygon counts and densities
//! - [`classify`] - Equal-interval, quantile and natural breaks
//! - [`layer`] - Choropleth and point layers, legend, map document
//! - [`io`] - GeoJSON reading and writing
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` on configuration and outputs

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult, PipelineWarning};
pub use pipeline::{run, PipelineOutput};

pub use density_classify::ClassifierKind;
pub use density_join::BoundaryRule;

// =============================================================================
// Re-exports
// =============================================================================

/// Points, polygons, CRS tags and reprojection.
pub use density_types as types;

/// Point-in-polygon join.
pub use density_join as join;

/// Per-polygon counts and densities.
pub use density_aggregate as aggregate;

/// Breaks classification.
pub use density_classify as classify;

/// Choropleth and point layers.
pub use density_layer as layer;

/// GeoJSON reading and writing.
pub use density_io as io;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for a pipeline run.
///
/// # Usage
///
/// ```
/// use density::prelude::*;
/// ```
pub mod prelude {
    // Geometry
    pub use density_types::{
        Crs, GeometryStore, PointCollection, PointRecord, PolygonCollection, PolygonRecord, Reprojection,
        Ring, Shell,
    };

    // Stage parameters
    pub use density_aggregate::DensityParams;
    pub use density_classify::{ClassifierKind, ClassifyParams};
    pub use density_join::{BoundaryRule, JoinParams};
    pub use density_layer::{ChoroplethStyle, MapDocument, Palette};

    // I/O
    pub use density_io::{load_points, load_polygons, save_document, ReadOptions};

    // Pipeline
    pub use crate::{run, PipelineConfig, PipelineError, PipelineOutput, PipelineWarning};
}

// =============================================================================
// Tests
// =============================================================================
