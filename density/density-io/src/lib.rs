//! GeoJSON input and output for the density pipeline.
//!
//! - [`load_points`] / [`load_polygons`] - FeatureCollections into CRS-tagged collections
//! - [`save_choropleth`] / [`save_points`] - Layers as GeoJSON FeatureCollections
//! - [`save_document`] - A [`density_layer::MapDocument`] with styles and legends
//!
//! GeoJSON carries no CRS member (RFC 7946 fixes WGS 84), so the CRS of the
//! coordinates is supplied by the caller through [`ReadOptions`].
//!
//! # Example
//!
//! ```no_run
//! use density_io::{load_points, load_polygons, ReadOptions};
//! use density_types::Crs;
//!
//! let options = ReadOptions::new(Crs::conus_albers());
//! let calls = load_points("calls.geojson", &options).unwrap();
//! let tracts = load_polygons("tracts.geojson", &options.clone().with_id_property("GEOID")).unwrap();
//! println!("{} calls, {} tracts", calls.len(), tracts.len());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod read;
mod write;

pub use error::{IoError, IoResult};
pub use read::{load_points, load_polygons, parse_points, parse_polygons, ReadOptions};
pub use write::{
    choropleth_to_geojson, document_to_json, points_to_geojson, save_choropleth, save_document, save_points,
};
