//! Per-polygon event counts and area-normalised density.
//!
//! - [`AssociationCounts`] - Points per polygon, mergeable across batches
//! - [`compute_densities`] / [`aggregate`] - One [`DensityEntry`] for every polygon
//! - [`DensityParams`] - Unit conversion factor with named presets
//!
//! Density is `count / (area * unit_conversion_factor)`. Areas come from
//! [`density_types::PolygonCollection::checked_area`], so a collection still
//! in a geographic CRS is rejected rather than producing per-square-degree
//! figures.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod counts;
mod error;
mod params;
mod table;

pub use counts::AssociationCounts;
pub use error::{DensityError, DensityResult};
pub use params::{
    DensityParams, SQUARE_FEET_TO_SQUARE_MILES, SQUARE_METRES_TO_SQUARE_KILOMETRES,
    SQUARE_METRES_TO_SQUARE_MILES,
};
pub use table::{aggregate, compute_densities, DensityEntry, DensityTable, DensityWarning};
