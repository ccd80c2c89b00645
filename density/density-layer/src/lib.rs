//! Render-ready layers for point-density maps.
//!
//! Pure join-and-attach: no geometry is computed here.
//!
//! - [`ChoroplethLayer`] - Polygons with density, count, class and fill colour
//! - [`PointLayer`] - Event points with selected display attributes
//! - [`Legend`] - One entry per class
//! - [`MapDocument`] - Explicit, immutable composition of layers
//! - [`ChoroplethStyle`] / [`Palette`] - Presentation settings
//!
//! Both layers keep the order of their source collections, so output is
//! deterministic for a given input.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod choropleth;
mod document;
mod error;
mod legend;
mod points;
mod style;

pub use choropleth::{ChoroplethFeature, ChoroplethLayer};
pub use document::{Layer, MapDocument};
pub use error::{LayerError, LayerResult};
pub use legend::{Legend, LegendEntry};
pub use points::{PointFeature, PointLayer};
pub use style::{ChoroplethStyle, Palette, Rgb};
