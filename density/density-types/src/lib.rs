//! Geometry store for point-density choropleths.
//!
//! This crate holds the immutable inputs of the density pipeline:
//!
//! - [`PointRecord`] / [`PointCollection`] - Located events with attributes
//! - [`PolygonRecord`] / [`PolygonCollection`] - Boundaries with cached planar area
//! - [`GeometryStore`] - The point/polygon pair for one run
//! - [`Crs`] - Coordinate reference system tag carried by every collection
//! - [`Reprojection`] / [`Projection`] - Explicit, documented CRS conversion
//!
//! # Areas and CRS
//!
//! Polygon area is the planar shoelace area in the CRS's native units. It is
//! only meaningful in an equal-area (or locally projected) CRS, so
//! [`PolygonCollection::checked_area`] refuses to report an area for a
//! degree-based CRS instead of returning a number in "square degrees".
//!
//! # Example
//!
//! ```
//! use density_types::{
//!     Crs, GeometryStore, PointCollection, PointRecord, PolygonCollection, PolygonRecord,
//!     Reprojection, Ring,
//! };
//!
//! let points = PointCollection::new(
//!     Crs::wgs84(),
//!     vec![PointRecord::new("call-1", -87.63, 41.88).unwrap()],
//! )
//! .unwrap();
//!
//! let wards = PolygonCollection::new(
//!     Crs::wgs84(),
//!     vec![PolygonRecord::from_exterior(
//!         "ward-42",
//!         Ring::from_coords(&[(-87.7, 41.8), (-87.6, 41.8), (-87.6, 41.9), (-87.7, 41.9)]),
//!     )
//!     .unwrap()],
//! )
//! .unwrap();
//!
//! // Areas in degrees are refused...
//! assert!(wards.checked_area(0).is_err());
//!
//! // ...so project both collections to an equal-area CRS first.
//! let store = GeometryStore::new(points, wards).reproject(&Reprojection::conus_albers()).unwrap();
//! assert!(store.same_crs());
//! assert!(store.polygons().checked_area(0).unwrap() > 0.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod attribute;
mod bounds;
mod collection;
mod crs;
mod error;
mod point;
mod polygon;
pub mod projection;

pub use attribute::{AttributeValue, Attributes};
pub use bounds::Bounds2;
pub use collection::{GeometryStore, PointCollection, PolygonCollection};
pub use crs::{Crs, LinearUnit};
pub use error::{TypesError, TypesResult};
pub use point::PointRecord;
pub use polygon::{PolygonRecord, Ring, Shell};
pub use projection::{Projection, Reprojection};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};
