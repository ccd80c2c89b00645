//! Point-in-polygon spatial join.
//!
//! Assigns each event point to at most one polygon:
//!
//! - [`locate`] - Classify a point as inside, on the boundary of, or outside a polygon
//! - [`PolygonGridIndex`] - Uniform grid over polygon bounds for candidate pruning
//! - [`join_points`] - Full join with a [`BoundaryRule`] deciding shared-edge ties
//! - [`join_partition`] / [`PartialJoin`] - Join against a polygon subset and merge
//!
//! # Boundary handling
//!
//! A point strictly inside a polygon belongs to it. A point lying on the
//! boundary of one or more polygons (and inside none) is settled by the
//! configured [`BoundaryRule`], so it is never counted twice.
//!
//! # Example
//!
//! ```
//! use density_join::{join_points, BoundaryRule, JoinParams};
//! use density_types::{Crs, PointCollection, PointRecord, PolygonCollection, PolygonRecord, Ring};
//!
//! let crs = Crs::conus_albers();
//! let tracts = PolygonCollection::new(crs.clone(), vec![
//!     PolygonRecord::from_exterior("b", Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])).unwrap(),
//!     PolygonRecord::from_exterior("a", Ring::from_coords(&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)])).unwrap(),
//! ]).unwrap();
//! let calls = PointCollection::new(crs, vec![PointRecord::new("c1", 1.0, 0.5).unwrap()]).unwrap();
//!
//! let params = JoinParams::default().with_boundary_rule(BoundaryRule::LowestId);
//! let joined = join_points(&calls, &tracts, &params).unwrap();
//! assert_eq!(joined.associations[0].polygon_id, "a");
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod containment;
mod error;
mod index;
mod join;
mod params;

pub use containment::{locate, Containment};
pub use error::{JoinError, JoinResult};
pub use index::PolygonGridIndex;
pub use join::{join_partition, join_points, Association, JoinOutput, PartialJoin};
pub use params::{BoundaryRule, JoinParams};
