//! Point-to-polygon association.
//!
//! A join runs in two steps. Every point is first tested against its candidate
//! polygons, producing a [`PartialJoin`] that records each inclusive hit. The
//! hits are then resolved with the [`BoundaryRule`] into at most one
//! association per point. Partial joins over disjoint polygon partitions can be
//! merged before resolving, which gives the same result as joining against all
//! polygons at once.

use density_types::{PointCollection, PointRecord, PolygonCollection, PolygonRecord};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::containment::{locate, Containment};
use crate::error::{JoinError, JoinResult};
use crate::index::PolygonGridIndex;
use crate::params::{BoundaryRule, JoinParams};

/// A point assigned to the polygon that contains it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Association {
    /// Identifier of the point.
    pub point_id: String,
    /// Identifier of the containing polygon.
    pub polygon_id: String,
}

/// One inclusive containment hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hit {
    polygon: usize,
    containment: Containment,
}

/// Unresolved hits for every point of a collection.
#[derive(Debug, Clone, Default)]
pub struct PartialJoin {
    hits: Vec<Vec<Hit>>,
}

impl PartialJoin {
    /// Number of points covered.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.hits.len()
    }

    /// Number of inclusive hits recorded.
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.hits.iter().map(Vec::len).sum()
    }

    /// Combine with a partial join over another polygon partition.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::PartitionMismatch`] if the two were built over
    /// different point counts.
    pub fn merge(mut self, other: Self) -> JoinResult<Self> {
        if self.hits.len() != other.hits.len() {
            return Err(JoinError::PartitionMismatch {
                left: self.hits.len(),
                right: other.hits.len(),
            });
        }
        for (mine, theirs) in self.hits.iter_mut().zip(other.hits) {
            mine.extend(theirs);
            mine.sort_by_key(|h| h.polygon);
            mine.dedup_by_key(|h| h.polygon);
        }
        Ok(self)
    }

    /// Resolve hits into associations.
    ///
    /// `points` and `polygons` must be the collections the partial join was
    /// built from.
    #[must_use]
    pub fn resolve(
        &self,
        points: &PointCollection,
        polygons: &PolygonCollection,
        rule: BoundaryRule,
    ) -> JoinOutput {
        let mut associations = Vec::new();
        let mut unmatched = Vec::new();
        let mut boundary_resolved = 0;

        for (point, hits) in points.iter().zip(&self.hits) {
            match resolve_hits(hits, polygons.as_slice(), rule) {
                Some((polygon, via_boundary)) => {
                    if via_boundary {
                        boundary_resolved += 1;
                    }
                    associations.push(Association {
                        point_id: point.id().to_owned(),
                        polygon_id: polygons.as_slice()[polygon].id().to_owned(),
                    });
                }
                None => unmatched.push(point.id().to_owned()),
            }
        }

        JoinOutput {
            associations,
            unmatched,
            boundary_resolved,
            point_count: points.len(),
        }
    }
}

/// Pick the winning polygon among a point's hits (sorted by polygon position).
///
/// Returns the polygon position and whether the win came from a boundary tie.
fn resolve_hits(hits: &[Hit], polygons: &[PolygonRecord], rule: BoundaryRule) -> Option<(usize, bool)> {
    if let Some(inside) = hits.iter().find(|h| h.containment == Containment::Inside) {
        return Some((inside.polygon, false));
    }
    let mut boundary = hits.iter().filter(|h| h.containment == Containment::Boundary);
    let winner = match rule {
        BoundaryRule::FirstInOrder => boundary.next(),
        BoundaryRule::LowestId => boundary.min_by(|a, b| {
            polygons[a.polygon]
                .id()
                .cmp(polygons[b.polygon].id())
                .then(a.polygon.cmp(&b.polygon))
        }),
        BoundaryRule::Exclude => None,
    };
    winner.map(|h| (h.polygon, true))
}

/// Result of a spatial join.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinOutput {
    /// One association per assigned point, in point order.
    pub associations: Vec<Association>,
    /// Points that fell inside no polygon (or were excluded on a boundary).
    pub unmatched: Vec<String>,
    /// Associations decided by the boundary rule rather than strict interior.
    pub boundary_resolved: usize,
    /// Total number of points examined.
    pub point_count: usize,
}

impl JoinOutput {
    /// Number of points assigned to a polygon.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.associations.len()
    }

    /// Fraction of points assigned, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn match_rate(&self) -> f64 {
        if self.point_count == 0 {
            0.0
        } else {
            self.associations.len() as f64 / self.point_count as f64
        }
    }
}

fn check_inputs(points: &PointCollection, polygons: &PolygonCollection, params: &JoinParams) -> JoinResult<()> {
    params.validate()?;
    if points.crs() != polygons.crs() {
        return Err(JoinError::CrsMismatch {
            points: points.crs().clone(),
            polygons: polygons.crs().clone(),
        });
    }
    if points.is_empty() {
        return Err(JoinError::EmptyInput("point"));
    }
    if polygons.is_empty() {
        return Err(JoinError::EmptyInput("polygon"));
    }
    Ok(())
}

/// Test every point against a subset of polygons.
///
/// # Arguments
///
/// * `points` - Event points
/// * `polygons` - The full polygon collection
/// * `subset` - Positions (into `polygons`) forming this partition
/// * `params` - Join parameters; the boundary rule is applied later, at resolve time
///
/// # Errors
///
/// Returns [`JoinError::CrsMismatch`], [`JoinError::EmptyInput`],
/// [`JoinError::InvalidParams`] or [`JoinError::PartitionOutOfRange`].
pub fn join_partition(
    points: &PointCollection,
    polygons: &PolygonCollection,
    subset: &[usize],
    params: &JoinParams,
) -> JoinResult<PartialJoin> {
    check_inputs(points, polygons, params)?;
    if let Some(&index) = subset.iter().find(|&&i| i >= polygons.len()) {
        return Err(JoinError::PartitionOutOfRange {
            index,
            len: polygons.len(),
        });
    }

    let mut ordered = subset.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let slice = polygons.as_slice();
    let tolerance = params.boundary_tolerance;
    let index = params
        .use_index
        .then(|| PolygonGridIndex::build_subset(slice, &ordered, tolerance));

    let hits_for = |point: &PointRecord| -> Vec<Hit> {
        let candidates: &[usize] = index
            .as_ref()
            .map_or(ordered.as_slice(), |idx| idx.candidates(point.position()));
        candidates
            .iter()
            .filter_map(|&polygon| {
                let containment = locate(point.position(), &slice[polygon], tolerance);
                containment
                    .is_inclusive_match()
                    .then_some(Hit { polygon, containment })
            })
            .collect()
    };

    let hits: Vec<Vec<Hit>> = if params.parallel {
        points.as_slice().par_iter().map(hits_for).collect()
    } else {
        points.iter().map(hits_for).collect()
    };

    debug!(
        points = points.len(),
        polygons = ordered.len(),
        indexed = params.use_index,
        parallel = params.parallel,
        "Partition joined"
    );

    Ok(PartialJoin { hits })
}

/// Join points to the polygons that contain them.
///
/// Each point produces at most one [`Association`]. Points on a boundary are
/// settled by `params.boundary_rule`; the result is identical with or without
/// the grid index and with or without parallel evaluation.
///
/// # Errors
///
/// Returns [`JoinError::CrsMismatch`] if the collections carry different CRS
/// tags, [`JoinError::EmptyInput`] if either is empty, or
/// [`JoinError::InvalidParams`].
///
/// # Example
///
/// ```
/// use density_join::{join_points, JoinParams};
/// use density_types::{Crs, PointCollection, PointRecord, PolygonCollection, PolygonRecord, Ring};
///
/// let crs = Crs::conus_albers();
/// let polygons = PolygonCollection::new(crs.clone(), vec![
///     PolygonRecord::from_exterior("west", Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])).unwrap(),
///     PolygonRecord::from_exterior("east", Ring::from_coords(&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)])).unwrap(),
/// ]).unwrap();
/// let points = PointCollection::new(crs, vec![
///     PointRecord::new("a", 0.5, 0.5).unwrap(),
///     PointRecord::new("on-edge", 1.0, 0.5).unwrap(),
///     PointRecord::new("far", 9.0, 9.0).unwrap(),
/// ]).unwrap();
///
/// let joined = join_points(&points, &polygons, &JoinParams::default()).unwrap();
/// assert_eq!(joined.assigned_count(), 2);
/// assert_eq!(joined.associations[1].polygon_id, "west");
/// assert_eq!(joined.unmatched, vec!["far".to_string()]);
/// ```
pub fn join_points(
    points: &PointCollection,
    polygons: &PolygonCollection,
    params: &JoinParams,
) -> JoinResult<JoinOutput> {
    let all: Vec<usize> = (0..polygons.len()).collect();
    let partial = join_partition(points, polygons, &all, params)?;
    let output = partial.resolve(points, polygons, params.boundary_rule);

    info!(
        points = output.point_count,
        assigned = output.assigned_count(),
        unmatched = output.unmatched.len(),
        boundary_resolved = output.boundary_resolved,
        rule = %params.boundary_rule,
        "Spatial join complete"
    );

    Ok(output)
}
