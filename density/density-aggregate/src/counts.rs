//! Per-polygon association counting.

use density_join::Association;
use density_types::PolygonCollection;
use hashbrown::HashMap;

use crate::error::{DensityError, DensityResult};

/// Number of associated points per polygon id.
///
/// Counts from independent batches (point chunks or polygon partitions) can be
/// combined with [`AssociationCounts::merge`]; addition is commutative, so the
/// merge order does not matter.
///
/// # Example
///
/// ```
/// use density_aggregate::AssociationCounts;
/// use density_join::Association;
///
/// let assoc = |p: &str, g: &str| Association { point_id: p.into(), polygon_id: g.into() };
///
/// let mut a = AssociationCounts::new();
/// a.record(&assoc("p1", "north"));
/// let mut b = AssociationCounts::new();
/// b.record(&assoc("p2", "north"));
/// b.record(&assoc("p3", "south"));
///
/// let total = a.merge(b);
/// assert_eq!(total.count("north"), 2);
/// assert_eq!(total.total(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationCounts {
    counts: HashMap<String, usize>,
}

impl AssociationCounts {
    /// Create an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count associations, checking every polygon id against the collection.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownPolygon`] for an association whose
    /// polygon is not in `polygons`.
    pub fn from_associations(associations: &[Association], polygons: &PolygonCollection) -> DensityResult<Self> {
        let mut counts = Self::new();
        for association in associations {
            if polygons.get(&association.polygon_id).is_none() {
                return Err(DensityError::UnknownPolygon(association.polygon_id.clone()));
            }
            counts.record(association);
        }
        Ok(counts)
    }

    /// Count one association.
    pub fn record(&mut self, association: &Association) {
        *self.counts.entry_ref(association.polygon_id.as_str()).or_insert(0) += 1;
    }

    /// Combine two counters.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (id, n) in other.counts {
            *self.counts.entry(id).or_insert(0) += n;
        }
        self
    }

    /// Count for a polygon (zero if it received no points).
    #[must_use]
    pub fn count(&self, polygon_id: &str) -> usize {
        self.counts.get(polygon_id).copied().unwrap_or(0)
    }

    /// Total number of counted associations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of polygons with at least one association.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.counts.len()
    }

    /// Polygon ids not present in `polygons`.
    pub fn unknown_ids<'a>(&'a self, polygons: &'a PolygonCollection) -> impl Iterator<Item = &'a str> + 'a {
        self.counts
            .keys()
            .map(String::as_str)
            .filter(|id| polygons.get(id).is_none())
    }
}

impl<'a> Extend<&'a Association> for AssociationCounts {
    fn extend<T: IntoIterator<Item = &'a Association>>(&mut self, iter: T) {
        for association in iter {
            self.record(association);
        }
    }
}
