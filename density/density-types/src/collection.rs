//! CRS-tagged geometry collections and the store that pairs them.

use hashbrown::HashMap;

use crate::bounds::Bounds2;
use crate::crs::Crs;
use crate::error::{TypesError, TypesResult};
use crate::point::PointRecord;
use crate::polygon::PolygonRecord;
use crate::projection::Reprojection;

/// Build an id → position map, rejecting duplicates.
fn index_ids<'a>(ids: impl Iterator<Item = &'a str>) -> TypesResult<HashMap<String, usize>> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.to_owned(), i).is_some() {
            return Err(TypesError::DuplicateId(id.to_owned()));
        }
    }
    Ok(index)
}

/// An ordered collection of points sharing one CRS.
///
/// # Example
///
/// ```
/// use density_types::{Crs, PointCollection, PointRecord};
///
/// let points = PointCollection::new(
///     Crs::conus_albers(),
///     vec![
///         PointRecord::new("a", 10.0, 10.0).unwrap(),
///         PointRecord::new("b", 20.0, 15.0).unwrap(),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(points.len(), 2);
/// assert_eq!(points.get("b").map(|p| p.position().x), Some(20.0));
/// ```
#[derive(Debug, Clone)]
pub struct PointCollection {
    crs: Crs,
    points: Vec<PointRecord>,
    index: HashMap<String, usize>,
}

impl PointCollection {
    /// Create a collection.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::DuplicateId`] if two points share an id.
    pub fn new(crs: Crs, points: Vec<PointRecord>) -> TypesResult<Self> {
        let index = index_ids(points.iter().map(PointRecord::id))?;
        Ok(Self { crs, points, index })
    }

    /// CRS tag.
    #[must_use]
    pub const fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate points in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PointRecord> {
        self.points.iter()
    }

    /// Points as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PointRecord] {
        &self.points
    }

    /// Look up a point by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PointRecord> {
        self.index.get(id).map(|&i| &self.points[i])
    }

    /// Bounding box of all points.
    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        Bounds2::from_points(self.points.iter().map(PointRecord::position))
    }

    /// Reproject into a new collection tagged with the target CRS.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::ProjectionSource`] if the projection needs
    /// geographic input and this collection is not geographic, or
    /// [`TypesError::MalformedGeometry`] if a projected coordinate is not finite.
    pub fn reproject(&self, reprojection: &Reprojection) -> TypesResult<Self> {
        reprojection.check_source(&self.crs)?;
        let points = self
            .points
            .iter()
            .map(|p| p.relocated(reprojection.projection().apply(p.position())))
            .collect::<TypesResult<Vec<_>>>()?;
        Ok(Self {
            crs: reprojection.target().clone(),
            points,
            index: self.index.clone(),
        })
    }
}

impl<'a> IntoIterator for &'a PointCollection {
    type Item = &'a PointRecord;
    type IntoIter = std::slice::Iter<'a, PointRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// An ordered collection of polygons sharing one CRS.
///
/// Iteration order is the order polygons were supplied in; every downstream
/// stage preserves it.
///
/// # Example
///
/// ```
/// use density_types::{Crs, PolygonCollection, PolygonRecord, Ring};
///
/// let tracts = PolygonCollection::new(
///     Crs::conus_albers(),
///     vec![PolygonRecord::from_exterior(
///         "t1",
///         Ring::from_coords(&[(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0), (0.0, 1000.0)]),
///     )
///     .unwrap()],
/// )
/// .unwrap();
///
/// assert!((tracts.area_of("t1").unwrap().unwrap() - 1.0e6).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct PolygonCollection {
    crs: Crs,
    polygons: Vec<PolygonRecord>,
    index: HashMap<String, usize>,
}

impl PolygonCollection {
    /// Create a collection.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::DuplicateId`] if two polygons share an id.
    pub fn new(crs: Crs, polygons: Vec<PolygonRecord>) -> TypesResult<Self> {
        let index = index_ids(polygons.iter().map(PolygonRecord::id))?;
        Ok(Self {
            crs,
            polygons,
            index,
        })
    }

    /// CRS tag.
    #[must_use]
    pub const fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Iterate polygons in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PolygonRecord> {
        self.polygons.iter()
    }

    /// Polygons as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PolygonRecord] {
        &self.polygons
    }

    /// Look up a polygon by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PolygonRecord> {
        self.index.get(id).map(|&i| &self.polygons[i])
    }

    /// Position of a polygon in iteration order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Bounding box of all polygons.
    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        self.polygons
            .iter()
            .fold(Bounds2::empty(), |acc, p| acc.union(p.bounds()))
    }

    /// Planar area of the polygon at `index`, refusing degree-based CRSs.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::GeographicArea`] when the collection is tagged
    /// with a geographic CRS, or [`TypesError::IndexOutOfRange`].
    pub fn checked_area(&self, index: usize) -> TypesResult<f64> {
        let polygon = self.polygons.get(index).ok_or(TypesError::IndexOutOfRange {
            index,
            len: self.polygons.len(),
        })?;
        if self.crs.is_geographic() {
            return Err(TypesError::GeographicArea {
                id: polygon.id().to_owned(),
                crs: self.crs.clone(),
            });
        }
        Ok(polygon.planar_area())
    }

    /// Planar area of the polygon with the given id.
    ///
    /// Returns `None` for an unknown id.
    ///
    /// # Errors
    ///
    /// Same as [`PolygonCollection::checked_area`].
    pub fn area_of(&self, id: &str) -> Option<TypesResult<f64>> {
        self.position(id).map(|i| self.checked_area(i))
    }

    /// Reproject into a new collection tagged with the target CRS.
    ///
    /// # Errors
    ///
    /// Same as [`PointCollection::reproject`].
    pub fn reproject(&self, reprojection: &Reprojection) -> TypesResult<Self> {
        reprojection.check_source(&self.crs)?;
        let projection = reprojection.projection();
        let polygons = self
            .polygons
            .iter()
            .map(|p| p.mapped(|v| projection.apply(v)))
            .collect::<TypesResult<Vec<_>>>()?;
        Ok(Self {
            crs: reprojection.target().clone(),
            polygons,
            index: self.index.clone(),
        })
    }
}

impl<'a> IntoIterator for &'a PolygonCollection {
    type Item = &'a PolygonRecord;
    type IntoIter = std::slice::Iter<'a, PolygonRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

/// The immutable input pair for one pipeline run.
///
/// The store does not require the two collections to share a CRS; stages
/// that combine them check the tags and fail on mismatch.
#[derive(Debug, Clone)]
pub struct GeometryStore {
    points: PointCollection,
    polygons: PolygonCollection,
}

impl GeometryStore {
    /// Pair a point collection with a polygon collection.
    #[must_use]
    pub const fn new(points: PointCollection, polygons: PolygonCollection) -> Self {
        Self { points, polygons }
    }

    /// Event points.
    #[must_use]
    pub const fn points(&self) -> &PointCollection {
        &self.points
    }

    /// Boundary polygons.
    #[must_use]
    pub const fn polygons(&self) -> &PolygonCollection {
        &self.polygons
    }

    /// Returns `true` if both collections carry the same CRS tag.
    #[must_use]
    pub fn same_crs(&self) -> bool {
        self.points.crs() == self.polygons.crs()
    }

    /// Fail unless both collections carry the same CRS tag.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::CrsMismatch`].
    pub fn require_same_crs(&self) -> TypesResult<()> {
        if self.same_crs() {
            Ok(())
        } else {
            Err(TypesError::crs_mismatch(self.points.crs(), self.polygons.crs()))
        }
    }

    /// Reproject both collections.
    ///
    /// # Errors
    ///
    /// Same as [`PointCollection::reproject`].
    pub fn reproject(&self, reprojection: &Reprojection) -> TypesResult<Self> {
        Ok(Self {
            points: self.points.reproject(reprojection)?,
            polygons: self.polygons.reproject(reprojection)?,
        })
    }

    /// Split back into the two collections.
    #[must_use]
    pub fn into_parts(self) -> (PointCollection, PolygonCollection) {
        (self.points, self.polygons)
    }
}
