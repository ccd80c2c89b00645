//! Polygon boundary records.
//!
//! A [`PolygonRecord`] holds one or more [`Shell`]s. Each shell is an exterior
//! [`Ring`] with optional hole rings, mirroring the GeoJSON `Polygon` /
//! `MultiPolygon` split.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeValue, Attributes};
use crate::bounds::Bounds2;
use crate::error::{TypesError, TypesResult};

/// A closed ring of vertices, stored open (last vertex is not repeated).
///
/// # Example
///
/// ```
/// use density_types::{Point2, Ring};
///
/// // Closed input is accepted; the repeated vertex is dropped.
/// let ring = Ring::new(vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(2.0, 0.0),
///     Point2::new(2.0, 1.0),
///     Point2::new(0.0, 1.0),
///     Point2::new(0.0, 0.0),
/// ]);
/// assert_eq!(ring.len(), 4);
/// assert!((ring.area() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ring {
    vertices: Vec<Point2<f64>>,
}

impl Ring {
    /// Create a ring, dropping a trailing vertex equal to the first.
    #[must_use]
    pub fn new(mut vertices: Vec<Point2<f64>>) -> Self {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Self { vertices }
    }

    /// Create a ring from `(x, y)` tuples.
    #[must_use]
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// Number of stored vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the ring has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The open vertex list.
    #[must_use]
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Iterate the ring's edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Signed shoelace area: positive for counter-clockwise rings.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        // Shift to the first vertex to limit cancellation on large projected coordinates.
        let origin = self.vertices[0];
        let twice: f64 = self
            .edges()
            .map(|(a, b)| {
                let (ax, ay) = (a.x - origin.x, a.y - origin.y);
                let (bx, by) = (b.x - origin.x, b.y - origin.y);
                ax.mul_add(by, -(bx * ay))
            })
            .sum();
        twice / 2.0
    }

    /// Unsigned area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    fn validate(&self, id: &str) -> TypesResult<()> {
        if let Some(p) = self.vertices.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(TypesError::malformed(
                id,
                format!("non-finite vertex ({}, {})", p.x, p.y),
            ));
        }
        let mut distinct: Vec<&Point2<f64>> = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            if !distinct.contains(&v) {
                distinct.push(v);
            }
            if distinct.len() >= 3 {
                return Ok(());
            }
        }
        Err(TypesError::malformed(
            id,
            format!("ring has {} distinct vertices, need at least 3", distinct.len()),
        ))
    }
}

/// One exterior ring plus its holes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shell {
    /// Outer boundary.
    pub exterior: Ring,
    /// Interior boundaries cut out of the exterior.
    pub holes: Vec<Ring>,
}

impl Shell {
    /// A shell without holes.
    #[must_use]
    pub const fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Add a hole.
    #[must_use]
    pub fn with_hole(mut self, hole: Ring) -> Self {
        self.holes.push(hole);
        self
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    /// Exterior area minus hole areas, never negative.
    #[must_use]
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(Ring::area).sum();
        (self.exterior.area() - holes).max(0.0)
    }
}

/// An administrative boundary with a unique identifier.
///
/// The planar area is computed once at construction, in the units of whatever
/// CRS the coordinates are in. Whether that number means anything is the
/// collection's concern (see [`crate::PolygonCollection::checked_area`]).
///
/// # Example
///
/// ```
/// use density_types::{PolygonRecord, Ring, Shell};
///
/// let block = PolygonRecord::new(
///     "block-12",
///     vec![Shell::new(Ring::from_coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]))
///         .with_hole(Ring::from_coords(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]))],
/// )
/// .unwrap();
///
/// assert!((block.planar_area() - 15.0).abs() < 1e-12);
/// assert_eq!(block.ring_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonRecord {
    id: String,
    shells: Vec<Shell>,
    attributes: Attributes,
    area: f64,
    bounds: Bounds2,
}

impl PolygonRecord {
    /// Create a polygon record from its shells.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::MalformedGeometry`] if there are no shells, or
    /// any ring has non-finite vertices or fewer than three distinct vertices.
    pub fn new(id: impl Into<String>, shells: Vec<Shell>) -> TypesResult<Self> {
        let id = id.into();
        if shells.is_empty() {
            return Err(TypesError::malformed(id, "polygon has no shells"));
        }
        for shell in &shells {
            for ring in shell.rings() {
                ring.validate(&id)?;
            }
        }

        let area = shells.iter().map(Shell::area).sum();
        let bounds = Bounds2::from_points(shells.iter().flat_map(|s| s.exterior.vertices()));

        Ok(Self {
            id,
            shells,
            attributes: Attributes::new(),
            area,
            bounds,
        })
    }

    /// Create a single-ring polygon.
    ///
    /// # Errors
    ///
    /// Same as [`PolygonRecord::new`].
    pub fn from_exterior(id: impl Into<String>, exterior: Ring) -> TypesResult<Self> {
        Self::new(id, vec![Shell::new(exterior)])
    }

    /// Attach one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace the attribute mapping.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Record identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shells making up the boundary.
    #[must_use]
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// All rings of all shells.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.shells.iter().flat_map(Shell::rings)
    }

    /// Total number of rings.
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.shells.iter().map(|s| 1 + s.holes.len()).sum()
    }

    /// Cached shoelace area in CRS-native square units.
    #[must_use]
    pub const fn planar_area(&self) -> f64 {
        self.area
    }

    /// Bounding box of the exterior rings.
    #[must_use]
    pub const fn bounds(&self) -> &Bounds2 {
        &self.bounds
    }

    /// All attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up one attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Same record with every vertex mapped through `f`, used by reprojection.
    pub(crate) fn mapped<F>(&self, mut f: F) -> TypesResult<Self>
    where
        F: FnMut(&Point2<f64>) -> Point2<f64>,
    {
        let mut map_ring = |ring: &Ring| Ring::new(ring.vertices().iter().map(&mut f).collect());
        let shells = self
            .shells
            .iter()
            .map(|s| Shell {
                exterior: map_ring(&s.exterior),
                holes: s.holes.iter().map(&mut map_ring).collect(),
            })
            .collect();
        Ok(Self::new(self.id.clone(), shells)?.with_attributes(self.attributes.clone()))
    }
}
