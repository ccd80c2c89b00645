//! Point-in-polygon classification.
//!
//! The boundary check runs first, so a point on an edge is reported as
//! [`Containment::Boundary`] no matter which side floating point would put it
//! on. Interior/exterior then uses the even-odd crossing rule over every ring
//! of every shell, which treats holes and multi-part polygons uniformly.

use density_types::{Point2, PolygonRecord, Ring};

/// Where a point lies relative to a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Containment {
    /// Strictly inside.
    Inside,
    /// On (within tolerance of) an edge of any ring.
    Boundary,
    /// Outside, including inside a hole.
    Outside,
}

impl Containment {
    /// Returns `true` for `Inside` or `Boundary`.
    #[must_use]
    pub const fn is_inclusive_match(self) -> bool {
        matches!(self, Self::Inside | Self::Boundary)
    }
}

/// Classify a point against a polygon.
///
/// # Example
///
/// ```
/// use density_join::{locate, Containment};
/// use density_types::{Point2, PolygonRecord, Ring};
///
/// let square = PolygonRecord::from_exterior(
///     "sq",
///     Ring::from_coords(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]),
/// )
/// .unwrap();
///
/// assert_eq!(locate(&Point2::new(1.0, 1.0), &square, 1e-9), Containment::Inside);
/// assert_eq!(locate(&Point2::new(2.0, 1.0), &square, 1e-9), Containment::Boundary);
/// assert_eq!(locate(&Point2::new(3.0, 1.0), &square, 1e-9), Containment::Outside);
/// ```
#[must_use]
pub fn locate(point: &Point2<f64>, polygon: &PolygonRecord, tolerance: f64) -> Containment {
    if !polygon.bounds().contains_with_margin(point, tolerance) {
        return Containment::Outside;
    }

    if polygon.rings().any(|ring| on_ring(point, ring, tolerance)) {
        return Containment::Boundary;
    }

    let crossings: usize = polygon.rings().map(|ring| ray_crossings(point, ring)).sum();
    if crossings % 2 == 1 {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

/// Number of ring edges crossed by a ray cast from `point` towards +X.
///
/// Edges are treated as half-open in Y so a ray through a vertex counts once.
fn ray_crossings(point: &Point2<f64>, ring: &Ring) -> usize {
    ring.edges()
        .filter(|(a, b)| {
            if (a.y > point.y) == (b.y > point.y) {
                return false;
            }
            let t = (point.y - a.y) / (b.y - a.y);
            let x_cross = t.mul_add(b.x - a.x, a.x);
            point.x < x_cross
        })
        .count()
}

fn on_ring(point: &Point2<f64>, ring: &Ring, tolerance: f64) -> bool {
    ring.edges()
        .any(|(a, b)| distance_to_segment(point, a, b) <= tolerance)
}

/// Euclidean distance from `p` to segment `ab`.
fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return ap.norm();
    }
    let t = (ap.dot(&ab) / len_sq).clamp(0.0, 1.0);
    (ap - ab * t).norm()
}
