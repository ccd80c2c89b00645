//! Axis-aligned 2D bounding box.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in the plane.
///
/// Both edges are inclusive: a point on the boundary is contained.
///
/// # Example
///
/// ```
/// use density_types::{Bounds2, Point2};
///
/// let mut bounds = Bounds2::empty();
/// bounds.expand_to_include(&Point2::new(0.0, 0.0));
/// bounds.expand_to_include(&Point2::new(4.0, 2.0));
///
/// assert!(bounds.contains(&Point2::new(4.0, 1.0)));
/// assert!(!bounds.contains(&Point2::new(4.1, 1.0)));
/// assert!((bounds.width() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds2 {
    /// Minimum corner.
    pub min: Point2<f64>,
    /// Maximum corner.
    pub max: Point2<f64>,
}

impl Bounds2 {
    /// Create bounds from two corners, ordering each axis.
    #[must_use]
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create an empty (inverted) box, the identity for expansion.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create the bounding box of a set of points.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand_to_include(p);
        }
        bounds
    }

    /// Returns `true` if no point has been included yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow the box to include `point`.
    pub fn expand_to_include(&mut self, point: &Point2<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Returns the smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Inclusive containment test with a margin on every side.
    #[must_use]
    pub fn contains_with_margin(&self, point: &Point2<f64>, margin: f64) -> bool {
        point.x >= self.min.x - margin
            && point.x <= self.max.x + margin
            && point.y >= self.min.y - margin
            && point.y <= self.max.y + margin
    }

    /// Width along X (zero when empty).
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.x - self.min.x }
    }

    /// Height along Y (zero when empty).
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.y - self.min.y }
    }
}

impl Default for Bounds2 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_corners() {
        let b = Bounds2::new(Point2::new(5.0, -1.0), Point2::new(1.0, 3.0));
        assert_eq!(b.min, Point2::new(1.0, -1.0));
        assert_eq!(b.max, Point2::new(5.0, 3.0));
    }

    #[test]
    fn test_empty() {
        let b = Bounds2::empty();
        assert!(b.is_empty());
        assert!(!b.contains(&Point2::origin()));
        assert!(b.width().abs() < f64::EPSILON);
    }

    #[test]
    fn test_union() {
        let a = Bounds2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let b = Bounds2::new(Point2::new(2.0, -1.0), Point2::new(3.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Point2::new(0.0, -1.0));
        assert_eq!(u.max, Point2::new(3.0, 1.0));
        assert_eq!(Bounds2::empty().union(&a), a);
    }

    #[test]
    fn test_margin() {
        let b = Bounds2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert!(!b.contains(&Point2::new(1.05, 0.5)));
        assert!(b.contains_with_margin(&Point2::new(1.05, 0.5), 0.1));
    }
}
