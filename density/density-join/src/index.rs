//! Uniform grid index over polygon bounding boxes.

// Cell counts are small positive integers derived from polygon counts
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use density_types::{Bounds2, Point2, PolygonRecord};

/// Upper limit on cells along one axis.
const MAX_CELLS_PER_AXIS: usize = 64;

/// A uniform grid mapping cells to the polygons whose (margin-expanded)
/// bounding boxes overlap them.
///
/// Candidate lists are kept in ascending polygon order, so scanning the
/// candidates visits polygons in the same relative order as a full scan and
/// the join result does not depend on whether the index is used.
///
/// # Example
///
/// ```
/// use density_join::PolygonGridIndex;
/// use density_types::{Point2, PolygonRecord, Ring};
///
/// let polygons = vec![
///     PolygonRecord::from_exterior("a", Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])).unwrap(),
///     PolygonRecord::from_exterior("b", Ring::from_coords(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)])).unwrap(),
/// ];
/// let index = PolygonGridIndex::build(&polygons, 0.0);
///
/// assert_eq!(index.candidates(&Point2::new(0.5, 0.2)), &[0]);
/// assert!(index.candidates(&Point2::new(20.0, 20.0)).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PolygonGridIndex {
    bounds: Bounds2,
    cols: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    cells: Vec<Vec<usize>>,
}

impl PolygonGridIndex {
    /// Build an index over all polygons.
    ///
    /// `margin` expands every bounding box, matching the join's boundary
    /// tolerance so near-boundary points still find their candidates.
    #[must_use]
    pub fn build(polygons: &[PolygonRecord], margin: f64) -> Self {
        let all: Vec<usize> = (0..polygons.len()).collect();
        Self::build_subset(polygons, &all, margin)
    }

    /// Build an index over a subset of polygon positions.
    ///
    /// Positions must be valid indices into `polygons`.
    #[must_use]
    pub fn build_subset(polygons: &[PolygonRecord], subset: &[usize], margin: f64) -> Self {
        let expanded = |b: &Bounds2| {
            Bounds2::new(
                Point2::new(b.min.x - margin, b.min.y - margin),
                Point2::new(b.max.x + margin, b.max.y + margin),
            )
        };

        let bounds = subset
            .iter()
            .map(|&i| expanded(polygons[i].bounds()))
            .fold(Bounds2::empty(), |acc, b| acc.union(&b));

        let per_axis = ((subset.len() as f64).sqrt().ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS);
        let cols = if bounds.width() > 0.0 { per_axis } else { 1 };
        let rows = if bounds.height() > 0.0 { per_axis } else { 1 };

        let mut index = Self {
            bounds,
            cols,
            rows,
            cell_width: bounds.width() / cols as f64,
            cell_height: bounds.height() / rows as f64,
            cells: vec![Vec::new(); cols * rows],
        };

        let mut sorted = subset.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for i in sorted {
            let b = expanded(polygons[i].bounds());
            let (c0, r0) = index.cell_of(&b.min);
            let (c1, r1) = index.cell_of(&b.max);
            for row in r0..=r1 {
                for col in c0..=c1 {
                    index.cells[row * cols + col].push(i);
                }
            }
        }
        index
    }

    /// Candidate polygon positions for a point, in ascending order.
    #[must_use]
    pub fn candidates(&self, point: &Point2<f64>) -> &[usize] {
        if self.bounds.is_empty() || !self.bounds.contains(point) {
            return &[];
        }
        let (col, row) = self.cell_of(point);
        &self.cells[row * self.cols + col]
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Cell coordinates of a point, clamped to the grid.
    fn cell_of(&self, point: &Point2<f64>) -> (usize, usize) {
        let axis = |value: f64, origin: f64, size: f64, count: usize| -> usize {
            if size <= 0.0 {
                return 0;
            }
            let cell = ((value - origin) / size).floor();
            if cell <= 0.0 {
                0
            } else {
                (cell as usize).min(count - 1)
            }
        };
        (
            axis(point.x, self.bounds.min.x, self.cell_width, self.cols),
            axis(point.y, self.bounds.min.y, self.cell_height, self.rows),
        )
    }
}
