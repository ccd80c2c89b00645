//! Property-based tests for the spatial join.
//!
//! Run with: cargo test -p density-join -- proptest

use density_join::{join_points, BoundaryRule, JoinParams};
use density_types::{Crs, PointCollection, PointRecord, PolygonCollection, PolygonRecord, Ring};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// An `n` x `n` tessellation of unit squares. Neighbours share edges exactly.
fn tessellation(n: u32) -> PolygonCollection {
    let mut polygons = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let (x, y) = (f64::from(col), f64::from(row));
            polygons.push(
                PolygonRecord::from_exterior(
                    format!("r{row}c{col}"),
                    Ring::from_coords(&[(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]),
                )
                .unwrap(),
            );
        }
    }
    PolygonCollection::new(Crs::conus_albers(), polygons).unwrap()
}

/// Points on a quarter-unit lattice, so many land exactly on shared edges and corners.
fn arb_lattice_points(extent: i32) -> impl Strategy<Value = PointCollection> {
    prop::collection::vec((-4..=extent * 4 + 4, -4..=extent * 4 + 4), 1..120).prop_map(|coords| {
        let points = coords
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                PointRecord::new(format!("p{i}"), f64::from(x) / 4.0, f64::from(y) / 4.0).unwrap()
            })
            .collect();
        PointCollection::new(Crs::conus_albers(), points).unwrap()
    })
}

/// Random, possibly overlapping triangles.
fn arb_triangles() -> impl Strategy<Value = PolygonCollection> {
    prop::collection::vec(prop::array::uniform6(-10.0..10.0f64), 1..20).prop_map(|tris| {
        let polygons = tris
            .into_iter()
            .enumerate()
            .filter_map(|(i, t)| {
                PolygonRecord::from_exterior(
                    format!("t{i}"),
                    Ring::from_coords(&[(t[0], t[1]), (t[2], t[3]), (t[4], t[5])]),
                )
                .ok()
            })
            .collect();
        PolygonCollection::new(Crs::conus_albers(), polygons).unwrap()
    })
}

fn arb_rule() -> impl Strategy<Value = BoundaryRule> {
    prop::sample::select(BoundaryRule::ALL.to_vec())
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    /// Every point is either assigned exactly once or reported unmatched.
    #[test]
    fn proptest_every_point_accounted_once(points in arb_lattice_points(4), rule in arb_rule()) {
        let out = join_points(&points, &tessellation(4), &JoinParams::default().with_boundary_rule(rule)).unwrap();
        prop_assert_eq!(out.assigned_count() + out.unmatched.len(), points.len());
        prop_assert_eq!(out.point_count, points.len());

        let mut seen: Vec<&str> = out.associations.iter().map(|a| a.point_id.as_str()).collect();
        seen.extend(out.unmatched.iter().map(String::as_str));
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), points.len());
    }

    /// Inclusive rules assign every point inside the closed tessellation.
    #[test]
    fn proptest_tessellation_has_no_gaps(points in arb_lattice_points(3)) {
        for rule in [BoundaryRule::FirstInOrder, BoundaryRule::LowestId] {
            let out = join_points(&points, &tessellation(3), &JoinParams::default().with_boundary_rule(rule)).unwrap();
            let covered = points
                .iter()
                .filter(|p| (0.0..=3.0).contains(&p.position().x) && (0.0..=3.0).contains(&p.position().y))
                .count();
            prop_assert_eq!(out.assigned_count(), covered);
        }
    }

    /// The grid index only prunes candidates; it never changes the answer.
    #[test]
    fn proptest_index_matches_naive(polygons in arb_triangles(), points in arb_lattice_points(5), rule in arb_rule()) {
        let params = JoinParams::default().with_boundary_rule(rule);
        let indexed = join_points(&points, &polygons, &params).unwrap();
        let naive = join_points(&points, &polygons, &params.clone().with_index(false)).unwrap();
        prop_assert_eq!(indexed, naive);
    }

    /// Parallel evaluation preserves results and ordering.
    #[test]
    fn proptest_parallel_matches_sequential(points in arb_lattice_points(4), rule in arb_rule()) {
        let polygons = tessellation(4);
        let params = JoinParams::default().with_boundary_rule(rule);
        let sequential = join_points(&points, &polygons, &params).unwrap();
        let parallel = join_points(&points, &polygons, &params.clone().with_parallel(true)).unwrap();
        prop_assert_eq!(sequential, parallel);
    }
}
