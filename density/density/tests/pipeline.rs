//! End-to-end pipeline tests.

use approx::assert_relative_eq;
use density::aggregate::SQUARE_METRES_TO_SQUARE_KILOMETRES;
use density::prelude::*;
use density::PipelineError;
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

fn rect(id: &str, x0: f64, y0: f64, w: f64, h: f64) -> PolygonRecord {
    PolygonRecord::from_exterior(
        id,
        Ring::from_coords(&[(x0, y0), (x0 + w, y0), (x0 + w, y0 + h), (x0, y0 + h)]),
    )
    .unwrap()
}

fn points(crs: &Crs, coords: &[(f64, f64)]) -> PointCollection {
    let records = coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| PointRecord::new(format!("pt-{i:03}"), x, y).unwrap())
        .collect();
    PointCollection::new(crs.clone(), records).unwrap()
}

fn planar_store(coords: &[(f64, f64)], polygons: Vec<PolygonRecord>) -> GeometryStore {
    let crs = Crs::conus_albers();
    GeometryStore::new(points(&crs, coords), PolygonCollection::new(crs, polygons).unwrap())
}

fn two_tracts(coords: &[(f64, f64)]) -> GeometryStore {
    planar_store(coords, vec![rect("west", 0.0, 0.0, 1.0, 1.0), rect("east", 1.0, 0.0, 1.0, 1.0)])
}

fn count_of(output: &PipelineOutput, id: &str) -> usize {
    output.densities.get(id).unwrap().count
}

// =============================================================================
// Reference behavior
// =============================================================================

#[test]
fn test_reference_densities() {
    let polygons = vec![
        rect("P1", 0.0, 0.0, 1.0, 1.0),
        rect("P2", 2.0, 0.0, 2.0, 1.0),
        PolygonRecord::from_exterior("P3", Ring::from_coords(&[(6.0, 0.0), (7.0, 0.0), (8.0, 0.0)])).unwrap(),
        rect("P4", 10.0, 0.0, 4.0, 1.0),
    ];
    let coords = [
        (0.25, 0.5),
        (0.75, 0.5),
        (2.5, 0.5),
        (3.0, 0.25),
        (3.5, 0.5),
        (3.0, 0.75),
        (12.0, 0.5),
    ];
    let output = run(&planar_store(&coords, polygons), &PipelineConfig::default()).unwrap();

    let densities: Vec<f64> = output.densities.values();
    assert_eq!(densities.len(), 4);
    assert_relative_eq!(densities[0], 2.0);
    assert_relative_eq!(densities[1], 2.0);
    assert_relative_eq!(densities[2], 0.0);
    assert_relative_eq!(densities[3], 0.25);

    assert!(output.densities.get("P3").unwrap().degenerate);
    assert!(output.warnings.contains(&PipelineWarning::DegenerateGeometry {
        polygon_id: "P3".to_string()
    }));
    assert!(output.warnings.contains(&PipelineWarning::ClassesCollapsed { requested: 5, used: 2 }));

    let layer = output.choropleth().unwrap();
    let ids: Vec<&str> = layer.features().iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2", "P3", "P4"]);
    assert_eq!(layer.feature("P1").unwrap().bin_index, Some(1));
    assert_eq!(layer.feature("P4").unwrap().bin_index, Some(0));
    assert_eq!(layer.feature("P3").unwrap().bin_index, None);
}

#[test]
fn test_every_polygon_has_one_entry() {
    let output = run(
        &two_tracts(&[(0.5, 0.5), (1.5, 0.5), (1.5, 0.25)]),
        &PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(output.densities.len(), 2);
    assert_eq!(output.choropleth().unwrap().len(), 2);
    assert_eq!(output.densities.total_count(), 3);
}

// =============================================================================
// Boundary rule
// =============================================================================

const EDGE_CASE: [(f64, f64); 5] = [(1.0, 0.5), (0.5, 0.5), (1.5, 0.2), (1.5, 0.4), (1.5, 0.7)];

#[test]
fn test_shared_edge_first_in_order() {
    let output = run(&two_tracts(&EDGE_CASE), &PipelineConfig::default()).unwrap();
    assert_eq!(count_of(&output, "west"), 2);
    assert_eq!(count_of(&output, "east"), 3);
    assert_eq!(output.join.boundary_resolved, 1);
    let edge: Vec<_> = output
        .join
        .associations
        .iter()
        .filter(|a| a.point_id == "pt-000")
        .collect();
    assert_eq!(edge.len(), 1);
}

#[test]
fn test_shared_edge_lowest_id() {
    let config = PipelineConfig::default().with_boundary_tie_rule(BoundaryRule::LowestId);
    let output = run(&two_tracts(&EDGE_CASE), &config).unwrap();
    assert_eq!(count_of(&output, "west"), 1);
    assert_eq!(count_of(&output, "east"), 4);
}

#[test]
fn test_shared_edge_excluded() {
    let config = PipelineConfig::default().with_boundary_tie_rule(BoundaryRule::Exclude);
    let output = run(&two_tracts(&EDGE_CASE), &config).unwrap();
    assert_eq!(count_of(&output, "west"), 1);
    assert_eq!(count_of(&output, "east"), 3);
    assert_eq!(output.join.unmatched, vec!["pt-000".to_string()]);
    let point = output
        .points()
        .unwrap()
        .features()
        .iter()
        .find(|p| p.id == "pt-000")
        .unwrap();
    assert_eq!(point.polygon_id, None);
}

// =============================================================================
// Determinism and configuration
// =============================================================================

#[test]
fn test_deterministic() {
    let coords: Vec<(f64, f64)> = (0..40)
        .map(|i| {
            let t = f64::from(i);
            ((t * 0.37) % 2.0, (t * 0.61) % 1.0)
        })
        .collect();
    let store = two_tracts(&coords);
    for kind in ClassifierKind::ALL {
        let config = PipelineConfig::default().with_classifier_kind(kind).with_class_count(3);
        let (Ok(a), Ok(b)) = (run(&store, &config), run(&store, &config)) else {
            continue;
        };
        assert_eq!(
            density::io::document_to_json(&a.document),
            density::io::document_to_json(&b.document)
        );
        assert_eq!(a.classification, b.classification);
    }
}

#[test]
fn test_unit_factor_scales_densities() {
    let coords = [(0.5, 0.5), (1.5, 0.5), (1.5, 0.25)];
    let base = run(&two_tracts(&coords), &PipelineConfig::default()).unwrap();
    let scaled = run(
        &two_tracts(&coords),
        &PipelineConfig::default().with_unit_conversion_factor(0.5),
    )
    .unwrap();
    for (a, b) in base.densities.values().iter().zip(scaled.densities.values()) {
        assert_relative_eq!(a * 2.0, b);
    }
}

#[test]
fn test_display_attributes() {
    let crs = Crs::conus_albers();
    let records = vec![
        PointRecord::new("a", 0.5, 0.5).unwrap().with_attribute("kind", "theft"),
        PointRecord::new("b", 1.5, 0.5).unwrap(),
        PointRecord::new("c", 1.5, 0.6).unwrap(),
    ];
    let store = GeometryStore::new(
        PointCollection::new(crs.clone(), records).unwrap(),
        PolygonCollection::new(crs, vec![rect("west", 0.0, 0.0, 1.0, 1.0), rect("east", 1.0, 0.0, 1.0, 1.0)])
            .unwrap(),
    );
    let config = PipelineConfig::default().with_display_attributes(["kind"]);
    let output = run(&store, &config).unwrap();
    let layer = output.points().unwrap();
    assert_eq!(layer.display_attributes(), &["kind".to_string()]);
    assert_eq!(layer.features()[0].attributes.len(), 1);
    assert_eq!(layer.features()[1].polygon_id.as_deref(), Some("east"));
}

// =============================================================================
// CRS handling
// =============================================================================

#[test]
fn test_crs_mismatch_fails_fast() {
    let store = GeometryStore::new(
        points(&Crs::wgs84(), &[(0.5, 0.5)]),
        PolygonCollection::new(Crs::conus_albers(), vec![rect("a", 0.0, 0.0, 1.0, 1.0)]).unwrap(),
    );
    let err = run(&store, &PipelineConfig::default()).unwrap_err();
    assert!(err.is_crs_mismatch(), "{err}");
}

#[test]
fn test_geographic_area_refused() {
    let crs = Crs::wgs84();
    let store = GeometryStore::new(
        points(&crs, &[(-99.5, 40.5)]),
        PolygonCollection::new(crs, vec![rect("cell", -100.0, 40.0, 1.0, 1.0)]).unwrap(),
    );
    let err = run(&store, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(&err, PipelineError::Density(e) if e.is_geographic_area()), "{err}");
}

#[test]
fn test_reproject_projected_source_fails() {
    let config = PipelineConfig::default().with_reprojection(Reprojection::conus_albers());
    let err = run(&two_tracts(&[(0.5, 0.5)]), &config).unwrap_err();
    assert!(matches!(err, PipelineError::Types(_)));
}

#[test]
fn test_geographic_inputs_reprojected() {
    let crs = Crs::wgs84();
    let store = GeometryStore::new(
        points(&crs, &[(-99.5, 40.5), (-98.5, 40.5), (-98.4, 40.5), (-98.6, 40.6)]),
        PolygonCollection::new(
            crs,
            vec![rect("cell-w", -100.0, 40.0, 1.0, 1.0), rect("cell-e", -99.0, 40.0, 1.0, 1.0)],
        )
        .unwrap(),
    );
    let config = PipelineConfig::default()
        .with_reprojection(Reprojection::conus_albers())
        .with_unit_conversion_factor(SQUARE_METRES_TO_SQUARE_KILOMETRES);
    let output = run(&store, &config).unwrap();

    assert_eq!(output.document.crs(), &Crs::conus_albers());
    assert_eq!(output.join.assigned_count(), 4);

    let west = output.densities.get("cell-w").unwrap();
    let east = output.densities.get("cell-e").unwrap();
    // A one-degree cell at 40.5N is roughly 84.6 km by 111 km
    for entry in [west, east] {
        assert!(entry.area > 9.0e9 && entry.area < 1.0e10, "{}", entry.area);
    }
    assert_relative_eq!(east.density / west.density, 3.0, max_relative = 0.01);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_counts_sum_to_assigned(
        coords in prop::collection::vec((0u32..=120, 0u32..=120), 1..60),
    ) {
        // Quarter-unit lattice over a 3x3 tessellation; every point lands somewhere
        let coords: Vec<(f64, f64)> = coords
            .into_iter()
            .map(|(x, y)| (f64::from(x) / 40.0, f64::from(y) / 40.0))
            .collect();
        let mut polygons = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                polygons.push(rect(&format!("t{row}{col}"), f64::from(col), f64::from(row), 1.0, 1.0));
            }
        }
        let store = planar_store(&coords, polygons);

        match run(&store, &PipelineConfig::default().with_class_count(3)) {
            Ok(output) => {
                prop_assert_eq!(output.densities.len(), 9);
                prop_assert_eq!(output.densities.total_count(), output.join.assigned_count());
                prop_assert_eq!(output.join.assigned_count(), coords.len());
                prop_assert!(output.classification.breaks.class_count() <= 3);
            }
            Err(err) => prop_assert!(err.is_insufficient_distinct(), "{}", err),
        }
    }
}

// =============================================================================
// Serde configuration
// =============================================================================

#[cfg(feature = "serde")]
#[test]
fn test_config_from_json() {
    let json = r#"{
        "join": { "boundary_tie_rule": "lowest-id" },
        "density": { "unit_conversion_factor": 2.0 },
        "classify": { "classifier_kind": "quantile", "class_count": 3 },
        "display_attributes": ["kind"]
    }"#;
    let config: PipelineConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.join.boundary_rule, BoundaryRule::LowestId);
    assert_relative_eq!(config.density.unit_conversion_factor, 2.0);
    assert_eq!(config.classify.kind, ClassifierKind::Quantile);
    assert_eq!(config.classify.class_count, 3);
    assert!(config.cluster_points);
    assert!(config.reprojection.is_none());
    assert!(config.validate().is_ok());

    let bad = r#"{ "classify": { "classifier_kind": "jenks-ish" } }"#;
    assert!(serde_json::from_str::<PipelineConfig>(bad).is_err());
}
