//! GeoJSON FeatureCollection reading.

use std::fs;
use std::path::Path;

use density_types::{
    AttributeValue, Attributes, Crs, Point2, PointCollection, PointRecord, PolygonCollection, PolygonRecord, Ring,
    Shell,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{IoError, IoResult};

/// How to interpret an input FeatureCollection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// CRS of the coordinates. GeoJSON (RFC 7946) is WGS 84 unless agreed otherwise.
    pub crs: Crs,
    /// Property holding the record id; `None` uses the feature's `id` member.
    pub id_property: Option<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            crs: Crs::wgs84(),
            id_property: None,
        }
    }
}

impl ReadOptions {
    /// Options for coordinates in the given CRS.
    #[must_use]
    pub const fn new(crs: Crs) -> Self {
        Self { crs, id_property: None }
    }

    /// Take record ids from a property instead of the feature `id`.
    #[must_use]
    pub fn with_id_property(mut self, property: impl Into<String>) -> Self {
        self.id_property = Some(property.into());
        self
    }
}

/// Load Point features from a GeoJSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a FeatureCollection,
/// or contains malformed coordinates or duplicate ids.
pub fn load_points<P: AsRef<Path>>(path: P, options: &ReadOptions) -> IoResult<PointCollection> {
    let text = read_to_string(path.as_ref())?;
    let points = parse_points(&text, options)?;
    info!(path = %path.as_ref().display(), points = points.len(), crs = %points.crs(), "Loaded points");
    Ok(points)
}

/// Load Polygon and MultiPolygon features from a GeoJSON file.
///
/// # Errors
///
/// Same as [`load_points`].
pub fn load_polygons<P: AsRef<Path>>(path: P, options: &ReadOptions) -> IoResult<PolygonCollection> {
    let text = read_to_string(path.as_ref())?;
    let polygons = parse_polygons(&text, options)?;
    info!(path = %path.as_ref().display(), polygons = polygons.len(), crs = %polygons.crs(), "Loaded polygons");
    Ok(polygons)
}

/// Parse Point features from GeoJSON text.
///
/// Features with other geometry types, or none, are skipped with a warning.
///
/// # Errors
///
/// Same as [`load_points`].
///
/// # Example
///
/// ```
/// use density_io::{parse_points, ReadOptions};
/// use density_types::Crs;
///
/// let text = r#"{"type": "FeatureCollection", "features": [
///     {"type": "Feature", "id": "call-1", "properties": {"kind": "noise"},
///      "geometry": {"type": "Point", "coordinates": [500.0, 250.0]}}
/// ]}"#;
///
/// let points = parse_points(text, &ReadOptions::new(Crs::conus_albers())).unwrap();
/// assert_eq!(points.len(), 1);
/// assert_eq!(points.get("call-1").unwrap().attribute("kind").unwrap().as_text(), Some("noise"));
/// ```
pub fn parse_points(text: &str, options: &ReadOptions) -> IoResult<PointCollection> {
    let mut records = Vec::new();
    for (index, feature) in features(text)?.iter().enumerate() {
        let Some((kind, coords)) = geometry(feature, index)? else {
            continue;
        };
        if kind != "Point" {
            warn!(index, kind, "Skipping non-point feature");
            continue;
        }
        let id = feature_id(feature, index, options)?;
        let position = position(coords, index)?;
        records.push(PointRecord::at(id, position)?.with_attributes(properties(feature)));
    }
    debug!(points = records.len(), "Parsed point features");
    Ok(PointCollection::new(options.crs.clone(), records)?)
}

/// Parse Polygon and MultiPolygon features from GeoJSON text.
///
/// Features with other geometry types, or none, are skipped with a warning.
///
/// # Errors
///
/// Same as [`load_points`].
pub fn parse_polygons(text: &str, options: &ReadOptions) -> IoResult<PolygonCollection> {
    let mut records = Vec::new();
    for (index, feature) in features(text)?.iter().enumerate() {
        let Some((kind, coords)) = geometry(feature, index)? else {
            continue;
        };
        let shells = match kind {
            "Polygon" => vec![shell(coords, index)?],
            "MultiPolygon" => array(coords, index, "MultiPolygon coordinates")?
                .iter()
                .map(|polygon| shell(polygon, index))
                .collect::<IoResult<Vec<_>>>()?,
            _ => {
                warn!(index, kind, "Skipping non-polygon feature");
                continue;
            }
        };
        let id = feature_id(feature, index, options)?;
        records.push(PolygonRecord::new(id, shells)?.with_attributes(properties(feature)));
    }
    debug!(polygons = records.len(), "Parsed polygon features");
    Ok(PolygonCollection::new(options.crs.clone(), records)?)
}

fn read_to_string(path: &Path) -> IoResult<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })
}

fn features(text: &str) -> IoResult<Vec<Value>> {
    let mut root: Value = serde_json::from_str(text)?;
    if root.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(IoError::invalid_content("top-level object is not a FeatureCollection"));
    }
    match root.get_mut("features").map(Value::take) {
        Some(Value::Array(features)) => Ok(features),
        _ => Err(IoError::invalid_content("FeatureCollection has no 'features' array")),
    }
}

/// Geometry type and coordinates, or `None` for a null geometry.
fn geometry(feature: &Value, index: usize) -> IoResult<Option<(&str, &Value)>> {
    match feature.get("geometry") {
        None | Some(Value::Null) => {
            warn!(index, "Skipping feature without geometry");
            Ok(None)
        }
        Some(geometry) => {
            let kind = geometry
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| IoError::invalid_content(format!("feature {index}: geometry has no type")))?;
            let coords = geometry
                .get("coordinates")
                .ok_or_else(|| IoError::invalid_content(format!("feature {index}: geometry has no coordinates")))?;
            Ok(Some((kind, coords)))
        }
    }
}

/// Record id from the configured property, the feature `id`, or the feature index.
fn feature_id(feature: &Value, index: usize, options: &ReadOptions) -> IoResult<String> {
    let raw = match &options.id_property {
        Some(key) => feature.get("properties").and_then(|p| p.get(key)).ok_or_else(|| {
            IoError::invalid_content(format!("feature {index}: missing id property '{key}'"))
        })?,
        None => match feature.get("id") {
            Some(id) => id,
            None => return Ok(index.to_string()),
        },
    };
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(IoError::invalid_content(format!(
            "feature {index}: id must be a string or number, got {other}"
        ))),
    }
}

fn properties(feature: &Value) -> Attributes {
    feature
        .get("properties")
        .and_then(Value::as_object)
        .map(attributes_from_json)
        .unwrap_or_default()
}

fn attributes_from_json(map: &Map<String, Value>) -> Attributes {
    map.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => AttributeValue::Null,
                Value::Bool(b) => AttributeValue::Bool(*b),
                Value::Number(n) => n.as_f64().map_or(AttributeValue::Null, AttributeValue::Number),
                Value::String(s) => AttributeValue::Text(s.clone()),
                nested => AttributeValue::Text(nested.to_string()),
            };
            (key.clone(), value)
        })
        .collect()
}

fn array<'a>(value: &'a Value, index: usize, what: &str) -> IoResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| IoError::invalid_content(format!("feature {index}: {what} is not an array")))
}

fn position(value: &Value, index: usize) -> IoResult<Point2<f64>> {
    let coords = array(value, index, "position")?;
    match (coords.first().and_then(Value::as_f64), coords.get(1).and_then(Value::as_f64)) {
        (Some(x), Some(y)) => Ok(Point2::new(x, y)),
        _ => Err(IoError::invalid_content(format!(
            "feature {index}: position needs two numbers"
        ))),
    }
}

fn ring(value: &Value, index: usize) -> IoResult<Ring> {
    let vertices = array(value, index, "ring")?
        .iter()
        .map(|p| position(p, index))
        .collect::<IoResult<Vec<_>>>()?;
    Ok(Ring::new(vertices))
}

/// A GeoJSON Polygon: exterior ring followed by holes.
fn shell(value: &Value, index: usize) -> IoResult<Shell> {
    let rings = array(value, index, "Polygon coordinates")?;
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| IoError::invalid_content(format!("feature {index}: polygon has no rings")))?;
    let mut shell = Shell::new(ring(exterior, index)?);
    for hole in holes {
        shell = shell.with_hole(ring(hole, index)?);
    }
    Ok(shell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRACTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"GEOID": "17031", "pop": 120},
             "geometry": {"type": "Polygon", "coordinates": [
                 [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
                 [[1, 1], [2, 1], [2, 2], [1, 2], [1, 1]]
             ]}},
            {"type": "Feature", "properties": {"GEOID": 17043},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                 [[[10, 0], [11, 0], [11, 1], [10, 1], [10, 0]]],
                 [[[20, 0], [22, 0], [22, 1], [20, 1], [20, 0]]]
             ]}},
            {"type": "Feature", "properties": {"GEOID": "x"},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
        ]
    }"#;

    #[test]
    fn test_parse_polygons() {
        let options = ReadOptions::new(Crs::conus_albers()).with_id_property("GEOID");
        let polygons = parse_polygons(TRACTS, &options).unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons.crs(), &Crs::conus_albers());

        let first = polygons.get("17031").unwrap();
        assert_eq!(first.ring_count(), 2);
        assert_relative_eq!(first.planar_area(), 15.0);
        assert_eq!(first.attribute("pop").and_then(AttributeValue::as_number), Some(120.0));

        let second = polygons.get("17043").unwrap();
        assert_eq!(second.shells().len(), 2);
        assert_relative_eq!(second.planar_area(), 3.0);
    }

    #[test]
    fn test_parse_points_ids() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": 7, "properties": null, "geometry": {"type": "Point", "coordinates": [1.5, 2.5]}},
            {"type": "Feature", "properties": {"tags": ["a"]}, "geometry": {"type": "Point", "coordinates": [3, 4, 99]}},
            {"type": "Feature", "id": "gone", "properties": {}, "geometry": null}
        ]}"#;
        let points = parse_points(text, &ReadOptions::default()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.crs(), &Crs::wgs84());
        assert_eq!(points.get("7").unwrap().position(), &Point2::new(1.5, 2.5));
        // Falls back to the feature index
        let second = points.get("1").unwrap();
        assert_eq!(second.attribute("tags").and_then(AttributeValue::as_text), Some("[\"a\"]"));
    }

    #[test]
    fn test_invalid_documents() {
        let options = ReadOptions::default();
        assert!(matches!(parse_points("[]", &options), Err(IoError::InvalidContent { .. })));
        assert!(matches!(
            parse_points(r#"{"type": "FeatureCollection"}"#, &options),
            Err(IoError::InvalidContent { .. })
        ));
        assert!(matches!(parse_points("{not json", &options), Err(IoError::Json(_))));

        let bad_coords = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": "p", "geometry": {"type": "Point", "coordinates": ["x", 1]}}
        ]}"#;
        assert!(matches!(parse_points(bad_coords, &options), Err(IoError::InvalidContent { .. })));
    }

    #[test]
    fn test_missing_id_property() {
        let options = ReadOptions::default().with_id_property("tract");
        let err = parse_polygons(TRACTS, &options).unwrap_err();
        assert!(err.to_string().contains("missing id property 'tract'"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": "a", "geometry": {"type": "Point", "coordinates": [0, 0]}},
            {"type": "Feature", "id": "a", "geometry": {"type": "Point", "coordinates": [1, 1]}}
        ]}"#;
        let err = parse_points(text, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::Geometry(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_points("nonexistent_points_12345.geojson", &ReadOptions::default());
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
