//! GeoJSON and map document writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use density_classify::Breaks;
use density_layer::{ChoroplethLayer, ChoroplethStyle, Layer, Legend, MapDocument, PointLayer};
use density_types::{AttributeValue, Attributes, Point2, Ring, Shell};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::IoResult;

/// Choropleth layer as a GeoJSON FeatureCollection.
///
/// Each feature's properties hold the original polygon attributes plus `id`,
/// `density`, `count`, `bin_index`, `fill_color` and `degenerate`.
#[must_use]
pub fn choropleth_to_geojson(layer: &ChoroplethLayer) -> Value {
    let features: Vec<Value> = layer
        .features()
        .iter()
        .map(|f| {
            let mut properties = attributes_to_json(&f.attributes);
            properties.insert("id".into(), json!(f.id));
            properties.insert("density".into(), number(f.density));
            properties.insert("count".into(), json!(f.count));
            properties.insert("bin_index".into(), json!(f.bin_index));
            properties.insert("fill_color".into(), json!(f.fill_color.to_string()));
            properties.insert("degenerate".into(), json!(f.degenerate));
            json!({
                "type": "Feature",
                "id": f.id,
                "properties": properties,
                "geometry": shells_to_geometry(&f.shells),
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Point layer as a GeoJSON FeatureCollection.
///
/// Properties hold the selected display attributes plus `polygon_id`.
#[must_use]
pub fn points_to_geojson(layer: &PointLayer) -> Value {
    let features: Vec<Value> = layer
        .features()
        .iter()
        .map(|f| {
            let mut properties = attributes_to_json(&f.attributes);
            properties.insert("polygon_id".into(), json!(f.polygon_id));
            json!({
                "type": "Feature",
                "id": f.id,
                "properties": properties,
                "geometry": { "type": "Point", "coordinates": coordinate(&f.position) },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Whole map document: CRS, then each layer with its data, style and legend.
#[must_use]
pub fn document_to_json(document: &MapDocument) -> Value {
    let layers: Vec<Value> = document
        .layers()
        .iter()
        .map(|layer| match layer {
            Layer::Choropleth(c) => json!({
                "type": layer.kind(),
                "breaks": breaks_to_json(c.breaks()),
                "style": style_to_json(c.style()),
                "legend": legend_to_json(c.legend()),
                "data": choropleth_to_geojson(c),
            }),
            Layer::Points(p) => json!({
                "type": layer.kind(),
                "cluster": p.cluster(),
                "display_attributes": p.display_attributes(),
                "data": points_to_geojson(p),
            }),
        })
        .collect();

    json!({ "crs": document.crs().to_string(), "layers": layers })
}

/// Save a choropleth layer as GeoJSON.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_choropleth<P: AsRef<Path>>(layer: &ChoroplethLayer, path: P) -> IoResult<()> {
    write_json(&choropleth_to_geojson(layer), path.as_ref())?;
    info!(path = %path.as_ref().display(), features = layer.len(), "Wrote choropleth layer");
    Ok(())
}

/// Save a point layer as GeoJSON.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_points<P: AsRef<Path>>(layer: &PointLayer, path: P) -> IoResult<()> {
    write_json(&points_to_geojson(layer), path.as_ref())?;
    info!(path = %path.as_ref().display(), features = layer.len(), "Wrote point layer");
    Ok(())
}

/// Save a map document as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_document<P: AsRef<Path>>(document: &MapDocument, path: P) -> IoResult<()> {
    write_json(&document_to_json(document), path.as_ref())?;
    info!(path = %path.as_ref().display(), layers = document.layers().len(), "Wrote map document");
    Ok(())
}

fn write_json(value: &Value, path: &Path) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Non-finite numbers become `null`, which JSON can represent.
fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn coordinate(p: &Point2<f64>) -> Value {
    json!([number(p.x), number(p.y)])
}

/// Ring as a closed GeoJSON linear ring.
fn ring_to_json(ring: &Ring) -> Value {
    let vertices = ring.vertices();
    let closed: Vec<Value> = vertices
        .iter()
        .chain(vertices.first())
        .map(coordinate)
        .collect();
    Value::Array(closed)
}

fn shell_to_json(shell: &Shell) -> Value {
    Value::Array(shell.rings().map(ring_to_json).collect())
}

fn shells_to_geometry(shells: &[Shell]) -> Value {
    match shells {
        [single] => json!({ "type": "Polygon", "coordinates": shell_to_json(single) }),
        many => json!({
            "type": "MultiPolygon",
            "coordinates": many.iter().map(shell_to_json).collect::<Vec<_>>(),
        }),
    }
}

fn attributes_to_json(attributes: &Attributes) -> Map<String, Value> {
    attributes
        .iter()
        .map(|(key, value)| {
            let value = match value {
                AttributeValue::Null => Value::Null,
                AttributeValue::Bool(b) => Value::Bool(*b),
                AttributeValue::Number(n) => number(*n),
                AttributeValue::Text(s) => Value::String(s.clone()),
            };
            (key.clone(), value)
        })
        .collect()
}

fn breaks_to_json(breaks: &Breaks) -> Value {
    Value::Array(breaks.boundaries().iter().map(|&b| number(b)).collect())
}

fn style_to_json(style: &ChoroplethStyle) -> Value {
    json!({
        "palette": style.palette.name(),
        "fill_opacity": style.fill_opacity,
        "line_opacity": style.line_opacity,
        "legend_name": style.legend_name,
        "no_data_color": style.no_data_color.to_string(),
    })
}

fn legend_to_json(legend: &Legend) -> Value {
    let entries: Vec<Value> = legend
        .entries
        .iter()
        .map(|e| {
            json!({
                "bin_index": e.bin_index,
                "lower": number(e.lower),
                "upper": number(e.upper),
                "color": e.color.to_string(),
                "count": e.count,
                "label": e.label,
            })
        })
        .collect();
    json!({ "title": legend.title, "entries": entries })
}
