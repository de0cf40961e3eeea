//! Reverse conversion: SurrealDB value → row value.
//!
//! Rows are plain JSON documents so they can be handed to the host engine
//! and written to storage without any SurrealDB types leaking out.

use chrono::SecondsFormat;
use serde_json::{Map, Number as JsonNumber, Value as JsonValue};
use surrealdb::sql::{Geometry, Number, Object, Value};

use crate::Row;

/// Key used when a statement returns something other than a document.
pub const SCALAR_ROW_KEY: &str = "value";

/// Convert a SurrealDB value to a row value (without type context).
pub fn surreal_value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::None | Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => number_to_json(n),
        Value::Strand(s) => JsonValue::String(s.as_str().to_string()),
        Value::Datetime(dt) => {
            JsonValue::String(dt.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Value::Duration(dur) => JsonValue::String(dur.to_string()),
        Value::Uuid(u) => JsonValue::String(u.0.to_string()),
        Value::Bytes(b) => JsonValue::Array(
            b.clone()
                .into_inner()
                .into_iter()
                .map(JsonValue::from)
                .collect(),
        ),
        Value::Array(arr) => JsonValue::Array(arr.iter().map(surreal_value_to_json).collect()),
        Value::Object(obj) => JsonValue::Object(object_to_row(obj)),
        // Thing (record ID) - convert to string
        Value::Thing(thing) => JsonValue::String(thing.to_string()),
        Value::Geometry(geo) => geometry_to_json(geo),
        // Other types - keep their SurrealQL text
        other => JsonValue::String(other.to_string()),
    }
}

/// Convert a SurrealDB Object to a row, keeping the database's key order.
pub fn object_to_row(obj: &Object) -> Row {
    let mut row = Map::new();
    for (key, value) in obj.iter() {
        row.insert(key.clone(), surreal_value_to_json(value));
    }
    row
}

/// Split one statement's result into rows.
///
/// - `NONE` is an empty result
/// - an array yields one row per element
/// - any other single value yields one row
///
/// Elements that are not documents are wrapped as `{"value": ...}`.
pub fn value_into_rows(value: &Value) -> Vec<Row> {
    match value {
        Value::None => Vec::new(),
        Value::Array(arr) => arr.iter().map(value_to_row).collect(),
        single => vec![value_to_row(single)],
    }
}

fn value_to_row(value: &Value) -> Row {
    match value {
        Value::Object(obj) => object_to_row(obj),
        other => {
            let mut row = Map::new();
            row.insert(SCALAR_ROW_KEY.to_string(), surreal_value_to_json(other));
            row
        }
    }
}

fn number_to_json(number: &Number) -> JsonValue {
    match number {
        Number::Int(i) => JsonValue::from(*i),
        Number::Float(f) => float_to_json(*f),
        Number::Decimal(d) => {
            // Keep the exact text when a float cannot carry every digit
            let text = d.normalize().to_string();
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() && f.to_string() == text => float_to_json(f),
                _ => JsonValue::String(text),
            }
        }
        #[allow(unreachable_patterns)]
        other => JsonValue::String(other.to_string()),
    }
}

fn float_to_json(f: f64) -> JsonValue {
    // NaN and infinities have no JSON number form
    JsonNumber::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(f.to_string()))
}

/// Convert a SurrealDB Geometry to a GeoJSON-like object.
fn geometry_to_json(geo: &Geometry) -> JsonValue {
    let (kind, coordinates) = match geo {
        Geometry::Point(p) => ("Point", point(p.x(), p.y())),
        Geometry::Line(line) => ("LineString", line_coordinates(line)),
        Geometry::Polygon(poly) => ("Polygon", polygon_coordinates(poly)),
        Geometry::MultiPoint(mp) => (
            "MultiPoint",
            JsonValue::Array(mp.iter().map(|p| point(p.x(), p.y())).collect()),
        ),
        Geometry::MultiLine(ml) => (
            "MultiLineString",
            JsonValue::Array(ml.iter().map(line_coordinates).collect()),
        ),
        Geometry::MultiPolygon(mp) => (
            "MultiPolygon",
            JsonValue::Array(mp.iter().map(polygon_coordinates).collect()),
        ),
        Geometry::Collection(items) => {
            let mut map = Map::new();
            map.insert(
                "type".to_string(),
                JsonValue::String("GeometryCollection".to_string()),
            );
            map.insert(
                "geometries".to_string(),
                JsonValue::Array(items.iter().map(geometry_to_json).collect()),
            );
            return JsonValue::Object(map);
        }
        #[allow(unreachable_patterns)]
        other => return JsonValue::String(other.to_string()),
    };

    let mut map = Map::new();
    map.insert("type".to_string(), JsonValue::String(kind.to_string()));
    map.insert("coordinates".to_string(), coordinates);
    JsonValue::Object(map)
}

fn point(x: f64, y: f64) -> JsonValue {
    JsonValue::Array(vec![float_to_json(x), float_to_json(y)])
}

fn line_coordinates(line: &geo_types::LineString<f64>) -> JsonValue {
    JsonValue::Array(line.points().map(|p| point(p.x(), p.y())).collect())
}

fn polygon_coordinates(poly: &geo_types::Polygon<f64>) -> JsonValue {
    let mut rings = vec![line_coordinates(poly.exterior())];
    rings.extend(poly.interiors().iter().map(line_coordinates));
    JsonValue::Array(rings)
}
