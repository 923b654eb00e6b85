//! Row rendering for `Any` rows.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Number, Value as JsonValue};
use sqlx::any::AnyRow;
use sqlx::{Column, Row};

/// Convert a row into a JSON object keyed by column name.
pub trait RowToJson {
    fn to_json_map(&self) -> Map<String, JsonValue>;
}

impl RowToJson for AnyRow {
    fn to_json_map(&self) -> Map<String, JsonValue> {
        self.columns()
            .iter()
            .map(|col| (col.name().to_string(), decode_value(self, col.ordinal())))
            .collect()
    }
}

/// Decode by trying the `Any` value kinds in turn; NULL decodes as `None` for
/// every kind, so it is caught by the first attempt.
fn decode_value(row: &AnyRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map_or(JsonValue::Null, JsonValue::from);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v
            .and_then(Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map_or(JsonValue::Null, JsonValue::Bool);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map_or(JsonValue::Null, JsonValue::String);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.map_or(JsonValue::Null, |b| JsonValue::String(STANDARD.encode(b)));
    }
    JsonValue::Null
}
