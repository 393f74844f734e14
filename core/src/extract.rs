//! Typed field access on `serde_json::Value`.
//!
//! Every helper walks `path` one segment at a time. Objects are indexed by
//! key; arrays accept a segment that parses as an index. Nothing is coerced:
//! `"1"` is a string, not an integer.

use serde_json::{Map, Value};

use crate::error::{ExtractionError, JsonKind};

/// Returns the value at `path`. An empty path returns `value` itself.
pub fn extract<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value, ExtractionError> {
    path.iter().try_fold(value, |node, key| match node {
        Value::Object(map) => map
            .get(*key)
            .ok_or_else(|| ExtractionError::MissingKey((*key).to_string())),
        Value::Array(items) => key
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .ok_or_else(|| ExtractionError::MissingKey((*key).to_string())),
        other => Err(mismatch(JsonKind::Object, other)),
    })
}

pub fn extract_str<'a>(value: &'a Value, path: &[&str]) -> Result<&'a str, ExtractionError> {
    let node = extract(value, path)?;
    node.as_str().ok_or_else(|| mismatch(JsonKind::String, node))
}

pub fn extract_i64(value: &Value, path: &[&str]) -> Result<i64, ExtractionError> {
    let node = extract(value, path)?;
    node.as_i64().ok_or_else(|| mismatch(JsonKind::Integer, node))
}

pub fn extract_u64(value: &Value, path: &[&str]) -> Result<u64, ExtractionError> {
    let node = extract(value, path)?;
    node.as_u64().ok_or_else(|| mismatch(JsonKind::Integer, node))
}

/// Accepts integers as well as floats.
pub fn extract_f64(value: &Value, path: &[&str]) -> Result<f64, ExtractionError> {
    let node = extract(value, path)?;
    node.as_f64().ok_or_else(|| mismatch(JsonKind::Float, node))
}

pub fn extract_bool(value: &Value, path: &[&str]) -> Result<bool, ExtractionError> {
    let node = extract(value, path)?;
    node.as_bool().ok_or_else(|| mismatch(JsonKind::Bool, node))
}

pub fn extract_object<'a>(
    value: &'a Value,
    path: &[&str],
) -> Result<&'a Map<String, Value>, ExtractionError> {
    let node = extract(value, path)?;
    node.as_object().ok_or_else(|| mismatch(JsonKind::Object, node))
}

pub fn extract_array<'a>(value: &'a Value, path: &[&str]) -> Result<&'a [Value], ExtractionError> {
    let node = extract(value, path)?;
    node.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| mismatch(JsonKind::Array, node))
}

fn mismatch(expected: JsonKind, actual: &Value) -> ExtractionError {
    ExtractionError::TypeMismatch {
        expected,
        actual: JsonKind::of(actual),
    }
}
