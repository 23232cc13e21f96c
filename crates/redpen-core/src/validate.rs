//! Schema validation of a normalised payload into annotation records.

use serde_json::Value;
use tracing::debug;

use crate::normalize::normalize;
use crate::record::{AnnotationRecord, Shape};
use crate::ExtractError;

/// Parse `payload` and admit every element under `shape`.
///
/// All-or-nothing: one element that fails `shape` rejects the whole batch.
/// Input order is preserved.
pub fn validate(payload: &str, shape: Shape) -> Result<Vec<AnnotationRecord>, ExtractError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ExtractError::MalformedJson {
            payload: payload.to_string(),
            message: e.to_string(),
        })?;

    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(ExtractError::NotAnArray {
                found: json_type(&other),
            });
        }
    };

    if elements.is_empty() {
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match shape.admit(&element) {
            Some(record) => records.push(record),
            None => return Err(ExtractError::SchemaMismatch { index, element }),
        }
    }

    debug!(count = records.len(), ?shape, "validated annotation records");
    Ok(records)
}

/// Normalise a raw model response, then validate it.
pub fn extract(raw: &str, shape: Shape) -> Result<Vec<AnnotationRecord>, ExtractError> {
    let payload = normalize(raw)?;
    validate(&payload, shape)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
