//! Structural validation of untyped store documents.
//!
//! # Invariants
//! - Validation is all-or-nothing: a document either becomes a typed
//!   `StoreDocument` or yields exactly one `StoreError`.
//! - Undeclared fields are ignored and dropped from the typed result.

use super::{schema_for, CollectionField, FieldType, SchemaVersion, StoreDocument};
use crate::error::{StoreError, StoreResult};
use serde_json::{Map, Value};

/// Decodes JSON text and validates it against its declared version.
pub fn parse(text: &str) -> StoreResult<StoreDocument> {
    let raw: Value = serde_json::from_str(text)?;
    validate(&raw)
}

/// Validates an untyped value against the registry.
///
/// # Errors
/// - `MalformedBase` when `raw` is not an object with integer `version >= 1`.
/// - `UnknownVersion` when the version is not registered.
/// - `SchemaMismatch` naming the first offending field path.
pub fn validate(raw: &Value) -> StoreResult<StoreDocument> {
    let object = raw
        .as_object()
        .ok_or_else(|| StoreError::MalformedBase("document is not an object".to_string()))?;
    let version = base_version(object)?;

    let schema = u32::try_from(version)
        .ok()
        .and_then(schema_for)
        .ok_or(StoreError::UnknownVersion(version))?;

    let canonical = check_shape(schema, object)?;
    schema
        .decode(canonical)
        .map_err(|err| StoreError::SchemaMismatch {
            version: schema.version,
            field: format!("document ({err})"),
            expected: "decodable document",
        })
}

fn base_version(object: &Map<String, Value>) -> StoreResult<i64> {
    let raw_version = object
        .get("version")
        .ok_or_else(|| StoreError::MalformedBase("missing `version`".to_string()))?;
    match integer_value(raw_version) {
        Some(version) if version >= 1 => Ok(version),
        Some(version) => Err(StoreError::MalformedBase(format!(
            "`version` must be >= 1, got {version}"
        ))),
        None => Err(StoreError::MalformedBase(
            "`version` is not an integer".to_string(),
        )),
    }
}

/// Checks declared fields and rebuilds them in canonical form.
fn check_shape(schema: &SchemaVersion, object: &Map<String, Value>) -> StoreResult<Value> {
    let mut canonical = Map::new();
    canonical.insert("version".to_string(), Value::from(schema.version));

    for collection in schema.collections {
        let items = check_collection(schema.version, collection, object.get(collection.name))?;
        canonical.insert(collection.name.to_string(), Value::Array(items));
    }

    Ok(Value::Object(canonical))
}

fn check_collection(
    version: u32,
    collection: &CollectionField,
    value: Option<&Value>,
) -> StoreResult<Vec<Value>> {
    let mismatch = |field: String, expected: &'static str| StoreError::SchemaMismatch {
        version,
        field,
        expected,
    };

    let items = value
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch(collection.name.to_string(), "array"))?;

    let mut checked = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let record = item
            .as_object()
            .ok_or_else(|| mismatch(format!("{}[{index}]", collection.name), "object"))?;

        let mut fields = Map::new();
        for &(name, field_type) in collection.record.fields {
            let path = || format!("{}[{index}].{name}", collection.name);
            let field = record
                .get(name)
                .ok_or_else(|| mismatch(path(), field_type.label()))?;
            let canonical = canonical_scalar(field, field_type)
                .ok_or_else(|| mismatch(path(), field_type.label()))?;
            fields.insert(name.to_string(), canonical);
        }
        checked.push(Value::Object(fields));
    }

    Ok(checked)
}

fn canonical_scalar(value: &Value, field_type: FieldType) -> Option<Value> {
    match field_type {
        FieldType::Text => value.as_str().map(Value::from),
        FieldType::Integer => integer_value(value).map(Value::from),
    }
}

/// Interprets a JSON number as an integer when it has no fractional part.
fn integer_value(value: &Value) -> Option<i64> {
    if let Some(integer) = value.as_i64() {
        return Some(integer);
    }
    if value.is_u64() {
        return None;
    }
    let float = value.as_f64()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    if float.is_finite() && float.fract() == 0.0 && in_range {
        Some(float as i64)
    } else {
        None
    }
}
