//! Payload validation against generated entity schemas.

use serde_json::{json, Value};

use crate::error::{SchemaError, TranslateError, ValidateError};
use crate::types::schema_ref;

/// Validate a payload against the entity schema of `model` in an OpenAPI document.
///
/// `#/components/schemas/*` references inside the entity schema resolve
/// against the document's components.
///
/// # Errors
///
/// Returns `ValidateError::Translate` if the document has no schema for `model`,
/// or `ValidateError::Invalid` if the payload doesn't match the schema.
pub fn validate(document: &Value, model: &str, payload: &Value) -> Result<(), ValidateError> {
    let schemas = &document["components"]["schemas"];
    if schemas.get(model).is_none() {
        return Err(TranslateError::UnknownModel {
            name: model.to_string(),
        }
        .into());
    }

    let schema = json!({
        "$ref": schema_ref(model),
        "components": { "schemas": schemas },
    });
    validate_against_schema(&schema, payload)
}

/// Validate a payload against a standalone JSON Schema.
///
/// Use this to validate many payloads against a schema built once.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
        message: e.to_string(),
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
