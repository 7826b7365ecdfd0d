//! Assembling the full OpenAPI document from a base and a model document.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::TranslateError;
use crate::model::ModelDocument;
use crate::paths::model_paths;
use crate::responses::{error_schema, ERROR_SCHEMA};
use crate::types::json_type_name;

/// OpenAPI version written when the base does not name one.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Build the OpenAPI document for every model, on top of `base`.
///
/// Keys of `base` pass through untouched; `tags`, `paths` and
/// `components.schemas` are extended, never replaced.
///
/// # Errors
///
/// Returns `TranslateError::InvalidBase` if `base` (or one of the sections
/// extended above) is not an object, and any error from translating a model.
pub fn build_document(base: &Value, models: &ModelDocument) -> Result<Value, TranslateError> {
    let Some(base) = base.as_object() else {
        return Err(invalid_base("document", base));
    };

    let mut document = base.clone();
    document
        .entry("openapi")
        .or_insert_with(|| Value::String(OPENAPI_VERSION.to_string()));

    let mut tags = match document.remove("tags") {
        None => Vec::new(),
        Some(Value::Array(tags)) => tags,
        Some(other) => return Err(invalid_base("tags", &other)),
    };
    let mut paths = section(&mut document, "paths")?;
    let mut components = section(&mut document, "components")?;
    let mut schemas = section(&mut components, "schemas")?;

    schemas.insert(ERROR_SCHEMA.to_string(), error_schema());

    for model in &models.models {
        tags.push(json!({
            "name": model.name,
            "description": format!("REST interface for {} model", model.name),
        }));
        paths.extend(model_paths(model, &models.options));
        let schema = model.translate(&models.schemas)?;
        schemas.insert(model.name.clone(), schema.to_value());
    }

    debug!(
        models = models.models.len(),
        paths = paths.len(),
        "assembled openapi document"
    );

    components.insert("schemas".to_string(), Value::Object(schemas));
    document.insert("tags".to_string(), Value::Array(tags));
    document.insert("paths".to_string(), Value::Object(paths));
    document.insert("components".to_string(), Value::Object(components));
    Ok(Value::Object(document))
}

/// Take an object-valued section out of `parent`, empty when absent.
fn section(parent: &mut Map<String, Value>, key: &str) -> Result<Map<String, Value>, TranslateError> {
    match parent.remove(key) {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(invalid_base(key, &other)),
    }
}

fn invalid_base(what: &str, value: &Value) -> TranslateError {
    TranslateError::InvalidBase {
        message: format!("{} must be an object, got {}", what, json_type_name(value)),
    }
}
