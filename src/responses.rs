//! Error responses shared by every generated operation.

use serde_json::{json, Map, Value};

use crate::types::schema_ref;

/// Component name of the error body schema.
pub const ERROR_SCHEMA: &str = "error";

/// Response slot of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    BadRequest,
    NotFound,
    /// Catch-all `default` response.
    Unexpected,
}

impl ErrorStatus {
    /// Key in an operation's `responses` object.
    pub fn key(&self) -> &'static str {
        match self {
            ErrorStatus::BadRequest => "400",
            ErrorStatus::NotFound => "404",
            ErrorStatus::Unexpected => "default",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorStatus::BadRequest => "Bad Request",
            ErrorStatus::NotFound => "Not Found",
            ErrorStatus::Unexpected => "Unexpected Error",
        }
    }
}

/// The response object of one error status.
pub fn error_response(status: ErrorStatus) -> Value {
    json!({
        "description": status.description(),
        "content": {
            "application/json": {
                "schema": { "$ref": schema_ref(ERROR_SCHEMA) }
            }
        }
    })
}

/// Responses for the given statuses, always followed by `default`.
pub fn error_responses(statuses: &[ErrorStatus]) -> Map<String, Value> {
    statuses
        .iter()
        .filter(|s| **s != ErrorStatus::Unexpected)
        .chain(std::iter::once(&ErrorStatus::Unexpected))
        .map(|status| (status.key().to_string(), error_response(*status)))
        .collect()
}

/// Schema of the error body.
pub fn error_schema() -> Value {
    json!({
        "required": ["name", "message"],
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "message": { "type": "string" }
        }
    })
}
