//! Operation identifiers and parameters of the generated CRUD routes.

use convert_case::{Case, Casing};
use serde_json::{json, Value};

/// HTTP method of a generated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Lowercase method name, as used for path item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }

    fn verb(&self, by_id: bool) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post if by_id => "update",
            Method::Post => "create",
            Method::Put => "replace",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }
}

/// Build the camel-cased `operationId` of a route.
///
/// `GET` by id gets a `byId` suffix; `subcommand` (`count`, `shallow`) is appended last.
pub fn operation_id(method: Method, model: &str, by_id: bool, subcommand: Option<&str>) -> String {
    let suffix = (method == Method::Get && by_id).then_some("by id");
    let parts: Vec<&str> = [Some(method.verb(by_id)), Some(model), suffix, subcommand]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

    parts.join(" ").to_case(Case::Camel)
}

/// Query parameters accepted by list and count routes.
pub fn query_parameters() -> Vec<Value> {
    QUERY_PARAMETERS
        .iter()
        .map(|(name, ty)| json!({ "name": name, "in": "query", "schema": { "type": ty } }))
        .collect()
}

const QUERY_PARAMETERS: &[(&str, &str)] = &[
    ("sort", "string"),
    ("skip", "number"),
    ("limit", "number"),
    ("query", "string"),
    ("populate", "string"),
    ("select", "string"),
    ("distinct", "string"),
];

/// The `{id}` path parameter of single-document routes.
pub fn path_parameters() -> Vec<Value> {
    vec![json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })]
}
