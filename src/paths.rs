//! Route descriptors - the CRUD path items generated for each model.
//!
//! | Path | Methods |
//! |------|---------|
//! | `{prefix}{version}/{model}` | `get` (query), `post` (create) |
//! | `.../count` | `get` |
//! | `.../{id}` | `get`, `post`, `put`, `patch`, `delete` |
//! | `.../{id}/shallow` | `get` |

use serde_json::{json, Map, Value};

use crate::model::{GlobalOptions, ModelDefinition, RouteOptions};
use crate::operations::{operation_id, path_parameters, query_parameters, Method};
use crate::responses::{error_responses, ErrorStatus};
use crate::types::schema_ref;

use ErrorStatus::{BadRequest, NotFound};

/// One operation template.
struct Operation<'a> {
    method: Method,
    summary: String,
    by_id: bool,
    subcommand: Option<&'a str>,
    parameters: Vec<Value>,
    request_body: bool,
    success: (&'static str, Value),
    errors: &'a [ErrorStatus],
}

impl Operation<'_> {
    fn render(self, model: &str, overrides: &[&Map<String, Value>]) -> Value {
        let mut op = Map::new();
        op.insert("summary".into(), Value::String(self.summary));
        op.insert(
            "operationId".into(),
            Value::String(operation_id(self.method, model, self.by_id, self.subcommand)),
        );
        op.insert("tags".into(), json!([model]));
        if !self.parameters.is_empty() {
            op.insert("parameters".into(), Value::Array(self.parameters));
        }
        if self.request_body {
            let mut body = json_content(json!({ "$ref": schema_ref(model) }));
            body.insert("required".into(), Value::Bool(true));
            op.insert("requestBody".into(), Value::Object(body));
        }

        let (code, success) = self.success;
        let mut responses = Map::new();
        responses.insert(code.to_string(), success);
        responses.extend(error_responses(self.errors));
        op.insert("responses".into(), Value::Object(responses));

        for layer in overrides {
            for (key, value) in layer.iter() {
                op.insert(key.clone(), value.clone());
            }
        }

        Value::Object(op)
    }
}

fn json_content(schema: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(
        "content".into(),
        json!({ "application/json": { "schema": schema } }),
    );
    body
}

fn response(description: &str, schema: Option<Value>) -> Value {
    let mut response = schema.map(json_content).unwrap_or_default();
    response.insert("description".into(), Value::String(description.into()));
    Value::Object(response)
}

fn count_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "count": { "type": "number" } },
        "required": ["count"]
    })
}

/// Path items of one model, keyed by path.
pub fn model_paths(model: &ModelDefinition, global: &GlobalOptions) -> Map<String, Value> {
    route_paths(
        &model.name,
        &model.options.erm,
        &[&global.openapi.paths, &model.options.openapi.paths],
    )
}

/// Path items of a model mounted at `routes`.
///
/// Each map in `overrides` is merged into every operation, later maps winning.
pub fn route_paths(
    model: &str,
    routes: &RouteOptions,
    overrides: &[&Map<String, Value>],
) -> Map<String, Value> {
    let base = format!("{}{}/{}", routes.prefix, routes.version, model);
    let one = || Some(json!({ "$ref": schema_ref(model) }));

    let collection = [
        Operation {
            method: Method::Get,
            summary: format!("Query {}", model),
            by_id: false,
            subcommand: None,
            parameters: query_parameters(),
            request_body: false,
            success: (
                "200",
                response(
                    "OK",
                    Some(json!({ "type": "array", "items": { "$ref": schema_ref(model) } })),
                ),
            ),
            errors: &[BadRequest],
        },
        Operation {
            method: Method::Post,
            summary: format!("Create new {}", model),
            by_id: false,
            subcommand: None,
            parameters: Vec::new(),
            request_body: true,
            success: ("201", response("Created", one())),
            errors: &[BadRequest],
        },
    ];

    let count = [Operation {
        method: Method::Get,
        summary: format!("Get {} count", model),
        by_id: false,
        subcommand: Some("count"),
        parameters: query_parameters(),
        request_body: false,
        success: ("200", response("OK", Some(count_schema()))),
        errors: &[BadRequest],
    }];

    let update = |method| Operation {
        method,
        summary: format!("Update {} by id", model),
        by_id: true,
        subcommand: None,
        parameters: path_parameters(),
        request_body: true,
        success: ("200", response("Updated", one())),
        errors: &[BadRequest, NotFound],
    };
    let document = [
        Operation {
            method: Method::Get,
            summary: format!("Get {} by id", model),
            by_id: true,
            subcommand: None,
            parameters: path_parameters(),
            request_body: false,
            success: ("200", response("OK", one())),
            errors: &[NotFound],
        },
        update(Method::Post),
        update(Method::Put),
        update(Method::Patch),
        Operation {
            method: Method::Delete,
            summary: format!("Delete {} by id", model),
            by_id: true,
            subcommand: None,
            parameters: path_parameters(),
            request_body: false,
            success: ("204", response("Deleted", None)),
            errors: &[NotFound],
        },
    ];

    let shallow = [Operation {
        method: Method::Get,
        summary: format!("Get {} by id shallow", model),
        by_id: true,
        subcommand: Some("shallow"),
        parameters: path_parameters(),
        request_body: false,
        success: ("200", response("OK", one())),
        errors: &[NotFound],
    }];

    let mut paths = Map::new();
    paths.insert(base.clone(), path_item(model, overrides, collection));
    paths.insert(format!("{}/count", base), path_item(model, overrides, count));
    paths.insert(format!("{}/{{id}}", base), path_item(model, overrides, document));
    paths.insert(
        format!("{}/{{id}}/shallow", base),
        path_item(model, overrides, shallow),
    );
    paths
}

fn path_item<'a>(
    model: &str,
    overrides: &[&Map<String, Value>],
    operations: impl IntoIterator<Item = Operation<'a>>,
) -> Value {
    Value::Object(
        operations
            .into_iter()
            .map(|op| (op.method.as_str().to_string(), op.render(model, overrides)))
            .collect(),
    )
}
