//! ODM OpenAPI
//!
//! Translates document-mapper model definitions into OpenAPI 3 schemas and
//! REST path descriptors.
//!
//! Each model field declaration is classified into a [`DeclaredType`], resolved
//! to an interchange type, and built into a schema fragment. Nested trees and
//! embedded sub-schemas become inline objects; references to other entities
//! become a `oneOf` union of the raw identifier and a `$ref` to the entity.
//!
//! # Example
//!
//! ```
//! use odm_openapi::{parse_models, build_document};
//! use serde_json::json;
//!
//! let models = parse_models(&json!({
//!     "models": {
//!         "story": {
//!             "schema": {
//!                 "title": { "type": "String", "required": true },
//!                 "author": { "type": "ObjectId", "ref": "person" }
//!             }
//!         },
//!         "person": { "schema": { "name": "String" } }
//!     }
//! }))
//! .unwrap();
//!
//! let story = models.translate("story").unwrap().to_value();
//! assert_eq!(story["required"], json!(["title"]));
//! assert_eq!(
//!     story["properties"]["author"]["oneOf"][1],
//!     json!({ "$ref": "#/components/schemas/person" })
//! );
//!
//! let document = build_document(&json!({}), &models).unwrap();
//! assert!(document["paths"]["/api/v1/story/{id}"]["get"].is_object());
//! ```
//!
//! # Type Mapping
//!
//! | Declared type | Schema |
//! |---------------|--------|
//! | `String`, `ObjectId` | `{"type": "string"}` |
//! | `Date` | `{"type": "string", "format": "date-time"}` |
//! | `Number`, `Decimal128` | `{"type": "number"}` |
//! | `Boolean` | `{"type": "boolean"}` |
//! | `[T]` | `{"type": "array", "items": T}` |
//! | `Map` of `T` | `{"type": "object", "additionalProperties": T}` |
//! | nested tree, `$embed` | `{"type": "object", "properties": ...}` |
//! | `Mixed`, unknown | `{"type": "object", "properties": {}}` |
//! | `ObjectId` with `ref` | `{"oneOf": [{"type": "string"}, {"$ref": ...}]}` |
//! | virtual | omitted |

mod assembler;
mod builder;
mod declaration;
mod document;
mod error;
mod fragment;
mod linter;
mod loader;
mod model;
mod operations;
mod paths;
mod resolver;
mod responses;
mod types;
mod validator;
mod walker;

pub use assembler::assemble;
pub use builder::{build_field_schema, BuiltField, DATE_TIME_FORMAT};
pub use declaration::{parse_field, parse_tree, type_from_name};
pub use document::{build_document, OPENAPI_VERSION};
pub use error::{LoadError, SchemaError, TranslateError, ValidateError};
pub use fragment::{EntitySchema, Fragment, ObjectShape, ScalarType, Shape};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{is_url, load_json, load_json_auto, load_json_str, load_models};
pub use model::{
    parse_models, GlobalOptions, ModelDefinition, ModelDocument, ModelOptions, OpenApiOptions,
    RouteOptions, SchemaOptions,
};
pub use operations::{operation_id, path_parameters, query_parameters, Method};
pub use paths::{model_paths, route_paths};
pub use resolver::{resolve_type, Resolved, TypeToken};
pub use responses::{error_response, error_responses, error_schema, ErrorStatus, ERROR_SCHEMA};
pub use types::{
    DeclaredType, FieldDescriptor, SchemaRegistry, SchemaTree, TranslateOptions,
    DEFAULT_META_PROPS, ID_ALIAS, ID_KEY, VERSION_KEY,
};
pub use validator::{validate, validate_against_schema};
pub use walker::{walk_tree, WalkedField};

#[cfg(feature = "remote")]
pub use loader::load_json_url;
