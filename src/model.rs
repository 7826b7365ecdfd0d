//! Model definitions - the document that declares entities and their options.
//!
//! ```json
//! {
//!   "options": { "openapi": { "paths": { "security": [] } } },
//!   "schemas": { "address": { "street": "String", "_id": false } },
//!   "models": {
//!     "person": {
//!       "schema": { "name": { "type": "String", "required": true }, "home": { "$embed": "address" } },
//!       "versionKey": "__v",
//!       "options": {
//!         "model": { "props": ["example"], "omitFields": ["internalFlag"] },
//!         "erm": { "prefix": "/api", "version": "/v1" },
//!         "openapi": { "paths": {} }
//!       }
//!     }
//!   }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::assembler::assemble;
use crate::declaration::{disables_id, embedded_names, parse_tree};
use crate::error::{LoadError, TranslateError};
use crate::fragment::EntitySchema;
use crate::types::{
    json_type_name, DeclaredType, FieldDescriptor, SchemaRegistry, SchemaTree, TranslateOptions,
    ID_ALIAS, ID_KEY, VERSION_KEY,
};

/// Schema translation options of one model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaOptions {
    /// Extra metadata keys to copy into field schemas.
    pub props: Vec<String>,
    /// Fields to leave out of the entity schema.
    pub omit_fields: Vec<String>,
}

/// Where a model's REST routes are mounted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    pub prefix: String,
    pub version: String,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            version: "/v1".to_string(),
        }
    }
}

/// OpenAPI-specific overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpenApiOptions {
    /// Keys merged into every generated operation.
    pub paths: Map<String, Value>,
}

/// All options of one model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    pub model: SchemaOptions,
    pub erm: RouteOptions,
    pub openapi: OpenApiOptions,
}

/// Options applying to every model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalOptions {
    pub openapi: OpenApiOptions,
}

/// One modeled entity.
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    pub name: String,
    /// Field tree including the automatic document fields.
    pub tree: SchemaTree,
    pub options: ModelOptions,
    /// Version counter field, `None` when disabled.
    pub version_key: Option<String>,
}

impl ModelDefinition {
    /// Define a model from a declared tree, adding `_id`, `__v` and the `id` alias.
    pub fn new(name: impl Into<String>, tree: SchemaTree) -> Self {
        Self {
            name: name.into(),
            tree: with_document_fields(tree, true, Some(VERSION_KEY)),
            options: ModelOptions::default(),
            version_key: Some(VERSION_KEY.to_string()),
        }
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Translation options: defaults, the model's props and omissions, and its version key.
    pub fn translate_options(&self) -> TranslateOptions {
        let schema = &self.options.model;
        TranslateOptions::new()
            .props(schema.props.iter().cloned())
            .omit(schema.omit_fields.iter().cloned())
            .omit(self.version_key.iter().cloned())
    }

    /// Translate this model into its entity schema.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::CyclicSchema` if an embedded sub-schema embeds itself.
    pub fn translate(&self, registry: &SchemaRegistry) -> Result<EntitySchema, TranslateError> {
        assemble(&self.name, &self.tree, &self.translate_options(), registry)
    }
}

/// A parsed model-definition document.
#[derive(Debug, Clone, Default)]
pub struct ModelDocument {
    pub schemas: SchemaRegistry,
    /// Models in declaration order.
    pub models: Vec<ModelDefinition>,
    pub options: GlobalOptions,
}

impl ModelDocument {
    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Translate the named model.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::UnknownModel` if no such model is defined.
    pub fn translate(&self, name: &str) -> Result<EntitySchema, TranslateError> {
        let model = self
            .model(name)
            .ok_or_else(|| TranslateError::UnknownModel {
                name: name.to_string(),
            })?;
        model.translate(&self.schemas)
    }
}

/// Parse a model-definition document.
///
/// # Errors
///
/// Returns `LoadError::InvalidDeclaration` for malformed declarations or options,
/// and `LoadError::UnknownSubschema` when a field embeds an undefined sub-schema.
pub fn parse_models(value: &Value) -> Result<ModelDocument, LoadError> {
    let Some(root) = value.as_object() else {
        return Err(LoadError::declaration(
            "",
            format!("expected object, got {}", json_type_name(value)),
        ));
    };

    let options: GlobalOptions = parse_options(root.get("options"), "/options")?;

    let mut schemas = SchemaRegistry::new();
    if let Some(raw) = root.get("schemas") {
        let Some(raw) = raw.as_object() else {
            return Err(LoadError::declaration(
                "/schemas",
                format!("expected object, got {}", json_type_name(raw)),
            ));
        };
        for (name, tree) in raw {
            let path = format!("/schemas/{}", name);
            let parsed = parse_tree(tree, &path)?;
            schemas.insert(
                name.clone(),
                with_document_fields(parsed, !disables_id(tree), None),
            );
        }
    }

    let models = match root.get("models") {
        Some(Value::Object(raw)) => raw
            .iter()
            .map(|(name, model)| parse_model(name, model))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(LoadError::declaration(
                "/models",
                format!("expected object, got {}", json_type_name(other)),
            ))
        }
        None => return Err(LoadError::declaration("/models", "missing models")),
    };

    for name in schemas.names() {
        if let Some(tree) = schemas.get(name) {
            check_embeds(tree, &format!("/schemas/{}", name), &schemas)?;
        }
    }
    for model in &models {
        check_embeds(&model.tree, &format!("/models/{}/schema", model.name), &schemas)?;
    }

    Ok(ModelDocument {
        schemas,
        models,
        options,
    })
}

fn parse_model(name: &str, value: &Value) -> Result<ModelDefinition, LoadError> {
    let path = format!("/models/{}", name);
    let Some(raw_tree) = value.get("schema") else {
        return Err(LoadError::declaration(&path, "missing schema"));
    };

    let version_key = match value.get("versionKey") {
        None | Some(Value::Bool(true)) => Some(VERSION_KEY.to_string()),
        Some(Value::Bool(false)) => None,
        Some(Value::String(key)) => Some(key.clone()),
        Some(other) => {
            return Err(LoadError::declaration(
                &format!("{}/versionKey", path),
                format!("expected string or false, got {}", json_type_name(other)),
            ))
        }
    };

    let tree = parse_tree(raw_tree, &format!("{}/schema", path))?;
    let options = parse_options(value.get("options"), &format!("{}/options", path))?;

    Ok(ModelDefinition {
        name: name.to_string(),
        tree: with_document_fields(tree, !disables_id(raw_tree), version_key.as_deref()),
        options,
        version_key,
    })
}

fn parse_options<T: DeserializeOwned + Default>(
    value: Option<&Value>,
    path: &str,
) -> Result<T, LoadError> {
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(raw) => serde_json::from_value(raw.clone())
            .map_err(|e| LoadError::declaration(path, e.to_string())),
    }
}

/// Add the fields the document mapper maintains itself, after the declared ones.
fn with_document_fields(
    mut tree: SchemaTree,
    with_id: bool,
    version_key: Option<&str>,
) -> SchemaTree {
    if with_id && !tree.contains(ID_KEY) {
        tree.insert(ID_KEY, FieldDescriptor::new(DeclaredType::Identifier));
    }
    if let Some(key) = version_key {
        if !tree.contains(key) {
            tree.insert(key, FieldDescriptor::new(DeclaredType::Number));
        }
    }
    if !tree.contains(ID_ALIAS) {
        tree.insert(ID_ALIAS, FieldDescriptor::new(DeclaredType::Virtual));
    }
    tree
}

fn check_embeds(tree: &SchemaTree, path: &str, schemas: &SchemaRegistry) -> Result<(), LoadError> {
    match embedded_names(tree, path)
        .into_iter()
        .find(|(_, name)| !schemas.contains(name))
    {
        Some((path, name)) => Err(LoadError::UnknownSubschema { path, name }),
        None => Ok(()),
    }
}
