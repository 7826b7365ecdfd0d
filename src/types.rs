//! Core types for document-schema translation.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

/// Internal version-counter field added by the document mapper.
pub const VERSION_KEY: &str = "__v";

/// Identifier field added to every document.
pub const ID_KEY: &str = "_id";

/// Synthetic alias of `_id`; never rendered.
pub const ID_ALIAS: &str = "id";

/// Metadata keys always copied from a declaration into its schema.
pub const DEFAULT_META_PROPS: &[&str] = &["enum", "required", "description"];

/// Metadata key that marks a field as required.
pub const REQUIRED_PROP: &str = "required";

/// Prefix of component schema references.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Build a component reference for an entity name.
pub fn schema_ref(name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, name)
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared type of a field, classified before translation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    Number,
    String,
    Boolean,
    /// Document identifier; may point at another entity via `ref`.
    Identifier,
    /// Untyped value.
    Mixed,
    Date,
    /// High-precision decimal.
    Decimal,
    /// String-keyed map with an optional value declaration.
    Map(Option<Box<FieldDescriptor>>),
    /// Repeated field with an optional element declaration.
    Array(Option<Box<FieldDescriptor>>),
    /// Inline sub-document.
    Nested(SchemaTree),
    /// Named sub-schema looked up in a [`SchemaRegistry`].
    Embedded(String),
    /// Getter-only computed field.
    Virtual,
    /// Type name the adapter did not recognise.
    Unknown(String),
}

/// One field declaration: its type, reference target and inline metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub declared: DeclaredType,
    /// Name of the referenced entity for identifier fields.
    pub reference: Option<String>,
    /// Inline metadata (`enum`, `required`, `description`, extras).
    pub meta: Map<String, Value>,
}

impl FieldDescriptor {
    pub fn new(declared: DeclaredType) -> Self {
        Self {
            declared,
            reference: None,
            meta: Map::new(),
        }
    }

    /// Set the referenced entity.
    pub fn reference(mut self, target: impl Into<String>) -> Self {
        self.reference = Some(target.into());
        self
    }

    /// Attach a metadata value.
    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Mark the field as required.
    pub fn required(self) -> Self {
        self.meta(REQUIRED_PROP, Value::Bool(true))
    }

    /// Whether the declaration carries a truthy `required` flag.
    ///
    /// Accepts `true`, `[true, "message"]`, a non-empty message string, a
    /// non-zero number and any object (a validator descriptor).
    pub fn is_required(&self) -> bool {
        match self.meta.get(REQUIRED_PROP) {
            // `[flag, message]`
            Some(Value::Array(arr)) => arr.first().is_some_and(is_truthy),
            Some(value) => is_truthy(value),
            None => false,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Ordered field tree of one document schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaTree {
    fields: Vec<(String, FieldDescriptor)>,
}

impl SchemaTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing an existing declaration with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, field: FieldDescriptor) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = field,
            None => self.fields.push((name, field)),
        }
    }

    /// Builder form of [`SchemaTree::insert`].
    pub fn with(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.insert(name, field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Named sub-schemas that fields can embed.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaTree>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, tree: SchemaTree) {
        self.schemas.insert(name.into(), tree);
    }

    pub fn get(&self, name: &str) -> Option<&SchemaTree> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Sub-schema names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

/// Options for translating one entity.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Metadata keys copied verbatim, defaults first.
    pub props: Vec<String>,
    /// Field names excluded from the entity schema.
    pub omit_fields: BTreeSet<String>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslateOptions {
    /// Create options seeded with the default metadata keys and the version key omitted.
    pub fn new() -> Self {
        Self {
            props: DEFAULT_META_PROPS.iter().map(|p| p.to_string()).collect(),
            omit_fields: BTreeSet::from([VERSION_KEY.to_string()]),
        }
    }

    /// Add extra metadata keys to copy through.
    pub fn props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for prop in props {
            let prop = prop.into();
            if !self.props.contains(&prop) {
                self.props.push(prop);
            }
        }
        self
    }

    /// Add field names to leave out of the entity schema.
    pub fn omit<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn is_omitted(&self, name: &str) -> bool {
        self.omit_fields.contains(name)
    }
}
