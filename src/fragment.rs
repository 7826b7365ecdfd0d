//! Interchange schema fragments produced by translation.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::types::schema_ref;

/// Keys owned by a fragment's shape; metadata never overrides them.
const STRUCTURAL_KEYS: &[&str] = &[
    "type",
    "oneOf",
    "items",
    "properties",
    "additionalProperties",
    "required",
];

/// Primitive interchange type of a scalar fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Number,
    Boolean,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
        }
    }
}

/// Object fragment body: ordered properties plus bubbled required names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    pub properties: Vec<(String, Fragment)>,
    pub required: Vec<String>,
}

impl ObjectShape {
    pub fn property(&self, name: &str) -> Option<&Fragment> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }
}

/// The one populated variant of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(ScalarType),
    /// Bare identifier string or the referenced entity.
    Reference(String),
    Array(Box<Fragment>),
    /// Rendered as `object` with `additionalProperties`.
    Map(Box<Fragment>),
    Object(ObjectShape),
}

/// One node of the interchange schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub shape: Shape,
    pub format: Option<String>,
    /// Metadata copied from the declaration.
    pub meta: Map<String, Value>,
}

impl Fragment {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            format: None,
            meta: Map::new(),
        }
    }

    pub fn scalar(ty: ScalarType) -> Self {
        Self::new(Shape::Scalar(ty))
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self::new(Shape::Reference(target.into()))
    }

    pub fn array(items: Fragment) -> Self {
        Self::new(Shape::Array(Box::new(items)))
    }

    pub fn map(values: Fragment) -> Self {
        Self::new(Shape::Map(Box::new(values)))
    }

    pub fn object(object: ObjectShape) -> Self {
        Self::new(Shape::Object(object))
    }

    /// Object with no properties, the fallback for untyped values.
    pub fn empty_object() -> Self {
        Self::object(ObjectShape::default())
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    pub fn as_object(&self) -> Option<&ObjectShape> {
        match &self.shape {
            Shape::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Render as a JSON value.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();

        match &self.shape {
            Shape::Reference(target) => {
                out.insert(
                    "oneOf".into(),
                    json!([{ "type": "string" }, { "$ref": schema_ref(target) }]),
                );
            }
            Shape::Scalar(ty) => {
                out.insert("type".into(), Value::String(ty.as_str().into()));
            }
            Shape::Array(_) => {
                out.insert("type".into(), Value::String("array".into()));
            }
            Shape::Map(_) | Shape::Object(_) => {
                out.insert("type".into(), Value::String("object".into()));
            }
        }

        for (key, value) in &self.meta {
            if !STRUCTURAL_KEYS.contains(&key.as_str()) {
                out.insert(key.clone(), value.clone());
            }
        }

        // Shape-derived format (date-time) replaces a copied `format`.
        if let Some(format) = &self.format {
            out.insert("format".into(), Value::String(format.clone()));
        }

        match &self.shape {
            Shape::Array(items) => {
                out.insert("items".into(), items.to_value());
            }
            Shape::Map(values) => {
                out.insert("additionalProperties".into(), values.to_value());
            }
            Shape::Object(object) => {
                let properties = object
                    .properties
                    .iter()
                    .map(|(name, fragment)| (name.clone(), fragment.to_value()))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                if !object.required.is_empty() {
                    out.insert("required".into(), json!(object.required));
                }
            }
            Shape::Scalar(_) | Shape::Reference(_) => {}
        }

        Value::Object(out)
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Translated schema of one modeled entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub name: String,
    pub object: ObjectShape,
}

impl EntitySchema {
    pub fn to_value(&self) -> Value {
        Fragment::object(self.object.clone()).to_value()
    }

    pub fn property(&self, name: &str) -> Option<&Fragment> {
        self.object.property(name)
    }

    pub fn required(&self) -> &[String] {
        &self.object.required
    }
}

impl Serialize for EntitySchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
