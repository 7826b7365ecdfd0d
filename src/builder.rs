//! Field schema building - turns one field declaration into a schema fragment.
//!
//! Composite declarations recurse: arrays build their element, maps build
//! their value, and nested or embedded documents walk their sub-tree. A
//! field's `required` flag is never copied into its own fragment; it is
//! returned next to the fragment so the parent object can list it.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::TranslateError;
use crate::fragment::{Fragment, ObjectShape, ScalarType};
use crate::resolver::{resolve_type, Resolved, TypeToken};
use crate::types::{DeclaredType, FieldDescriptor, SchemaRegistry, REQUIRED_PROP};
use crate::walker::{walk, WalkedField};

/// Format attached to date fields.
pub const DATE_TIME_FORMAT: &str = "date-time";

/// A built field: its fragment (`None` when the field has no type) and required flag.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltField {
    pub fragment: Option<Fragment>,
    pub required: bool,
}

/// Per-translation state shared by the builder and the walker.
pub(crate) struct Expansion<'a> {
    props: &'a [String],
    registry: &'a SchemaRegistry,
    /// Embedded schema names currently being expanded, outermost first.
    active: Vec<String>,
}

impl<'a> Expansion<'a> {
    pub(crate) fn new(props: &'a [String], registry: &'a SchemaRegistry) -> Self {
        Self {
            props,
            registry,
            active: Vec::new(),
        }
    }

    fn enter(&mut self, name: &str) -> Result<(), TranslateError> {
        if self.active.iter().any(|n| n == name) {
            let mut chain = self.active.clone();
            chain.push(name.to_string());
            return Err(TranslateError::CyclicSchema { chain });
        }
        self.active.push(name.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        self.active.pop();
    }
}

/// Build the schema fragment of a single field.
///
/// `props` lists the metadata keys to copy; `registry` supplies embedded
/// sub-schemas.
///
/// # Errors
///
/// Returns `TranslateError::CyclicSchema` if an embedded sub-schema embeds itself.
pub fn build_field_schema(
    field: &FieldDescriptor,
    props: &[String],
    registry: &SchemaRegistry,
) -> Result<BuiltField, TranslateError> {
    build_field(field, &mut Expansion::new(props, registry))
}

pub(crate) fn build_field(
    field: &FieldDescriptor,
    cx: &mut Expansion<'_>,
) -> Result<BuiltField, TranslateError> {
    let Some(resolved) = resolve_type(&field.declared, field.reference.as_deref()) else {
        return Ok(BuiltField {
            fragment: None,
            required: false,
        });
    };

    let fragment = match resolved {
        Resolved::ReferenceUnion(target) => Fragment::reference(target),
        Resolved::Token(TypeToken::Number) => Fragment::scalar(ScalarType::Number),
        Resolved::Token(TypeToken::Boolean) => Fragment::scalar(ScalarType::Boolean),
        Resolved::Token(TypeToken::String) => {
            let fragment = Fragment::scalar(ScalarType::String);
            // Identifiers without a target also land here, formatless.
            if field.declared == DeclaredType::Date {
                fragment.with_format(DATE_TIME_FORMAT)
            } else {
                fragment
            }
        }
        // Missing element or value declarations default to an empty object.
        Resolved::Token(TypeToken::Array) => {
            let element = match &field.declared {
                DeclaredType::Array(element) => element.as_deref(),
                _ => None,
            };
            Fragment::array(build_inner(element, cx)?)
        }
        Resolved::Token(TypeToken::Map) => {
            let values = match &field.declared {
                DeclaredType::Map(values) => values.as_deref(),
                _ => None,
            };
            Fragment::map(build_inner(values, cx)?)
        }
        Resolved::Token(TypeToken::Object) => Fragment::object(build_object(&field.declared, cx)?),
    };

    Ok(BuiltField {
        fragment: Some(fragment.with_meta(copy_meta(field, cx.props))),
        required: field.is_required(),
    })
}

/// Array element or map value. Its own required flag has no parent to land in.
fn build_inner(
    declared: Option<&FieldDescriptor>,
    cx: &mut Expansion<'_>,
) -> Result<Fragment, TranslateError> {
    let Some(field) = declared else {
        return Ok(Fragment::empty_object());
    };
    let built = build_field(field, cx)?;
    Ok(built.fragment.unwrap_or_else(Fragment::empty_object))
}

fn build_object(
    declared: &DeclaredType,
    cx: &mut Expansion<'_>,
) -> Result<ObjectShape, TranslateError> {
    match declared {
        DeclaredType::Nested(tree) => Ok(object_from_fields(walk(tree, cx)?)),
        DeclaredType::Embedded(name) => {
            let registry = cx.registry;
            let Some(tree) = registry.get(name) else {
                trace!(schema = %name, "embedded schema not registered, rendering empty object");
                return Ok(ObjectShape::default());
            };
            // Fails if `name` is already being expanded further up.
            cx.enter(name)?;
            trace!(schema = %name, depth = cx.active.len(), "expanding embedded schema");
            let fields = walk(tree, cx);
            // Pop before `?` so siblings see the same stack.
            cx.leave();
            Ok(object_from_fields(fields?))
        }
        _ => Ok(ObjectShape::default()),
    }
}

/// Keep typed fields in walk order and list the required ones.
fn object_from_fields(fields: Vec<WalkedField>) -> ObjectShape {
    let mut object = ObjectShape::default();
    for field in fields {
        let Some(fragment) = field.fragment else {
            continue;
        };
        if field.required {
            object.required.push(field.name.clone());
        }
        object.properties.push((field.name, fragment));
    }
    object
}

fn copy_meta(field: &FieldDescriptor, props: &[String]) -> Map<String, Value> {
    props
        .iter()
        .filter(|prop| prop.as_str() != REQUIRED_PROP)
        .filter_map(|prop| match field.meta.get(prop) {
            Some(value) if !value.is_null() => Some((prop.clone(), value.clone())),
            _ => None,
        })
        .collect()
}
