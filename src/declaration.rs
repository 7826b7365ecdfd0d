//! Declaration parsing - classifies raw JSON field declarations.
//!
//! Declarations follow the document mapper's definition syntax:
//!
//! ```json
//! {
//!   "title": { "type": "String", "required": true },
//!   "author": { "type": "ObjectId", "ref": "person" },
//!   "fans": [{ "type": "ObjectId", "ref": "person" }],
//!   "meta": { "votes": "Number", "favs": "Number" },
//!   "labels": { "type": "Map", "of": "String" },
//!   "home": { "$embed": "address" },
//!   "fullName": { "virtual": true }
//! }
//! ```

use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::types::{json_type_name, DeclaredType, FieldDescriptor, SchemaTree, ID_KEY};

const TYPE_KEY: &str = "type";
const REF_KEY: &str = "ref";
const OF_KEY: &str = "of";
const EMBED_KEY: &str = "$embed";

/// Classify a type name. Matching is case-insensitive.
pub fn type_from_name(name: &str) -> DeclaredType {
    match name.to_ascii_lowercase().as_str() {
        "string" | "buffer" | "uuid" => DeclaredType::String,
        "number" | "int32" | "double" | "bigint" => DeclaredType::Number,
        "boolean" | "bool" => DeclaredType::Boolean,
        "objectid" => DeclaredType::Identifier,
        "mixed" | "object" => DeclaredType::Mixed,
        "date" => DeclaredType::Date,
        "decimal128" | "decimal" => DeclaredType::Decimal,
        "map" => DeclaredType::Map(None),
        "array" => DeclaredType::Array(None),
        _ => DeclaredType::Unknown(name.to_string()),
    }
}

/// Parse a field tree (an object of field name to declaration).
///
/// `_id: false` suppresses the identifier and is not kept as a field.
///
/// # Errors
///
/// Returns `LoadError::InvalidDeclaration` for malformed declarations.
pub fn parse_tree(value: &Value, path: &str) -> Result<SchemaTree, LoadError> {
    let Some(map) = value.as_object() else {
        return Err(LoadError::declaration(
            path,
            format!("expected object, got {}", json_type_name(value)),
        ));
    };

    parse_fields(map, path)
}

fn parse_fields(map: &Map<String, Value>, path: &str) -> Result<SchemaTree, LoadError> {
    let mut tree = SchemaTree::new();
    for (name, declaration) in map {
        if name == ID_KEY && declaration == &Value::Bool(false) {
            continue;
        }
        let field_path = format!("{}/{}", path, name);
        tree.insert(name.clone(), parse_field(declaration, &field_path)?);
    }
    Ok(tree)
}

/// Whether a raw tree disables the automatic identifier with `_id: false`.
pub fn disables_id(value: &Value) -> bool {
    value.get(ID_KEY) == Some(&Value::Bool(false))
}

/// Parse a single field declaration.
///
/// # Errors
///
/// Returns `LoadError::InvalidDeclaration` for malformed declarations.
pub fn parse_field(value: &Value, path: &str) -> Result<FieldDescriptor, LoadError> {
    match value {
        Value::String(name) => Ok(FieldDescriptor::new(type_from_name(name))),
        Value::Array(items) => Ok(FieldDescriptor::new(parse_array(items, path)?)),
        Value::Object(map) => parse_object(map, path),
        other => Err(LoadError::declaration(
            path,
            format!(
                "expected type name, array or object, got {}",
                json_type_name(other)
            ),
        )),
    }
}

fn parse_array(items: &[Value], path: &str) -> Result<DeclaredType, LoadError> {
    match items {
        [] => Ok(DeclaredType::Array(None)),
        [element] => {
            let element = parse_field(element, &format!("{}/0", path))?;
            Ok(DeclaredType::Array(Some(Box::new(element))))
        }
        _ => Err(LoadError::declaration(
            path,
            format!("array declaration takes one element type, got {}", items.len()),
        )),
    }
}

fn parse_object(map: &Map<String, Value>, path: &str) -> Result<FieldDescriptor, LoadError> {
    if let Some(embed) = map.get(EMBED_KEY) {
        let Some(name) = embed.as_str() else {
            return Err(LoadError::declaration(
                &format!("{}/{}", path, EMBED_KEY),
                format!("expected schema name, got {}", json_type_name(embed)),
            ));
        };
        let mut field = FieldDescriptor::new(DeclaredType::Embedded(name.to_string()));
        field.meta = metadata(map, &[EMBED_KEY]);
        return Ok(field);
    }

    // `type: null` counts as untyped.
    match map.get(TYPE_KEY) {
        Some(ty) if !ty.is_null() => parse_typed(map, ty, path),
        _ if is_virtual(map) => Ok(FieldDescriptor::new(DeclaredType::Virtual)),
        // `{}` is Mixed; any other untyped map is a nested tree.
        _ if map.is_empty() => Ok(FieldDescriptor::new(DeclaredType::Mixed)),
        _ => Ok(FieldDescriptor::new(DeclaredType::Nested(parse_fields(map, path)?))),
    }
}

/// `{ "type": ..., "ref"?: ..., "of"?: ..., ...metadata }`
fn parse_typed(
    map: &Map<String, Value>,
    ty: &Value,
    path: &str,
) -> Result<FieldDescriptor, LoadError> {
    let type_path = format!("{}/{}", path, TYPE_KEY);

    // `{ "type": { "type": "ObjectId", "ref": "person" } }`: the inner
    // descriptor's type and ref win over the outer ones. A plain object
    // without `type` or `$embed` is a nested tree used as the type.
    let (mut declared, inner_ref) = match ty {
        Value::Object(inner) if inner.contains_key(TYPE_KEY) || inner.contains_key(EMBED_KEY) => {
            let inner = parse_object(inner, &type_path)?;
            (inner.declared, inner.reference)
        }
        other => (parse_field(other, &type_path)?.declared, None),
    };

    let reference = match (inner_ref, map.get(REF_KEY)) {
        (Some(inner), _) => Some(inner),
        (None, None) | (None, Some(Value::Null)) => None,
        (None, Some(Value::String(target))) => Some(target.clone()),
        (None, Some(other)) => {
            return Err(LoadError::declaration(
                &format!("{}/{}", path, REF_KEY),
                format!("expected entity name, got {}", json_type_name(other)),
            ))
        }
    };

    if let DeclaredType::Map(values) = &mut declared {
        if let Some(of) = map.get(OF_KEY) {
            *values = Some(Box::new(parse_field(of, &format!("{}/{}", path, OF_KEY))?));
        }
    }

    Ok(FieldDescriptor {
        declared,
        reference,
        meta: metadata(map, &[TYPE_KEY, REF_KEY, OF_KEY]),
    })
}

/// Getter-only accessors: `{ "virtual": true }` or `{ "getters": [...], "path": ... }`.
fn is_virtual(map: &Map<String, Value>) -> bool {
    map.get("virtual") == Some(&Value::Bool(true))
        || (map.get("getters").is_some_and(Value::is_array)
            && map.get("path").is_some_and(|p| !p.is_null()))
}

fn metadata(map: &Map<String, Value>, structural: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !structural.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Collect `(path, name)` for every embedded sub-schema a tree uses.
pub fn embedded_names(tree: &SchemaTree, path: &str) -> Vec<(String, String)> {
    let mut found = Vec::new();
    for (name, field) in tree.iter() {
        collect_embedded(field, &format!("{}/{}", path, name), &mut found);
    }
    found
}

fn collect_embedded(field: &FieldDescriptor, path: &str, found: &mut Vec<(String, String)>) {
    match &field.declared {
        DeclaredType::Embedded(name) => found.push((path.to_string(), name.clone())),
        DeclaredType::Nested(tree) => found.extend(embedded_names(tree, path)),
        DeclaredType::Array(Some(inner)) => collect_embedded(inner, &format!("{}/0", path), found),
        DeclaredType::Map(Some(inner)) => {
            collect_embedded(inner, &format!("{}/{}", path, OF_KEY), found)
        }
        _ => {}
    }
}
