//! Entity assembly - the entry point that turns a model's schema tree into
//! its interchange schema.

use tracing::{debug, trace};

use crate::builder::Expansion;
use crate::error::TranslateError;
use crate::fragment::{EntitySchema, ObjectShape};
use crate::types::{SchemaRegistry, SchemaTree, TranslateOptions};
use crate::walker::walk;

/// Assemble the schema of one entity.
///
/// Fields that resolve to no type (virtuals) and fields listed in
/// `options.omit_fields` are dropped. Top-level required flags are collected
/// into `required`, which is left out of the rendered schema when empty.
///
/// # Errors
///
/// Returns `TranslateError::CyclicSchema` if an embedded sub-schema embeds itself.
pub fn assemble(
    name: &str,
    tree: &SchemaTree,
    options: &TranslateOptions,
    registry: &SchemaRegistry,
) -> Result<EntitySchema, TranslateError> {
    let mut cx = Expansion::new(&options.props, registry);
    let fields = walk(tree, &mut cx)?;

    let mut object = ObjectShape::default();
    for field in fields {
        if options.is_omitted(&field.name) {
            trace!(entity = name, field = %field.name, "omitting field");
            continue;
        }
        let Some(fragment) = field.fragment else {
            trace!(entity = name, field = %field.name, "field has no type, skipping");
            continue;
        };
        if field.required {
            object.required.push(field.name.clone());
        }
        object.properties.push((field.name, fragment));
    }

    debug!(
        entity = name,
        properties = object.properties.len(),
        required = object.required.len(),
        "assembled entity schema"
    );

    Ok(EntitySchema {
        name: name.to_string(),
        object,
    })
}
