//! Tree walking - builds every declared field of a schema tree in order.

use crate::builder::{build_field, Expansion};
use crate::error::TranslateError;
use crate::fragment::Fragment;
use crate::types::{SchemaRegistry, SchemaTree, ID_ALIAS};

/// One walked field.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkedField {
    pub name: String,
    /// `None` when the field resolved to no type.
    pub fragment: Option<Fragment>,
    pub required: bool,
}

/// Walk a schema tree, building a fragment per declared field.
///
/// Fields keep declaration order. The `id` alias is skipped; nothing else is
/// filtered.
///
/// # Errors
///
/// Returns `TranslateError::CyclicSchema` if an embedded sub-schema embeds itself.
pub fn walk_tree(
    tree: &SchemaTree,
    props: &[String],
    registry: &SchemaRegistry,
) -> Result<Vec<WalkedField>, TranslateError> {
    walk(tree, &mut Expansion::new(props, registry))
}

pub(crate) fn walk(
    tree: &SchemaTree,
    cx: &mut Expansion<'_>,
) -> Result<Vec<WalkedField>, TranslateError> {
    let mut fields = Vec::with_capacity(tree.len());

    for (name, field) in tree.iter().filter(|(name, _)| *name != ID_ALIAS) {
        let built = build_field(field, cx)?;
        fields.push(WalkedField {
            name: name.to_string(),
            fragment: built.fragment,
            required: built.required,
        });
    }

    Ok(fields)
}
