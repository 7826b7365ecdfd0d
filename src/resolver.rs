//! Type resolution - maps one declared field type to an interchange type token.

use crate::types::DeclaredType;

/// Interchange type a declaration resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeToken {
    Number,
    String,
    Boolean,
    Object,
    Array,
    /// Expanded by the caller into `object` + `additionalProperties`.
    Map,
}

/// Result of resolving a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Token(TypeToken),
    /// Identifier that may also be populated with the referenced entity.
    ReferenceUnion(String),
}

/// Resolve a declared type.
///
/// Returns `None` for fields that must not be rendered (virtuals).
/// Unrecognised declarations fall back to `object`; resolution never fails.
pub fn resolve_type(declared: &DeclaredType, reference: Option<&str>) -> Option<Resolved> {
    let token = match declared {
        DeclaredType::Number | DeclaredType::Decimal => TypeToken::Number,
        DeclaredType::String | DeclaredType::Date => TypeToken::String,
        DeclaredType::Boolean => TypeToken::Boolean,
        DeclaredType::Identifier => match reference {
            Some(target) => return Some(Resolved::ReferenceUnion(target.to_string())),
            None => TypeToken::String,
        },
        DeclaredType::Map(_) => TypeToken::Map,
        DeclaredType::Array(_) => TypeToken::Array,
        DeclaredType::Mixed
        | DeclaredType::Nested(_)
        | DeclaredType::Embedded(_)
        | DeclaredType::Unknown(_) => TypeToken::Object,
        DeclaredType::Virtual => return None,
    };

    Some(Resolved::Token(token))
}
