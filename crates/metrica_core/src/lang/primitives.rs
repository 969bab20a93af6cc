//! Primitive type vocabulary.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**: `String` is a primitive, `string` is not.
//! - This module is vocabulary only (spellings + metadata), not type-system semantics.
//!
//! ## Examples
//! ```rust
//! use metrica_core::lang::primitives::{self, PrimitiveId};
//!
//! assert_eq!(primitives::from_str("Int"), Some(PrimitiveId::Int));
//! assert_eq!(primitives::from_str("Timestamp"), Some(PrimitiveId::DateTime));
//! assert_eq!(primitives::as_str(PrimitiveId::DateTime), "DateTime");
//! ```

use super::registry::{LangItemInfo, item};

/// Stable identifier for primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveId {
    String,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    Void,
}

pub type PrimitiveInfo = LangItemInfo<PrimitiveId>;

/// Registry of primitive types.
pub const PRIMITIVES: &[PrimitiveInfo] = &[
    item(PrimitiveId::String, "String", &[], "UTF-8 text."),
    item(PrimitiveId::Int, "Int", &[], "Signed 64-bit integer."),
    item(PrimitiveId::Float, "Float", &["Decimal"], "Double-precision floating point number."),
    item(PrimitiveId::Bool, "Bool", &["Boolean"], "Boolean truth value."),
    item(PrimitiveId::Date, "Date", &[], "Calendar date without a time component."),
    item(PrimitiveId::DateTime, "DateTime", &["Timestamp"], "Instant with date and time of day."),
    item(PrimitiveId::Void, "Void", &[], "The empty type of a value-less result."),
];

/// Resolve a type name to a [`PrimitiveId`] (canonical spelling or alias).
pub fn from_str(name: &str) -> Option<PrimitiveId> {
    PRIMITIVES.iter().find(|p| p.matches(name)).map(|p| p.id)
}

/// Return the canonical spelling for a primitive type.
pub fn as_str(id: PrimitiveId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a primitive type.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: PrimitiveId) -> &'static PrimitiveInfo {
    PRIMITIVES
        .iter()
        .find(|p| p.id == id)
        .expect("primitive type info missing")
}
