//! Metrica language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: primitive type names, operators and aggregate
//! functions.
//!
//! The design goal is to avoid stringly-typed checks scattered across the compiler/tooling.
//! Instead, callers work with **stable IDs** (e.g. `PrimitiveId`, `OperatorId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use metrica_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("??"), Some(OperatorId::Coalesce));
//! assert_eq!(operators::as_str(OperatorId::Coalesce), "??");
//! ```

pub mod aggregates;
pub mod operators;
pub mod primitives;
pub mod registry;
