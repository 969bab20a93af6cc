//! Metrica Compiler Frontend
//!
//! This module contains the semantic frontend components:
//! - `ast`: abstract syntax tree definitions (from `metrica_syntax`)
//! - `diagnostics`: error values and rendering (from `metrica_syntax`)
//! - `types`: the semantic type model and subtype relation
//! - `symbols`: symbol table and scope management
//! - `resolver`: declaration registration and structural validation
//! - `typechecker`: unit evaluation, type checking and expression inference

// Syntax components are provided by the shared metrica_syntax crate.
pub use metrica_syntax::{ast, diagnostics};

// Compiler-specific pieces remain local.
pub mod resolver;
pub mod symbols;
pub mod typechecker;
pub mod types;
