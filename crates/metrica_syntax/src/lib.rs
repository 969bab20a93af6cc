//! Shared syntax frontend for the Metrica language: AST and diagnostics.
//!
//! The tokenizer and recursive-descent parser live outside this workspace; they produce the [`ast::Program`] defined
//! here, and every later stage (resolver, type checker, IR lowering, diagnostics reporting) consumes it.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it does not do name resolution or type checking.
//! - Operator, primitive and aggregate identity comes from `metrica_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use metrica_syntax::ast::{Declaration, DimensionDecl, Program, Span, Spanned};
//!
//! let program = Program {
//!     declarations: vec![Spanned::new(
//!         Declaration::Dimension(DimensionDecl { name: "Energy".to_string() }),
//!         Span::new(0, 16),
//!     )],
//! };
//! assert_eq!(program.declarations[0].node.name(), "Energy");
//! ```

pub mod ast;
pub mod diagnostics;
