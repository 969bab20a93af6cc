#![forbid(unsafe_code)]
//! Metrica semantic core
//!
//! Metrica is a schema-transformation language: programs declare record schemas, physical dimensions and units, lookup
//! tables, and transforms that map one schema onto another field by field. This crate is the part of the compiler that
//! decides whether such a program is sound: name resolution, unit evaluation, and type checking with dimensional
//! analysis.
//!
//! Parsing happens upstream (the AST lives in `metrica_syntax`); IR lowering and code generation happen downstream and
//! consume the [`Analysis`](frontend::typechecker::Analysis) produced here.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. Checking never panics on bad input;
//!   every problem becomes a [`CompileError`](diagnostics::CompileError).
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod config;
pub mod frontend;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::resolver;
pub use frontend::symbols;
pub use frontend::typechecker;
pub use frontend::types;

pub use config::CheckerConfig;
pub use frontend::typechecker::{Analysis, TypeCheckInfo, TypeChecker, analyze, analyze_with_config, check};
