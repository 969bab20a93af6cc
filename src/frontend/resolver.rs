//! Name resolution for Metrica programs
//!
//! Runs before type checking, in two passes over the top-level declarations:
//!
//! 1. **Register**: every declaration becomes a global symbol with placeholder types, in declaration order. A name that
//!    is already taken is reported and the first definition wins.
//! 2. **Validate**: structural checks that need every name but no types: `extends` targets must be schemas, inheritance
//!    chains must be acyclic, and field/variant names must be unique within their declaration.
//!
//! Errors accumulate; resolution never stops at the first problem.
//!
//! ## Examples
//!
//! ```rust
//! use metrica::frontend::resolver::Resolver;
//! use metrica::frontend::symbols::SymbolTable;
//! use metrica_syntax::ast::build::*;
//!
//! let program = program(vec![
//!     schema("Person", vec![("name", string_ty())]),
//!     schema_extends("Employee", "Person", vec![("salary", int_ty())]),
//! ]);
//! let mut symbols = SymbolTable::new();
//! let errors = Resolver::new(&mut symbols).resolve(&program);
//! assert!(errors.is_empty());
//! assert!(symbols.schema("Employee").is_some());
//! ```

use std::collections::HashSet;

use metrica_syntax::ast::{Declaration, EnumDecl, Program, SchemaDecl, Span, Spanned};
use metrica_syntax::diagnostics::{CompileError, errors};

use super::symbols::*;
use super::types::{SchemaType, Type};

/// Registers declarations into a [`SymbolTable`] and validates their structure.
pub struct Resolver<'a> {
    symbols: &'a mut SymbolTable,
    errors: Vec<CompileError>,
}

impl<'a> Resolver<'a> {
    pub fn new(symbols: &'a mut SymbolTable) -> Self {
        Self {
            symbols,
            errors: Vec::new(),
        }
    }

    /// Run both passes and return every error found.
    #[tracing::instrument(skip_all, fields(decl_count = program.declarations.len()))]
    pub fn resolve(mut self, program: &Program) -> Vec<CompileError> {
        for (index, decl) in program.declarations.iter().enumerate() {
            self.register(index, decl);
        }
        for (index, decl) in program.declarations.iter().enumerate() {
            match &decl.node {
                Declaration::Schema(schema) => self.validate_schema(index, schema, decl.span),
                Declaration::Enum(en) => self.validate_enum(en),
                _ => {}
            }
        }
        tracing::debug!(error_count = self.errors.len(), "resolution finished");
        self.errors
    }

    // ========================================================================
    // Pass 1: registration
    // ========================================================================

    fn register(&mut self, index: usize, decl: &Spanned<Declaration>) {
        let kind = placeholder_kind(&decl.node);
        let symbol = Symbol::new(decl.node.name(), kind, decl.span).with_decl(index);
        if let Err(err) = self.symbols.define(symbol) {
            let previous = self
                .symbols
                .lookup_global(decl.node.name())
                .and_then(|id| self.symbols.get(id))
                .map(|s| s.kind.describe());
            let err = match previous {
                Some(kind) => err.with_note(format!("'{}' is already declared as a {}", decl.node.name(), kind)),
                None => err,
            };
            self.errors.push(err);
        }
    }

    // ========================================================================
    // Pass 2: structural validation
    // ========================================================================

    fn validate_schema(&mut self, index: usize, schema: &SchemaDecl, span: Span) {
        let mut seen = HashSet::new();
        for field in &schema.fields {
            if !seen.insert(field.node.name.as_str()) {
                self.errors
                    .push(errors::duplicate_field(&schema.name, &field.node.name, field.span));
            }
        }

        let Some(parent) = &schema.extends else {
            return;
        };
        if self.symbols.schema(&parent.node).is_none() {
            self.errors
                .push(errors::unknown_extends_target(&schema.name, &parent.node, parent.span));
            return;
        }
        // Duplicate declarations were not registered; only the owner walks its chain.
        if self.owner_decl(&schema.name) != Some(index) {
            return;
        }
        if let Some(chain) = self.inheritance_cycle(&schema.name) {
            self.errors.push(errors::cyclic_inheritance(&chain, span));
        }
    }

    fn validate_enum(&mut self, en: &EnumDecl) {
        let mut seen = HashSet::new();
        for variant in &en.variants {
            if !seen.insert(variant.node.as_str()) {
                self.errors
                    .push(errors::duplicate_variant(&en.name, &variant.node, variant.span));
            }
        }
    }

    fn owner_decl(&self, name: &str) -> Option<usize> {
        let id = self.symbols.lookup_global(name)?;
        self.symbols.get(id)?.decl
    }

    /// Follow `extends` links from `start`. Returns the chain when it leads back to `start` and `start` is the
    /// earliest-declared member of the cycle, so each cycle is reported once.
    fn inheritance_cycle(&self, start: &str) -> Option<Vec<String>> {
        let mut chain = vec![start.to_string()];
        let mut current = self.symbols.schema(start)?.extends.clone();
        while let Some(name) = current {
            if name == start {
                chain.push(name);
                let start_decl = self.owner_decl(start)?;
                let earliest = chain.iter().filter_map(|n| self.owner_decl(n)).min()?;
                return (earliest == start_decl).then_some(chain);
            }
            if chain.contains(&name) {
                // A cycle that does not pass through `start`; its own members report it.
                return None;
            }
            current = self.symbols.schema(&name).and_then(|info| info.extends.clone());
            chain.push(name);
        }
        None
    }
}

/// Kind registered in pass 1. Types are `Unknown` until the checker fills them in.
fn placeholder_kind(decl: &Declaration) -> SymbolKind {
    match decl {
        Declaration::Schema(schema) => SymbolKind::Schema(SchemaInfo {
            schema: SchemaType::new(schema.name.clone()).with_type_params(schema.type_params.clone()),
            extends: schema.extends.as_ref().map(|e| e.node.clone()),
        }),
        Declaration::Enum(_) => SymbolKind::Enum(EnumInfo { variants: Vec::new() }),
        Declaration::Dimension(_) => SymbolKind::Dimension,
        Declaration::Unit(_) => SymbolKind::Unit(UnitInfo::default()),
        Declaration::Lookup(lookup) => SymbolKind::Lookup(LookupInfo {
            keys: vec![Type::Unknown; lookup.keys.len()],
            value: Type::Unknown,
        }),
        Declaration::Transform(transform) => SymbolKind::Transform(TransformInfo {
            sources: transform
                .sources
                .iter()
                .map(|s| (s.name.clone(), Type::Unknown))
                .collect(),
            target: Type::Unknown,
        }),
        Declaration::Pipeline(pipeline) => SymbolKind::Pipeline(PipelineInfo {
            steps: pipeline.steps.iter().map(|s| s.node.clone()).collect(),
        }),
    }
}
