//! Symbol table and scope management for Metrica
//!
//! Tracks every named entity (schemas, enums, dimensions, units, lookups, transforms, pipelines, and the variables
//! bound inside transforms and lambdas) and the scopes they live in.
//!
//! ## Notes
//!
//! - Symbols and scopes live in arenas addressed by [`SymbolId`] / [`ScopeId`]; scope parents are plain indices.
//! - The resolver registers every declaration with placeholder types. The checker later swaps in the concrete
//!   [`SymbolKind`] through [`SymbolTable::replace_kind`] instead of mutating shared state.
//! - Each table is owned by one checking run, so independent programs can be checked side by side.

use std::collections::HashMap;

use metrica_core::units::Unit;
use metrica_syntax::ast::Span;
use metrica_syntax::diagnostics::{CompileError, errors};

use super::types::{SchemaType, Type};

/// Unique identifier for symbols
pub type SymbolId = usize;

/// Unique identifier for scopes. The global scope is always `0`.
pub type ScopeId = usize;

pub const GLOBAL_SCOPE: ScopeId = 0;

/// Symbol table managing all named entities
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    current_scope: ScopeId,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            scopes: vec![Scope::new(None, ScopeKind::Global)],
            current_scope: GLOBAL_SCOPE,
        }
    }

    /// Enter a new child scope of the current one
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let new_scope = Scope::new(Some(self.current_scope), kind);
        self.scopes.push(new_scope);
        self.current_scope = self.scopes.len() - 1;
        self.current_scope
    }

    /// Exit the current scope. Exiting the global scope is a no-op.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current_scope].parent {
            self.current_scope = parent;
        }
    }

    /// Define a new symbol in the current scope
    ///
    /// ## Errors
    /// A duplicate-definition error when the name is already defined in the *current* scope. Shadowing a name from an
    /// enclosing scope is allowed.
    pub fn define(&mut self, mut symbol: Symbol) -> Result<SymbolId, CompileError> {
        if self.lookup_local(&symbol.name).is_some() {
            return Err(errors::duplicate_definition(&symbol.name, symbol.span));
        }
        symbol.scope = self.current_scope;
        let id = self.symbols.len();
        self.scopes[self.current_scope].symbols.insert(symbol.name.clone(), id);
        self.symbols.push(symbol);
        Ok(id)
    }

    /// Look up a symbol by name in the current scope chain
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let mut scope_idx = self.current_scope;
        loop {
            if let Some(&id) = self.scopes[scope_idx].symbols.get(name) {
                return Some(id);
            }
            if let Some(parent) = self.scopes[scope_idx].parent {
                scope_idx = parent;
            } else {
                break;
            }
        }
        None
    }

    /// Look up a symbol only in the current scope (no parent lookup)
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.scopes[self.current_scope].symbols.get(name).copied()
    }

    /// Look up a top-level declaration, ignoring any shadowing variables
    pub fn lookup_global(&self, name: &str) -> Option<SymbolId> {
        self.scopes[GLOBAL_SCOPE].symbols.get(name).copied()
    }

    /// Get a symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Replace the stored kind of a symbol, returning the previous one.
    pub fn replace_kind(&mut self, id: SymbolId, kind: SymbolKind) -> Option<SymbolKind> {
        let symbol = self.symbols.get_mut(id)?;
        Some(std::mem::replace(&mut symbol.kind, kind))
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current_scope
    }

    /// Get the current scope kind
    pub fn current_scope_kind(&self) -> ScopeKind {
        self.scopes[self.current_scope].kind
    }

    /// All symbols in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate()
    }

    /// Top-level symbols in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.scope == GLOBAL_SCOPE)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Kind of the top-level symbol `name`.
    pub fn global_kind(&self, name: &str) -> Option<&SymbolKind> {
        let id = self.lookup_global(name)?;
        Some(&self.get(id)?.kind)
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaInfo> {
        match self.global_kind(name)? {
            SymbolKind::Schema(info) => Some(info),
            _ => None,
        }
    }

    pub fn enum_info(&self, name: &str) -> Option<&EnumInfo> {
        match self.global_kind(name)? {
            SymbolKind::Enum(info) => Some(info),
            _ => None,
        }
    }

    pub fn unit(&self, name: &str) -> Option<&UnitInfo> {
        match self.global_kind(name)? {
            SymbolKind::Unit(info) => Some(info),
            _ => None,
        }
    }

    pub fn lookup_table(&self, name: &str) -> Option<&LookupInfo> {
        match self.global_kind(name)? {
            SymbolKind::Lookup(info) => Some(info),
            _ => None,
        }
    }

    pub fn transform(&self, name: &str) -> Option<&TransformInfo> {
        match self.global_kind(name)? {
            SymbolKind::Transform(info) => Some(info),
            _ => None,
        }
    }

    pub fn pipeline(&self, name: &str) -> Option<&PipelineInfo> {
        match self.global_kind(name)? {
            SymbolKind::Pipeline(info) => Some(info),
            _ => None,
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A scope containing symbol definitions
#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub symbols: HashMap<String, SymbolId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            symbols: HashMap::new(),
        }
    }
}

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    /// Rule bodies of one transform; binds named sources.
    Transform,
    /// A lambda body; binds its parameters.
    Lambda,
}

/// A symbol in the symbol table
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub span: Span,
    /// Index into `Program::declarations` for top-level symbols.
    pub decl: Option<usize>,
    pub scope: ScopeId,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
            decl: None,
            scope: GLOBAL_SCOPE,
        }
    }

    pub fn with_decl(mut self, index: usize) -> Self {
        self.decl = Some(index);
        self
    }
}

/// Kind of symbol
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Schema(SchemaInfo),
    Enum(EnumInfo),
    Unit(UnitInfo),
    Dimension,
    Lookup(LookupInfo),
    Transform(TransformInfo),
    Pipeline(PipelineInfo),
    /// Named transform source or lambda parameter
    Variable(VariableInfo),
}

impl SymbolKind {
    /// Human-readable kind for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Schema(_) => "schema",
            SymbolKind::Enum(_) => "enum",
            SymbolKind::Unit(_) => "unit",
            SymbolKind::Dimension => "dimension",
            SymbolKind::Lookup(_) => "lookup",
            SymbolKind::Transform(_) => "transform",
            SymbolKind::Pipeline(_) => "pipeline",
            SymbolKind::Variable(_) => "variable",
        }
    }
}

/// Schema information
///
/// The field list is empty until the checker resolves the schema; after that it holds inherited fields first, then
/// the schema's own fields (an own field overrides an inherited one of the same name in place).
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    pub schema: SchemaType,
    pub extends: Option<String>,
}

impl SchemaInfo {
    /// Field type with the handle's type arguments substituted.
    pub fn field_type(&self, field: &str, type_args: &[Type]) -> Option<Type> {
        let ty = self.schema.field(field)?;
        Some(ty.substitute(&self.schema.bindings(type_args)))
    }
}

/// Enum information
#[derive(Debug, Clone)]
pub struct EnumInfo {
    pub variants: Vec<String>,
}

impl EnumInfo {
    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }
}

/// Unit information. `None` until the unit declaration has been evaluated.
#[derive(Debug, Clone, Default)]
pub struct UnitInfo {
    pub unit: Option<Unit>,
}

/// Lookup table information
#[derive(Debug, Clone)]
pub struct LookupInfo {
    pub keys: Vec<Type>,
    pub value: Type,
}

/// Transform information
#[derive(Debug, Clone)]
pub struct TransformInfo {
    /// `(name, type)` per declared source, in order.
    pub sources: Vec<(Option<String>, Type)>,
    pub target: Type,
}

impl TransformInfo {
    /// The type of `$`: the single source, or the tuple of all sources.
    pub fn source_type(&self) -> Type {
        match self.sources.as_slice() {
            [(_, ty)] => ty.clone(),
            sources => Type::Tuple(sources.iter().map(|(_, t)| t.clone()).collect()),
        }
    }
}

/// Pipeline information
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub steps: Vec<String>,
}

/// Variable information
#[derive(Debug, Clone)]
pub struct VariableInfo {
    pub ty: Type,
}
