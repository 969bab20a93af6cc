//! Type checker for the Metrica schema-transformation language.
//!
//! Verifies that every transform is type- and dimension-sound before any code is produced, and fills the
//! [`SymbolTable`] with the concrete types downstream stages consume.
//!
//! ## Notes
//!
//! - **Phases**: the [`Resolver`] registers and validates names; then every dimension and unit is evaluated
//!   (order-independent, with cycle detection); then declarations are checked: enums, schemas, lookups, transforms
//!   and finally pipelines.
//! - **Error accumulation**: each declaration, and each mapping rule inside a transform, is its own `Result` boundary.
//!   A failure is recorded and checking moves on, so one run reports as many problems as possible.
//! - **Schemas are nominal**: type positions hold [`SchemaType`] handles; the field list is fetched from the schema's
//!   symbol when a path walks into it.
//!
//! ## What is validated
//!
//! - Every unit, dimension, schema and enum named in a type position is declared
//! - Field paths exist, optional values are only entered with `?.`, indexing targets arrays
//! - Additive arithmetic on quantities agrees on dimensions
//! - Every mapping rule's value is a subtype of its target field
//! - Aggregates run over arrays, lookups name lookup tables, match patterns name real variants
//! - Pipeline steps are transforms that chain
//!
//! ## Examples
//!
//! ```rust
//! use metrica::frontend::typechecker;
//! use metrica_syntax::ast::build::*;
//!
//! let program = program(vec![
//!     schema("Person", vec![("name", string_ty()), ("age", int_ty())]),
//!     schema("PersonDTO", vec![("fullName", string_ty()), ("ageYears", int_ty())]),
//!     transform(
//!         "ToDto",
//!         schema_ty("Person"),
//!         schema_ty("PersonDTO"),
//!         vec![rule("fullName", path("$.name")), rule("ageYears", path("$.age"))],
//!     ),
//! ]);
//! assert!(typechecker::check(&program).is_ok());
//! ```
//!
//! ## See also
//!
//! - [`symbols`](super::symbols) – symbol table and scope management
//! - [`types`](super::types) – the type model and subtype relation

mod check_decl;
mod check_expr;
mod resolve_types;
mod units;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};

use metrica_core::units::Unit;
use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::CompileError;

use crate::config::CheckerConfig;
use crate::frontend::resolver::Resolver;
use crate::frontend::symbols::*;
use crate::frontend::types::{SchemaType, Type};

use check_decl::SchemaState;
use units::UnitState;

/// Capture reusable typechecking output for later compiler stages.
///
/// ## Notes
/// - Expression types are keyed by `(span.start, span.end)` so downstream code can look them up without holding AST
///   node identities.
/// - The unit table maps every successfully evaluated unit name to its canonical [`Unit`].
#[derive(Debug, Default, Clone)]
pub struct TypeCheckInfo {
    /// Map from expression span (start,end) -> inferred type.
    pub expr_types: HashMap<(usize, usize), Type>,
    /// Evaluated units by declared name.
    pub units: HashMap<String, Unit>,
    /// Declared dimensions.
    pub dimensions: BTreeSet<String>,
}

impl TypeCheckInfo {
    pub fn expr_type(&self, span: Span) -> Option<&Type> {
        self.expr_types.get(&(span.start, span.end))
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }
}

/// Everything one checking run produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub type_info: TypeCheckInfo,
    pub errors: Vec<CompileError>,
}

impl Analysis {
    /// `true` when the program may proceed to code generation.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Type checker state.
///
/// Holds the symbol table, accumulated errors, and the per-run tables the phases share. Create with
/// [`TypeChecker::new`] or [`TypeChecker::with_config`], then call [`check_program`](Self::check_program).
pub struct TypeChecker {
    /// Symbol table populated by the resolver and completed by the checker.
    pub(crate) symbols: SymbolTable,
    /// Accumulated compile errors (non-fatal).
    pub(crate) errors: Vec<CompileError>,
    pub(crate) config: CheckerConfig,
    /// Reusable typechecker output for downstream stages.
    pub(crate) type_info: TypeCheckInfo,
    /// Unit declarations by name (first definition only).
    pub(crate) unit_decls: HashMap<String, (UnitDecl, Span)>,
    pub(crate) unit_states: HashMap<String, UnitState>,
    /// Unit names currently being evaluated, for cycle reports.
    pub(crate) unit_stack: Vec<String>,
    /// Schema declarations by name (first definition only).
    pub(crate) schema_decls: HashMap<String, (SchemaDecl, Span)>,
    pub(crate) schema_states: HashMap<String, SchemaState>,
    /// Type of `$` while checking a transform's rules.
    pub(crate) current_source: Option<Type>,
    next_type_var: usize,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self {
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            config,
            type_info: TypeCheckInfo::default(),
            unit_decls: HashMap::new(),
            unit_states: HashMap::new(),
            unit_stack: Vec::new(),
            schema_decls: HashMap::new(),
            schema_states: HashMap::new(),
            current_source: None,
            next_type_var: 0,
        }
    }

    /// Return accumulated type information for reuse by later stages.
    pub fn type_info(&self) -> &TypeCheckInfo {
        &self.type_info
    }

    /// The symbol table as completed by the last run.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub(crate) fn record_expr_type(&mut self, span: Span, ty: Type) {
        self.type_info.expr_types.insert((span.start, span.end), ty);
    }

    /// Record an error unless an identical one was already reported.
    ///
    /// Units and schemas that depend on a broken declaration hand back that declaration's error; it is kept once.
    pub(crate) fn report(&mut self, error: CompileError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub(crate) fn fresh_type_var(&mut self, name: &str) -> Type {
        let id = self.next_type_var;
        self.next_type_var += 1;
        Type::TypeVar {
            name: name.to_string(),
            id,
        }
    }

    /// Symbol id of the top-level declaration at `index`, if that declaration owns its name.
    ///
    /// Duplicate declarations were rejected by the resolver and are skipped by every checker phase.
    pub(crate) fn owned_symbol(&self, index: usize, name: &str) -> Option<SymbolId> {
        let id = self.symbols.lookup_global(name)?;
        (self.symbols.get(id)?.decl == Some(index)).then_some(id)
    }

    /// Check a program and return errors if any.
    ///
    /// ## Parameters
    ///
    /// - `program`: the AST produced by the parser.
    ///
    /// ## Returns
    ///
    /// - `Ok(())` if the program is sound.
    /// - `Err(Vec<CompileError>)` containing every resolve and type error, in discovery order.
    ///
    /// ## Notes
    ///
    /// The symbol table and [`TypeCheckInfo`] stay available afterwards, complete for every declaration that checked.
    #[tracing::instrument(skip_all, fields(decl_count = program.declarations.len()))]
    pub fn check_program(&mut self, program: &Program) -> Result<(), Vec<CompileError>> {
        self.run(program);
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    /// Check a program and keep everything the run produced.
    pub fn into_analysis(mut self, program: &Program) -> Analysis {
        self.run(program);
        Analysis {
            symbols: self.symbols,
            type_info: self.type_info,
            errors: self.errors,
        }
    }

    fn run(&mut self, program: &Program) {
        // Reset per-run state.
        self.symbols = SymbolTable::new();
        self.errors.clear();
        self.type_info = TypeCheckInfo::default();
        self.unit_decls.clear();
        self.unit_states.clear();
        self.unit_stack.clear();
        self.schema_decls.clear();
        self.schema_states.clear();
        self.current_source = None;
        self.next_type_var = 0;

        let resolve_errors = Resolver::new(&mut self.symbols).resolve(program);
        self.errors.extend(resolve_errors);

        self.check_units(program);
        self.check_declarations(program);

        tracing::debug!(error_count = self.errors.len(), "type checking finished");
    }

    /// Fields of the schema behind `handle`, with its type arguments substituted.
    pub(crate) fn schema_fields(&self, handle: &SchemaType) -> Option<Vec<(String, Type)>> {
        let info = self.symbols.schema(&handle.name)?;
        let bindings = info.schema.bindings(&handle.type_args);
        Some(
            info.schema
                .fields
                .iter()
                .map(|(name, ty)| (name.clone(), ty.substitute(&bindings)))
                .collect(),
        )
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to type-check an AST
#[tracing::instrument(skip_all, fields(decl_count = program.declarations.len()))]
pub fn check(program: &Program) -> Result<(), Vec<CompileError>> {
    TypeChecker::new().check_program(program)
}

/// Check with default options and return the symbol table, type information and errors together.
#[tracing::instrument(skip_all, fields(decl_count = program.declarations.len()))]
pub fn analyze(program: &Program) -> Analysis {
    analyze_with_config(program, CheckerConfig::default())
}

pub fn analyze_with_config(program: &Program, config: CheckerConfig) -> Analysis {
    TypeChecker::with_config(config).into_analysis(program)
}
