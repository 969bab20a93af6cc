//! Diagnostics and error reporting for Metrica
//!
//! Every problem the resolver or type checker finds becomes a [`CompileError`]. Errors are plain values: they are
//! accumulated into a list, never thrown, and the caller decides whether the list blocks code generation.
//!
//! Rendering with source context goes through `miette` ([`render`]).

use std::fmt;

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, Report};
use thiserror::Error;

use crate::ast::Span;

/// A compile-time error with location information
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(message: String, span: Span, kind: ErrorKind) -> Self {
        Self {
            message,
            span,
            kind,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// A name-binding problem (duplicate symbol, bad `extends` target).
    pub fn resolve_error(message: String, span: Span) -> Self {
        Self::new(message, span, ErrorKind::Resolve)
    }

    /// A type or dimension problem found by the checker.
    pub fn type_error(message: String, span: Span) -> Self {
        Self::new(message, span, ErrorKind::Type)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Replace an empty span with `fallback` (errors raised deep inside a declaration inherit its span).
    pub fn or_span(mut self, fallback: Span) -> Self {
        if self.span == Span::default() {
            self.span = fallback;
        }
        self
    }

    pub fn is_resolve_error(&self) -> bool {
        self.kind == ErrorKind::Resolve
    }

    pub fn is_type_error(&self) -> bool {
        self.kind == ErrorKind::Type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Produced by the resolver (`ResolveError`).
    Resolve,
    /// Produced by the type checker (`TypeCheckError`).
    Type,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Resolve => "metrica::resolve",
            ErrorKind::Type => "metrica::type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Resolve => write!(f, "resolve error"),
            ErrorKind::Type => write!(f, "type error"),
        }
    }
}

impl Diagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let mut lines: Vec<String> = self.hints.clone();
        lines.extend(self.notes.iter().map(|n| format!("note: {n}")));
        if lines.is_empty() {
            None
        } else {
            Some(Box::new(lines.join("\n")))
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new(Some(self.kind.to_string()), self.span.start, self.span.len());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Render an error with source context, without colours.
///
/// ## Parameters
/// - `file_name`: name shown in the report header.
/// - `source`: the full source text the error's span points into.
/// - `error`: the error to render.
pub fn render(file_name: &str, source: &str, error: &CompileError) -> String {
    let report = Report::new(error.clone()).with_source_code(NamedSource::new(file_name, source.to_string()));
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, report.as_ref()).is_err() {
        // Fall back to the bare message if the span does not fit the source.
        return format!("{}: {}", error.kind, error.message);
    }
    out
}

/// Render every error, separated by blank lines.
pub fn render_all(file_name: &str, source: &str, errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(|e| render(file_name, source, e))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Error catalog
// ============================================================================

/// Constructors for every diagnostic the resolver and checker emit.
pub mod errors {
    use super::*;

    // ---- resolver -------------------------------------------------------

    pub fn duplicate_definition(name: &str, span: Span) -> CompileError {
        CompileError::resolve_error(format!("Duplicate definition of '{}'", name), span)
            .with_hint("Each name can be declared once per scope")
    }

    pub fn unknown_extends_target(schema: &str, target: &str, span: Span) -> CompileError {
        CompileError::resolve_error(
            format!("Schema '{}' extends '{}', which is not a declared schema", schema, target),
            span,
        )
    }

    pub fn cyclic_inheritance(chain: &[String], span: Span) -> CompileError {
        CompileError::resolve_error(format!("Cyclic schema inheritance: {}", chain.join(" -> ")), span)
    }

    pub fn duplicate_field(schema: &str, field: &str, span: Span) -> CompileError {
        CompileError::resolve_error(format!("Field '{}' is declared twice in schema '{}'", field, schema), span)
    }

    pub fn duplicate_variant(enum_name: &str, variant: &str, span: Span) -> CompileError {
        CompileError::resolve_error(
            format!("Variant '{}' is declared twice in enum '{}'", variant, enum_name),
            span,
        )
    }

    // ---- units ----------------------------------------------------------

    pub fn undeclared_unit(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Undeclared unit '{}'", name), span)
            .with_hint(format!("Declare it first: unit {}: <Dimension>", name))
    }

    pub fn undeclared_dimension(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Undeclared dimension '{}'", name), span)
            .with_hint(format!("Declare it first: dimension {}", name))
    }

    pub fn cyclic_unit(chain: &[String], span: Span) -> CompileError {
        CompileError::type_error(format!("Cyclic unit definition: {}", chain.join(" -> ")), span)
    }

    pub fn unit_mismatch(op: &str, left: &str, right: &str, span: Span) -> CompileError {
        CompileError::type_error(
            format!("Unit mismatch: cannot apply '{}' to Quantity<{}> and Quantity<{}>", op, left, right),
            span,
        )
        .with_note("Quantities can only be added or subtracted when they share the same dimensions")
    }

    /// `expr` is the unit expression as written, e.g. `m^2147483647` or `kWh*h`.
    pub fn unit_exponent_overflow(expr: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Dimension exponent out of range in unit '{}'", expr), span)
    }

    pub fn invalid_unit_scale(name: &str, scale: f64, span: Span) -> CompileError {
        CompileError::type_error(
            format!("Unit '{}' has scale {}, but a scale must be a positive finite number", name, scale),
            span,
        )
    }

    // ---- type positions -------------------------------------------------

    pub fn undeclared_type(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Undeclared schema or enum '{}'", name), span)
    }

    pub fn not_a_type(name: &str, kind: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("'{}' is a {}, not a schema or enum", name, kind), span)
    }

    pub fn generic_arity(name: &str, expected: usize, found: usize, span: Span) -> CompileError {
        CompileError::type_error(
            format!("'{}' expects {} type argument(s), found {}", name, expected, found),
            span,
        )
    }

    // ---- expressions ----------------------------------------------------

    pub fn field_not_found(type_name: &str, field: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Type '{}' has no field '{}'", type_name, field), span)
    }

    pub fn field_access_on_non_schema(type_name: &str, field: &str, span: Span) -> CompileError {
        CompileError::type_error(
            format!("Cannot access field '{}' on non-schema type '{}'", field, type_name),
            span,
        )
        .with_hint("Use '?.' to reach into an optional schema")
    }

    pub fn index_on_non_array(type_name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Cannot index non-array type '{}'", type_name), span)
    }

    pub fn unknown_variable(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Unknown name '{}'", name), span)
            .with_hint("Paths start at '$' (the transform source), a named source, or a lambda parameter")
    }

    pub fn aggregate_source_not_array(func: &str, found: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("'{}' expects an array source, found '{}'", func, found), span)
    }

    pub fn aggregate_lambda_arity(func: &str, found: usize, span: Span) -> CompileError {
        CompileError::type_error(
            format!("The lambda passed to '{}' takes exactly one parameter, found {}", func, found),
            span,
        )
    }

    pub fn lookup_not_found(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Lookup table '{}' not found", name), span)
    }

    pub fn lookup_key_arity(name: &str, expected: usize, found: usize, span: Span) -> CompileError {
        CompileError::type_error(
            format!("Lookup '{}' takes {} key(s), found {}", name, expected, found),
            span,
        )
    }

    pub fn lookup_key_mismatch(name: &str, expected: &str, found: &str, span: Span) -> CompileError {
        CompileError::type_error(
            format!("Lookup '{}' key mismatch: expected '{}', found '{}'", name, expected, found),
            span,
        )
    }

    pub fn unknown_variant(enum_name: &str, variant: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Enum '{}' has no variant '{}'", enum_name, variant), span)
    }

    // ---- transforms and pipelines ---------------------------------------

    pub fn type_mismatch(target: &str, expected: &str, found: &str, span: Span) -> CompileError {
        let mut error = CompileError::type_error(
            format!(
                "Type mismatch: cannot assign '{}' to '{}' of type '{}'",
                found, target, expected
            ),
            span,
        );
        if expected.starts_with("Quantity<") && found.starts_with("Quantity<") {
            error = error.with_note("Quantities are assignable only when their dimensions agree");
        } else if found.ends_with('?') && !expected.ends_with('?') {
            error = error.with_hint(format!("Provide a fallback: <expr> ?? <{}>", expected));
        }
        error
    }

    pub fn duplicate_target(target: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Target field '{}' is assigned more than once", target), span)
    }

    pub fn not_a_transform(name: &str, kind: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Pipeline step '{}' is a {}, not a transform", name, kind), span)
    }

    pub fn unknown_transform(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("Pipeline step '{}' is not a declared transform", name), span)
    }

    pub fn pipeline_step_mismatch(previous: &str, next: &str, produced: &str, expected: &str, span: Span) -> CompileError {
        CompileError::type_error(
            format!(
                "Pipeline step '{}' produces '{}' but '{}' expects '{}'",
                previous, produced, next, expected
            ),
            span,
        )
    }
}
