//! Abstract Syntax Tree definitions for Metrica
//!
//! This module defines the AST node types produced by the parser and consumed by the resolver and type checker.
//! Declarations, type positions, unit positions and expressions are all closed enums so every consumer handles every
//! case.

use std::fmt;

pub use metrica_core::lang::aggregates::AggregateId;
pub use metrica_core::lang::operators::OperatorId as BinaryOp;
pub use metrica_core::lang::primitives::PrimitiveId;

use metrica_core::lang::operators::{self, Fixity};
use metrica_core::lang::{aggregates, primitives};

pub mod build;

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

/// A program is a sequence of declarations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub declarations: Vec<Spanned<Declaration>>,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Schema(SchemaDecl),
    Enum(EnumDecl),
    Dimension(DimensionDecl),
    Unit(UnitDecl),
    Lookup(LookupDecl),
    Transform(TransformDecl),
    Pipeline(PipelineDecl),
}

impl Declaration {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Schema(d) => &d.name,
            Declaration::Enum(d) => &d.name,
            Declaration::Dimension(d) => &d.name,
            Declaration::Unit(d) => &d.name,
            Declaration::Lookup(d) => &d.name,
            Declaration::Transform(d) => &d.name,
            Declaration::Pipeline(d) => &d.name,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// `schema Name<T> extends Base { field: Type, ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDecl {
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub extends: Option<Spanned<Ident>>,
    pub fields: Vec<Spanned<FieldDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: Spanned<TypeExpr>,
}

/// `enum Status { Active, Retired }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Ident,
    pub variants: Vec<Spanned<Ident>>,
}

/// `dimension Energy`
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionDecl {
    pub name: Ident,
}

/// `unit kWh: Energy`, `unit W = J / s`, `unit km = 1000 m`
///
/// ## Notes
/// - When `expr` is present it defines the unit; otherwise `dimension` makes it the base unit of that dimension;
///   with neither it is dimensionless.
/// - `scale` multiplies whatever the definition evaluates to.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDecl {
    pub name: Ident,
    pub dimension: Option<Spanned<Ident>>,
    pub expr: Option<Spanned<UnitExpr>>,
    pub scale: Option<f64>,
}

/// `lookup Tariffs(String, Date) -> Quantity<EUR/kWh>`
#[derive(Debug, Clone, PartialEq)]
pub struct LookupDecl {
    pub name: Ident,
    pub keys: Vec<Spanned<TypeExpr>>,
    pub value: Spanned<TypeExpr>,
}

/// `transform ToDto(Person) -> PersonDTO { fullName <- $.name }`
#[derive(Debug, Clone, PartialEq)]
pub struct TransformDecl {
    pub name: Ident,
    pub sources: Vec<TransformSource>,
    pub target: Spanned<TypeExpr>,
    pub rules: Vec<Spanned<MappingRule>>,
}

/// One transform input. Named inputs are also reachable by name inside rule expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSource {
    pub name: Option<Ident>,
    pub ty: Spanned<TypeExpr>,
}

/// `target.path <- expression`
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRule {
    pub target: Vec<Spanned<Ident>>,
    pub value: Spanned<Expr>,
}

impl MappingRule {
    /// Dotted rendering of the target path (`address.city`).
    pub fn target_path(&self) -> String {
        self.target
            .iter()
            .map(|s| s.node.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// `pipeline Ingest = Normalize |> Enrich |> ToDto`
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDecl {
    pub name: Ident,
    pub steps: Vec<Spanned<Ident>>,
}

// ============================================================================
// Type and unit positions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `String`, `Int`, `DateTime`, ...
    Primitive(PrimitiveId),
    SchemaRef(Ident),
    EnumRef(Ident),
    /// `[T]`
    Array(Box<Spanned<TypeExpr>>),
    /// `T?`
    Optional(Box<Spanned<TypeExpr>>),
    /// `Quantity<kWh>`
    Quantity(Box<Spanned<UnitExpr>>),
    /// `(A, B)`
    Tuple(Vec<Spanned<TypeExpr>>),
    /// `A | B`
    Union(Vec<Spanned<TypeExpr>>),
    /// `Page<Person>`
    Generic(Ident, Vec<Spanned<TypeExpr>>),
}

impl TypeExpr {
    /// Build a reference from a bare name: primitives resolve through the registry, anything else is a schema ref.
    pub fn named(name: &str) -> Self {
        match primitives::from_str(name) {
            Some(id) => TypeExpr::Primitive(id),
            None => TypeExpr::SchemaRef(name.to_string()),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(id) => write!(f, "{}", primitives::as_str(*id)),
            TypeExpr::SchemaRef(name) | TypeExpr::EnumRef(name) => write!(f, "{}", name),
            TypeExpr::Array(elem) => write!(f, "[{}]", elem.node),
            TypeExpr::Optional(inner) => write!(f, "{}?", inner.node),
            TypeExpr::Quantity(unit) => write!(f, "Quantity<{}>", unit.node),
            TypeExpr::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e.node)?;
                }
                write!(f, ")")
            }
            TypeExpr::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", m.node)?;
                }
                Ok(())
            }
            TypeExpr::Generic(name, args) => {
                write!(f, "{}<", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a.node)?;
                }
                write!(f, ">")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitExpr {
    /// A declared unit name: `kWh`
    Ref(Ident),
    /// `a * b`
    Mul(Box<Spanned<UnitExpr>>, Box<Spanned<UnitExpr>>),
    /// `a / b`
    Div(Box<Spanned<UnitExpr>>, Box<Spanned<UnitExpr>>),
    /// `a ^ n`
    Pow(Box<Spanned<UnitExpr>>, i32),
    /// `1`
    One,
}

impl fmt::Display for UnitExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitExpr::Ref(name) => write!(f, "{}", name),
            UnitExpr::Mul(a, b) => write!(f, "{}*{}", a.node, b.node),
            UnitExpr::Div(a, b) => match &b.node {
                UnitExpr::Mul(..) | UnitExpr::Div(..) => write!(f, "{}/({})", a.node, b.node),
                _ => write!(f, "{}/{}", a.node, b.node),
            },
            UnitExpr::Pow(base, n) => write!(f, "{}^{}", base.node, n),
            UnitExpr::One => write!(f, "1"),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// `$.a.b`, `x.name`, `$.manager?.name`, `$.items[0]`
    Path(PathExpr),
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
    Unary(UnaryOp, Box<Spanned<Expr>>),
    /// `if c then t else e`
    If(IfExpr),
    /// `match subject { pattern => expr, ... }`
    Match(Box<Spanned<Expr>>, Vec<Spanned<MatchArm>>),
    /// `|x| body`
    Lambda(Lambda),
    /// `sum($.lines, |l| l.amount)`
    Aggregate(AggregateCall),
    /// `lookup(Tariffs, $.country, $.date)`
    Lookup(LookupCall),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    pub root: PathRoot,
    pub segments: Vec<Spanned<PathSegment>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathRoot {
    /// `$`: the transform source.
    Source,
    /// A lambda parameter or named transform source.
    Ident(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// `.name`, or `?.name` when `optional`
    Field { name: Ident, optional: bool },
    /// `[index]`, or `?[index]` when `optional`
    Index { index: Box<Spanned<Expr>>, optional: bool },
}

impl PathSegment {
    pub fn is_optional(&self) -> bool {
        match self {
            PathSegment::Field { optional, .. } | PathSegment::Index { optional, .. } => *optional,
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            PathRoot::Source => write!(f, "$")?,
            PathRoot::Ident(name) => write!(f, "{}", name)?,
        }
        for seg in &self.segments {
            let q = if seg.node.is_optional() { "?" } else { "" };
            match &seg.node {
                PathSegment::Field { name, .. } => write!(f, "{}.{}", q, name)?,
                PathSegment::Index { .. } => write!(f, "{}[..]", q)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    /// Map a prefix token (`!`, `not`, `-`) to a unary operator.
    pub fn from_token(token: &str) -> Option<Self> {
        match operators::from_str(token)? {
            BinaryOp::Bang => Some(UnaryOp::Not),
            BinaryOp::Minus => Some(UnaryOp::Neg),
            _ => None,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

/// Map an infix token (`+`, `??`, `&&`, ...) to a binary operator.
pub fn binary_op(token: &str) -> Option<BinaryOp> {
    let id = operators::from_str(token)?;
    (operators::info_for(id).fixity == Fixity::Infix).then_some(id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Spanned<Expr>>,
    pub then_branch: Box<Spanned<Expr>>,
    pub else_branch: Box<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Spanned<Pattern>,
    pub body: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `_`
    Wildcard,
    Literal(Literal),
    /// `Status.Active` or bare `Active`
    Variant { enum_name: Option<Ident>, variant: Ident },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<Spanned<Ident>>,
    pub body: Box<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    pub func: AggregateId,
    pub source: Box<Spanned<Expr>>,
    pub lambda: Option<Spanned<Lambda>>,
}

impl AggregateCall {
    pub fn name(&self) -> &'static str {
        aggregates::as_str(self.func)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupCall {
    pub table: Spanned<Ident>,
    pub keys: Vec<Spanned<Expr>>,
}
