//! Operator vocabulary.
//!
//! The parser hands binary and unary operators to the checker as fixed token spellings (`"+"`, `"??"`, `"&&"`). This
//! registry maps those spellings to stable ids and carries precedence/fixity metadata plus a semantic category the
//! checker dispatches on.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - `-` is registered once as an infix operator; the parser decides whether an occurrence is prefix negation.
//!
//! ## Examples
//! ```rust
//! use metrica_core::lang::operators::{self, OperatorCategory, OperatorId};
//!
//! assert_eq!(operators::from_str("+"), Some(OperatorId::Plus));
//! assert_eq!(operators::info_for(OperatorId::Plus).category, OperatorCategory::Additive);
//! assert_eq!(operators::from_str("and"), Some(OperatorId::AndAnd));
//! ```

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

/// Define whether an operator is infix (binary) or prefix (unary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
}

/// Semantic family of an operator; the type checker's inference rule is chosen per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    /// `+`, `-`: unit-preserving, operands must share a dimension.
    Additive,
    /// `*`, `/`: unit-combining.
    Multiplicative,
    Comparison,
    Logical,
    /// `??`: nullish coalescing.
    Coalesce,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Coalesce,
    Bang,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `precedence` is a relative ordering where higher binds tighter.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spellings: &'static [&'static str],
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
    pub category: OperatorCategory,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    op(OperatorId::Coalesce, &["??"], 10, Associativity::Right, Fixity::Infix, OperatorCategory::Coalesce),
    op(OperatorId::OrOr, &["||", "or"], 20, Associativity::Left, Fixity::Infix, OperatorCategory::Logical),
    op(OperatorId::AndAnd, &["&&", "and"], 30, Associativity::Left, Fixity::Infix, OperatorCategory::Logical),
    op(OperatorId::EqEq, &["=="], 40, Associativity::Left, Fixity::Infix, OperatorCategory::Comparison),
    op(OperatorId::NotEq, &["!="], 40, Associativity::Left, Fixity::Infix, OperatorCategory::Comparison),
    op(OperatorId::Lt, &["<"], 40, Associativity::Left, Fixity::Infix, OperatorCategory::Comparison),
    op(OperatorId::LtEq, &["<="], 40, Associativity::Left, Fixity::Infix, OperatorCategory::Comparison),
    op(OperatorId::Gt, &[">"], 40, Associativity::Left, Fixity::Infix, OperatorCategory::Comparison),
    op(OperatorId::GtEq, &[">="], 40, Associativity::Left, Fixity::Infix, OperatorCategory::Comparison),
    op(OperatorId::Plus, &["+"], 50, Associativity::Left, Fixity::Infix, OperatorCategory::Additive),
    op(OperatorId::Minus, &["-"], 50, Associativity::Left, Fixity::Infix, OperatorCategory::Additive),
    op(OperatorId::Star, &["*"], 60, Associativity::Left, Fixity::Infix, OperatorCategory::Multiplicative),
    op(OperatorId::Slash, &["/"], 60, Associativity::Left, Fixity::Infix, OperatorCategory::Multiplicative),
    op(OperatorId::Bang, &["!", "not"], 70, Associativity::Right, Fixity::Prefix, OperatorCategory::Logical),
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS
        .iter()
        .find(|o| o.id == id)
        .expect("operator info missing")
}

/// Return the canonical (first) spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spellings[0]
}

/// Resolve an operator token to its [`OperatorId`].
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| o.spellings.contains(&spelling))
        .map(|o| o.id)
}

const fn op(
    id: OperatorId,
    spellings: &'static [&'static str],
    precedence: u8,
    associativity: Associativity,
    fixity: Fixity,
    category: OperatorCategory,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spellings,
        precedence,
        associativity,
        fixity,
        category,
    }
}
