//! Aggregate function vocabulary and result policy.
//!
//! Aggregates (`sum(xs, |x| x.amount)`) fold an array source through an optional lambda. Their result type is a
//! function of the source array type and the lambda body type; [`result_kind`] is the single place that policy lives
//! so the checker and the IR lowering agree.
//!
//! ## Examples
//! ```rust
//! use metrica_core::lang::aggregates::{self, AggregateId, AggregateResult};
//!
//! assert_eq!(aggregates::from_str("collect"), Some(AggregateId::Collect));
//! assert_eq!(aggregates::result_kind(AggregateId::Count), AggregateResult::Int);
//! assert_eq!(aggregates::result_kind(AggregateId::Filter), AggregateResult::SourceArray);
//! ```

use super::registry::{LangItemInfo, item};

/// Stable identifier for aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateId {
    Sum,
    Avg,
    Max,
    Min,
    Count,
    Collect,
    Filter,
}

pub type AggregateInfo = LangItemInfo<AggregateId>;

/// Registry of aggregate functions.
pub const AGGREGATES: &[AggregateInfo] = &[
    item(AggregateId::Sum, "sum", &[], "Sum of the lambda body over every element."),
    item(AggregateId::Avg, "avg", &["mean"], "Arithmetic mean of the lambda body over every element."),
    item(AggregateId::Max, "max", &[], "Largest lambda body value."),
    item(AggregateId::Min, "min", &[], "Smallest lambda body value."),
    item(AggregateId::Count, "count", &[], "Number of elements (optionally those matching the lambda)."),
    item(AggregateId::Collect, "collect", &["map"], "Array of the lambda body for every element."),
    item(AggregateId::Filter, "filter", &["where"], "Elements for which the lambda body holds."),
];

/// Shape of an aggregate's result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateResult {
    /// The lambda body's type (`sum`, `avg`, `max`, `min`).
    Body,
    /// An array of the lambda body's type (`collect`).
    ArrayOfBody,
    /// The source array type, unchanged (`filter`).
    SourceArray,
    /// Always `Int` (`count`).
    Int,
}

/// Resolve an aggregate name (canonical or alias).
pub fn from_str(name: &str) -> Option<AggregateId> {
    AGGREGATES.iter().find(|a| a.matches(name)).map(|a| a.id)
}

/// Return the canonical spelling of an aggregate.
pub fn as_str(id: AggregateId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for an aggregate.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: AggregateId) -> &'static AggregateInfo {
    AGGREGATES
        .iter()
        .find(|a| a.id == id)
        .expect("aggregate info missing")
}

/// Result-type policy for an aggregate.
pub fn result_kind(id: AggregateId) -> AggregateResult {
    match id {
        AggregateId::Sum | AggregateId::Avg | AggregateId::Max | AggregateId::Min => AggregateResult::Body,
        AggregateId::Collect => AggregateResult::ArrayOfBody,
        AggregateId::Filter => AggregateResult::SourceArray,
        AggregateId::Count => AggregateResult::Int,
    }
}
