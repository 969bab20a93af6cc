//! Provide shared, pure semantic helpers and canonical language vocabulary for the Metrica compiler.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that the type checker,
//! the IR lowering and any runtime unit conversion can share so they agree on the same semantics.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, and no compiler-specific types.
//! - Current scope: the physical-unit algebra ([`units`]) and the canonical language vocabulary ([`lang`]).

pub mod lang;
pub mod units;

pub use units::{UNIT_ONE, Unit, divide_units, multiply_units, power_unit, units_equal};
