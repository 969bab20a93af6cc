//! Physical-unit algebra.
//!
//! A [`Unit`] is a vector of dimension exponents (`Energy^1`, `Length^1 * Time^-2`, ...) together with a positive
//! numeric scale relative to the base units of those dimensions. The type checker only cares about the dimensional
//! signature; the scale is carried along so later stages can emit conversions.
//!
//! ## Notes
//!
//! - Units are always kept in canonical form: a dimension whose exponent becomes `0` is removed from the mapping, so two
//!   units with the same signature have identical mappings.
//! - Equality ([`units_equal`], and `PartialEq for Unit`) compares **dimensions only**. `km` and `m` are the same type.
//! - Labels are for diagnostics. Derived units get a label built from their operands (`kWh/h`).
//!
//! - The algebra is checked: an operation whose exponent would leave the `i32` range yields `None` instead of
//!   wrapping or panicking.
//!
//! ## Examples
//! ```rust
//! use metrica_core::units::{Unit, divide_units, multiply_units, power_unit, units_equal};
//!
//! let energy = Unit::base("Energy").with_label("kWh");
//! let time = Unit::base("Time").with_label("h");
//! let power = divide_units(&energy, &time).unwrap();
//! assert_eq!(power.exponent("Energy"), 1);
//! assert_eq!(power.exponent("Time"), -1);
//! assert!(units_equal(&multiply_units(&power, &time).unwrap(), &energy));
//! assert_eq!(power.to_string(), "kWh/h");
//! assert!(power_unit(&energy, i32::MAX).and_then(|u| multiply_units(&u, &energy)).is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// The dimensionless identity unit (empty mapping, scale 1).
pub const UNIT_ONE: Unit = Unit {
    label: None,
    dimensions: BTreeMap::new(),
    scale: 1.0,
};

/// A canonical physical unit: dimension exponents plus a scale factor.
#[derive(Debug, Clone)]
pub struct Unit {
    label: Option<String>,
    dimensions: BTreeMap<String, i32>,
    scale: f64,
}

impl Unit {
    /// The dimensionless identity.
    pub fn one() -> Self {
        UNIT_ONE
    }

    /// The base unit of a single dimension: `{dimension: 1}`, scale 1.
    pub fn base(dimension: impl Into<String>) -> Self {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(dimension.into(), 1);
        Self {
            label: None,
            dimensions,
            scale: 1.0,
        }
    }

    /// Build a unit from raw `(dimension, exponent)` pairs.
    ///
    /// Repeated dimensions are summed and zero exponents are pruned. Returns `None` if a summed exponent does not fit
    /// in an `i32`.
    pub fn from_exponents<I, S>(exponents: I, scale: f64) -> Option<Self>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        let mut dimensions: BTreeMap<String, i32> = BTreeMap::new();
        for (dim, exp) in exponents {
            let slot = dimensions.entry(dim.into()).or_insert(0);
            *slot = slot.checked_add(exp)?;
        }
        dimensions.retain(|_, exp| *exp != 0);
        Some(Self {
            label: None,
            dimensions,
            scale,
        })
    }

    /// Attach a display label (usually the declared unit name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Multiply the scale by `factor` (e.g. `unit km = 1000 m`).
    pub fn scaled(mut self, factor: f64) -> Self {
        self.scale *= factor;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn dimensions(&self) -> &BTreeMap<String, i32> {
        &self.dimensions
    }

    /// Exponent of `dimension`, `0` when absent.
    pub fn exponent(&self, dimension: &str) -> i32 {
        self.dimensions.get(dimension).copied().unwrap_or(0)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Render the dimensional signature, ignoring the label: `Energy*Time^-1`, or `1` when dimensionless.
    pub fn signature(&self) -> String {
        if self.dimensions.is_empty() {
            return "1".to_string();
        }
        self.dimensions
            .iter()
            .map(|(dim, exp)| if *exp == 1 { dim.clone() } else { format!("{dim}^{exp}") })
            .collect::<Vec<_>>()
            .join("*")
    }

    fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.signature())
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::one()
    }
}

/// Units compare by dimensional signature only.
impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        units_equal(self, other)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Parenthesize compound labels when they appear as an operand.
fn operand_label(unit: &Unit) -> String {
    let name = unit.display_name();
    if name.contains(['*', '/', '^']) {
        format!("({name})")
    } else {
        name
    }
}

/// Pointwise `a + b` (or `a - b` when `subtract`), pruning zeros. `None` when an exponent leaves the `i32` range.
fn combine(a: &Unit, b: &Unit, subtract: bool) -> Option<BTreeMap<String, i32>> {
    let mut dimensions = a.dimensions.clone();
    for (dim, exp) in &b.dimensions {
        let delta = if subtract { exp.checked_neg()? } else { *exp };
        let slot = dimensions.entry(dim.clone()).or_insert(0);
        *slot = slot.checked_add(delta)?;
    }
    dimensions.retain(|_, exp| *exp != 0);
    Some(dimensions)
}

/// Multiply two units: exponents are summed pointwise, scales multiplied.
///
/// Returns `None` if a resulting exponent does not fit in an `i32`.
pub fn multiply_units(a: &Unit, b: &Unit) -> Option<Unit> {
    Some(Unit {
        label: Some(format!("{}*{}", operand_label(a), operand_label(b))),
        dimensions: combine(a, b, false)?,
        scale: a.scale * b.scale,
    })
}

/// Divide two units: exponents are subtracted pointwise, scales divided.
///
/// Returns `None` if a resulting exponent does not fit in an `i32`.
pub fn divide_units(a: &Unit, b: &Unit) -> Option<Unit> {
    Some(Unit {
        label: Some(format!("{}/{}", operand_label(a), operand_label(b))),
        dimensions: combine(a, b, true)?,
        scale: a.scale / b.scale,
    })
}

/// Raise a unit to an integer power. `power_unit(u, 0)` is the identity.
///
/// Returns `None` if a resulting exponent does not fit in an `i32`.
pub fn power_unit(unit: &Unit, n: i32) -> Option<Unit> {
    if n == 0 {
        return Some(Unit::one());
    }
    let dimensions = unit
        .dimensions
        .iter()
        .map(|(dim, exp)| Some((dim.clone(), exp.checked_mul(n)?)))
        .collect::<Option<BTreeMap<_, _>>>()?;
    Some(Unit {
        label: Some(format!("{}^{}", operand_label(unit), n)),
        dimensions,
        scale: unit.scale.powi(n),
    })
}

/// Compare two units by their dimension mappings; scale and label are ignored.
pub fn units_equal(a: &Unit, b: &Unit) -> bool {
    a.dimensions == b.dimensions
}
