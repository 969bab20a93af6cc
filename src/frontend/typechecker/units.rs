//! Dimension and unit evaluation.
//!
//! Units may reference units declared later in the file, so each unit is evaluated on demand and memoized. A unit
//! that is reached again while it is still being evaluated closes a cycle.

use metrica_core::units::{Unit, divide_units, multiply_units, power_unit};
use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::symbols::{SymbolKind, UnitInfo};

use super::TypeChecker;

/// Evaluation state of one unit declaration.
#[derive(Debug, Clone)]
pub(crate) enum UnitState {
    Visiting,
    Done(Unit),
    Failed(CompileError),
}

impl TypeChecker {
    /// Register dimensions and evaluate every unit declaration.
    #[tracing::instrument(skip_all)]
    pub(crate) fn check_units(&mut self, program: &Program) {
        for (index, decl) in program.declarations.iter().enumerate() {
            match &decl.node {
                Declaration::Dimension(dim) => {
                    if self.owned_symbol(index, &dim.name).is_some() {
                        self.type_info.dimensions.insert(dim.name.clone());
                    }
                }
                Declaration::Unit(unit) => {
                    if self.owned_symbol(index, &unit.name).is_some() {
                        self.unit_decls.insert(unit.name.clone(), (unit.clone(), decl.span));
                    }
                }
                _ => {}
            }
        }

        for (index, decl) in program.declarations.iter().enumerate() {
            let Declaration::Unit(unit) = &decl.node else {
                continue;
            };
            if self.owned_symbol(index, &unit.name).is_none() {
                continue;
            }
            if let Err(err) = self.ensure_unit(&unit.name) {
                tracing::debug!(unit = %unit.name, error = %err, "unit declaration failed");
                self.report(err.or_span(decl.span));
            }
        }
    }

    /// Evaluate the declared unit `name`, memoizing the result.
    fn ensure_unit(&mut self, name: &str) -> Result<Unit, CompileError> {
        match self.unit_states.get(name) {
            Some(UnitState::Done(unit)) => return Ok(unit.clone()),
            Some(UnitState::Failed(err)) => return Err(err.clone()),
            Some(UnitState::Visiting) => {
                let start = self.unit_stack.iter().position(|n| n == name).unwrap_or(0);
                let mut chain = self.unit_stack[start..].to_vec();
                chain.push(name.to_string());
                return Err(errors::cyclic_unit(&chain, Span::default()));
            }
            None => {}
        }

        let Some((decl, span)) = self.unit_decls.get(name).cloned() else {
            return Err(errors::undeclared_unit(name, Span::default()));
        };

        self.unit_states.insert(name.to_string(), UnitState::Visiting);
        self.unit_stack.push(name.to_string());
        let result = self.evaluate_unit_decl(&decl).map_err(|e| e.or_span(span));
        self.unit_stack.pop();

        match &result {
            Ok(unit) => {
                tracing::trace!(unit = %name, signature = %unit.signature(), scale = unit.scale(), "unit evaluated");
                self.unit_states.insert(name.to_string(), UnitState::Done(unit.clone()));
                self.type_info.units.insert(name.to_string(), unit.clone());
                if let Some(id) = self.symbols.lookup_global(name) {
                    self.symbols
                        .replace_kind(id, SymbolKind::Unit(UnitInfo { unit: Some(unit.clone()) }));
                }
            }
            Err(err) => {
                self.unit_states.insert(name.to_string(), UnitState::Failed(err.clone()));
            }
        }
        result
    }

    /// expression → evaluated; else dimension → base unit of it; else dimensionless. Then the scale, then the label.
    fn evaluate_unit_decl(&mut self, decl: &UnitDecl) -> Result<Unit, CompileError> {
        let unit = if let Some(expr) = &decl.expr {
            self.evaluate_unit_expr(expr)?
        } else if let Some(dim) = &decl.dimension {
            if !matches!(self.symbols.global_kind(&dim.node), Some(SymbolKind::Dimension)) {
                return Err(errors::undeclared_dimension(&dim.node, dim.span));
            }
            Unit::base(dim.node.clone())
        } else {
            Unit::one()
        };
        let unit = match decl.scale {
            Some(factor) if !(factor.is_finite() && factor > 0.0) => {
                return Err(errors::invalid_unit_scale(&decl.name, factor, Span::default()));
            }
            Some(factor) => unit.scaled(factor),
            None => unit,
        };
        Ok(unit.with_label(decl.name.clone()))
    }

    /// Evaluate a unit expression against the unit table.
    ///
    /// ## Errors
    /// - An undeclared-unit error for a reference to anything that is not a declared unit.
    /// - The referenced unit's own error when that unit failed to evaluate.
    /// - An exponent-overflow error when a product, quotient or power leaves the `i32` exponent range.
    pub(crate) fn evaluate_unit_expr(&mut self, expr: &Spanned<UnitExpr>) -> Result<Unit, CompileError> {
        match &expr.node {
            UnitExpr::Ref(name) => self.ensure_unit(name).map_err(|e| e.or_span(expr.span)),
            UnitExpr::Mul(a, b) => {
                let a = self.evaluate_unit_expr(a)?;
                let b = self.evaluate_unit_expr(b)?;
                multiply_units(&a, &b)
                    .ok_or_else(|| errors::unit_exponent_overflow(&format!("{}*{}", a, b), expr.span))
            }
            UnitExpr::Div(a, b) => {
                let a = self.evaluate_unit_expr(a)?;
                let b = self.evaluate_unit_expr(b)?;
                divide_units(&a, &b)
                    .ok_or_else(|| errors::unit_exponent_overflow(&format!("{}/{}", a, b), expr.span))
            }
            UnitExpr::Pow(base, n) => {
                let base = self.evaluate_unit_expr(base)?;
                power_unit(&base, *n)
                    .ok_or_else(|| errors::unit_exponent_overflow(&format!("{}^{}", base, n), expr.span))
            }
            UnitExpr::One => Ok(Unit::one()),
        }
    }
}
