//! Infer binary and unary operators.
//!
//! Quantities carry their unit through arithmetic: `+`/`-` require equal dimensions and keep the left unit, `*`/`/`
//! combine units. Everything else takes the operator category's result type.

use metrica_core::lang::operators::{self, OperatorCategory};
use metrica_core::units::{divide_units, multiply_units, units_equal};
use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::types::Type;

use super::TypeChecker;

impl TypeChecker {
    pub(in crate::frontend::typechecker::check_expr) fn infer_binary(
        &mut self,
        left: &Spanned<Expr>,
        op: BinaryOp,
        right: &Spanned<Expr>,
        span: Span,
    ) -> Result<Type, CompileError> {
        let left_ty = self.infer_expr(left)?;
        let right_ty = self.infer_expr(right)?;

        let ty = match operators::info_for(op).category {
            OperatorCategory::Additive => match (&left_ty, &right_ty) {
                (Type::Quantity(l), Type::Quantity(r)) => {
                    if !units_equal(l, r) {
                        return Err(errors::unit_mismatch(
                            operators::as_str(op),
                            &l.to_string(),
                            &r.to_string(),
                            span,
                        ));
                    }
                    left_ty
                }
                _ => left_ty,
            },
            OperatorCategory::Multiplicative => match (&left_ty, &right_ty) {
                (Type::Quantity(l), Type::Quantity(r)) => {
                    let combined = if op == BinaryOp::Slash {
                        divide_units(l, r)
                    } else {
                        multiply_units(l, r)
                    };
                    let Some(unit) = combined else {
                        let written = format!("{}{}{}", l, operators::as_str(op), r);
                        return Err(errors::unit_exponent_overflow(&written, span));
                    };
                    Type::Quantity(unit)
                }
                _ => left_ty,
            },
            OperatorCategory::Comparison | OperatorCategory::Logical => Type::BOOL,
            OperatorCategory::Coalesce => right_ty,
        };
        Ok(ty)
    }

    pub(in crate::frontend::typechecker::check_expr) fn infer_unary(
        &mut self,
        op: UnaryOp,
        operand: &Spanned<Expr>,
    ) -> Result<Type, CompileError> {
        let operand_ty = self.infer_expr(operand)?;
        Ok(match op {
            UnaryOp::Not => Type::BOOL,
            UnaryOp::Neg => operand_ty,
        })
    }
}
