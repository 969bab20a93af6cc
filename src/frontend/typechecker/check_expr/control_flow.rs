//! Infer `if` and `match` expressions.
//!
//! Branch types fold pairwise: equal types stay as they are, different types become a union.

use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::types::{Type, format_type, types_equal};

use super::TypeChecker;

/// Combine two branch types.
fn join_branches(a: Type, b: Type) -> Type {
    if types_equal(&a, &b) { a } else { Type::union([a, b]) }
}

impl TypeChecker {
    /// `if c then t else e`: the condition is inferred (and recorded) but does not shape the result.
    pub(in crate::frontend::typechecker::check_expr) fn infer_if(
        &mut self,
        if_expr: &IfExpr,
    ) -> Result<Type, CompileError> {
        self.infer_expr(&if_expr.condition)?;
        let then_ty = self.infer_expr(&if_expr.then_branch)?;
        let else_ty = self.infer_expr(&if_expr.else_branch)?;
        Ok(join_branches(then_ty, else_ty))
    }

    /// `match subject { pattern => body, ... }`. Variant patterns must name a variant of the subject's enum.
    pub(in crate::frontend::typechecker::check_expr) fn infer_match(
        &mut self,
        subject: &Spanned<Expr>,
        arms: &[Spanned<MatchArm>],
    ) -> Result<Type, CompileError> {
        let subject_ty = self.infer_expr(subject)?;
        let mut result: Option<Type> = None;
        for arm in arms {
            self.check_pattern(&subject_ty, &arm.node.pattern)?;
            let body_ty = self.infer_expr(&arm.node.body)?;
            result = Some(match result {
                Some(acc) => join_branches(acc, body_ty),
                None => body_ty,
            });
        }
        Ok(result.unwrap_or(Type::Never))
    }

    fn check_pattern(&self, subject: &Type, pattern: &Spanned<Pattern>) -> Result<(), CompileError> {
        let Pattern::Variant { enum_name, variant } = &pattern.node else {
            return Ok(());
        };
        let subject = match subject {
            Type::Optional(inner) => inner.as_ref(),
            other => other,
        };
        match subject {
            Type::Enum { name, .. } => {
                if enum_name.as_ref().is_some_and(|n| n != name) {
                    let written = enum_name.as_deref().unwrap_or_default();
                    return Err(errors::unknown_variant(written, variant, pattern.span)
                        .with_note(format!("the subject has type '{}'", name)));
                }
                let known = self.symbols.enum_info(name).is_some_and(|info| info.has_variant(variant));
                if !known {
                    return Err(errors::unknown_variant(name, variant, pattern.span));
                }
                Ok(())
            }
            Type::Unknown => Ok(()),
            other => Err(errors::unknown_variant(&format_type(other), variant, pattern.span)
                .with_note("variant patterns need an enum subject")),
        }
    }
}
