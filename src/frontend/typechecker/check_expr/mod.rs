//! Infer expression types.
//!
//! This module owns the expression entrypoint (`infer_expr`) and delegates to themed submodules. Inference is
//! `Result`-returning: the first fatal problem inside an expression aborts it, and the enclosing mapping rule reports
//! the error. Every type that is inferred is recorded in [`TypeCheckInfo`](super::TypeCheckInfo) by span.
//!
//! ## See also
//! - [`super::TypeChecker`]: the main type checker entrypoint.

use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::CompileError;

use crate::frontend::symbols::{ScopeKind, Symbol, SymbolKind, VariableInfo};
use crate::frontend::types::Type;

use super::TypeChecker;

mod access;
mod aggregates;
mod control_flow;
mod lookups;
mod ops;

impl TypeChecker {
    // ========================================================================
    // Expressions
    // ========================================================================

    /// Infer the type of an expression.
    ///
    /// Dispatches to specialized helpers (`infer_path`, `infer_binary`, `infer_aggregate`, etc.).
    pub(crate) fn infer_expr(&mut self, expr: &Spanned<Expr>) -> Result<Type, CompileError> {
        let ty = match &expr.node {
            Expr::Literal(lit) => literal_type(lit),
            Expr::Path(path) => self.infer_path(path, expr.span)?,
            Expr::Binary(left, op, right) => self.infer_binary(left, *op, right, expr.span)?,
            Expr::Unary(op, operand) => self.infer_unary(*op, operand)?,
            Expr::If(if_expr) => self.infer_if(if_expr)?,
            Expr::Match(subject, arms) => self.infer_match(subject, arms)?,
            Expr::Lambda(lambda) => self.infer_lambda(lambda, &[])?,
            Expr::Aggregate(call) => self.infer_aggregate(call, expr.span)?,
            Expr::Lookup(call) => self.infer_lookup(call)?,
        };

        // Record for downstream stages.
        self.record_expr_type(expr.span, ty.clone());
        Ok(ty)
    }

    /// Infer a lambda's body with its parameters bound in a fresh scope.
    ///
    /// Parameters without a type in `param_types` are bound to `Unknown`. Returns `Function(params, body)`.
    pub(in crate::frontend::typechecker::check_expr) fn infer_lambda(
        &mut self,
        lambda: &Lambda,
        param_types: &[Type],
    ) -> Result<Type, CompileError> {
        let params: Vec<Type> = (0..lambda.params.len())
            .map(|i| param_types.get(i).cloned().unwrap_or(Type::Unknown))
            .collect();

        self.symbols.enter_scope(ScopeKind::Lambda);
        let body = self.bind_and_infer(lambda, &params);
        self.symbols.exit_scope();

        Ok(Type::Function(params, Box::new(body?)))
    }

    fn bind_and_infer(&mut self, lambda: &Lambda, params: &[Type]) -> Result<Type, CompileError> {
        for (param, ty) in lambda.params.iter().zip(params) {
            self.symbols.define(Symbol::new(
                param.node.clone(),
                SymbolKind::Variable(VariableInfo { ty: ty.clone() }),
                param.span,
            ))?;
        }
        self.infer_expr(&lambda.body)
    }
}

fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Int(_) => Type::INT,
        Literal::Float(_) => Type::FLOAT,
        Literal::String(_) => Type::STRING,
        Literal::Bool(_) => Type::BOOL,
        Literal::Null => Type::Never,
    }
}
