//! Infer aggregate calls: `sum`, `avg`, `max`, `min`, `count`, `collect`, `filter`.

use metrica_core::lang::aggregates::{self, AggregateResult};
use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::types::{Type, format_type};

use super::TypeChecker;

impl TypeChecker {
    /// The source must be an array. The lambda (one parameter, bound to the element type) defaults to the identity.
    pub(in crate::frontend::typechecker::check_expr) fn infer_aggregate(
        &mut self,
        call: &AggregateCall,
        span: Span,
    ) -> Result<Type, CompileError> {
        let source_ty = self.infer_expr(&call.source)?;
        let elem = match &source_ty {
            Type::Array(elem) => elem.as_ref().clone(),
            Type::Unknown => Type::Unknown,
            other => {
                return Err(errors::aggregate_source_not_array(
                    call.name(),
                    &format_type(other),
                    call.source.span,
                ));
            }
        };

        let body = match &call.lambda {
            Some(lambda) => {
                if lambda.node.params.len() != 1 {
                    return Err(errors::aggregate_lambda_arity(
                        call.name(),
                        lambda.node.params.len(),
                        lambda.span,
                    ));
                }
                let fn_ty = self.infer_lambda(&lambda.node, std::slice::from_ref(&elem))?;
                self.record_expr_type(lambda.span, fn_ty.clone());
                match fn_ty {
                    Type::Function(_, ret) => *ret,
                    other => other,
                }
            }
            None => elem,
        };

        tracing::trace!(aggregate = call.name(), span = ?span, "aggregate inferred");
        Ok(match aggregates::result_kind(call.func) {
            AggregateResult::Body => body,
            AggregateResult::ArrayOfBody => Type::array(body),
            AggregateResult::SourceArray => source_ty,
            AggregateResult::Int => Type::INT,
        })
    }
}
