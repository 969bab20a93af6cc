//! Resolve type expressions into semantic [`Type`]s.

use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::symbols::SymbolKind;
use crate::frontend::types::{SchemaType, Type};

use super::TypeChecker;

impl TypeChecker {
    /// Resolve a type expression.
    ///
    /// ## Parameters
    /// - `ty`: the type expression.
    /// - `type_params`: generic parameters in scope (as `TypeVar`s), empty outside generic schemas.
    ///
    /// ## Notes
    /// - `SchemaRef` and `EnumRef` are spelling hints only; either resolves to whatever kind the symbol has.
    /// - Schemas resolve to nominal handles; see [`SchemaType::handle`].
    pub(crate) fn resolve_type_expr(
        &mut self,
        ty: &Spanned<TypeExpr>,
        type_params: &[Type],
    ) -> Result<Type, CompileError> {
        match &ty.node {
            TypeExpr::Primitive(id) => Ok(Type::Primitive(*id)),
            TypeExpr::SchemaRef(name) | TypeExpr::EnumRef(name) => {
                if let Some(param) = find_type_param(type_params, name) {
                    return Ok(param);
                }
                self.resolve_named(name, &[], ty.span)
            }
            TypeExpr::Generic(name, args) => {
                let args = args
                    .iter()
                    .map(|a| self.resolve_type_expr(a, type_params))
                    .collect::<Result<Vec<_>, _>>()?;
                self.resolve_named(name, &args, ty.span)
            }
            TypeExpr::Array(elem) => Ok(Type::array(self.resolve_type_expr(elem, type_params)?)),
            TypeExpr::Optional(inner) => Ok(Type::optional(self.resolve_type_expr(inner, type_params)?)),
            TypeExpr::Quantity(unit) => Ok(Type::Quantity(self.evaluate_unit_expr(unit)?)),
            TypeExpr::Tuple(elems) => Ok(Type::Tuple(
                elems
                    .iter()
                    .map(|e| self.resolve_type_expr(e, type_params))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            TypeExpr::Union(members) => Ok(Type::union(
                members
                    .iter()
                    .map(|m| self.resolve_type_expr(m, type_params))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        }
    }

    fn resolve_named(&self, name: &str, args: &[Type], span: Span) -> Result<Type, CompileError> {
        let Some(kind) = self.symbols.global_kind(name) else {
            return Err(errors::undeclared_type(name, span));
        };
        match kind {
            SymbolKind::Schema(info) => {
                let expected = info.schema.type_params.len();
                if args.len() != expected {
                    return Err(errors::generic_arity(name, expected, args.len(), span));
                }
                Ok(Type::Schema(SchemaType::handle(name, args.to_vec())))
            }
            SymbolKind::Enum(info) => {
                if !args.is_empty() {
                    return Err(errors::generic_arity(name, 0, args.len(), span));
                }
                Ok(Type::Enum {
                    name: name.to_string(),
                    variants: info.variants.clone(),
                })
            }
            other => Err(errors::not_a_type(name, other.describe(), span)),
        }
    }
}

fn find_type_param(type_params: &[Type], name: &str) -> Option<Type> {
    type_params
        .iter()
        .find(|t| matches!(t, Type::TypeVar { name: n, .. } if n == name))
        .cloned()
}
