//! Infer path expressions: `$.a.b`, `x.name`, `$.manager?.name`, `$.items[0]`.
//!
//! A `?.` (or `?[`) step enters an optional value; once a path has done that, the whole path's type is optional.

use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::symbols::SymbolKind;
use crate::frontend::types::{Type, format_type};

use super::TypeChecker;

impl TypeChecker {
    pub(in crate::frontend::typechecker::check_expr) fn infer_path(
        &mut self,
        path: &PathExpr,
        span: Span,
    ) -> Result<Type, CompileError> {
        let mut current = self.path_root_type(&path.root, span)?;
        let mut chained = false;

        for segment in &path.segments {
            if segment.node.is_optional() {
                if let Type::Optional(inner) = current {
                    current = *inner;
                }
                chained = true;
            }
            current = match &segment.node {
                PathSegment::Field { name, .. } => self.field_type(&current, name, segment.span)?,
                PathSegment::Index { index, .. } => {
                    self.infer_expr(index)?;
                    match &current {
                        Type::Array(elem) => elem.as_ref().clone(),
                        Type::Unknown => Type::Unknown,
                        other => return Err(errors::index_on_non_array(&format_type(other), segment.span)),
                    }
                }
            };
        }

        Ok(if chained { Type::optional(current) } else { current })
    }

    fn path_root_type(&self, root: &PathRoot, span: Span) -> Result<Type, CompileError> {
        match root {
            PathRoot::Source => Ok(self.current_source.clone().unwrap_or(Type::Unknown)),
            PathRoot::Ident(name) => {
                let sym = self
                    .symbols
                    .lookup(name)
                    .and_then(|id| self.symbols.get(id))
                    .ok_or_else(|| errors::unknown_variable(name, span))?;
                match &sym.kind {
                    SymbolKind::Variable(info) => Ok(info.ty.clone()),
                    _ => Err(errors::unknown_variable(name, span)),
                }
            }
        }
    }

    /// Type of `field` on `base`. `base` must be a schema (or `Unknown`, which propagates).
    fn field_type(&self, base: &Type, field: &str, span: Span) -> Result<Type, CompileError> {
        match base {
            Type::Schema(handle) => self
                .schema_fields(handle)
                .unwrap_or_default()
                .into_iter()
                .find(|(name, _)| name == field)
                .map(|(_, ty)| ty)
                .ok_or_else(|| errors::field_not_found(&format_type(base), field, span)),
            Type::Unknown => Ok(Type::Unknown),
            other => Err(errors::field_access_on_non_schema(&format_type(other), field, span)),
        }
    }
}
