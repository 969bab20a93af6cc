//! Infer `lookup(Table, key, ...)` calls.

use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::types::{Type, format_type, is_subtype_with};

use super::TypeChecker;

impl TypeChecker {
    /// The table must be a declared lookup; the result is its value type.
    ///
    /// Keys are always inferred. They are compared against the declared key types only with
    /// [`CheckerConfig::strict_lookup_keys`](crate::config::CheckerConfig::strict_lookup_keys).
    pub(in crate::frontend::typechecker::check_expr) fn infer_lookup(
        &mut self,
        call: &LookupCall,
    ) -> Result<Type, CompileError> {
        let table = &call.table.node;
        let info = self
            .symbols
            .lookup_table(table)
            .cloned()
            .ok_or_else(|| errors::lookup_not_found(table, call.table.span))?;

        let mut key_types = Vec::with_capacity(call.keys.len());
        for key in &call.keys {
            key_types.push(self.infer_expr(key)?);
        }

        if self.config.strict_lookup_keys {
            if key_types.len() != info.keys.len() {
                return Err(errors::lookup_key_arity(
                    table,
                    info.keys.len(),
                    key_types.len(),
                    call.table.span,
                ));
            }
            let options = self.config.subtype_options();
            for ((found, expected), key) in key_types.iter().zip(&info.keys).zip(&call.keys) {
                if !is_subtype_with(found, expected, options) {
                    return Err(errors::lookup_key_mismatch(
                        table,
                        &format_type(expected),
                        &format_type(found),
                        key.span,
                    ));
                }
            }
        }

        Ok(info.value)
    }
}
