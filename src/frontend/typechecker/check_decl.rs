//! Declaration checking: enums, schemas, lookups, transforms and pipelines.

use std::collections::HashMap;

use metrica_syntax::ast::*;
use metrica_syntax::diagnostics::{CompileError, errors};

use crate::frontend::symbols::*;
use crate::frontend::types::{SchemaType, Type, format_type, is_subtype_with};

use super::TypeChecker;

/// Resolution state of one schema declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchemaState {
    Visiting,
    Done,
}

impl TypeChecker {
    /// Check every top-level declaration the resolver registered, one phase per declaration kind.
    #[tracing::instrument(skip_all)]
    pub(crate) fn check_declarations(&mut self, program: &Program) {
        let owned: Vec<(SymbolId, &Spanned<Declaration>)> = program
            .declarations
            .iter()
            .enumerate()
            .filter_map(|(index, decl)| Some((self.owned_symbol(index, decl.node.name())?, decl)))
            .collect();

        for (_, decl) in &owned {
            if let Declaration::Schema(schema) = &decl.node {
                self.schema_decls
                    .insert(schema.name.clone(), (schema.clone(), decl.span));
            }
        }

        for (id, decl) in &owned {
            if let Declaration::Enum(en) = &decl.node {
                self.check_enum(*id, en);
            }
        }
        for (_, decl) in &owned {
            if let Declaration::Schema(schema) = &decl.node {
                self.ensure_schema(&schema.name);
            }
        }
        for (id, decl) in &owned {
            if let Declaration::Lookup(lookup) = &decl.node {
                if let Err(err) = self.check_lookup(*id, lookup) {
                    tracing::debug!(lookup = %lookup.name, error = %err, "lookup declaration failed");
                    self.report(err.or_span(decl.span));
                }
            }
        }
        for (id, decl) in &owned {
            if let Declaration::Transform(transform) = &decl.node {
                if let Err(err) = self.check_transform(*id, transform) {
                    tracing::debug!(transform = %transform.name, error = %err, "transform declaration failed");
                    self.report(err.or_span(decl.span));
                }
            }
        }
        for (_, decl) in &owned {
            if let Declaration::Pipeline(pipeline) = &decl.node {
                self.check_pipeline(pipeline);
            }
        }
    }

    fn check_enum(&mut self, id: SymbolId, en: &EnumDecl) {
        let mut variants: Vec<String> = Vec::new();
        for variant in &en.variants {
            if !variants.contains(&variant.node) {
                variants.push(variant.node.clone());
            }
        }
        self.symbols.replace_kind(id, SymbolKind::Enum(EnumInfo { variants }));
    }

    // ========================================================================
    // Schemas
    // ========================================================================

    /// Resolve the schema `name` (and, first, its parent) and store its full field list on the symbol.
    ///
    /// Field types are resolved one by one; a field that fails is reported and typed `Unknown`.
    fn ensure_schema(&mut self, name: &str) {
        if self.schema_states.contains_key(name) {
            return;
        }
        let Some((decl, _)) = self.schema_decls.get(name).cloned() else {
            return;
        };
        self.schema_states.insert(name.to_string(), SchemaState::Visiting);

        let mut fields: Vec<(String, Type)> = Vec::new();
        if let Some(parent) = &decl.extends {
            self.ensure_schema(&parent.node);
            // A parent still `Visiting` here sits on an inheritance cycle, which the resolver reported.
            if self.schema_states.get(&parent.node) == Some(&SchemaState::Done) {
                if let Some(info) = self.symbols.schema(&parent.node) {
                    fields = info.schema.fields.clone();
                }
            }
        }

        let type_params: Vec<Type> = decl.type_params.iter().map(|p| self.fresh_type_var(p)).collect();
        for field in &decl.fields {
            let ty = match self.resolve_type_expr(&field.node.ty, &type_params) {
                Ok(ty) => ty,
                Err(err) => {
                    tracing::debug!(schema = %name, field = %field.node.name, error = %err, "field type failed");
                    self.report(err.or_span(field.span));
                    Type::Unknown
                }
            };
            match fields.iter_mut().find(|(n, _)| *n == field.node.name) {
                Some(slot) => slot.1 = ty,
                None => fields.push((field.node.name.clone(), ty)),
            }
        }

        if let Some(id) = self.symbols.lookup_global(name) {
            let schema = SchemaType::new(name)
                .with_type_params(decl.type_params.clone())
                .with_fields(fields);
            self.symbols.replace_kind(
                id,
                SymbolKind::Schema(SchemaInfo {
                    schema,
                    extends: decl.extends.as_ref().map(|e| e.node.clone()),
                }),
            );
        }
        self.schema_states.insert(name.to_string(), SchemaState::Done);
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    fn check_lookup(&mut self, id: SymbolId, lookup: &LookupDecl) -> Result<(), CompileError> {
        let keys = lookup
            .keys
            .iter()
            .map(|k| self.resolve_type_expr(k, &[]))
            .collect::<Result<Vec<_>, _>>()?;
        let value = self.resolve_type_expr(&lookup.value, &[])?;
        self.symbols
            .replace_kind(id, SymbolKind::Lookup(LookupInfo { keys, value }));
        Ok(())
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    fn check_transform(&mut self, id: SymbolId, transform: &TransformDecl) -> Result<(), CompileError> {
        let mut sources = Vec::with_capacity(transform.sources.len());
        for source in &transform.sources {
            let ty = self.resolve_type_expr(&source.ty, &[])?;
            sources.push((source.name.clone(), ty));
        }
        let target = self.resolve_type_expr(&transform.target, &[])?;
        let info = TransformInfo { sources, target };
        self.symbols
            .replace_kind(id, SymbolKind::Transform(info.clone()));

        self.symbols.enter_scope(ScopeKind::Transform);
        for (source, (name, ty)) in transform.sources.iter().zip(&info.sources) {
            let Some(name) = name else {
                continue;
            };
            let symbol = Symbol::new(name.clone(), SymbolKind::Variable(VariableInfo { ty: ty.clone() }), source.ty.span);
            if let Err(err) = self.symbols.define(symbol) {
                self.report(err);
            }
        }
        self.current_source = Some(info.source_type());

        let mut assigned: HashMap<String, Span> = HashMap::new();
        for rule in &transform.rules {
            let target_path = rule.node.target_path();
            if assigned.contains_key(&target_path) {
                self.report(errors::duplicate_target(&target_path, rule.span));
            } else {
                assigned.insert(target_path, rule.span);
            }
            if let Err(err) = self.check_rule(&info.target, &rule.node) {
                tracing::debug!(transform = %transform.name, rule = %rule.node.target_path(), error = %err, "mapping rule failed");
                self.report(err.or_span(rule.span));
            }
        }

        self.current_source = None;
        self.symbols.exit_scope();
        Ok(())
    }

    /// `target.path <- value`: the value's type must be a subtype of the target field's type.
    fn check_rule(&mut self, target: &Type, rule: &MappingRule) -> Result<(), CompileError> {
        let field_ty = self.walk_target(target, &rule.target)?;
        let value_ty = self.infer_expr(&rule.value)?;
        if !is_subtype_with(&value_ty, &field_ty, self.config.subtype_options()) {
            return Err(errors::type_mismatch(
                &rule.target_path(),
                &format_type(&field_ty),
                &format_type(&value_ty),
                rule.value.span,
            ));
        }
        Ok(())
    }

    /// Type of the field a target path names. Every segment must be a field of a schema.
    fn walk_target(&self, target: &Type, path: &[Spanned<Ident>]) -> Result<Type, CompileError> {
        let mut current = target.clone();
        for segment in path {
            current = match &current {
                Type::Schema(handle) => self
                    .schema_fields(handle)
                    .unwrap_or_default()
                    .into_iter()
                    .find(|(name, _)| *name == segment.node)
                    .map(|(_, ty)| ty)
                    .ok_or_else(|| errors::field_not_found(&format_type(&current), &segment.node, segment.span))?,
                Type::Unknown => Type::Unknown,
                other => {
                    return Err(errors::field_access_on_non_schema(
                        &format_type(other),
                        &segment.node,
                        segment.span,
                    ));
                }
            };
        }
        Ok(current)
    }

    // ========================================================================
    // Pipelines
    // ========================================================================

    fn check_pipeline(&mut self, pipeline: &PipelineDecl) {
        let mut previous: Option<(String, TransformInfo)> = None;
        for step in &pipeline.steps {
            let info = match self.symbols.global_kind(&step.node) {
                Some(SymbolKind::Transform(info)) => info.clone(),
                Some(other) => {
                    let kind = other.describe();
                    self.report(errors::not_a_transform(&step.node, kind, step.span));
                    previous = None;
                    continue;
                }
                None => {
                    self.report(errors::unknown_transform(&step.node, step.span));
                    previous = None;
                    continue;
                }
            };

            if self.config.check_pipeline_chaining {
                if let Some((prev_name, prev_info)) = &previous {
                    let produced = &prev_info.target;
                    let expected = info.source_type();
                    if is_resolved(prev_info)
                        && is_resolved(&info)
                        && !is_subtype_with(produced, &expected, self.config.subtype_options())
                    {
                        self.report(errors::pipeline_step_mismatch(
                            prev_name,
                            &step.node,
                            &format_type(produced),
                            &format_type(&expected),
                            step.span,
                        ));
                    }
                }
            }
            previous = Some((step.node.clone(), info));
        }
    }
}

/// A transform whose signature failed to resolve keeps its `Unknown` placeholders.
fn is_resolved(info: &TransformInfo) -> bool {
    !info.target.is_unknown() && info.sources.iter().all(|(_, ty)| !ty.is_unknown())
}
