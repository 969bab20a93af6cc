//! Terse constructors for synthesizing ASTs without a parser.
//!
//! Tests, fixtures and tools that generate Metrica programs programmatically use these instead of spelling out every
//! `Spanned`/`Box`. All nodes get [`Span::default`]; wrap a node in [`Spanned::new`] yourself when a test needs a
//! distinct span.
//!
//! ## Examples
//! ```rust
//! use metrica_syntax::ast::build::*;
//!
//! let program = program(vec![
//!     schema("Person", vec![("name", string_ty()), ("age", int_ty())]),
//!     schema("PersonDTO", vec![("fullName", string_ty())]),
//!     transform("ToDto", schema_ty("Person"), schema_ty("PersonDTO"), vec![rule("fullName", path("$.name"))]),
//! ]);
//! assert_eq!(program.declarations.len(), 3);
//! ```

use super::*;

pub fn sp<T>(node: T) -> Spanned<T> {
    Spanned::new(node, Span::default())
}

fn bx<T>(node: T) -> Box<Spanned<T>> {
    Box::new(sp(node))
}

pub fn program(declarations: Vec<Declaration>) -> Program {
    Program {
        declarations: declarations.into_iter().map(sp).collect(),
    }
}

// ============================================================================
// Declarations
// ============================================================================

pub fn schema(name: &str, fields: Vec<(&str, TypeExpr)>) -> Declaration {
    Declaration::Schema(SchemaDecl {
        name: name.to_string(),
        type_params: vec![],
        extends: None,
        fields: fields
            .into_iter()
            .map(|(name, ty)| {
                sp(FieldDecl {
                    name: name.to_string(),
                    ty: sp(ty),
                })
            })
            .collect(),
    })
}

/// A schema inheriting the fields of `base`.
pub fn schema_extends(name: &str, base: &str, fields: Vec<(&str, TypeExpr)>) -> Declaration {
    match schema(name, fields) {
        Declaration::Schema(mut decl) => {
            decl.extends = Some(sp(base.to_string()));
            Declaration::Schema(decl)
        }
        other => other,
    }
}

/// A generic schema declaring `type_params`.
pub fn generic_schema(name: &str, type_params: &[&str], fields: Vec<(&str, TypeExpr)>) -> Declaration {
    match schema(name, fields) {
        Declaration::Schema(mut decl) => {
            decl.type_params = type_params.iter().map(|p| p.to_string()).collect();
            Declaration::Schema(decl)
        }
        other => other,
    }
}

pub fn enum_decl(name: &str, variants: &[&str]) -> Declaration {
    Declaration::Enum(EnumDecl {
        name: name.to_string(),
        variants: variants.iter().map(|v| sp(v.to_string())).collect(),
    })
}

pub fn dimension(name: &str) -> Declaration {
    Declaration::Dimension(DimensionDecl { name: name.to_string() })
}

/// `unit name: dimension`
pub fn base_unit(name: &str, dimension: &str) -> Declaration {
    Declaration::Unit(UnitDecl {
        name: name.to_string(),
        dimension: Some(sp(dimension.to_string())),
        expr: None,
        scale: None,
    })
}

/// `unit name` with neither dimension nor definition.
pub fn plain_unit(name: &str) -> Declaration {
    Declaration::Unit(UnitDecl {
        name: name.to_string(),
        dimension: None,
        expr: None,
        scale: None,
    })
}

/// `unit name = [scale] expr`
pub fn derived_unit(name: &str, scale: Option<f64>, expr: UnitExpr) -> Declaration {
    Declaration::Unit(UnitDecl {
        name: name.to_string(),
        dimension: None,
        expr: Some(sp(expr)),
        scale,
    })
}

pub fn lookup(name: &str, keys: Vec<TypeExpr>, value: TypeExpr) -> Declaration {
    Declaration::Lookup(LookupDecl {
        name: name.to_string(),
        keys: keys.into_iter().map(sp).collect(),
        value: sp(value),
    })
}

/// Single-source transform (`$` is the source).
pub fn transform(name: &str, source: TypeExpr, target: TypeExpr, rules: Vec<MappingRule>) -> Declaration {
    Declaration::Transform(TransformDecl {
        name: name.to_string(),
        sources: vec![TransformSource {
            name: None,
            ty: sp(source),
        }],
        target: sp(target),
        rules: rules.into_iter().map(sp).collect(),
    })
}

/// Transform over several named sources.
pub fn transform_multi(
    name: &str,
    sources: Vec<(&str, TypeExpr)>,
    target: TypeExpr,
    rules: Vec<MappingRule>,
) -> Declaration {
    Declaration::Transform(TransformDecl {
        name: name.to_string(),
        sources: sources
            .into_iter()
            .map(|(name, ty)| TransformSource {
                name: Some(name.to_string()),
                ty: sp(ty),
            })
            .collect(),
        target: sp(target),
        rules: rules.into_iter().map(sp).collect(),
    })
}

/// `target.path <- value`; the target is split on `.`.
pub fn rule(target: &str, value: Expr) -> MappingRule {
    MappingRule {
        target: target.split('.').map(|s| sp(s.to_string())).collect(),
        value: sp(value),
    }
}

pub fn pipeline(name: &str, steps: &[&str]) -> Declaration {
    Declaration::Pipeline(PipelineDecl {
        name: name.to_string(),
        steps: steps.iter().map(|s| sp(s.to_string())).collect(),
    })
}

// ============================================================================
// Types and units
// ============================================================================

pub fn string_ty() -> TypeExpr {
    TypeExpr::Primitive(PrimitiveId::String)
}

pub fn int_ty() -> TypeExpr {
    TypeExpr::Primitive(PrimitiveId::Int)
}

pub fn float_ty() -> TypeExpr {
    TypeExpr::Primitive(PrimitiveId::Float)
}

pub fn bool_ty() -> TypeExpr {
    TypeExpr::Primitive(PrimitiveId::Bool)
}

pub fn schema_ty(name: &str) -> TypeExpr {
    TypeExpr::SchemaRef(name.to_string())
}

pub fn enum_ty(name: &str) -> TypeExpr {
    TypeExpr::EnumRef(name.to_string())
}

pub fn array_ty(elem: TypeExpr) -> TypeExpr {
    TypeExpr::Array(bx(elem))
}

pub fn optional_ty(inner: TypeExpr) -> TypeExpr {
    TypeExpr::Optional(bx(inner))
}

pub fn tuple_ty(elems: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Tuple(elems.into_iter().map(sp).collect())
}

pub fn union_ty(members: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Union(members.into_iter().map(sp).collect())
}

pub fn generic_ty(name: &str, args: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Generic(name.to_string(), args.into_iter().map(sp).collect())
}

pub fn quantity_ty(unit: UnitExpr) -> TypeExpr {
    TypeExpr::Quantity(bx(unit))
}

pub fn unit_ref(name: &str) -> UnitExpr {
    UnitExpr::Ref(name.to_string())
}

pub fn unit_mul(a: UnitExpr, b: UnitExpr) -> UnitExpr {
    UnitExpr::Mul(bx(a), bx(b))
}

pub fn unit_div(a: UnitExpr, b: UnitExpr) -> UnitExpr {
    UnitExpr::Div(bx(a), bx(b))
}

pub fn unit_pow(base: UnitExpr, n: i32) -> UnitExpr {
    UnitExpr::Pow(bx(base), n)
}

// ============================================================================
// Expressions
// ============================================================================

pub fn int_lit(value: i64) -> Expr {
    Expr::Literal(Literal::Int(value))
}

pub fn float_lit(value: f64) -> Expr {
    Expr::Literal(Literal::Float(value))
}

pub fn str_lit(value: &str) -> Expr {
    Expr::Literal(Literal::String(value.to_string()))
}

pub fn bool_lit(value: bool) -> Expr {
    Expr::Literal(Literal::Bool(value))
}

pub fn null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Parse a dotted path such as `$.manager?.name` or `x.amount`.
///
/// A `?` at the end of a segment marks the *next* segment as optional (`a?.b`). Index segments are added with
/// [`index`].
pub fn path(text: &str) -> Expr {
    let mut parts = text.split('.');
    let root_text = parts.next().unwrap_or("$");
    let mut pending_optional = root_text.ends_with('?');
    let root = match root_text.trim_end_matches('?') {
        "$" => PathRoot::Source,
        name => PathRoot::Ident(name.to_string()),
    };
    let mut segments = Vec::new();
    for part in parts {
        let optional = pending_optional;
        pending_optional = part.ends_with('?');
        segments.push(sp(PathSegment::Field {
            name: part.trim_end_matches('?').to_string(),
            optional,
        }));
    }
    Expr::Path(PathExpr { root, segments })
}

/// Append `[idx]` to a path expression. Non-path bases are returned unchanged.
pub fn index(base: Expr, idx: Expr) -> Expr {
    match base {
        Expr::Path(mut p) => {
            p.segments.push(sp(PathSegment::Index {
                index: bx(idx),
                optional: false,
            }));
            Expr::Path(p)
        }
        other => other,
    }
}

/// Binary operation from its token spelling.
///
/// ## Panics
/// - If `op` is not an infix operator token.
pub fn binary(left: Expr, op: &str, right: Expr) -> Expr {
    let op = binary_op(op).unwrap_or_else(|| panic!("not an infix operator: {op}"));
    Expr::Binary(bx(left), op, bx(right))
}

pub fn not(operand: Expr) -> Expr {
    Expr::Unary(UnaryOp::Not, bx(operand))
}

pub fn neg(operand: Expr) -> Expr {
    Expr::Unary(UnaryOp::Neg, bx(operand))
}

pub fn if_expr(condition: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
    Expr::If(IfExpr {
        condition: bx(condition),
        then_branch: bx(then_branch),
        else_branch: bx(else_branch),
    })
}

pub fn match_expr(subject: Expr, arms: Vec<(Pattern, Expr)>) -> Expr {
    Expr::Match(
        bx(subject),
        arms.into_iter()
            .map(|(pattern, body)| {
                sp(MatchArm {
                    pattern: sp(pattern),
                    body: sp(body),
                })
            })
            .collect(),
    )
}

pub fn variant_pat(enum_name: &str, variant: &str) -> Pattern {
    Pattern::Variant {
        enum_name: Some(enum_name.to_string()),
        variant: variant.to_string(),
    }
}

pub fn lambda(params: &[&str], body: Expr) -> Lambda {
    Lambda {
        params: params.iter().map(|p| sp(p.to_string())).collect(),
        body: bx(body),
    }
}

/// `func(source, |param| body)`
///
/// ## Panics
/// - If `func` is not an aggregate name.
pub fn aggregate(func: &str, source: Expr, lambda: Option<Lambda>) -> Expr {
    let func = aggregates::from_str(func).unwrap_or_else(|| panic!("not an aggregate: {func}"));
    Expr::Aggregate(AggregateCall {
        func,
        source: bx(source),
        lambda: lambda.map(sp),
    })
}

pub fn lookup_call(table: &str, keys: Vec<Expr>) -> Expr {
    Expr::Lookup(LookupCall {
        table: sp(table.to_string()),
        keys: keys.into_iter().map(sp).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_optional_segments() {
        let Expr::Path(p) = path("$.manager?.name") else {
            panic!("expected path");
        };
        assert_eq!(p.root, PathRoot::Source);
        assert_eq!(p.segments.len(), 2);
        assert!(!p.segments[0].node.is_optional());
        assert!(p.segments[1].node.is_optional());
        assert_eq!(p.to_string(), "$.manager?.name");
    }

    #[test]
    fn test_path_ident_root() {
        let Expr::Path(p) = path("x.amount") else {
            panic!("expected path");
        };
        assert_eq!(p.root, PathRoot::Ident("x".to_string()));
        assert_eq!(p.to_string(), "x.amount");
    }

    #[test]
    fn test_rule_splits_target() {
        let r = rule("address.city", str_lit("Utrecht"));
        assert_eq!(r.target.len(), 2);
        assert_eq!(r.target_path(), "address.city");
    }
}
