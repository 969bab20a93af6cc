//! Semantic types for Metrica
//!
//! [`Type`] is what the checker reasons about: resolved type expressions, inferred expression types and the stored
//! types of symbols. It is a closed enum, so every consumer handles every case.
//!
//! ## Notes
//!
//! - Schema types that appear in type positions are **nominal handles**: a name plus bound type arguments. The
//!   authoritative field list lives on the schema's symbol (see [`SymbolTable::schema`](super::symbols::SymbolTable::schema))
//!   and is fetched by name, which keeps self-referential schemas (`manager: Employee?`) finite.
//! - Equality ([`types_equal`]) is structural, except that schemas and enums compare by name and quantities compare by
//!   dimensions only.
//! - The subtyping relation ([`is_subtype`]) has no numeric widening and no structural schema subtyping.
//!   [`is_subtype_with`] can opt into `Int ⊑ Float`.

use std::collections::HashMap;
use std::fmt;

use metrica_core::units::{Unit, units_equal};

pub use metrica_core::lang::primitives::PrimitiveId as PrimitiveType;

use metrica_core::lang::primitives;

/// A record type: ordered named fields plus generic parameters and their bound arguments.
#[derive(Debug, Clone)]
pub struct SchemaType {
    pub name: String,
    pub fields: Vec<(String, Type)>,
    pub type_params: Vec<String>,
    pub type_args: Vec<Type>,
}

impl SchemaType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            type_params: Vec::new(),
            type_args: Vec::new(),
        }
    }

    /// A nominal reference to `name` with bound type arguments and no field list.
    pub fn handle(name: impl Into<String>, type_args: Vec<Type>) -> Self {
        Self {
            type_args,
            ..Self::new(name)
        }
    }

    pub fn with_type_params(mut self, params: Vec<String>) -> Self {
        self.type_params = params;
        self
    }

    pub fn with_fields(mut self, fields: Vec<(String, Type)>) -> Self {
        self.fields = fields;
        self
    }

    /// Field type by name, as declared (type parameters not substituted).
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Map from type parameter name to the argument bound at `type_args`.
    pub fn bindings(&self, type_args: &[Type]) -> HashMap<String, Type> {
        self.type_params
            .iter()
            .cloned()
            .zip(type_args.iter().cloned())
            .collect()
    }
}

/// A semantic type.
#[derive(Debug, Clone)]
pub enum Type {
    Primitive(PrimitiveType),
    Schema(SchemaType),
    Enum { name: String, variants: Vec<String> },
    Array(Box<Type>),
    Optional(Box<Type>),
    Quantity(Unit),
    Tuple(Vec<Type>),
    /// Member order is not significant.
    Union(Vec<Type>),
    Function(Vec<Type>, Box<Type>),
    TypeVar { name: String, id: usize },
    /// Bottom: the type of `null`, a subtype of everything.
    Never,
    /// Top: accepts everything.
    Unknown,
}

impl Type {
    pub const STRING: Type = Type::Primitive(PrimitiveType::String);
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const FLOAT: Type = Type::Primitive(PrimitiveType::Float);
    pub const BOOL: Type = Type::Primitive(PrimitiveType::Bool);

    /// Nominal schema reference without type arguments.
    pub fn schema(name: impl Into<String>) -> Self {
        Type::Schema(SchemaType::handle(name, Vec::new()))
    }

    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    /// Wrap in `Optional` unless already optional.
    pub fn optional(inner: Type) -> Self {
        match inner {
            Type::Optional(_) => inner,
            other => Type::Optional(Box::new(other)),
        }
    }

    /// Build a union: nested unions are flattened, duplicates dropped, a single member is returned as-is and an empty
    /// member list is `Never`.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: Vec<Type> = Vec::new();
        for member in members {
            let parts = match member {
                Type::Union(inner) => inner,
                other => vec![other],
            };
            for part in parts {
                if !flat.iter().any(|t| types_equal(t, &part)) {
                    flat.push(part);
                }
            }
        }
        match flat.len() {
            0 => Type::Never,
            1 => flat.remove(0),
            _ => Type::Union(flat),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Element type of an array.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Unit> {
        match self {
            Type::Quantity(unit) => Some(unit),
            _ => None,
        }
    }

    /// Replace type variables by name. Variables without a binding are left alone.
    pub fn substitute(&self, bindings: &HashMap<String, Type>) -> Type {
        if bindings.is_empty() {
            return self.clone();
        }
        let subst_all = |types: &[Type]| types.iter().map(|t| t.substitute(bindings)).collect::<Vec<_>>();
        match self {
            Type::TypeVar { name, .. } => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Schema(schema) => Type::Schema(SchemaType {
                name: schema.name.clone(),
                fields: schema
                    .fields
                    .iter()
                    .map(|(n, t)| (n.clone(), t.substitute(bindings)))
                    .collect(),
                type_params: schema.type_params.clone(),
                type_args: subst_all(&schema.type_args),
            }),
            Type::Array(elem) => Type::Array(Box::new(elem.substitute(bindings))),
            Type::Optional(inner) => Type::Optional(Box::new(inner.substitute(bindings))),
            Type::Tuple(elems) => Type::Tuple(subst_all(elems)),
            Type::Union(members) => Type::Union(subst_all(members)),
            Type::Function(params, ret) => Type::Function(subst_all(params), Box::new(ret.substitute(bindings))),
            Type::Primitive(_) | Type::Enum { .. } | Type::Quantity(_) | Type::Never | Type::Unknown => self.clone(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        types_equal(self, other)
    }
}

fn all_equal(a: &[Type], b: &[Type]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| types_equal(x, y))
}

/// Structural type equality.
///
/// Schemas and enums compare by name (schema type arguments element-wise when both sides carry them), quantities by
/// dimensions, unions as sets, type variables by id.
pub fn types_equal(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Primitive(x), Type::Primitive(y)) => x == y,
        (Type::Schema(x), Type::Schema(y)) => {
            x.name == y.name
                && (x.type_args.is_empty() || y.type_args.is_empty() || all_equal(&x.type_args, &y.type_args))
        }
        (Type::Enum { name: x, .. }, Type::Enum { name: y, .. }) => x == y,
        (Type::Array(x), Type::Array(y)) | (Type::Optional(x), Type::Optional(y)) => types_equal(x, y),
        (Type::Quantity(u), Type::Quantity(v)) => units_equal(u, v),
        (Type::Tuple(xs), Type::Tuple(ys)) => all_equal(xs, ys),
        (Type::Union(xs), Type::Union(ys)) => {
            xs.iter().all(|x| ys.iter().any(|y| types_equal(x, y)))
                && ys.iter().all(|y| xs.iter().any(|x| types_equal(x, y)))
        }
        (Type::Function(p1, r1), Type::Function(p2, r2)) => all_equal(p1, p2) && types_equal(r1, r2),
        (Type::TypeVar { id: x, .. }, Type::TypeVar { id: y, .. }) => x == y,
        (Type::Never, Type::Never) | (Type::Unknown, Type::Unknown) => true,
        _ => false,
    }
}

/// Knobs for [`is_subtype_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtypeOptions {
    /// Treat `Int` as a subtype of `Float`.
    pub numeric_widening: bool,
}

/// The subtype relation used at assignment sites, with default options.
pub fn is_subtype(sub: &Type, sup: &Type) -> bool {
    is_subtype_with(sub, sup, SubtypeOptions::default())
}

/// The subtype relation.
///
/// ## Rules
/// - Reflexive; `Never` is below everything and everything is below `Unknown`.
/// - `T ⊑ U?` when `T ⊑ U`, and `T? ⊑ U?` when `T ⊑ U`. An optional is never below a non-optional.
/// - Schemas are nominal. Arrays are covariant.
/// - A union is below `X` when every member is; `X` is below a union when some member accepts it.
pub fn is_subtype_with(sub: &Type, sup: &Type, options: SubtypeOptions) -> bool {
    if types_equal(sub, sup) {
        return true;
    }
    match (sub, sup) {
        (Type::Never, _) | (_, Type::Unknown) => true,
        (Type::Union(members), _) => members.iter().all(|m| is_subtype_with(m, sup, options)),
        (_, Type::Union(members)) => members.iter().any(|m| is_subtype_with(sub, m, options)),
        (Type::Optional(a), Type::Optional(b)) => is_subtype_with(a, b, options),
        (Type::Optional(_), _) => false,
        (_, Type::Optional(b)) => is_subtype_with(sub, b, options),
        (Type::Array(a), Type::Array(b)) => is_subtype_with(a, b, options),
        (Type::Primitive(PrimitiveType::Int), Type::Primitive(PrimitiveType::Float)) => options.numeric_widening,
        _ => false,
    }
}

/// Render a type for diagnostics.
pub fn format_type(ty: &Type) -> String {
    ty.to_string()
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", t)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(id) => write!(f, "{}", primitives::as_str(*id)),
            Type::Schema(schema) => {
                write!(f, "{}", schema.name)?;
                if !schema.type_args.is_empty() {
                    write!(f, "<")?;
                    write_list(f, &schema.type_args, ", ")?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Enum { name, .. } => write!(f, "{}", name),
            Type::Array(elem) => write!(f, "[{}]", elem),
            Type::Optional(inner) => match inner.as_ref() {
                Type::Union(_) | Type::Function(..) => write!(f, "({})?", inner),
                _ => write!(f, "{}?", inner),
            },
            Type::Quantity(unit) => write!(f, "Quantity<{}>", unit),
            Type::Tuple(elems) => {
                write!(f, "(")?;
                write_list(f, elems, ", ")?;
                write!(f, ")")
            }
            Type::Union(members) => write_list(f, members, " | "),
            Type::Function(params, ret) => {
                write!(f, "(")?;
                write_list(f, params, ", ")?;
                write!(f, ") -> {}", ret)
            }
            Type::TypeVar { name, .. } => write!(f, "{}", name),
            Type::Never => write!(f, "Never"),
            Type::Unknown => write!(f, "Unknown"),
        }
    }
}
