//! Property-based tests for the Metrica semantic core
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

mod common;

use common::check_decls;
use metrica::ast::build::*;
use metrica::types::{SubtypeOptions, Type, format_type, is_subtype, is_subtype_with};
use metrica_core::units::Unit;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_leaf() -> impl Strategy<Value = Type> {
    prop_oneof![
        Just(Type::STRING),
        Just(Type::INT),
        Just(Type::FLOAT),
        Just(Type::BOOL),
        Just(Type::Never),
        Just(Type::Unknown),
        prop::sample::select(vec!["Person", "Order", "Meter"]).prop_map(Type::schema),
        prop::sample::select(vec!["Energy", "Mass", "Time"]).prop_map(|d| Type::Quantity(Unit::base(d))),
    ]
}

fn arb_type() -> impl Strategy<Value = Type> {
    arb_leaf().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(Type::array),
            inner.clone().prop_map(Type::optional),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Type::Tuple),
            prop::collection::vec(inner, 2..4).prop_map(Type::union),
        ]
    })
}

// =============================================================================
// Subtype Properties
// =============================================================================

proptest! {
    /// Property: every type is a subtype of itself
    #[test]
    fn subtype_is_reflexive(t in arb_type()) {
        prop_assert!(is_subtype(&t, &t), "{} is not a subtype of itself", format_type(&t));
    }

    /// Property: Never is the bottom and Unknown the top
    #[test]
    fn never_is_bottom_unknown_is_top(t in arb_type()) {
        prop_assert!(is_subtype(&Type::Never, &t));
        prop_assert!(is_subtype(&t, &Type::Unknown));
    }

    /// Property: a value may always flow into an optional slot of its own type
    #[test]
    fn type_is_subtype_of_its_optional(t in arb_type()) {
        prop_assert!(is_subtype(&t, &Type::optional(t.clone())));
    }

    /// Property: optional never nests
    #[test]
    fn optional_is_idempotent(t in arb_type()) {
        let once = Type::optional(t);
        prop_assert_eq!(Type::optional(once.clone()), once);
    }

    /// Property: each member is a subtype of the union
    #[test]
    fn members_are_subtypes_of_union(members in prop::collection::vec(arb_type(), 1..4)) {
        let union = Type::union(members.clone());
        for m in &members {
            prop_assert!(is_subtype(m, &union), "{} not in {}", format_type(m), format_type(&union));
        }
    }

    /// Property: arrays are covariant
    #[test]
    fn arrays_are_covariant(a in arb_type(), b in arb_type()) {
        if is_subtype(&a, &b) {
            prop_assert!(is_subtype(&Type::array(a), &Type::array(b)));
        }
    }

    /// Property: widening only ever adds subtype pairs
    #[test]
    fn widening_is_monotone(a in arb_type(), b in arb_type()) {
        if is_subtype(&a, &b) {
            let opts = SubtypeOptions { numeric_widening: true };
            prop_assert!(is_subtype_with(&a, &b, opts));
        }
    }
}

// =============================================================================
// Checker Properties
// =============================================================================

fn dims() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["Energy", "Mass", "Time", "Length"])
}

fn quantity_program(left_dim: &str, right_dim: &str) -> Vec<metrica::ast::Declaration> {
    vec![
        dimension("Energy"),
        dimension("Mass"),
        dimension("Time"),
        dimension("Length"),
        base_unit("u_Energy", "Energy"),
        base_unit("u_Mass", "Mass"),
        base_unit("u_Time", "Time"),
        base_unit("u_Length", "Length"),
        schema(
            "A",
            vec![
                ("a", quantity_ty(unit_ref(&format!("u_{left_dim}")))),
                ("b", quantity_ty(unit_ref(&format!("u_{right_dim}")))),
            ],
        ),
        schema("B", vec![("total", quantity_ty(unit_ref(&format!("u_{left_dim}"))))]),
        transform(
            "Sum",
            schema_ty("A"),
            schema_ty("B"),
            vec![rule("total", binary(path("$.a"), "+", path("$.b")))],
        ),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: addition checks exactly when both operands share a dimension
    #[test]
    fn quantity_addition_requires_same_dimension(left in dims(), right in dims()) {
        let errors = check_decls(quantity_program(left, right));
        if left == right {
            prop_assert!(errors.is_empty(), "{:?}", errors);
        } else {
            prop_assert_eq!(errors.len(), 1);
            prop_assert!(errors[0].message.starts_with("Unit mismatch"));
        }
    }

    /// Property: copying every field of a schema into an identical schema always checks
    #[test]
    fn identity_transform_checks(kinds in prop::collection::vec(0usize..4, 1..8)) {
        let fields: Vec<(String, metrica::ast::TypeExpr)> = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let ty = match k {
                    0 => string_ty(),
                    1 => int_ty(),
                    2 => optional_ty(float_ty()),
                    _ => array_ty(bool_ty()),
                };
                (format!("f{i}"), ty)
            })
            .collect();
        let borrowed: Vec<(&str, metrica::ast::TypeExpr)> =
            fields.iter().map(|(n, t)| (n.as_str(), t.clone())).collect();
        let rules = fields
            .iter()
            .map(|(n, _)| rule(n, path(&format!("$.{n}"))))
            .collect();

        let errors = check_decls(vec![
            schema("In", borrowed.clone()),
            schema("Out", borrowed),
            transform("Copy", schema_ty("In"), schema_ty("Out"), rules),
        ]);
        prop_assert!(errors.is_empty(), "{:?}", errors);
    }
}
