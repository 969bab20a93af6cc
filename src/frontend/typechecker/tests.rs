//! Typechecker unit tests.

use super::*;
use crate::frontend::types::{format_type, is_subtype};
use metrica_syntax::ast::build::*;

fn errors_of(declarations: Vec<Declaration>) -> Vec<CompileError> {
    analyze(&program(declarations)).errors
}

fn messages(declarations: Vec<Declaration>) -> Vec<String> {
    errors_of(declarations).into_iter().map(|e| e.message).collect()
}

fn energy_units() -> Vec<Declaration> {
    vec![
        dimension("Energy"),
        dimension("Mass"),
        dimension("Time"),
        base_unit("kWh", "Energy"),
        base_unit("kg", "Mass"),
        base_unit("h", "Time"),
    ]
}

fn with(mut base: Vec<Declaration>, more: Vec<Declaration>) -> Vec<Declaration> {
    base.extend(more);
    base
}

/// A rule whose value carries a distinct span, so its inferred type can be read back.
fn spanned_rule(target: &str, value: Expr, start: usize) -> MappingRule {
    let mut r = rule(target, value);
    r.value.span = Span::new(start, start + 1);
    r
}

// ========================================
// Transform rules
// ========================================

#[test]
fn test_matching_fields_check() {
    let errs = errors_of(vec![
        schema("Person", vec![("name", string_ty()), ("age", int_ty())]),
        schema("PersonDTO", vec![("fullName", string_ty()), ("ageYears", int_ty())]),
        transform(
            "ToDto",
            schema_ty("Person"),
            schema_ty("PersonDTO"),
            vec![rule("fullName", path("$.name")), rule("ageYears", path("$.age"))],
        ),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_type_mismatch_names_both_types() {
    let msgs = messages(vec![
        schema("A", vec![("name", string_ty())]),
        schema("B", vec![("count", int_ty())]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("count", path("$.name"))]),
    ]);
    assert_eq!(msgs, vec!["Type mismatch: cannot assign 'String' to 'count' of type 'Int'"]);
}

#[test]
fn test_each_bad_rule_is_reported() {
    let msgs = messages(vec![
        schema("A", vec![("name", string_ty()), ("age", int_ty())]),
        schema("B", vec![("n", int_ty()), ("a", string_ty()), ("ok", int_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![
                rule("n", path("$.name")),
                rule("a", path("$.age")),
                rule("ok", path("$.age")),
            ],
        ),
    ]);
    assert_eq!(msgs.len(), 2);
    assert!(msgs[0].contains("'n'"));
    assert!(msgs[1].contains("'a'"));
}

#[test]
fn test_nested_target_path() {
    let errs = errors_of(vec![
        schema("Address", vec![("city", string_ty())]),
        schema("A", vec![("town", string_ty())]),
        schema("B", vec![("address", schema_ty("Address"))]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("address.city", path("$.town"))]),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_unknown_target_field() {
    let msgs = messages(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("y", int_ty())]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("z", path("$.x"))]),
    ]);
    assert_eq!(msgs, vec!["Type 'B' has no field 'z'"]);
}

#[test]
fn test_duplicate_target_assignment() {
    let msgs = messages(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("y", int_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![rule("y", path("$.x")), rule("y", int_lit(1))],
        ),
    ]);
    assert_eq!(msgs, vec!["Target field 'y' is assigned more than once"]);
}

#[test]
fn test_undeclared_source_schema() {
    let errs = errors_of(vec![
        schema("B", vec![("y", int_ty())]),
        transform("T", schema_ty("Missing"), schema_ty("B"), vec![rule("y", int_lit(1))]),
    ]);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].is_type_error());
    assert_eq!(errs[0].message, "Undeclared schema or enum 'Missing'");
}

#[test]
fn test_errors_do_not_block_other_declarations() {
    let msgs = messages(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("y", string_ty())]),
        transform("Broken", schema_ty("Nope"), schema_ty("B"), vec![]),
        transform("Bad", schema_ty("A"), schema_ty("B"), vec![rule("y", path("$.x"))]),
    ]);
    assert_eq!(msgs.len(), 2);
    assert!(msgs[0].contains("'Nope'"));
    assert!(msgs[1].starts_with("Type mismatch"));
}

// ========================================
// Paths and optional chaining
// ========================================

#[test]
fn test_optional_chaining_infers_optional() {
    let prog = program(vec![
        schema("Manager", vec![("name", string_ty())]),
        schema("Employee", vec![("manager", optional_ty(schema_ty("Manager")))]),
        schema("Out", vec![("bossName", optional_ty(string_ty()))]),
        transform(
            "T",
            schema_ty("Employee"),
            schema_ty("Out"),
            vec![spanned_rule("bossName", path("$.manager?.name"), 40)],
        ),
    ]);
    let analysis = analyze(&prog);
    assert!(analysis.is_ok(), "{:?}", analysis.errors);
    let ty = analysis.type_info.expr_type(Span::new(40, 41)).unwrap();
    assert_eq!(format_type(ty), "String?");
}

#[test]
fn test_optional_chain_cannot_flow_into_required_field() {
    let msgs = messages(vec![
        schema("Manager", vec![("name", string_ty())]),
        schema("Employee", vec![("manager", optional_ty(schema_ty("Manager")))]),
        schema("Out", vec![("bossName", string_ty())]),
        transform(
            "T",
            schema_ty("Employee"),
            schema_ty("Out"),
            vec![rule("bossName", path("$.manager?.name"))],
        ),
    ]);
    assert_eq!(msgs, vec!["Type mismatch: cannot assign 'String?' to 'bossName' of type 'String'"]);
}

#[test]
fn test_field_access_through_optional_requires_question_dot() {
    let msgs = messages(vec![
        schema("Manager", vec![("name", string_ty())]),
        schema("Employee", vec![("manager", optional_ty(schema_ty("Manager")))]),
        schema("Out", vec![("bossName", optional_ty(string_ty()))]),
        transform(
            "T",
            schema_ty("Employee"),
            schema_ty("Out"),
            vec![rule("bossName", path("$.manager.name"))],
        ),
    ]);
    assert_eq!(msgs, vec!["Cannot access field 'name' on non-schema type 'Manager?'"]);
}

#[test]
fn test_self_referential_schema() {
    let errs = errors_of(vec![
        schema(
            "Employee",
            vec![("name", string_ty()), ("manager", optional_ty(schema_ty("Employee")))],
        ),
        schema("Out", vec![("grandBoss", optional_ty(string_ty()))]),
        transform(
            "T",
            schema_ty("Employee"),
            schema_ty("Out"),
            vec![rule("grandBoss", path("$.manager?.manager?.name"))],
        ),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_index_step() {
    let mut first_sku = index(path("$.lines"), int_lit(0));
    if let Expr::Path(p) = &mut first_sku {
        p.segments.push(sp(PathSegment::Field {
            name: "sku".to_string(),
            optional: false,
        }));
    }
    let msgs = messages(vec![
        schema("Line", vec![("sku", string_ty())]),
        schema("Order", vec![("lines", array_ty(schema_ty("Line"))), ("id", string_ty())]),
        schema("Out", vec![("first", string_ty()), ("bad", string_ty())]),
        transform(
            "T",
            schema_ty("Order"),
            schema_ty("Out"),
            vec![
                rule("first", first_sku),
                rule("bad", index(path("$.id"), int_lit(0))),
            ],
        ),
    ]);
    assert_eq!(msgs, vec!["Cannot index non-array type 'String'"]);
}

#[test]
fn test_unknown_field_on_source() {
    let msgs = messages(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("y", int_ty())]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("y", path("$.missing"))]),
    ]);
    assert_eq!(msgs, vec!["Type 'A' has no field 'missing'"]);
}

#[test]
fn test_unknown_root_variable() {
    let msgs = messages(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("y", int_ty())]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("y", path("other.x"))]),
    ]);
    assert_eq!(msgs, vec!["Unknown name 'other'"]);
}

#[test]
fn test_multi_source_transform_binds_named_sources() {
    let errs = errors_of(vec![
        schema("Customer", vec![("name", string_ty())]),
        schema("Order", vec![("total", float_ty())]),
        schema("Invoice", vec![("customer", string_ty()), ("amount", float_ty())]),
        transform_multi(
            "MakeInvoice",
            vec![("c", schema_ty("Customer")), ("o", schema_ty("Order"))],
            schema_ty("Invoice"),
            vec![rule("customer", path("c.name")), rule("amount", path("o.total"))],
        ),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_named_sources_do_not_leak_between_transforms() {
    let msgs = messages(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("y", int_ty())]),
        transform_multi("First", vec![("a", schema_ty("A"))], schema_ty("B"), vec![rule("y", path("a.x"))]),
        transform("Second", schema_ty("A"), schema_ty("B"), vec![rule("y", path("a.x"))]),
    ]);
    assert_eq!(msgs, vec!["Unknown name 'a'"]);
}

// ========================================
// Schemas
// ========================================

#[test]
fn test_inherited_fields_are_visible() {
    let prog = program(vec![
        schema("Person", vec![("name", string_ty()), ("age", int_ty())]),
        schema_extends("Employee", "Person", vec![("age", float_ty()), ("salary", int_ty())]),
        schema("Out", vec![("n", string_ty()), ("a", float_ty())]),
        transform(
            "T",
            schema_ty("Employee"),
            schema_ty("Out"),
            vec![rule("n", path("$.name")), rule("a", path("$.age"))],
        ),
    ]);
    let analysis = analyze(&prog);
    assert!(analysis.is_ok(), "{:?}", analysis.errors);

    let fields: Vec<_> = analysis
        .symbols
        .schema("Employee")
        .unwrap()
        .schema
        .fields
        .iter()
        .map(|(n, t)| format!("{n}: {t}"))
        .collect();
    assert_eq!(fields, vec!["name: String", "age: Float", "salary: Int"]);
}

#[test]
fn test_parent_declared_after_child() {
    let errs = errors_of(vec![
        schema_extends("Employee", "Person", vec![]),
        schema("Person", vec![("name", string_ty())]),
        schema("Out", vec![("n", string_ty())]),
        transform("T", schema_ty("Employee"), schema_ty("Out"), vec![rule("n", path("$.name"))]),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_cyclic_inheritance_does_not_hang() {
    let errs = errors_of(vec![
        schema_extends("A", "B", vec![("a", int_ty())]),
        schema_extends("B", "A", vec![("b", int_ty())]),
    ]);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].is_resolve_error());
}

#[test]
fn test_generic_schema_instantiation() {
    let errs = errors_of(vec![
        schema("Person", vec![("name", string_ty())]),
        generic_schema("Page", &["T"], vec![("items", array_ty(schema_ty("T"))), ("total", int_ty())]),
        schema("Out", vec![("names", array_ty(string_ty())), ("count", int_ty())]),
        transform(
            "T",
            generic_ty("Page", vec![schema_ty("Person")]),
            schema_ty("Out"),
            vec![
                rule("names", aggregate("collect", path("$.items"), Some(lambda(&["p"], path("p.name"))))),
                rule("count", path("$.total")),
            ],
        ),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_generic_arity_is_checked() {
    let msgs = messages(vec![
        generic_schema("Page", &["T"], vec![("items", array_ty(schema_ty("T")))]),
        schema("Holder", vec![("page", schema_ty("Page"))]),
    ]);
    assert_eq!(msgs, vec!["'Page' expects 1 type argument(s), found 0"]);
}

#[test]
fn test_field_of_undeclared_type_reported_per_field() {
    let msgs = messages(vec![schema(
        "A",
        vec![("x", schema_ty("Nope")), ("y", schema_ty("AlsoNope")), ("z", int_ty())],
    )]);
    assert_eq!(
        msgs,
        vec!["Undeclared schema or enum 'Nope'", "Undeclared schema or enum 'AlsoNope'"]
    );
}

#[test]
fn test_non_type_symbol_in_type_position() {
    let msgs = messages(vec![dimension("Energy"), schema("A", vec![("x", schema_ty("Energy"))])]);
    assert_eq!(msgs, vec!["'Energy' is a dimension, not a schema or enum"]);
}

// ========================================
// Units and quantities
// ========================================

#[test]
fn test_quantity_addition_with_same_unit() {
    let errs = errors_of(with(
        energy_units(),
        vec![
            schema("A", vec![("x", quantity_ty(unit_ref("kWh"))), ("y", quantity_ty(unit_ref("kWh")))]),
            schema("B", vec![("z", quantity_ty(unit_ref("kWh")))]),
            transform(
                "T",
                schema_ty("A"),
                schema_ty("B"),
                vec![rule("z", binary(path("$.x"), "+", path("$.y")))],
            ),
        ],
    ));
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_quantity_addition_unit_mismatch() {
    let errs = errors_of(with(
        energy_units(),
        vec![
            schema("A", vec![("x", quantity_ty(unit_ref("kWh"))), ("y", quantity_ty(unit_ref("kg")))]),
            schema("B", vec![("z", quantity_ty(unit_ref("kWh")))]),
            transform(
                "T",
                schema_ty("A"),
                schema_ty("B"),
                vec![rule("z", binary(path("$.x"), "+", path("$.y")))],
            ),
        ],
    ));
    assert_eq!(errs.len(), 1);
    assert!(errs[0].is_type_error());
    assert!(errs[0].message.contains("Unit mismatch"), "{}", errs[0].message);
}

#[test]
fn test_quantity_division_derives_unit() {
    let errs = errors_of(with(
        energy_units(),
        vec![
            schema("Reading", vec![("energy", quantity_ty(unit_ref("kWh"))), ("hours", quantity_ty(unit_ref("h")))]),
            schema(
                "Out",
                vec![
                    ("power", quantity_ty(unit_div(unit_ref("kWh"), unit_ref("h")))),
                    ("wrong", quantity_ty(unit_ref("kWh"))),
                ],
            ),
            transform(
                "T",
                schema_ty("Reading"),
                schema_ty("Out"),
                vec![
                    rule("power", binary(path("$.energy"), "/", path("$.hours"))),
                    rule("wrong", binary(path("$.energy"), "*", path("$.hours"))),
                ],
            ),
        ],
    ));
    assert_eq!(errs.len(), 1);
    assert_eq!(
        errs[0].message,
        "Type mismatch: cannot assign 'Quantity<kWh*h>' to 'wrong' of type 'Quantity<kWh>'"
    );
}

#[test]
fn test_units_are_order_independent() {
    let prog = program(vec![
        derived_unit("kW", None, unit_div(unit_ref("kWh"), unit_ref("h"))),
        base_unit("kWh", "Energy"),
        base_unit("h", "Time"),
        dimension("Energy"),
        dimension("Time"),
        derived_unit("MW", Some(1000.0), unit_ref("kW")),
    ]);
    let analysis = analyze(&prog);
    assert!(analysis.is_ok(), "{:?}", analysis.errors);
    let kw = analysis.type_info.unit("kW").unwrap();
    assert_eq!(kw.exponent("Energy"), 1);
    assert_eq!(kw.exponent("Time"), -1);
    assert_eq!(kw.to_string(), "kW");
    let mw = analysis.type_info.unit("MW").unwrap();
    assert_eq!(mw.scale(), 1000.0);
    assert!(analysis.symbols.unit("MW").unwrap().unit.is_some());
}

#[test]
fn test_plain_unit_is_dimensionless() {
    let analysis = analyze(&program(vec![plain_unit("pct")]));
    assert!(analysis.is_ok());
    assert!(analysis.type_info.unit("pct").unwrap().is_dimensionless());
}

#[test]
fn test_unit_cycle_is_reported_once() {
    let msgs = messages(vec![
        derived_unit("a", None, unit_ref("b")),
        derived_unit("b", None, unit_pow(unit_ref("a"), 2)),
    ]);
    assert_eq!(msgs, vec!["Cyclic unit definition: a -> b -> a"]);
}

#[test]
fn test_undeclared_unit_and_dimension() {
    let msgs = messages(vec![
        base_unit("kWh", "Energy"),
        schema("A", vec![("x", quantity_ty(unit_ref("MWh")))]),
    ]);
    assert_eq!(msgs, vec!["Undeclared dimension 'Energy'", "Undeclared unit 'MWh'"]);
}

#[test]
fn test_broken_unit_reported_once_across_uses() {
    let msgs = messages(vec![
        derived_unit("bad", None, unit_ref("nope")),
        schema("A", vec![("x", quantity_ty(unit_ref("bad")))]),
        schema("B", vec![("y", quantity_ty(unit_ref("bad")))]),
    ]);
    assert_eq!(msgs, vec!["Undeclared unit 'nope'"]);
}

fn length_units() -> Vec<Declaration> {
    vec![
        dimension("Length"),
        base_unit("m", "Length"),
        derived_unit("big", None, unit_pow(unit_ref("m"), i32::MAX)),
    ]
}

#[test]
fn test_unit_power_overflow_is_an_error() {
    let msgs = messages(vec![
        dimension("Length"),
        base_unit("m", "Length"),
        derived_unit("m2", None, unit_pow(unit_ref("m"), 2)),
        derived_unit("huge", None, unit_pow(unit_ref("m2"), i32::MAX)),
    ]);
    assert_eq!(msgs, vec!["Dimension exponent out of range in unit 'm2^2147483647'"]);
}

#[test]
fn test_unit_product_overflow_is_an_error() {
    let analysis = analyze(&program(with(
        length_units(),
        vec![
            derived_unit("bigger", None, unit_mul(unit_ref("big"), unit_ref("m"))),
            derived_unit("smaller", None, unit_div(unit_ref("big"), unit_ref("m"))),
        ],
    )));
    let msgs: Vec<_> = analysis.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(msgs, vec!["Dimension exponent out of range in unit 'big*m'"]);
    assert!(analysis.errors[0].is_type_error());
    assert_eq!(analysis.type_info.unit("big").unwrap().exponent("Length"), i32::MAX);
    assert_eq!(analysis.type_info.unit("smaller").unwrap().exponent("Length"), i32::MAX - 1);
    assert!(analysis.type_info.unit("bigger").is_none());
}

#[test]
fn test_quantity_product_overflow_is_an_error() {
    let msgs = messages(with(
        length_units(),
        vec![
            schema("A", vec![("x", quantity_ty(unit_ref("big"))), ("y", quantity_ty(unit_ref("m")))]),
            schema("B", vec![("z", quantity_ty(unit_ref("m")))]),
            transform(
                "T",
                schema_ty("A"),
                schema_ty("B"),
                vec![rule("z", binary(path("$.x"), "*", path("$.y")))],
            ),
        ],
    ));
    assert_eq!(msgs, vec!["Dimension exponent out of range in unit 'big*m'"]);
}

#[test]
fn test_unit_scale_must_be_positive_and_finite() {
    let msgs = messages(vec![
        dimension("Length"),
        base_unit("m", "Length"),
        derived_unit("zero", Some(0.0), unit_ref("m")),
        derived_unit("negative", Some(-1000.0), unit_ref("m")),
        derived_unit("nan", Some(f64::NAN), unit_ref("m")),
        derived_unit("km", Some(1000.0), unit_ref("m")),
    ]);
    assert_eq!(
        msgs,
        vec![
            "Unit 'zero' has scale 0, but a scale must be a positive finite number",
            "Unit 'negative' has scale -1000, but a scale must be a positive finite number",
            "Unit 'nan' has scale NaN, but a scale must be a positive finite number",
        ]
    );
}

// ========================================
// Operators and control flow
// ========================================

#[test]
fn test_comparison_and_logic_yield_bool() {
    let errs = errors_of(vec![
        schema("A", vec![("x", int_ty()), ("y", int_ty())]),
        schema("B", vec![("flag", bool_ty()), ("neg", int_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![
                rule(
                    "flag",
                    binary(
                        binary(path("$.x"), "<", path("$.y")),
                        "&&",
                        not(binary(path("$.x"), "==", int_lit(0))),
                    ),
                ),
                rule("neg", neg(path("$.x"))),
            ],
        ),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_coalesce_takes_right_type() {
    let errs = errors_of(vec![
        schema("A", vec![("nick", optional_ty(string_ty()))]),
        schema("B", vec![("name", string_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![rule("name", binary(path("$.nick"), "??", str_lit("anonymous")))],
        ),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_if_with_different_branches_is_union() {
    let msgs = messages(vec![
        schema("A", vec![("ok", bool_ty()), ("name", string_ty()), ("age", int_ty())]),
        schema("B", vec![("v", string_ty()), ("w", union_ty(vec![string_ty(), int_ty()]))]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![
                rule("v", if_expr(path("$.ok"), path("$.name"), path("$.age"))),
                rule("w", if_expr(path("$.ok"), path("$.name"), path("$.age"))),
            ],
        ),
    ]);
    assert_eq!(msgs, vec!["Type mismatch: cannot assign 'String | Int' to 'v' of type 'String'"]);
}

#[test]
fn test_null_flows_into_optional() {
    let errs = errors_of(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("maybe", optional_ty(string_ty()))]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("maybe", null())]),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_match_on_enum() {
    let msgs = messages(vec![
        enum_decl("Status", &["Active", "Retired"]),
        schema("A", vec![("status", enum_ty("Status"))]),
        schema("B", vec![("label", string_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![
                rule(
                    "label",
                    match_expr(
                        path("$.status"),
                        vec![
                            (variant_pat("Status", "Active"), str_lit("active")),
                            (Pattern::Wildcard, str_lit("other")),
                        ],
                    ),
                ),
            ],
        ),
        transform(
            "Bad",
            schema_ty("A"),
            schema_ty("B"),
            vec![rule(
                "label",
                match_expr(path("$.status"), vec![(variant_pat("Status", "Fired"), str_lit("x"))]),
            )],
        ),
    ]);
    assert_eq!(msgs, vec!["Enum 'Status' has no variant 'Fired'"]);
}

#[test]
fn test_match_arms_fold_into_union() {
    let msgs = messages(vec![
        enum_decl("Status", &["Active", "Retired"]),
        schema("A", vec![("status", enum_ty("Status"))]),
        schema("B", vec![("label", string_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![rule(
                "label",
                match_expr(
                    path("$.status"),
                    vec![
                        (variant_pat("Status", "Active"), str_lit("active")),
                        (variant_pat("Status", "Retired"), int_lit(0)),
                    ],
                ),
            )],
        ),
    ]);
    assert_eq!(msgs, vec!["Type mismatch: cannot assign 'String | Int' to 'label' of type 'String'"]);
}

#[test]
fn test_standalone_lambda_is_function() {
    let prog = program(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("f", int_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![spanned_rule("f", Expr::Lambda(lambda(&["v"], path("v"))), 7)],
        ),
    ]);
    let analysis = analyze(&prog);
    let ty = analysis.type_info.expr_type(Span::new(7, 8)).unwrap();
    assert_eq!(format_type(ty), "(Unknown) -> Unknown");
    assert_eq!(analysis.errors.len(), 1);
}

// ========================================
// Aggregates
// ========================================

fn order_decls() -> Vec<Declaration> {
    with(
        energy_units(),
        vec![
            schema("Line", vec![("name", string_ty()), ("energy", quantity_ty(unit_ref("kWh")))]),
            schema("Order", vec![("lines", array_ty(schema_ty("Line"))), ("readings", array_ty(quantity_ty(unit_ref("kWh"))))]),
        ],
    )
}

#[test]
fn test_sum_of_quantities_keeps_unit() {
    let errs = errors_of(with(
        order_decls(),
        vec![
            schema("Out", vec![("total", quantity_ty(unit_ref("kWh"))), ("direct", quantity_ty(unit_ref("kWh")))]),
            transform(
                "T",
                schema_ty("Order"),
                schema_ty("Out"),
                vec![
                    rule("total", aggregate("sum", path("$.lines"), Some(lambda(&["l"], path("l.energy"))))),
                    rule("direct", aggregate("sum", path("$.readings"), Some(lambda(&["x"], path("x"))))),
                ],
            ),
        ],
    ));
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_collect_count_filter_result_types() {
    let errs = errors_of(with(
        order_decls(),
        vec![
            schema(
                "Out",
                vec![
                    ("names", array_ty(string_ty())),
                    ("n", int_ty()),
                    ("kept", array_ty(schema_ty("Line"))),
                    ("peak", quantity_ty(unit_ref("kWh"))),
                ],
            ),
            transform(
                "T",
                schema_ty("Order"),
                schema_ty("Out"),
                vec![
                    rule("names", aggregate("collect", path("$.lines"), Some(lambda(&["l"], path("l.name"))))),
                    rule("n", aggregate("count", path("$.lines"), None)),
                    rule(
                        "kept",
                        aggregate(
                            "filter",
                            path("$.lines"),
                            Some(lambda(&["l"], binary(path("l.name"), "!=", str_lit("")))),
                        ),
                    ),
                    rule("peak", aggregate("max", path("$.readings"), None)),
                ],
            ),
        ],
    ));
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_aggregate_requires_array_source() {
    let msgs = messages(vec![
        schema("A", vec![("x", int_ty())]),
        schema("B", vec![("y", int_ty())]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("y", aggregate("sum", path("$.x"), None))]),
    ]);
    assert_eq!(msgs, vec!["'sum' expects an array source, found 'Int'"]);
}

#[test]
fn test_aggregate_lambda_takes_one_parameter() {
    let msgs = messages(vec![
        schema("A", vec![("xs", array_ty(int_ty()))]),
        schema("B", vec![("y", int_ty())]),
        transform(
            "T",
            schema_ty("A"),
            schema_ty("B"),
            vec![rule("y", aggregate("sum", path("$.xs"), Some(lambda(&["a", "b"], path("a")))))],
        ),
    ]);
    assert_eq!(msgs, vec!["The lambda passed to 'sum' takes exactly one parameter, found 2"]);
}

#[test]
fn test_lambda_parameter_shadows_source_name() {
    let errs = errors_of(vec![
        schema("A", vec![("xs", array_ty(int_ty())), ("name", string_ty())]),
        schema("B", vec![("total", int_ty())]),
        transform_multi(
            "T",
            vec![("x", schema_ty("A"))],
            schema_ty("B"),
            vec![rule("total", aggregate("sum", path("x.xs"), Some(lambda(&["x"], path("x")))))],
        ),
    ]);
    assert!(errs.is_empty(), "{errs:?}");
}

// ========================================
// Lookups
// ========================================

fn tariff_decls() -> Vec<Declaration> {
    with(
        energy_units(),
        vec![
            dimension("Money"),
            base_unit("EUR", "Money"),
            lookup(
                "Tariffs",
                vec![string_ty()],
                quantity_ty(unit_div(unit_ref("EUR"), unit_ref("kWh"))),
            ),
            schema("Meter", vec![("country", string_ty()), ("zone", int_ty())]),
            schema("Priced", vec![("rate", quantity_ty(unit_div(unit_ref("EUR"), unit_ref("kWh"))))]),
        ],
    )
}

#[test]
fn test_lookup_yields_value_type() {
    let errs = errors_of(with(
        tariff_decls(),
        vec![transform(
            "T",
            schema_ty("Meter"),
            schema_ty("Priced"),
            vec![rule("rate", lookup_call("Tariffs", vec![path("$.country")]))],
        )],
    ));
    assert!(errs.is_empty(), "{errs:?}");
}

#[test]
fn test_lookup_table_must_exist() {
    let msgs = messages(with(
        tariff_decls(),
        vec![transform(
            "T",
            schema_ty("Meter"),
            schema_ty("Priced"),
            vec![rule("rate", lookup_call("Meter", vec![path("$.country")]))],
        )],
    ));
    assert_eq!(msgs, vec!["Lookup table 'Meter' not found"]);
}

#[test]
fn test_lookup_keys_unchecked_by_default() {
    let decls = with(
        tariff_decls(),
        vec![transform(
            "T",
            schema_ty("Meter"),
            schema_ty("Priced"),
            vec![rule("rate", lookup_call("Tariffs", vec![path("$.zone")]))],
        )],
    );
    assert!(errors_of(decls.clone()).is_empty());

    let strict = analyze_with_config(&program(decls), CheckerConfig::new().with_strict_lookup_keys(true));
    let msgs: Vec<_> = strict.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(msgs, vec!["Lookup 'Tariffs' key mismatch: expected 'String', found 'Int'"]);
}

#[test]
fn test_strict_lookup_key_arity() {
    let decls = with(
        tariff_decls(),
        vec![transform(
            "T",
            schema_ty("Meter"),
            schema_ty("Priced"),
            vec![rule("rate", lookup_call("Tariffs", vec![path("$.country"), path("$.zone")]))],
        )],
    );
    let strict = analyze_with_config(&program(decls), CheckerConfig::new().with_strict_lookup_keys(true));
    assert_eq!(strict.errors.len(), 1);
    assert_eq!(strict.errors[0].message, "Lookup 'Tariffs' takes 1 key(s), found 2");
}

// ========================================
// Pipelines
// ========================================

fn pipeline_decls(steps: &[&str]) -> Vec<Declaration> {
    vec![
        schema("Raw", vec![("v", int_ty())]),
        schema("Clean", vec![("v", int_ty())]),
        schema("Report", vec![("v", int_ty())]),
        transform("Normalize", schema_ty("Raw"), schema_ty("Clean"), vec![rule("v", path("$.v"))]),
        transform("Summarize", schema_ty("Clean"), schema_ty("Report"), vec![rule("v", path("$.v"))]),
        pipeline("Ingest", steps),
    ]
}

#[test]
fn test_pipeline_steps_chain() {
    let strict = analyze_with_config(
        &program(pipeline_decls(&["Normalize", "Summarize"])),
        CheckerConfig::new().with_pipeline_chaining(true),
    );
    assert!(strict.is_ok(), "{:?}", strict.errors);
}

#[test]
fn test_pipeline_step_mismatch() {
    // Chaining is opt-in; by default only the steps themselves are checked.
    assert!(errors_of(pipeline_decls(&["Summarize", "Normalize"])).is_empty());

    let strict = analyze_with_config(
        &program(pipeline_decls(&["Summarize", "Normalize"])),
        CheckerConfig::new().with_pipeline_chaining(true),
    );
    let msgs: Vec<_> = strict.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        msgs,
        vec!["Pipeline step 'Summarize' produces 'Report' but 'Normalize' expects 'Raw'"]
    );
}

#[test]
fn test_pipeline_steps_must_be_transforms() {
    let msgs = messages(pipeline_decls(&["Normalize", "Raw", "Missing"]));
    assert_eq!(
        msgs,
        vec![
            "Pipeline step 'Raw' is a schema, not a transform",
            "Pipeline step 'Missing' is not a declared transform",
        ]
    );
}

// ========================================
// Config and analysis output
// ========================================

#[test]
fn test_numeric_widening_is_opt_in() {
    let decls = vec![
        schema("A", vec![("n", int_ty())]),
        schema("B", vec![("f", float_ty())]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![rule("f", path("$.n"))]),
    ];
    assert_eq!(errors_of(decls.clone()).len(), 1);
    let widened = analyze_with_config(&program(decls), CheckerConfig::new().with_numeric_widening(true));
    assert!(widened.is_ok(), "{:?}", widened.errors);
}

#[test]
fn test_check_program_reports_and_resets() {
    let bad = program(vec![schema("A", vec![]), schema("A", vec![])]);
    let good = program(vec![schema("A", vec![])]);
    let mut checker = TypeChecker::new();
    assert_eq!(checker.check_program(&bad).unwrap_err().len(), 1);
    assert!(checker.check_program(&good).is_ok());
    assert!(checker.symbols().schema("A").is_some());
}

#[test]
fn test_transform_symbol_gets_concrete_types() {
    let analysis = analyze(&program(vec![
        schema("A", vec![]),
        schema("B", vec![]),
        transform("T", schema_ty("A"), schema_ty("B"), vec![]),
    ]));
    let info = analysis.symbols.transform("T").unwrap();
    assert_eq!(info.source_type(), Type::schema("A"));
    assert!(is_subtype(&info.target, &Type::schema("B")));
}
