use mongoexpr::{
    document_to_json, to_json, BinaryOp, CompileError, Compiler, Converters, Error, Expr,
    ExpressionParser, ParseError, UnaryOp, Value,
};
use serde_json::json;

fn compile(source: &str) -> serde_json::Value {
    let compiler = Compiler::new();
    document_to_json(&compiler.compile(source).unwrap())
}

fn compile_filter(source: &str) -> mongoexpr::Document {
    let compiler = Compiler::new();
    compiler.compile(source).unwrap()
}

fn compile_err(source: &str) -> Error {
    let compiler = Compiler::new();
    compiler.compile(source).unwrap_err()
}

// ============================================================================
// Section: Equality
// ============================================================================

#[test]
fn test_equality_field_left() {
    assert_eq!(compile("a == 3"), json!({"a": 3}));
}

#[test]
fn test_equality_field_right() {
    assert_eq!(compile("3 == a"), json!({"a": 3}));
}

#[test]
fn test_strict_equality() {
    assert_eq!(compile(r#"a === "ciao""#), json!({"a": "ciao"}));
}

#[test]
fn test_equality_bracket_path() {
    assert_eq!(compile(r#"a["b"]["c"] == "ciao""#), json!({"a.b.c": "ciao"}));
}

#[test]
fn test_equality_dot_path() {
    assert_eq!(compile(r#"a.b.c == "ciao""#), json!({"a.b.c": "ciao"}));
}

#[test]
fn test_equality_numeric_index_path() {
    assert_eq!(compile(r#"a[1] == "ciao""#), json!({"a.1": "ciao"}));
}

#[test]
fn test_equality_boolean_literal() {
    assert_eq!(compile("active == true"), json!({"active": true}));
}

#[test]
fn test_equality_null_literal() {
    // null is an ordinary literal, not the undefined marker
    assert_eq!(compile("a == null"), json!({"a": null}));
}

#[test]
fn test_equality_array_literal() {
    assert_eq!(compile("a == [1, 2, 3]"), json!({"a": [1, 2, 3]}));
}

#[test]
fn test_equality_single_quoted_string() {
    assert_eq!(compile("a == 'ciao'"), json!({"a": "ciao"}));
}

// ============================================================================
// Section: Relational comparisons
// ============================================================================

#[test]
fn test_greater_than() {
    assert_eq!(compile("a > 3"), json!({"a": {"$gt": 3}}));
}

#[test]
fn test_less_than() {
    assert_eq!(compile("a < 45"), json!({"a": {"$lt": 45}}));
}

#[test]
fn test_greater_equal() {
    assert_eq!(compile("a >= 3"), json!({"a": {"$gte": 3}}));
}

#[test]
fn test_less_equal() {
    assert_eq!(compile("a <= 3"), json!({"a": {"$lte": 3}}));
}

#[test]
fn test_inverted_greater_becomes_less() {
    // The field keeps its role; the operator flips around it.
    assert_eq!(compile("3 > a"), json!({"a": {"$lt": 3}}));
}

#[test]
fn test_inverted_less_becomes_greater() {
    assert_eq!(compile("3 < a"), json!({"a": {"$gt": 3}}));
}

#[test]
fn test_inverted_less_equal() {
    assert_eq!(compile("45 >= a"), json!({"a": {"$lte": 45}}));
}

#[test]
fn test_relational_on_member_path() {
    assert_eq!(compile("user.age >= 21"), json!({"user.age": {"$gte": 21}}));
}

#[test]
fn test_relational_float_bound() {
    assert_eq!(compile("price < 9.99"), json!({"price": {"$lt": 9.99}}));
}

// ============================================================================
// Section: Inequality
// ============================================================================

#[test]
fn test_not_equal() {
    assert_eq!(compile("a != 3"), json!({"a": {"$ne": 3}}));
}

#[test]
fn test_strict_not_equal() {
    assert_eq!(compile("a !== 3"), json!({"a": {"$ne": 3}}));
}

#[test]
fn test_not_equal_field_right() {
    assert_eq!(compile("3 != a"), json!({"a": {"$ne": 3}}));
}

#[test]
fn test_not_equal_string() {
    assert_eq!(
        compile(r#"userId != "paolo""#),
        json!({"userId": {"$ne": "paolo"}})
    );
}

// ============================================================================
// Section: Existence checks
// ============================================================================

#[test]
fn test_equality_with_undefined_checks_absence() {
    assert_eq!(compile("a == undefined"), json!({"a": {"$exists": false}}));
}

#[test]
fn test_inequality_with_undefined_checks_presence() {
    assert_eq!(compile("a != undefined"), json!({"a": {"$exists": true}}));
}

#[test]
fn test_undefined_on_the_left() {
    assert_eq!(compile("undefined == a"), json!({"a": {"$exists": false}}));
}

#[test]
fn test_strict_operators_check_existence_too() {
    assert_eq!(compile("a === undefined"), json!({"a": {"$exists": false}}));
    assert_eq!(compile("a !== undefined"), json!({"a": {"$exists": true}}));
}

#[test]
fn test_existence_of_member_path() {
    assert_eq!(
        compile("a.b == undefined"),
        json!({"a.b": {"$exists": false}})
    );
}

// ============================================================================
// Section: Membership
// ============================================================================

#[test]
fn test_in_array() {
    assert_eq!(compile("b in [2, 3, 4]"), json!({"b": {"$in": [2, 3, 4]}}));
}

#[test]
fn test_in_mixed_array() {
    assert_eq!(
        compile(r#"b in [1, "x", true]"#),
        json!({"b": {"$in": [1, "x", true]}})
    );
}

#[test]
fn test_in_with_field_on_the_right() {
    assert_eq!(compile("[2, 3] in b"), json!({"b": {"$in": [2, 3]}}));
}

// ============================================================================
// Section: Regular expressions
// ============================================================================

#[test]
fn test_regex_equality() {
    assert_eq!(
        compile("a == /^c.*$/i"),
        json!({"a": {"$regex": "^c.*$", "$options": "i"}})
    );
}

#[test]
fn test_regex_without_flags() {
    assert_eq!(compile("a == /ab+/"), json!({"a": {"$regex": "ab+"}}));
}

#[test]
fn test_regex_value_is_a_pattern() {
    let filter = compile_filter("name == /^al/i");
    let Some(Value::Pattern(pattern)) = filter.get("name") else {
        panic!("expected a pattern value, got {:?}", filter.get("name"));
    };
    assert_eq!(pattern.source, "^al");
    assert_eq!(pattern.flags, "i");

    let regex = pattern.to_regex().unwrap();
    assert!(regex.is_match("alberto"));
    assert!(regex.is_match("Alberto"));
    assert!(!regex.is_match("roberto"));
}

// ============================================================================
// Section: AND combination
// ============================================================================

#[test]
fn test_and_distinct_fields_merge_into_one_document() {
    assert_eq!(
        compile(r#"a === "ciao" && b === 3"#),
        json!({"a": "ciao", "b": 3})
    );
}

#[test]
fn test_and_same_field_collects_under_and() {
    assert_eq!(
        compile("a > 3 && a < 45"),
        json!({"$and": [{"a": {"$gt": 3}}, {"a": {"$lt": 45}}]})
    );
}

#[test]
fn test_and_mixed_repeated_and_unique_fields() {
    assert_eq!(
        compile("a > 3 && a < 45 && b > 12"),
        json!({"$and": [{"a": {"$gt": 3}}, {"a": {"$lt": 45}}], "b": {"$gt": 12}})
    );
}

#[test]
fn test_and_duplicate_constraints_are_preserved() {
    assert_eq!(
        compile("a == 3 && a == 3"),
        json!({"$and": [{"a": 3}, {"a": 3}]})
    );
}

#[test]
fn test_and_regroups_when_a_field_repeats_later() {
    // b leaves its direct slot once a fourth clause makes it repeat.
    assert_eq!(
        compile("a > 1 && b > 2 && a < 9 && b < 8"),
        json!({"$and": [
            {"a": {"$gt": 1}},
            {"a": {"$lt": 9}},
            {"b": {"$gt": 2}},
            {"b": {"$lt": 8}},
        ]})
    );
}

#[test]
fn test_two_or_groups_under_and() {
    assert_eq!(
        compile("(a == 1 || b == 2) && (c == 3 || d == 4)"),
        json!({"$and": [
            {"$or": [{"a": 1}, {"b": 2}]},
            {"$or": [{"c": 3}, {"d": 4}]},
        ]})
    );
}

#[test]
fn test_or_group_beside_repeated_field() {
    assert_eq!(
        compile("(a == 1 || b == 2) && (c > 3 && c < 4)"),
        json!({"$or": [{"a": 1}, {"b": 2}], "$and": [{"c": {"$gt": 3}}, {"c": {"$lt": 4}}]})
    );
}

// ============================================================================
// Section: OR combination
// ============================================================================

#[test]
fn test_or_basic() {
    assert_eq!(
        compile(r#"a == "ciao" || (b === 3)"#),
        json!({"$or": [{"a": "ciao"}, {"b": 3}]})
    );
}

#[test]
fn test_or_with_negated_branch() {
    assert_eq!(
        compile(r#"a == "ciao" || !(b < 3)"#),
        json!({"$or": [{"a": "ciao"}, {"$not": {"b": {"$lt": 3}}}]})
    );
}

#[test]
fn test_or_flattens_nested_or() {
    assert_eq!(
        compile(r#"t == "ciao" || (t == "hei" || (userId != "paolo" && userId != undefined))"#),
        json!({"$or": [
            {"t": "ciao"},
            {"t": "hei"},
            {"$and": [
                {"userId": {"$ne": "paolo"}},
                {"userId": {"$exists": true}},
            ]},
        ]})
    );
}

#[test]
fn test_or_flattens_from_the_left_too() {
    assert_eq!(
        compile("(a == 1 || b == 2) || c == 3"),
        json!({"$or": [{"a": 1}, {"b": 2}, {"c": 3}]})
    );
}

#[test]
fn test_or_keeps_and_branches_whole() {
    assert_eq!(
        compile("(a == 1 && a == 2) || c == 3"),
        json!({"$or": [{"$and": [{"a": 1}, {"a": 2}]}, {"c": 3}]})
    );
}

#[test]
fn test_or_never_collapses_repeated_fields() {
    // Collision handling belongs to AND; under OR both branches stay listed.
    assert_eq!(
        compile("a > 3 || a < 45"),
        json!({"$or": [{"a": {"$gt": 3}}, {"a": {"$lt": 45}}]})
    );
}

// ============================================================================
// Section: Negation
// ============================================================================

#[test]
fn test_not_wraps_comparison() {
    assert_eq!(compile("!(b < 3)"), json!({"$not": {"b": {"$lt": 3}}}));
}

#[test]
fn test_double_negation_nests() {
    assert_eq!(compile("!!(a == 3)"), json!({"$not": {"$not": {"a": 3}}}));
}

#[test]
fn test_negated_bare_field_holds_its_path() {
    assert_eq!(compile("!a"), json!({"$not": "a"}));
}

// ============================================================================
// Section: Rejected expressions
// ============================================================================

#[test]
fn test_bare_identifier_is_not_a_filter() {
    assert_eq!(
        compile_err("a"),
        Error::Compile(CompileError::InvalidQuery)
    );
}

#[test]
fn test_bare_number_is_not_a_filter() {
    assert_eq!(
        compile_err("3"),
        Error::Compile(CompileError::InvalidQuery)
    );
}

#[test]
fn test_bare_string_is_not_a_filter() {
    assert_eq!(
        compile_err("'ciao'"),
        Error::Compile(CompileError::InvalidQuery)
    );
}

#[test]
fn test_bare_array_is_not_a_filter() {
    assert_eq!(
        compile_err(r#"[1, 2, 3, "hi"]"#),
        Error::Compile(CompileError::InvalidQuery)
    );
}

#[test]
fn test_equality_of_two_literals() {
    assert_eq!(
        compile_err("3 == 3"),
        Error::Compile(CompileError::UnsupportedEquality)
    );
}

#[test]
fn test_equality_of_two_fields() {
    assert_eq!(
        compile_err("a == b"),
        Error::Compile(CompileError::UnsupportedEquality)
    );
}

#[test]
fn test_unary_minus_on_field() {
    assert_eq!(
        compile_err("-a"),
        Error::Compile(CompileError::UnsupportedUnary(UnaryOp::Minus))
    );
}

#[test]
fn test_negative_number_alone() {
    assert_eq!(
        compile_err("-5"),
        Error::Compile(CompileError::UnsupportedUnary(UnaryOp::Minus))
    );
}

#[test]
fn test_undefined_against_undefined() {
    assert_eq!(
        compile_err("undefined != undefined"),
        Error::Compile(CompileError::UnsupportedExists)
    );
}

#[test]
fn test_undefined_against_literal() {
    assert_eq!(
        compile_err("3 == undefined"),
        Error::Compile(CompileError::UnsupportedExists)
    );
}

#[test]
fn test_shift_operator_has_no_filter_form() {
    assert_eq!(
        compile_err("b >> 3"),
        Error::Compile(CompileError::UnsupportedBinary(BinaryOp::ShiftRight))
    );
}

#[test]
fn test_arithmetic_has_no_filter_form() {
    assert_eq!(
        compile_err("a + 3"),
        Error::Compile(CompileError::UnsupportedBinary(BinaryOp::Add))
    );
}

#[test]
fn test_relational_needs_exactly_one_field() {
    assert_eq!(
        compile_err("3 < 4"),
        Error::Compile(CompileError::UnsupportedBinary(BinaryOp::LessThan))
    );
    assert_eq!(
        compile_err("a < b"),
        Error::Compile(CompileError::UnsupportedBinary(BinaryOp::LessThan))
    );
}

#[test]
fn test_logical_operand_must_be_a_document() {
    assert!(matches!(
        compile_err("a && b == 3"),
        Error::Compile(CompileError::UnsupportedExpression(_))
    ));
}

#[test]
fn test_array_elements_must_be_literals() {
    assert!(matches!(
        compile_err("a in [1, b]"),
        Error::Compile(CompileError::UnsupportedExpression(_))
    ));
}

#[test]
fn test_arrow_function_fails_to_parse() {
    assert!(matches!(compile_err("e => 34"), Error::Parse(_)));
}

#[test]
fn test_call_syntax_fails_to_parse() {
    assert!(matches!(compile_err("f(3)"), Error::Parse(_)));
}

#[test]
fn test_error_display_names_the_operator() {
    let message = compile_err("b >> 3").to_string();
    assert!(message.contains("'>>'"), "unexpected message: {message}");
}

// ============================================================================
// Section: Converters
// ============================================================================

#[test]
fn test_converter_rewrites_the_compared_value() {
    let compiler = Compiler::builder()
        .converter("a", |v| match v {
            Value::Integer(n) => Value::Integer(n + 1),
            other => other,
        })
        .build();

    let filter = compiler.compile("a == 5").unwrap();
    assert_eq!(document_to_json(&filter), json!({"a": 6}));
}

#[test]
fn test_converter_keyed_by_resolved_path() {
    let compiler = Compiler::builder()
        .converter("c.d.e", |v| match v {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        })
        .build();

    let filter = compiler.compile(r#"c.d.e == "ciao""#).unwrap();
    assert_eq!(document_to_json(&filter), json!({"c.d.e": "CIAO"}));
}

#[test]
fn test_converter_applies_to_relational_operand() {
    let compiler = Compiler::builder()
        .converter("a", |v| match v {
            Value::Integer(n) => Value::Integer(n * 2),
            other => other,
        })
        .build();

    let filter = compiler.compile("a > 4").unwrap();
    assert_eq!(document_to_json(&filter), json!({"a": {"$gt": 8}}));
}

#[test]
fn test_converter_applies_when_field_is_on_the_right() {
    let compiler = Compiler::builder()
        .converter("a", |v| match v {
            Value::Integer(n) => Value::Integer(n + 1),
            other => other,
        })
        .build();

    let filter = compiler.compile("5 == a").unwrap();
    assert_eq!(document_to_json(&filter), json!({"a": 6}));
}

#[test]
fn test_fields_without_converter_pass_through() {
    let compiler = Compiler::builder()
        .converter("a", |_| Value::Null)
        .build();

    let filter = compiler.compile("b == 3").unwrap();
    assert_eq!(document_to_json(&filter), json!({"b": 3}));
}

#[test]
fn test_converter_does_not_touch_existence_checks() {
    let compiler = Compiler::builder()
        .converter("a", |_| Value::Null)
        .build();

    let filter = compiler.compile("a == undefined").unwrap();
    assert_eq!(document_to_json(&filter), json!({"a": {"$exists": false}}));
}

#[test]
fn test_converter_registry_built_separately() {
    let mut converters = Converters::new();
    converters.insert("tag", |v| match v {
        Value::String(s) => Value::String(format!("#{s}")),
        other => other,
    });

    let compiler = Compiler::builder().converters(converters).build();
    let filter = compiler.compile(r#"tag == "rust""#).unwrap();
    assert_eq!(document_to_json(&filter), json!({"tag": "#rust"}));
}

// ============================================================================
// Section: Custom parsers and prebuilt trees
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct FixedParser;

impl ExpressionParser for FixedParser {
    fn parse(&self, _source: &str) -> Result<Expr, ParseError> {
        Ok(Expr::Binary {
            op: BinaryOp::Equal,
            left: Box::new(Expr::Identifier("a".to_string())),
            right: Box::new(Expr::Literal(Value::Integer(1))),
        })
    }
}

#[test]
fn test_custom_parser_feeds_the_compiler() {
    let compiler = Compiler::builder().parser(FixedParser).build();
    let filter = compiler.compile("ignored").unwrap();
    assert_eq!(document_to_json(&filter), json!({"a": 1}));
}

#[test]
fn test_compile_expr_accepts_a_prebuilt_tree() {
    let tree = Expr::Binary {
        op: BinaryOp::GreaterThan,
        left: Box::new(Expr::Identifier("a".to_string())),
        right: Box::new(Expr::Literal(Value::Integer(3))),
    };

    let compiler = Compiler::new();
    let filter = compiler.compile_expr(&tree).unwrap();
    assert_eq!(document_to_json(&filter), json!({"a": {"$gt": 3}}));
}

// ============================================================================
// Section: Structural properties
// ============================================================================

#[test]
fn test_operand_order_does_not_change_the_filter() {
    assert_eq!(compile("a == 3"), compile("3 == a"));
    assert_eq!(compile("a < 45"), compile("45 > a"));
    assert_eq!(compile("a != 3"), compile("3 != a"));
}

#[test]
fn test_parentheses_do_not_change_the_filter() {
    assert_eq!(
        compile(r#"a == "ciao" || b == 3"#),
        compile(r#"(a == "ciao") || (b == 3)"#)
    );
    assert_eq!(compile("a > 3 && a < 45"), compile("(a > 3) && (a < 45)"));
}

#[test]
fn test_compilation_is_deterministic() {
    let source = r#"a > 3 && a < 45 && b == "ciao""#;
    assert_eq!(compile(source), compile(source));
    assert_eq!(
        to_json(&compile_filter(source)),
        to_json(&compile_filter(source))
    );
}

#[test]
fn test_and_document_key_order_follows_the_expression() {
    let filter = compile_filter("a > 3 && a < 45 && b > 12");
    assert_eq!(
        to_json(&filter),
        r#"{"$and":[{"a":{"$gt":3}},{"a":{"$lt":45}}],"b":{"$gt":12}}"#
    );
}
