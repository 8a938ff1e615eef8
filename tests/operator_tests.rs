use jsir::Value;

mod common;
use common::{eval_bool, eval_number, eval_string, run};

#[test]
fn plus_concatenates_when_either_side_is_stringish() {
    assert_eq!(eval_string(r#"(+ 1 "2")"#), "12");
    assert_eq!(eval_string(r#"(+ (array) (array))"#), "");
    assert_eq!(eval_string(r#"(+ (array) (object))"#), "[object Object]");
    assert_eq!(eval_string(r#"(+ (array 1 2) (array 3))"#), "1,23");
}

#[test]
fn minus_coerces_strings_numerically() {
    assert_eq!(eval_number(r#"(- "3" 1)"#), 2.0);
    assert_eq!(eval_number(r#"(* "4" "2")"#), 8.0);
    assert!(eval_number(r#"(- (object) 1)"#).is_nan());
}

#[test]
fn numeric_edge_coercions() {
    assert_eq!(eval_number("(+ null 1)"), 1.0);
    assert!(eval_number("(+ (undefined) 1)").is_nan());
    assert_eq!(eval_number("(+ true true)"), 2.0);
    assert_eq!(eval_number(r#"(- "  8  " 0)"#), 8.0);
    assert_eq!(eval_number(r#"(- "0x10" 0)"#), 16.0);
    assert_eq!(eval_string(r#"(+ (array 5) 1)"#), "51"); // arrays concatenate under +
    assert_eq!(eval_number(r#"(- (array 5) 1)"#), 4.0);
    assert_eq!(eval_number(r#"(- (array) 0)"#), 0.0);
}

#[test]
fn nan_comparisons_are_always_false() {
    assert!(!eval_bool("(=== (/ 0 0) (/ 0 0))"));
    assert!(!eval_bool("(< (/ 0 0) 1)"));
    assert!(!eval_bool("(>= (/ 0 0) 1)"));
    assert!(eval_bool("(!== (/ 0 0) (/ 0 0))"));
}

#[test]
fn loose_equality_cross_type_rules() {
    assert!(eval_bool("(== null (undefined))"));
    assert!(!eval_bool("(== null 0)"));
    assert!(eval_bool(r#"(== 1 "1")"#));
    assert!(eval_bool("(== true 1)"));
    assert!(eval_bool(r#"(== (array 7) 7)"#));
    assert!(!eval_bool(r#"(=== 1 "1")"#));
}

#[test]
fn strict_equality_is_identity_for_references() {
    assert!(eval_bool(
        r#"
        (let o (object (prop a 1)))
        (let p o)
        (=== o p)
        "#
    ));
    assert!(!eval_bool("(=== (object) (object))"));
    assert!(eval_bool(r#"(=== "ab" (+ "a" "b"))"#));
}

#[test]
fn string_comparisons_are_lexicographic() {
    assert!(eval_bool(r#"(< "apple" "banana")"#));
    assert!(eval_bool(r#"(>= "b" "b")"#));
}

#[test]
fn bitwise_and_shifts_use_int32_semantics() {
    assert_eq!(eval_number("(& 6 3)"), 2.0);
    assert_eq!(eval_number("(| 4 1)"), 5.0);
    assert_eq!(eval_number("(^ 5 1)"), 4.0);
    assert_eq!(eval_number("(<< 1 5)"), 32.0);
    assert_eq!(eval_number("(>> -8 1)"), -4.0);
    assert_eq!(eval_number("(>>> -1 0)"), 4294967295.0);
    assert_eq!(eval_number("(bit-not 5)"), -6.0);
    assert_eq!(eval_number("(<< 1 33)"), 2.0); // shift counts mask to 5 bits
}

#[test]
fn logical_operators_return_the_selected_operand() {
    assert_eq!(eval_string(r#"(|| 0 "x")"#), "x");
    assert_eq!(eval_number("(&& 1 2)"), 2.0);
    assert_eq!(eval_number("(?? null 5)"), 5.0);
    assert_eq!(eval_number("(?? 0 5)"), 0.0); // 0 is not nullish
}

#[test]
fn logical_operators_short_circuit() {
    let n = eval_number(
        r#"
        (let hits 0)
        (function bump () (expr-stmt (assign hits (+ hits 1))) (return true))
        (expr-stmt (&& false (call bump)))
        (expr-stmt (|| true (call bump)))
        (expr-stmt (?? 1 (call bump)))
        hits
        "#,
    );
    assert_eq!(n, 0.0);
}

#[test]
fn typeof_answers_without_throwing() {
    assert_eq!(eval_string("(typeof never-declared)"), "undefined");
    assert_eq!(eval_string("(typeof (undefined))"), "undefined");
    assert_eq!(eval_string("(typeof null)"), "object");
    assert_eq!(eval_string("(typeof 1)"), "number");
    assert_eq!(eval_string(r#"(typeof "s")"#), "string");
    assert_eq!(eval_string("(typeof true)"), "boolean");
    assert_eq!(eval_string("(typeof 1n)"), "bigint");
    assert_eq!(eval_string("(typeof (lambda ()))"), "function");
    assert_eq!(eval_string("(typeof (object))"), "object");
}

#[test]
fn void_discards_its_operand() {
    assert!(matches!(run("(void 42)"), Ok(Value::Undefined)));
}

#[test]
fn delete_removes_members_and_answers_true_otherwise() {
    assert!(!eval_bool(
        r#"
        (let o (object (prop a 1)))
        (expr-stmt (delete (get-prop o a)))
        (in "a" o)
        "#
    ));
    assert!(eval_bool("(delete 5)"));
    assert!(eval_bool(r#"(delete (get-prop (object) missing))"#));
}

#[test]
fn ternary_and_comma() {
    assert_eq!(eval_string(r#"(ternary (> 2 1) "yes" "no")"#), "yes");
    assert_eq!(eval_number("(comma 1 2)"), 2.0);
}

#[test]
fn increments_on_names_and_members() {
    let n = eval_number(
        r#"
        (let i 5)
        (expr-stmt (post-inc i))
        i
        "#,
    );
    assert_eq!(n, 6.0);

    assert_eq!(eval_number("(let j 5) (post-inc j)"), 5.0);
    assert_eq!(eval_number("(let k 5) (pre-dec k)"), 4.0);

    let n = eval_number(
        r#"
        (let o (object (prop hits 0)))
        (expr-stmt (pre-inc (get-prop o hits)))
        (expr-stmt (pre-inc (get-prop o hits)))
        (get-prop o hits)
        "#,
    );
    assert_eq!(n, 2.0);

    // a numeric string updates through ToNumber
    assert_eq!(eval_number(r#"(let s "5") (pre-inc s)"#), 6.0);
}

#[test]
fn in_operator_sees_own_and_inherited_keys() {
    assert!(eval_bool(r#"(let o (object (prop x 1))) (in "x" o)"#));
    assert!(!eval_bool(r#"(let o (object (prop x 1))) (in "y" o)"#));
    assert!(eval_bool(r#"(in "length" (array 1))"#));
    assert!(eval_bool(r#"(in 0 (array 9))"#));
    assert!(!eval_bool(r#"(in 1 (array 9))"#));
}

#[test]
fn optional_chaining_short_circuits_on_nullish() {
    assert!(matches!(run("(optional-get-prop null x)"), Ok(Value::Undefined)));
    assert!(matches!(run("(let f null) (optional-call f)"), Ok(Value::Undefined)));
    assert!(matches!(run("(optional-get-index null 0)"), Ok(Value::Undefined)));
    assert_eq!(eval_number(r#"(let o (object (prop x 3))) (optional-get-prop o x)"#), 3.0);
}

#[test]
fn member_access_on_nullish_is_a_type_error() {
    assert_eq!(common::eval_uncaught_name("(get-prop null x)"), "TypeError");
    assert_eq!(common::eval_uncaught_name("(get-prop (undefined) x)"), "TypeError");
}
