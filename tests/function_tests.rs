use jsir::Value;

mod common;
use common::{eval_number, eval_string, eval_uncaught_name, run};

#[test]
fn declarations_hoist_within_their_scope() {
    let n = eval_number(
        r#"
        (let r (call hoisted))
        (function hoisted () (return 11))
        r
        "#,
    );
    assert_eq!(n, 11.0);
}

#[test]
fn missing_arguments_read_undefined() {
    let s = eval_string(
        r#"
        (function f (a b) (return (typeof b)))
        (call f 1)
        "#,
    );
    assert_eq!(s, "undefined");
}

#[test]
fn rest_parameter_collects_leftovers() {
    let n = eval_number(
        r#"
        (function f (a (rest more)) (return (get-prop more length)))
        (call f 1 2 3 4)
        "#,
    );
    assert_eq!(n, 3.0);
}

#[test]
fn parameter_patterns_destructure_arguments() {
    let n = eval_number(
        r#"
        (function g ((array-pattern (pattern-element x) (pattern-element y)))
          (return (+ x y)))
        (call g (array 3 4))
        "#,
    );
    assert_eq!(n, 7.0);
}

#[test]
fn defaulted_parameters() {
    assert_eq!(
        eval_number(
            r#"
            (function h ((pattern-element v 5)) (return v))
            (call h)
            "#
        ),
        5.0
    );
    assert_eq!(
        eval_number(
            r#"
            (function h ((pattern-element v 5)) (return v))
            (call h 9)
            "#
        ),
        9.0
    );
}

#[test]
fn spread_arguments_expand_left_to_right() {
    let n = eval_number(
        r#"
        (function s (a b c d) (return (+ (+ (* a 1000) (* b 100)) (+ (* c 10) d))))
        (call s 1 (spread (array 2 3)) 4)
        "#,
    );
    assert_eq!(n, 1234.0);
}

#[test]
fn this_is_undefined_for_plain_calls() {
    let s = eval_string(
        r#"
        (function t () (return (typeof (this))))
        (call t)
        "#,
    );
    assert_eq!(s, "undefined");
}

#[test]
fn recursion_through_the_bound_name() {
    let n = eval_number(
        r#"
        (function fib (n)
          (if (< n 2) (return n))
          (return (+ (call fib (- n 1)) (call fib (- n 2)))))
        (call fib 10)
        "#,
    );
    assert_eq!(n, 55.0);
}

#[test]
fn named_function_expressions_can_self_reference() {
    let n = eval_number(
        r#"
        (let fact (function inner-fact (n)
          (if (<= n 1) (return 1))
          (return (* n (call inner-fact (- n 1))))))
        (call fact 5)
        "#,
    );
    assert_eq!(n, 120.0);
}

#[test]
fn return_without_a_value_yields_undefined() {
    assert!(matches!(run("(function f () (return)) (call f)"), Ok(Value::Undefined)));
    assert!(matches!(run("(function f () (expr-stmt 3)) (call f)"), Ok(Value::Undefined)));
}

#[test]
fn calling_a_non_callable_is_a_type_error() {
    assert_eq!(eval_uncaught_name("(call 5)"), "TypeError");
    assert_eq!(eval_uncaught_name(r#"(let o (object)) (call (get-prop o missing))"#), "TypeError");
}

#[test]
fn lambdas_are_first_class_values() {
    let n = eval_number(
        r#"
        (function twice (f x) (return (call f (call f x))))
        (call twice (lambda (v) (return (* v 3))) 2)
        "#,
    );
    assert_eq!(n, 18.0);
}
