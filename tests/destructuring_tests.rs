mod common;
use common::{eval_bool, eval_number, eval_string, eval_uncaught_name};

#[test]
fn array_pattern_with_rest() {
    let n = eval_number(
        r#"
        (let (array-pattern (pattern-element a) (pattern-element b) (pattern-rest r))
             (array 1 2 3 4))
        (+ (+ a b) (get-prop r length))
        "#,
    );
    assert_eq!(n, 5.0); // a=1 b=2 r=[3,4]
    assert_eq!(
        eval_number(
            r#"
            (let (array-pattern (pattern-element a) (pattern-element b) (pattern-rest r))
                 (array 1 2 3 4))
            (+ (get-index r 0) (get-index r 1))
            "#
        ),
        7.0
    );
}

#[test]
fn object_pattern_with_defaults() {
    let n = eval_number(
        r#"
        (let (object-pattern (pattern-property x) (pattern-property y null 5))
             (object (prop x 10)))
        (+ x y)
        "#,
    );
    assert_eq!(n, 15.0);
}

#[test]
fn object_pattern_renames_targets() {
    let n = eval_number(
        r#"
        (let (object-pattern (pattern-property from to))
             (object (prop from 9)))
        to
        "#,
    );
    assert_eq!(n, 9.0);
}

#[test]
fn object_pattern_rest_collects_unused_keys() {
    let s = eval_string(
        r#"
        (let (object-pattern (pattern-property a) (pattern-rest others))
             (object (prop a 1) (prop b 2) (prop c 3)))
        (let keys "")
        (for-in k others (block (expr-stmt (assign keys (+ keys k)))))
        keys
        "#,
    );
    assert_eq!(s, "bc");
}

#[test]
fn nested_patterns() {
    let n = eval_number(
        r#"
        (let (array-pattern
               (pattern-element first)
               (pattern-element (object-pattern (pattern-property inner))))
             (array 1 (object (prop inner 2))))
        (+ first inner)
        "#,
    );
    assert_eq!(n, 3.0);
}

#[test]
fn array_holes_advance_without_binding() {
    let n = eval_number(
        r#"
        (let (array-pattern null (pattern-element b)) (array 1 2))
        b
        "#,
    );
    assert_eq!(n, 2.0);
}

#[test]
fn defaults_evaluate_only_when_needed() {
    assert!(!eval_bool(
        r#"
        (let flag false)
        (let (array-pattern (pattern-element a (comma (assign flag true) 9))) (array 1))
        flag
        "#
    ));
    assert!(eval_bool(
        r#"
        (let flag false)
        (let (array-pattern (pattern-element a (comma (assign flag true) 9))) (array))
        flag
        "#
    ));
}

#[test]
fn assignment_mode_reuses_existing_bindings() {
    let n = eval_number(
        r#"
        (let x 0)
        (let y 0)
        (expr-stmt (assign (array-pattern (pattern-element x) (pattern-element y)) (array 7 8)))
        (+ x y)
        "#,
    );
    assert_eq!(n, 15.0);
}

#[test]
fn var_mode_hoists_pattern_names() {
    let n = eval_number(
        r#"
        (function f ()
          (block (var (object-pattern (pattern-property v)) (object (prop v 6))))
          (return v))
        (call f)
        "#,
    );
    assert_eq!(n, 6.0);
}

#[test]
fn const_mode_makes_pattern_bindings_const() {
    let s = eval_string(
        r#"
        (const (array-pattern (pattern-element c)) (array 1))
        (try (block (expr-stmt (assign c 2)))
             (catch e (expr-stmt (get-prop e name))))
        "#,
    );
    assert_eq!(s, "TypeError");
}

#[test]
fn pattern_type_mismatches_throw() {
    assert_eq!(eval_uncaught_name("(let (array-pattern (pattern-element a)) 5)"), "TypeError");
    assert_eq!(eval_uncaught_name(r#"(let (array-pattern (pattern-element a)) "ab")"#), "TypeError");
    assert_eq!(eval_uncaught_name("(let (object-pattern (pattern-property a)) null)"), "TypeError");
}
