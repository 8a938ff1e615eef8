use jsir::Value;

mod common;
use common::{eval_bool, eval_number, eval_string, run};

#[test]
fn literal_elements_and_length() {
    assert_eq!(eval_number("(get-prop (array 1 2 3) length)"), 3.0);
    assert_eq!(eval_number("(get-index (array 4 5 6) 1)"), 5.0);
    assert!(matches!(run("(get-index (array 1) 5)"), Ok(Value::Undefined)));
    assert!(matches!(run("(get-index (array 1 null) 1)"), Ok(Value::Null)));
}

#[test]
fn spread_expands_arrays_and_strings() {
    assert_eq!(eval_number("(get-prop (array 0 (spread (array 1 2)) 3) length)"), 4.0);
    assert_eq!(eval_number("(get-index (array 0 (spread (array 1 2)) 3) 2)"), 2.0);
    assert_eq!(eval_string(r#"(get-index (array (spread "ab")) 1)"#), "b");
}

#[test]
fn spreading_a_non_iterable_is_a_type_error() {
    assert_eq!(common::eval_uncaught_name("(array (spread 5))"), "TypeError");
}

#[test]
fn writing_past_the_end_pads_with_undefined() {
    let n = eval_number(
        r#"
        (let a (array 1))
        (expr-stmt (set-index a 3 9))
        (get-prop a length)
        "#,
    );
    assert_eq!(n, 4.0);
    assert!(matches!(
        run(
            r#"
            (let a (array 1))
            (expr-stmt (set-index a 3 9))
            (get-index a 2)
            "#
        ),
        Ok(Value::Undefined)
    ));
}

#[test]
fn length_is_writable_and_truncates() {
    let n = eval_number(
        r#"
        (let a (array 1 2 3 4))
        (expr-stmt (set-prop a length 2))
        (get-prop a length)
        "#,
    );
    assert_eq!(n, 2.0);
    assert_eq!(common::eval_uncaught_name(r#"(set-prop (array) length -1)"#), "RangeError");
}

#[test]
fn non_index_names_fall_through_to_the_property_map() {
    let s = eval_string(
        r#"
        (let a (array 1 2))
        (expr-stmt (set-prop a tag "mine"))
        (get-prop a tag)
        "#,
    );
    assert_eq!(s, "mine");
    assert_eq!(eval_number(r#"(let a (array 1 2)) (expr-stmt (set-index a "-1" 9)) (get-prop a length)"#), 2.0);
}

#[test]
fn for_of_visits_values_in_order_exactly_once() {
    let s = eval_string(
        r#"
        (let log "")
        (for-of v (array "a" "b" "c")
          (block (expr-stmt (assign log (+ log v)))))
        log
        "#,
    );
    assert_eq!(s, "abc");
}

#[test]
fn for_of_over_a_non_iterable_is_a_type_error() {
    assert_eq!(common::eval_uncaught_name("(for-of v 5 (block))"), "TypeError");
    assert_eq!(common::eval_uncaught_name("(for-of v (object) (block))"), "TypeError");
}

#[test]
fn for_in_enumerates_index_strings() {
    let s = eval_string(
        r#"
        (let log "")
        (for-in k (array 7 8 9)
          (block (expr-stmt (assign log (+ log k)))))
        log
        "#,
    );
    assert_eq!(s, "012");
}

#[test]
fn strings_expose_length_and_characters() {
    assert_eq!(eval_number(r#"(get-prop "abc" length)"#), 3.0);
    assert_eq!(eval_string(r#"(get-index "abc" 1)"#), "b");
    assert!(matches!(run(r#"(get-index "abc" 9)"#), Ok(Value::Undefined)));

    let s = eval_string(
        r#"
        (let log "")
        (for-of ch "hey" (block (expr-stmt (assign log (+ (+ log ch) ".")))))
        log
        "#,
    );
    assert_eq!(s, "h.e.y.");
}

#[test]
fn delete_on_an_index_leaves_undefined_behind() {
    assert!(eval_bool(
        r#"
        (let a (array 1 2))
        (delete (get-index a 0))
        "#
    ));
    assert!(matches!(
        run(
            r#"
            (let a (array 1 2))
            (expr-stmt (delete (get-index a 0)))
            (get-index a 0)
            "#
        ),
        Ok(Value::Undefined)
    ));
}
