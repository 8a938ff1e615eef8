use jsir::Value;

mod common;
use common::{eval_bool, eval_number, eval_string, run};

#[test]
fn literal_properties_and_computed_keys() {
    assert_eq!(eval_number(r#"(get-prop (object (prop a 1) (prop "b c" 2)) a)"#), 1.0);
    assert_eq!(
        eval_number(
            r#"
            (let o (object (prop (+ "k" "1") 3)))
            (get-index o "k1")
            "#
        ),
        3.0
    );
    // numeric literal keys land in the string keyspace
    assert_eq!(eval_string(r#"(get-index (object (prop 7 "x")) 7)"#), "x");
}

#[test]
fn missing_keys_read_undefined() {
    assert!(matches!(run("(get-prop (object) nothing)"), Ok(Value::Undefined)));
    assert!(!eval_bool(r#"(in "nothing" (object))"#));
}

#[test]
fn methods_bind_this_to_the_base_object() {
    let n = eval_number(
        r#"
        (let o (object
          (prop v 3)
          (method m () (return (get-prop (this) v)))))
        (call (get-prop o m))
        "#,
    );
    assert_eq!(n, 3.0);
}

#[test]
fn getters_fire_on_read_with_the_receiver() {
    let n = eval_number(
        r#"
        (let o (object
          (prop base 20)
          (getter doubled (return (* (get-prop (this) base) 2)))))
        (get-prop o doubled)
        "#,
    );
    assert_eq!(n, 40.0);
}

#[test]
fn setters_fire_on_write() {
    let n = eval_number(
        r#"
        (let o (object
          (setter x (v) (expr-stmt (set-prop (this) backing (* v 10))))))
        (expr-stmt (set-prop o x 5))
        (get-prop o backing)
        "#,
    );
    assert_eq!(n, 50.0);
}

#[test]
fn accessors_do_not_appear_in_key_enumeration() {
    let s = eval_string(
        r#"
        (let o (object (prop a 1) (getter g (return 2)) (prop b 3)))
        (let keys "")
        (for-in k o (block (expr-stmt (assign keys (+ keys k)))))
        keys
        "#,
    );
    assert_eq!(s, "ab");
}

#[test]
fn own_keys_keep_insertion_order() {
    let s = eval_string(
        r#"
        (let o (object (prop z 1) (prop a 2) (prop m 3)))
        (let keys "")
        (for-in k o (block (expr-stmt (assign keys (+ keys k)))))
        keys
        "#,
    );
    assert_eq!(s, "zam");
}

#[test]
fn spread_copies_own_properties_in_order() {
    let n = eval_number(
        r#"
        (let base (object (prop a 1) (prop b 2)))
        (let o (object (spread base) (prop b 9)))
        (+ (get-prop o a) (get-prop o b))
        "#,
    );
    assert_eq!(n, 10.0);
}

#[test]
fn nullish_spread_contributes_nothing() {
    let s = eval_string(
        r#"
        (let o (object (spread null) (prop only "k")))
        (let keys "")
        (for-in k o (block (expr-stmt (assign keys (+ keys k)))))
        keys
        "#,
    );
    assert_eq!(s, "only");
}

#[test]
fn writes_reach_setters_up_the_prototype_chain() {
    let n = eval_number(
        r#"
        (class Counted
          (setter tick (v) (expr-stmt (set-prop (this) total v))))
        (let c (new Counted))
        (expr-stmt (set-prop c tick 11))
        (get-prop c total)
        "#,
    );
    assert_eq!(n, 11.0);
}

#[test]
fn shadowing_an_inherited_value_writes_locally() {
    let n = eval_number(
        r#"
        (class Base (method constructor ()))
        (let a (new Base))
        (let b (new Base))
        (expr-stmt (set-prop a shared 1))
        (?? (get-prop b shared) -1)
        "#,
    );
    assert_eq!(n, -1.0);
}
