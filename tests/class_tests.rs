mod common;
use common::{eval_bool, eval_number, eval_string, eval_uncaught_name};

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn construction_and_methods_through_inheritance() {
    let n = eval_number(
        r#"
        (class A
          (method constructor () (expr-stmt (set-prop (this) x 1)))
          (method m () (return (get-prop (this) x))))
        (class B (extends A)
          (method constructor ()
            (expr-stmt (call (super)))
            (expr-stmt (set-prop (this) y 2))))
        (+ (call (get-prop (new B) m)) (get-prop (new B) y))
        "#,
    );
    assert_eq!(n, 3.0);
}

#[test]
fn constructor_arguments_flow_through() {
    let n = eval_number(
        r#"
        (class Point
          (method constructor (x y)
            (expr-stmt (set-prop (this) x x))
            (expr-stmt (set-prop (this) y y))))
        (let p (new Point 3 4))
        (+ (get-prop p x) (get-prop p y))
        "#,
    );
    assert_eq!(n, 7.0);
}

#[test]
fn default_derived_constructor_forwards_to_super() {
    let n = eval_number(
        r#"
        (class Base (method constructor (v) (expr-stmt (set-prop (this) v v))))
        (class Derived (extends Base))
        (get-prop (new Derived 33) v)
        "#,
    );
    assert_eq!(n, 33.0);
}

#[test]
fn super_method_calls_bind_the_subclass_instance() {
    let s = eval_string(
        r#"
        (class A (method greet () (return (+ "a" (get-prop (this) suffix)))))
        (class B (extends A)
          (method constructor () (expr-stmt (call (super))) (expr-stmt (set-prop (this) suffix "!")))
          (method greet () (return (+ "b" (call (get-prop (super) greet))))))
        (call (get-prop (new B) greet))
        "#,
    );
    assert_eq!(s, "ba!");
}

#[test]
fn static_members_live_on_the_constructor() {
    assert_eq!(
        eval_number(
            r#"
            (class C
              (static-method sm () (return 5))
              (static-field count 42))
            (+ (call (get-prop C sm)) (get-prop C count))
            "#
        ),
        47.0
    );
}

#[test]
fn static_members_inherit_through_the_constructor_chain() {
    let n = eval_number(
        r#"
        (class Base (static-method make () (return 9)))
        (class Derived (extends Base))
        (call (get-prop Derived make))
        "#,
    );
    assert_eq!(n, 9.0);
}

#[test]
fn accessors_on_the_prototype() {
    let n = eval_number(
        r#"
        (class Temp
          (method constructor () (expr-stmt (set-prop (this) celsius 25)))
          (getter doubled (return (* (get-prop (this) celsius) 2)))
          (setter doubled (d) (expr-stmt (set-prop (this) celsius (/ d 2)))))
        (let t (new Temp))
        (expr-stmt (set-prop t doubled 64))
        (+ (get-prop t celsius) (get-prop (new Temp) doubled))
        "#,
    );
    assert_eq!(n, 82.0);
}

#[test]
fn fields_initialize_base_class_first_in_declaration_order() {
    let s = eval_string(
        r#"
        (class F1 (public-field log "1") (public-field log2 (+ (get-prop (this) log) "2")))
        (class F2 (extends F1) (public-field log3 (+ (get-prop (this) log2) "3")))
        (get-prop (new F2) log3)
        "#,
    );
    assert_eq!(s, "123");
}

#[test]
fn private_fields_are_reachable_from_methods() {
    let n = eval_number(
        r#"
        (class Vault
          (private-field #secret 42)
          (method reveal () (return (get-prop (this) #secret))))
        (call (get-prop (new Vault) reveal))
        "#,
    );
    assert_eq!(n, 42.0);
}

#[test]
fn instanceof_walks_the_prototype_chain() {
    assert!(eval_bool(
        r#"
        (class Base (method constructor ()))
        (class Derived (extends Base))
        (instanceof (new Derived) Base)
        "#
    ));
    assert!(!eval_bool(
        r#"
        (class Base (method constructor ()))
        (class Other (method constructor ()))
        (instanceof (new Other) Base)
        "#
    ));
}

#[test]
fn constructor_returning_an_object_replaces_the_instance() {
    let n = eval_number(
        r#"
        (class Swap (method constructor () (return (object (prop replaced 1)))))
        (get-prop (new Swap) replaced)
        "#,
    );
    assert_eq!(n, 1.0);
}

#[test]
fn extending_a_non_constructor_is_a_type_error() {
    assert_eq!(eval_uncaught_name("(class Bad (extends 5))"), "TypeError");
}

#[test]
fn new_on_a_non_callable_is_a_type_error() {
    assert_eq!(eval_uncaught_name("(new 5)"), "TypeError");
}

#[test]
fn class_expressions_produce_values() {
    let n = eval_number(
        r#"
        (let k (class Inline (method constructor () (expr-stmt (set-prop (this) ok 2)))))
        (get-prop (new k) ok)
        "#,
    );
    assert_eq!(n, 2.0);
}
