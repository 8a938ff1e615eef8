use jsir::{JSError, Symbol, Value, new_environment};

mod common;
use common::{eval_number, eval_string, eval_uncaught_name, run, run_with_env};

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn block_scoped_let_shadows_and_restores() {
    let n = eval_number(
        r#"
        (let x 1)
        (block (let x 2))
        x
        "#,
    );
    assert_eq!(n, 1.0);
}

#[test]
fn tdz_read_is_a_reference_error() {
    let name = eval_uncaught_name(
        r#"
        (expr-stmt y)
        (let y 1)
        "#,
    );
    assert_eq!(name, "ReferenceError");
}

#[test]
fn tdz_error_is_catchable() {
    let s = eval_string(
        r#"
        (try (block (expr-stmt z) (let z 5))
             (catch e (expr-stmt (get-prop e name))))
        "#,
    );
    assert_eq!(s, "ReferenceError");
}

#[test]
fn const_assignment_is_a_type_error() {
    let s = eval_string(
        r#"
        (const k 1)
        (try (block (expr-stmt (assign k 2)))
             (catch e (expr-stmt (get-prop e name))))
        "#,
    );
    assert_eq!(s, "TypeError");
}

#[test]
fn var_hoists_out_of_blocks_to_the_function_frame() {
    let n = eval_number(
        r#"
        (function f ()
          (block (var v 42))
          (return v))
        (call f)
        "#,
    );
    assert_eq!(n, 42.0);
}

#[test]
fn hoisted_var_reads_undefined_before_its_initializer() {
    let s = eval_string(
        r#"
        (function g ()
          (let seen (typeof w))
          (var w 1)
          (return seen))
        (call g)
        "#,
    );
    assert_eq!(s, "undefined");
}

#[test]
fn strict_mode_rejects_undeclared_assignment() {
    let name = eval_uncaught_name(
        r#"
        (use-strict)
        (expr-stmt (assign zz 1))
        "#,
    );
    assert_eq!(name, "ReferenceError");
}

#[test]
fn sloppy_assignment_creates_a_global_binding() {
    let env = new_environment(None, false);
    let result = run_with_env(
        r#"
        (function setg () (expr-stmt (assign q 7)))
        (expr-stmt (call setg))
        q
        "#,
        &env,
    )
    .unwrap();
    assert!(matches!(result, Value::Number(n) if n == 7.0));
    assert!(matches!(env.get(Symbol::intern("q")), Ok(Value::Number(n)) if n == 7.0));
}

#[test]
fn closures_capture_their_defining_frame() {
    let n = eval_number(
        r#"
        (function make-counter ()
          (let n 0)
          (return (lambda ()
            (expr-stmt (assign n (+ n 1)))
            (return n))))
        (let c (call make-counter))
        (expr-stmt (call c))
        (call c)
        "#,
    );
    assert_eq!(n, 2.0);
}

#[test]
fn two_counters_do_not_share_state() {
    let n = eval_number(
        r#"
        (function make-counter ()
          (let n 0)
          (return (lambda () (expr-stmt (assign n (+ n 1))) (return n))))
        (let a (call make-counter))
        (let b (call make-counter))
        (expr-stmt (call a))
        (expr-stmt (call a))
        (call b)
        "#,
    );
    assert_eq!(n, 1.0);
}

#[test]
fn const_redeclaration_in_same_frame_fails() {
    let s = eval_string(
        r#"
        (try (block (const c 1) (const c 2))
             (catch e (expr-stmt (get-prop e name))))
        "#,
    );
    assert_eq!(s, "SyntaxError");
}

#[test]
fn program_value_is_the_last_expression_statement() {
    match run("(let a 1) (let b 2)") {
        Ok(Value::Undefined) => {}
        other => panic!("declarations alone should complete with undefined, got {other:?}"),
    }
}

#[test]
fn control_flow_signal_at_top_level_is_a_host_error() {
    match run("(break)") {
        Err(JSError::EvaluationError { .. }) => {}
        other => panic!("expected a host error, got {other:?}"),
    }
}
