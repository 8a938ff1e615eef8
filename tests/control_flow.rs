mod common;
use common::{eval_number, eval_string};

#[test]
fn for_loop_accumulates() {
    let n = eval_number(
        r#"
        (var a 0)
        (for (var i 0) (< i 3) (post-inc i)
          (block (expr-stmt (assign a (+ a i)))))
        a
        "#,
    );
    assert_eq!(n, 3.0);
}

#[test]
fn for_loop_with_let_keeps_the_index_local() {
    let s = eval_string(
        r#"
        (for (let i 0) (< i 1) (post-inc i) (block))
        (typeof i)
        "#,
    );
    assert_eq!(s, "undefined");
}

#[test]
fn while_loop_runs_until_condition_fails() {
    let n = eval_number(
        r#"
        (let total 0)
        (let i 0)
        (while (< i 5)
          (block
            (expr-stmt (assign total (+ total i)))
            (expr-stmt (assign i (+ i 1)))))
        total
        "#,
    );
    assert_eq!(n, 10.0);
}

#[test]
fn do_while_body_runs_before_the_condition() {
    let n = eval_number(
        r#"
        (let hits 0)
        (do-while (block (expr-stmt (assign hits (+ hits 1)))) false)
        hits
        "#,
    );
    assert_eq!(n, 1.0);
}

#[test]
fn break_exits_the_innermost_loop_only() {
    let n = eval_number(
        r#"
        (let count 0)
        (for (let i 0) (< i 3) (post-inc i)
          (block
            (for (let j 0) (< j 10) (post-inc j)
              (block
                (if (=== j 2) (block (break)))
                (expr-stmt (assign count (+ count 1)))))))
        count
        "#,
    );
    assert_eq!(n, 6.0);
}

#[test]
fn continue_skips_to_the_increment() {
    let n = eval_number(
        r#"
        (let sum 0)
        (for (let i 0) (< i 5) (post-inc i)
          (block
            (if (=== (% i 2) 0) (block (continue)))
            (expr-stmt (assign sum (+ sum i)))))
        sum
        "#,
    );
    assert_eq!(n, 4.0);
}

#[test]
fn labelled_statement_absorbs_an_escaping_break() {
    let n = eval_number(
        r#"
        (let x 1)
        (label done
          (block
            (break)
            (expr-stmt (assign x 99))))
        x
        "#,
    );
    assert_eq!(n, 1.0);
}

#[test]
fn switch_falls_through_after_the_first_match() {
    let s = eval_string(
        r#"
        (let log "")
        (switch 2
          (case 1 (expr-stmt (assign log (+ log "a"))))
          (case 2 (expr-stmt (assign log (+ log "b"))))
          (case 3 (expr-stmt (assign log (+ log "c"))) (break))
          (case 4 (expr-stmt (assign log (+ log "d")))))
        log
        "#,
    );
    assert_eq!(s, "bc");
}

#[test]
fn switch_default_participates_by_position() {
    let s = eval_string(
        r#"
        (let log "")
        (switch 9
          (case 1 (expr-stmt (assign log (+ log "a"))))
          (default (expr-stmt (assign log (+ log "d"))))
          (case 2 (expr-stmt (assign log (+ log "b")))))
        log
        "#,
    );
    assert_eq!(s, "db");
}

#[test]
fn switch_uses_strict_equality() {
    let s = eval_string(
        r#"
        (let hit "none")
        (switch "1"
          (case 1 (expr-stmt (assign hit "number")) (break))
          (case "1" (expr-stmt (assign hit "string")) (break)))
        hit
        "#,
    );
    assert_eq!(s, "string");
}

#[test]
fn if_else_chains() {
    let s = eval_string(
        r#"
        (function grade (n)
          (if (>= n 90) (return "a")
            (if (>= n 80) (return "b") (return "c"))))
        (+ (+ (call grade 95) (call grade 83)) (call grade 10))
        "#,
    );
    assert_eq!(s, "abc");
}

#[test]
fn return_inside_a_loop_exits_the_function() {
    let n = eval_number(
        r#"
        (function find-first-even (xs)
          (for-of v xs
            (block (if (=== (% v 2) 0) (block (return v)))))
          (return -1))
        (call find-first-even (array 3 5 8 9))
        "#,
    );
    assert_eq!(n, 8.0);
}
