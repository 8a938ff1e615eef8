use std::rc::Rc;

use crate::core::cell::{Cell, operand_symbol, operand_tail};
use crate::core::context::{EvalContext, format_thrown, throw_reference_error, throw_syntax_error, throw_type_error};
use crate::core::destructure::{BindMode, bind_pattern};
use crate::core::env::{EnvError, JSEnv, JSEnvPtr};
use crate::core::expr::evaluate_expr;
use crate::core::ops::strict_equals;
use crate::core::symbol::{Symbol, Tag};
use crate::core::value::{Value, is_truthy, type_of, well_known_js_symbol};
use crate::js_function::invoke_value;
use crate::js_object::{js_symbol_key, obj_try_get, own_property_names};
use crate::{JSError, raise_eval_error, raise_ir_error};

/// Convert an environment failure into the matching user-visible error
/// (armed as a Throw signal; the returned value is always `undefined`).
pub fn env_error_to_throw(ctx: &EvalContext, err: EnvError) -> Value {
    match err {
        EnvError::Tdz(name) => throw_reference_error(ctx, &format!("Cannot access '{name}' before initialization")),
        EnvError::Unbound(name) => throw_reference_error(ctx, &format!("{name} is not defined")),
        EnvError::ConstAssign(_) => throw_type_error(ctx, "Assignment to constant variable."),
        EnvError::ConstRedeclare(name) => throw_syntax_error(ctx, &format!("Identifier '{name}' has already been declared")),
        EnvError::UndeclaredAssign(name) => throw_reference_error(ctx, &format!("{name} is not defined")),
    }
}

/// The single public entry point that converts an unhandled `Throw` into a
/// host error. Everything below it leaves signals on the context.
pub fn evaluate_program(ir: Option<&Rc<Cell>>, env: &JSEnvPtr) -> Result<Value, JSError> {
    let ctx = EvalContext::new();
    let value = evaluate_statements(&ctx, env, ir)?;
    if let Some(thrown) = ctx.take_throw() {
        return Err(JSError::UncaughtThrow {
            message: format_thrown(&thrown),
            value: thrown,
        });
    }
    if ctx.should_stop_evaluation() {
        return Err(raise_eval_error!("control-flow signal escaped the program top level"));
    }
    Ok(value)
}

/// Evaluate a statement list in `env`. Hoists declarations first, checks the
/// signal slot between statements (which is also what makes host-initiated
/// interruption prompt), and yields the last expression-statement value.
pub fn evaluate_statements(ctx: &EvalContext, env: &JSEnvPtr, list: Option<&Rc<Cell>>) -> Result<Value, JSError> {
    let Some(list) = list else {
        return Ok(Value::Undefined);
    };
    hoist_declarations(ctx, env, list)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    let mut last_value = Value::Undefined;
    for stmt in list.items() {
        evaluate_statement(ctx, env, stmt, &mut last_value)?;
        if ctx.should_stop_evaluation() {
            return Ok(Value::Undefined);
        }
    }
    Ok(last_value)
}

/// Collect the names a pattern binds, for the hoisting pre-pass.
fn collect_pattern_names(pattern: &Rc<Cell>, out: &mut Vec<Symbol>) {
    for entry in pattern.operands() {
        if let Value::Cell(element) = entry {
            match element.tag() {
                Some(Tag::PatternElement) => match element.operand(0) {
                    Some(Value::Symbol(name)) => out.push(*name),
                    Some(Value::Cell(nested)) => collect_pattern_names(nested, out),
                    _ => {}
                },
                Some(Tag::PatternProperty) => match element.operand(1) {
                    Some(Value::Symbol(name)) => out.push(*name),
                    Some(Value::Cell(nested)) => collect_pattern_names(nested, out),
                    // shorthand: the key doubles as the target
                    Some(Value::Null) | None => {
                        if let Some(Value::Symbol(key)) = element.operand(0) {
                            out.push(*key);
                        }
                    }
                    _ => {}
                },
                Some(Tag::PatternRest) => {
                    if let Some(name) = operand_symbol(element, 0) {
                        out.push(name);
                    }
                }
                _ => {}
            }
        }
    }
}

fn declaration_names(target: Option<&Value>, out: &mut Vec<Symbol>) {
    match target {
        Some(Value::Symbol(name)) => out.push(*name),
        Some(Value::Cell(pattern)) => collect_pattern_names(pattern, out),
        _ => {}
    }
}

/// The hoisting pre-pass for one scope: `let`/`const`/`class` names become
/// visible-but-uninitialized (the TDZ), function declarations bind eagerly,
/// and `var` names surface to the function boundary from any nesting depth
/// short of another function body.
fn hoist_declarations(ctx: &EvalContext, env: &JSEnvPtr, list: &Rc<Cell>) -> Result<(), JSError> {
    for stmt in list.items() {
        let Value::Cell(cell) = stmt else { continue };
        match cell.tag() {
            Some(Tag::Let | Tag::Const) => {
                let mut names = Vec::new();
                declaration_names(cell.operand(0), &mut names);
                for name in names {
                    env.declare_uninitialized(name);
                }
            }
            Some(Tag::Class) => {
                if let Some(name) = operand_symbol(cell, 0) {
                    env.declare_uninitialized(name);
                }
            }
            Some(Tag::Function | Tag::Generator) => {
                let name = operand_symbol(cell, 0).ok_or(raise_ir_error!("function declaration without a name"))?;
                let value = evaluate_expr(ctx, env, stmt)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                if let Err(err) = env.define(name, value, false) {
                    env_error_to_throw(ctx, err);
                    return Ok(());
                }
            }
            _ => hoist_vars(env, stmt),
        }
    }
    Ok(())
}

/// Recursive `var` hoisting through nested statements. Function bodies are
/// their own hoisting domains and are not entered.
fn hoist_vars(env: &JSEnvPtr, stmt: &Value) {
    let Value::Cell(cell) = stmt else { return };
    match cell.tag() {
        Some(Tag::Var) => {
            let mut names = Vec::new();
            declaration_names(cell.operand(0), &mut names);
            for name in names {
                env.define_function_scoped(name, Value::Undefined, false);
            }
        }
        Some(Tag::Block) => {
            for inner in cell.operands() {
                hoist_vars(env, inner);
            }
        }
        Some(Tag::If) => {
            if let Some(then_branch) = cell.operand(1) {
                hoist_vars(env, then_branch);
            }
            if let Some(else_branch) = cell.operand(2) {
                hoist_vars(env, else_branch);
            }
        }
        Some(Tag::While) => {
            if let Some(body) = cell.operand(1) {
                hoist_vars(env, body);
            }
        }
        Some(Tag::DoWhile) => {
            if let Some(body) = cell.operand(0) {
                hoist_vars(env, body);
            }
        }
        Some(Tag::For) => {
            if let Some(init) = cell.operand(0) {
                hoist_vars(env, init);
            }
            if let Some(body) = cell.operand(3) {
                hoist_vars(env, body);
            }
        }
        Some(Tag::ForIn | Tag::ForOf | Tag::ForAwaitOf) => {
            if let Some(body) = cell.operand(2) {
                hoist_vars(env, body);
            }
        }
        Some(Tag::Label) => {
            if let Some(inner) = cell.operand(1) {
                hoist_vars(env, inner);
            }
        }
        Some(Tag::Try) => {
            for clause in cell.operands() {
                if let Value::Cell(clause_cell) = clause {
                    match clause_cell.tag() {
                        Some(Tag::Catch) => {
                            if let Some(body) = clause_cell.operand(1) {
                                hoist_vars(env, body);
                            }
                        }
                        Some(Tag::Finally) => {
                            if let Some(body) = clause_cell.operand(0) {
                                hoist_vars(env, body);
                            }
                        }
                        _ => hoist_vars(env, clause),
                    }
                }
            }
        }
        Some(Tag::Switch) => {
            for clause in cell.operands().skip(1) {
                if let Value::Cell(clause_cell) = clause
                    && matches!(clause_cell.tag(), Some(Tag::Case | Tag::Default))
                {
                    let skip = if clause_cell.tag() == Some(Tag::Case) { 1 } else { 0 };
                    for inner in clause_cell.operands().skip(skip) {
                        hoist_vars(env, inner);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Dispatch one statement by head tag. Anything that is not a statement tag
/// evaluates as an expression and becomes the running completion value.
pub fn evaluate_statement(ctx: &EvalContext, env: &JSEnvPtr, node: &Value, last_value: &mut Value) -> Result<(), JSError> {
    let cell = match node {
        Value::Cell(cell) => cell,
        leaf => {
            *last_value = evaluate_expr(ctx, env, leaf)?;
            return Ok(());
        }
    };
    let Some(tag) = cell.tag() else {
        return Err(raise_ir_error!(format!("statement head is not a tag: {}", cell.head())));
    };
    log::trace!("evaluate_statement: {tag:?}");
    match tag {
        Tag::Let => evaluate_declaration(ctx, env, cell, BindMode::Let),
        Tag::Const => evaluate_declaration(ctx, env, cell, BindMode::Const),
        Tag::Var => evaluate_declaration(ctx, env, cell, BindMode::Var),
        Tag::Function | Tag::Generator => {
            // hoisting already bound top-level declarations; nested ones
            // (e.g. inside an if arm) bind here
            let name = operand_symbol(cell, 0).ok_or(raise_ir_error!("function declaration without a name"))?;
            if !env.has_own(name) {
                let value = evaluate_expr(ctx, env, node)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                if let Err(err) = env.define(name, value, false) {
                    env_error_to_throw(ctx, err);
                }
            }
            Ok(())
        }
        Tag::Class => {
            let name = operand_symbol(cell, 0).ok_or(raise_ir_error!("class declaration without a name"))?;
            let value = crate::js_class::build_class(ctx, env, cell)?;
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
            if let Err(err) = env.define(name, value, false) {
                env_error_to_throw(ctx, err);
            }
            Ok(())
        }
        Tag::Block => {
            let block_env = JSEnv::new(Some(env), false);
            let value = evaluate_statements(ctx, &block_env, cell.rest())?;
            if !ctx.should_stop_evaluation() {
                *last_value = value;
            }
            Ok(())
        }
        Tag::ExprStmt => {
            let value = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("expr-stmt without expression"))?)?;
            if !ctx.should_stop_evaluation() {
                *last_value = value;
            }
            Ok(())
        }
        Tag::If => {
            let cond = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("if without condition"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
            let branch = if is_truthy(&cond) { cell.operand(1) } else { cell.operand(2) };
            if let Some(branch) = branch {
                evaluate_statement(ctx, env, branch, last_value)?;
            }
            Ok(())
        }
        Tag::While => {
            let cond = cell.operand(0).ok_or(raise_ir_error!("while without condition"))?;
            let body = cell.operand(1).ok_or(raise_ir_error!("while without body"))?;
            loop {
                let test = evaluate_expr(ctx, env, cond)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                if !is_truthy(&test) {
                    break;
                }
                evaluate_statement(ctx, env, body, last_value)?;
                if !loop_continues(ctx) {
                    break;
                }
            }
            Ok(())
        }
        Tag::DoWhile => {
            let body = cell.operand(0).ok_or(raise_ir_error!("do-while without body"))?;
            let cond = cell.operand(1).ok_or(raise_ir_error!("do-while without condition"))?;
            loop {
                evaluate_statement(ctx, env, body, last_value)?;
                if !loop_continues(ctx) {
                    break;
                }
                let test = evaluate_expr(ctx, env, cond)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                if !is_truthy(&test) {
                    break;
                }
            }
            Ok(())
        }
        Tag::For => evaluate_for(ctx, env, cell, last_value),
        Tag::ForIn => evaluate_for_in(ctx, env, cell, last_value),
        Tag::ForOf => evaluate_for_of(ctx, env, cell, last_value),
        Tag::ForAwaitOf => evaluate_for_await_of(ctx, env, cell, last_value),
        Tag::Switch => evaluate_switch(ctx, env, cell, last_value),
        Tag::Try => evaluate_try(ctx, env, cell, last_value),
        Tag::Throw => {
            let value = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("throw without value"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
            ctx.set_throw(value);
            Ok(())
        }
        Tag::Return => {
            let value = match cell.operand(0) {
                Some(node) => evaluate_expr(ctx, env, node)?,
                None => Value::Undefined,
            };
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
            ctx.set_return(value);
            Ok(())
        }
        Tag::Break => {
            ctx.set_break();
            Ok(())
        }
        Tag::Continue => {
            ctx.set_continue();
            Ok(())
        }
        Tag::Label => {
            let inner = cell.operand(1).ok_or(raise_ir_error!("label without statement"))?;
            evaluate_statement(ctx, env, inner, last_value)?;
            // a labelled statement absorbs a break escaping its body
            if ctx.is_break() {
                ctx.clear_signal();
            }
            Ok(())
        }
        Tag::EmptyStmt => Ok(()),
        Tag::UseStrict => {
            env.set_strict(true);
            Ok(())
        }
        _ => {
            // expression in statement position
            let value = evaluate_expr(ctx, env, node)?;
            if !ctx.should_stop_evaluation() {
                *last_value = value;
            }
            Ok(())
        }
    }
}

/// After a loop body ran: true means take another iteration. Break ends the
/// loop, Continue re-enters it, anything else propagates.
fn loop_continues(ctx: &EvalContext) -> bool {
    if ctx.is_break() {
        ctx.clear_signal();
        return false;
    }
    if ctx.is_continue() {
        ctx.clear_signal();
        return true;
    }
    !ctx.should_stop_evaluation()
}

fn evaluate_declaration(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, mode: BindMode) -> Result<(), JSError> {
    let target = cell.operand(0).ok_or(raise_ir_error!("declaration without target"))?;
    match target {
        Value::Symbol(name) => {
            let has_initializer = cell.operand(1).is_some();
            if mode == BindMode::Const && !has_initializer {
                return Err(raise_ir_error!("const declaration without initializer"));
            }
            let value = match cell.operand(1) {
                Some(init) => {
                    let v = evaluate_expr(ctx, env, init)?;
                    if ctx.should_stop_evaluation() {
                        return Ok(());
                    }
                    v
                }
                None => Value::Undefined,
            };
            let result = match mode {
                BindMode::Let => env.define(*name, value, false),
                BindMode::Const => env.define(*name, value, true),
                BindMode::Var => {
                    env.define_function_scoped(*name, value, has_initializer);
                    Ok(())
                }
                BindMode::Assign => unreachable!("declaration statements never use assign mode"),
            };
            if let Err(err) = result {
                env_error_to_throw(ctx, err);
            }
            Ok(())
        }
        Value::Cell(pattern) => {
            let init = cell.operand(1).ok_or(raise_ir_error!("destructuring declaration without initializer"))?;
            let value = evaluate_expr(ctx, env, init)?;
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
            bind_pattern(ctx, env, pattern, &value, mode)
        }
        other => Err(raise_ir_error!(format!("invalid declaration target: {other}"))),
    }
}

fn evaluate_for(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, last_value: &mut Value) -> Result<(), JSError> {
    // the loop head gets its own scope so `let` initializers stay local
    let loop_env = JSEnv::new(Some(env), false);
    if let Some(init) = cell.operand(0)
        && !matches!(init, Value::Null)
    {
        evaluate_statement(ctx, &loop_env, init, last_value)?;
        if ctx.should_stop_evaluation() {
            return Ok(());
        }
    }
    let cond = cell.operand(1);
    let incr = cell.operand(2);
    let body = cell.operand(3).ok_or(raise_ir_error!("for without body"))?;
    loop {
        if let Some(cond) = cond
            && !matches!(cond, Value::Null)
        {
            let test = evaluate_expr(ctx, &loop_env, cond)?;
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
            if !is_truthy(&test) {
                break;
            }
        }
        evaluate_statement(ctx, &loop_env, body, last_value)?;
        if !loop_continues(ctx) {
            break;
        }
        if let Some(incr) = incr
            && !matches!(incr, Value::Null)
        {
            evaluate_expr(ctx, &loop_env, incr)?;
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Enumerable own string keys for `for-in`: object keys in insertion order,
/// index strings for arrays and strings.
fn for_in_keys(target: &Value) -> Vec<String> {
    match target {
        Value::Object(obj) => own_property_names(obj),
        Value::Array(arr) => (0..arr.borrow().elements.len()).map(|i| i.to_string()).collect(),
        Value::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn evaluate_for_in(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, last_value: &mut Value) -> Result<(), JSError> {
    let name = operand_symbol(cell, 0).ok_or(raise_ir_error!("for-in without binding"))?;
    let target = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("for-in without target"))?)?;
    if ctx.should_stop_evaluation() {
        return Ok(());
    }
    let body = cell.operand(2).ok_or(raise_ir_error!("for-in without body"))?;
    for key in for_in_keys(&target) {
        let iter_env = JSEnv::new(Some(env), false);
        iter_env
            .define(name, Value::str(&key), false)
            .map_err(|_| raise_eval_error!("failed to bind for-in variable"))?;
        evaluate_statement(ctx, &iter_env, body, last_value)?;
        if !loop_continues(ctx) {
            break;
        }
    }
    Ok(())
}

fn evaluate_for_of(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, last_value: &mut Value) -> Result<(), JSError> {
    let name = operand_symbol(cell, 0).ok_or(raise_ir_error!("for-of without binding"))?;
    let target = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("for-of without target"))?)?;
    if ctx.should_stop_evaluation() {
        return Ok(());
    }
    let body = cell.operand(2).ok_or(raise_ir_error!("for-of without body"))?;
    let values: Vec<Value> = match &target {
        Value::Array(arr) => arr.borrow().elements.clone(),
        Value::String(s) => s.chars().map(|c| Value::str(&c.to_string())).collect(),
        other => {
            throw_type_error(ctx, &format!("{} is not iterable", type_of(other)));
            return Ok(());
        }
    };
    for value in values {
        let iter_env = JSEnv::new(Some(env), false);
        iter_env
            .define(name, value, false)
            .map_err(|_| raise_eval_error!("failed to bind for-of variable"))?;
        evaluate_statement(ctx, &iter_env, body, last_value)?;
        if !loop_continues(ctx) {
            break;
        }
    }
    Ok(())
}

/// `for-await-of`: prefer the async iterator protocol, then the sync one,
/// and fall back to direct iteration for arrays and strings. A `then`-able
/// step result cannot be settled synchronously and raises the redirect
/// error.
fn evaluate_for_await_of(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, last_value: &mut Value) -> Result<(), JSError> {
    let name = operand_symbol(cell, 0).ok_or(raise_ir_error!("for-await-of without binding"))?;
    let target = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("for-await-of without target"))?)?;
    if ctx.should_stop_evaluation() {
        return Ok(());
    }
    let body = cell.operand(2).ok_or(raise_ir_error!("for-await-of without body"))?;

    let iterator_method = match &target {
        Value::Object(obj) => {
            let async_key = js_symbol_key(&well_known_js_symbol("asyncIterator"));
            let sync_key = js_symbol_key(&well_known_js_symbol("iterator"));
            match obj_try_get(ctx, env, obj, &async_key)? {
                Some(method) => Some(method),
                None => obj_try_get(ctx, env, obj, &sync_key)?,
            }
        }
        _ => None,
    };
    if ctx.should_stop_evaluation() {
        return Ok(());
    }

    let Some(method) = iterator_method else {
        // no protocol on the target: arrays and strings iterate directly
        return match &target {
            Value::Array(_) | Value::String(_) => {
                let for_of = Cell::new(
                    Value::Symbol(Symbol::intern("for-of")),
                    operand_tail(cell, 0),
                );
                evaluate_for_of(ctx, env, &for_of, last_value)
            }
            other => {
                throw_type_error(ctx, &format!("{} is not async iterable", type_of(other)));
                Ok(())
            }
        };
    };

    let iterator = invoke_value(ctx, env, &method, &[], &target)?;
    if ctx.should_stop_evaluation() {
        return Ok(());
    }
    loop {
        let next = crate::core::expr::get_member(ctx, env, &iterator, "next")?;
        if ctx.should_stop_evaluation() {
            return Ok(());
        }
        let step = invoke_value(ctx, env, &next, &[], &iterator)?;
        if ctx.should_stop_evaluation() {
            return Ok(());
        }
        let Value::Object(step_obj) = &step else {
            throw_type_error(ctx, "Iterator result is not an object");
            return Ok(());
        };
        let then = obj_try_get(ctx, env, step_obj, "then")?;
        if then.is_some_and(|t| t.is_callable()) {
            throw_type_error(ctx, "for await...of over promise-returning iterators must run inside an async function");
            return Ok(());
        }
        let done = obj_try_get(ctx, env, step_obj, "done")?.unwrap_or(Value::Undefined);
        if is_truthy(&done) {
            break;
        }
        let value = obj_try_get(ctx, env, step_obj, "value")?.unwrap_or(Value::Undefined);
        let iter_env = JSEnv::new(Some(env), false);
        iter_env
            .define(name, value, false)
            .map_err(|_| raise_eval_error!("failed to bind for-await-of variable"))?;
        evaluate_statement(ctx, &iter_env, body, last_value)?;
        if !loop_continues(ctx) {
            break;
        }
    }
    Ok(())
}

fn evaluate_switch(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, last_value: &mut Value) -> Result<(), JSError> {
    let discriminant = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("switch without discriminant"))?)?;
    if ctx.should_stop_evaluation() {
        return Ok(());
    }

    // first pass: find the match point, remembering `default` by position
    let clauses: Vec<&Rc<Cell>> = cell
        .operands()
        .skip(1)
        .filter_map(|entry| match entry {
            Value::Cell(clause) if matches!(clause.tag(), Some(Tag::Case | Tag::Default)) => Some(clause),
            _ => None,
        })
        .collect();
    let mut match_index = None;
    let mut default_index = None;
    for (i, clause) in clauses.iter().enumerate() {
        match clause.tag() {
            Some(Tag::Case) => {
                let test = evaluate_expr(ctx, env, clause.operand(0).ok_or(raise_ir_error!("case without test"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                if strict_equals(&discriminant, &test) {
                    match_index = Some(i);
                    break;
                }
            }
            _ => default_index = Some(i),
        }
    }
    let Some(start) = match_index.or(default_index) else {
        return Ok(());
    };

    // second pass: execute every clause body from the match point until a
    // break surfaces (fall-through), all in one switch-body scope
    let switch_env = JSEnv::new(Some(env), false);
    for clause in clauses.iter().skip(start) {
        let skip = if clause.tag() == Some(Tag::Case) { 1 } else { 0 };
        for stmt in clause.operands().skip(skip) {
            evaluate_statement(ctx, &switch_env, stmt, last_value)?;
            if ctx.is_break() {
                ctx.clear_signal();
                return Ok(());
            }
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
        }
    }
    Ok(())
}

fn evaluate_try(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, last_value: &mut Value) -> Result<(), JSError> {
    let body = cell.operand(0).ok_or(raise_ir_error!("try without body"))?;
    let mut catch_clause = None;
    let mut finally_clause = None;
    for clause in cell.operands().skip(1) {
        if let Value::Cell(clause_cell) = clause {
            match clause_cell.tag() {
                Some(Tag::Catch) => catch_clause = Some(clause_cell.clone()),
                Some(Tag::Finally) => finally_clause = Some(clause_cell.clone()),
                _ => return Err(raise_ir_error!("invalid try clause")),
            }
        }
    }

    evaluate_statement(ctx, env, body, last_value)?;

    if let Some(catch_clause) = catch_clause
        && let Some(thrown) = ctx.take_throw()
    {
        let catch_env = JSEnv::new(Some(env), false);
        // the catch binding is optional: `catch { ... }` passes null
        if let Some(name) = operand_symbol(&catch_clause, 0) {
            catch_env
                .define(name, thrown, false)
                .map_err(|_| raise_eval_error!("failed to bind catch parameter"))?;
        }
        if let Some(catch_body) = catch_clause.operand(1) {
            evaluate_statement(ctx, &catch_env, catch_body, last_value)?;
        }
    }

    if let Some(finally_clause) = finally_clause {
        // finally may override the pending signal: stash it, run the block,
        // and restore unless the block raised its own. Its completion value
        // is discarded.
        let pending = ctx.take_signal();
        let mut discarded = Value::Undefined;
        if let Some(finally_body) = finally_clause.operand(0) {
            evaluate_statement(ctx, env, finally_body, &mut discarded)?;
        }
        if !ctx.should_stop_evaluation() {
            ctx.restore_signal(pending);
        }
    }
    Ok(())
}
