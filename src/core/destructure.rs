use std::rc::Rc;

use crate::core::cell::Cell;
use crate::core::context::{EvalContext, throw_type_error};
use crate::core::env::JSEnvPtr;
use crate::core::eval::env_error_to_throw;
use crate::core::expr::evaluate_expr;
use crate::core::symbol::{Symbol, Tag};
use crate::core::value::Value;
use crate::js_array::new_js_array;
use crate::js_object::{new_js_object, obj_get, obj_set_own, own_property_names};
use crate::{JSError, raise_ir_error};

/// How pattern leaves bind: fresh block-scoped (`let`/`const`), hoisted
/// (`var`), or plain assignment to existing targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindMode {
    Let,
    Const,
    Var,
    Assign,
}

/// Bind one leaf target. A symbol binds by mode; a nested pattern recurses.
pub fn bind_target(ctx: &EvalContext, env: &JSEnvPtr, target: &Value, value: Value, mode: BindMode) -> Result<(), JSError> {
    match target {
        Value::Symbol(name) => bind_name(ctx, env, *name, value, mode),
        Value::Cell(pattern) => bind_pattern(ctx, env, pattern, &value, mode),
        other => Err(raise_ir_error!(format!("invalid destructuring target: {other}"))),
    }
}

fn bind_name(ctx: &EvalContext, env: &JSEnvPtr, name: Symbol, value: Value, mode: BindMode) -> Result<(), JSError> {
    let result = match mode {
        BindMode::Let => env.define(name, value, false),
        BindMode::Const => env.define(name, value, true),
        BindMode::Var => {
            env.define_function_scoped(name, value, true);
            Ok(())
        }
        BindMode::Assign => env.assign(name, value),
    };
    if let Err(err) = result {
        env_error_to_throw(ctx, err);
    }
    Ok(())
}

/// The shared pattern driver for all three binding modes.
pub fn bind_pattern(ctx: &EvalContext, env: &JSEnvPtr, pattern: &Rc<Cell>, value: &Value, mode: BindMode) -> Result<(), JSError> {
    match pattern.tag() {
        Some(Tag::ArrayPattern) => bind_array_pattern(ctx, env, pattern, value, mode),
        Some(Tag::ObjectPattern) => bind_object_pattern(ctx, env, pattern, value, mode),
        Some(Tag::PatternElement) => {
            // A defaulted single target (function parameters use this form).
            let target = pattern
                .operand(0)
                .ok_or(raise_ir_error!("pattern-element without target"))?
                .clone();
            let effective = resolve_default(ctx, env, value.clone(), pattern.operand(1))?;
            if ctx.should_stop_evaluation() {
                return Ok(());
            }
            bind_target(ctx, env, &target, effective, mode)
        }
        _ => Err(raise_ir_error!("expected a destructuring pattern")),
    }
}

/// Apply a default expression when the incoming value is `undefined`.
fn resolve_default(ctx: &EvalContext, env: &JSEnvPtr, value: Value, default: Option<&Value>) -> Result<Value, JSError> {
    match (&value, default) {
        (Value::Undefined, Some(default_node)) => evaluate_expr(ctx, env, default_node),
        _ => Ok(value),
    }
}

fn bind_array_pattern(ctx: &EvalContext, env: &JSEnvPtr, pattern: &Rc<Cell>, value: &Value, mode: BindMode) -> Result<(), JSError> {
    let elements = match value {
        Value::Array(arr) => arr.borrow().elements.clone(),
        _ => {
            throw_type_error(ctx, "Cannot destructure a non-array value with an array pattern");
            return Ok(());
        }
    };
    let mut index = 0usize;
    for entry in pattern.operands() {
        match entry {
            // a hole just advances the index without binding
            Value::Null => {
                index += 1;
            }
            Value::Cell(element) if element.tag() == Some(Tag::PatternRest) => {
                let name = crate::core::cell::operand_symbol(element, 0).ok_or(raise_ir_error!("pattern-rest without a name"))?;
                let rest: Vec<Value> = elements.iter().skip(index).cloned().collect();
                bind_name(ctx, env, name, Value::Array(new_js_array(rest)), mode)?;
                return Ok(());
            }
            Value::Cell(element) if element.tag() == Some(Tag::PatternElement) => {
                let target = element
                    .operand(0)
                    .ok_or(raise_ir_error!("pattern-element without target"))?
                    .clone();
                let incoming = elements.get(index).cloned().unwrap_or(Value::Undefined);
                let effective = resolve_default(ctx, env, incoming, element.operand(1))?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                bind_target(ctx, env, &target, effective, mode)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                index += 1;
            }
            other => return Err(raise_ir_error!(format!("invalid array-pattern entry: {other}"))),
        }
    }
    Ok(())
}

fn bind_object_pattern(ctx: &EvalContext, env: &JSEnvPtr, pattern: &Rc<Cell>, value: &Value, mode: BindMode) -> Result<(), JSError> {
    let Value::Object(obj) = value else {
        throw_type_error(ctx, "Cannot destructure a non-object value with an object pattern");
        return Ok(());
    };
    let mut consumed: Vec<String> = Vec::new();
    for entry in pattern.operands() {
        let Value::Cell(element) = entry else {
            return Err(raise_ir_error!(format!("invalid object-pattern entry: {entry}")));
        };
        match element.tag() {
            Some(Tag::PatternProperty) => {
                let key = match element.operand(0) {
                    Some(Value::Symbol(sym)) => sym.name().to_string(),
                    Some(Value::String(s)) => s.to_string(),
                    other => return Err(raise_ir_error!(format!("invalid pattern-property key: {other:?}"))),
                };
                // no explicit target means shorthand: bind under the key name
                let target = match element.operand(1) {
                    Some(Value::Null) | None => Value::Symbol(Symbol::intern(&key)),
                    Some(other) => other.clone(),
                };
                let incoming = obj_get(ctx, env, obj, &key)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                let effective = resolve_default(ctx, env, incoming, element.operand(2))?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                bind_target(ctx, env, &target, effective, mode)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                consumed.push(key);
            }
            Some(Tag::PatternRest) => {
                let name = crate::core::cell::operand_symbol(element, 0).ok_or(raise_ir_error!("pattern-rest without a name"))?;
                let rest = new_js_object();
                for key in own_property_names(obj) {
                    if !consumed.contains(&key) {
                        let val = obj_get(ctx, env, obj, &key)?;
                        obj_set_own(&rest, &key, val);
                    }
                }
                bind_name(ctx, env, name, Value::Object(rest), mode)?;
                return Ok(());
            }
            _ => return Err(raise_ir_error!("invalid object-pattern entry")),
        }
    }
    Ok(())
}
