use std::rc::Rc;

use crate::core::cell::{Cell, operand_cell, operand_symbol, operand_tail};
use crate::core::context::{EvalContext, throw_type_error};
use crate::core::destructure::{BindMode, bind_pattern};
use crate::core::env::JSEnvPtr;
use crate::core::eval::env_error_to_throw;
use crate::core::ops::{apply_binary, js_bit_not, js_negate, to_js_string, to_number, to_property_key};
use crate::core::symbol::{Symbol, Tag, super_binding_symbol, this_symbol};
use crate::core::value::{Value, is_truthy, type_of};
use crate::js_array::{array_get_member, array_index_of, array_set_member, new_js_array};
use crate::js_function::{JSFunction, Param, SuperBinding, invoke_value};
use crate::js_object::{define_getter, define_setter, new_js_object, obj_delete_own, obj_get, obj_set, obj_set_own, own_property_names};
use crate::{JSError, raise_eval_error, raise_ir_error};

/// Evaluate one expression node: a leaf value, a bare symbol (variable
/// read), or a tagged cell.
pub fn evaluate_expr(ctx: &EvalContext, env: &JSEnvPtr, node: &Value) -> Result<Value, JSError> {
    match node {
        Value::Symbol(name) => match env.get(*name) {
            Ok(value) => Ok(value),
            Err(err) => Ok(env_error_to_throw(ctx, err)),
        },
        Value::Cell(cell) => evaluate_expr_cell(ctx, env, cell),
        leaf => Ok(leaf.clone()),
    }
}

fn evaluate_expr_cell(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    let tag = cell
        .tag()
        .ok_or(raise_ir_error!(format!("expression head is not a tag: {}", cell.head())))?;
    log::trace!("evaluate_expr_cell: {tag:?}");
    match tag {
        Tag::Undefined => Ok(Value::Undefined),
        Tag::This => Ok(env.try_get(this_symbol()).unwrap_or(Value::Undefined)),
        Tag::Super => Ok(Value::Super(get_super_binding(env)?)),
        Tag::Lambda => {
            let (params, rest) = parse_params(cell.operand(0))?;
            let body = operand_tail(cell, 1);
            Ok(Value::Function(JSFunction::new(None, params, rest, body, env)))
        }
        Tag::Function | Tag::Generator => {
            let name = operand_symbol(cell, 0);
            let (params, rest) = parse_params(cell.operand(1))?;
            let body = operand_tail(cell, 2);
            // a named function expression can call itself: give the closure
            // a frame that sees its own name
            let closure_env = crate::core::env::JSEnv::new(Some(env), false);
            let fun = JSFunction::new(name, params, rest, body, &closure_env);
            let value = if tag == Tag::Generator {
                Value::GeneratorFactory(fun)
            } else {
                Value::Function(fun)
            };
            if let Some(name) = name {
                closure_env
                    .define(name, value.clone(), false)
                    .map_err(|_| raise_eval_error!("failed to bind function name"))?;
            }
            Ok(value)
        }
        Tag::Class => crate::js_class::build_class(ctx, env, cell),
        Tag::Object => evaluate_object_literal(ctx, env, cell),
        Tag::Array => evaluate_array_literal(ctx, env, cell),
        Tag::Template => evaluate_template(ctx, env, cell),
        Tag::TaggedTemplate => evaluate_tagged_template(ctx, env, cell),
        Tag::Ternary => {
            let cond = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("ternary without condition"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let branch = if is_truthy(&cond) { cell.operand(1) } else { cell.operand(2) };
            match branch {
                Some(node) => evaluate_expr(ctx, env, node),
                None => Ok(Value::Undefined),
            }
        }
        Tag::Assign => {
            let target = cell.operand(0).ok_or(raise_ir_error!("assign without target"))?.clone();
            let value = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("assign without value"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            assign_to_target(ctx, env, &target, value)
        }
        Tag::SetProp => {
            let base = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("set-prop without object"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let key = prop_name(cell.operand(1))?;
            let value = evaluate_expr(ctx, env, cell.operand(2).ok_or(raise_ir_error!("set-prop without value"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            set_member(ctx, env, &base, &key, value.clone())?;
            Ok(value)
        }
        Tag::SetIndex => {
            let base = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("set-index without object"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let index = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("set-index without index"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let value = evaluate_expr(ctx, env, cell.operand(2).ok_or(raise_ir_error!("set-index without value"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            set_index(ctx, env, &base, &index, value.clone())?;
            Ok(value)
        }
        Tag::GetProp | Tag::OptionalGetProp => {
            let base = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("get-prop without object"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if tag == Tag::OptionalGetProp && base.is_nullish() {
                return Ok(Value::Undefined);
            }
            let key = prop_name(cell.operand(1))?;
            get_member(ctx, env, &base, &key)
        }
        Tag::GetIndex | Tag::OptionalGetIndex => {
            let base = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("get-index without object"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if tag == Tag::OptionalGetIndex && base.is_nullish() {
                return Ok(Value::Undefined);
            }
            let index = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("get-index without index"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            get_index(ctx, env, &base, &index)
        }
        Tag::Call | Tag::OptionalCall => evaluate_call(ctx, env, cell, tag == Tag::OptionalCall),
        Tag::New => evaluate_new(ctx, env, cell),
        Tag::TypeOf => {
            // never throws: an unbound identifier answers "undefined"
            match cell.operand(0) {
                Some(Value::Symbol(name)) => match env.try_get(*name) {
                    Some(value) => Ok(Value::str(type_of(&value))),
                    None => Ok(Value::str("undefined")),
                },
                Some(node) => {
                    let value = evaluate_expr(ctx, env, node)?;
                    if ctx.should_stop_evaluation() {
                        return Ok(Value::Undefined);
                    }
                    Ok(Value::str(type_of(&value)))
                }
                None => Err(raise_ir_error!("typeof without operand")),
            }
        }
        Tag::Void => {
            evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("void without operand"))?)?;
            Ok(Value::Undefined)
        }
        Tag::Delete => evaluate_delete(ctx, env, cell),
        Tag::Not => {
            let value = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("not without operand"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            Ok(Value::Boolean(!is_truthy(&value)))
        }
        Tag::Negate | Tag::UnaryPlus | Tag::BitNot => {
            let value = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("unary without operand"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            match tag {
                Tag::Negate => js_negate(ctx, &value),
                Tag::BitNot => js_bit_not(ctx, &value),
                _ => match value {
                    // unary plus refuses BigInt, like ToNumber
                    Value::Number(n) => Ok(Value::Number(n)),
                    other => Ok(Value::Number(to_number(ctx, &other)?)),
                },
            }
        }
        Tag::PreInc | Tag::PreDec | Tag::PostInc | Tag::PostDec => evaluate_increment(ctx, env, cell, tag),
        Tag::LogicalAnd => {
            let lhs = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("&& without lhs"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if !is_truthy(&lhs) {
                return Ok(lhs);
            }
            evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("&& without rhs"))?)
        }
        Tag::LogicalOr => {
            let lhs = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("|| without lhs"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if is_truthy(&lhs) {
                return Ok(lhs);
            }
            evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("|| without rhs"))?)
        }
        Tag::Nullish => {
            let lhs = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("?? without lhs"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if !lhs.is_nullish() {
                return Ok(lhs);
            }
            evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("?? without rhs"))?)
        }
        Tag::Comma => {
            evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("comma without lhs"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("comma without rhs"))?)
        }
        Tag::Yield => crate::js_generator::evaluate_yield(ctx, env, cell.operand(0)),
        Tag::YieldStar => crate::js_generator::evaluate_yield_star(ctx, env, cell.operand(0).ok_or(raise_ir_error!("yield* without operand"))?),
        Tag::Add
        | Tag::Sub
        | Tag::Mul
        | Tag::Div
        | Tag::Mod
        | Tag::Pow
        | Tag::Eq
        | Tag::NotEq
        | Tag::StrictEq
        | Tag::StrictNotEq
        | Tag::Lt
        | Tag::Le
        | Tag::Gt
        | Tag::Ge
        | Tag::BitAnd
        | Tag::BitOr
        | Tag::BitXor
        | Tag::Shl
        | Tag::Shr
        | Tag::UShr
        | Tag::InstanceOf
        | Tag::In => {
            let lhs = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("binary without lhs"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let rhs = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("binary without rhs"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            apply_binary(ctx, tag, &lhs, &rhs)
        }
        Tag::Spread => Err(raise_ir_error!("spread outside of call, array or object literal")),
        other => Err(raise_ir_error!(format!("unexpected tag in expression position: {other:?}"))),
    }
}

/// Parse a parameter list: plain names, patterns, defaulted
/// `pattern-element`s, and a trailing `(rest name)`.
pub fn parse_params(node: Option<&Value>) -> Result<(Vec<Param>, Option<Symbol>), JSError> {
    let mut params = Vec::new();
    let mut rest = None;
    let Some(node) = node else {
        return Ok((params, rest));
    };
    let list = match node {
        Value::Null => return Ok((params, rest)),
        Value::Cell(list) => list,
        other => return Err(raise_ir_error!(format!("invalid parameter list: {other}"))),
    };
    for entry in list.items() {
        if rest.is_some() {
            return Err(raise_ir_error!("rest parameter must be last"));
        }
        match entry {
            Value::Symbol(name) => params.push(Param::Name(*name)),
            Value::Cell(pattern) if pattern.tag() == Some(Tag::Rest) => {
                rest = Some(
                    crate::core::cell::operand_symbol(pattern, 0).ok_or(raise_ir_error!("rest parameter without a name"))?,
                );
            }
            Value::Cell(pattern)
                if matches!(
                    pattern.tag(),
                    Some(Tag::ArrayPattern | Tag::ObjectPattern | Tag::PatternElement)
                ) =>
            {
                params.push(Param::Pattern(pattern.clone()));
            }
            other => return Err(raise_ir_error!(format!("invalid parameter: {other}"))),
        }
    }
    Ok((params, rest))
}

/// A property name operand: a symbol or a string leaf.
fn prop_name(node: Option<&Value>) -> Result<String, JSError> {
    match node {
        Some(Value::Symbol(sym)) => Ok(sym.name().to_string()),
        Some(Value::String(s)) => Ok(s.to_string()),
        other => Err(raise_ir_error!(format!("invalid property name: {other:?}"))),
    }
}

fn evaluate_object_literal(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    let obj = new_js_object();
    for entry in cell.operands() {
        let Value::Cell(member) = entry else {
            return Err(raise_ir_error!(format!("invalid object literal entry: {entry}")));
        };
        match member.tag() {
            Some(Tag::Prop) => {
                let key = object_key(ctx, env, member.operand(0))?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                let value = evaluate_expr(ctx, env, member.operand(1).ok_or(raise_ir_error!("prop without value"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                obj_set_own(&obj, &key, value);
            }
            Some(Tag::Method) => {
                let key = object_key(ctx, env, member.operand(0))?;
                let (params, rest) = parse_params(member.operand(1))?;
                let body = operand_tail(member, 2);
                let name = operand_symbol(member, 0);
                obj_set_own(&obj, &key, Value::Function(JSFunction::new(name, params, rest, body, env)));
            }
            Some(Tag::Getter) => {
                let key = object_key(ctx, env, member.operand(0))?;
                let body = operand_tail(member, 1);
                define_getter(&obj, &key, Value::Function(JSFunction::new(None, Vec::new(), None, body, env)));
            }
            Some(Tag::Setter) => {
                let key = object_key(ctx, env, member.operand(0))?;
                let (params, rest) = parse_params(member.operand(1))?;
                let body = operand_tail(member, 2);
                define_setter(&obj, &key, Value::Function(JSFunction::new(None, params, rest, body, env)));
            }
            Some(Tag::Spread) => {
                let source = evaluate_expr(ctx, env, member.operand(0).ok_or(raise_ir_error!("spread without operand"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                match source {
                    Value::Object(src) => {
                        for key in own_property_names(&src) {
                            let value = obj_get(ctx, env, &src, &key)?;
                            if ctx.should_stop_evaluation() {
                                return Ok(Value::Undefined);
                            }
                            obj_set_own(&obj, &key, value);
                        }
                    }
                    Value::Array(src) => {
                        for (i, value) in src.borrow().elements.iter().enumerate() {
                            obj_set_own(&obj, &i.to_string(), value.clone());
                        }
                    }
                    // nullish spreads contribute nothing
                    Value::Undefined | Value::Null => {}
                    other => {
                        return Ok(throw_type_error(ctx, &format!("Cannot spread {} into an object", type_of(&other))));
                    }
                }
            }
            _ => return Err(raise_ir_error!("invalid object literal entry")),
        }
    }
    Ok(Value::Object(obj))
}

/// Object literal keys: symbols and strings name directly; anything else is
/// a computed key coerced to a property name.
fn object_key(ctx: &EvalContext, env: &JSEnvPtr, node: Option<&Value>) -> Result<String, JSError> {
    match node {
        Some(Value::Symbol(sym)) => Ok(sym.name().to_string()),
        Some(Value::String(s)) => Ok(s.to_string()),
        Some(Value::Number(n)) => Ok(crate::core::ops::number_to_string(*n)),
        Some(computed) => {
            let value = evaluate_expr(ctx, env, computed)?;
            Ok(to_property_key(&value))
        }
        None => Err(raise_ir_error!("object entry without a key")),
    }
}

fn evaluate_array_literal(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    let mut elements = Vec::new();
    for entry in cell.operands() {
        match entry {
            Value::Cell(spread) if spread.tag() == Some(Tag::Spread) => {
                let source = evaluate_expr(ctx, env, spread.operand(0).ok_or(raise_ir_error!("spread without operand"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                if !spread_into(ctx, &source, &mut elements) {
                    return Ok(Value::Undefined);
                }
            }
            node => {
                let value = evaluate_expr(ctx, env, node)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                elements.push(value);
            }
        }
    }
    Ok(Value::Array(new_js_array(elements)))
}

/// Expand a spread source into `out`. False means a TypeError was thrown.
fn spread_into(ctx: &EvalContext, source: &Value, out: &mut Vec<Value>) -> bool {
    match source {
        Value::Array(arr) => {
            out.extend(arr.borrow().elements.iter().cloned());
            true
        }
        Value::String(s) => {
            out.extend(s.chars().map(|c| Value::str(&c.to_string())));
            true
        }
        other => {
            throw_type_error(ctx, &format!("{} is not iterable", type_of(other)));
            false
        }
    }
}

fn evaluate_template(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    let mut out = String::new();
    for part in cell.operands() {
        match part {
            Value::String(s) => out.push_str(s),
            node => {
                let value = evaluate_expr(ctx, env, node)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                out.push_str(&to_js_string(&value));
            }
        }
    }
    Ok(Value::str(&out))
}

fn evaluate_tagged_template(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    let tag_fn = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("tagged-template without tag"))?)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    let strings_cell = operand_cell(cell, 1).ok_or(raise_ir_error!("tagged-template without strings"))?;
    let strings: Vec<Value> = strings_cell.operands().cloned().collect();
    // the template object is the strings array carrying a `raw` property
    let template = new_js_array(strings.clone());
    let raw = new_js_array(strings);
    {
        let properties = template.borrow().properties.clone();
        obj_set_own(&properties, "raw", Value::Array(raw));
    }
    let mut args = vec![Value::Array(template)];
    if let Some(subs) = operand_tail(cell, 2) {
        for sub in subs.items() {
            let value = evaluate_expr(ctx, env, sub)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            args.push(value);
        }
    }
    invoke_value(ctx, env, &tag_fn, &args, &Value::Undefined)
}

fn evaluate_delete(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    if let Some(Value::Cell(target)) = cell.operand(0) {
        match target.tag() {
            Some(Tag::GetProp) => {
                let base = evaluate_expr(ctx, env, target.operand(0).ok_or(raise_ir_error!("get-prop without object"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                let key = prop_name(target.operand(1))?;
                return Ok(Value::Boolean(delete_member(&base, &key)));
            }
            Some(Tag::GetIndex) => {
                let base = evaluate_expr(ctx, env, target.operand(0).ok_or(raise_ir_error!("get-index without object"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                let index = evaluate_expr(ctx, env, target.operand(1).ok_or(raise_ir_error!("get-index without index"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                return Ok(Value::Boolean(delete_member(&base, &to_property_key(&index))));
            }
            _ => {}
        }
    }
    // non-member operand: nothing to delete, the operator still answers true
    Ok(Value::Boolean(true))
}

fn delete_member(base: &Value, key: &str) -> bool {
    match base {
        Value::Object(obj) => {
            obj_delete_own(obj, key);
            true
        }
        Value::Array(arr) => {
            if let Some(index) = array_index_of(key) {
                let mut data = arr.borrow_mut();
                if index < data.elements.len() {
                    data.elements[index] = Value::Undefined;
                }
                true
            } else {
                let properties = arr.borrow().properties.clone();
                obj_delete_own(&properties, key);
                true
            }
        }
        _ => true,
    }
}

fn evaluate_increment(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, tag: Tag) -> Result<Value, JSError> {
    let target = cell.operand(0).ok_or(raise_ir_error!("increment without target"))?.clone();
    let current = read_target(ctx, env, &target)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    let delta = if matches!(tag, Tag::PreInc | Tag::PostInc) { 1.0 } else { -1.0 };
    let updated = match &current {
        Value::BigInt(b) => Value::BigInt(b + num_bigint::BigInt::from(delta as i64)),
        other => {
            let n = to_number(ctx, other)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            Value::Number(n + delta)
        }
    };
    // normalize the "old" value numerically for the postfix result
    let old = match &current {
        Value::BigInt(_) => current.clone(),
        other => Value::Number(to_number(ctx, other)?),
    };
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    assign_to_target(ctx, env, &target, updated.clone())?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    match tag {
        Tag::PostInc | Tag::PostDec => Ok(old),
        _ => Ok(updated),
    }
}

fn read_target(ctx: &EvalContext, env: &JSEnvPtr, target: &Value) -> Result<Value, JSError> {
    evaluate_expr(ctx, env, target)
}

/// Write through an assignment target: a plain name, a member/index access,
/// or a destructuring pattern in assignment mode. Returns the value.
pub fn assign_to_target(ctx: &EvalContext, env: &JSEnvPtr, target: &Value, value: Value) -> Result<Value, JSError> {
    match target {
        Value::Symbol(name) => {
            if let Err(err) = env.assign(*name, value.clone()) {
                return Ok(env_error_to_throw(ctx, err));
            }
            Ok(value)
        }
        Value::Cell(cell) => match cell.tag() {
            Some(Tag::GetProp) => {
                let base = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("get-prop without object"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                let key = prop_name(cell.operand(1))?;
                set_member(ctx, env, &base, &key, value.clone())?;
                Ok(value)
            }
            Some(Tag::GetIndex) => {
                let base = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("get-index without object"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                let index = evaluate_expr(ctx, env, cell.operand(1).ok_or(raise_ir_error!("get-index without index"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(Value::Undefined);
                }
                set_index(ctx, env, &base, &index, value.clone())?;
                Ok(value)
            }
            Some(Tag::ArrayPattern | Tag::ObjectPattern) => {
                bind_pattern(ctx, env, cell, &value, BindMode::Assign)?;
                Ok(value)
            }
            other => Err(raise_ir_error!(format!("invalid assignment target: {other:?}"))),
        },
        other => Err(raise_ir_error!(format!("invalid assignment target: {other}"))),
    }
}

/// Property read across the object-like value kinds.
pub fn get_member(ctx: &EvalContext, env: &JSEnvPtr, base: &Value, key: &str) -> Result<Value, JSError> {
    match base {
        Value::Undefined | Value::Null => Ok(throw_type_error(
            ctx,
            &format!("Cannot read properties of {} (reading '{key}')", to_js_string(base)),
        )),
        Value::Object(obj) => obj_get(ctx, env, obj, key),
        Value::Array(arr) => array_get_member(ctx, env, arr, key),
        Value::String(s) => match key {
            "length" => Ok(Value::Number(s.chars().count() as f64)),
            _ => match array_index_of(key) {
                Some(index) => Ok(s.chars().nth(index).map(|c| Value::str(&c.to_string())).unwrap_or(Value::Undefined)),
                None => Ok(Value::Undefined),
            },
        },
        Value::Map(map) => Ok(crate::js_map::map_get_member(map, key).unwrap_or(Value::Undefined)),
        Value::Set(set) => Ok(crate::js_set::set_get_member(set, key).unwrap_or(Value::Undefined)),
        Value::WeakMap(map) => Ok(crate::js_weakmap::weakmap_get_member(map, key).unwrap_or(Value::Undefined)),
        Value::WeakSet(set) => Ok(crate::js_weakset::weakset_get_member(set, key).unwrap_or(Value::Undefined)),
        Value::Generator(generator) => Ok(crate::js_generator::generator_get_member(generator, key).unwrap_or(Value::Undefined)),
        Value::ArrayBuffer(_) | Value::DataView(_) => {
            Ok(crate::js_typedarray::buffer_get_member(base, key).unwrap_or(Value::Undefined))
        }
        Value::TypedArray(ta) => {
            if let Some(found) = crate::js_typedarray::buffer_get_member(base, key) {
                return Ok(found);
            }
            match array_index_of(key) {
                Some(index) => match ta.borrow().get(index) {
                    Ok(value) => Ok(Value::Number(value)),
                    Err(_) => Ok(Value::Undefined),
                },
                None => Ok(Value::Undefined),
            }
        }
        Value::Function(fun) | Value::GeneratorFactory(fun) => {
            if key == "prototype" {
                return Ok(Value::Object(crate::js_function::ensure_prototype(base, fun)));
            }
            if key == "name" {
                return Ok(Value::str(&fun.name.map(|n| n.name().to_string()).unwrap_or_default()));
            }
            obj_get(ctx, env, &fun.properties, key)
        }
        Value::HostFunction(host) => match key {
            "name" => Ok(Value::str(&host.name)),
            _ => Ok(Value::Undefined),
        },
        Value::JsSymbol(sym) => match key {
            "description" => Ok(sym.description.as_deref().map(Value::str).unwrap_or(Value::Undefined)),
            _ => Ok(Value::Undefined),
        },
        Value::Super(binding) => super_get(ctx, env, binding, key),
        _ => Ok(Value::Undefined),
    }
}

/// Property write across the object-like value kinds. Writes on primitives
/// are silently dropped, mirroring non-strict member writes.
pub fn set_member(ctx: &EvalContext, env: &JSEnvPtr, base: &Value, key: &str, value: Value) -> Result<(), JSError> {
    match base {
        Value::Undefined | Value::Null => {
            throw_type_error(ctx, &format!("Cannot set properties of {} (setting '{key}')", to_js_string(base)));
            Ok(())
        }
        Value::Object(obj) => obj_set(ctx, env, obj, key, value),
        Value::Array(arr) => array_set_member(ctx, env, arr, key, value),
        Value::TypedArray(ta) => {
            if let Some(index) = array_index_of(key) {
                let n = to_number(ctx, &value)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                let _ = ta.borrow().set(index, n);
            }
            Ok(())
        }
        Value::Function(fun) | Value::GeneratorFactory(fun) => {
            obj_set_own(&fun.properties, key, value);
            Ok(())
        }
        Value::Super(_) => Err(raise_eval_error!("cannot assign through 'super'")),
        _ => Ok(()),
    }
}

fn get_index(ctx: &EvalContext, env: &JSEnvPtr, base: &Value, index: &Value) -> Result<Value, JSError> {
    // dense fast path for integer indices
    if let Value::Number(n) = index
        && n.fract() == 0.0
        && *n >= 0.0
    {
        let i = *n as usize;
        match base {
            Value::Array(arr) => {
                return Ok(arr.borrow().elements.get(i).cloned().unwrap_or(Value::Undefined));
            }
            Value::TypedArray(ta) => {
                return match ta.borrow().get(i) {
                    Ok(value) => Ok(Value::Number(value)),
                    Err(_) => Ok(Value::Undefined),
                };
            }
            Value::String(s) => {
                return Ok(s.chars().nth(i).map(|c| Value::str(&c.to_string())).unwrap_or(Value::Undefined));
            }
            _ => {}
        }
    }
    get_member(ctx, env, base, &to_property_key(index))
}

fn set_index(ctx: &EvalContext, env: &JSEnvPtr, base: &Value, index: &Value, value: Value) -> Result<(), JSError> {
    if let Value::Number(n) = index
        && n.fract() == 0.0
        && *n >= 0.0
    {
        let i = *n as usize;
        match base {
            Value::Array(arr) => {
                let mut data = arr.borrow_mut();
                if i >= data.elements.len() {
                    data.elements.resize(i + 1, Value::Undefined);
                }
                data.elements[i] = value;
                return Ok(());
            }
            Value::TypedArray(ta) => {
                let n = to_number(ctx, &value)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
                let _ = ta.borrow().set(i, n);
                return Ok(());
            }
            _ => {}
        }
    }
    set_member(ctx, env, base, &to_property_key(index), value)
}

/// The bound super triple, or a host error outside any super-capable scope.
pub fn get_super_binding(env: &JSEnvPtr) -> Result<Rc<SuperBinding>, JSError> {
    match env.try_get(super_binding_symbol()) {
        Some(Value::Super(binding)) => Ok(binding),
        _ => Err(raise_eval_error!("'super' used outside of a method")),
    }
}

/// `super.x`: read from the bound super prototype, `this` stays the current
/// instance for any getter that fires.
fn super_get(ctx: &EvalContext, env: &JSEnvPtr, binding: &Rc<SuperBinding>, key: &str) -> Result<Value, JSError> {
    match &binding.prototype {
        Value::Object(proto) => {
            // getters on the super prototype still see the subclass instance
            if let Some(found) = crate::js_object::obj_try_get(ctx, env, proto, key)? {
                return Ok(found);
            }
            Ok(Value::Undefined)
        }
        _ => Ok(Value::Undefined),
    }
}

fn evaluate_call(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>, optional: bool) -> Result<Value, JSError> {
    let callee_node = cell.operand(0).ok_or(raise_ir_error!("call without callee"))?;

    // resolve callee and `this` together so member calls bind the base
    let (callee, this_value) = match callee_node {
        Value::Cell(access) if matches!(access.tag(), Some(Tag::GetProp | Tag::OptionalGetProp)) => {
            let base = evaluate_expr(ctx, env, access.operand(0).ok_or(raise_ir_error!("get-prop without object"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if access.tag() == Some(Tag::OptionalGetProp) && base.is_nullish() {
                return Ok(Value::Undefined);
            }
            let key = prop_name(access.operand(1))?;
            let method = get_member(ctx, env, &base, &key)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let this_value = match &base {
                Value::Super(binding) => binding.this_value.clone(),
                other => other.clone(),
            };
            (method, this_value)
        }
        Value::Cell(access) if matches!(access.tag(), Some(Tag::GetIndex | Tag::OptionalGetIndex)) => {
            let base = evaluate_expr(ctx, env, access.operand(0).ok_or(raise_ir_error!("get-index without object"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if access.tag() == Some(Tag::OptionalGetIndex) && base.is_nullish() {
                return Ok(Value::Undefined);
            }
            let index = evaluate_expr(ctx, env, access.operand(1).ok_or(raise_ir_error!("get-index without index"))?)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let method = get_index(ctx, env, &base, &index)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let this_value = match &base {
                Value::Super(binding) => binding.this_value.clone(),
                other => other.clone(),
            };
            (method, this_value)
        }
        node => {
            let callee = evaluate_expr(ctx, env, node)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            (callee, Value::Undefined)
        }
    };

    if optional && callee.is_nullish() {
        return Ok(Value::Undefined);
    }

    let args = match evaluate_arguments(ctx, env, cell) {
        Ok(Some(args)) => args,
        Ok(None) => return Ok(Value::Undefined),
        Err(e) => return Err(e),
    };

    // `super(...)`: invoke the superclass constructor against the current
    // instance
    if let Value::Super(binding) = &callee {
        if !binding.constructor.is_callable() {
            return Ok(throw_type_error(ctx, "Super constructor is not callable"));
        }
        return invoke_value(ctx, env, &binding.constructor, &args, &binding.this_value);
    }

    invoke_value(ctx, env, &callee, &args, &this_value)
}

/// Arguments, left to right, with `spread` elements expanded. `None` means
/// a signal surfaced mid-way.
fn evaluate_arguments(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Option<Vec<Value>>, JSError> {
    let mut args = Vec::new();
    for arg in cell.operands().skip(1) {
        match arg {
            Value::Cell(spread) if spread.tag() == Some(Tag::Spread) => {
                let source = evaluate_expr(ctx, env, spread.operand(0).ok_or(raise_ir_error!("spread without operand"))?)?;
                if ctx.should_stop_evaluation() {
                    return Ok(None);
                }
                if !spread_into(ctx, &source, &mut args) {
                    return Ok(None);
                }
            }
            node => {
                let value = evaluate_expr(ctx, env, node)?;
                if ctx.should_stop_evaluation() {
                    return Ok(None);
                }
                args.push(value);
            }
        }
    }
    Ok(Some(args))
}

fn evaluate_new(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    let ctor = evaluate_expr(ctx, env, cell.operand(0).ok_or(raise_ir_error!("new without constructor"))?)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    let args = match evaluate_arguments(ctx, env, cell)? {
        Some(args) => args,
        None => return Ok(Value::Undefined),
    };
    crate::js_class::construct(ctx, env, &ctor, &args)
}
