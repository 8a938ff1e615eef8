use std::rc::Rc;

use crate::core::{Cell, operand_symbol, operand_tail};
use crate::core::{EvalContext, throw_type_error};
use crate::core::{JSEnv, JSEnvPtr};
use crate::core::{evaluate_expr, parse_params};
use crate::core::{Symbol, Tag, this_symbol};
use crate::core::{Value, type_of};
use crate::js_function::{Callable, JSFunction, MethodSuper, ensure_prototype};
use crate::js_object::{define_getter, define_setter, new_js_object, obj_set_own};
use crate::{JSError, raise_eval_error, raise_ir_error};

/// Build a class: wire constructor and prototype, link the super chain for
/// both instance and static lookups, install members, and record the field
/// initializer list walked at construction time.
pub fn build_class(ctx: &EvalContext, env: &JSEnvPtr, cell: &Rc<Cell>) -> Result<Value, JSError> {
    let name = operand_symbol(cell, 0);
    log::debug!("building class {name:?}");

    // an (extends expr) clause, when present, is the first member slot
    let mut members: Vec<Rc<Cell>> = Vec::new();
    let mut extends_node = None;
    for entry in cell.operands().skip(1) {
        match entry {
            Value::Cell(member) if member.tag() == Some(Tag::Extends) => {
                extends_node = Some(member.clone());
            }
            Value::Cell(member) => members.push(member.clone()),
            Value::Null => {}
            other => return Err(raise_ir_error!(format!("invalid class member: {other}"))),
        }
    }

    // 1. resolve the superclass to (constructor, prototype)
    let mut super_ctor = None;
    if let Some(extends) = extends_node {
        let value = evaluate_expr(ctx, env, extends.operand(0).ok_or(raise_ir_error!("extends without expression"))?)?;
        if ctx.should_stop_evaluation() {
            return Ok(Value::Undefined);
        }
        match value {
            Value::Function(fun) => super_ctor = Some(fun),
            other => {
                return Ok(throw_type_error(
                    ctx,
                    &format!("Class extends value {} is not a constructor", type_of(&other)),
                ));
            }
        }
    }
    let super_ctor_value = super_ctor.as_ref().map(|f| Value::Function(f.clone()));
    let super_proto = super_ctor
        .as_ref()
        .map(|f| ensure_prototype(super_ctor_value.as_ref().unwrap(), f));

    // 2. the constructor function; a missing one forwards to super
    let ctor_member = members
        .iter()
        .find(|m| m.tag() == Some(Tag::Method) && operand_symbol(m, 0).is_some_and(|n| &*n.name() == "constructor"))
        .cloned();
    let ctor = match &ctor_member {
        Some(member) => {
            let (params, rest) = parse_params(member.operand(1))?;
            JSFunction::new(name, params, rest, operand_tail(member, 2), env)
        }
        None => JSFunction::new(name, Vec::new(), default_ctor_rest(super_ctor.is_some()), default_ctor_body(super_ctor.is_some()), env),
    };
    let ctor_value = Value::Function(ctor.clone());
    let proto = ensure_prototype(&ctor_value, &ctor);

    // 3. chain linkage: instances inherit through the prototype, statics
    //    through the constructor's property object
    if let (Some(super_proto), Some(super_value)) = (&super_proto, &super_ctor_value) {
        proto.borrow_mut().prototype = Some(super_proto.clone());
        if let Some(super_fun) = &super_ctor {
            ctor.properties.borrow_mut().prototype = Some(super_fun.properties.clone());
        }
        obj_set_own(&ctor.properties, "__proto__", super_value.clone());
    }

    // 4. the super template every member method shares
    let template = super_ctor_value.as_ref().map(|super_value| {
        Rc::new(MethodSuper {
            constructor: super_value.clone(),
            prototype: super_proto
                .as_ref()
                .map(|p| Value::Object(p.clone()))
                .unwrap_or(Value::Null),
        })
    });
    *ctor.super_template.borrow_mut() = template.clone();

    // 5. install members
    for member in &members {
        let tag = member.tag().ok_or(raise_ir_error!("class member without a tag"))?;
        match tag {
            Tag::Method => {
                let method_name = member_name(member)?;
                if method_name == "constructor" {
                    continue;
                }
                let method = build_member_function(member, env, &template, 1)?;
                obj_set_own(&proto, &method_name, method);
            }
            Tag::StaticMethod => {
                let method_name = member_name(member)?;
                let method = build_member_function(member, env, &template, 1)?;
                obj_set_own(&ctor.properties, &method_name, method);
            }
            Tag::Getter => {
                let method_name = member_name(member)?;
                let getter = build_accessor_function(member, env, &template, false)?;
                define_getter(&proto, &method_name, getter);
            }
            Tag::Setter => {
                let method_name = member_name(member)?;
                let setter = build_accessor_function(member, env, &template, true)?;
                define_setter(&proto, &method_name, setter);
            }
            Tag::StaticGetter => {
                let method_name = member_name(member)?;
                let getter = build_accessor_function(member, env, &template, false)?;
                define_getter(&ctor.properties, &method_name, getter);
            }
            Tag::StaticSetter => {
                let method_name = member_name(member)?;
                let setter = build_accessor_function(member, env, &template, true)?;
                define_setter(&ctor.properties, &method_name, setter);
            }
            Tag::PublicField | Tag::PrivateField => {
                ctor.field_inits.borrow_mut().push(member.clone());
            }
            Tag::StaticField => {
                let field_name = member_name(member)?;
                let value = match member.operand(1) {
                    Some(init) => {
                        let v = evaluate_expr(ctx, env, init)?;
                        if ctx.should_stop_evaluation() {
                            return Ok(Value::Undefined);
                        }
                        v
                    }
                    None => Value::Undefined,
                };
                obj_set_own(&ctor.properties, &field_name, value);
            }
            other => return Err(raise_ir_error!(format!("invalid class member tag: {other:?}"))),
        }
    }

    // expose the field list under the descriptor key the object model uses
    let field_cells: Vec<Value> = ctor.field_inits.borrow().iter().map(|c| Value::Cell(c.clone())).collect();
    if let Some(list) = Cell::list(field_cells) {
        obj_set_own(&ctor.properties, "__private_fields__", Value::Cell(list));
    }

    Ok(ctor_value)
}

fn member_name(member: &Rc<Cell>) -> Result<String, JSError> {
    match member.operand(0) {
        Some(Value::Symbol(sym)) => Ok(sym.name().to_string()),
        Some(Value::String(s)) => Ok(s.to_string()),
        other => Err(raise_ir_error!(format!("invalid class member name: {other:?}"))),
    }
}

fn build_member_function(
    member: &Rc<Cell>,
    env: &JSEnvPtr,
    template: &Option<Rc<MethodSuper>>,
    params_at: usize,
) -> Result<Value, JSError> {
    let (params, rest) = parse_params(member.operand(params_at))?;
    let fun = JSFunction::new(operand_symbol(member, 0), params, rest, operand_tail(member, params_at + 1), env);
    *fun.super_template.borrow_mut() = template.clone();
    Ok(Value::Function(fun))
}

/// Getters carry no parameter list in the IR; setters carry exactly one.
fn build_accessor_function(
    member: &Rc<Cell>,
    env: &JSEnvPtr,
    template: &Option<Rc<MethodSuper>>,
    has_param: bool,
) -> Result<Value, JSError> {
    let (params, rest) = if has_param {
        parse_params(member.operand(1))?
    } else {
        (Vec::new(), None)
    };
    let body_at = if has_param { 2 } else { 1 };
    let fun = JSFunction::new(operand_symbol(member, 0), params, rest, operand_tail(member, body_at), env);
    *fun.super_template.borrow_mut() = template.clone();
    Ok(Value::Function(fun))
}

/// A synthesized derived-class constructor body: `super(...args)`.
fn default_ctor_body(derived: bool) -> Option<Rc<Cell>> {
    if !derived {
        return None;
    }
    let super_call = Cell::list(vec![
        Value::Symbol(Symbol::intern("call")),
        Value::Cell(Cell::list(vec![Value::Symbol(Symbol::intern("super"))]).expect("non-empty list")),
        Value::Cell(
            Cell::list(vec![
                Value::Symbol(Symbol::intern("spread")),
                Value::Symbol(default_ctor_rest_symbol()),
            ])
            .expect("non-empty list"),
        ),
    ])
    .expect("non-empty list");
    Cell::list(vec![Value::Cell(super_call)])
}

fn default_ctor_rest(derived: bool) -> Option<Symbol> {
    derived.then(default_ctor_rest_symbol)
}

fn default_ctor_rest_symbol() -> Symbol {
    Symbol::intern("__ctor_args__")
}

/// The `new` operator: fresh object, prototype from the constructor, field
/// initialisation parent-first along the super chain, then the constructor
/// body; an object-like constructor return value replaces the instance.
pub fn construct(ctx: &EvalContext, env: &JSEnvPtr, ctor: &Value, args: &[Value]) -> Result<Value, JSError> {
    match ctor {
        Value::Function(fun) => {
            let instance = new_js_object();
            let proto = ensure_prototype(ctor, fun);
            instance.borrow_mut().prototype = Some(proto);
            let instance_value = Value::Object(instance);

            initialize_fields(ctx, fun, &instance_value)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }

            let result = fun.invoke(ctx, env, args, &instance_value)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if result.is_object_like() {
                Ok(result)
            } else {
                Ok(instance_value)
            }
        }
        Value::HostFunction(host) => {
            // host constructors decide their own result; a fresh object is
            // offered as `this`
            let instance_value = Value::Object(new_js_object());
            let result = host.invoke(ctx, env, args, &instance_value)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            if result.is_object_like() {
                Ok(result)
            } else {
                Ok(instance_value)
            }
        }
        other => Ok(throw_type_error(ctx, &format!("{} is not a constructor", type_of(other)))),
    }
}

/// Run the field initializer lists depth-first along the super chain, base
/// class first, each with `this` bound to the new instance.
fn initialize_fields(ctx: &EvalContext, ctor: &Rc<JSFunction>, instance: &Value) -> Result<(), JSError> {
    let mut chain = vec![ctor.clone()];
    let mut current = ctor.clone();
    loop {
        let parent = match current.super_template.borrow().as_ref() {
            Some(template) => match &template.constructor {
                Value::Function(parent) => Some(parent.clone()),
                _ => None,
            },
            None => None,
        };
        match parent {
            Some(parent) => {
                chain.push(parent.clone());
                current = parent;
            }
            None => break,
        }
    }

    for class_fun in chain.iter().rev() {
        let fields = class_fun.field_inits.borrow().clone();
        if fields.is_empty() {
            continue;
        }
        let field_env = JSEnv::new(Some(&class_fun.env), true);
        field_env
            .define(this_symbol(), instance.clone(), false)
            .map_err(|_| raise_eval_error!("failed to bind this for field initialization"))?;
        for field in fields {
            let field_name = member_name(&field)?;
            let value = match field.operand(1) {
                Some(init) => {
                    let v = evaluate_expr(ctx, &field_env, init)?;
                    if ctx.should_stop_evaluation() {
                        return Ok(());
                    }
                    v
                }
                None => Value::Undefined,
            };
            if let Value::Object(obj) = instance {
                obj_set_own(obj, &field_name, value);
            }
        }
    }
    Ok(())
}
