use std::cell::RefCell;
use std::rc::Rc;

use crate::core::Cell;
use crate::{JSError, raise_eval_error};
use crate::core::{EvalContext, throw_type_error};
use crate::core::{BindMode, bind_pattern};
use crate::core::{JSEnv, JSEnvPtr};
use crate::core::{Symbol, super_binding_symbol, this_symbol};
use crate::core::{Value, type_of};
use crate::js_array::new_js_array;
use crate::js_object::{JSObjectPtr, new_js_object, obj_get_own, obj_set_own};

/// A regular parameter: a plain name or a destructuring pattern
/// (`array-pattern`, `object-pattern`, or a defaulted `pattern-element`).
#[derive(Clone, Debug)]
pub enum Param {
    Name(Symbol),
    Pattern(Rc<Cell>),
}

/// The `(constructor, prototype)` half of a super binding, attached to each
/// method of a class at build time. `this` joins at invocation.
#[derive(Clone, Debug)]
pub struct MethodSuper {
    pub constructor: Value,
    pub prototype: Value,
}

/// The full triple bound under the reserved super symbol while a method
/// body runs.
#[derive(Clone, Debug)]
pub struct SuperBinding {
    pub constructor: Value,
    pub prototype: Value,
    pub this_value: Value,
}

/// A user function: parameters, body IR, captured environment, an
/// associated property object (`prototype`, statics), and for class members
/// the super template and field-initializer list.
pub struct JSFunction {
    pub name: Option<Symbol>,
    pub params: Vec<Param>,
    pub rest: Option<Symbol>,
    pub body: Option<Rc<Cell>>,
    pub env: JSEnvPtr,
    pub properties: JSObjectPtr,
    pub super_template: RefCell<Option<Rc<MethodSuper>>>,
    /// Class field members (`public-field`/`private-field` cells) run
    /// against each new instance, own class last, base class first.
    pub field_inits: RefCell<Vec<Rc<Cell>>>,
}

impl JSFunction {
    pub fn new(name: Option<Symbol>, params: Vec<Param>, rest: Option<Symbol>, body: Option<Rc<Cell>>, env: &JSEnvPtr) -> Rc<JSFunction> {
        Rc::new(JSFunction {
            name,
            params,
            rest,
            body,
            env: env.clone(),
            properties: new_js_object(),
            super_template: RefCell::new(None),
            field_inits: RefCell::new(Vec::new()),
        })
    }
}

impl std::fmt::Debug for JSFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JSFunction {{ name: {:?}, params: {}, rest: {} }}",
            self.name,
            self.params.len(),
            self.rest.is_some()
        )
    }
}

/// Host-provided callables. The environment-aware flavour receives the
/// caller's scope frame so embedder hooks can observe it.
#[allow(clippy::type_complexity)]
pub enum HostFn {
    Simple(Rc<dyn Fn(&EvalContext, &[Value], &Value) -> Result<Value, JSError>>),
    WithEnv(Rc<dyn Fn(&EvalContext, &JSEnvPtr, &[Value], &Value) -> Result<Value, JSError>>),
}

pub struct HostFunction {
    pub name: String,
    pub func: HostFn,
}

impl HostFunction {
    pub fn simple<F>(name: &str, f: F) -> Rc<HostFunction>
    where
        F: Fn(&EvalContext, &[Value], &Value) -> Result<Value, JSError> + 'static,
    {
        Rc::new(HostFunction {
            name: name.to_string(),
            func: HostFn::Simple(Rc::new(f)),
        })
    }

    pub fn with_env<F>(name: &str, f: F) -> Rc<HostFunction>
    where
        F: Fn(&EvalContext, &JSEnvPtr, &[Value], &Value) -> Result<Value, JSError> + 'static,
    {
        Rc::new(HostFunction {
            name: name.to_string(),
            func: HostFn::WithEnv(Rc::new(f)),
        })
    }
}

impl std::fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HostFunction {{ name: {} }}", self.name)
    }
}

/// The common callable contract: user functions, host functions and
/// generator factories all answer to `invoke`. `env` is the caller's scope,
/// used only by environment-aware host functions.
pub trait Callable {
    fn invoke(&self, ctx: &EvalContext, env: &JSEnvPtr, args: &[Value], this: &Value) -> Result<Value, JSError>;
}

impl Callable for JSFunction {
    fn invoke(&self, ctx: &EvalContext, _env: &JSEnvPtr, args: &[Value], this: &Value) -> Result<Value, JSError> {
        let func_env = prepare_call_env(self, this)?;
        bind_parameters(ctx, &func_env, &self.params, self.rest, args)?;
        if ctx.should_stop_evaluation() {
            return Ok(Value::Undefined);
        }
        crate::core::evaluate_statements(ctx, &func_env, self.body.as_ref())?;
        finish_function_call(ctx)
    }
}

impl Callable for HostFunction {
    fn invoke(&self, ctx: &EvalContext, env: &JSEnvPtr, args: &[Value], this: &Value) -> Result<Value, JSError> {
        log::trace!("host function {} invoked with {} args", self.name, args.len());
        match &self.func {
            HostFn::Simple(f) => f(ctx, args, this),
            HostFn::WithEnv(f) => f(ctx, env, args, this),
        }
    }
}

/// Create the function-boundary frame for a call: parented on the closure,
/// with `this` and (for class methods) the completed super triple bound.
pub fn prepare_call_env(fun: &JSFunction, this: &Value) -> Result<JSEnvPtr, JSError> {
    let func_env = JSEnv::new(Some(&fun.env), true);
    func_env
        .define(this_symbol(), this.clone(), false)
        .map_err(|_| raise_eval_error!("failed to bind this"))?;
    if let Some(template) = fun.super_template.borrow().as_ref() {
        let binding = SuperBinding {
            constructor: template.constructor.clone(),
            prototype: template.prototype.clone(),
            this_value: this.clone(),
        };
        func_env
            .define(super_binding_symbol(), Value::Super(Rc::new(binding)), false)
            .map_err(|_| raise_eval_error!("failed to bind super"))?;
    }
    Ok(func_env)
}

/// Bind the regular parameters left to right, then collect any leftovers
/// into the rest array. Patterns expand through the destructuring driver in
/// declarative mode.
pub fn bind_parameters(ctx: &EvalContext, env: &JSEnvPtr, params: &[Param], rest: Option<Symbol>, args: &[Value]) -> Result<(), JSError> {
    for (i, param) in params.iter().enumerate() {
        let arg = args.get(i).cloned().unwrap_or(Value::Undefined);
        match param {
            Param::Name(name) => {
                env.define(*name, arg, false)
                    .map_err(|_| raise_eval_error!(format!("duplicate parameter {name}")))?;
            }
            Param::Pattern(pattern) => {
                bind_pattern(ctx, env, pattern, &arg, BindMode::Let)?;
                if ctx.should_stop_evaluation() {
                    return Ok(());
                }
            }
        }
    }
    if let Some(rest_name) = rest {
        let leftover: Vec<Value> = args.iter().skip(params.len()).cloned().collect();
        env.define(rest_name, Value::Array(new_js_array(leftover)), false)
            .map_err(|_| raise_eval_error!(format!("duplicate rest parameter {rest_name}")))?;
    }
    Ok(())
}

/// Consume the function-exit signals: `Return` yields its value, `Throw`
/// keeps propagating, a stray loop signal is dropped.
pub fn finish_function_call(ctx: &EvalContext) -> Result<Value, JSError> {
    if let Some(value) = ctx.take_return() {
        return Ok(value);
    }
    if ctx.is_throw() || ctx.is_yield() {
        return Ok(Value::Undefined);
    }
    if ctx.should_stop_evaluation() {
        // break/continue escaping a function body: malformed input, drop it
        log::debug!("dropping loop signal escaping a function body");
        ctx.clear_signal();
    }
    Ok(Value::Undefined)
}

/// Central call dispatch over the callable value kinds. Raises `TypeError`
/// (as a throw signal) for everything else.
pub fn invoke_value(ctx: &EvalContext, env: &JSEnvPtr, callee: &Value, args: &[Value], this: &Value) -> Result<Value, JSError> {
    match callee {
        Value::Function(fun) => fun.invoke(ctx, env, args, this),
        Value::HostFunction(host) => host.invoke(ctx, env, args, this),
        Value::GeneratorFactory(fun) => crate::js_generator::instantiate_generator(ctx, fun, args, this),
        other => Ok(throw_type_error(ctx, &format!("{} is not a function", type_of(other)))),
    }
}

/// The constructor's `prototype` property, created on first use with a
/// `constructor` back-reference.
pub fn ensure_prototype(fun_value: &Value, fun: &Rc<JSFunction>) -> JSObjectPtr {
    if let Some(Value::Object(proto)) = obj_get_own(&fun.properties, "prototype") {
        return proto;
    }
    let proto = new_js_object();
    obj_set_own(&proto, "constructor", fun_value.clone());
    obj_set_own(&fun.properties, "prototype", Value::Object(proto.clone()));
    proto
}
