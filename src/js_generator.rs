use std::cell::{Cell as StdCell, RefCell};
use std::rc::Rc;

use crate::core::EvalContext;
use crate::core::{JSEnv, JSEnvPtr};
use crate::core::evaluate_expr;
use crate::core::yield_tracker_symbol;
use crate::core::Value;
use crate::core::{throw_type_error, type_of};
use crate::js_function::{HostFunction, JSFunction, bind_parameters, prepare_call_env};
use crate::js_object::{new_js_object, obj_set_own};
use crate::{JSError, raise_eval_error};

/// Re-execution bookkeeping: `target` is how many yields previous `next`
/// calls consumed; `seen` counts yield sites passed during the current run.
/// The site where they meet is the live suspension point; earlier sites
/// short-circuit to `null` without re-running their operands.
#[derive(Debug)]
pub struct YieldTracker {
    pub target: usize,
    pub seen: StdCell<usize>,
}

/// A paused generator: the factory function, the original call inputs, and
/// how far the body has been consumed. Every `next` rebinds a fresh call
/// frame from the saved inputs so each re-execution replays
/// deterministically; only effects escaping the generator are observable
/// more than once.
pub struct JSGenerator {
    pub fun: Rc<JSFunction>,
    pub args: Vec<Value>,
    pub this_value: Value,
    pub consumed: usize,
    pub done: bool,
}

impl std::fmt::Debug for JSGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSGenerator {{ consumed: {}, done: {} }}", self.consumed, self.done)
    }
}

/// Calling a generator factory: retain the call inputs, run nothing yet.
pub fn instantiate_generator(_ctx: &EvalContext, fun: &Rc<JSFunction>, args: &[Value], this: &Value) -> Result<Value, JSError> {
    Ok(Value::Generator(Rc::new(RefCell::new(JSGenerator {
        fun: fun.clone(),
        args: args.to_vec(),
        this_value: this.clone(),
        consumed: 0,
        done: false,
    }))))
}

/// An iterator-protocol step object.
pub fn iter_result(value: Value, done: bool) -> Value {
    let obj = new_js_object();
    obj_set_own(&obj, "value", value);
    obj_set_own(&obj, "done", Value::Boolean(done));
    Value::Object(obj)
}

/// The generator member surface: `next`, `return` and `throw` come back as
/// host functions bound to this instance.
pub fn generator_get_member(generator: &Rc<RefCell<JSGenerator>>, name: &str) -> Option<Value> {
    match name {
        "next" => {
            let generator = generator.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Generator.prototype.next",
                move |ctx, _args, _this| generator_next(ctx, &generator),
            )))
        }
        "return" => {
            let generator = generator.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Generator.prototype.return",
                move |_ctx, args, _this| {
                    generator.borrow_mut().done = true;
                    Ok(iter_result(args.first().cloned().unwrap_or(Value::Undefined), true))
                },
            )))
        }
        "throw" => {
            let generator = generator.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Generator.prototype.throw",
                move |ctx, args, _this| {
                    // re-execution cannot inject mid-body: the generator
                    // completes and the thrown value surfaces to the caller
                    generator.borrow_mut().done = true;
                    ctx.set_throw(args.first().cloned().unwrap_or(Value::Undefined));
                    Ok(Value::Undefined)
                },
            )))
        }
        _ => None,
    }
}

/// Drive one step: re-interpret the body from the top under a fresh tracker
/// targeting the first unconsumed yield, then translate the resulting
/// signal into an iterator step.
pub fn generator_next(ctx: &EvalContext, generator: &Rc<RefCell<JSGenerator>>) -> Result<Value, JSError> {
    let (fun, args, this_value, target, done) = {
        let state = generator.borrow();
        (
            state.fun.clone(),
            state.args.clone(),
            state.this_value.clone(),
            state.consumed,
            state.done,
        )
    };
    if done {
        return Ok(iter_result(Value::Undefined, true));
    }
    log::trace!("generator_next: re-executing body targeting yield #{target}");

    // a fresh call frame per run: parameters rebind from the saved
    // arguments so replayed iterations start from the same state
    let call_env = prepare_call_env(&fun, &this_value)?;
    bind_parameters(ctx, &call_env, &fun.params, fun.rest, &args)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    let exec_env = JSEnv::new(Some(&call_env), false);
    let tracker = Rc::new(YieldTracker {
        target,
        seen: StdCell::new(0),
    });
    exec_env
        .define(yield_tracker_symbol(), Value::YieldTracker(tracker), false)
        .map_err(|_| raise_eval_error!("failed to install yield tracker"))?;

    // run under a private context so the suspension signal never leaks into
    // the caller's slot
    let run_ctx = EvalContext::new();
    crate::core::evaluate_statements(&run_ctx, &exec_env, fun.body.as_ref())?;

    if let Some(value) = run_ctx.take_yield() {
        generator.borrow_mut().consumed = target + 1;
        return Ok(iter_result(value, false));
    }
    if let Some(thrown) = run_ctx.take_throw() {
        generator.borrow_mut().done = true;
        ctx.set_throw(thrown);
        return Ok(Value::Undefined);
    }
    let value = run_ctx.take_return().unwrap_or(Value::Undefined);
    generator.borrow_mut().done = true;
    Ok(iter_result(value, true))
}

fn current_tracker(env: &JSEnvPtr) -> Result<Rc<YieldTracker>, JSError> {
    match env.try_get(yield_tracker_symbol()) {
        Some(Value::YieldTracker(tracker)) => Ok(tracker),
        _ => Err(raise_eval_error!("'yield' outside of a generator body")),
    }
}

/// A `yield` site. Sites already consumed by earlier `next` calls evaluate
/// to `null` without touching their operand; the live site raises the
/// `Yield` signal.
pub fn evaluate_yield(ctx: &EvalContext, env: &JSEnvPtr, operand: Option<&Value>) -> Result<Value, JSError> {
    let tracker = current_tracker(env)?;
    let index = tracker.seen.get();
    tracker.seen.set(index + 1);
    if index < tracker.target {
        return Ok(Value::Null);
    }
    let value = match operand {
        Some(node) => {
            let v = evaluate_expr(ctx, env, node)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            v
        }
        None => Value::Undefined,
    };
    ctx.set_yield(value);
    Ok(Value::Undefined)
}

/// `yield*` delegation over arrays, strings, and generator instances. A
/// delegated generator keeps its own position, so each resume of the outer
/// body advances it by exactly one step.
pub fn evaluate_yield_star(ctx: &EvalContext, env: &JSEnvPtr, operand: &Value) -> Result<Value, JSError> {
    let tracker = current_tracker(env)?;
    let source = evaluate_expr(ctx, env, operand)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    match source {
        Value::Array(arr) => {
            let elements = arr.borrow().elements.clone();
            delegate_sequence(ctx, &tracker, elements)
        }
        Value::String(s) => {
            let chars: Vec<Value> = s.chars().map(|c| Value::str(&c.to_string())).collect();
            delegate_sequence(ctx, &tracker, chars)
        }
        Value::Generator(inner) => {
            // slots already delivered through this site in earlier runs
            let delivered = inner.borrow().consumed;
            let index = tracker.seen.get();
            tracker.seen.set(index + delivered);
            if tracker.seen.get() > tracker.target {
                return Ok(Value::Null);
            }
            let step = generator_next(ctx, &inner)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let Value::Object(step_obj) = &step else {
                return Ok(Value::Undefined);
            };
            let done = crate::js_object::obj_get_own(step_obj, "done");
            if matches!(done, Some(Value::Boolean(true))) {
                // inner exhausted: the delegation completes without yielding
                return Ok(crate::js_object::obj_get_own(step_obj, "value").unwrap_or(Value::Undefined));
            }
            let value = crate::js_object::obj_get_own(step_obj, "value").unwrap_or(Value::Undefined);
            let index = tracker.seen.get();
            tracker.seen.set(index + 1);
            ctx.set_yield(value);
            Ok(Value::Undefined)
        }
        other => Ok(throw_type_error(
            ctx,
            &format!("{} is not iterable", type_of(&other)),
        )),
    }
}

/// Walk a fixed sequence through the tracker: consumed slots advance the
/// count, the live slot yields.
fn delegate_sequence(ctx: &EvalContext, tracker: &Rc<YieldTracker>, values: Vec<Value>) -> Result<Value, JSError> {
    for value in values {
        let index = tracker.seen.get();
        tracker.seen.set(index + 1);
        if index < tracker.target {
            continue;
        }
        ctx.set_yield(value);
        return Ok(Value::Undefined);
    }
    // every element already consumed: the delegation completes silently
    Ok(Value::Null)
}
