use std::cell::RefCell;

use crate::core::value::Value;
use crate::js_object::{make_error_object, obj_get_own};

/// Pending non-local control flow. The context holds at most one signal;
/// handlers that see one after a sub-evaluation propagate it instead of
/// overwriting it.
#[derive(Clone, Debug, Default)]
pub enum Signal {
    #[default]
    None,
    Break,
    Continue,
    Return(Value),
    Throw(Value),
    Yield(Value),
}

/// Per-evaluation state: the signal slot. Break/continue/return/throw/yield
/// unwind through this rather than through host exceptions, so `finally` can
/// observe and override them and generators can suspend and resume.
#[derive(Default)]
pub struct EvalContext {
    signal: RefCell<Signal>,
}

impl EvalContext {
    pub fn new() -> EvalContext {
        EvalContext::default()
    }

    pub fn set_break(&self) {
        *self.signal.borrow_mut() = Signal::Break;
    }

    pub fn set_continue(&self) {
        *self.signal.borrow_mut() = Signal::Continue;
    }

    pub fn set_return(&self, value: Value) {
        *self.signal.borrow_mut() = Signal::Return(value);
    }

    pub fn set_throw(&self, value: Value) {
        *self.signal.borrow_mut() = Signal::Throw(value);
    }

    pub fn set_yield(&self, value: Value) {
        *self.signal.borrow_mut() = Signal::Yield(value);
    }

    pub fn clear_signal(&self) {
        *self.signal.borrow_mut() = Signal::None;
    }

    /// Remove and return the pending signal, leaving `None` behind.
    pub fn take_signal(&self) -> Signal {
        self.signal.replace(Signal::None)
    }

    /// Put a previously taken signal back (the `finally` restore path).
    pub fn restore_signal(&self, signal: Signal) {
        *self.signal.borrow_mut() = signal;
    }

    /// True when any signal is pending; every dispatcher checks this after
    /// each sub-evaluation and unwinds.
    pub fn should_stop_evaluation(&self) -> bool {
        !matches!(*self.signal.borrow(), Signal::None)
    }

    pub fn is_break(&self) -> bool {
        matches!(*self.signal.borrow(), Signal::Break)
    }

    pub fn is_continue(&self) -> bool {
        matches!(*self.signal.borrow(), Signal::Continue)
    }

    pub fn is_return(&self) -> bool {
        matches!(*self.signal.borrow(), Signal::Return(_))
    }

    pub fn is_throw(&self) -> bool {
        matches!(*self.signal.borrow(), Signal::Throw(_))
    }

    pub fn is_yield(&self) -> bool {
        matches!(*self.signal.borrow(), Signal::Yield(_))
    }

    /// Consume a pending `Return`, if that is what is pending.
    pub fn take_return(&self) -> Option<Value> {
        if self.is_return() {
            match self.take_signal() {
                Signal::Return(v) => Some(v),
                _ => unreachable!(),
            }
        } else {
            None
        }
    }

    /// Consume a pending `Throw`, if that is what is pending.
    pub fn take_throw(&self) -> Option<Value> {
        if self.is_throw() {
            match self.take_signal() {
                Signal::Throw(v) => Some(v),
                _ => unreachable!(),
            }
        } else {
            None
        }
    }

    /// Consume a pending `Yield`, if that is what is pending.
    pub fn take_yield(&self) -> Option<Value> {
        if self.is_yield() {
            match self.take_signal() {
                Signal::Yield(v) => Some(v),
                _ => unreachable!(),
            }
        } else {
            None
        }
    }
}

// User-visible errors are `{name, message}` objects carried by a Throw
// signal. Each helper returns Undefined so call sites can `return Ok(...)`
// the result directly after arming the signal.
pub fn throw_error(ctx: &EvalContext, name: &str, message: &str) -> Value {
    log::debug!("throwing {name}: {message}");
    ctx.set_throw(make_error_object(name, message));
    Value::Undefined
}

pub fn throw_type_error(ctx: &EvalContext, message: &str) -> Value {
    throw_error(ctx, "TypeError", message)
}

pub fn throw_reference_error(ctx: &EvalContext, message: &str) -> Value {
    throw_error(ctx, "ReferenceError", message)
}

pub fn throw_range_error(ctx: &EvalContext, message: &str) -> Value {
    throw_error(ctx, "RangeError", message)
}

pub fn throw_syntax_error(ctx: &EvalContext, message: &str) -> Value {
    throw_error(ctx, "SyntaxError", message)
}

/// Format an unhandled thrown value for the host boundary: `name: message`
/// when the value is an object carrying those keys, a rendering of the value
/// otherwise.
pub fn format_thrown(value: &Value) -> String {
    if let Value::Object(obj) = value {
        let name = obj_get_own(obj, "name");
        let message = obj_get_own(obj, "message");
        if let Some(Value::String(name)) = name {
            return match message {
                Some(Value::String(message)) => format!("{name}: {message}"),
                Some(other) => format!("{name}: {other}"),
                None => name.to_string(),
            };
        }
    }
    crate::core::value::value_to_string(value)
}
