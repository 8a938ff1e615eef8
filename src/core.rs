use std::rc::Rc;

mod cell;
pub use cell::*;

mod symbol;
pub use symbol::*;

mod value;
pub use value::*;

mod context;
pub use context::*;

mod env;
pub use env::*;

mod ops;
pub use ops::*;

mod destructure;
pub use destructure::*;

mod eval;
pub use eval::*;

mod expr;
pub use expr::*;

use crate::JSError;
use crate::js_function::invoke_value;

/// Create a scope frame for an embedder. A root frame doubles as the
/// function boundary anchoring hoisted `var` bindings.
pub fn new_environment(parent: Option<&JSEnvPtr>, strict: bool) -> JSEnvPtr {
    let env = JSEnv::new(parent, parent.is_none());
    if strict {
        env.set_strict(true);
    }
    env
}

/// Bind a name in `env` from the host side.
pub fn define(env: &JSEnvPtr, name: &str, value: Value, is_const: bool) -> Result<(), JSError> {
    env.define(Symbol::intern(name), value, is_const)
        .map_err(|err| crate::raise_eval_error!(format!("cannot define binding: {err:?}")))
}

/// Evaluate a statement list in a fresh block scope chained to `env`,
/// leaving any signal observable on `ctx`.
pub fn evaluate_block(ctx: &EvalContext, ir: Option<&Rc<Cell>>, env: &JSEnvPtr) -> Result<Value, JSError> {
    let block_env = JSEnv::new(Some(env), false);
    evaluate_statements(ctx, &block_env, ir)
}

/// Call a callable value from the host side.
pub fn invoke(ctx: &EvalContext, env: &JSEnvPtr, callable: &Value, args: &[Value], this: &Value) -> Result<Value, JSError> {
    invoke_value(ctx, env, callable, args, this)
}
