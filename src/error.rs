use crate::core::Value;

/// Host-level errors. These indicate misuse of the evaluator (malformed IR,
/// `super` outside a super-bound scope) or an unhandled user `throw` escaping
/// the outermost program boundary. They are not catchable from user code;
/// catchable errors travel as `Throw` signals on the evaluation context.
#[derive(thiserror::Error, Debug)]
pub enum JSError {
    #[error("Malformed IR at {method} {file}:{line}: {message}")]
    MalformedIr {
        message: String,
        file: String,
        line: usize,
        method: String,
    },

    #[error("Evaluation failed at {method} {file}:{line}: {message}")]
    EvaluationError {
        message: String,
        file: String,
        line: usize,
        method: String,
    },

    #[error("Uncaught {message}")]
    UncaughtThrow { message: String, value: Value },
}

impl JSError {
    /// The thrown value, when this error wraps an unhandled user `throw`.
    pub fn thrown_value(&self) -> Option<&Value> {
        match self {
            JSError::UncaughtThrow { value, .. } => Some(value),
            _ => None,
        }
    }
}

// Macro that constructs a MalformedIr error using the compile-time caller
// location. Using a macro (rather than a function) ensures `file!()` and
// `line!()` expand to the site where the macro is invoked.
#[macro_export]
macro_rules! raise_ir_error {
    ($msg:expr) => {
        $crate::JSError::MalformedIr {
            message: $msg.to_string(),
            file: file!().to_string(),
            line: line!() as usize,
            method: $crate::function_name!().to_string(),
        }
    };
}

// Same shape for internal evaluation errors (super misuse and friends).
#[macro_export]
macro_rules! raise_eval_error {
    ($msg:expr) => {
        $crate::JSError::EvaluationError {
            message: $msg.to_string(),
            file: file!().to_string(),
            line: line!() as usize,
            method: $crate::function_name!().to_string(),
        }
    };
}

#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // remove the trailing "::f"
        &name[..name.len() - 3]
    }};
}
