#![doc = include_str!("../README.md")]

// embedders build `Value::BigInt` values with the same crate the engine uses
pub use num_bigint;

pub mod core;
#[macro_use]
pub(crate) mod error;
pub(crate) mod js_array;
pub(crate) mod js_class;
pub(crate) mod js_function;
pub(crate) mod js_generator;
pub(crate) mod js_map;
pub(crate) mod js_object;
pub(crate) mod js_set;
pub(crate) mod js_typedarray;
pub(crate) mod js_weakmap;
pub(crate) mod js_weakset;

pub use core::{
    Cell, EnvError, EvalContext, JSEnv, JSEnvPtr, Signal, SourceRef, Symbol, Tag, Value, define, evaluate_block, evaluate_program,
    evaluate_statements, invoke, new_environment, tag_of,
};
pub use core::{is_truthy, new_js_symbol, strict_equals, to_js_string, to_number, type_of, well_known_js_symbol};
pub use error::JSError;
pub use js_array::{JSArray, JSArrayPtr, new_js_array};
pub use js_class::{build_class, construct};
pub use js_function::{Callable, HostFn, HostFunction, JSFunction, Param, SuperBinding, invoke_value};
pub use js_generator::{JSGenerator, generator_next, instantiate_generator};
pub use js_map::{JSMap, new_js_map};
pub use js_object::{
    JSObjectData, JSObjectPtr, js_symbol_key, make_error_object, new_js_object, obj_get, obj_get_own, obj_set, obj_set_own,
    own_property_names,
};
pub use js_set::{JSSet, new_js_set};
pub use js_typedarray::{JSArrayBuffer, JSDataView, JSTypedArray, TypedArrayKind, new_js_arraybuffer, new_js_typedarray};
pub use js_weakmap::{JSWeakMap, new_js_weakmap};
pub use js_weakset::{JSWeakSet, new_js_weakset};
