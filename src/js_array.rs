use std::cell::RefCell;
use std::rc::Rc;

use crate::JSError;
use crate::core::{EvalContext, throw_range_error};
use crate::core::JSEnvPtr;
use crate::core::Value;
use crate::js_object::{JSObjectPtr, new_js_object, obj_get, obj_set};

/// A dense indexed sequence plus a side property map. `length` mirrors the
/// dense part and is writable; non-index property names fall through to the
/// property map (where an embedder may also install the array method
/// surface).
pub struct JSArray {
    pub elements: Vec<Value>,
    pub properties: JSObjectPtr,
}

pub type JSArrayPtr = Rc<RefCell<JSArray>>;

pub fn new_js_array(elements: Vec<Value>) -> JSArrayPtr {
    Rc::new(RefCell::new(JSArray {
        elements,
        properties: new_js_object(),
    }))
}

impl std::fmt::Debug for JSArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSArray {{ length: {} }}", self.elements.len())
    }
}

/// Parse a property name as a dense-array index. Negative and non-integer
/// names are property-map keys, not indices.
pub fn array_index_of(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    key.parse::<usize>().ok()
}

/// Property-style read on an array: `length`, dense indices, then the side
/// property map.
pub fn array_get_member(ctx: &EvalContext, env: &JSEnvPtr, arr: &JSArrayPtr, key: &str) -> Result<Value, JSError> {
    if key == "length" {
        return Ok(Value::Number(arr.borrow().elements.len() as f64));
    }
    if let Some(index) = array_index_of(key) {
        return Ok(arr.borrow().elements.get(index).cloned().unwrap_or(Value::Undefined));
    }
    let properties = arr.borrow().properties.clone();
    obj_get(ctx, env, &properties, key)
}

/// Property-style write on an array. Writing `length` truncates or pads the
/// dense part with `undefined`; writing past the end pads the gap.
pub fn array_set_member(ctx: &EvalContext, env: &JSEnvPtr, arr: &JSArrayPtr, key: &str, value: Value) -> Result<(), JSError> {
    if key == "length" {
        let requested = match &value {
            Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && n.is_finite() => *n as usize,
            _ => {
                throw_range_error(ctx, "Invalid array length");
                return Ok(());
            }
        };
        arr.borrow_mut().elements.resize(requested, Value::Undefined);
        return Ok(());
    }
    if let Some(index) = array_index_of(key) {
        let mut data = arr.borrow_mut();
        if index >= data.elements.len() {
            data.elements.resize(index + 1, Value::Undefined);
        }
        data.elements[index] = value;
        return Ok(());
    }
    let properties = arr.borrow().properties.clone();
    obj_set(ctx, env, &properties, key, value)
}
