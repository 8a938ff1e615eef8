use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::JSError;
use crate::core::EvalContext;
use crate::core::JSEnvPtr;
use crate::core::{JsSymbolData, Value};

/// The object record: insertion-ordered string-keyed own properties, per-key
/// accessor callables, and an optional prototype link. Runtime symbol keys
/// are encoded into the string keyspace with a reserved prefix so they stay
/// addressable while remaining invisible to key enumeration.
#[derive(Default)]
pub struct JSObjectData {
    pub properties: IndexMap<String, Value>,
    pub getters: HashMap<String, Value>,
    pub setters: HashMap<String, Value>,
    pub prototype: Option<JSObjectPtr>,
}

pub type JSObjectPtr = Rc<RefCell<JSObjectData>>;

#[inline]
pub fn new_js_object() -> JSObjectPtr {
    Rc::new(RefCell::new(JSObjectData::default()))
}

impl std::fmt::Debug for JSObjectData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JSObjectData {{ properties: {}, getters: {}, setters: {}, prototype: {} }}",
            self.properties.len(),
            self.getters.len(),
            self.setters.len(),
            self.prototype.is_some()
        )
    }
}

const JS_SYMBOL_KEY_PREFIX: &str = "@@sym:";

/// Encode a runtime symbol as a property key.
pub fn js_symbol_key(sym: &Rc<JsSymbolData>) -> String {
    format!("{JS_SYMBOL_KEY_PREFIX}{}", sym.id)
}

pub fn is_js_symbol_key(key: &str) -> bool {
    key.starts_with(JS_SYMBOL_KEY_PREFIX)
}

/// Read an own property, no prototype walk, no getters.
pub fn obj_get_own(obj: &JSObjectPtr, key: &str) -> Option<Value> {
    obj.borrow().properties.get(key).cloned()
}

/// Write an own property directly, preserving insertion order for existing
/// keys. Does not consult setters.
pub fn obj_set_own(obj: &JSObjectPtr, key: &str, value: Value) {
    obj.borrow_mut().properties.insert(key.to_string(), value);
}

/// Remove an own property; true when something was removed.
pub fn obj_delete_own(obj: &JSObjectPtr, key: &str) -> bool {
    let mut data = obj.borrow_mut();
    let had_prop = data.properties.shift_remove(key).is_some();
    let had_getter = data.getters.remove(key).is_some();
    let had_setter = data.setters.remove(key).is_some();
    had_prop || had_getter || had_setter
}

pub fn define_getter(obj: &JSObjectPtr, key: &str, callable: Value) {
    obj.borrow_mut().getters.insert(key.to_string(), callable);
}

pub fn define_setter(obj: &JSObjectPtr, key: &str, callable: Value) {
    obj.borrow_mut().setters.insert(key.to_string(), callable);
}

/// Own string keys in insertion order. Accessor-only keys and encoded
/// runtime-symbol keys do not participate.
pub fn own_property_names(obj: &JSObjectPtr) -> Vec<String> {
    obj.borrow()
        .properties
        .keys()
        .filter(|k| !is_js_symbol_key(k))
        .cloned()
        .collect()
}

/// Walk the prototype chain looking for `key`. Fires getters with `this`
/// bound to the original receiver. Prototype cycles are cut by a visited
/// set rather than trusted not to exist.
pub fn obj_try_get(ctx: &EvalContext, env: &JSEnvPtr, obj: &JSObjectPtr, key: &str) -> Result<Option<Value>, JSError> {
    let receiver = Value::Object(obj.clone());
    let mut visited: HashSet<*const RefCell<JSObjectData>> = HashSet::new();
    let mut current = Some(obj.clone());
    while let Some(cur) = current {
        let ptr = Rc::as_ptr(&cur);
        if !visited.insert(ptr) {
            log::error!("prototype chain cycle detected at {ptr:p}, breaking traversal");
            break;
        }
        let own = cur.borrow().properties.get(key).cloned();
        if let Some(value) = own {
            return Ok(Some(value));
        }
        let getter = cur.borrow().getters.get(key).cloned();
        if let Some(getter) = getter {
            log::trace!("obj_try_get - getter fires for key {key}");
            let result = crate::js_function::invoke_value(ctx, env, &getter, &[], &receiver)?;
            return Ok(Some(result));
        }
        let next = cur.borrow().prototype.clone();
        current = next;
    }
    Ok(None)
}

/// Property read with the miss defaulting to `undefined`.
pub fn obj_get(ctx: &EvalContext, env: &JSEnvPtr, obj: &JSObjectPtr, key: &str) -> Result<Value, JSError> {
    Ok(obj_try_get(ctx, env, obj, key)?.unwrap_or(Value::Undefined))
}

/// Property write: a setter anywhere on the chain wins and fires with `this`
/// bound to the receiver; otherwise the receiver gets (or updates) an own
/// property.
pub fn obj_set(ctx: &EvalContext, env: &JSEnvPtr, obj: &JSObjectPtr, key: &str, value: Value) -> Result<(), JSError> {
    let receiver = Value::Object(obj.clone());
    let mut visited: HashSet<*const RefCell<JSObjectData>> = HashSet::new();
    let mut current = Some(obj.clone());
    while let Some(cur) = current {
        let ptr = Rc::as_ptr(&cur);
        if !visited.insert(ptr) {
            break;
        }
        let setter = cur.borrow().setters.get(key).cloned();
        if let Some(setter) = setter {
            log::trace!("obj_set - setter fires for key {key}");
            crate::js_function::invoke_value(ctx, env, &setter, &[value], &receiver)?;
            return Ok(());
        }
        // An own data property on the receiver shadows setters further up.
        if Rc::ptr_eq(&cur, obj) && cur.borrow().properties.contains_key(key) {
            break;
        }
        let next = cur.borrow().prototype.clone();
        current = next;
    }
    obj_set_own(obj, key, value);
    Ok(())
}

/// `key in obj`: own or inherited, data or accessor.
pub fn has_property(obj: &JSObjectPtr, key: &str) -> bool {
    let mut visited: HashSet<*const RefCell<JSObjectData>> = HashSet::new();
    let mut current = Some(obj.clone());
    while let Some(cur) = current {
        let ptr = Rc::as_ptr(&cur);
        if !visited.insert(ptr) {
            break;
        }
        {
            let data = cur.borrow();
            if data.properties.contains_key(key) || data.getters.contains_key(key) || data.setters.contains_key(key) {
                return true;
            }
        }
        let next = cur.borrow().prototype.clone();
        current = next;
    }
    false
}

/// Build a `{name, message}` error object for a Throw signal.
pub fn make_error_object(name: &str, message: &str) -> Value {
    let obj = new_js_object();
    obj_set_own(&obj, "name", Value::str(name));
    obj_set_own(&obj, "message", Value::str(message));
    Value::Object(obj)
}
