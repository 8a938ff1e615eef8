use std::cell::RefCell;
use std::rc::Rc;

use crate::core::same_value_zero;
use crate::core::Value;
use crate::js_array::new_js_array;
use crate::js_function::HostFunction;

/// Map state: ordered key-value pairs, keys compared with SameValueZero.
#[derive(Debug, Default)]
pub struct JSMap {
    pub entries: Vec<(Value, Value)>,
}

pub fn new_js_map() -> Rc<RefCell<JSMap>> {
    Rc::new(RefCell::new(JSMap::default()))
}

impl JSMap {
    fn position(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|(k, _)| same_value_zero(k, key))
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.position(key).map(|i| self.entries[i].1.clone())
    }

    pub fn set(&mut self, key: Value, value: Value) {
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn delete(&mut self, key: &Value) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }
}

/// The Map member surface. Methods come back as host functions bound to
/// this map; `size` is answered directly.
pub fn map_get_member(map: &Rc<RefCell<JSMap>>, name: &str) -> Option<Value> {
    match name {
        "size" => Some(Value::Number(map.borrow().entries.len() as f64)),
        "get" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple("Map.prototype.get", move |_ctx, args, _this| {
                let key = args.first().cloned().unwrap_or(Value::Undefined);
                Ok(map.borrow().get(&key).unwrap_or(Value::Undefined))
            })))
        }
        "set" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple("Map.prototype.set", move |_ctx, args, _this| {
                let key = args.first().cloned().unwrap_or(Value::Undefined);
                let value = args.get(1).cloned().unwrap_or(Value::Undefined);
                map.borrow_mut().set(key, value);
                Ok(Value::Map(map.clone()))
            })))
        }
        "has" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple("Map.prototype.has", move |_ctx, args, _this| {
                let key = args.first().cloned().unwrap_or(Value::Undefined);
                Ok(Value::Boolean(map.borrow().position(&key).is_some()))
            })))
        }
        "delete" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Map.prototype.delete",
                move |_ctx, args, _this| {
                    let key = args.first().cloned().unwrap_or(Value::Undefined);
                    Ok(Value::Boolean(map.borrow_mut().delete(&key)))
                },
            )))
        }
        "clear" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Map.prototype.clear",
                move |_ctx, _args, _this| {
                    map.borrow_mut().entries.clear();
                    Ok(Value::Undefined)
                },
            )))
        }
        "keys" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Map.prototype.keys",
                move |_ctx, _args, _this| {
                    let keys: Vec<Value> = map.borrow().entries.iter().map(|(k, _)| k.clone()).collect();
                    Ok(Value::Array(new_js_array(keys)))
                },
            )))
        }
        "values" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Map.prototype.values",
                move |_ctx, _args, _this| {
                    let values: Vec<Value> = map.borrow().entries.iter().map(|(_, v)| v.clone()).collect();
                    Ok(Value::Array(new_js_array(values)))
                },
            )))
        }
        "entries" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Map.prototype.entries",
                move |_ctx, _args, _this| {
                    let entries: Vec<Value> = map
                        .borrow()
                        .entries
                        .iter()
                        .map(|(k, v)| Value::Array(new_js_array(vec![k.clone(), v.clone()])))
                        .collect();
                    Ok(Value::Array(new_js_array(entries)))
                },
            )))
        }
        _ => None,
    }
}
