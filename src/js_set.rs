use std::cell::RefCell;
use std::rc::Rc;

use crate::core::same_value_zero;
use crate::core::Value;
use crate::js_array::new_js_array;
use crate::js_function::HostFunction;

/// Set state: ordered distinct values under SameValueZero.
#[derive(Debug, Default)]
pub struct JSSet {
    pub values: Vec<Value>,
}

pub fn new_js_set() -> Rc<RefCell<JSSet>> {
    Rc::new(RefCell::new(JSSet::default()))
}

impl JSSet {
    fn position(&self, value: &Value) -> Option<usize> {
        self.values.iter().position(|v| same_value_zero(v, value))
    }
}

/// The Set member surface, mirroring the Map one.
pub fn set_get_member(set: &Rc<RefCell<JSSet>>, name: &str) -> Option<Value> {
    match name {
        "size" => Some(Value::Number(set.borrow().values.len() as f64)),
        "add" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple("Set.prototype.add", move |_ctx, args, _this| {
                let value = args.first().cloned().unwrap_or(Value::Undefined);
                if set.borrow().position(&value).is_none() {
                    set.borrow_mut().values.push(value);
                }
                Ok(Value::Set(set.clone()))
            })))
        }
        "has" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple("Set.prototype.has", move |_ctx, args, _this| {
                let value = args.first().cloned().unwrap_or(Value::Undefined);
                Ok(Value::Boolean(set.borrow().position(&value).is_some()))
            })))
        }
        "delete" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Set.prototype.delete",
                move |_ctx, args, _this| {
                    let value = args.first().cloned().unwrap_or(Value::Undefined);
                    let pos = set.borrow().position(&value);
                    match pos {
                        Some(i) => {
                            set.borrow_mut().values.remove(i);
                            Ok(Value::Boolean(true))
                        }
                        None => Ok(Value::Boolean(false)),
                    }
                },
            )))
        }
        "clear" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Set.prototype.clear",
                move |_ctx, _args, _this| {
                    set.borrow_mut().values.clear();
                    Ok(Value::Undefined)
                },
            )))
        }
        "values" | "keys" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "Set.prototype.values",
                move |_ctx, _args, _this| Ok(Value::Array(new_js_array(set.borrow().values.clone()))),
            )))
        }
        _ => None,
    }
}
