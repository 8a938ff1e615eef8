use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::throw_type_error;
use crate::core::Value;
use crate::js_function::HostFunction;
use crate::js_object::JSObjectData;

/// WeakMap state: weakly-held object keys. Entries whose key has been
/// collected are skipped on lookup and swept opportunistically on mutation.
#[derive(Debug, Default)]
pub struct JSWeakMap {
    pub entries: Vec<(Weak<RefCell<JSObjectData>>, Value)>,
}

pub fn new_js_weakmap() -> Rc<RefCell<JSWeakMap>> {
    Rc::new(RefCell::new(JSWeakMap::default()))
}

impl JSWeakMap {
    fn position(&self, key: &Rc<RefCell<JSObjectData>>) -> Option<usize> {
        self.entries
            .iter()
            .position(|(weak, _)| weak.upgrade().is_some_and(|k| Rc::ptr_eq(&k, key)))
    }

    fn sweep(&mut self) {
        self.entries.retain(|(weak, _)| weak.upgrade().is_some());
    }
}

/// The WeakMap member surface. Keys must be objects.
pub fn weakmap_get_member(map: &Rc<RefCell<JSWeakMap>>, name: &str) -> Option<Value> {
    match name {
        "get" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "WeakMap.prototype.get",
                move |_ctx, args, _this| match args.first() {
                    Some(Value::Object(key)) => {
                        let map = map.borrow();
                        Ok(map.position(key).map(|i| map.entries[i].1.clone()).unwrap_or(Value::Undefined))
                    }
                    _ => Ok(Value::Undefined),
                },
            )))
        }
        "set" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "WeakMap.prototype.set",
                move |ctx, args, _this| match args.first() {
                    Some(Value::Object(key)) => {
                        let value = args.get(1).cloned().unwrap_or(Value::Undefined);
                        let mut data = map.borrow_mut();
                        data.sweep();
                        match data.position(key) {
                            Some(i) => data.entries[i].1 = value,
                            None => data.entries.push((Rc::downgrade(key), value)),
                        }
                        drop(data);
                        Ok(Value::WeakMap(map.clone()))
                    }
                    _ => Ok(throw_type_error(ctx, "Invalid value used as weak map key")),
                },
            )))
        }
        "has" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "WeakMap.prototype.has",
                move |_ctx, args, _this| match args.first() {
                    Some(Value::Object(key)) => Ok(Value::Boolean(map.borrow().position(key).is_some())),
                    _ => Ok(Value::Boolean(false)),
                },
            )))
        }
        "delete" => {
            let map = map.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "WeakMap.prototype.delete",
                move |_ctx, args, _this| match args.first() {
                    Some(Value::Object(key)) => {
                        let pos = map.borrow().position(key);
                        match pos {
                            Some(i) => {
                                map.borrow_mut().entries.remove(i);
                                Ok(Value::Boolean(true))
                            }
                            None => Ok(Value::Boolean(false)),
                        }
                    }
                    _ => Ok(Value::Boolean(false)),
                },
            )))
        }
        _ => None,
    }
}
