use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::throw_type_error;
use crate::core::Value;
use crate::js_function::HostFunction;
use crate::js_object::JSObjectData;

/// WeakSet state: weakly-held object members.
#[derive(Debug, Default)]
pub struct JSWeakSet {
    pub values: Vec<Weak<RefCell<JSObjectData>>>,
}

pub fn new_js_weakset() -> Rc<RefCell<JSWeakSet>> {
    Rc::new(RefCell::new(JSWeakSet::default()))
}

impl JSWeakSet {
    fn position(&self, value: &Rc<RefCell<JSObjectData>>) -> Option<usize> {
        self.values
            .iter()
            .position(|weak| weak.upgrade().is_some_and(|v| Rc::ptr_eq(&v, value)))
    }

    fn sweep(&mut self) {
        self.values.retain(|weak| weak.upgrade().is_some());
    }
}

/// The WeakSet member surface. Members must be objects.
pub fn weakset_get_member(set: &Rc<RefCell<JSWeakSet>>, name: &str) -> Option<Value> {
    match name {
        "add" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "WeakSet.prototype.add",
                move |ctx, args, _this| match args.first() {
                    Some(Value::Object(value)) => {
                        let mut data = set.borrow_mut();
                        data.sweep();
                        if data.position(value).is_none() {
                            data.values.push(Rc::downgrade(value));
                        }
                        drop(data);
                        Ok(Value::WeakSet(set.clone()))
                    }
                    _ => Ok(throw_type_error(ctx, "Invalid value used in weak set")),
                },
            )))
        }
        "has" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "WeakSet.prototype.has",
                move |_ctx, args, _this| match args.first() {
                    Some(Value::Object(value)) => Ok(Value::Boolean(set.borrow().position(value).is_some())),
                    _ => Ok(Value::Boolean(false)),
                },
            )))
        }
        "delete" => {
            let set = set.clone();
            Some(Value::HostFunction(HostFunction::simple(
                "WeakSet.prototype.delete",
                move |_ctx, args, _this| match args.first() {
                    Some(Value::Object(value)) => {
                        let pos = set.borrow().position(value);
                        match pos {
                            Some(i) => {
                                set.borrow_mut().values.remove(i);
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
