use std::cell::{Cell as StdCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::symbol::Symbol;
use crate::core::value::Value;

/// One binding in a scope frame. `initialized` is false between a
/// `let`/`const` becoming visible (hoisting) and its declaration executing;
/// reads in that window are the temporal dead zone.
#[derive(Clone, Debug)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
    pub initialized: bool,
}

/// A scope frame in the lexical chain. Function-boundary frames anchor
/// hoisted `var` bindings; every other frame is a block scope.
pub struct JSEnv {
    bindings: RefCell<HashMap<Symbol, Binding>>,
    parent: Option<JSEnvPtr>,
    is_function_boundary: bool,
    is_strict: StdCell<bool>,
}

pub type JSEnvPtr = Rc<JSEnv>;

/// Environment operations surface failures as plain data; the dispatchers
/// turn them into `ReferenceError`/`TypeError` throw signals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvError {
    /// Read of a declared but uninitialized binding.
    Tdz(Symbol),
    /// Read of a name with no declaration anywhere on the chain.
    Unbound(Symbol),
    /// Assignment to a `const`.
    ConstAssign(Symbol),
    /// Redeclaration involving a `const` in the same frame.
    ConstRedeclare(Symbol),
    /// Assignment to an undeclared name in strict mode.
    UndeclaredAssign(Symbol),
}

impl JSEnv {
    pub fn new(parent: Option<&JSEnvPtr>, is_function_boundary: bool) -> JSEnvPtr {
        let strict = parent.map(|p| p.is_strict()).unwrap_or(false);
        Rc::new(JSEnv {
            bindings: RefCell::new(HashMap::new()),
            parent: parent.cloned(),
            is_function_boundary,
            is_strict: StdCell::new(strict),
        })
    }

    pub fn parent(&self) -> Option<&JSEnvPtr> {
        self.parent.as_ref()
    }

    pub fn is_function_boundary(&self) -> bool {
        self.is_function_boundary
    }

    pub fn is_strict(&self) -> bool {
        self.is_strict.get()
    }

    /// Flip this frame to strict mode; children created afterwards inherit.
    pub fn set_strict(&self, strict: bool) {
        self.is_strict.set(strict);
    }

    /// Declare a name in this frame without initializing it (the hoisting
    /// pre-pass for `let`/`const`). Overwrites nothing that already exists.
    pub fn declare_uninitialized(&self, name: Symbol) {
        let mut bindings = self.bindings.borrow_mut();
        bindings.entry(name).or_insert(Binding {
            value: Value::Undefined,
            is_const: false,
            initialized: false,
        });
    }

    /// Install a `let`/`const` binding in this innermost frame. An already
    /// hoisted uninitialized binding is initialized in place; redeclaring an
    /// initialized binding fails when a `const` is involved on either side.
    pub fn define(&self, name: Symbol, value: Value, is_const: bool) -> Result<(), EnvError> {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(existing) = bindings.get_mut(&name) {
            if existing.initialized && (is_const || existing.is_const) {
                return Err(EnvError::ConstRedeclare(name));
            }
            existing.value = value;
            existing.is_const = is_const;
            existing.initialized = true;
            return Ok(());
        }
        bindings.insert(
            name,
            Binding {
                value,
                is_const,
                initialized: true,
            },
        );
        Ok(())
    }

    /// Install a `var` binding on the nearest function-boundary frame.
    /// Without an initializer, an existing hoisted value is left alone.
    pub fn define_function_scoped(self: &Rc<Self>, name: Symbol, value: Value, has_initializer: bool) {
        let target = self.function_boundary();
        let mut bindings = target.bindings.borrow_mut();
        match bindings.get_mut(&name) {
            Some(existing) if !has_initializer => {
                // hoisted re-declaration: keep the current value
                existing.initialized = true;
            }
            Some(existing) => {
                existing.value = value;
                existing.initialized = true;
            }
            None => {
                bindings.insert(
                    name,
                    Binding {
                        value,
                        is_const: false,
                        initialized: true,
                    },
                );
            }
        }
    }

    /// Assignment without a declaration: walks outward honouring const and
    /// TDZ. Unmatched names fail in strict mode and auto-create on the
    /// global frame otherwise.
    pub fn assign(self: &Rc<Self>, name: Symbol, value: Value) -> Result<(), EnvError> {
        let mut current = self.clone();
        loop {
            {
                let mut bindings = current.bindings.borrow_mut();
                if let Some(binding) = bindings.get_mut(&name) {
                    if !binding.initialized {
                        return Err(EnvError::Tdz(name));
                    }
                    if binding.is_const {
                        return Err(EnvError::ConstAssign(name));
                    }
                    binding.value = value;
                    return Ok(());
                }
            }
            match current.parent.clone() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        if self.is_strict() {
            return Err(EnvError::UndeclaredAssign(name));
        }
        // non-strict: create on the global (outermost) frame
        let global = self.global();
        global.bindings.borrow_mut().insert(
            name,
            Binding {
                value,
                is_const: false,
                initialized: true,
            },
        );
        Ok(())
    }

    /// Read a binding, walking outward. Missing names and TDZ reads fail.
    pub fn get(self: &Rc<Self>, name: Symbol) -> Result<Value, EnvError> {
        let mut current = self.clone();
        loop {
            {
                let bindings = current.bindings.borrow();
                if let Some(binding) = bindings.get(&name) {
                    if !binding.initialized {
                        return Err(EnvError::Tdz(name));
                    }
                    return Ok(binding.value.clone());
                }
            }
            match current.parent.clone() {
                Some(parent) => current = parent,
                None => return Err(EnvError::Unbound(name)),
            }
        }
    }

    /// Non-failing read used by `typeof`: unbound and uninitialized names
    /// both come back as `None`.
    pub fn try_get(self: &Rc<Self>, name: Symbol) -> Option<Value> {
        let mut current = self.clone();
        loop {
            {
                let bindings = current.bindings.borrow();
                if let Some(binding) = bindings.get(&name) {
                    return binding.initialized.then(|| binding.value.clone());
                }
            }
            match current.parent.clone() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Whether this frame itself declares `name`.
    pub fn has_own(&self, name: Symbol) -> bool {
        self.bindings.borrow().contains_key(&name)
    }

    /// The nearest enclosing function-boundary frame (or the outermost
    /// frame when none is marked).
    pub fn function_boundary(self: &Rc<Self>) -> JSEnvPtr {
        let mut current = self.clone();
        while !current.is_function_boundary {
            match current.parent.clone() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// The outermost frame of the chain.
    pub fn global(self: &Rc<Self>) -> JSEnvPtr {
        let mut current = self.clone();
        while let Some(parent) = current.parent.clone() {
            current = parent;
        }
        current
    }
}

impl std::fmt::Debug for JSEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JSEnv {{ bindings: {}, function_boundary: {}, strict: {} }}",
            self.bindings.borrow().len(),
            self.is_function_boundary,
            self.is_strict.get()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn tdz_read_fails_until_initialized() {
        let env = JSEnv::new(None, true);
        env.declare_uninitialized(sym("x"));
        assert!(matches!(env.get(sym("x")), Err(EnvError::Tdz(_))));
        env.define(sym("x"), Value::Number(1.0), false).unwrap();
        assert!(matches!(env.get(sym("x")), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn const_rejects_assignment() {
        let env = JSEnv::new(None, true);
        env.define(sym("k"), Value::Number(1.0), true).unwrap();
        assert_eq!(env.assign(sym("k"), Value::Number(2.0)), Err(EnvError::ConstAssign(sym("k"))));
    }

    #[test]
    fn var_hoists_to_function_boundary() {
        let outer = JSEnv::new(None, true);
        let block = JSEnv::new(Some(&outer), false);
        block.define_function_scoped(sym("v"), Value::Number(3.0), true);
        assert!(outer.has_own(sym("v")));
        assert!(!block.has_own(sym("v")));
    }

    #[test]
    fn undeclared_assignment_strictness() {
        let global = JSEnv::new(None, true);
        let child = JSEnv::new(Some(&global), false);
        child.assign(sym("loose"), Value::Number(1.0)).unwrap();
        assert!(global.has_own(sym("loose")));

        child.set_strict(true);
        assert_eq!(
            child.assign(sym("nope"), Value::Number(1.0)),
            Err(EnvError::UndeclaredAssign(sym("nope")))
        );
    }
}
