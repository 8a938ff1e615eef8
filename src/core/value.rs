use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use num_bigint::BigInt;
use num_traits::Zero;

use crate::core::cell::Cell;
use crate::core::symbol::Symbol;
use crate::js_array::JSArrayPtr;
use crate::js_function::{HostFunction, JSFunction, SuperBinding};
use crate::js_generator::{JSGenerator, YieldTracker};
use crate::js_map::JSMap;
use crate::js_object::JSObjectPtr;
use crate::js_set::JSSet;
use crate::js_typedarray::{JSArrayBuffer, JSDataView, JSTypedArray};
use crate::js_weakmap::JSWeakMap;
use crate::js_weakset::JSWeakSet;

/// A runtime symbol primitive (the `Symbol()` family), distinct from the
/// interned binding symbols. Identity is the `Rc` allocation; the numeric id
/// only exists so the symbol can be encoded as a string property key.
#[derive(Debug)]
pub struct JsSymbolData {
    pub id: u64,
    pub description: Option<String>,
}

static NEXT_JS_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

pub fn new_js_symbol(description: Option<String>) -> Rc<JsSymbolData> {
    Rc::new(JsSymbolData {
        id: NEXT_JS_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
        description,
    })
}

thread_local! {
    // Well-known symbols storage (iterator, asyncIterator, etc.)
    static WELL_KNOWN_JS_SYMBOLS: RefCell<HashMap<String, Rc<JsSymbolData>>> = RefCell::new(HashMap::new());
}

/// Fetch (creating on first use) a well-known runtime symbol such as
/// `iterator` or `asyncIterator`. The same name always yields the same
/// symbol within a thread.
pub fn well_known_js_symbol(name: &str) -> Rc<JsSymbolData> {
    WELL_KNOWN_JS_SYMBOLS.with(|wk| {
        let mut map = wk.borrow_mut();
        map.entry(name.to_string())
            .or_insert_with(|| new_js_symbol(Some(format!("Symbol.{name}"))))
            .clone()
    })
}

#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    BigInt(BigInt),
    String(Rc<str>),
    /// Interned binding name; appears in IR (variable references, tags).
    Symbol(Symbol),
    /// Runtime symbol primitive with unique identity.
    JsSymbol(Rc<JsSymbolData>),
    Object(JSObjectPtr),
    Array(JSArrayPtr),
    Map(Rc<RefCell<JSMap>>),
    Set(Rc<RefCell<JSSet>>),
    WeakMap(Rc<RefCell<JSWeakMap>>),
    WeakSet(Rc<RefCell<JSWeakSet>>),
    ArrayBuffer(Rc<RefCell<JSArrayBuffer>>),
    DataView(Rc<RefCell<JSDataView>>),
    TypedArray(Rc<RefCell<JSTypedArray>>),
    Function(Rc<JSFunction>),
    HostFunction(Rc<HostFunction>),
    /// Calling one of these yields a generator instance instead of running
    /// the body.
    GeneratorFactory(Rc<JSFunction>),
    Generator(Rc<RefCell<JSGenerator>>),
    /// The `(constructor, prototype, this)` triple bound under a reserved
    /// symbol while a super-capable method runs.
    Super(Rc<SuperBinding>),
    /// An IR node used as an operand. Never observable by user code.
    Cell(Rc<Cell>),
    /// Generator re-execution bookkeeping, bound under a reserved symbol in
    /// the generator's scope. Never observable by user code.
    YieldTracker(Rc<YieldTracker>),
}

impl Value {
    pub fn str(s: &str) -> Value {
        Value::String(Rc::from(s))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::HostFunction(_) | Value::GeneratorFactory(_)
        )
    }

    /// Object-like per the `new` result rule: a constructor returning one of
    /// these overrides the freshly created instance.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Object(_)
                | Value::Array(_)
                | Value::Map(_)
                | Value::Set(_)
                | Value::WeakMap(_)
                | Value::WeakSet(_)
                | Value::ArrayBuffer(_)
                | Value::DataView(_)
                | Value::TypedArray(_)
                | Value::Function(_)
                | Value::Generator(_)
        )
    }
}

pub fn is_truthy(val: &Value) -> bool {
    match val {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::BigInt(b) => !b.is_zero(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// The `typeof` operator's answer for a value.
pub fn type_of(val: &Value) -> &'static str {
    match val {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::BigInt(_) => "bigint",
        Value::String(_) => "string",
        Value::JsSymbol(_) => "symbol",
        Value::Function(_) | Value::HostFunction(_) | Value::GeneratorFactory(_) => "function",
        _ => "object",
    }
}

/// Identity/value equality used internally (map keys, switch tests feed
/// through `strict_equals` in ops instead). References compare by pointer.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::JsSymbol(x), Value::JsSymbol(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Map(x), Value::Map(y)) => Rc::ptr_eq(x, y),
        (Value::Set(x), Value::Set(y)) => Rc::ptr_eq(x, y),
        (Value::WeakMap(x), Value::WeakMap(y)) => Rc::ptr_eq(x, y),
        (Value::WeakSet(x), Value::WeakSet(y)) => Rc::ptr_eq(x, y),
        (Value::ArrayBuffer(x), Value::ArrayBuffer(y)) => Rc::ptr_eq(x, y),
        (Value::DataView(x), Value::DataView(y)) => Rc::ptr_eq(x, y),
        (Value::TypedArray(x), Value::TypedArray(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::HostFunction(x), Value::HostFunction(y)) => Rc::ptr_eq(x, y),
        (Value::GeneratorFactory(x), Value::GeneratorFactory(y)) => Rc::ptr_eq(x, y),
        (Value::Generator(x), Value::Generator(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

// Diagnostic rendering for log output and host error messages. User-facing
// stringification (the ToString coercion) lives in core::ops.
pub fn value_to_string(val: &Value) -> String {
    match val {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => crate::core::ops::number_to_string(*n),
        Value::BigInt(b) => format!("{b}n"),
        Value::String(s) => format!("\"{s}\""),
        Value::Symbol(sym) => sym.name().to_string(),
        Value::JsSymbol(sd) => match &sd.description {
            Some(d) => format!("Symbol({d})"),
            None => "Symbol()".to_string(),
        },
        Value::Object(_) => "[object Object]".to_string(),
        Value::Array(arr) => format!("[array of {}]", arr.borrow().elements.len()),
        Value::Map(_) => "[object Map]".to_string(),
        Value::Set(_) => "[object Set]".to_string(),
        Value::WeakMap(_) => "[object WeakMap]".to_string(),
        Value::WeakSet(_) => "[object WeakSet]".to_string(),
        Value::ArrayBuffer(_) => "[object ArrayBuffer]".to_string(),
        Value::DataView(_) => "[object DataView]".to_string(),
        Value::TypedArray(_) => "[object TypedArray]".to_string(),
        Value::Function(f) => match f.name {
            Some(name) => format!("function {name}"),
            None => "function".to_string(),
        },
        Value::HostFunction(f) => format!("function {}", f.name),
        Value::GeneratorFactory(f) => match f.name {
            Some(name) => format!("function* {name}"),
            None => "function*".to_string(),
        },
        Value::Generator(_) => "[object Generator]".to_string(),
        Value::Super(_) => "[super]".to_string(),
        Value::Cell(_) => "[ir]".to_string(),
        Value::YieldTracker(_) => "[yield-tracker]".to_string(),
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", value_to_string(self))
    }
}
