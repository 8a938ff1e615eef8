use std::cell::RefCell;
use std::rc::Rc;

use crate::core::Value;

/// The underlying byte buffer.
#[derive(Debug, Default)]
pub struct JSArrayBuffer {
    pub data: Vec<u8>,
    pub detached: bool,
}

pub fn new_js_arraybuffer(byte_length: usize) -> Rc<RefCell<JSArrayBuffer>> {
    Rc::new(RefCell::new(JSArrayBuffer {
        data: vec![0; byte_length],
        detached: false,
    }))
}

/// A byte-window view over an ArrayBuffer. The typed accessor codecs are an
/// external concern; the core exposes the window itself.
#[derive(Debug)]
pub struct JSDataView {
    pub buffer: Rc<RefCell<JSArrayBuffer>>,
    pub byte_offset: usize,
    pub byte_length: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

#[derive(Debug)]
pub struct JSTypedArray {
    pub kind: TypedArrayKind,
    pub buffer: Rc<RefCell<JSArrayBuffer>>,
    pub byte_offset: usize,
    /// Number of elements.
    pub length: usize,
}

pub fn new_js_typedarray(kind: TypedArrayKind, length: usize) -> Rc<RefCell<JSTypedArray>> {
    let buffer = new_js_arraybuffer(length * element_size(kind));
    Rc::new(RefCell::new(JSTypedArray {
        kind,
        buffer,
        byte_offset: 0,
        length,
    }))
}

/// Size in bytes of one element of the given kind.
pub fn element_size(kind: TypedArrayKind) -> usize {
    match kind {
        TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
        TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
        TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
        TypedArrayKind::Float64 => 8,
    }
}

impl JSTypedArray {
    pub fn byte_length(&self) -> usize {
        self.length * element_size(self.kind)
    }

    fn byte_index(&self, index: usize) -> Result<usize, &'static str> {
        if index >= self.length {
            return Err("Index out of bounds");
        }
        if self.buffer.borrow().detached {
            return Err("ArrayBuffer is detached");
        }
        Ok(self.byte_offset + index * element_size(self.kind))
    }

    /// Read an element, widened to f64.
    pub fn get(&self, index: usize) -> Result<f64, &'static str> {
        let at = self.byte_index(index)?;
        let buffer = self.buffer.borrow();
        let bytes = &buffer.data;
        if at + element_size(self.kind) > bytes.len() {
            return Err("Index out of bounds");
        }
        let value = match self.kind {
            TypedArrayKind::Int8 => bytes[at] as i8 as f64,
            TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => bytes[at] as f64,
            TypedArrayKind::Int16 => i16::from_le_bytes([bytes[at], bytes[at + 1]]) as f64,
            TypedArrayKind::Uint16 => u16::from_le_bytes([bytes[at], bytes[at + 1]]) as f64,
            TypedArrayKind::Int32 => i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as f64,
            TypedArrayKind::Uint32 => u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as f64,
            TypedArrayKind::Float32 => f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as f64,
            TypedArrayKind::Float64 => f64::from_le_bytes([
                bytes[at],
                bytes[at + 1],
                bytes[at + 2],
                bytes[at + 3],
                bytes[at + 4],
                bytes[at + 5],
                bytes[at + 6],
                bytes[at + 7],
            ]),
        };
        Ok(value)
    }

    /// Write an element, truncating/wrapping integer kinds, clamping
    /// `Uint8Clamped`.
    pub fn set(&self, index: usize, value: f64) -> Result<(), &'static str> {
        let at = self.byte_index(index)?;
        let mut buffer = self.buffer.borrow_mut();
        let bytes = &mut buffer.data;
        if at + element_size(self.kind) > bytes.len() {
            return Err("Index out of bounds");
        }
        let int = if value.is_nan() { 0i64 } else { value as i64 };
        match self.kind {
            TypedArrayKind::Int8 => bytes[at] = int as i8 as u8,
            TypedArrayKind::Uint8 => bytes[at] = int as u8,
            TypedArrayKind::Uint8Clamped => bytes[at] = value.clamp(0.0, 255.0).round() as u8,
            TypedArrayKind::Int16 => bytes[at..at + 2].copy_from_slice(&(int as i16).to_le_bytes()),
            TypedArrayKind::Uint16 => bytes[at..at + 2].copy_from_slice(&(int as u16).to_le_bytes()),
            TypedArrayKind::Int32 => bytes[at..at + 4].copy_from_slice(&(int as i32).to_le_bytes()),
            TypedArrayKind::Uint32 => bytes[at..at + 4].copy_from_slice(&(int as u32).to_le_bytes()),
            TypedArrayKind::Float32 => bytes[at..at + 4].copy_from_slice(&(value as f32).to_le_bytes()),
            TypedArrayKind::Float64 => bytes[at..at + 8].copy_from_slice(&value.to_le_bytes()),
        }
        Ok(())
    }
}

/// Property surface shared by the buffer family: `byteLength` on buffers,
/// `buffer`/`byteOffset`/`byteLength` on views, `length` on typed arrays.
pub fn buffer_get_member(value: &Value, name: &str) -> Option<Value> {
    match (value, name) {
        (Value::ArrayBuffer(buf), "byteLength") => Some(Value::Number(buf.borrow().data.len() as f64)),
        (Value::ArrayBuffer(buf), "detached") => Some(Value::Boolean(buf.borrow().detached)),
        (Value::DataView(view), "buffer") => Some(Value::ArrayBuffer(view.borrow().buffer.clone())),
        (Value::DataView(view), "byteOffset") => Some(Value::Number(view.borrow().byte_offset as f64)),
        (Value::DataView(view), "byteLength") => Some(Value::Number(view.borrow().byte_length as f64)),
        (Value::TypedArray(ta), "buffer") => Some(Value::ArrayBuffer(ta.borrow().buffer.clone())),
        (Value::TypedArray(ta), "byteOffset") => Some(Value::Number(ta.borrow().byte_offset as f64)),
        (Value::TypedArray(ta), "byteLength") => Some(Value::Number(ta.borrow().byte_length() as f64)),
        (Value::TypedArray(ta), "length") => Some(Value::Number(ta.borrow().length as f64)),
        _ => None,
    }
}
