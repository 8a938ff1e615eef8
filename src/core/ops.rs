use std::collections::HashSet;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

use crate::JSError;
use crate::core::context::{EvalContext, throw_range_error, throw_type_error};
use crate::core::symbol::Tag;
use crate::core::value::{Value, value_to_string};
use crate::js_object::{has_property, js_symbol_key, obj_get_own};
use crate::raise_eval_error;

/// Culture-invariant number rendering: round-trip `f64` formatting with the
/// JavaScript spellings for the specials.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        // both zeros render as "0"
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// The ToString coercion. Arrays comma-join their element coercions with
/// nullish elements rendering empty; cycles terminate via the visited set.
pub fn to_js_string(val: &Value) -> String {
    let mut visited = HashSet::new();
    to_js_string_guarded(val, &mut visited)
}

fn to_js_string_guarded(val: &Value, visited: &mut HashSet<*const ()>) -> String {
    match val {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::BigInt(b) => b.to_string(),
        Value::String(s) => s.to_string(),
        Value::Array(arr) => {
            let ptr = Rc::as_ptr(arr) as *const ();
            if !visited.insert(ptr) {
                return String::new();
            }
            let elements = arr.borrow().elements.clone();
            let parts: Vec<String> = elements
                .iter()
                .map(|e| match e {
                    Value::Undefined | Value::Null => String::new(),
                    other => to_js_string_guarded(other, visited),
                })
                .collect();
            visited.remove(&ptr);
            parts.join(",")
        }
        Value::Object(_) => "[object Object]".to_string(),
        other => value_to_string(other),
    }
}

fn parse_number_literal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    if let Some(oct) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return u64::from_str_radix(oct, 8).ok().map(|v| v as f64);
    }
    if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).ok().map(|v| v as f64);
    }
    trimmed.parse::<f64>().ok()
}

/// The ToNumber coercion. BigInt refuses (mixing error); single-element
/// arrays convert through their element.
pub fn to_number(ctx: &EvalContext, val: &Value) -> Result<f64, JSError> {
    Ok(match val {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::String(s) => parse_number_literal(s).unwrap_or(f64::NAN),
        Value::BigInt(_) => {
            throw_type_error(ctx, "Cannot convert a BigInt value to a number");
            f64::NAN
        }
        Value::Array(arr) => {
            let elements = arr.borrow().elements.clone();
            match elements.len() {
                0 => 0.0,
                1 => to_number(ctx, &elements[0])?,
                _ => f64::NAN,
            }
        }
        _ => f64::NAN,
    })
}

/// ECMAScript-style modular truncation to a signed 32-bit integer.
pub fn to_int32(ctx: &EvalContext, val: &Value) -> Result<i32, JSError> {
    let n = to_number(ctx, val)?;
    if n.is_nan() || n.is_infinite() {
        return Ok(0);
    }
    let modulus = 2f64.powi(32);
    let mut m = n.trunc() % modulus;
    if m < 0.0 {
        m += modulus;
    }
    if m >= 2f64.powi(31) {
        Ok((m - modulus) as i32)
    } else {
        Ok(m as i32)
    }
}

/// ECMAScript-style modular truncation to an unsigned 32-bit integer.
pub fn to_uint32(ctx: &EvalContext, val: &Value) -> Result<u32, JSError> {
    let n = to_number(ctx, val)?;
    if n.is_nan() || n.is_infinite() {
        return Ok(0);
    }
    let modulus = 2f64.powi(32);
    let mut m = n.trunc() % modulus;
    if m < 0.0 {
        m += modulus;
    }
    Ok(m as u32)
}

/// Convert a value into a property key string. Runtime symbols keep their
/// identity through the encoded keyspace.
pub fn to_property_key(val: &Value) -> String {
    match val {
        Value::JsSymbol(sym) => js_symbol_key(sym),
        Value::String(s) => s.to_string(),
        Value::Number(n) => number_to_string(*n),
        other => to_js_string(other),
    }
}

/// Strict equality: same-type value check, reference identity for object
/// kinds, `NaN !== NaN`, and BigInt never strictly equal to Number.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y, // NaN falls out of ==
        _ => crate::core::value::values_equal(a, b),
    }
}

/// SameValueZero: strict equality except NaN matches NaN. Collection key
/// comparisons use this.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => strict_equals(a, b),
    }
}

fn parse_bigint_literal(s: &str) -> Option<BigInt> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(BigInt::zero());
    }
    let (radix, digits) = if let Some(rest) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        (8, rest)
    } else if let Some(rest) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        (2, rest)
    } else {
        (10, trimmed)
    };
    BigInt::parse_bytes(digits.as_bytes(), radix)
}

fn bigint_equals_number(b: &BigInt, n: f64) -> bool {
    if !n.is_finite() || n.fract() != 0.0 {
        return false;
    }
    match BigInt::from_f64(n) {
        Some(converted) => *b == converted,
        None => false,
    }
}

/// Loose equality with the JavaScript cross-type rules. Object-like
/// operands compare through their string coercion.
pub fn loose_equals(ctx: &EvalContext, a: &Value, b: &Value) -> Result<bool, JSError> {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
        (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Boolean(_), Value::Boolean(_))
        | (Value::BigInt(_), Value::BigInt(_)) => Ok(strict_equals(a, b)),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            Ok(parse_number_literal(s).is_some_and(|parsed| parsed == *n))
        }
        (Value::Boolean(x), other) | (other, Value::Boolean(x)) => {
            let as_number = Value::Number(if *x { 1.0 } else { 0.0 });
            loose_equals(ctx, &as_number, other)
        }
        (Value::BigInt(big), Value::Number(n)) | (Value::Number(n), Value::BigInt(big)) => Ok(bigint_equals_number(big, *n)),
        (Value::BigInt(big), Value::String(s)) | (Value::String(s), Value::BigInt(big)) => {
            Ok(parse_bigint_literal(s).is_some_and(|parsed| parsed == *big))
        }
        _ if a.is_object_like() && !b.is_object_like() && !b.is_nullish() => {
            let coerced = Value::str(&to_js_string(a));
            loose_equals(ctx, &coerced, b)
        }
        _ if b.is_object_like() && !a.is_object_like() && !a.is_nullish() => {
            let coerced = Value::str(&to_js_string(b));
            loose_equals(ctx, a, &coerced)
        }
        _ => Ok(strict_equals(a, b)),
    }
}

/// Relational comparison. `None` means "incomparable" (NaN somewhere), which
/// makes every relational operator false.
fn js_compare(ctx: &EvalContext, a: &Value, b: &Value) -> Result<Option<std::cmp::Ordering>, JSError> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(Some(x.cmp(y))),
        (Value::BigInt(x), Value::BigInt(y)) => Ok(Some(x.cmp(y))),
        (Value::BigInt(x), Value::Number(n)) => {
            if n.is_nan() {
                return Ok(None);
            }
            if *n == f64::INFINITY {
                return Ok(Some(std::cmp::Ordering::Less));
            }
            if *n == f64::NEG_INFINITY {
                return Ok(Some(std::cmp::Ordering::Greater));
            }
            let converted = BigInt::from_f64(n.trunc()).ok_or(raise_eval_error!("bigint conversion failed"))?;
            Ok(Some(x.cmp(&converted)))
        }
        (Value::Number(n), Value::BigInt(y)) => Ok(js_compare(ctx, &Value::BigInt(y.clone()), &Value::Number(*n))?.map(|o| o.reverse())),
        _ => {
            let x = to_number(ctx, a)?;
            if ctx.should_stop_evaluation() {
                return Ok(None);
            }
            let y = to_number(ctx, b)?;
            if ctx.should_stop_evaluation() {
                return Ok(None);
            }
            Ok(x.partial_cmp(&y))
        }
    }
}

fn concatenating(val: &Value) -> bool {
    matches!(val, Value::String(_)) || val.is_object_like() || matches!(val, Value::JsSymbol(_))
}

/// The `+` operator: string/array/object operands concatenate their string
/// coercions, both-BigInt adds, BigInt/Number mixing throws, everything else
/// goes numeric.
fn js_add(ctx: &EvalContext, lhs: &Value, rhs: &Value) -> Result<Value, JSError> {
    if concatenating(lhs) || concatenating(rhs) {
        let mut out = to_js_string(lhs);
        out.push_str(&to_js_string(rhs));
        return Ok(Value::str(&out));
    }
    match (lhs, rhs) {
        (Value::BigInt(x), Value::BigInt(y)) => Ok(Value::BigInt(x + y)),
        (Value::BigInt(_), _) | (_, Value::BigInt(_)) => Ok(throw_type_error(ctx, "Cannot mix BigInt and other types")),
        _ => {
            let x = to_number(ctx, lhs)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            let y = to_number(ctx, rhs)?;
            if ctx.should_stop_evaluation() {
                return Ok(Value::Undefined);
            }
            Ok(Value::Number(x + y))
        }
    }
}

/// BigInt `**` by square-and-multiply; negative exponents are out of range.
fn bigint_pow(ctx: &EvalContext, base: &BigInt, exponent: &BigInt) -> Result<Value, JSError> {
    if exponent.is_negative() {
        return Ok(throw_range_error(ctx, "Exponent must be non-negative"));
    }
    let mut result = BigInt::from(1);
    let mut factor = base.clone();
    let mut remaining = exponent.clone();
    let two = BigInt::from(2);
    while !remaining.is_zero() {
        if (&remaining % &two) == BigInt::from(1) {
            result *= &factor;
        }
        remaining /= &two;
        if !remaining.is_zero() {
            factor = &factor * &factor;
        }
    }
    Ok(Value::BigInt(result))
}

fn numeric_binary(ctx: &EvalContext, tag: Tag, lhs: &Value, rhs: &Value) -> Result<Value, JSError> {
    if let (Value::BigInt(x), Value::BigInt(y)) = (lhs, rhs) {
        return Ok(match tag {
            Tag::Sub => Value::BigInt(x - y),
            Tag::Mul => Value::BigInt(x * y),
            Tag::Div => {
                if y.is_zero() {
                    return Ok(throw_range_error(ctx, "Division by zero"));
                }
                Value::BigInt(x / y)
            }
            Tag::Mod => {
                if y.is_zero() {
                    return Ok(throw_range_error(ctx, "Division by zero"));
                }
                Value::BigInt(x % y)
            }
            Tag::Pow => return bigint_pow(ctx, x, y),
            _ => return Err(raise_eval_error!(format!("unexpected numeric operator {tag:?}"))),
        });
    }
    if matches!(lhs, Value::BigInt(_)) || matches!(rhs, Value::BigInt(_)) {
        return Ok(throw_type_error(ctx, "Cannot mix BigInt and other types"));
    }
    let x = to_number(ctx, lhs)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    let y = to_number(ctx, rhs)?;
    if ctx.should_stop_evaluation() {
        return Ok(Value::Undefined);
    }
    Ok(Value::Number(match tag {
        Tag::Sub => x - y,
        Tag::Mul => x * y,
        Tag::Div => x / y,
        Tag::Mod => x % y,
        Tag::Pow => x.powf(y),
        _ => return Err(raise_eval_error!(format!("unexpected numeric operator {tag:?}"))),
    }))
}

fn bigint_shift_amount(ctx: &EvalContext, amount: &BigInt) -> Result<Option<u32>, JSError> {
    match amount.magnitude().to_u32() {
        Some(bits) if bits <= 1_000_000 => Ok(Some(bits)),
        _ => {
            throw_range_error(ctx, "BigInt shift out of range");
            Ok(None)
        }
    }
}

fn bitwise_binary(ctx: &EvalContext, tag: Tag, lhs: &Value, rhs: &Value) -> Result<Value, JSError> {
    if let (Value::BigInt(x), Value::BigInt(y)) = (lhs, rhs) {
        return Ok(match tag {
            Tag::BitAnd => Value::BigInt(x & y),
            Tag::BitOr => Value::BigInt(x | y),
            Tag::BitXor => Value::BigInt(x ^ y),
            Tag::Shl => match bigint_shift_amount(ctx, y)? {
                Some(bits) if !y.is_negative() => Value::BigInt(x << bits),
                Some(bits) => Value::BigInt(x >> bits),
                None => Value::Undefined,
            },
            Tag::Shr => match bigint_shift_amount(ctx, y)? {
                Some(bits) if !y.is_negative() => Value::BigInt(x >> bits),
                Some(bits) => Value::BigInt(x << bits),
                None => Value::Undefined,
            },
            Tag::UShr => return Ok(throw_type_error(ctx, "BigInts have no unsigned right shift")),
            _ => return Err(raise_eval_error!(format!("unexpected bitwise operator {tag:?}"))),
        });
    }
    if matches!(lhs, Value::BigInt(_)) || matches!(rhs, Value::BigInt(_)) {
        return Ok(throw_type_error(ctx, "Cannot mix BigInt and other types"));
    }
    Ok(match tag {
        Tag::BitAnd => Value::Number((to_int32(ctx, lhs)? & to_int32(ctx, rhs)?) as f64),
        Tag::BitOr => Value::Number((to_int32(ctx, lhs)? | to_int32(ctx, rhs)?) as f64),
        Tag::BitXor => Value::Number((to_int32(ctx, lhs)? ^ to_int32(ctx, rhs)?) as f64),
        Tag::Shl => {
            let shift = to_uint32(ctx, rhs)? & 31;
            Value::Number((to_int32(ctx, lhs)?.wrapping_shl(shift)) as f64)
        }
        Tag::Shr => {
            let shift = to_uint32(ctx, rhs)? & 31;
            Value::Number((to_int32(ctx, lhs)?.wrapping_shr(shift)) as f64)
        }
        Tag::UShr => {
            let shift = to_uint32(ctx, rhs)? & 31;
            Value::Number((to_uint32(ctx, lhs)?.wrapping_shr(shift)) as f64)
        }
        _ => return Err(raise_eval_error!(format!("unexpected bitwise operator {tag:?}"))),
    })
}

fn js_instanceof(ctx: &EvalContext, lhs: &Value, rhs: &Value) -> Result<Value, JSError> {
    let prototype = match rhs {
        Value::Function(fun) | Value::GeneratorFactory(fun) => obj_get_own(&fun.properties, "prototype"),
        Value::HostFunction(_) => None,
        _ => return Ok(throw_type_error(ctx, "Right-hand side of 'instanceof' is not callable")),
    };
    let Some(Value::Object(target_proto)) = prototype else {
        return Ok(Value::Boolean(false));
    };
    let Value::Object(obj) = lhs else {
        return Ok(Value::Boolean(false));
    };
    let mut visited: HashSet<*const ()> = HashSet::new();
    let mut current = obj.borrow().prototype.clone();
    while let Some(proto) = current {
        if Rc::ptr_eq(&proto, &target_proto) {
            return Ok(Value::Boolean(true));
        }
        if !visited.insert(Rc::as_ptr(&proto) as *const ()) {
            break;
        }
        let next = proto.borrow().prototype.clone();
        current = next;
    }
    Ok(Value::Boolean(false))
}

fn js_in(ctx: &EvalContext, lhs: &Value, rhs: &Value) -> Result<Value, JSError> {
    let key = to_property_key(lhs);
    match rhs {
        Value::Object(obj) => Ok(Value::Boolean(has_property(obj, &key))),
        Value::Array(arr) => {
            if key == "length" {
                return Ok(Value::Boolean(true));
            }
            if let Some(index) = crate::js_array::array_index_of(&key) {
                return Ok(Value::Boolean(index < arr.borrow().elements.len()));
            }
            let properties = arr.borrow().properties.clone();
            Ok(Value::Boolean(has_property(&properties, &key)))
        }
        _ => Ok(throw_type_error(ctx, "Cannot use 'in' operator on a non-object")),
    }
}

/// Evaluated-operand binary dispatch. Short-circuiting operators never reach
/// this point; the expression dispatcher owns them.
pub fn apply_binary(ctx: &EvalContext, tag: Tag, lhs: &Value, rhs: &Value) -> Result<Value, JSError> {
    match tag {
        Tag::Add => js_add(ctx, lhs, rhs),
        Tag::Sub | Tag::Mul | Tag::Div | Tag::Mod | Tag::Pow => numeric_binary(ctx, tag, lhs, rhs),
        Tag::BitAnd | Tag::BitOr | Tag::BitXor | Tag::Shl | Tag::Shr | Tag::UShr => bitwise_binary(ctx, tag, lhs, rhs),
        Tag::Eq => Ok(Value::Boolean(loose_equals(ctx, lhs, rhs)?)),
        Tag::NotEq => Ok(Value::Boolean(!loose_equals(ctx, lhs, rhs)?)),
        Tag::StrictEq => Ok(Value::Boolean(strict_equals(lhs, rhs))),
        Tag::StrictNotEq => Ok(Value::Boolean(!strict_equals(lhs, rhs))),
        Tag::Lt => Ok(Value::Boolean(matches!(
            js_compare(ctx, lhs, rhs)?,
            Some(std::cmp::Ordering::Less)
        ))),
        Tag::Le => Ok(Value::Boolean(matches!(
            js_compare(ctx, lhs, rhs)?,
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ))),
        Tag::Gt => Ok(Value::Boolean(matches!(
            js_compare(ctx, lhs, rhs)?,
            Some(std::cmp::Ordering::Greater)
        ))),
        Tag::Ge => Ok(Value::Boolean(matches!(
            js_compare(ctx, lhs, rhs)?,
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ))),
        Tag::InstanceOf => js_instanceof(ctx, lhs, rhs),
        Tag::In => js_in(ctx, lhs, rhs),
        _ => Err(raise_eval_error!(format!("unexpected binary operator {tag:?}"))),
    }
}

/// Unary numeric negate, honouring BigInt.
pub fn js_negate(ctx: &EvalContext, val: &Value) -> Result<Value, JSError> {
    match val {
        Value::BigInt(b) => Ok(Value::BigInt(-b)),
        other => {
            let n = to_number(ctx, other)?;
            Ok(Value::Number(-n))
        }
    }
}

/// Unary bitwise not, honouring BigInt.
pub fn js_bit_not(ctx: &EvalContext, val: &Value) -> Result<Value, JSError> {
    match val {
        Value::BigInt(b) => Ok(Value::BigInt(!b)),
        other => Ok(Value::Number(!to_int32(ctx, other)? as f64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext {
        EvalContext::new()
    }

    #[test]
    fn to_int32_wraps_modularly() {
        let c = ctx();
        assert_eq!(to_int32(&c, &Value::Number(2f64.powi(32) + 5.0)).unwrap(), 5);
        assert_eq!(to_int32(&c, &Value::Number(-1.0)).unwrap(), -1);
        assert_eq!(to_int32(&c, &Value::Number(2f64.powi(31))).unwrap(), i32::MIN);
        assert_eq!(to_uint32(&c, &Value::Number(-1.0)).unwrap(), u32::MAX);
        assert_eq!(to_int32(&c, &Value::Number(f64::NAN)).unwrap(), 0);
    }

    #[test]
    fn add_concatenates_with_string_or_object() {
        let c = ctx();
        let out = apply_binary(&c, Tag::Add, &Value::Number(1.0), &Value::str("2")).unwrap();
        assert!(matches!(out, Value::String(s) if &*s == "12"));

        let empty = crate::js_array::new_js_array(Vec::new());
        let out = apply_binary(&c, Tag::Add, &Value::Array(empty.clone()), &Value::Array(empty)).unwrap();
        assert!(matches!(out, Value::String(s) if s.is_empty()));
    }

    #[test]
    fn string_minus_number_goes_numeric() {
        let c = ctx();
        let out = apply_binary(&c, Tag::Sub, &Value::str("3"), &Value::Number(1.0)).unwrap();
        assert!(matches!(out, Value::Number(n) if n == 2.0));
    }

    #[test]
    fn nan_is_never_strictly_equal() {
        assert!(!strict_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
        assert!(same_value_zero(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn bigint_mixing_throws() {
        let c = ctx();
        apply_binary(&c, Tag::Mul, &Value::BigInt(BigInt::from(2)), &Value::Number(3.0)).unwrap();
        assert!(c.is_throw());
    }

    #[test]
    fn bigint_pow_squares() {
        let c = ctx();
        let out = apply_binary(&c, Tag::Pow, &Value::BigInt(BigInt::from(3)), &Value::BigInt(BigInt::from(13))).unwrap();
        assert!(matches!(out, Value::BigInt(b) if b == BigInt::from(1594323)));
    }

    #[test]
    fn loose_equality_cross_type() {
        let c = ctx();
        assert!(loose_equals(&c, &Value::Null, &Value::Undefined).unwrap());
        assert!(loose_equals(&c, &Value::Number(1.0), &Value::str("1")).unwrap());
        assert!(loose_equals(&c, &Value::Boolean(true), &Value::Number(1.0)).unwrap());
        assert!(loose_equals(&c, &Value::BigInt(BigInt::from(7)), &Value::Number(7.0)).unwrap());
        assert!(loose_equals(&c, &Value::BigInt(BigInt::from(7)), &Value::str("7")).unwrap());
        assert!(!loose_equals(&c, &Value::Null, &Value::Number(0.0)).unwrap());
    }
}
