//! Equality over JSON values.
//!
//! `serde_json` distinguishes `1` from `1.0`; history bookkeeping must not,
//! and filter selectors additionally match numeric strings against numbers.

use crate::path::parse_number;
use serde_json::{Number, Value};

/// Structural equality with numbers compared by value.
///
/// Objects must have the same key set, arrays the same length, and all
/// children must be deep-equal. `null` only equals `null`.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| deep_equal(l, r)))
        }
        _ => false,
    }
}

/// Loose equality used by `[field:value]` selectors.
///
/// Numbers match numeric strings (`"1"` matches `1`), booleans match the
/// numbers `1`/`0`. Values of the same kind compare with [`deep_equal`].
pub fn loose_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match parse_number(s) {
                Some(Value::Number(parsed)) => number_eq(n, &parsed),
                _ => false,
            }
        }
        (Value::Bool(flag), other @ (Value::Number(_) | Value::String(_)))
        | (other @ (Value::Number(_) | Value::String(_)), Value::Bool(flag)) => {
            loose_equal(&Value::from(u8::from(*flag)), other)
        }
        _ => deep_equal(a, b),
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
    }
}
