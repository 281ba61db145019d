//! Operator semantics for the dynamic subset
//!
//! Numbers that start out integral stay integral as long as the operation allows
//! it; anything else is carried out in `f64`. Strings concatenate under `+`.
//! Equality is structural (`[1] === [1]` holds), which is the one place the
//! evaluator departs from reference semantics.

use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{self, Value};
use crate::parser::ast::{BinOp, UnaryOp};
use std::cmp::Ordering;

/// Numeric coercion (`Number(x)`): `null` → 0, booleans → 0/1, numeric strings parse
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(_) => value::as_number(value).unwrap_or(f64::NAN),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Apply a non-short-circuit binary operator
pub fn apply_binary(op: BinOp, left: &Value, right: &Value, line: usize) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => Ok(add(left, right)),
        BinOp::Sub | BinOp::Mul | BinOp::Mod => Ok(integral_or_float(op, left, right)),
        BinOp::Div => Ok(value::number(to_number(left) / to_number(right))),
        BinOp::Eq => Ok(Value::Bool(value::values_equal(Some(left), Some(right)))),
        BinOp::Ne => Ok(Value::Bool(!value::values_equal(Some(left), Some(right)))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = compare(left, right);
            let result = match (op, ordering) {
                (_, None) => false,
                (BinOp::Lt, Some(o)) => o == Ordering::Less,
                (BinOp::Le, Some(o)) => o != Ordering::Greater,
                (BinOp::Gt, Some(o)) => o == Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinOp::And | BinOp::Or => Err(RuntimeError::Unsupported {
            message: format!("'{}' must short-circuit", op.symbol()),
            line,
        }),
    }
}

pub fn apply_unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Bool(!value::is_truthy(operand)),
        UnaryOp::Plus => value::number(to_number(operand)),
        UnaryOp::Neg => match value::as_int(operand) {
            Some(n) if operand.is_i64() || operand.is_u64() => n
                .checked_neg()
                .map(value::int)
                .unwrap_or_else(|| value::number(-(n as f64))),
            _ => value::number(-to_number(operand)),
        },
    }
}

fn add(left: &Value, right: &Value) -> Value {
    if left.is_string() || right.is_string() || is_compound(left) || is_compound(right) {
        let mut text = concat_text(left);
        text.push_str(&concat_text(right));
        return Value::String(text);
    }
    integral_or_float(BinOp::Add, left, right)
}

fn is_compound(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// String conversion used by `+` (arrays join with commas like `Array#toString`)
fn concat_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => concat_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => value::display_value(other),
    }
}

fn integral_or_float(op: BinOp, left: &Value, right: &Value) -> Value {
    if let (Some(a), Some(b)) = (exact_int(left), exact_int(right)) {
        let exact = match op {
            BinOp::Add => a.checked_add(b),
            BinOp::Sub => a.checked_sub(b),
            BinOp::Mul => a.checked_mul(b),
            BinOp::Mod if b != 0 => a.checked_rem(b),
            _ => None,
        };
        if let Some(n) = exact {
            return value::int(n);
        }
    }

    let (a, b) = (to_number(left), to_number(right));
    value::number(match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        _ => a % b,
    })
}

fn exact_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null => Some(0),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}
