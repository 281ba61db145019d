//! Variable value helpers
//!
//! Values are [`serde_json::Value`]s. The helpers here give them the handful of
//! script-like semantics the simulators need:
//!
//! - [`number`] / [`as_number`]: integral results stay integers, everything else
//!   becomes a float (non-finite floats collapse to `null`, as JSON does)
//! - [`display_value`]: the text an output primitive prints for a value
//! - [`is_truthy`]: condition truthiness
//! - [`values_equal`]: structural equality used when comparing traces, where an
//!   absent value is distinct from every present value (including `null`)

use serde_json::Number;

pub use serde_json::Value;

/// Largest integer magnitude an `f64` can represent exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Build an integer value.
pub fn int(n: i64) -> Value {
    Value::Number(Number::from(n))
}

/// Build a numeric value, keeping integral results as integers.
pub fn number(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return int(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Numeric view of a value, if it is a number.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Integer view of a value, if it is an integral number.
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER)
                    .map(|f| f as i64)
            }),
        _ => None,
    }
}

/// Render a value the way an output primitive prints it.
///
/// Strings print bare, arrays and objects print as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(_) => format_number(value),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn format_number(value: &Value) -> String {
    match as_int(value) {
        Some(n) => n.to_string(),
        None => as_number(value)
            .map(format_float)
            .unwrap_or_else(|| "NaN".to_string()),
    }
}

/// Floats print positionally, except very large or very small magnitudes,
/// which use exponent form (`1.5511210043330986e+25`)
fn format_float(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude >= 1e21 || (magnitude > 0.0 && magnitude < 1e-6) {
        let text = format!("{:e}", f);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    } else {
        f.to_string()
    }
}

/// Render a possibly-absent value for explanations (`undefined` when absent).
pub fn describe(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "undefined".to_string(),
    }
}

/// Condition truthiness.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(_) => as_number(value).is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Deep structural equality between two possibly-absent values.
///
/// Sequences compare element by element in order, mappings compare key sets and
/// per-key values, numbers compare numerically (`1` equals `1.0`). An absent
/// value only equals another absent value.
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => deep_equal(a, b),
        _ => false,
    }
}

fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => as_number(a) == as_number(b),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_keeps_integers() {
        assert_eq!(number(6.0), json!(6));
        assert_eq!(number(2.5), json!(2.5));
        assert_eq!(number(f64::NAN), Value::Null);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("hi")), "hi");
        assert_eq!(display_value(&json!(15)), "15");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
        assert_eq!(display_value(&json!({"a": 1})), "{\"a\":1}");
        assert_eq!(display_value(&Value::Null), "null");
    }

    #[test]
    fn test_large_floats_do_not_saturate() {
        let big = number(1.5511210043330986e25);
        assert_eq!(as_int(&big), None);
        assert_eq!(display_value(&big), "1.5511210043330986e+25");
        assert_eq!(display_value(&json!(1e20)), "100000000000000000000");
        assert_eq!(display_value(&json!(1e-7)), "1e-7");
        assert_eq!(as_int(&json!(4.0)), Some(4));
    }

    #[test]
    fn test_absent_is_not_null() {
        assert!(!values_equal(None, Some(&Value::Null)));
        assert!(values_equal(None, None));
    }

    #[test]
    fn test_deep_equality() {
        assert!(values_equal(Some(&json!(1)), Some(&json!(1.0))));
        assert!(values_equal(
            Some(&json!({"a": [1, 2], "b": null})),
            Some(&json!({"b": null, "a": [1, 2]}))
        ));
        assert!(!values_equal(Some(&json!([1, 2])), Some(&json!([2, 1]))));
        assert!(!values_equal(Some(&json!("1")), Some(&json!(1))));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(-1)));
    }
}
