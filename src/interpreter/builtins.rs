//! Built-in function implementations
//!
//! Built-ins are handled directly by the steppers rather than being defined in
//! user code.
//!
//! # Supported Built-ins
//!
//! - `factorial(n)`: the one call shape the C-like stepper simulates
//! - `console.log(...)`: output primitive of the dynamic subset
//! - `Math.max/min/abs/floor/ceil/round/sqrt/pow`: numeric helpers
//! - `arr.push(x)`: in-place append on a bound array
//!
//! # Implementation Notes
//!
//! - `factorial` is computed by iterative multiplication from 1 to `n`; the
//!   recursive definition is never executed. Overflow of `i64` continues in
//!   `f64`, so large arguments still produce a (rounded) number; past the
//!   `f64` range the result is `null`
//! - `console.log` renders strings bare, arrays/objects as compact JSON and a
//!   missing value as `undefined`, joining arguments with a single space

use crate::interpreter::ops::to_number;
use crate::memory::value::{self, Value};

/// Simulated `factorial(n)`; `n < 1` yields 1
pub fn factorial(n: i64) -> Value {
    let mut exact: i64 = 1;
    for k in 1..=n.max(0) {
        match exact.checked_mul(k) {
            Some(next) => exact = next,
            None => {
                let mut approx = exact as f64;
                for rest in k..=n {
                    approx *= rest as f64;
                    if approx.is_infinite() {
                        break;
                    }
                }
                return value::number(approx);
            }
        }
    }
    value::int(exact)
}

/// Text one `console.log` call appends to the output
pub fn format_log_line(args: &[Option<Value>]) -> String {
    args.iter()
        .map(|arg| match arg {
            Some(v) => value::display_value(v),
            None => "undefined".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Evaluate `Math.<name>(args)`; `None` for an unknown member
pub fn call_math(name: &str, args: &[Value]) -> Option<Value> {
    let nums: Vec<f64> = args.iter().map(to_number).collect();
    let first = nums.first().copied().unwrap_or(f64::NAN);

    let result = match name {
        "max" => nums.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        "min" => nums.iter().copied().fold(f64::INFINITY, f64::min),
        "abs" => first.abs(),
        "floor" => first.floor(),
        "ceil" => first.ceil(),
        // JS rounds halves toward +inf
        "round" => (first + 0.5).floor(),
        "sqrt" => first.sqrt(),
        "pow" => first.powf(nums.get(1).copied().unwrap_or(f64::NAN)),
        _ => return None,
    };

    Some(value::number(result))
}

/// Append to an array value and return the new length (`arr.push(x, ...)`)
pub fn array_push(target: &mut Value, items: Vec<Value>) -> Option<Value> {
    match target {
        Value::Array(elements) => {
            elements.extend(items);
            Some(value::int(elements.len() as i64))
        }
        _ => None,
    }
}

/// `.length` of a string or array
pub fn length_of(target: &Value) -> Option<Value> {
    match target {
        Value::Array(elements) => Some(value::int(elements.len() as i64)),
        Value::String(s) => Some(value::int(s.chars().count() as i64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), json!(1));
        assert_eq!(factorial(5), json!(120));
        assert_eq!(factorial(20), json!(2_432_902_008_176_640_000_i64));
        assert!(factorial(25).is_f64());
    }

    #[test]
    fn test_factorial_past_float_range_stops_early() {
        assert!(factorial(170).is_f64());
        assert_eq!(factorial(171), Value::Null);
        assert_eq!(factorial(i64::MAX), Value::Null);
    }

    #[test]
    fn test_format_log_line() {
        let args = [json!("sum is"), json!(15), json!([1, 2]), json!({"k": true})].map(Some);
        assert_eq!(format_log_line(&args), "sum is 15 [1,2] {\"k\":true}");
        assert_eq!(format_log_line(&[None, Some(Value::Null)]), "undefined null");
        assert_eq!(format_log_line(&[]), "");
    }

    #[test]
    fn test_math() {
        assert_eq!(call_math("max", &[json!(3), json!(9), json!(4)]), Some(json!(9)));
        assert_eq!(call_math("floor", &[json!(2.7)]), Some(json!(2)));
        assert_eq!(call_math("round", &[json!(-2.5)]), Some(json!(-2)));
        assert_eq!(call_math("pow", &[json!(2), json!(10)]), Some(json!(1024)));
        assert_eq!(call_math("random", &[]), None);
    }

    #[test]
    fn test_push_and_length() {
        let mut arr = json!([1]);
        assert_eq!(array_push(&mut arr, vec![json!(2), json!(3)]), Some(json!(3)));
        assert_eq!(length_of(&arr), Some(json!(3)));
        assert_eq!(length_of(&json!("héllo")), Some(json!(5)));
        assert_eq!(array_push(&mut json!(1), vec![]), None);
    }
}
