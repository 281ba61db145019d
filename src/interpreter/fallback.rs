//! Static analysis for dynamic-subset snippets the live evaluator could not trace.
//!
//! Runs line by line without executing anything:
//! - `let|const|var name = rhs` binds a literal read from `rhs`, or the result of
//!   evaluating `rhs` as a side-effect-free expression over the bindings seen so
//!   far; when neither works the name is bound to `null` ("value unavailable")
//! - a line mentioning `console.log` records an "Output logged" snapshot
//!
//! The result always holds at least one snapshot.

use crate::interpreter::builtins;
use crate::interpreter::constants::SCRIPT_DECL_KEYWORDS;
use crate::interpreter::ops::{apply_binary, apply_unary};
use crate::interpreter::script::{read_index, read_property};
use crate::memory::value::{self, Value};
use crate::memory::Bindings;
use crate::parser::ast::{BinOp, Expr};
use crate::parser::parse_expression;
use crate::snapshot::{Trace, TraceAccumulator};
use tracing::debug;
use unscanny::Scanner;

/// Build a trace for `source` from its declarations and output calls
pub fn analyze(source: &str) -> Trace {
    let mut recorder = TraceAccumulator::new();
    let mut bindings = Bindings::new();

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let line_no = idx + 1;

        if let Some((name, rhs)) = split_declaration(trimmed) {
            let note = match static_value(rhs, &bindings) {
                Some(v) => {
                    let note = format!("Line {}: Variable {} = {}", line_no, name, v);
                    bindings.set(name, v);
                    note
                }
                None => {
                    debug!(line = line_no, rhs, "initializer not statically known");
                    bindings.set(name, Value::Null);
                    format!("Line {}: Variable {} value unavailable", line_no, name)
                }
            };
            recorder.commit(line_no, &bindings, None, Some(note));
        }

        if trimmed.contains("console.log") {
            recorder.commit(
                line_no,
                &bindings,
                None,
                Some(format!("Line {}: Output logged", line_no)),
            );
        }
    }

    if recorder.is_empty() {
        recorder.commit(1, &Bindings::new(), None, Some("Code executed".to_string()));
    }

    recorder.finish().0
}

/// `(name, rhs)` of a `let|const|var name = rhs;` line
fn split_declaration(line: &str) -> Option<(&str, &str)> {
    let mut s = Scanner::new(line);
    let keyword = s.eat_while(char::is_alphabetic);
    if !SCRIPT_DECL_KEYWORDS.contains(&keyword) || s.eat_whitespace().is_empty() {
        return None;
    }

    let name = s.eat_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$');
    if name.is_empty() {
        return None;
    }
    s.eat_whitespace();
    if !s.eat_if('=') || s.peek() == Some('=') {
        return None;
    }

    let rhs = s.after().trim();
    let rhs = rhs.strip_suffix(';').unwrap_or(rhs).trim_end();
    (!rhs.is_empty()).then_some((name, rhs))
}

/// Literal forms first, then a pure evaluation of the expression
fn static_value(rhs: &str, bindings: &Bindings) -> Option<Value> {
    if let Some(v) = literal(rhs) {
        return Some(v);
    }
    let expr = parse_expression(rhs).ok()?;
    evaluate_pure(&expr, bindings)
}

fn literal(rhs: &str) -> Option<Value> {
    match rhs {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }

    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if digits(rhs) {
        return rhs.parse::<i64>().ok().map(value::int);
    }
    if let Some((whole, frac)) = rhs.split_once('.') {
        if digits(whole) && digits(frac) {
            return rhs.parse::<f64>().ok().map(value::number);
        }
    }

    let quoted = rhs.len() >= 2
        && ((rhs.starts_with('"') && rhs.ends_with('"'))
            || (rhs.starts_with('\'') && rhs.ends_with('\'')));
    if quoted {
        return Some(Value::String(rhs[1..rhs.len() - 1].to_string()));
    }

    if rhs.starts_with('[') {
        return Some(Value::Array(Vec::new()));
    }
    if rhs.starts_with('{') {
        return Some(Value::Object(serde_json::Map::new()));
    }
    None
}

/// Evaluate without side effects; calls other than `Math.*` are not allowed
fn evaluate_pure(expr: &Expr, bindings: &Bindings) -> Option<Value> {
    match expr {
        Expr::Literal(v) => Some(v.clone()),
        Expr::Ident(name) if name == "undefined" => Some(Value::Null),
        Expr::Ident(name) => bindings.get(name).cloned(),
        Expr::Array(elements) => elements
            .iter()
            .map(|e| evaluate_pure(e, bindings))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Expr::Object(fields) => fields
            .iter()
            .map(|(k, e)| evaluate_pure(e, bindings).map(|v| (k.clone(), v)))
            .collect::<Option<serde_json::Map<_, _>>>()
            .map(Value::Object),
        Expr::Unary { op, operand } => Some(apply_unary(*op, &evaluate_pure(operand, bindings)?)),
        Expr::Binary { op, left, right } => {
            let left = evaluate_pure(left, bindings)?;
            match op {
                BinOp::And if !value::is_truthy(&left) => Some(left),
                BinOp::Or if value::is_truthy(&left) => Some(left),
                BinOp::And | BinOp::Or => evaluate_pure(right, bindings),
                _ => apply_binary(*op, &left, &evaluate_pure(right, bindings)?, 0).ok(),
            }
        }
        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            if value::is_truthy(&evaluate_pure(condition, bindings)?) {
                evaluate_pure(then_expr, bindings)
            } else {
                evaluate_pure(else_expr, bindings)
            }
        }
        Expr::Index { target, index } => {
            let target = evaluate_pure(target, bindings)?;
            read_index(&target, &evaluate_pure(index, bindings)?, 0).ok()
        }
        Expr::Member { target, property } => {
            read_property(&evaluate_pure(target, bindings)?, property, 0).ok()
        }
        Expr::Call { callee, args } => match callee.as_ref() {
            Expr::Member { target, property } if **target == Expr::Ident("Math".into()) => {
                let args = args
                    .iter()
                    .map(|a| evaluate_pure(a, bindings))
                    .collect::<Option<Vec<_>>>()?;
                builtins::call_math(property, &args)
            }
            _ => None,
        },
    }
}
