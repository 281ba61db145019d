use reforge::{execute, ExecutionRequest, SimulationConfig, SubsetKind};
use serde_json::json;

fn run_script(source: &str) -> reforge::ExecutionOutcome {
    let request = ExecutionRequest::new(source, SubsetKind::DynamicLike);
    execute(&request, &SimulationConfig::default()).expect("request rejected")
}

#[test]
fn test_arithmetic_coercion() {
    let source = r#"
let a = 7 + 3 * 2;
let b = 7 / 2;
let c = 6 / 3;
let d = 7 % 3;
let label = "n=" + 4;
console.log(a, b, c, d, label);
"#;
    let outcome = run_script(source);
    assert!(outcome.success, "run failed: {:?}", outcome.error);
    assert_eq!(outcome.output, vec!["13 3.5 2 1 n=4"]);

    let last = outcome.trace.last().expect("empty trace");
    assert_eq!(last.bindings.get("a"), Some(&json!(13)));
    assert_eq!(last.bindings.get("b"), Some(&json!(3.5)));
    assert_eq!(last.bindings.get("label"), Some(&json!("n=4")));
}

#[test]
fn test_comparisons_and_logic() {
    let source = r#"
let x = 5;
let inRange = x > 1 && x <= 5;
let either = x < 0 || x === 5;
let same = 2 == 2;
console.log(inRange, either, same, !same);
"#;
    let outcome = run_script(source);
    assert_eq!(outcome.output, vec!["true true true false"]);
}

#[test]
fn test_math_builtins() {
    let source = r#"
let hi = Math.max(3, 9, 4);
let root = Math.sqrt(16);
let r = Math.round(2.5);
console.log(hi, root, r);
"#;
    let outcome = run_script(source);
    assert_eq!(outcome.output, vec!["9 4 3"]);
}

#[test]
fn test_c_like_accumulation() {
    let source = "int a = 2;\nint b = 5;\na += b;\na++;\ncout << a << endl;\n";
    let request = ExecutionRequest::new(source, SubsetKind::CLike);
    let outcome = execute(&request, &SimulationConfig::default()).expect("request rejected");

    assert_eq!(outcome.output, vec!["8"]);
    assert_eq!(
        outcome.trace.last().and_then(|s| s.bindings.get("a")),
        Some(&json!(8))
    );
}
