// Integration tests for the trace simulator

use reforge::snapshot::{decode_learner_trace_str, Trace};
use reforge::{execute, ExecutionOutcome, ExecutionRequest, RequestError, SimulationConfig, SubsetKind};
use serde_json::json;
use std::fs;
use std::path::Path;

fn demo(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e))
}

fn run(source: &str, subset: SubsetKind) -> ExecutionOutcome {
    let request = ExecutionRequest::new(source, subset);
    execute(&request, &SimulationConfig::default()).expect("request rejected")
}

fn assert_well_formed(trace: &Trace) {
    assert!(!trace.is_empty(), "trace must never be empty");
    for (i, snapshot) in trace.iter().enumerate() {
        assert_eq!(snapshot.index, i + 1, "indices must be 1..n without gaps");
        assert!(snapshot.source_line >= 1);
    }
    for pair in trace.windows(2) {
        let (before, after) = (&pair[0].emitted, &pair[1].emitted);
        assert!(
            after.starts_with(before),
            "output must only grow: {:?} -> {:?}",
            before,
            after
        );
    }
}

#[test]
fn test_loop_off_by_one() {
    let source = "int i = 0;\nint sum = 0;\nwhile (i <= 5) {\n    sum += i;\n    i++;\n}\ncout << i;\ncout << sum;\n";
    let outcome = run(source, SubsetKind::CLike);

    assert!(outcome.success);
    assert!(!outcome.truncated);
    assert_eq!(outcome.output, vec!["6", "15"]);

    let last = outcome.trace.last().unwrap();
    assert_eq!(last.bindings.get("i"), Some(&json!(6)));
    assert_eq!(last.bindings.get("sum"), Some(&json!(15)));
    assert_well_formed(&outcome.trace);
}

#[test]
fn test_loop_demo_file() {
    let outcome = run(&demo("loop_off_by_one.cpp"), SubsetKind::CLike);

    assert_eq!(outcome.output, vec!["6", "total = 15"]);
    assert_eq!(outcome.trace[0].source_line, 5);
    assert_eq!(
        outcome.trace[2].condition.as_deref(),
        Some("while (i <= 5)")
    );
    assert_well_formed(&outcome.trace);
}

#[test]
fn test_identical_learner_trace_has_no_mismatches() {
    let source = demo("loop_off_by_one.cpp");
    let generated = run(&source, SubsetKind::CLike).trace;

    let request = ExecutionRequest::new(source, SubsetKind::CLike).with_learner_trace(generated);
    let outcome = execute(&request, &SimulationConfig::default()).unwrap();

    assert!(outcome.mismatches.is_empty());
    assert!(!outcome.hint_worthy());
}

#[test]
fn test_learner_trace_from_file() {
    let learner = decode_learner_trace_str(&demo("learner_trace.json"));
    assert_eq!(learner.len(), 7);

    let request = ExecutionRequest::new(demo("loop_off_by_one.cpp"), SubsetKind::CLike)
        .with_learner_trace(learner);
    let outcome = execute(&request, &SimulationConfig::default()).unwrap();

    assert_eq!(outcome.mismatches.len(), 1);
    let mismatch = &outcome.mismatches[0];
    assert_eq!(mismatch.at_step, 7);
    assert_eq!(mismatch.variable, "sum");
    assert_eq!(mismatch.predicted, Some(json!(2)));
    assert_eq!(mismatch.actual, Some(json!(1)));
    assert!(outcome.hint_worthy());
}

#[test]
fn test_unrecognized_lines_are_skipped() {
    let outcome = run(&demo("pointer_skip.cpp"), SubsetKind::CLike);

    let lines: Vec<usize> = outcome.trace.iter().map(|s| s.source_line).collect();
    assert_eq!(lines, vec![2, 4, 6, 7]);
    assert_eq!(outcome.output, vec!["8"]);
    assert!(outcome.success);
}

#[test]
fn test_runaway_loop_is_cut_off() {
    let outcome = run(&demo("runaway.cpp"), SubsetKind::CLike);

    assert!(outcome.success);
    assert!(outcome.truncated);
    assert!(outcome.error.is_none());
    assert!(outcome.output.is_empty());
    assert_well_formed(&outcome.trace);
}

#[test]
fn test_iteration_cap_is_configurable() {
    let source = demo("runaway.cpp");
    let request = ExecutionRequest::new(source, SubsetKind::CLike);

    let small = SimulationConfig {
        iteration_cap: 20,
        ..SimulationConfig::default()
    };
    let short = execute(&request, &small).unwrap();
    let long = execute(&request, &SimulationConfig::default()).unwrap();

    assert!(short.truncated);
    assert!(short.trace.len() < long.trace.len());
}

#[test]
fn test_factorial_demo() {
    let outcome = run(&demo("factorial.cpp"), SubsetKind::CLike);

    assert_eq!(outcome.output, vec!["factorial of 5 is 120"]);
    let call = outcome
        .trace
        .iter()
        .find(|s| !s.call_stack.is_empty())
        .expect("factorial frame never shown");
    assert_eq!(call.call_stack[0].name, "factorial");
    assert_eq!(call.bindings.get("result"), Some(&json!(120)));
    assert!(outcome.trace.last().unwrap().call_stack.is_empty());
}

#[test]
fn test_runs_are_repeatable() {
    for (source, subset) in [
        (demo("loop_off_by_one.cpp"), SubsetKind::CLike),
        (demo("counter.js"), SubsetKind::DynamicLike),
    ] {
        let first = run(&source, subset);
        let second = run(&source, subset);
        assert_eq!(first.trace, second.trace);
        assert_eq!(first.output, second.output);
        assert_eq!(first.error, second.error);
    }
}

#[test]
fn test_dynamic_demo() {
    let outcome = run(&demo("counter.js"), SubsetKind::DynamicLike);

    assert!(outcome.success, "run failed: {:?}", outcome.error);
    assert_eq!(outcome.output, vec!["total 6 done 0"]);

    let last = outcome.trace.last().unwrap();
    assert_eq!(last.note.as_deref(), Some("Final state"));
    assert_eq!(last.source_line, 15);
    assert_eq!(last.bindings.get("total"), Some(&json!(6)));
    assert_eq!(last.bindings.get("done"), Some(&json!(0)));
    assert!(outcome
        .trace
        .iter()
        .any(|s| s.call_stack.iter().any(|f| f.name == "countdown")));
    assert_well_formed(&outcome.trace);
}

#[test]
fn test_dynamic_fault_falls_back_to_static_analysis() {
    let outcome = run("let f = (x) => x;\nconsole.log(f);\n", SubsetKind::DynamicLike);

    assert!(!outcome.success);
    assert!(outcome.error.is_some());
    assert!(!outcome.trace.is_empty());
    assert_eq!(outcome.trace[0].source_line, 1);
    assert_well_formed(&outcome.trace);
}

#[test]
fn test_unknown_language_tag_runs_dynamic() {
    let subset = SubsetKind::from_language_tag("python");
    assert_eq!(subset, SubsetKind::DynamicLike);

    let outcome = run("let a = 1;\n", subset);
    assert_eq!(outcome.trace[0].bindings.get("a"), Some(&json!(1)));
}

#[test]
fn test_empty_source_is_rejected() {
    let request = ExecutionRequest::new("  \n\t", SubsetKind::CLike);
    assert_eq!(
        execute(&request, &SimulationConfig::default()),
        Err(RequestError::MissingSource)
    );
}

#[test]
fn test_outcome_serializes_camel_case() {
    let request = ExecutionRequest::new("int x = 1;\nx = 2;\n", SubsetKind::CLike)
        .with_learner_trace(decode_learner_trace_str(
            r#"[{"line": 1, "variables": {"x": 1}}, {"line": 2, "variables": {"x": 3}}]"#,
        ));
    let outcome = execute(&request, &SimulationConfig::default()).unwrap();
    let document = serde_json::to_value(&outcome).unwrap();

    assert_eq!(document["trace"][1]["sourceLine"], json!(2));
    assert_eq!(document["mismatches"][0]["atStep"], json!(2));
    assert_eq!(document["mismatches"][0]["predicted"], json!(3));
    assert!(document.get("error").is_none());
}

#[test]
fn test_deeply_nested_snippet_degrades_to_static_analysis() {
    let depth = 3000;
    let source = format!("let x = {}1{};\nconsole.log(x);\n", "(".repeat(depth), ")".repeat(depth));
    let outcome = run(&source, SubsetKind::DynamicLike);

    assert!(!outcome.success);
    assert!(outcome
        .error
        .as_deref()
        .is_some_and(|e| e.contains("Nesting too deep")));
    assert_eq!(outcome.trace.len(), 2);
    assert_eq!(outcome.trace[0].bindings.get("x"), Some(&serde_json::Value::Null));
    assert_well_formed(&outcome.trace);
}

#[test]
fn test_output_substitutes_names_inside_quotes() {
    let outcome = run("int sum = 15;\ncout << \"sum\" << sum;\n", SubsetKind::CLike);
    assert_eq!(outcome.output, vec!["15 15"]);
}
