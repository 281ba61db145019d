use reforge::discrepancy::{find_mismatches, find_mismatches_in};
use reforge::memory::Bindings;
use reforge::snapshot::Snapshot;
use serde_json::{json, Value};

fn step(index: usize, pairs: &[(&str, Value)]) -> Snapshot {
    let mut bindings = Bindings::new();
    for (name, value) in pairs {
        bindings.set(*name, value.clone());
    }
    Snapshot {
        index,
        source_line: index,
        bindings,
        ..Snapshot::default()
    }
}

fn generated() -> Vec<Snapshot> {
    vec![
        step(1, &[("i", json!(0))]),
        step(2, &[("i", json!(0)), ("sum", json!(0))]),
        step(3, &[("i", json!(6)), ("sum", json!(15))]),
    ]
}

#[test]
fn test_single_mismatch_at_step_three() {
    let mut learner = generated();
    learner[2].bindings.set("sum", json!(10));

    let mismatches = find_mismatches(&learner, &generated());
    assert_eq!(mismatches.len(), 1);

    let m = &mismatches[0];
    assert_eq!(m.at_step, 3);
    assert_eq!(m.variable, "sum");
    assert_eq!(m.predicted, Some(json!(10)));
    assert_eq!(m.actual, Some(json!(15)));
    assert_eq!(
        m.explanation,
        "Variable sum differs: you predicted 10, but actual value is 15"
    );
}

#[test]
fn test_shorter_learner_trace_only_compares_shared_steps() {
    let learner = vec![step(1, &[("i", json!(0))])];
    assert!(find_mismatches(&learner, &generated()).is_empty());
}

#[test]
fn test_learner_only_variable_is_reported_after_generated_ones() {
    let mut learner = generated();
    learner[1].bindings.set("total", json!(0));
    learner[1].bindings.set("i", json!(1));

    let mismatches = find_mismatches(&learner, &generated());
    let names: Vec<_> = mismatches.iter().map(|m| m.variable.as_str()).collect();
    assert_eq!(names, vec!["i", "total"]);
    assert_eq!(mismatches[1].actual, None);
}

#[test]
fn test_wire_document_is_decoded_leniently() {
    let document = json!({
        "trace": [
            {"step": 1, "line": 1, "variables": {"i": 0}},
            "not a step",
            {"step": 3, "line": 3, "variables": {"i": 6, "sum": 15}}
        ]
    });

    let mismatches = find_mismatches_in(&document, &generated());
    // the undecodable step binds nothing, so both generated names are missing
    let at_two: Vec<_> = mismatches.iter().filter(|m| m.at_step == 2).collect();
    assert_eq!(at_two.len(), 2);
    assert!(mismatches.iter().all(|m| m.at_step == 2));
}
