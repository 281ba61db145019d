//! Discrepancy engine
//!
//! Aligns a learner-authored trace with a generated one position by position
//! and reports every variable whose value differs. Positions present in only
//! one trace are skipped: a length difference is not a mismatch by itself.
//!
//! Within one position the variables are visited in a fixed order: the
//! generated snapshot's bindings first (in their insertion order), then names
//! only the learner bound.

use crate::memory::value::{describe, values_equal, Value};
use crate::snapshot::{Snapshot, Trace};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One variable-level divergence between two aligned snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mismatch {
    /// 1-based position of the compared snapshots
    pub at_step: usize,
    pub variable: String,
    /// Learner's value; `None` when the learner did not bind the variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted: Option<Value>,
    /// Generated value; `None` when the run did not bind the variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    pub explanation: String,
}

/// Compare a learner trace against a generated trace
pub fn find_mismatches(learner: &[Snapshot], generated: &[Snapshot]) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for (position, (predicted, actual)) in learner.iter().zip(generated).enumerate() {
        compare_snapshots(position + 1, predicted, actual, &mut mismatches);
    }

    debug!(
        learner_steps = learner.len(),
        generated_steps = generated.len(),
        mismatches = mismatches.len(),
        "traces compared"
    );
    mismatches
}

fn compare_snapshots(at_step: usize, predicted: &Snapshot, actual: &Snapshot, out: &mut Vec<Mismatch>) {
    let learner_only = predicted
        .bindings
        .names()
        .filter(|name| !actual.bindings.contains(name));

    for name in actual.bindings.names().chain(learner_only) {
        let predicted_value = predicted.bindings.get(name);
        let actual_value = actual.bindings.get(name);
        if values_equal(predicted_value, actual_value) {
            continue;
        }

        out.push(Mismatch {
            at_step,
            variable: name.to_string(),
            explanation: format!(
                "Variable {} differs: you predicted {}, but actual value is {}",
                name,
                describe(predicted_value),
                describe(actual_value)
            ),
            predicted: predicted_value.cloned(),
            actual: actual_value.cloned(),
        });
    }
}

/// Compare against a learner trace given as an unchecked JSON document
pub fn find_mismatches_in(learner: &Value, generated: &Trace) -> Vec<Mismatch> {
    let learner = crate::snapshot::decode_learner_trace(learner);
    find_mismatches(&learner, generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Bindings;
    use serde_json::json;

    fn step(index: usize, vars: &[(&str, Value)]) -> Snapshot {
        Snapshot {
            index,
            source_line: index,
            bindings: vars.iter().cloned().collect::<Bindings>(),
            ..Snapshot::default()
        }
    }

    fn trace(steps: &[&[(&str, Value)]]) -> Trace {
        steps
            .iter()
            .enumerate()
            .map(|(i, vars)| step(i + 1, vars))
            .collect()
    }

    #[test]
    fn test_identical_traces_have_no_mismatches() {
        let t = trace(&[&[("i", json!(0))], &[("i", json!(0)), ("sum", json!(0))]]);
        assert!(find_mismatches(&t, &t).is_empty());
    }

    #[test]
    fn test_single_mismatch() {
        let learner = trace(&[
            &[("sum", json!(0))],
            &[("sum", json!(1))],
            &[("sum", json!(10))],
        ]);
        let generated = trace(&[
            &[("sum", json!(0))],
            &[("sum", json!(1))],
            &[("sum", json!(15))],
        ]);

        let mismatches = find_mismatches(&learner, &generated);
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
    fn test_missing_positions_are_skipped() {
        let learner = trace(&[&[("x", json!(1))]]);
        let generated = trace(&[&[("x", json!(1))], &[("x", json!(2))], &[("x", json!(3))]]);
        assert!(find_mismatches(&learner, &generated).is_empty());
        assert!(find_mismatches(&[], &generated).is_empty());
    }

    #[test]
    fn test_absent_differs_from_null() {
        let learner = trace(&[&[("a", Value::Null)]]);
        let generated = trace(&[&[]]);
        let mismatches = find_mismatches(&learner, &generated);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].predicted, Some(Value::Null));
        assert_eq!(mismatches[0].actual, None);
        assert!(mismatches[0].explanation.ends_with("actual value is undefined"));
    }

    #[test]
    fn test_variable_order_generated_first() {
        let learner = trace(&[&[("z", json!(1)), ("a", json!(9))]]);
        let generated = trace(&[&[("b", json!(2)), ("a", json!(3))]]);
        let names: Vec<_> = find_mismatches(&learner, &generated)
            .into_iter()
            .map(|m| m.variable)
            .collect();
        assert_eq!(names, vec!["b", "a", "z"]);
    }

    #[test]
    fn test_numeric_representation_does_not_matter() {
        let learner = trace(&[&[("n", json!(1.0)), ("xs", json!([1, {"k": 2}]))]]);
        let generated = trace(&[&[("n", json!(1)), ("xs", json!([1, {"k": 2}]))]]);
        assert!(find_mismatches(&learner, &generated).is_empty());
    }

    #[test]
    fn test_swapping_roles_swaps_labels() {
        let a = trace(&[&[("x", json!(1)), ("y", json!(2))], &[("x", json!(5))]]);
        let b = trace(&[&[("x", json!(1)), ("y", json!(3))], &[("w", json!(0))]]);

        let forward = find_mismatches(&a, &b);
        let backward = find_mismatches(&b, &a);

        let mut pairs_f: Vec<_> = forward.iter().map(|m| (m.at_step, m.variable.clone())).collect();
        let mut pairs_b: Vec<_> = backward.iter().map(|m| (m.at_step, m.variable.clone())).collect();
        pairs_f.sort();
        pairs_b.sort();
        assert_eq!(pairs_f, pairs_b);

        for m in &forward {
            let twin = backward
                .iter()
                .find(|o| o.at_step == m.at_step && o.variable == m.variable)
                .unwrap();
            assert_eq!(twin.predicted, m.actual);
            assert_eq!(twin.actual, m.predicted);
        }
    }

    #[test]
    fn test_malformed_learner_document() {
        let generated = trace(&[&[("x", json!(1))]]);
        assert!(find_mismatches_in(&json!("not a trace"), &generated).is_empty());
        assert_eq!(
            find_mismatches_in(&json!([{"step": 1, "variables": {"x": 2}}]), &generated).len(),
            1
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let m = Mismatch {
            at_step: 2,
            variable: "i".into(),
            predicted: Some(json!(4)),
            actual: None,
            explanation: String::new(),
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["atStep"], json!(2));
        assert!(v.get("actual").is_none());
    }
}
