// Snapshot recording for simulated execution

use crate::memory::{Bindings, CallStack, Frame, Value};
use serde::{Deserialize, Serialize};

/// Captured program output, one entry per emitted line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputLog {
    pub lines: Vec<String>,
}

impl OutputLog {
    pub fn new() -> Self {
        OutputLog { lines: Vec::new() }
    }

    /// Append one line of output
    pub fn print(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn get_output(&self) -> &[String] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// One recorded state of the simulated program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// 1-based position within the trace
    #[serde(alias = "step")]
    pub index: usize,
    /// 1-based source line this snapshot belongs to
    #[serde(alias = "line")]
    pub source_line: usize,
    #[serde(alias = "variables")]
    pub bindings: Bindings,
    #[serde(alias = "stack")]
    pub call_stack: Vec<Frame>,
    /// Every output line produced so far (cumulative)
    #[serde(alias = "output")]
    pub emitted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "explanation")]
    pub note: Option<String>,
}

impl Snapshot {
    /// A snapshot with nothing bound, used as a placeholder for undecodable learner steps
    pub fn empty(index: usize) -> Self {
        Snapshot {
            index,
            ..Snapshot::default()
        }
    }
}

/// Ordered snapshots of one run
pub type Trace = Vec<Snapshot>;

/// Builds a trace one committed snapshot at a time.
///
/// Besides the snapshots themselves it owns the state the steppers mutate
/// between commits: the bindings of the last commit, the output so far and the
/// simulated call stack. Every commit deep-copies all three, so later mutation
/// never reaches an already recorded snapshot.
#[derive(Debug, Default)]
pub struct TraceAccumulator {
    snapshots: Vec<Snapshot>,
    current_bindings: Bindings,
    output: OutputLog,
    stack: CallStack,
}

impl TraceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all state so the accumulator can be reused for an independent run
    pub fn reset(&mut self) {
        self.snapshots.clear();
        self.current_bindings.clear();
        self.output.clear();
        self.stack.clear();
    }

    /// Append a snapshot of `bindings` at `source_line`
    pub fn commit(
        &mut self,
        source_line: usize,
        bindings: &Bindings,
        condition: Option<String>,
        note: Option<String>,
    ) {
        self.current_bindings = bindings.clone();
        self.snapshots.push(Snapshot {
            index: self.snapshots.len() + 1,
            source_line,
            bindings: bindings.clone(),
            call_stack: self.stack.frames().to_vec(),
            emitted: self.output.get_output().to_vec(),
            condition,
            note,
        });
    }

    pub fn push_frame(&mut self, name: impl Into<String>, bindings: &Bindings, source_line: usize) {
        self.stack
            .push_frame(Frame::new(name, bindings.clone(), source_line));
    }

    /// Pop the innermost frame; `None` (not an error) on an empty stack
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.stack.pop_frame()
    }

    /// Append one output line, visible to every later commit
    pub fn record_output(&mut self, value: impl Into<String>) {
        self.output.print(value);
    }

    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn current_bindings(&self) -> &Bindings {
        &self.current_bindings
    }

    pub fn output(&self) -> &[String] {
        self.output.get_output()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Hand out the finished trace and the captured output
    pub fn finish(self) -> (Trace, Vec<String>) {
        (self.snapshots, self.output.lines)
    }
}

/// Decode a learner-authored trace without ever failing.
///
/// Accepts a bare array of steps or an object wrapping one under `trace` or
/// `traceSteps`. Anything else decodes to an empty trace. A step that cannot
/// be decoded becomes an empty snapshot so later steps keep their positions.
pub fn decode_learner_trace(document: &Value) -> Trace {
    let steps = match document {
        Value::Array(steps) => steps,
        Value::Object(map) => match map.get("trace").or_else(|| map.get("traceSteps")) {
            Some(Value::Array(steps)) => steps,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    steps
        .iter()
        .enumerate()
        .map(|(position, step)| {
            serde_json::from_value::<Snapshot>(step.clone())
                .unwrap_or_else(|_| Snapshot::empty(position + 1))
        })
        .collect()
}

/// [`decode_learner_trace`] over JSON text; unparsable text is an empty trace
pub fn decode_learner_trace_str(text: &str) -> Trace {
    serde_json::from_str::<Value>(text)
        .map(|doc| decode_learner_trace(&doc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings(pairs: &[(&str, i64)]) -> Bindings {
        pairs.iter().map(|(k, v)| (*k, json!(v))).collect()
    }

    #[test]
    fn test_commit_numbers_snapshots() {
        let mut acc = TraceAccumulator::new();
        acc.commit(1, &bindings(&[("x", 1)]), None, None);
        acc.commit(2, &bindings(&[("x", 2)]), None, None);
        let indices: Vec<usize> = acc.snapshots().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_commit_copies_bindings() {
        let mut acc = TraceAccumulator::new();
        let mut vars = bindings(&[("x", 1)]);
        acc.commit(1, &vars, None, None);
        vars.set("x", json!(99));
        assert_eq!(acc.latest_snapshot().unwrap().bindings.get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_output_is_cumulative() {
        let mut acc = TraceAccumulator::new();
        acc.record_output("a");
        acc.commit(1, &Bindings::new(), None, None);
        acc.record_output("b");
        acc.commit(2, &Bindings::new(), None, None);
        assert_eq!(acc.snapshots()[0].emitted, vec!["a"]);
        assert_eq!(acc.snapshots()[1].emitted, vec!["a", "b"]);
    }

    #[test]
    fn test_frames_visible_until_popped() {
        let mut acc = TraceAccumulator::new();
        acc.push_frame("factorial", &bindings(&[("n", 5)]), 3);
        acc.commit(3, &Bindings::new(), None, None);
        assert!(acc.pop_frame().is_some());
        assert!(acc.pop_frame().is_none());
        acc.commit(4, &Bindings::new(), None, None);
        assert_eq!(acc.snapshots()[0].call_stack.len(), 1);
        assert!(acc.snapshots()[1].call_stack.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut acc = TraceAccumulator::new();
        acc.record_output("x");
        acc.push_frame("f", &Bindings::new(), 1);
        acc.commit(1, &bindings(&[("a", 1)]), None, None);
        acc.reset();
        assert!(acc.latest_snapshot().is_none());
        assert!(acc.output().is_empty());
        assert_eq!(acc.stack_depth(), 0);
        assert!(acc.current_bindings().is_empty());
    }

    #[test]
    fn test_decode_legacy_step_names() {
        let doc = json!([
            {"step": 1, "line": 4, "variables": {"sum": 10}, "stack": [], "output": [], "explanation": "guess"}
        ]);
        let trace = decode_learner_trace(&doc);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].source_line, 4);
        assert_eq!(trace[0].bindings.get("sum"), Some(&json!(10)));
        assert_eq!(trace[0].note.as_deref(), Some("guess"));
    }

    #[test]
    fn test_decode_malformed_input() {
        assert!(decode_learner_trace(&json!("nope")).is_empty());
        assert!(decode_learner_trace_str("{not json").is_empty());

        let trace = decode_learner_trace(&json!([42, {"bindings": {"x": 1}}]));
        assert_eq!(trace.len(), 2);
        assert!(trace[0].bindings.is_empty());
        assert_eq!(trace[1].bindings.get("x"), Some(&json!(1)));
    }
}
