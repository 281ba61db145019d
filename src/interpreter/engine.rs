// Line-cursor stepper for the C-like subset

use crate::config::SimulationConfig;
use crate::interpreter::builtins;
use crate::interpreter::loops::{find_loop_head, skip_loop_body};
use crate::interpreter::matcher::{classify, LoopCondition, Statement};
use crate::interpreter::ops;
use crate::interpreter::SimulationRun;
use crate::memory::value::{self, Value};
use crate::memory::Bindings;
use crate::parser::ast::BinOp;
use crate::snapshot::TraceAccumulator;
use tracing::{debug, trace, warn};

/// Steps a C-like snippet one line at a time.
///
/// The stepper is a small state machine over a line cursor. Each iteration
/// classifies the line under the cursor, applies its effect to the bindings,
/// commits a snapshot for state-changing statements and moves the cursor
/// (forward, past a loop body, or back to a loop head). The scan ends when the
/// cursor runs off the source or the iteration cap is reached.
pub struct CStepper<'a> {
    lines: Vec<&'a str>,

    /// Variable store mutated between commits
    bindings: Bindings,

    recorder: TraceAccumulator,

    /// 0-based index of the line under the cursor
    cursor: usize,

    /// Matcher invocations so far
    iterations: usize,

    iteration_cap: usize,
}

impl<'a> CStepper<'a> {
    pub fn new(source: &'a str, config: &SimulationConfig) -> Self {
        CStepper {
            lines: source.lines().collect(),
            bindings: Bindings::new(),
            recorder: TraceAccumulator::new(),
            cursor: 0,
            iterations: 0,
            iteration_cap: config.iteration_cap,
        }
    }

    /// Run to completion (or to the iteration cap)
    pub fn run(mut self) -> SimulationRun {
        while self.cursor < self.lines.len() && self.iterations < self.iteration_cap {
            self.iterations += 1;
            self.step();
        }

        let truncated = self.cursor < self.lines.len();
        if truncated {
            warn!(
                cap = self.iteration_cap,
                line = self.cursor + 1,
                "iteration cap reached, returning partial trace"
            );
        }

        if self.recorder.is_empty() {
            self.recorder
                .commit(1, &self.bindings, None, Some("Code analyzed".to_string()));
        }

        let (trace, output) = self.recorder.finish();
        debug!(snapshots = trace.len(), outputs = output.len(), "C-like run finished");

        SimulationRun {
            trace,
            output,
            error: None,
            truncated,
        }
    }

    /// Execute the line under the cursor and move the cursor
    fn step(&mut self) {
        let line_no = self.cursor + 1;
        let statement = classify(self.lines[self.cursor], &self.bindings);
        trace!(line = line_no, ?statement, "classified");

        match statement {
            Statement::NoOp | Statement::Unrecognized => self.cursor += 1,
            Statement::Declare { name, value } => {
                self.bindings.set(name.clone(), value::int(value));
                self.commit_note(format!("Variable {} initialized to {}", name, value));
                self.cursor += 1;
            }
            Statement::Assign { name, value } => {
                self.bindings.set(name.clone(), value::int(value));
                self.commit_note(format!("Variable {} assigned to {}", name, value));
                self.cursor += 1;
            }
            Statement::Increment { name } => {
                let current = self.bindings.get(&name).cloned().unwrap_or(Value::Null);
                let next = ops::apply_binary(BinOp::Add, &current, &value::int(1), line_no)
                    .unwrap_or(Value::Null);
                self.commit_assignment(&name, next, |v| format!("Variable {} incremented to {}", name, v));
                self.cursor += 1;
            }
            Statement::AddAssign { target, operand } => {
                let left = self.bindings.get(&target).cloned().unwrap_or(Value::Null);
                let right = self.bindings.get(&operand).cloned().unwrap_or(Value::Null);
                let sum = ops::apply_binary(BinOp::Add, &left, &right, line_no).unwrap_or(Value::Null);
                self.commit_assignment(&target, sum, |v| {
                    format!("Variable {} += {}, now {}", target, operand, v)
                });
                self.cursor += 1;
            }
            Statement::WhileHead(condition) => self.enter_loop(&condition),
            Statement::CloseBrace => self.close_block(),
            Statement::Output { text } => {
                self.recorder.record_output(text.clone());
                self.commit_note(format!("Output: {}", text));
                self.cursor += 1;
            }
            Statement::FactorialCall { target, argument } => {
                self.simulate_factorial(&target, argument);
                self.cursor += 1;
            }
        }
    }

    /// A true head commits with the rendered condition; a false one skips the body
    fn enter_loop(&mut self, condition: &LoopCondition) {
        if !condition.evaluate(&self.bindings) {
            let resume = skip_loop_body(&self.lines, self.cursor);
            debug!(
                line = self.cursor + 1,
                condition = %condition,
                resume = resume + 1,
                "loop condition false, skipping body"
            );
            self.cursor = resume;
            return;
        }

        let current = value::display_value(&condition.current_value(&self.bindings));
        let line_no = self.cursor + 1;
        self.recorder.commit(
            line_no,
            &self.bindings,
            Some(condition.render()),
            Some(format!(
                "Line {}: Loop condition true, {} = {}",
                line_no, condition.variable, current
            )),
        );
        self.cursor += 1;
    }

    /// A `}` that closes a loop whose condition still holds jumps back to the head
    fn close_block(&mut self) {
        let head = find_loop_head(&self.lines, self.cursor)
            .and_then(|idx| LoopCondition::parse(self.lines[idx]).map(|cond| (idx, cond)));

        match head {
            Some((idx, condition)) if condition.evaluate(&self.bindings) => {
                trace!(from = self.cursor + 1, to = idx + 1, "jumping back to loop head");
                self.cursor = idx;
            }
            _ => self.cursor += 1,
        }
    }

    /// `target = factorial(n)`, computed iteratively under a simulated frame
    fn simulate_factorial(&mut self, target: &str, argument: i64) {
        let line_no = self.cursor + 1;
        let result = builtins::factorial(argument);
        let shown = value::display_value(&result);

        let mut locals = Bindings::new();
        locals.set("n", value::int(argument));
        self.recorder.push_frame("factorial", &locals, line_no);

        self.bindings.set(target, result);
        self.commit_note(format!(
            "Function factorial({}) called, result = {}",
            argument, shown
        ));
        self.recorder.pop_frame();
    }

    fn commit_assignment(&mut self, name: &str, new_value: Value, note: impl FnOnce(String) -> String) {
        let shown = value::display_value(&new_value);
        self.bindings.set(name, new_value);
        self.commit_note(note(shown));
    }

    /// Commit at the cursor line with `Line N: ` prefixed to the note
    fn commit_note(&mut self, note: String) {
        let line_no = self.cursor + 1;
        self.recorder.commit(
            line_no,
            &self.bindings,
            None,
            Some(format!("Line {}: {}", line_no, note)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(source: &str) -> SimulationRun {
        CStepper::new(source, &SimulationConfig::default()).run()
    }

    const OFF_BY_ONE: &str = "\
int i = 0;
int sum = 0;
while (i <= 5) {
    sum += i;
    i++;
}
cout << i;
cout << sum;
";

    #[test]
    fn test_loop_off_by_one() {
        let result = run(OFF_BY_ONE);
        assert_eq!(result.output, vec!["6", "15"]);
        assert!(!result.truncated);

        let last = result.trace.last().unwrap();
        assert_eq!(last.bindings.get("i"), Some(&json!(6)));
        assert_eq!(last.bindings.get("sum"), Some(&json!(15)));
        assert_eq!(last.emitted, vec!["6", "15"]);
    }

    #[test]
    fn test_loop_head_snapshots_carry_condition() {
        let result = run(OFF_BY_ONE);
        let heads: Vec<_> = result
            .trace
            .iter()
            .filter(|s| s.source_line == 3)
            .collect();
        // entered for i = 0..=5
        assert_eq!(heads.len(), 6);
        assert!(heads
            .iter()
            .all(|s| s.condition.as_deref() == Some("while (i <= 5)")));
    }

    #[test]
    fn test_false_head_skips_body() {
        let result = run("int i = 9;\nwhile (i < 3) {\n    i++;\n}\ncout << i;\n");
        assert_eq!(result.output, vec!["9"]);
        assert_eq!(result.trace.len(), 2);
    }

    #[test]
    fn test_iteration_cap_truncates() {
        let source = "int i = 0;\nwhile (i < 5) {\n    i = 1;\n}\n";
        let config = SimulationConfig {
            iteration_cap: 50,
            ..SimulationConfig::default()
        };
        let result = CStepper::new(source, &config).run();
        assert!(result.truncated);
        assert!(result.error.is_none());
        assert!(!result.trace.is_empty());
    }

    #[test]
    fn test_empty_trace_gets_analyzed_snapshot() {
        let result = run("#include <iostream>\nint main() {\n    return 0;\n}\n");
        assert_eq!(result.trace.len(), 1);
        assert_eq!(result.trace[0].source_line, 1);
        assert_eq!(result.trace[0].note.as_deref(), Some("Code analyzed"));
    }

    #[test]
    fn test_factorial_frame_is_visible_then_popped() {
        let result = run("int result = factorial(5);\ncout << result;\n");
        assert_eq!(result.output, vec!["120"]);

        let call = &result.trace[0];
        assert_eq!(call.bindings.get("result"), Some(&json!(120)));
        assert_eq!(call.call_stack.len(), 1);
        assert_eq!(call.call_stack[0].name, "factorial");
        assert_eq!(call.call_stack[0].bindings.get("n"), Some(&json!(5)));
        assert!(result.trace[1].call_stack.is_empty());
    }

    #[test]
    fn test_factorial_beyond_i64_prints_as_float() {
        let result = run("int r = factorial(25);\ncout << r;\n");
        assert_eq!(result.output, vec!["1.5511210043330986e+25"]);
        assert_eq!(
            result.trace[0].note.as_deref(),
            Some("Line 1: Function factorial(25) called, result = 1.5511210043330986e+25")
        );
    }

    #[test]
    fn test_huge_factorial_argument_returns() {
        let result = run("int r = factorial(9223372036854775807);\n");
        assert_eq!(result.trace.len(), 1);
        assert_eq!(result.trace[0].bindings.get("r"), Some(&Value::Null));
    }

    #[test]
    fn test_notes() {
        let result = run("int x = 1;\nx = 4;\nx++;\nx += x;\n");
        let notes: Vec<_> = result.trace.iter().filter_map(|s| s.note.as_deref()).collect();
        assert_eq!(
            notes,
            vec![
                "Line 1: Variable x initialized to 1",
                "Line 2: Variable x assigned to 4",
                "Line 3: Variable x incremented to 5",
                "Line 4: Variable x += x, now 10",
            ]
        );
    }
}
