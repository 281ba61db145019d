//! Simulated call stack
//!
//! Frames are pushed on simulated function entry and popped on return. Each
//! [`Frame`] keeps a copy of the callee's locals as they were at push time and
//! the line of the call site.

use super::bindings::Bindings;
use serde::{Deserialize, Serialize};

/// Activation record for a simulated call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(alias = "functionName")]
    pub name: String,
    #[serde(default, alias = "variables")]
    pub bindings: Bindings,
    #[serde(default, alias = "line")]
    pub source_line: usize,
}

impl Frame {
    pub fn new(name: impl Into<String>, bindings: Bindings, source_line: usize) -> Self {
        Frame {
            name: name.into(),
            bindings,
            source_line,
        }
    }
}

/// The call stack (innermost frame last)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack { frames: Vec::new() }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame; popping an empty stack is a no-op.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_empty_is_noop() {
        let mut stack = CallStack::new();
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_frame_accepts_legacy_field_names() {
        let frame: Frame =
            serde_json::from_str(r#"{"functionName":"factorial","variables":{"n":5},"line":7}"#)
                .unwrap();
        assert_eq!(frame.name, "factorial");
        assert_eq!(frame.source_line, 7);
        assert_eq!(frame.bindings.len(), 1);
    }
}
