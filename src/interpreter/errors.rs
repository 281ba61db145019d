//! Runtime error types for the dynamic-subset evaluator
//!
//! [`RuntimeError`] represents the faults a live run can hit. They are never
//! fatal to the caller: the stepper records the message on the outcome and keeps
//! the trace captured up to the fault. The C-like stepper has no error path at
//! all (unrecognized statements are skipped, runaway loops are capped).

use crate::parser::parser::ParseError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The snippet could not be parsed
    #[error(transparent)]
    Syntax(#[from] ParseError),

    /// Read of a name that was never declared
    #[error("ReferenceError: {name} is not defined (line {line})")]
    UndefinedVariable { name: String, line: usize },

    /// Call of something that is not a function
    #[error("TypeError: {name} is not a function (line {line})")]
    NotCallable { name: String, line: usize },

    /// Reassignment of a `const` binding
    #[error("TypeError: Assignment to constant variable '{name}' (line {line})")]
    ConstAssignment { name: String, line: usize },

    /// Operation applied to a value of the wrong shape
    #[error("TypeError: {message} (line {line})")]
    TypeError { message: String, line: usize },

    /// Simulated call nesting went past the configured limit
    #[error("RangeError: Maximum call stack size exceeded ({limit} frames, line {line})")]
    CallDepthExceeded { limit: usize, line: usize },

    /// Construct the sandboxed evaluator refuses to run
    #[error("Unsupported: {message} (line {line})")]
    Unsupported { message: String, line: usize },
}

impl RuntimeError {
    /// Source line the fault was raised at
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::Syntax(err) => err.location.line,
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::NotCallable { line, .. }
            | RuntimeError::ConstAssignment { line, .. }
            | RuntimeError::TypeError { line, .. }
            | RuntimeError::CallDepthExceeded { line, .. }
            | RuntimeError::Unsupported { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::SourceLocation;

    #[test]
    fn test_messages_name_the_line() {
        let err = RuntimeError::UndefinedVariable {
            name: "total".into(),
            line: 4,
        };
        assert_eq!(err.to_string(), "ReferenceError: total is not defined (line 4)");
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn test_syntax_error_is_transparent() {
        let err = RuntimeError::from(ParseError {
            message: "Expected ')'".into(),
            location: SourceLocation::new(2, 7),
        });
        assert_eq!(err.line(), 2);
        assert!(err.to_string().starts_with("SyntaxError at line 2"));
    }
}
