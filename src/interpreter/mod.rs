//! Simulation engines
//!
//! This module provides the two steppers and what they share:
//! - [`engine`]: line-cursor stepper for the C-like subset
//! - [`matcher`]: statement recognizers the C-like stepper dispatches on
//! - [`loops`]: brace matching for `while` entry, skip and back-jump
//! - [`script`]: sandboxed evaluator for the dynamic subset
//! - [`fallback`]: static analysis used when the live path captures nothing
//! - [`ops`] / [`builtins`]: value operators and built-in calls
//! - [`errors`]: runtime fault types of the dynamic subset
//!
//! # Execution Model
//!
//! Both steppers own all of their state (bindings, accumulator, cursor), so
//! independent runs never share anything and can execute in parallel. Every run
//! produces a [`SimulationRun`], even when the snippet faults: the trace
//! captured before the fault is kept.

pub mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod fallback;
pub mod loops;
pub mod matcher;
pub mod ops;
pub mod script;

use crate::config::SimulationConfig;
use crate::snapshot::Trace;

pub use engine::CStepper;
pub use errors::RuntimeError;
pub use script::ScriptRunner;

/// Result of one stepper run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationRun {
    pub trace: Trace,
    pub output: Vec<String>,
    /// Message of the live-execution fault, if any
    pub error: Option<String>,
    /// The iteration guard or step budget stopped the run early
    pub truncated: bool,
}

impl SimulationRun {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Step through a C-like snippet
pub fn run_c_like(source: &str, config: &SimulationConfig) -> SimulationRun {
    CStepper::new(source, config).run()
}

/// Execute a dynamic-subset snippet, falling back to static analysis when the
/// live run captures nothing
pub fn run_dynamic(source: &str, config: &SimulationConfig) -> SimulationRun {
    let mut run = ScriptRunner::new(source, config).run();

    if run.trace.is_empty() {
        tracing::debug!(error = ?run.error, "live run captured nothing, analyzing statically");
        run.trace = fallback::analyze(source);
    }

    run
}
