//! Simulation limits
//!
//! [`SimulationConfig`] carries the caps that bound a single run. The defaults
//! come from [`crate::interpreter::constants`]; the binary lets each one be
//! overridden from the command line.

use crate::interpreter::constants::{MAX_CALL_DEPTH, MAX_ITERATIONS, SCRIPT_STEP_BUDGET};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    /// Matcher invocations allowed for one C-like run
    pub iteration_cap: usize,
    /// Statements the dynamic-subset evaluator may execute
    pub script_step_budget: usize,
    /// Nesting limit for simulated user function calls
    pub max_call_depth: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            iteration_cap: MAX_ITERATIONS,
            script_step_budget: SCRIPT_STEP_BUDGET,
            max_call_depth: MAX_CALL_DEPTH,
        }
    }
}
