// Constants for the simulators

/// Maximum matcher invocations per C-like run before the scan stops
/// This bounds runaway backward jumps from loops whose condition never turns false
pub const MAX_ITERATIONS: usize = 1000;

/// Maximum statements the dynamic-subset evaluator executes per run
pub const SCRIPT_STEP_BUDGET: usize = 10_000;

/// Maximum nesting of simulated user function calls
pub const MAX_CALL_DEPTH: usize = 64;

/// Maximum syntactic nesting (parentheses, unary chains, blocks) the parser accepts
pub const MAX_NESTING_DEPTH: usize = 64;

/// The only callee the C-like matcher knows how to simulate
pub const FACTORIAL_CALLEE: &str = "factorial";

/// Integer declaration keywords recognized by the C-like matcher
pub const C_DECL_KEYWORDS: &[&str] = &["int", "long", "short"];

/// Declaration keywords of the dynamic subset
pub const SCRIPT_DECL_KEYWORDS: &[&str] = &["let", "const", "var"];
