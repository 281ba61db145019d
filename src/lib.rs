//! # Introduction
//!
//! Reforge turns a short imperative snippet into an execution trace (one
//! snapshot of line, bindings, call stack and output per interesting step) and
//! compares that trace against the trace a learner predicted before running
//! the code. The snapshots can be replayed in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! C-like:        Source → Statement matcher → Line stepper ─┐
//! Dynamic-like:  Source → Lexer → Parser → AST → Evaluator ─┼→ Trace → Discrepancies
//!                                     (static fallback) ────┘
//! ```
//!
//! 1. [`interpreter`]: the two steppers. The C-like stepper recognizes a fixed
//!    set of statement shapes line by line; the dynamic-like stepper runs a
//!    sandboxed evaluator over the AST from [`parser`].
//! 2. [`snapshot`]: the trace accumulator and learner-trace decoding.
//! 3. [`memory`]: JSON-valued [`memory::Bindings`] and the simulated
//!    [`memory::CallStack`].
//! 4. [`discrepancy`]: per-step, per-variable comparison of two traces.
//! 5. [`session`]: the request boundary tying the above together.
//! 6. [`ui`]: ratatui-based trace viewer; not part of the stable library API.
//!
//! ## Supported C-like subset
//!
//! `int x = 5;`, `x = 7;`, `x++;`, `x += y;`, `while (x <= 5) { ... }`,
//! `cout << ... ;` and `r = factorial(5);`. Anything else is skipped.

pub mod config;
pub mod discrepancy;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod session;
pub mod snapshot;
pub mod ui;

pub use config::SimulationConfig;
pub use session::{execute, ExecutionOutcome, ExecutionRequest, RequestError, SubsetKind};
