//! Variable store for the simulators
//!
//! This module provides the state the steppers mutate between snapshots:
//! - [`value`]: helpers over JSON-representable variable values
//! - [`bindings`]: ordered name → value store, deep-copied into every snapshot
//! - [`stack`]: simulated call frames
//!
//! # Values
//!
//! Variable values are plain [`serde_json::Value`]s. They end up in front of a
//! learner and in hint prompts as serialized text, so there is no reason to
//! carry a richer runtime representation than what JSON can express.

pub mod bindings;
pub mod stack;
pub mod value;

pub use bindings::Bindings;
pub use stack::{CallStack, Frame};
pub use value::Value;
