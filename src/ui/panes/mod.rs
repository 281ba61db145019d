//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: source display with highlighting and current line indicator
//! - [`variables`]: bindings of the current snapshot plus the simulated frames
//! - [`output`]: cumulative output at the current snapshot
//! - [`mismatches`]: divergences from the learner's prediction
//! - [`status`]: status bar with keybindings and replay state
//!
//! Each pane module exports a `render_*` function and, where it needs more
//! than a couple of inputs, a `*RenderData` struct.

pub mod mismatches;
pub mod output;
pub mod source;
pub mod status;
pub mod variables;

pub use mismatches::{render_mismatch_pane, MismatchRenderData};
pub use output::render_output_pane;
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use variables::{render_variables_pane, VariablesRenderData, VariablesScrollState};
