//! Request boundary
//!
//! [`execute`] takes an [`ExecutionRequest`] (source, subset, optional learner
//! trace), runs the matching stepper, compares the result against the learner
//! trace and returns an [`ExecutionOutcome`]. Apart from rejecting an empty
//! source it never fails: faults inside a run are reported on the outcome.

use crate::config::SimulationConfig;
use crate::discrepancy::{find_mismatches, Mismatch};
use crate::interpreter::{run_c_like, run_dynamic, SimulationRun};
use crate::snapshot::Trace;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Which stepper a snippet is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubsetKind {
    #[serde(rename = "c-like")]
    CLike,
    #[serde(rename = "dynamic-like")]
    DynamicLike,
}

impl SubsetKind {
    /// Map a challenge's language tag; anything that is not C/C++ runs as dynamic
    pub fn from_language_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "cpp" | "c++" | "c" | "cc" | "cxx" => SubsetKind::CLike,
            _ => SubsetKind::DynamicLike,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SubsetKind::CLike => "c-like",
            SubsetKind::DynamicLike => "dynamic-like",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    #[serde(alias = "code")]
    pub source_code: String,
    pub subset_kind: SubsetKind,
    #[serde(default)]
    pub learner_trace: Option<Trace>,
}

impl ExecutionRequest {
    pub fn new(source_code: impl Into<String>, subset_kind: SubsetKind) -> Self {
        ExecutionRequest {
            source_code: source_code.into(),
            subset_kind,
            learner_trace: None,
        }
    }

    pub fn with_learner_trace(mut self, trace: Trace) -> Self {
        self.learner_trace = Some(trace);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub success: bool,
    pub output: Vec<String>,
    pub trace: Trace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub mismatches: Vec<Mismatch>,
    /// The iteration guard or step budget stopped the run early
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl ExecutionOutcome {
    /// Whether the mismatches should be forwarded for hint generation
    pub fn hint_worthy(&self) -> bool {
        !self.mismatches.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("source code is required")]
    MissingSource,
}

/// Run one request
pub fn execute(request: &ExecutionRequest, config: &SimulationConfig) -> Result<ExecutionOutcome, RequestError> {
    if request.source_code.trim().is_empty() {
        return Err(RequestError::MissingSource);
    }

    let started = Instant::now();
    let run: SimulationRun = match request.subset_kind {
        SubsetKind::CLike => run_c_like(&request.source_code, config),
        SubsetKind::DynamicLike => run_dynamic(&request.source_code, config),
    };

    let mismatches = request
        .learner_trace
        .as_deref()
        .map(|learner| find_mismatches(learner, &run.trace))
        .unwrap_or_default();

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        subset = request.subset_kind.name(),
        steps = run.trace.len(),
        mismatches = mismatches.len(),
        truncated = run.truncated,
        elapsed_ms,
        "execution finished"
    );
    if let Some(error) = &run.error {
        debug!(%error, "run reported a fault");
    }

    Ok(ExecutionOutcome {
        success: run.succeeded(),
        output: run.output,
        trace: run.trace,
        error: run.error,
        mismatches,
        truncated: run.truncated,
        elapsed_ms,
    })
}
