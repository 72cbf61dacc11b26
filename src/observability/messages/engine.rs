// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph evaluation events.
//!
//! This module contains message types for logging events related to:
//! * Request evaluation lifecycle at the adapter boundary (start, completion, failure)
//! * Parallel fan-out and fan-in
//! * Job submission to the model collaborator

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Evaluation of a graph started for one request.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use ensemble_graph::observability::messages::engine::EvaluationStarted;
///
/// let msg = EvaluationStarted {
///     root_type: "sequence",
///     entry_count: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Evaluating sequence graph: 2 input entries");
/// ```
pub struct EvaluationStarted<'a> {
    pub root_type: &'a str,
    pub entry_count: usize,
}

impl Display for EvaluationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluating {} graph: {} input entries",
            self.root_type, self.entry_count
        )
    }
}

impl StructuredLog for EvaluationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            root_type = self.root_type,
            entry_count = self.entry_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation",
            span_name = name,
            root_type = self.root_type,
            entry_count = self.entry_count,
        )
    }
}

/// Evaluation of a graph completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EvaluationCompleted<'a> {
    pub root_type: &'a str,
    pub output_entries: usize,
    pub duration: Duration,
}

impl Display for EvaluationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluated {} graph: {} output entries in {:?}",
            self.root_type, self.output_entries, self.duration
        )
    }
}

impl StructuredLog for EvaluationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            root_type = self.root_type,
            output_entries = self.output_entries,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation_completed",
            span_name = name,
            root_type = self.root_type,
            duration = ?self.duration,
        )
    }
}

/// Evaluation of a graph failed. The request yields this single error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct EvaluationFailed<'a> {
    pub root_type: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EvaluationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Evaluation of {} graph failed: {}", self.root_type, self.error)
    }
}

impl StructuredLog for EvaluationFailed<'_> {
    fn log(&self) {
        tracing::error!(root_type = self.root_type, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "evaluation_failed",
            span_name = name,
            root_type = self.root_type,
            error = %self.error,
        )
    }
}

/// A parallel node dispatched its branches.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct ParallelFanOut {
    pub branch_count: usize,
    pub child_count: usize,
    pub split_inputs: bool,
}

impl Display for ParallelFanOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parallel fan-out: {} branches over {} children (split_inputs={})",
            self.branch_count, self.child_count, self.split_inputs
        )
    }
}

impl StructuredLog for ParallelFanOut {
    fn log(&self) {
        tracing::debug!(
            branch_count = self.branch_count,
            child_count = self.child_count,
            split_inputs = self.split_inputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "parallel",
            span_name = name,
            branch_count = self.branch_count,
            split_inputs = self.split_inputs,
        )
    }
}

/// All branches of a parallel node settled and were combined.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct ParallelFanIn {
    pub branch_count: usize,
    pub merge_outputs: bool,
    pub output_entries: usize,
    pub duration: Duration,
}

impl Display for ParallelFanIn {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parallel fan-in: {} branches combined into {} entries (merge_outputs={}) in {:?}",
            self.branch_count, self.output_entries, self.merge_outputs, self.duration
        )
    }
}

impl StructuredLog for ParallelFanIn {
    fn log(&self) {
        tracing::debug!(
            branch_count = self.branch_count,
            merge_outputs = self.merge_outputs,
            output_entries = self.output_entries,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "parallel_fan_in",
            span_name = name,
            branch_count = self.branch_count,
        )
    }
}

/// One branch of a parallel node failed.
///
/// # Log Level
/// `warn!` - The aggregate result will be a failure
pub struct BranchFailed<'a> {
    pub branch: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for BranchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Parallel branch {} failed: {}", self.branch, self.error)
    }
}

impl StructuredLog for BranchFailed<'_> {
    fn log(&self) {
        tracing::warn!(branch = self.branch, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "branch_failed",
            span_name = name,
            branch = self.branch,
            error = %self.error,
        )
    }
}

/// A job was handed to the model collaborator.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct JobSubmitted<'a> {
    pub model: &'a str,
    pub entry_count: usize,
}

impl Display for JobSubmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Submitting job to model '{}': {} entries",
            self.model, self.entry_count
        )
    }
}

impl StructuredLog for JobSubmitted<'_> {
    fn log(&self) {
        tracing::debug!(model = self.model, entry_count = self.entry_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("model_ref", span_name = name, model = self.model)
    }
}

/// The model collaborator reported a failure for a job.
///
/// # Log Level
/// `warn!` - Propagated to the caller unchanged
pub struct JobFailed<'a> {
    pub model: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for JobFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job for model '{}' failed: {}", self.model, self.error)
    }
}

impl StructuredLog for JobFailed<'_> {
    fn log(&self) {
        tracing::warn!(model = self.model, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "job_failed",
            span_name = name,
            model = self.model,
            error = %self.error,
        )
    }
}
