// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processor resolution and execution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A named processor was instantiated from the registry.
///
/// # Log Level
/// `info!` - Happens once per model reference
///
/// # Example
/// ```
/// use ensemble_graph::observability::messages::processor::ProcessorResolved;
///
/// let msg = ProcessorResolved {
///     name: "sub_image",
///     capability: "output",
/// };
///
/// assert_eq!(msg.to_string(), "Resolved output processor 'sub_image'");
/// ```
pub struct ProcessorResolved<'a> {
    pub name: &'a str,
    pub capability: &'a str,
}

impl Display for ProcessorResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Resolved {} processor '{}'", self.capability, self.name)
    }
}

impl StructuredLog for ProcessorResolved<'_> {
    fn log(&self) {
        tracing::info!(name = self.name, capability = self.capability, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor_resolved",
            span_name = name,
            processor = self.name,
            capability = self.capability,
        )
    }
}

/// Resolving a processor failed.
///
/// # Log Level
/// `error!` - Aborts the in-flight request
pub struct ProcessorResolutionFailed<'a> {
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessorResolutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to resolve processor '{}': {}", self.name, self.error)
    }
}

impl StructuredLog for ProcessorResolutionFailed<'_> {
    fn log(&self) {
        tracing::error!(name = self.name, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "processor_resolution_failed",
            span_name = name,
            processor = self.name,
            error = %self.error,
        )
    }
}

/// Processor execution completed successfully.
///
/// # Log Level
/// `debug!` - Per-request detail
pub struct ProcessorExecutionCompleted<'a> {
    pub processor_id: &'a str,
    pub input_entries: usize,
    pub output_entries: usize,
    pub duration: Duration,
}

impl Display for ProcessorExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' completed: input={} entries, output={} entries, duration={:?}",
            self.processor_id, self.input_entries, self.output_entries, self.duration
        )
    }
}

impl StructuredLog for ProcessorExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            processor_id = self.processor_id,
            input_entries = self.input_entries,
            output_entries = self.output_entries,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "processor_execution",
            span_name = name,
            processor_id = self.processor_id,
        )
    }
}

/// Processor execution failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProcessorExecutionFailed<'a> {
    pub processor_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessorExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processor '{}' failed: {}", self.processor_id, self.error)
    }
}

impl StructuredLog for ProcessorExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(processor_id = self.processor_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "processor_execution_failed",
            span_name = name,
            processor_id = self.processor_id,
            error = %self.error,
        )
    }
}
