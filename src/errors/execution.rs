// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Request-time errors.

use thiserror::Error;

use super::ConfigurationError;

/// Errors reported by the job-submission collaborator.
///
/// The engine never inspects or retries these; they travel up the graph unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    #[error("model '{name}' (version {}) not found", version.as_deref().unwrap_or("latest"))]
    ModelNotFound {
        name: String,
        version: Option<String>,
    },

    #[error("inference failed for model '{model}': {reason}")]
    InferenceFailed { model: String, reason: String },
}

/// Top-level error for evaluating an ensemble graph.
#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Collaborator failure, propagated verbatim.
    #[error(transparent)]
    Job(#[from] JobError),

    /// A processor transform returned an error.
    #[error("processor '{processor}' failed: {reason}")]
    ProcessorFailed { processor: String, reason: String },

    /// A payload could not be read as the structure a stage expected.
    #[error("payload decode failed: {reason}")]
    PayloadDecode { reason: String },

    /// The wait on an asynchronous result was interrupted.
    #[error("interrupted while waiting for result: {reason}")]
    Interrupted { reason: String },
}

impl EnsembleError {
    /// True for errors that come from graph or processor configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, EnsembleError::Configuration(_))
    }
}
