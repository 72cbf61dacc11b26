// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;

use crate::envelope::Envelope;
use crate::errors::JobError;

/// Identifies one registered model: a name plus an optional version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub name: String,
    pub version: Option<String>,
}

impl ModelId {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The worker pool that actually runs a single model.
///
/// The engine calls `submit` at every model reference and awaits the returned
/// future; how the job is scheduled is entirely up to the implementation.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    async fn submit(&self, model: &ModelId, input: Envelope) -> Result<Envelope, JobError>;
}
