// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;

use crate::engine::RequestContext;
use crate::envelope::Envelope;
use crate::errors::Result;

/// Which side of a model invocation a processor plugs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Input,
    Output,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Input => write!(f, "input"),
            Capability::Output => write!(f, "output"),
        }
    }
}

/// Transforms the envelope before it is dispatched to the model.
#[async_trait]
pub trait InputProcessor: Send + Sync {
    async fn process_input(&self, ctx: &RequestContext, input: Envelope) -> Result<Envelope>;

    fn name(&self) -> &'static str;
}

/// Transforms the model's result. The context still holds the original input
/// under the `"input"` attachment.
#[async_trait]
pub trait OutputProcessor: Send + Sync {
    async fn process_output(&self, ctx: &RequestContext, output: Envelope) -> Result<Envelope>;

    fn name(&self) -> &'static str;
}
