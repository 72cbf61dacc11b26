// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::backends::local::LocalModel;
use crate::envelope::Envelope;
use crate::errors::JobError;

/// Returns its input unchanged.
pub struct EchoModel;

#[async_trait]
impl LocalModel for EchoModel {
    async fn infer(&self, input: Envelope) -> Result<Envelope, JobError> {
        Ok(input)
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}
