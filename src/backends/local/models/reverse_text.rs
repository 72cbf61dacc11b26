// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::map_text_entries;
use crate::backends::local::LocalModel;
use crate::envelope::Envelope;
use crate::errors::JobError;

/// Reverse Text model - reverses every text entry
pub struct ReverseTextModel;

#[async_trait]
impl LocalModel for ReverseTextModel {
    async fn infer(&self, input: Envelope) -> Result<Envelope, JobError> {
        map_text_entries(self.name(), input, |text| Ok(text.chars().rev().collect()))
    }

    fn name(&self) -> &'static str {
        "reverse_text"
    }
}
