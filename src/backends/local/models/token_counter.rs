// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Serialize;

use super::map_text_entries;
use crate::backends::local::LocalModel;
use crate::envelope::Envelope;
use crate::errors::JobError;

/// Token Counter model - counts characters, words and lines of every text entry
/// and answers with a JSON document per entry.
pub struct TokenCounterModel;

#[derive(Serialize)]
struct TokenCountResult {
    char_count: usize,
    word_count: usize,
    line_count: usize,
}

#[async_trait]
impl LocalModel for TokenCounterModel {
    async fn infer(&self, input: Envelope) -> Result<Envelope, JobError> {
        map_text_entries(self.name(), input, |text| {
            let result = TokenCountResult {
                char_count: text.chars().count(),
                word_count: text.split_whitespace().count(),
                line_count: text.lines().count().max(1), // At least 1 line even if empty
            };
            serde_json::to_string(&result).map_err(|e| JobError::InferenceFailed {
                model: self.name().to_string(),
                reason: format!("Failed to serialize result: {}", e),
            })
        })
    }

    fn name(&self) -> &'static str {
        "token_counter"
    }
}
