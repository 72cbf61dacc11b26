// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::map_text_entries;
use crate::backends::local::LocalModel;
use crate::envelope::Envelope;
use crate::errors::JobError;
use crate::processors::TextCase;

/// Change Text Case model - converts every text entry to one case
pub struct ChangeTextCaseModel {
    case: TextCase,
}

impl ChangeTextCaseModel {
    pub fn new(case: TextCase) -> Self {
        Self { case }
    }
}

#[async_trait]
impl LocalModel for ChangeTextCaseModel {
    async fn infer(&self, input: Envelope) -> Result<Envelope, JobError> {
        map_text_entries(self.name(), input, |text| Ok(self.case.apply(text)))
    }

    fn name(&self) -> &'static str {
        "change_text_case"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn converts_case() {
        let model = ChangeTextCaseModel::new(TextCase::Upper);
        let output = model
            .infer(Envelope::new().with_entry("data", "hello"))
            .await
            .unwrap();
        assert_eq!(output.data().and_then(|p| p.as_text()), Some("HELLO"));
    }
}
