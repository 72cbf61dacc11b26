// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::models::*;
use crate::envelope::Envelope;
use crate::errors::JobError;
use crate::processors::TextCase;
use crate::traits::{JobSubmitter, ModelId};

/// A model that runs inside the process.
#[async_trait]
pub trait LocalModel: Send + Sync {
    async fn infer(&self, input: Envelope) -> Result<Envelope, JobError>;

    fn name(&self) -> &'static str;
}

/// In-process job submitter: looks the model up by name and version and runs the
/// job on its own tokio task.
///
/// A request without a version gets the unversioned registration; a request
/// with a version only matches that exact version.
#[derive(Default)]
pub struct LocalModelPool {
    models: HashMap<ModelId, Arc<dyn LocalModel>>,
}

impl LocalModelPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool with the built-in local models, all unversioned:
    /// - "echo" -> EchoModel
    /// - "reverse_text" -> ReverseTextModel
    /// - "token_counter" -> TokenCounterModel
    /// - "change_text_case_upper" -> ChangeTextCaseModel (uppercase)
    /// - "change_text_case_lower" -> ChangeTextCaseModel (lowercase)
    pub fn with_builtins() -> Self {
        let mut pool = Self::new();
        pool.register(ModelId::new("echo", None), Arc::new(EchoModel));
        pool.register(ModelId::new("reverse_text", None), Arc::new(ReverseTextModel));
        pool.register(ModelId::new("token_counter", None), Arc::new(TokenCounterModel));
        pool.register(
            ModelId::new("change_text_case_upper", None),
            Arc::new(ChangeTextCaseModel::new(TextCase::Upper)),
        );
        pool.register(
            ModelId::new("change_text_case_lower", None),
            Arc::new(ChangeTextCaseModel::new(TextCase::Lower)),
        );
        pool
    }

    pub fn register(&mut self, id: ModelId, model: Arc<dyn LocalModel>) {
        self.models.insert(id, model);
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.models.contains_key(id)
    }

    /// Registered model ids, sorted by their display form.
    pub fn model_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.models.keys().map(ModelId::to_string).collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl JobSubmitter for LocalModelPool {
    async fn submit(&self, model: &ModelId, input: Envelope) -> Result<Envelope, JobError> {
        let local = self
            .models
            .get(model)
            .cloned()
            .ok_or_else(|| JobError::ModelNotFound {
                name: model.name.clone(),
                version: model.version.clone(),
            })?;

        tokio::spawn(async move { local.infer(input).await })
            .await
            .map_err(|e| JobError::InferenceFailed {
                model: model.to_string(),
                reason: format!("job task did not complete: {}", e),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_registered_models() {
        let pool = LocalModelPool::with_builtins();
        let output = pool
            .submit(
                &ModelId::new("reverse_text", None),
                Envelope::new().with_entry("data", "hello"),
            )
            .await
            .unwrap();
        assert_eq!(output.data().and_then(|p| p.as_text()), Some("olleh"));
    }

    #[tokio::test]
    async fn unknown_model_or_version_is_not_found() {
        let pool = LocalModelPool::with_builtins();

        let err = pool
            .submit(&ModelId::new("resnet", None), Envelope::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            JobError::ModelNotFound {
                name: "resnet".to_string(),
                version: None
            }
        );

        let err = pool
            .submit(&ModelId::new("echo", Some("2".to_string())), Envelope::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::ModelNotFound { .. }));
    }

    #[test]
    fn lists_builtin_ids() {
        let pool = LocalModelPool::with_builtins();
        assert_eq!(
            pool.model_ids(),
            vec![
                "change_text_case_lower",
                "change_text_case_upper",
                "echo",
                "reverse_text",
                "token_counter"
            ]
        );
    }
}
