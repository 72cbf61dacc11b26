// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::envelope::Envelope;
use crate::processors::ProcessorRegistry;
use crate::traits::JobSubmitter;

/// Per-request state shared by every node evaluated for one request.
///
/// Holds the job-submission collaborator, the processor registry and a map of
/// named envelope attachments (`"input"`, `"output"`, ...).
pub struct RequestContext {
    jobs: Arc<dyn JobSubmitter>,
    registry: Arc<ProcessorRegistry>,
    attachments: Mutex<HashMap<String, Envelope>>,
}

impl RequestContext {
    pub fn new(jobs: Arc<dyn JobSubmitter>, registry: Arc<ProcessorRegistry>) -> Self {
        Self {
            jobs,
            registry,
            attachments: Mutex::new(HashMap::new()),
        }
    }

    pub fn jobs(&self) -> &Arc<dyn JobSubmitter> {
        &self.jobs
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    pub fn set_attachment(&self, key: impl Into<String>, envelope: Envelope) {
        self.lock().insert(key.into(), envelope);
    }

    pub fn attachment(&self, key: &str) -> Option<Envelope> {
        self.lock().get(key).cloned()
    }

    pub fn take_attachment(&self, key: &str) -> Option<Envelope> {
        self.lock().remove(key)
    }

    /// A child context with the same collaborator and registry and a snapshot of
    /// the current attachments. Writes to the fork stay in the fork.
    pub fn fork(&self) -> RequestContext {
        Self {
            jobs: Arc::clone(&self.jobs),
            registry: Arc::clone(&self.registry),
            attachments: Mutex::new(self.lock().clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Envelope>> {
        // every write is a single insert or remove, so a poisoned map is still consistent
        self.attachments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        f.debug_struct("RequestContext")
            .field("registry", &self.registry)
            .field("attachments", &keys)
            .finish()
    }
}
