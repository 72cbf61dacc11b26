// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::envelope::{Envelope, Payload};
use crate::errors::JobError;
use crate::traits::{JobSubmitter, ModelId};

/// A recording job submitter for tests.
///
/// By default every model "runs" by wrapping each text entry in its name, so
/// `reverse` turns `"x"` into `"reverse(x)"`; other payloads pass through. Models
/// can be made to fail, panic, or answer with a fixed envelope.
pub struct StubJobSubmitter {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    responses: HashMap<String, Envelope>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(ModelId, Envelope)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubJobSubmitter {
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            panicking: HashSet::new(),
            responses: HashMap::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing_model(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// The job for `name` panics instead of answering.
    pub fn panicking_model(mut self, name: &str) -> Self {
        self.panicking.insert(name.to_string());
        self
    }

    pub fn with_response(mut self, name: &str, envelope: Envelope) -> Self {
        self.responses.insert(name.to_string(), envelope);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn calls(&self) -> Vec<(ModelId, Envelope)> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(model, _)| model.name == name)
            .count()
    }

    /// Highest number of jobs that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobSubmitter for StubJobSubmitter {
    async fn submit(&self, model: &ModelId, input: Envelope) -> Result<Envelope, JobError> {
        self.calls.lock().await.push((model.clone(), input.clone()));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(&model.name) {
            panic!("stub model '{}' panicked", model.name);
        }
        if self.failing.contains(&model.name) {
            return Err(JobError::InferenceFailed {
                model: model.name.clone(),
                reason: "stub failure".to_string(),
            });
        }
        if let Some(response) = self.responses.get(&model.name) {
            return Ok(response.clone());
        }

        let mut output = Envelope::new();
        output.set_properties(input.properties().clone());
        for (key, payload) in input.into_content() {
            let payload = match payload.as_text() {
                Some(text) => Payload::from(format!("{}({})", model.name, text)),
                None => payload,
            };
            output.add(key, payload);
        }
        Ok(output)
    }
}
