// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! `predict` for every node variant.
//!
//! Evaluation is fully asynchronous. A sequence awaits each child before starting
//! the next; a parallel node spawns one tokio task per branch before awaiting any
//! of them; a model reference hands its envelope to the job-submission
//! collaborator. Nothing here blocks a thread.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::consts::{DATA_KEY, INPUT_ATTACHMENT};
use crate::engine::RequestContext;
use crate::envelope::{Envelope, TensorList};
use crate::errors::{ConfigurationError, EnsembleError, Result};
use crate::graph::node::ResolvedProcessors;
use crate::graph::{ModelRef, Node, Parallel, Sequence};
use crate::observability::messages::engine::{
    BranchFailed, JobFailed, JobSubmitted, ParallelFanIn, ParallelFanOut,
};
use crate::observability::messages::StructuredLog;

/// Boxed future returned by [`Node::predict`]; boxing is what lets the
/// evaluation recurse through the tree.
pub type PredictFuture<'a> = Pin<Box<dyn Future<Output = Result<Envelope>> + Send + 'a>>;

impl Node {
    /// Evaluate this node for one request.
    pub fn predict<'a>(&'a self, ctx: &'a Arc<RequestContext>, input: Envelope) -> PredictFuture<'a> {
        match self {
            Node::Sequence(seq) => Box::pin(seq.predict(ctx, input)),
            Node::Parallel(par) => Box::pin(par.predict(ctx, input)),
            Node::ModelRef(model) => Box::pin(model.predict(ctx, input)),
        }
    }
}

impl Sequence {
    /// Child *i*'s result is child *i+1*'s input; the last result is returned.
    pub async fn predict(&self, ctx: &Arc<RequestContext>, input: Envelope) -> Result<Envelope> {
        if self.children.is_empty() {
            return Err(ConfigurationError::EmptyChildren {
                node_type: "sequence",
                path: "<evaluation>".to_string(),
            }
            .into());
        }

        let mut current = input;
        for child in &self.children {
            current = child.predict(ctx, current).await?;
        }
        Ok(current)
    }
}

impl Parallel {
    pub async fn predict(&self, ctx: &Arc<RequestContext>, input: Envelope) -> Result<Envelope> {
        let start_time = Instant::now();
        let assignments = self.fan_out(input)?;
        let branch_count = assignments.len();

        ParallelFanOut {
            branch_count,
            child_count: self.children.len(),
            split_inputs: self.split_inputs,
        }
        .log();

        let handles: Vec<_> = assignments
            .into_iter()
            .map(|(child, branch_input)| {
                let ctx = Arc::clone(ctx);
                tokio::spawn(async move { child.predict(&ctx, branch_input).await })
            })
            .collect();

        // Every branch settles before the outcome is decided; nothing is cancelled.
        let mut outcomes = Vec::with_capacity(branch_count);
        for (branch, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(EnsembleError::Interrupted {
                    reason: format!("parallel branch {} did not complete: {}", branch, join_error),
                }),
            };
            if let Err(error) = &outcome {
                BranchFailed { branch, error }.log();
            }
            outcomes.push(outcome);
        }

        // first failure in branch order wins
        let results = outcomes.into_iter().collect::<Result<Vec<_>>>()?;
        let output = self.fan_in(results)?;

        ParallelFanIn {
            branch_count,
            merge_outputs: self.merge_outputs,
            output_entries: output.len(),
            duration: start_time.elapsed(),
        }
        .log();
        Ok(output)
    }

    /// Pair every branch invocation with the child that runs it.
    fn fan_out(&self, input: Envelope) -> Result<Vec<(Arc<Node>, Envelope)>> {
        let child_count = self.children.len();
        if child_count == 0 {
            return Err(ConfigurationError::EmptyChildren {
                node_type: "parallel",
                path: "<evaluation>".to_string(),
            }
            .into());
        }

        if !self.split_inputs {
            return Ok(self
                .children
                .iter()
                .map(|child| (Arc::clone(child), input.clone()))
                .collect());
        }

        let parts = input.split();
        if parts.len() == child_count {
            Ok(self.children.iter().cloned().zip(parts).collect())
        } else if child_count == 1 {
            let only = &self.children[0];
            Ok(parts.into_iter().map(|part| (Arc::clone(only), part)).collect())
        } else {
            Err(ConfigurationError::SplitCountMismatch {
                entries: parts.len(),
                children: child_count,
            }
            .into())
        }
    }

    /// Combine branch results, in branch order, into a fresh `200 OK` envelope.
    fn fan_in(&self, results: Vec<Envelope>) -> Result<Envelope> {
        let mut output = Envelope::new();
        if self.merge_outputs {
            let mut merged = TensorList::new();
            for result in &results {
                merged.extend(result.data_as_tensor_list()?);
            }
            output.add(DATA_KEY, merged);
        } else {
            for result in results {
                for (key, payload) in result.into_content() {
                    output.add(key, payload);
                }
            }
        }
        Ok(output)
    }
}

impl ModelRef {
    /// `output_processor(ctx, job(input_processor(input)))`; a missing processor
    /// is the identity for its stage.
    pub async fn predict(&self, ctx: &Arc<RequestContext>, input: Envelope) -> Result<Envelope> {
        // scoped to this invocation so sibling branches keep their own "input"
        let ctx = ctx.fork();
        ctx.set_attachment(INPUT_ATTACHMENT, input.clone());

        let processors = self.resolve_processors(&ctx).await?;

        let dispatched = match &processors.input {
            Some(processor) => processor.process_input(&ctx, input).await?,
            None => input,
        };

        let model = self.model.to_string();
        let submitted = JobSubmitted {
            model: &model,
            entry_count: dispatched.len(),
        };
        submitted.log();
        let span = submitted.span("model_ref");

        let output = match ctx.jobs().submit(&self.model, dispatched).instrument(span).await {
            Ok(output) => output,
            Err(error) => {
                JobFailed {
                    model: &model,
                    error: &error,
                }
                .log();
                return Err(error.into());
            }
        };

        match &processors.output {
            Some(processor) => processor.process_output(&ctx, output).await,
            None => Ok(output),
        }
    }

    /// Resolve the configured processors once per node. Concurrent first calls
    /// wait for a single resolution; a failed resolution leaves the cell empty.
    async fn resolve_processors(&self, ctx: &RequestContext) -> Result<&ResolvedProcessors> {
        let resolved = self
            .processors
            .get_or_try_init(|| async {
                let registry = ctx.registry();
                let input = self
                    .input_processor
                    .as_deref()
                    .map(|name| registry.resolve_input(name))
                    .transpose()?;
                let output = self
                    .output_processor
                    .as_deref()
                    .map(|name| registry.resolve_output(name))
                    .transpose()?;
                Ok::<_, ConfigurationError>(ResolvedProcessors { input, output })
            })
            .await?;
        Ok(resolved)
    }
}
