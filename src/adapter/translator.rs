// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::oneshot;
use tracing::Instrument;

use crate::config::consts::{ENSEMBLE_FILE_NAME, OUTPUT_ATTACHMENT};
use crate::config::{EnsembleConfig, RuntimeBuilder};
use crate::engine::RequestContext;
use crate::envelope::Envelope;
use crate::errors::{ConfigurationError, EnsembleError, Result};
use crate::graph::{GraphLoader, Node};
use crate::observability::messages::engine::{
    EvaluationCompleted, EvaluationFailed, EvaluationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::processors::ProcessorRegistry;
use crate::traits::JobSubmitter;

/// Builds translators for model directories that contain an ensemble graph.
#[derive(Debug)]
pub struct EnsembleTranslatorFactory {
    loader: GraphLoader,
    registry: Arc<ProcessorRegistry>,
    graph_file: String,
}

impl EnsembleTranslatorFactory {
    pub fn new(loader: GraphLoader, registry: Arc<ProcessorRegistry>) -> Self {
        Self {
            loader,
            registry,
            graph_file: ENSEMBLE_FILE_NAME.to_string(),
        }
    }

    /// A factory with the loader policy, processor aliases and graph file name of `cfg`.
    pub fn from_config(cfg: &EnsembleConfig) -> std::result::Result<Self, ConfigurationError> {
        let (loader, registry) = RuntimeBuilder::from_config(cfg)?;
        Ok(Self {
            loader,
            registry,
            graph_file: cfg.graph_file.clone(),
        })
    }

    /// Load the graph under `model_dir`. Evaluations of the resulting translator
    /// run on `runtime`.
    pub fn new_instance<P: AsRef<Path>>(
        &self,
        model_dir: P,
        runtime: Handle,
    ) -> std::result::Result<EnsembleTranslator, ConfigurationError> {
        let root = self.loader.load_model_dir(model_dir, &self.graph_file)?;
        Ok(EnsembleTranslator {
            root: Arc::new(root),
            registry: Arc::clone(&self.registry),
            runtime,
        })
    }
}

/// Drives one ensemble graph for a synchronous host.
///
/// `process_input` blocks on the evaluation. Call it from a plain thread or from
/// a multi-threaded runtime (worker or `spawn_blocking` thread).
#[derive(Debug, Clone)]
pub struct EnsembleTranslator {
    root: Arc<Node>,
    registry: Arc<ProcessorRegistry>,
    runtime: Handle,
}

impl EnsembleTranslator {
    pub fn new(root: Node, registry: Arc<ProcessorRegistry>, runtime: Handle) -> Self {
        Self {
            root: Arc::new(root),
            registry,
            runtime,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// A fresh per-request context bound to this translator's processor registry.
    pub fn new_context(&self, jobs: Arc<dyn JobSubmitter>) -> Arc<RequestContext> {
        Arc::new(RequestContext::new(jobs, Arc::clone(&self.registry)))
    }

    /// Evaluate the graph for `input` and attach the result to `ctx` as `"output"`.
    ///
    /// Any output of an earlier call on `ctx` is cleared first. Called from inside a
    /// current-thread runtime this fails with `Interrupted`, since waiting there would
    /// stall the runtime the evaluation may need.
    pub fn process_input(&self, ctx: &Arc<RequestContext>, input: Envelope) -> Result<()> {
        ctx.take_attachment(OUTPUT_ATTACHMENT);
        let wait = WaitStrategy::for_current_thread()?;

        let root_type = self.root.kind();
        let started = EvaluationStarted {
            root_type,
            entry_count: input.len(),
        };
        started.log();
        let span = started.span("process_input");

        let start_time = Instant::now();
        let (sender, receiver) = oneshot::channel();
        let root = Arc::clone(&self.root);
        let task_ctx = Arc::clone(ctx);
        self.runtime.spawn(
            async move {
                let result = root.predict(&task_ctx, input).await;
                // the receiver only goes away if the caller stopped waiting
                let _ = sender.send(result);
            }
            .instrument(span),
        );

        let result = wait
            .recv(receiver)
            .map_err(|_| EnsembleError::Interrupted {
                reason: "evaluation ended without producing a result".to_string(),
            })
            .and_then(|result| result);

        match result {
            Ok(output) => {
                EvaluationCompleted {
                    root_type,
                    output_entries: output.len(),
                    duration: start_time.elapsed(),
                }
                .log();
                ctx.set_attachment(OUTPUT_ATTACHMENT, output);
                Ok(())
            }
            Err(error) => {
                EvaluationFailed {
                    root_type,
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }

    /// The envelope stored by the last successful `process_input` on `ctx`. The
    /// attachment stays in place, so repeated calls see the same result.
    pub fn process_output(&self, ctx: &RequestContext) -> Result<Envelope> {
        ctx.attachment(OUTPUT_ATTACHMENT)
            .ok_or_else(|| EnsembleError::Interrupted {
                reason: "no output attached".to_string(),
            })
    }
}

/// How the calling thread may wait for the evaluation result.
enum WaitStrategy {
    /// Not on a runtime thread; block directly.
    Block,
    /// On a multi-threaded runtime; hand the worker's tasks off while blocking.
    BlockInPlace,
}

impl WaitStrategy {
    fn for_current_thread() -> Result<Self> {
        match Handle::try_current() {
            Err(_) => Ok(WaitStrategy::Block),
            Ok(handle) => match handle.runtime_flavor() {
                RuntimeFlavor::CurrentThread => Err(EnsembleError::Interrupted {
                    reason: "cannot wait for the evaluation on a current-thread runtime; \
                             call process_input from a plain thread"
                        .to_string(),
                }),
                _ => Ok(WaitStrategy::BlockInPlace),
            },
        }
    }

    fn recv<T>(&self, receiver: oneshot::Receiver<T>) -> std::result::Result<T, oneshot::error::RecvError> {
        match self {
            WaitStrategy::Block => receiver.blocking_recv(),
            WaitStrategy::BlockInPlace => tokio::task::block_in_place(|| receiver.blocking_recv()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::LocalModelPool;
    use crate::backends::stub::StubJobSubmitter;
    use crate::errors::JobError;
    use std::fs;
    use tempfile::tempdir;

    fn write_graph(dir: &Path, json: &str) {
        fs::write(dir.join(ENSEMBLE_FILE_NAME), json).unwrap();
    }

    #[test]
    fn translator_runs_the_graph_and_hands_back_the_output() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempdir().unwrap();
        write_graph(
            dir.path(),
            r#"{"type": "sequence", "children": [{"name": "a"}, {"name": "b"}]}"#,
        );

        let factory = EnsembleTranslatorFactory::from_config(&EnsembleConfig::default()).unwrap();
        let translator = factory.new_instance(dir.path(), runtime.handle().clone()).unwrap();
        assert_eq!(translator.root().kind(), "sequence");

        let ctx = translator.new_context(Arc::new(StubJobSubmitter::new()));
        translator
            .process_input(&ctx, Envelope::new().with_entry("data", "x"))
            .unwrap();
        let output = translator.process_output(&ctx).unwrap();

        assert_eq!(output.data().and_then(|p| p.as_text()), Some("b(a(x))"));
        // reading the output again gives the same envelope
        assert_eq!(translator.process_output(&ctx).unwrap(), output);
    }

    fn translator_for(graph: &str, runtime: Handle) -> EnsembleTranslator {
        EnsembleTranslator::new(
            GraphLoader::default().parse_ensemble(graph).unwrap(),
            Arc::new(ProcessorRegistry::with_builtins()),
            runtime,
        )
    }

    #[test]
    fn panicking_evaluation_is_interrupted() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let translator = translator_for(r#"{"name": "boom"}"#, runtime.handle().clone());
        let ctx = translator.new_context(Arc::new(StubJobSubmitter::new().panicking_model("boom")));

        let err = translator
            .process_input(&ctx, Envelope::new().with_entry("data", "x"))
            .unwrap_err();

        assert!(matches!(err, EnsembleError::Interrupted { .. }));
        assert!(translator.process_output(&ctx).is_err());
    }

    #[test]
    fn failed_input_clears_an_earlier_output() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let translator = translator_for(r#"{"name": "m"}"#, runtime.handle().clone());
        let ctx = translator.new_context(Arc::new(StubJobSubmitter::new()));

        translator
            .process_input(&ctx, Envelope::new().with_entry("data", "x"))
            .unwrap();
        assert!(translator.process_output(&ctx).is_ok());

        let failing = translator_for(r#"{"name": "boom"}"#, runtime.handle().clone());
        let failing_ctx = failing.new_context(Arc::new(StubJobSubmitter::new().failing_model("boom")));
        failing_ctx.set_attachment(OUTPUT_ATTACHMENT, Envelope::new().with_entry("data", "stale"));
        assert!(failing
            .process_input(&failing_ctx, Envelope::new().with_entry("data", "x"))
            .is_err());
        assert!(failing.process_output(&failing_ctx).is_err());
    }

    #[tokio::test]
    async fn waiting_on_a_current_thread_runtime_is_an_error() {
        let translator = translator_for(r#"{"name": "m"}"#, Handle::current());
        let jobs = Arc::new(StubJobSubmitter::new());
        let ctx = translator.new_context(jobs.clone());

        let err = translator
            .process_input(&ctx, Envelope::new().with_entry("data", "x"))
            .unwrap_err();

        assert!(matches!(err, EnsembleError::Interrupted { .. }));
        assert!(jobs.calls().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn waiting_on_a_multi_thread_worker_succeeds() {
        let translator = translator_for(r#"{"name": "m"}"#, Handle::current());
        let ctx = translator.new_context(Arc::new(StubJobSubmitter::new()));

        // runs on a runtime worker thread
        let output = tokio::spawn(async move {
            translator.process_input(&ctx, Envelope::new().with_entry("data", "x"))?;
            translator.process_output(&ctx)
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(output.data().and_then(|p| p.as_text()), Some("m(x)"));
    }

    #[test]
    fn evaluation_failure_is_returned_and_nothing_is_attached() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let graph = GraphLoader::default().parse_ensemble(r#"{"name": "resnet18"}"#).unwrap();
        let translator = EnsembleTranslator::new(
            graph,
            Arc::new(ProcessorRegistry::with_builtins()),
            runtime.handle().clone(),
        );

        let ctx = translator.new_context(Arc::new(LocalModelPool::with_builtins()));
        let err = translator
            .process_input(&ctx, Envelope::new().with_entry("data", "x"))
            .unwrap_err();

        assert!(matches!(
            err,
            EnsembleError::Job(JobError::ModelNotFound { .. })
        ));
        assert!(matches!(
            translator.process_output(&ctx),
            Err(EnsembleError::Interrupted { .. })
        ));
    }

    #[test]
    fn output_without_input_is_interrupted() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let translator = EnsembleTranslator::new(
            GraphLoader::default().parse_node(r#"{"name": "echo"}"#).unwrap(),
            Arc::new(ProcessorRegistry::new()),
            runtime.handle().clone(),
        );
        let ctx = translator.new_context(Arc::new(StubJobSubmitter::new()));

        let err = translator.process_output(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "interrupted while waiting for result: no output attached");
    }

    #[test]
    fn missing_graph_file_is_a_load_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempdir().unwrap();
        let factory = EnsembleTranslatorFactory::from_config(&EnsembleConfig::default()).unwrap();

        let err = factory
            .new_instance(dir.path(), runtime.handle().clone())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Io { .. }));
    }

    #[test]
    fn empty_children_is_a_load_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempdir().unwrap();
        write_graph(dir.path(), r#"{"type": "parallel", "children": []}"#);
        let factory = EnsembleTranslatorFactory::new(
            GraphLoader::default(),
            Arc::new(ProcessorRegistry::with_builtins()),
        );

        let err = factory
            .new_instance(dir.path(), runtime.handle().clone())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyChildren { .. }));
    }
}
