// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::traits::{InputProcessor, ModelId, OutputProcessor};

/// One node of an ensemble graph.
///
/// The tree is built once per model load and is read-only afterwards; the only
/// interior mutability is the processor cell of each [`ModelRef`]. Evaluation
/// lives in [`crate::engine`].
#[derive(Debug)]
pub enum Node {
    Sequence(Sequence),
    Parallel(Parallel),
    ModelRef(ModelRef),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Sequence(_) => "sequence",
            Node::Parallel(_) => "parallel",
            Node::ModelRef(_) => "model_ref",
        }
    }

    pub fn children(&self) -> &[Arc<Node>] {
        match self {
            Node::Sequence(seq) => &seq.children,
            Node::Parallel(par) => &par.children,
            Node::ModelRef(_) => &[],
        }
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Number of model references in this subtree.
    pub fn model_count(&self) -> usize {
        match self {
            Node::ModelRef(_) => 1,
            _ => self.children().iter().map(|child| child.model_count()).sum(),
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_parallel(&self) -> Option<&Parallel> {
        match self {
            Node::Parallel(par) => Some(par),
            _ => None,
        }
    }

    pub fn as_model_ref(&self) -> Option<&ModelRef> {
        match self {
            Node::ModelRef(model) => Some(model),
            _ => None,
        }
    }
}

impl From<Sequence> for Node {
    fn from(seq: Sequence) -> Self {
        Node::Sequence(seq)
    }
}

impl From<Parallel> for Node {
    fn from(par: Parallel) -> Self {
        Node::Parallel(par)
    }
}

impl From<ModelRef> for Node {
    fn from(model: ModelRef) -> Self {
        Node::ModelRef(model)
    }
}

/// Children evaluated one after the other, each feeding the next.
#[derive(Debug)]
pub struct Sequence {
    pub(crate) children: Vec<Arc<Node>>,
}

impl Sequence {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children: children.into_iter().map(Arc::new).collect(),
        }
    }
}

/// Children evaluated concurrently and combined into one envelope.
#[derive(Debug)]
pub struct Parallel {
    pub(crate) children: Vec<Arc<Node>>,
    pub(crate) split_inputs: bool,
    pub(crate) merge_outputs: bool,
}

impl Parallel {
    pub fn new(children: Vec<Node>, split_inputs: bool, merge_outputs: bool) -> Self {
        Self {
            children: children.into_iter().map(Arc::new).collect(),
            split_inputs,
            merge_outputs,
        }
    }

    pub fn split_inputs(&self) -> bool {
        self.split_inputs
    }

    pub fn merge_outputs(&self) -> bool {
        self.merge_outputs
    }
}

/// Processors a model reference resolved on first use.
pub(crate) struct ResolvedProcessors {
    pub(crate) input: Option<Arc<dyn InputProcessor>>,
    pub(crate) output: Option<Arc<dyn OutputProcessor>>,
}

/// Leaf that invokes one registered model.
pub struct ModelRef {
    pub(crate) model: ModelId,
    pub(crate) input_processor: Option<String>,
    pub(crate) output_processor: Option<String>,
    pub(crate) processors: OnceCell<ResolvedProcessors>,
}

impl ModelRef {
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            input_processor: None,
            output_processor: None,
            processors: OnceCell::new(),
        }
    }

    pub fn with_input_processor(mut self, name: impl Into<String>) -> Self {
        self.input_processor = Some(name.into());
        self
    }

    pub fn with_output_processor(mut self, name: impl Into<String>) -> Self {
        self.output_processor = Some(name.into());
        self
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn input_processor(&self) -> Option<&str> {
        self.input_processor.as_deref()
    }

    pub fn output_processor(&self) -> Option<&str> {
        self.output_processor.as_deref()
    }

    /// Whether the processors have been resolved yet.
    pub fn is_resolved(&self) -> bool {
        self.processors.initialized()
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRef")
            .field("model", &self.model)
            .field("input_processor", &self.input_processor)
            .field("output_processor", &self.output_processor)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str) -> Node {
        ModelRef::new(ModelId::new(name, None)).into()
    }

    #[test]
    fn counts_nodes_and_models() {
        let graph: Node = Sequence::new(vec![
            model("detect"),
            Parallel::new(vec![model("a"), model("b")], true, false).into(),
        ])
        .into();

        assert_eq!(graph.kind(), "sequence");
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.model_count(), 3);
        assert_eq!(graph.children()[1].kind(), "parallel");
        assert!(graph.children()[1].as_parallel().unwrap().split_inputs());
    }

    #[test]
    fn model_ref_starts_unresolved() {
        let node = ModelRef::new(ModelId::new("resnet", Some("1".to_string())))
            .with_output_processor("sub_image");
        assert!(!node.is_resolved());
        assert_eq!(node.output_processor(), Some("sub_image"));
        assert_eq!(node.input_processor(), None);
        assert!(format!("{:?}", node).contains("resolved: false"));
    }
}
