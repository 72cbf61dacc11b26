// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph description loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A graph description was loaded and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use ensemble_graph::observability::messages::graph::GraphLoaded;
///
/// let msg = GraphLoaded {
///     source: "models/detect/ensemble.json",
///     root_type: "sequence",
///     node_count: 4,
///     model_count: 3,
/// };
///
/// assert!(msg.to_string().contains("3 model references"));
/// ```
pub struct GraphLoaded<'a> {
    pub source: &'a str,
    pub root_type: &'a str,
    pub node_count: usize,
    pub model_count: usize,
}

impl Display for GraphLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded ensemble graph from {}: {} root, {} nodes, {} model references",
            self.source, self.root_type, self.node_count, self.model_count
        )
    }
}

impl StructuredLog for GraphLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            source = self.source,
            root_type = self.root_type,
            node_count = self.node_count,
            model_count = self.model_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_loaded",
            span_name = name,
            source = self.source,
            root_type = self.root_type,
        )
    }
}

/// Loading a graph description failed; model loading is aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct GraphLoadFailed<'a> {
    pub source: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for GraphLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load ensemble graph from {}: {}",
            self.source, self.error
        )
    }
}

impl StructuredLog for GraphLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(source = self.source, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "graph_load_failed",
            span_name = name,
            source = self.source,
            error = %self.error,
        )
    }
}

/// An unrecognized `type` discriminator was decoded as a model reference.
///
/// Usually a typo in the description (`"paralel"`), so it is worth a warning.
///
/// # Log Level
/// `warn!` - Potential issue
pub struct UnknownNodeTypeFallback<'a> {
    pub node_type: &'a str,
    pub path: &'a str,
}

impl Display for UnknownNodeTypeFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unknown node type '{}' at {}; treating it as a model reference",
            self.node_type, self.path
        )
    }
}

impl StructuredLog for UnknownNodeTypeFallback<'_> {
    fn log(&self) {
        tracing::warn!(node_type = self.node_type, path = self.path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unknown_node_type",
            span_name = name,
            node_type = self.node_type,
            path = self.path,
        )
    }
}
