// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration errors: anything wrong with the graph description, the ensemble
//! config file, or the processors a graph asks for.
//!
//! These are fatal to the request (or to model load when detected at load time)
//! and are never retried.

use std::path::PathBuf;
use thiserror::Error;

use crate::traits::Capability;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The graph description could not be parsed at all.
    #[error("malformed graph description: {reason}")]
    MalformedGraph { reason: String },

    /// A graph or config file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `sequence` or `parallel` node without children.
    #[error("{node_type} node at '{path}' has no children")]
    EmptyChildren { node_type: &'static str, path: String },

    /// A model reference without a model name.
    #[error("model reference at '{path}' is missing a model name")]
    MissingModelName { path: String },

    /// A `type` discriminator that is neither `sequence` nor `parallel`, rejected
    /// because the loader runs with the strict policy.
    #[error("unknown node type '{node_type}' at '{path}'")]
    UnknownNodeType { node_type: String, path: String },

    /// Split input entry count matches neither the child count nor a single child.
    #[error("split output size mismatch: {entries} input entries for {children} children")]
    SplitCountMismatch { entries: usize, children: usize },

    /// No factory is registered under the requested processor name.
    #[error("unknown {capability} processor '{name}'")]
    UnknownProcessor { name: String, capability: Capability },

    /// A factory was found but refused to build the processor.
    #[error("failed to create {capability} processor '{name}': {reason}")]
    ProcessorCreationFailed {
        name: String,
        capability: Capability,
        reason: String,
    },

    /// The ensemble config file is invalid.
    #[error("invalid ensemble config: {reason}")]
    InvalidConfig { reason: String },
}
