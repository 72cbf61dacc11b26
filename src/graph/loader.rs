// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Builds a [`Node`] tree from a graph description.
//!
//! Every object in the description may carry a `type` discriminator:
//! `"sequence"` and `"parallel"` select those variants, anything else (or no
//! `type` at all) is a model reference. The description is decoded into plain
//! [`NodeDescription`] values first and validated while being turned into nodes,
//! so a bad description never yields a partial graph.

use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::config::consts::{PARALLEL_TYPE, SEQUENCE_TYPE};
use crate::config::UnknownNodeTypePolicy;
use crate::errors::ConfigurationError;
use crate::graph::{ModelRef, Node, Parallel, Sequence};
use crate::observability::messages::graph::{GraphLoadFailed, GraphLoaded, UnknownNodeTypeFallback};
use crate::observability::messages::StructuredLog;
use crate::traits::ModelId;

const ROOT_PATH: &str = "$";

/// Wire form of one node.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDescription {
    #[serde(rename = "type", default)]
    node_type: Option<String>,
    #[serde(default)]
    children: Option<Vec<NodeDescription>>,
    #[serde(default)]
    split_inputs: bool,
    #[serde(default)]
    merge_outputs: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    version: Option<String>,
    #[serde(default)]
    input_processor_class: Option<String>,
    #[serde(default)]
    output_processor_class: Option<String>,
}

/// Model versions are often written as bare numbers (`"version": 2`).
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<Version>::deserialize(deserializer)?.map(|version| match version {
            Version::Text(text) => text,
            Version::Number(number) => number.to_string(),
        }),
    )
}

/// Graph description loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphLoader {
    unknown_node_type: UnknownNodeTypePolicy,
}

impl GraphLoader {
    pub fn new(unknown_node_type: UnknownNodeTypePolicy) -> Self {
        Self { unknown_node_type }
    }

    pub fn unknown_node_type(&self) -> UnknownNodeTypePolicy {
        self.unknown_node_type
    }

    /// Parse one node with the plain discriminator rule.
    pub fn parse_node(&self, json: &str) -> Result<Node, ConfigurationError> {
        let description = decode(serde_json::from_str(json))?;
        self.build(description, ROOT_PATH)
    }

    /// Parse an ensemble root.
    ///
    /// Same rule as [`GraphLoader::parse_node`], except that a root without `type`
    /// that carries `children` is a sequence: the root of an ensemble is a pipeline.
    pub fn parse_ensemble(&self, json: &str) -> Result<Node, ConfigurationError> {
        let description = decode(serde_json::from_str(json))?;
        self.build_root(description)
    }

    /// [`GraphLoader::parse_ensemble`] over a reader.
    pub fn read_ensemble<R: Read>(&self, reader: R) -> Result<Node, ConfigurationError> {
        let description = decode(serde_json::from_reader(reader))?;
        self.build_root(description)
    }

    /// Load an ensemble root from a file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Node, ConfigurationError> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let result = File::open(path)
            .map_err(|source| ConfigurationError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|file| self.read_ensemble(BufReader::new(file)));

        match &result {
            Ok(graph) => GraphLoaded {
                source: &source,
                root_type: graph.kind(),
                node_count: graph.node_count(),
                model_count: graph.model_count(),
            }
            .log(),
            Err(error) => GraphLoadFailed {
                source: &source,
                error,
            }
            .log(),
        }
        result
    }

    /// Load `<model_dir>/<graph_file>`.
    pub fn load_model_dir<P: AsRef<Path>>(
        &self,
        model_dir: P,
        graph_file: &str,
    ) -> Result<Node, ConfigurationError> {
        self.load_file(model_dir.as_ref().join(graph_file))
    }

    fn build_root(&self, mut description: NodeDescription) -> Result<Node, ConfigurationError> {
        if description.node_type.is_none() && description.children.is_some() {
            description.node_type = Some(SEQUENCE_TYPE.to_string());
        }
        self.build(description, ROOT_PATH)
    }

    fn build(&self, mut description: NodeDescription, path: &str) -> Result<Node, ConfigurationError> {
        let node_type = description.node_type.take();
        match node_type.as_deref() {
            Some(SEQUENCE_TYPE) => {
                let children = self.build_children(description, "sequence", path)?;
                Ok(Sequence::new(children).into())
            }
            Some(PARALLEL_TYPE) => {
                let split_inputs = description.split_inputs;
                let merge_outputs = description.merge_outputs;
                let children = self.build_children(description, "parallel", path)?;
                Ok(Parallel::new(children, split_inputs, merge_outputs).into())
            }
            Some(other) => match self.unknown_node_type {
                UnknownNodeTypePolicy::Reject => Err(ConfigurationError::UnknownNodeType {
                    node_type: other.to_string(),
                    path: path.to_string(),
                }),
                UnknownNodeTypePolicy::Fallback => {
                    UnknownNodeTypeFallback {
                        node_type: other,
                        path,
                    }
                    .log();
                    build_model_ref(description, path)
                }
            },
            None => build_model_ref(description, path),
        }
    }

    fn build_children(
        &self,
        description: NodeDescription,
        node_type: &'static str,
        path: &str,
    ) -> Result<Vec<Node>, ConfigurationError> {
        let children = description.children.unwrap_or_default();
        if children.is_empty() {
            return Err(ConfigurationError::EmptyChildren {
                node_type,
                path: path.to_string(),
            });
        }

        children
            .into_iter()
            .enumerate()
            .map(|(i, child)| self.build(child, &format!("{}.children[{}]", path, i)))
            .collect()
    }
}

fn build_model_ref(description: NodeDescription, path: &str) -> Result<Node, ConfigurationError> {
    let name = match description.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return Err(ConfigurationError::MissingModelName {
                path: path.to_string(),
            })
        }
    };

    let mut model = ModelRef::new(ModelId::new(name, description.version));
    if let Some(input) = description.input_processor_class {
        model = model.with_input_processor(input);
    }
    if let Some(output) = description.output_processor_class {
        model = model.with_output_processor(output);
    }
    Ok(model.into())
}

fn decode(result: serde_json::Result<NodeDescription>) -> Result<NodeDescription, ConfigurationError> {
    result.map_err(|e| ConfigurationError::MalformedGraph {
        reason: e.to_string(),
    })
}
