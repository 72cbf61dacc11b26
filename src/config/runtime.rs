// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::EnsembleConfig;
use crate::errors::ConfigurationError;
use crate::graph::GraphLoader;
use crate::processors::ProcessorRegistry;

/// Ensemble runtime builder - turns an [`EnsembleConfig`] into the graph loader and
/// processor registry a model load needs.
///
/// The registry starts from the built-in processors and gets every alias from the
/// config's `processors` table on top. It is frozen behind an `Arc` afterwards.
///
/// # Examples
/// ```
/// use ensemble_graph::config::{EnsembleConfig, RuntimeBuilder};
///
/// let config = EnsembleConfig::default();
/// let (loader, registry) = RuntimeBuilder::from_config(&config).unwrap();
///
/// assert!(registry.contains_output("sub_image"));
/// let graph = loader.parse_node(r#"{"name": "resnet"}"#).unwrap();
/// assert_eq!(graph.kind(), "model_ref");
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the graph loader and processor registry.
    ///
    /// # Arguments
    /// * `cfg` - Configuration with the loader policy and processor aliases
    ///
    /// # Returns
    /// A tuple of (GraphLoader, shared ProcessorRegistry)
    pub fn from_config(
        cfg: &EnsembleConfig,
    ) -> Result<(GraphLoader, Arc<ProcessorRegistry>), ConfigurationError> {
        let mut registry = ProcessorRegistry::with_builtins();

        let mut aliases: Vec<_> = cfg.processors.iter().collect();
        aliases.sort_by(|a, b| a.0.cmp(b.0));
        for (name, alias) in aliases {
            // aliases bind built-ins only, never each other
            if alias.builtin != *name && cfg.processors.contains_key(&alias.builtin) {
                return Err(ConfigurationError::InvalidConfig {
                    reason: format!(
                        "processor alias '{}' refers to another alias '{}'",
                        name, alias.builtin
                    ),
                });
            }
            registry.register_alias(name, alias)?;
        }
        let loader = GraphLoader::new(cfg.unknown_node_type);
        Ok((loader, Arc::new(registry)))
    }
}
