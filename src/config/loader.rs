// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::ENSEMBLE_FILE_NAME;
use crate::errors::ConfigurationError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Free-form options handed to a processor factory.
pub type ProcessorOptions = HashMap<String, serde_yaml::Value>;

/// Engine configuration.
///
/// Every field is optional; an empty file yields [`EnsembleConfig::default`].
///
/// # Fields
/// * `graph_file` - Graph description file name inside a model directory
/// * `unknown_node_type` - What the loader does with an unrecognized `type` value
/// * `processors` - Extra processor names bound to a built-in with options
///
/// # Example
/// ```yaml
/// graph_file: ensemble.json
/// unknown_node_type: reject
/// processors:
///   car_crops:
///     builtin: sub_image
///     options:
///       class_filter: car
/// ```
#[derive(Debug, Deserialize)]
pub struct EnsembleConfig {
    #[serde(default = "default_graph_file")]
    pub graph_file: String,
    #[serde(default)]
    pub unknown_node_type: UnknownNodeTypePolicy,
    #[serde(default)]
    pub processors: HashMap<String, ProcessorAlias>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            graph_file: default_graph_file(),
            unknown_node_type: UnknownNodeTypePolicy::default(),
            processors: HashMap::new(),
        }
    }
}

fn default_graph_file() -> String {
    ENSEMBLE_FILE_NAME.to_string()
}

/// Handling of a `type` discriminator that is neither `sequence` nor `parallel`.
///
/// # Variants
/// * `Fallback` - Decode the node as a model reference and log a warning
/// * `Reject` - Fail the graph load
#[derive(Debug, Default, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum UnknownNodeTypePolicy {
    #[default]
    Fallback,
    Reject,
}

/// A processor name bound to a built-in factory.
///
/// # Example
/// ```yaml
/// builtin: sub_image
/// options:
///   class_filter: dog
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorAlias {
    pub builtin: String,
    #[serde(default)]
    pub options: ProcessorOptions,
}

/// Load a config from a YAML or TOML file (chosen by extension, YAML otherwise).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EnsembleConfig, ConfigurationError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let cfg: EnsembleConfig = if is_toml {
        toml::from_str(&content).map_err(|e| ConfigurationError::InvalidConfig {
            reason: e.to_string(),
        })?
    } else if content.trim().is_empty() {
        EnsembleConfig::default()
    } else {
        serde_yaml::from_str(&content).map_err(|e| ConfigurationError::InvalidConfig {
            reason: e.to_string(),
        })?
    };

    cfg.validate()?;
    Ok(cfg)
}

impl EnsembleConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.graph_file.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfig {
                reason: "graph_file must not be empty".to_string(),
            });
        }
        for (name, alias) in &self.processors {
            if name.trim().is_empty() || alias.builtin.trim().is_empty() {
                return Err(ConfigurationError::InvalidConfig {
                    reason: format!(
                        "processor alias '{}' -> '{}' needs both a name and a builtin",
                        name, alias.builtin
                    ),
                });
            }
        }
        Ok(())
    }
}
