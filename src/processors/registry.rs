// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::consts::{SUB_IMAGE_CLASS_NAME, SUB_IMAGE_PROCESSOR};
use crate::config::{ProcessorAlias, ProcessorOptions};
use crate::errors::ConfigurationError;
use crate::observability::messages::processor::{ProcessorResolutionFailed, ProcessorResolved};
use crate::observability::messages::StructuredLog;
use crate::processors::{ChangeTextCaseProcessor, SubImageExtractor, TextCase};
use crate::traits::{Capability, InputProcessor, OutputProcessor};

type InputFactory =
    Arc<dyn Fn(&ProcessorOptions) -> Result<Arc<dyn InputProcessor>, String> + Send + Sync>;
type OutputFactory =
    Arc<dyn Fn(&ProcessorOptions) -> Result<Arc<dyn OutputProcessor>, String> + Send + Sync>;

#[derive(Clone)]
struct Registration<F> {
    factory: F,
    options: ProcessorOptions,
}

/// Maps processor names to factories, one table per capability.
///
/// Populated at start-up ([`ProcessorRegistry::with_builtins`] plus config
/// aliases) and shared read-only afterwards. Resolving a name builds a fresh
/// instance; memoization is the job of the model reference that owns it.
#[derive(Default)]
pub struct ProcessorRegistry {
    inputs: HashMap<String, Registration<InputFactory>>,
    outputs: HashMap<String, Registration<OutputFactory>>,
}

impl ProcessorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the processors that ship with the crate:
    /// - "sub_image", "ai.djl.serving.ensemble.SubImage" -> SubImageExtractor (output)
    /// - "change_text_case_upper" -> ChangeTextCaseProcessor (input)
    /// - "change_text_case_lower" -> ChangeTextCaseProcessor (input)
    /// - "change_text_case_proper" -> ChangeTextCaseProcessor (input)
    /// - "change_text_case_title" -> ChangeTextCaseProcessor (input)
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        for name in [SUB_IMAGE_PROCESSOR, SUB_IMAGE_CLASS_NAME] {
            registry.register_output(name, |options| {
                let extractor = SubImageExtractor::from_options(options)?;
                Ok(Arc::new(extractor) as Arc<dyn OutputProcessor>)
            });
        }

        for (name, case) in [
            ("change_text_case_upper", TextCase::Upper),
            ("change_text_case_lower", TextCase::Lower),
            ("change_text_case_proper", TextCase::Proper),
            ("change_text_case_title", TextCase::Title),
        ] {
            registry.register_input(name, move |_| {
                Ok(Arc::new(ChangeTextCaseProcessor::new(case)) as Arc<dyn InputProcessor>)
            });
        }

        registry
    }

    pub fn register_input<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ProcessorOptions) -> Result<Arc<dyn InputProcessor>, String> + Send + Sync + 'static,
    {
        let factory: InputFactory = Arc::new(factory);
        self.inputs.insert(
            name.into(),
            Registration {
                factory,
                options: ProcessorOptions::new(),
            },
        );
    }

    pub fn register_output<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ProcessorOptions) -> Result<Arc<dyn OutputProcessor>, String> + Send + Sync + 'static,
    {
        let factory: OutputFactory = Arc::new(factory);
        self.outputs.insert(
            name.into(),
            Registration {
                factory,
                options: ProcessorOptions::new(),
            },
        );
    }

    /// Bind `name` to an already registered processor, with the alias's options.
    ///
    /// The alias lands in every capability table the target appears in.
    pub fn register_alias(
        &mut self,
        name: &str,
        alias: &ProcessorAlias,
    ) -> Result<(), ConfigurationError> {
        let input = self.inputs.get(&alias.builtin).map(|r| Registration {
            factory: Arc::clone(&r.factory),
            options: alias.options.clone(),
        });
        let output = self.outputs.get(&alias.builtin).map(|r| Registration {
            factory: Arc::clone(&r.factory),
            options: alias.options.clone(),
        });

        if input.is_none() && output.is_none() {
            return Err(ConfigurationError::InvalidConfig {
                reason: format!(
                    "processor alias '{}' refers to unknown processor '{}'",
                    name, alias.builtin
                ),
            });
        }
        if let Some(registration) = input {
            self.inputs.insert(name.to_string(), registration);
        }
        if let Some(registration) = output {
            self.outputs.insert(name.to_string(), registration);
        }
        Ok(())
    }

    pub fn resolve_input(&self, name: &str) -> Result<Arc<dyn InputProcessor>, ConfigurationError> {
        let result = match self.inputs.get(name) {
            Some(registration) => (registration.factory)(&registration.options)
                .map_err(|reason| creation_failed(name, Capability::Input, reason)),
            None => Err(unknown(name, Capability::Input)),
        };
        log_resolution(name, Capability::Input, &result);
        result
    }

    pub fn resolve_output(&self, name: &str) -> Result<Arc<dyn OutputProcessor>, ConfigurationError> {
        let result = match self.outputs.get(name) {
            Some(registration) => (registration.factory)(&registration.options)
                .map_err(|reason| creation_failed(name, Capability::Output, reason)),
            None => Err(unknown(name, Capability::Output)),
        };
        log_resolution(name, Capability::Output, &result);
        result
    }

    pub fn contains_input(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    pub fn contains_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    /// Registered names for a capability, sorted.
    pub fn names(&self, capability: Capability) -> Vec<&str> {
        let mut names: Vec<&str> = match capability {
            Capability::Input => self.inputs.keys().map(String::as_str).collect(),
            Capability::Output => self.outputs.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }
}

fn unknown(name: &str, capability: Capability) -> ConfigurationError {
    ConfigurationError::UnknownProcessor {
        name: name.to_string(),
        capability,
    }
}

fn creation_failed(name: &str, capability: Capability, reason: String) -> ConfigurationError {
    ConfigurationError::ProcessorCreationFailed {
        name: name.to_string(),
        capability,
        reason,
    }
}

fn log_resolution<T>(name: &str, capability: Capability, result: &Result<T, ConfigurationError>) {
    match result {
        Ok(_) => ProcessorResolved {
            name,
            capability: &capability.to_string(),
        }
        .log(),
        Err(error) => ProcessorResolutionFailed { name, error }.log(),
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("inputs", &self.names(Capability::Input))
            .field("outputs", &self.names(Capability::Output))
            .finish()
    }
}
