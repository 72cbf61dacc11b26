// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;

pub use config::ConfigurationError;
pub use execution::{EnsembleError, JobError};

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EnsembleError>;
