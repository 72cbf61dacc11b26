// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Synchronous boundary for hosts that call a model as a blocking transform.
//!
//! A host loads one [`EnsembleTranslator`] per model directory through an
//! [`EnsembleTranslatorFactory`], then for each request calls
//! [`EnsembleTranslator::process_input`] followed by
//! [`EnsembleTranslator::process_output`]. The first call runs the whole graph on
//! a tokio runtime and blocks the calling thread until it finishes; the second
//! hands back the result.

mod translator;

pub use translator::{EnsembleTranslator, EnsembleTranslatorFactory};
