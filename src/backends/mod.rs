// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Job-submission collaborators.
//!
//! The engine only sees the [`JobSubmitter`](crate::traits::JobSubmitter) trait;
//! whatever actually runs a model lives behind it.
//!
//! ## Local Backend
//! [`local::LocalModelPool`] runs in-process [`local::LocalModel`]s, one tokio task
//! per job. It ships with a handful of text models and is what the CLI uses.
//!
//! ## Stub Backend (Test-Only)
//! `stub::StubJobSubmitter` records every job and fakes model behaviour; only
//! available in test builds.
//!
//! # Examples
//!
//! ```rust
//! use ensemble_graph::backends::local::LocalModelPool;
//! use ensemble_graph::traits::ModelId;
//!
//! let pool = LocalModelPool::with_builtins();
//! assert!(pool.contains(&ModelId::new("reverse_text", None)));
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
