// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph evaluation: the per-request context and `predict` for every node kind.

mod context;
mod evaluator;

pub use context::RequestContext;
pub use evaluator::PredictFuture;
