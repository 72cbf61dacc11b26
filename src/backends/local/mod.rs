// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod models;
pub mod pool;

pub use models::*;
pub use pool::{LocalModel, LocalModelPool};
