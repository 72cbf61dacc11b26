// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The ensemble graph: node types and the loader that builds them from a
//! graph description.

mod loader;
pub(crate) mod node;

pub use loader::GraphLoader;
pub use node::{ModelRef, Node, Parallel, Sequence};
