// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod adapter;    // synchronous host boundary
pub mod backends;   // job submitters
pub mod config;     // config + runtime builder
pub mod engine;     // graph evaluation
pub mod envelope;   // request/response payloads
pub mod errors;     // error handling
pub mod graph;      // node tree + loader
pub mod observability;
pub mod processors; // input/output processors + registry
pub mod traits;     // collaborator and plugin contracts
