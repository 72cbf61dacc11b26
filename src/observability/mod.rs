// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of the engine goes through message types defined in
//! [`messages`]. Each message is a small struct implementing `Display` (the human
//! readable line) and [`messages::StructuredLog`] (the `tracing` event with typed
//! fields), which keeps log text out of the evaluation code.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::graph` - graph loading and validation events
//! * `messages::engine` - node evaluation, fan-out/fan-in and job submission events
//! * `messages::processor` - processor resolution and execution events
//!
//! # Usage
//!
//! ```rust
//! use ensemble_graph::observability::messages::{engine::JobSubmitted, StructuredLog};
//!
//! let msg = JobSubmitted {
//!     model: "resnet18:1",
//!     entry_count: 1,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
