// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `graph` - graph description loading events
//! * `engine` - graph evaluation events
//! * `processor` - processor lifecycle events

use tracing::Span;

pub mod engine;
pub mod graph;
pub mod processor;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
