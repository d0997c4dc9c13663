// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements:
//!
//! * `Display` - human-readable output
//! * [`StructuredLog`] - emission with machine-readable fields, plus a
//!   span constructor for tracing contexts
//!
//! # Usage
//!
//! ```rust
//! use eventflux::observability::messages::{StructuredLog, router::RouteAdded};
//!
//! RouteAdded { route: "r1", environment: "env1" }.log();
//! ```

pub mod protocol;
pub mod router;

use tracing::Span;

/// Messages that can emit themselves as structured log events.
pub trait StructuredLog {
    /// Emits the message at its semantic level (info for lifecycle
    /// events, warn for dropped input) with structured fields alongside
    /// the `Display` text.
    fn log(&self);

    /// A span carrying this message's fields as attributes.
    fn span(&self, name: &str) -> Span;
}
