// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for wire framing and event parsing.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::errors::ParseError;
use crate::observability::messages::StructuredLog;

/// A frame header announced a payload beyond the configured limit; the
/// connection is about to be closed.
pub struct FrameRejected {
    pub size: usize,
    pub max: usize,
}

impl Display for FrameRejected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected frame of {} bytes, limit is {} bytes",
            self.size, self.max
        )
    }
}

impl StructuredLog for FrameRejected {
    fn log(&self) {
        tracing::warn!(size = self.size, max = self.max, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("frame_rejected", span_name = name, size = self.size, max = self.max)
    }
}

/// An event payload failed to parse and was dropped.
pub struct EventDropped<'a> {
    pub error: &'a ParseError,
}

impl Display for EventDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dropped unparseable event: {}", self.error)
    }
}

impl StructuredLog for EventDropped<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("event_dropped", span_name = name, error = %self.error)
    }
}
