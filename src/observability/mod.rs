// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the engine's operational events.
//!
//! Message types follow a struct-based pattern with a `Display`
//! implementation (human-readable line) and a [`messages::StructuredLog`]
//! implementation (machine-readable `tracing` fields + span creation), so
//! no magic strings are scattered through the codebase.
//!
//! Messages are organized by subsystem:
//! * `messages::protocol` - wire framing and event parsing
//! * `messages::router` - route and environment lifecycle

pub mod messages;
