// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event payload grammar: `<queue-int>:<location>:<message>`.
//!
//! `location` contains no colon; `message` is the unmodified remainder and
//! may be empty. A parse failure drops only the offending event.

use serde_json::json;

use crate::document::Document;
use crate::errors::ParseError;

pub fn parse_event(payload: &str) -> Result<Document, ParseError> {
    let (queue, rest) = payload.split_once(':').ok_or(ParseError::Queue)?;
    let queue: i64 = queue.parse().map_err(|_| ParseError::Queue)?;

    let (location, message) = rest.split_once(':').ok_or(ParseError::Location)?;

    let mut doc = Document::new();
    doc.set("queue", json!(queue));
    doc.set("location", json!(location));
    doc.set("message", json!(message));
    Ok(doc)
}
