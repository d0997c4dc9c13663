// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event documents flowing through the pipeline.
//!
//! A [`Document`] is an ordered mapping from string keys to JSON values.
//! After parsing (see [`crate::protocol::event`]) every document carries at
//! least `queue`, `location` and `message`. Documents are shared by
//! reference across subscribers and treated as immutable once published;
//! asset builders that rewrite fields do so on a copy before re-sharing.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A shared, read-only document handle. The pipeline is thread-confined,
/// so sharing is `Rc`-based; the document lives until the last subscriber
/// releases it.
pub type Event = Rc<Document>;

/// A JSON-object-backed event document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    value: Value,
}

impl Document {
    /// Creates an empty object document.
    pub fn new() -> Self {
        Self {
            value: Value::Object(serde_json::Map::new()),
        }
    }

    /// Wraps an existing JSON value. Non-object values are allowed (asset
    /// stage sections can be arrays); field accessors simply return `None`
    /// for them.
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Sets a field, overwriting any previous value. No-op on non-object
    /// documents.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        if let Value::Object(map) = &mut self.value {
            map.insert(key.into(), value);
        }
    }

    pub fn queue(&self) -> Option<i64> {
        self.get("queue").and_then(Value::as_i64)
    }

    pub fn location(&self) -> Option<&str> {
        self.get("location").and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.get("message").and_then(Value::as_str)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
