// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Type aliases shared across the builder.

use std::rc::Rc;

use crate::document::{Document, Event};
use crate::errors::CompileError;
use crate::rx::Observable;

/// A stream of shared documents.
pub type EventStream = Observable<Event>;

/// A stream transformer attached to one connectable. Cloneable so graphs
/// stay value types.
pub type Lifter = Rc<dyn Fn(EventStream) -> EventStream>;

/// Node-scoped trace publisher handed to asset builders; everything
/// written here reaches the node's trace sink subscribers.
pub type TracerFn = Rc<dyn Fn(String)>;

/// An asset builder: turns declarative asset content into a lifter.
pub type AssetBuilderFn = Rc<dyn Fn(&Document, TracerFn) -> Result<Lifter, CompileError>>;
