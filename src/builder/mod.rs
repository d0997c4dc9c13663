// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Environment compilation: turns a declarative asset list into a
//! connected dataflow graph and wires it into a live pipeline.

pub mod assets;
pub mod connectable;
pub mod environment;
pub mod graph;
pub mod pipeline;
pub mod types;

pub use assets::{Asset, AssetBuilders, AssetType, EnvironmentDefinition};
pub use connectable::{Connectable, Tracer};
pub use environment::{build_environment, Environment};
pub use graph::Graph;
pub use types::{AssetBuilderFn, EventStream, Lifter, TracerFn};
