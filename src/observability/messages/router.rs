// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for route and environment lifecycle events.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// An environment definition was compiled into a live graph.
pub struct EnvironmentCompiled<'a> {
    pub environment: &'a str,
    pub nodes: usize,
}

impl Display for EnvironmentCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled environment '{}' with {} connectables",
            self.environment, self.nodes
        )
    }
}

impl StructuredLog for EnvironmentCompiled<'_> {
    fn log(&self) {
        tracing::info!(environment = self.environment, nodes = self.nodes, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "environment_compiled",
            span_name = name,
            environment = self.environment,
            nodes = self.nodes,
        )
    }
}

/// A route started feeding an environment.
pub struct RouteAdded<'a> {
    pub route: &'a str,
    pub environment: &'a str,
}

impl Display for RouteAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Route '{}' now forwards into environment '{}'",
            self.route, self.environment
        )
    }
}

impl StructuredLog for RouteAdded<'_> {
    fn log(&self) {
        tracing::info!(route = self.route, environment = self.environment, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "route_added",
            span_name = name,
            route = self.route,
            environment = self.environment,
        )
    }
}

/// A route was detached from the shared source.
pub struct RouteRemoved<'a> {
    pub route: &'a str,
    pub environment: &'a str,
    /// Whether the environment was dropped with its last route.
    pub environment_dropped: bool,
}

impl Display for RouteRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Route '{}' detached from environment '{}'", self.route, self.environment)?;
        if self.environment_dropped {
            write!(f, " (environment dropped)")?;
        }
        Ok(())
    }
}

impl StructuredLog for RouteRemoved<'_> {
    fn log(&self) {
        tracing::info!(
            route = self.route,
            environment = self.environment,
            environment_dropped = self.environment_dropped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "route_removed",
            span_name = name,
            route = self.route,
            environment = self.environment,
        )
    }
}
