// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the engine.
//!
//! Propagation policy: protocol and parse errors are recovered locally (the
//! offending frame or event is dropped and logged); graph and compile
//! errors abort the current router `add` call and leave the router
//! unchanged; router errors are surfaced to the caller. Malformed input
//! never panics the pipeline.

use thiserror::Error;

/// Errors produced while framing the wire protocol. Fatal for the
/// connection that produced them; the caller is expected to close it.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame header announced a payload larger than the configured limit.
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    OversizedFrame { size: usize, max: usize },

    /// Frame payload was not valid UTF-8.
    #[error("frame payload is not valid UTF-8")]
    Payload(#[from] std::str::Utf8Error),

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while parsing an event payload into a document. Drop
/// only the event that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("could not parse queue id from event payload")]
    Queue,

    #[error("could not parse location from event payload")]
    Location,

    #[error("could not parse message from event payload")]
    Message,
}

/// Errors produced by graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("connectable '{0}' is already in the graph")]
    DuplicateNode(String),

    #[error("connectable '{0}' is not in the graph")]
    UnknownNode(String),

    #[error("connectable '{child}' is already a child of '{parent}'")]
    DuplicateEdge { parent: String, child: String },

    #[error("connectable '{child}' is not a child of '{parent}'")]
    UnknownEdge { parent: String, child: String },
}

/// Errors produced while compiling an environment definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("environment defines no decoders, rules or outputs")]
    Empty,

    #[error("connectable '{0}' activated before all parent inputs were wired")]
    IncompleteInputs(String),

    #[error("unknown asset type '{0}'")]
    UnknownAssetType(String),

    #[error("asset content is missing its 'name' field")]
    MissingName,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors produced by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog has no environment named '{0}'")]
    UnknownEnvironment(String),

    #[error("invalid environment definition: {0}")]
    Definition(String),
}

/// Errors surfaced by the router to its caller.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("route '{0}' is already in use")]
    DuplicateRoute(String),

    #[error("route '{0}' is not registered")]
    UnknownRoute(String),

    #[error("environment '{0}' is not registered")]
    UnknownEnvironment(String),

    #[error("environment '{environment}' does not contain asset '{asset}'")]
    UnknownAsset { environment: String, asset: String },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_offender() {
        let err = GraphError::DuplicateNode("d1".into());
        assert_eq!(err.to_string(), "connectable 'd1' is already in the graph");

        let err = RouterError::UnknownAsset {
            environment: "env1".into(),
            asset: "d9".into(),
        };
        assert!(err.to_string().contains("env1"));
        assert!(err.to_string().contains("d9"));
    }

    #[test]
    fn compile_error_wraps_graph_error() {
        let err: CompileError = GraphError::UnknownNode("x".into()).into();
        assert_eq!(err, CompileError::Graph(GraphError::UnknownNode("x".into())));
    }
}
