// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime pipeline wiring: walks a compiled graph from its root and
//! turns it into live stream subscriptions.
//!
//! At each node all parent outputs are merged, the node's lifter is
//! applied, and the result fans out to the children; a node with two or
//! more children publishes through a ref-counted shared stream so its
//! lifter runs once regardless of fan-out. Recursion only descends into a
//! child once every one of its parents has delivered a stream handle, so
//! each lifter is applied exactly once per activation.

use crate::builder::graph::Graph;
use crate::builder::types::EventStream;
use crate::errors::CompileError;

/// Wires `graph` to `source` starting at `root` and returns the terminal
/// streams (outputs of childless nodes).
pub fn build_pipeline(
    graph: &mut Graph,
    source: EventStream,
    root: &str,
) -> Result<Vec<EventStream>, CompileError> {
    let mut terminals = Vec::new();
    connect_node(graph, source, root, &mut terminals)?;
    Ok(terminals)
}

fn connect_node(
    graph: &mut Graph,
    source: EventStream,
    name: &str,
    terminals: &mut Vec<EventStream>,
) -> Result<(), CompileError> {
    let Some(node) = graph.node_mut(name) else {
        // Unreachable in a well-formed compiled graph.
        return Ok(());
    };

    if node.input_count() == 0 {
        node.add_input(source);
    }

    let children: Vec<String> = graph
        .children(name)
        .map(|c| c.iter().cloned().collect())
        .unwrap_or_default();

    let Some(node) = graph.node(name) else {
        return Ok(());
    };
    let output = node.connect()?;
    let output = if children.len() > 1 {
        output.share()
    } else {
        output
    };

    if children.is_empty() {
        terminals.push(output);
        return Ok(());
    }

    for child in &children {
        let ready = match graph.node_mut(child) {
            Some(child_node) => {
                child_node.add_input(output.clone());
                child_node.input_count() == child_node.parents().len()
            }
            None => false,
        };
        if ready {
            connect_node(graph, output.clone(), child, terminals)?;
        }
    }

    Ok(())
}
