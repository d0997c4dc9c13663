// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Environment compilation.
//!
//! An environment definition is partitioned into per-stage subgraphs
//! (decoders, rules, outputs), each anchored between synthetic IO nodes,
//! joined into the spine
//! `INPUT_DECODER -> ... -> OUTPUT_DECODER -> INPUT_RULE -> ... -> OUTPUT_RULE ->
//! INPUT_OUTPUT -> ... -> OUTPUT_OUTPUT`, and filter assets are injected onto
//! their declared parents. When all three stages are present the explicit
//! `OUTPUT_DECODER -> INPUT_OUTPUT` cross-edge makes decoders feed the
//! rules branch and the outputs branch in parallel.

use std::collections::HashMap;
use std::rc::Rc;

use crate::builder::assets::{
    asset_name, asset_parents, AssetBuilders, AssetType, EnvironmentDefinition,
};
use crate::builder::connectable::{Connectable, Tracer};
use crate::builder::graph::Graph;
use crate::builder::pipeline::build_pipeline;
use crate::document::{Document, Event};
use crate::errors::CompileError;
use crate::rx::{Observable, Subject, Subscriber, Subscription};

pub const INPUT_DECODER: &str = "INPUT_DECODER";
pub const OUTPUT_DECODER: &str = "OUTPUT_DECODER";
pub const INPUT_RULE: &str = "INPUT_RULE";
pub const OUTPUT_RULE: &str = "OUTPUT_RULE";
pub const INPUT_OUTPUT: &str = "INPUT_OUTPUT";
pub const OUTPUT_OUTPUT: &str = "OUTPUT_OUTPUT";

/// A compiled environment: the owned graph, one trace sink per node, an
/// input subject feeding the graph root and an output subject fed by the
/// terminal streams. The pipeline is wired exactly once, here; routes
/// subscribe the input side, embedders and tests observe the output side.
pub struct Environment {
    name: String,
    trace_sinks: HashMap<String, Observable<String>>,
    input: Subject<Event>,
    output: Subject<Event>,
    graph: Graph,
    _pipeline: Subscription,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Environment {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscriber handle feeding the graph root.
    pub fn input(&self) -> Subscriber<Event> {
        self.input.subscriber()
    }

    /// Stream of events that reached the end of the graph.
    pub fn output(&self) -> Observable<Event> {
        self.output.observable()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn trace_sinks(&self) -> &HashMap<String, Observable<String>> {
        &self.trace_sinks
    }

    /// Attaches a handler to one asset's trace sink. `None` when the
    /// environment has no such asset. Hold the subscription for as long
    /// as traces should arrive.
    pub fn subscribe_trace_sink(
        &self,
        asset: &str,
        handler: impl Fn(String) + 'static,
    ) -> Option<Subscription> {
        self.trace_sinks
            .get(asset)
            .map(|sink| sink.subscribe_next(handler))
    }

    /// Attaches a handler to every trace sink of the environment.
    pub fn subscribe_all_trace_sinks(
        &self,
        handler: impl Fn(String) + 'static,
    ) -> Vec<Subscription> {
        let handler = Rc::new(handler);
        self.trace_sinks
            .values()
            .map(|sink| {
                let handler = Rc::clone(&handler);
                sink.subscribe_next(move |line| handler(line))
            })
            .collect()
    }
}

/// Compiles a definition into a live environment.
pub fn build_environment(
    def: &EnvironmentDefinition,
    builders: &AssetBuilders,
) -> Result<Environment, CompileError> {
    let mut graph = build_graph(def, builders)?;

    let mut trace_sinks = HashMap::new();
    graph.visit(|node| {
        trace_sinks.insert(node.name().to_owned(), node.tracer().observable());
    });

    let input: Subject<Event> = Subject::new();
    let output: Subject<Event> = Subject::new();
    let terminals = build_pipeline(&mut graph, input.observable(), INPUT_DECODER)?;
    let pipeline = Observable::merge(terminals).subscribe(output.subscriber());

    Ok(Environment {
        name: def.name.clone(),
        trace_sinks,
        input,
        output,
        graph,
        _pipeline: pipeline,
    })
}

fn build_graph(def: &EnvironmentDefinition, builders: &AssetBuilders) -> Result<Graph, CompileError> {
    let mut decoders = Graph::new();
    let mut rules = Graph::new();
    let mut outputs = Graph::new();
    let mut filters = Graph::new();

    for asset in &def.assets {
        let kind: AssetType = asset.kind.parse()?;
        let node = connectable_from_asset(kind, &asset.content, builders)?;
        match kind {
            AssetType::Decoder => decoders.add_node(node)?,
            AssetType::Rule => rules.add_node(node)?,
            AssetType::Output => outputs.add_node(node)?,
            AssetType::Filter => filters.add_node(node)?,
        }
    }

    if decoders.is_empty() && rules.is_empty() && outputs.is_empty() {
        return Err(CompileError::Empty);
    }
    let all_stages = !decoders.is_empty() && !rules.is_empty() && !outputs.is_empty();

    let mut compiled = Graph::new();
    let mut previous_output = "";
    for (input_anchor, output_anchor, stage) in [
        (INPUT_DECODER, OUTPUT_DECODER, &mut decoders),
        (INPUT_RULE, OUTPUT_RULE, &mut rules),
        (INPUT_OUTPUT, OUTPUT_OUTPUT, &mut outputs),
    ] {
        stage.add_parent_edges(input_anchor, output_anchor)?;
        compiled = compiled.join(stage, previous_output, input_anchor)?;
        previous_output = output_anchor;
    }

    let mut compiled = compiled.inject(&filters)?;

    // Decoders feed the outputs branch directly as well as through the
    // rules branch.
    if all_stages {
        compiled.add_edge(OUTPUT_DECODER, INPUT_OUTPUT)?;
        if let Some(node) = compiled.node_mut(INPUT_OUTPUT) {
            node.add_parent(OUTPUT_DECODER);
        }
    }

    tracing::debug!(environment = %def.name, "compiled graph:\n{}", compiled.print());
    Ok(compiled)
}

fn connectable_from_asset(
    kind: AssetType,
    content: &Document,
    builders: &AssetBuilders,
) -> Result<Connectable, CompileError> {
    let name = asset_name(content)?;
    let parents = asset_parents(content);
    let tracer = Tracer::new();
    let lifter = builders.build(kind, content, tracer.tracer_fn())?;
    Ok(Connectable::new(name, parents, lifter, tracer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn definition(yaml: &str) -> EnvironmentDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn full_definition() -> EnvironmentDefinition {
        definition(
            r#"
name: env1
assets:
  - type: decoder
    name: d1
  - type: rule
    name: r1
    parents: [d1]
  - type: output
    name: o1
    parents: [r1]
  - type: filter
    name: f1
    parents: [d1]
"#,
        )
    }

    #[test]
    fn compiles_the_documented_topology() {
        let env = build_environment(&full_definition(), &AssetBuilders::default()).unwrap();
        let graph = env.graph();

        for (parent, child) in [
            (INPUT_DECODER, "d1"),
            ("d1", "f1"),
            ("f1", OUTPUT_DECODER),
            (OUTPUT_DECODER, INPUT_RULE),
            (INPUT_RULE, "r1"),
            ("r1", OUTPUT_RULE),
            (OUTPUT_RULE, INPUT_OUTPUT),
            (OUTPUT_DECODER, INPUT_OUTPUT),
            (INPUT_OUTPUT, "o1"),
            ("o1", OUTPUT_OUTPUT),
        ] {
            assert!(graph.has_edge(parent, child), "missing {} -> {}", parent, child);
        }
    }

    #[test]
    fn cross_stage_parent_is_resolved_by_the_stage_anchor() {
        // r1 declares d1 as parent, but d1 lives in the decoder stage;
        // inside the rule subgraph r1 has no resolvable parent and is
        // adopted by its stage anchor. The decoder relationship is
        // carried by the spine instead.
        let env = build_environment(&full_definition(), &AssetBuilders::default()).unwrap();
        let graph = env.graph();

        assert!(graph.has_edge(INPUT_RULE, "r1"));
        assert!(!graph.has_edge("d1", "r1"));
        assert!(graph.node("r1").unwrap().parents().contains(INPUT_RULE));
        assert!(!graph.node("r1").unwrap().parents().contains("d1"));
    }

    #[test]
    fn empty_definition_is_rejected() {
        let def = definition("name: hollow\nassets: []");
        assert_eq!(
            build_environment(&def, &AssetBuilders::default()).unwrap_err(),
            CompileError::Empty
        );
    }

    #[test]
    fn unknown_asset_type_is_rejected() {
        let def = definition(
            r#"
name: env1
assets:
  - type: widget
    name: w1
"#,
        );
        assert_eq!(
            build_environment(&def, &AssetBuilders::default()).unwrap_err(),
            CompileError::UnknownAssetType("widget".into())
        );
    }

    #[test]
    fn every_node_gets_a_trace_sink() {
        let env = build_environment(&full_definition(), &AssetBuilders::default()).unwrap();
        for name in [
            "d1", "r1", "o1", "f1",
            INPUT_DECODER, OUTPUT_DECODER,
            INPUT_RULE, OUTPUT_RULE,
            INPUT_OUTPUT, OUTPUT_OUTPUT,
        ] {
            assert!(env.trace_sinks().contains_key(name), "no sink for {}", name);
        }
    }

    #[test]
    fn events_flow_input_to_output() {
        let env = build_environment(&full_definition(), &AssetBuilders::default()).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _keep = env
            .output()
            .subscribe_next(move |e: Event| sink.borrow_mut().extend(e.queue()));

        let mut doc = Document::new();
        doc.set("queue", serde_json::json!(1));
        env.input().on_next(Rc::new(doc));

        // The event reaches the outputs through the rules branch and the
        // direct decoder branch.
        assert_eq!(*seen.borrow(), vec![1, 1]);
    }

    #[test]
    fn subscribe_trace_sink_rejects_unknown_asset() {
        let env = build_environment(&full_definition(), &AssetBuilders::default()).unwrap();
        assert!(env.subscribe_trace_sink("ghost", |_| {}).is_none());
    }
}
