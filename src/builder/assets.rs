// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative assets and the builders that turn them into lifters.
//!
//! An asset's content document carries its `name`, optional `parents`,
//! and optional stage sections:
//!
//! ```yaml
//! type: decoder
//! name: d1
//! parents: []
//! check:
//!   - queue: 1
//! normalize:
//!   decoded: true
//! ```
//!
//! `check` is a list of field-equality conditions, all of which must
//! match; `normalize` is a map of fields written onto a copy of the
//! document before it is re-shared. The default builders implement just
//! enough of those stages to compile useful environments; embedders with
//! a real rule language plug their own [`AssetBuilders`] into the router.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::builder::types::{AssetBuilderFn, EventStream, Lifter, TracerFn};
use crate::document::{Document, Event};
use crate::errors::CompileError;

/// The closed set of asset kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Decoder,
    Rule,
    Output,
    Filter,
}

impl FromStr for AssetType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, CompileError> {
        match s {
            "decoder" => Ok(AssetType::Decoder),
            "rule" => Ok(AssetType::Rule),
            "output" => Ok(AssetType::Output),
            "filter" => Ok(AssetType::Filter),
            other => Err(CompileError::UnknownAssetType(other.to_owned())),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetType::Decoder => "decoder",
            AssetType::Rule => "rule",
            AssetType::Output => "output",
            AssetType::Filter => "filter",
        };
        write!(f, "{}", s)
    }
}

/// One declarative node definition. The kind stays a string until compile
/// time so that unknown types surface as [`CompileError::UnknownAssetType`]
/// rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub content: Document,
}

/// A named, ordered asset list, as supplied by the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentDefinition {
    pub name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One builder per asset kind; dispatch is a `match` over the closed
/// enum. Each builder receives the asset content and the node-scoped
/// tracer and returns the node's lifter.
pub struct AssetBuilders {
    pub decoder: AssetBuilderFn,
    pub rule: AssetBuilderFn,
    pub output: AssetBuilderFn,
    pub filter: AssetBuilderFn,
}

impl AssetBuilders {
    pub fn build(
        &self,
        kind: AssetType,
        content: &Document,
        tracer: TracerFn,
    ) -> Result<Lifter, CompileError> {
        let builder = match kind {
            AssetType::Decoder => &self.decoder,
            AssetType::Rule => &self.rule,
            AssetType::Output => &self.output,
            AssetType::Filter => &self.filter,
        };
        builder(content, tracer)
    }
}

impl Default for AssetBuilders {
    fn default() -> Self {
        Self {
            decoder: Rc::new(build_stage_asset),
            rule: Rc::new(build_stage_asset),
            output: Rc::new(build_output_asset),
            filter: Rc::new(build_filter_asset),
        }
    }
}

/// Name of the asset, required on every content document.
pub fn asset_name(content: &Document) -> Result<String, CompileError> {
    content
        .str_field("name")
        .map(str::to_owned)
        .ok_or(CompileError::MissingName)
}

/// Declared parent names; absent means root-adopted.
pub fn asset_parents(content: &Document) -> Vec<String> {
    match content.get("parents") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn check_conditions(content: &Document) -> Vec<(String, Value)> {
    match content.get("check") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect(),
        _ => Vec::new(),
    }
}

fn normalize_fields(content: &Document) -> Vec<(String, Value)> {
    match content.get("normalize") {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => Vec::new(),
    }
}

fn matches(event: &Event, conditions: &[(String, Value)]) -> bool {
    conditions
        .iter()
        .all(|(field, expected)| event.get(field) == Some(expected))
}

/// Decoder and rule builder: check stage filters, normalize stage
/// rewrites a copy of the document.
fn build_stage_asset(content: &Document, tracer: TracerFn) -> Result<Lifter, CompileError> {
    let name = asset_name(content)?;
    let conditions = check_conditions(content);
    let fields = normalize_fields(content);

    Ok(Rc::new(move |input: EventStream| {
        let name = name.clone();
        let conditions = conditions.clone();
        let tracer = Rc::clone(&tracer);
        let checked = input.filter(move |event: &Event| {
            let hit = matches(event, &conditions);
            if hit {
                tracer(format!("{} accepted", name));
            }
            hit
        });

        if fields.is_empty() {
            checked
        } else {
            let fields = fields.clone();
            checked.map(move |event: Event| {
                let mut doc = (*event).clone();
                for (field, value) in &fields {
                    doc.set(field.clone(), value.clone());
                }
                Rc::new(doc)
            })
        }
    }))
}

/// Filter builder: check stage only; non-matching events are discarded.
fn build_filter_asset(content: &Document, tracer: TracerFn) -> Result<Lifter, CompileError> {
    let name = asset_name(content)?;
    let conditions = check_conditions(content);

    Ok(Rc::new(move |input: EventStream| {
        let name = name.clone();
        let conditions = conditions.clone();
        let tracer = Rc::clone(&tracer);
        input.filter(move |event: &Event| {
            let hit = matches(event, &conditions);
            if !hit {
                tracer(format!("{} discarded", name));
            }
            hit
        })
    }))
}

/// Output builder: pass-through that traces every delivery. Concrete
/// sinks subscribe outside the graph.
fn build_output_asset(content: &Document, tracer: TracerFn) -> Result<Lifter, CompileError> {
    let name = asset_name(content)?;

    Ok(Rc::new(move |input: EventStream| {
        let name = name.clone();
        let tracer = Rc::clone(&tracer);
        input.map(move |event: Event| {
            tracer(format!("{} delivered", name));
            event
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::connectable::Tracer;
    use crate::rx::Subject;
    use serde_json::json;
    use std::cell::RefCell;

    fn content(yaml: &str) -> Document {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn event(fields: &[(&str, Value)]) -> Event {
        let mut doc = Document::new();
        for (k, v) in fields {
            doc.set(*k, v.clone());
        }
        Rc::new(doc)
    }

    fn run_lifter(lifter: &Lifter, events: Vec<Event>) -> Vec<Event> {
        let subject: Subject<Event> = Subject::new();
        let out = lifter(subject.observable());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _keep = out.subscribe_next(move |e| sink.borrow_mut().push(e));
        for e in events {
            subject.next(e);
        }
        let collected = seen.borrow().clone();
        collected
    }

    #[test]
    fn asset_type_parses_known_kinds_only() {
        assert_eq!("decoder".parse::<AssetType>().unwrap(), AssetType::Decoder);
        assert_eq!("filter".parse::<AssetType>().unwrap(), AssetType::Filter);
        assert_eq!(
            "widget".parse::<AssetType>().unwrap_err(),
            CompileError::UnknownAssetType("widget".into())
        );
    }

    #[test]
    fn asset_deserializes_with_flattened_content() {
        let asset: Asset = serde_yaml::from_str(
            r#"
type: decoder
name: d1
parents: [root]
"#,
        )
        .unwrap();

        assert_eq!(asset.kind, "decoder");
        assert_eq!(asset_name(&asset.content).unwrap(), "d1");
        assert_eq!(asset_parents(&asset.content), vec!["root"]);
    }

    #[test]
    fn missing_name_is_a_compile_error() {
        let doc = content("parents: []");
        assert_eq!(asset_name(&doc).unwrap_err(), CompileError::MissingName);
    }

    #[test]
    fn stage_asset_checks_and_normalizes() {
        let doc = content(
            r#"
name: d1
check:
  - queue: 1
normalize:
  decoded: true
"#,
        );
        let tracer = Tracer::new();
        let lifter = build_stage_asset(&doc, tracer.tracer_fn()).unwrap();

        let out = run_lifter(
            &lifter,
            vec![
                event(&[("queue", json!(1))]),
                event(&[("queue", json!(2))]),
            ],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].queue(), Some(1));
        assert_eq!(out[0].get("decoded"), Some(&json!(true)));
    }

    #[test]
    fn stage_asset_without_check_accepts_everything() {
        let doc = content("name: d1");
        let tracer = Tracer::new();
        let lifter = build_stage_asset(&doc, tracer.tracer_fn()).unwrap();

        let out = run_lifter(&lifter, vec![event(&[("queue", json!(9))])]);
        assert_eq!(out.len(), 1);
        // No normalize stage: the shared document passes through untouched.
        assert_eq!(out[0].queue(), Some(9));
    }

    #[test]
    fn filter_asset_discards_and_traces() {
        let doc = content(
            r#"
name: f1
check:
  - location: keep
"#,
        );
        let tracer = Tracer::new();
        let traces = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&traces);
        let _keep = tracer
            .observable()
            .subscribe_next(move |line: String| sink.borrow_mut().push(line));

        let lifter = build_filter_asset(&doc, tracer.tracer_fn()).unwrap();
        let out = run_lifter(
            &lifter,
            vec![
                event(&[("location", json!("keep"))]),
                event(&[("location", json!("drop"))]),
            ],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(*traces.borrow(), vec!["f1 discarded"]);
    }

    #[test]
    fn output_asset_traces_each_delivery() {
        let doc = content("name: o1");
        let tracer = Tracer::new();
        let traces = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&traces);
        let _keep = tracer
            .observable()
            .subscribe_next(move |line: String| sink.borrow_mut().push(line));

        let lifter = build_output_asset(&doc, tracer.tracer_fn()).unwrap();
        let out = run_lifter(&lifter, vec![event(&[]), event(&[])]);

        assert_eq!(out.len(), 2);
        assert_eq!(*traces.borrow(), vec!["o1 delivered", "o1 delivered"]);
    }
}
