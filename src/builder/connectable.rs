// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The labelled processing unit the graph is made of: N inputs, one
//! output stream, one trace stream, and a pluggable lifter between them.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::builder::types::{EventStream, Lifter, TracerFn};
use crate::errors::CompileError;
use crate::rx::{Observable, Subject};

/// Side-channel diagnostic stream for one node. Cloning shares the
/// underlying subject, so graph copies keep publishing to the same sink.
#[derive(Clone, Default)]
pub struct Tracer {
    subject: Subject<String>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The publishing side, handed to the asset builder.
    pub fn tracer_fn(&self) -> TracerFn {
        let subject = self.subject.clone();
        Rc::new(move |line| subject.next(line))
    }

    /// The subscribing side. Late subscribers only see future traces.
    pub fn observable(&self) -> Observable<String> {
        self.subject.observable()
    }
}

/// A graph node: declarative parents, runtime input streams, and the
/// lifter applied once over their unordered merge.
#[derive(Clone)]
pub struct Connectable {
    name: String,
    parents: BTreeSet<String>,
    inputs: Vec<EventStream>,
    lifter: Lifter,
    tracer: Tracer,
}

impl fmt::Debug for Connectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connectable")
            .field("name", &self.name)
            .field("parents", &self.parents)
            .field("inputs", &self.inputs.len())
            .finish()
    }
}

impl Connectable {
    pub fn new(
        name: impl Into<String>,
        parents: impl IntoIterator<Item = String>,
        lifter: Lifter,
        tracer: Tracer,
    ) -> Self {
        Self {
            name: name.into(),
            parents: parents.into_iter().collect(),
            inputs: Vec::new(),
            lifter,
            tracer,
        }
    }

    /// An identity node, used for the synthetic subgraph anchors.
    pub fn pass_through(name: impl Into<String>) -> Self {
        Self::new(name, [], Rc::new(|input: EventStream| input), Tracer::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &BTreeSet<String> {
        &self.parents
    }

    pub fn add_parent(&mut self, parent: impl Into<String>) {
        self.parents.insert(parent.into());
    }

    pub fn remove_parent(&mut self, parent: &str) {
        self.parents.remove(parent);
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Appends an upstream stream. Called once per resolved parent (plus
    /// once for the pipeline source on the root node) before activation.
    pub fn add_input(&mut self, input: EventStream) {
        self.inputs.push(input);
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Activates the node: lifter over the unordered merge of all inputs.
    /// The pipeline builder calls this exactly once, after every parent
    /// has delivered its stream handle.
    pub fn connect(&self) -> Result<EventStream, CompileError> {
        let wired = self.inputs.len();
        if wired == 0 || (!self.parents.is_empty() && wired != self.parents.len()) {
            return Err(CompileError::IncompleteInputs(self.name.clone()));
        }
        Ok((self.lifter)(Observable::merge(self.inputs.clone())))
    }
}
