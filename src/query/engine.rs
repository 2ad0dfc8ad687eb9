//! Demand-driven pipeline evaluation
//!
//! [`Run`] drives an instantiated program one consumer request at a time.
//! Nothing is materialized ahead of demand: each `next()` walks the cursor
//! through the steps, moving at most one gremlin across each step boundary,
//! until the last step hands over a result or the whole program is spent.

use std::iter::FusedIterator;

use tracing::debug;

use crate::graph::{GraphStore, PropertyValue, Vertex};

use super::gremlin::Gremlin;
use super::pipetype::{PipeResult, PipeStep};

/// One result of a run: the vertex a traversal landed on, or the raw
/// property value the `property` step lifted off one.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue<'g> {
    Vertex(&'g Vertex),
    Value(PropertyValue),
}

impl<'g> QueryValue<'g> {
    /// The vertex, if this result is one
    pub fn as_vertex(&self) -> Option<&'g Vertex> {
        match self {
            QueryValue::Vertex(vertex) => Some(vertex),
            QueryValue::Value(_) => None,
        }
    }

    /// The property value, if this result is one
    pub fn as_value(&self) -> Option<&PropertyValue> {
        match self {
            QueryValue::Value(value) => Some(value),
            QueryValue::Vertex(_) => None,
        }
    }

    /// Consume the result, keeping the property value if it is one
    pub fn into_value(self) -> Option<PropertyValue> {
        match self {
            QueryValue::Value(value) => Some(value),
            QueryValue::Vertex(_) => None,
        }
    }
}

/// A consumed query, being evaluated lazily.
///
/// The iterator produces one [`QueryValue`] per `next()` and never computes
/// ahead of that. A program without a bounding step (`take`) over a cyclic
/// graph can be infinite; bounding it is the caller's job. Dropping the
/// iterator is the only cancellation there is, and all there needs to be.
pub struct Run<'g> {
    graph: &'g GraphStore,

    /// Step instances, one per program step; each owns its private state
    steps: Vec<Box<dyn PipeStep>>,

    /// At most one in-flight gremlin waiting at each step boundary
    pending: Vec<Option<Gremlin>>,

    /// Position of the step to invoke next
    cursor: usize,

    /// Exhausted prefix: steps below this can never produce again. The run
    /// is over once the watermark covers the whole program.
    spent: usize,
}

impl<'g> Run<'g> {
    pub(crate) fn new(graph: &'g GraphStore, steps: Vec<Box<dyn PipeStep>>) -> Self {
        debug!("Running {} step program", steps.len());
        let pending = steps.iter().map(|_| None).collect();
        Run {
            graph,
            cursor: steps.len().saturating_sub(1),
            spent: 0,
            pending,
            steps,
        }
    }

    fn emit(&self, gremlin: Gremlin) -> QueryValue<'g> {
        match gremlin.result {
            Some(value) => QueryValue::Value(value),
            None => QueryValue::Vertex(self.graph.vertex_at(gremlin.vertex)),
        }
    }
}

impl<'g> Iterator for Run<'g> {
    type Item = QueryValue<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.steps.is_empty() {
            return None;
        }
        let last = self.steps.len() - 1;

        while self.spent < self.steps.len() {
            let c = self.cursor;
            let input = self.pending[c].take();

            match self.steps[c].step(self.graph, input) {
                PipeResult::Gremlin(gremlin) => {
                    if c == last {
                        // External result; the cursor stays here and the
                        // next request re-enters this step without input.
                        return Some(self.emit(gremlin));
                    }
                    self.pending[c + 1] = Some(gremlin);
                    self.cursor = c + 1;
                }
                PipeResult::Pull => {
                    if c > self.spent {
                        self.cursor = c - 1;
                    } else {
                        // Starved: everything upstream is already spent, so
                        // this step can never see input again. The watermark
                        // swallows it and the drain moves down-pipeline.
                        self.spent = c + 1;
                        self.cursor = (c + 1).min(last);
                    }
                }
                PipeResult::Done => {
                    self.spent = c + 1;
                    self.cursor = (c + 1).min(last);
                }
                PipeResult::Reject => {
                    // Input discarded; the same step retries immediately
                }
            }
        }
        None
    }
}

impl<'g> FusedIterator for Run<'g> {}
