//! Query building and lazy evaluation
//!
//! A query is built by chaining step methods onto [`GraphStore::start_at`],
//! accumulating a program of (pipetype, arguments) pairs. Building touches
//! no graph data. Calling [`Query::run`] consumes the query and returns a
//! lazy iterator; each `next()` does just enough work to produce one result.
//!
//! ```
//! use gremlite::{EdgeRecord, GraphStore, VertexRecord};
//!
//! let graph = GraphStore::from_records(
//!     vec![
//!         VertexRecord::with_id("loki"),
//!         VertexRecord::with_id("thor"),
//!         VertexRecord::with_id("magni"),
//!     ],
//!     vec![
//!         EdgeRecord::new("loki", "thor").label("knows"),
//!         EdgeRecord::new("thor", "magni").label("parent"),
//!     ],
//! );
//!
//! let children: Vec<String> = graph
//!     .start_at("thor")
//!     .out("parent")
//!     .run()
//!     .filter_map(|r| r.as_vertex().map(|v| v.id.to_string()))
//!     .collect();
//! assert_eq!(children, vec!["magni"]);
//! ```

pub mod engine;
pub mod gremlin;
pub mod pipetype;

pub use engine::{QueryValue, Run};
pub use gremlin::{Gremlin, LabelState};
pub use pipetype::{PipeResult, PipeStep, Pipetypes, StepArg, StepFactory, StepPredicate};

use crate::graph::{EdgeFilter, GraphStore, PropertyMap, Vertex, VertexSelector};

/// One step of a query program: a pipetype name plus its arguments.
#[derive(Debug, Clone)]
pub struct Step {
    name: String,
    args: Vec<StepArg>,
}

impl Step {
    /// The pipetype this step names
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The step's arguments
    pub fn args(&self) -> &[StepArg] {
        &self.args
    }
}

/// A declarative traversal program over one graph.
///
/// Chaining methods moves the query through each call, and [`run`](Query::run)
/// consumes it outright: a query describes exactly one run and cannot be
/// restarted. Build it again (or clone the program out) to run it again.
pub struct Query<'g> {
    graph: &'g GraphStore,
    pipetypes: Pipetypes,
    program: Vec<Step>,
}

impl<'g> Query<'g> {
    fn new(graph: &'g GraphStore) -> Self {
        Query {
            graph,
            pipetypes: Pipetypes::default(),
            program: Vec::new(),
        }
    }

    /// Append a raw step.
    ///
    /// The typed methods below cover the built-ins; this is the door for
    /// custom registered pipetypes. A name that is not registered at run
    /// time degrades to a pass-through step.
    pub fn add(mut self, name: impl Into<String>, args: Vec<StepArg>) -> Self {
        self.program.push(Step {
            name: name.into(),
            args,
        });
        self
    }

    /// Swap in a pipetype catalog, replacing the built-in default.
    pub fn with_pipetypes(mut self, pipetypes: Pipetypes) -> Self {
        self.pipetypes = pipetypes;
        self
    }

    /// Follow edges leaving the current vertex. Pass `()` for every edge,
    /// a label, a label array, or a property selector.
    pub fn out(self, filter: impl Into<EdgeFilter>) -> Self {
        self.add("out", vec![StepArg::Filter(filter.into())])
    }

    /// Follow edges arriving at the current vertex.
    ///
    /// Named with a trailing underscore because `in` is a keyword.
    pub fn in_(self, filter: impl Into<EdgeFilter>) -> Self {
        self.add("in", vec![StepArg::Filter(filter.into())])
    }

    /// Yield the named property of each vertex instead of the vertex.
    /// Vertices missing the property produce nothing.
    pub fn property(self, key: impl Into<String>) -> Self {
        self.add("property", vec![StepArg::Str(key.into())])
    }

    /// Drop vertices already seen earlier in the run.
    pub fn unique(self) -> Self {
        self.add("unique", Vec::new())
    }

    /// Keep vertices whose properties match every selector entry.
    pub fn filter(self, selector: PropertyMap) -> Self {
        self.add("filter", vec![StepArg::Props(selector)])
    }

    /// Keep vertices the predicate approves of.
    pub fn filter_with(self, predicate: impl Fn(&Vertex, &Gremlin) -> bool + 'static) -> Self {
        self.add(
            "filter",
            vec![StepArg::Predicate(StepPredicate::new(predicate))],
        )
    }

    /// Stop after `n` results have passed this point.
    pub fn take(self, n: usize) -> Self {
        self.add("take", vec![StepArg::Count(n)])
    }

    /// Bookmark the current vertex under `label`.
    ///
    /// Named with a trailing underscore because `as` is a keyword.
    pub fn as_(self, label: impl Into<String>) -> Self {
        self.add("as", vec![StepArg::Str(label.into())])
    }

    /// Jump back to the vertex bookmarked under `label`.
    pub fn back(self, label: impl Into<String>) -> Self {
        self.add("back", vec![StepArg::Str(label.into())])
    }

    /// Drop the current vertex if it is the one bookmarked under `label`.
    pub fn except(self, label: impl Into<String>) -> Self {
        self.add("except", vec![StepArg::Str(label.into())])
    }

    /// Restart the traversal from each bookmarked vertex, in the order the
    /// labels are given. Labels never bookmarked are skipped.
    pub fn merge<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels.into_iter().map(Into::into).collect();
        self.add("merge", vec![StepArg::Strs(labels)])
    }

    /// The accumulated program, for inspection.
    pub fn program(&self) -> &[Step] {
        &self.program
    }

    /// Execute the program, lazily.
    ///
    /// Instantiates each step from the catalog and hands the lot to the
    /// evaluation engine. Consumes the query.
    pub fn run(self) -> Run<'g> {
        let steps = self
            .program
            .iter()
            .map(|step| self.pipetypes.instantiate(&step.name, &step.args))
            .collect();
        Run::new(self.graph, steps)
    }
}

impl GraphStore {
    /// Begin a query at the vertices matching `selector`.
    ///
    /// Pass `()` for every vertex, one or more identifiers, or a property
    /// selector map.
    pub fn start_at(&self, selector: impl Into<VertexSelector>) -> Query<'_> {
        Query::new(self).add("vertex", vec![StepArg::Selector(selector.into())])
    }
}
