//! Pipetype catalog and the built-in traversal steps
//!
//! A pipetype is one kind of query step. The catalog maps step names to
//! factories; a factory turns the step's arguments into a fresh step
//! instance for one run. Instances own their private state (backlogs,
//! counters, dedup sets), so per-run state lives exactly as long as the run.
//!
//! Built-ins: `vertex`, `out`, `in`, `property`, `unique`, `filter`, `take`,
//! `as`, `back`, `except`, `merge`. Unregistered names and unusable
//! arguments degrade to a transparent pass-through step with a logged
//! warning; they never fail the query.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::graph::property::matches_selector;
use crate::graph::{EdgeFilter, GraphStore, PropertyMap, Vertex, VertexIx, VertexSelector};

use super::gremlin::{Gremlin, LabelState};

/// What one pipetype invocation produced.
#[derive(Debug)]
pub enum PipeResult {
    /// An output token, handed to the next step or the consumer
    Gremlin(Gremlin),
    /// Nothing from here; feed me upstream input before calling again
    Pull,
    /// Permanently exhausted for the rest of this run
    Done,
    /// This input was no good; call me again, maybe with nothing
    Reject,
}

/// One instantiated step of a running query.
///
/// The engine calls [`step`](PipeStep::step) with the graph and at most one
/// input token; the instance answers with a [`PipeResult`]. An instance
/// lives for exactly one run and owns whatever private state the step needs.
///
/// Correctness obligations on every implementation: a given input must
/// eventually produce something other than `Reject`, and a starved step
/// (called without input, nothing queued) must answer `Pull` or `Done`,
/// otherwise the engine would spin.
pub trait PipeStep {
    fn step(&mut self, graph: &GraphStore, input: Option<Gremlin>) -> PipeResult;
}

/// Caller-supplied keep/drop decision for the `filter` step.
///
/// Reference counted so a built query program stays cheap to move around.
#[derive(Clone)]
pub struct StepPredicate(Rc<dyn Fn(&Vertex, &Gremlin) -> bool>);

impl StepPredicate {
    pub fn new(predicate: impl Fn(&Vertex, &Gremlin) -> bool + 'static) -> Self {
        StepPredicate(Rc::new(predicate))
    }

    pub(crate) fn test(&self, vertex: &Vertex, gremlin: &Gremlin) -> bool {
        (self.0)(vertex, gremlin)
    }
}

impl fmt::Debug for StepPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepPredicate(..)")
    }
}

/// Argument vocabulary for query steps.
///
/// The typed builder methods always construct the shape a built-in expects.
/// The generic escape hatch can construct anything; a built-in handed
/// arguments it cannot use degrades to the transparent fallback.
#[derive(Debug, Clone)]
pub enum StepArg {
    /// Vertex selector, for `vertex`
    Selector(VertexSelector),
    /// Edge filter, for `out` / `in`
    Filter(EdgeFilter),
    /// A name: property key or bookmark label
    Str(String),
    /// Several bookmark labels, for `merge`
    Strs(Vec<String>),
    /// Property selector, for `filter`
    Props(PropertyMap),
    /// Predicate, for `filter`
    Predicate(StepPredicate),
    /// Count, for `take`
    Count(usize),
}

/// Factory producing a fresh step instance for one run.
pub type StepFactory = Box<dyn Fn(&[StepArg]) -> Box<dyn PipeStep>>;

/// Registry mapping step names to factories.
///
/// [`Pipetypes::default`] carries the built-in catalog; [`register`] adds or
/// replaces entries. The catalog is explicit state handed to each query (via
/// `with_pipetypes`) rather than a process-wide global.
///
/// [`register`]: Pipetypes::register
pub struct Pipetypes {
    registry: IndexMap<String, StepFactory>,
}

impl Pipetypes {
    /// Catalog with no registrations at all; usually you want `default()`
    pub fn empty() -> Self {
        Pipetypes {
            registry: IndexMap::new(),
        }
    }

    /// Register a step under `name`, replacing any previous registration
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&[StepArg]) -> Box<dyn PipeStep> + 'static,
    ) {
        let name = name.into();
        debug!("Registered pipetype {}", name);
        self.registry.insert(name, Box::new(factory));
    }

    /// Registered step names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// True if a step is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Build the step instance for one program step.
    ///
    /// An unregistered name degrades to the transparent fallback.
    pub(crate) fn instantiate(&self, name: &str, args: &[StepArg]) -> Box<dyn PipeStep> {
        match self.registry.get(name) {
            Some(factory) => factory(args),
            None => {
                warn!("Unrecognized pipetype: {}", name);
                Box::new(FauxStep)
            }
        }
    }
}

impl Default for Pipetypes {
    fn default() -> Self {
        let mut catalog = Pipetypes::empty();
        catalog.register("vertex", |args| Box::new(VertexStep::from_args(args)));
        catalog.register("out", |args| {
            Box::new(TraverseStep::new(Direction::Out, args))
        });
        catalog.register("in", |args| {
            Box::new(TraverseStep::new(Direction::In, args))
        });
        catalog.register("property", |args| match first_str(args) {
            Some(key) => Box::new(PropertyStep { key }) as Box<dyn PipeStep>,
            None => degraded("property"),
        });
        catalog.register("unique", |_args| {
            Box::new(UniqueStep {
                seen: FxHashSet::default(),
            })
        });
        catalog.register("filter", |args| {
            for arg in args {
                match arg {
                    StepArg::Props(selector) => {
                        return Box::new(FilterStep {
                            mode: FilterMode::Props(selector.clone()),
                        }) as Box<dyn PipeStep>
                    }
                    StepArg::Predicate(predicate) => {
                        return Box::new(FilterStep {
                            mode: FilterMode::Predicate(predicate.clone()),
                        }) as Box<dyn PipeStep>
                    }
                    _ => {}
                }
            }
            // Preserved leniency: a filter that cannot filter lets
            // everything through rather than failing the query.
            warn!("Invalid filter argument, gremlins pass through unfiltered");
            Box::new(FauxStep)
        });
        catalog.register("take", |args| {
            let limit = args.iter().find_map(|arg| match arg {
                StepArg::Count(n) => Some(*n),
                _ => None,
            });
            match limit {
                Some(limit) => Box::new(TakeStep { limit, taken: 0 }) as Box<dyn PipeStep>,
                None => degraded("take"),
            }
        });
        catalog.register("as", |args| match first_str(args) {
            Some(label) => Box::new(AsStep { label }) as Box<dyn PipeStep>,
            None => degraded("as"),
        });
        catalog.register("back", |args| match first_str(args) {
            Some(label) => Box::new(BackStep { label }) as Box<dyn PipeStep>,
            None => degraded("back"),
        });
        catalog.register("except", |args| match first_str(args) {
            Some(label) => Box::new(ExceptStep { label }) as Box<dyn PipeStep>,
            None => degraded("except"),
        });
        catalog.register("merge", |args| {
            let labels = label_args(args);
            if labels.is_empty() {
                degraded("merge")
            } else {
                Box::new(MergeStep {
                    labels,
                    backlog: None,
                    seed: LabelState::new(),
                })
            }
        });
        catalog
    }
}

fn first_str(args: &[StepArg]) -> Option<String> {
    args.iter().find_map(|arg| match arg {
        StepArg::Str(s) => Some(s.clone()),
        _ => None,
    })
}

fn label_args(args: &[StepArg]) -> Vec<String> {
    let mut labels = Vec::new();
    for arg in args {
        match arg {
            StepArg::Str(s) => labels.push(s.clone()),
            StepArg::Strs(list) => labels.extend(list.iter().cloned()),
            _ => {}
        }
    }
    labels
}

fn degraded(name: &str) -> Box<dyn PipeStep> {
    warn!(
        "Pipetype {} given no usable argument, step degraded to pass-through",
        name
    );
    Box::new(FauxStep)
}

/// Transparent stand-in for an unregistered or unusable step: forwards its
/// input untouched, otherwise asks upstream for more.
struct FauxStep;

impl PipeStep for FauxStep {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        match input {
            Some(gremlin) => PipeResult::Gremlin(gremlin),
            None => PipeResult::Pull,
        }
    }
}

/// Seeds a run: materializes the selector's matches once, then hands out
/// one gremlin per call until the backlog is empty.
struct VertexStep {
    selector: VertexSelector,
    backlog: Option<Vec<VertexIx>>,
}

impl VertexStep {
    fn from_args(args: &[StepArg]) -> Self {
        let selector = args
            .iter()
            .find_map(|arg| match arg {
                StepArg::Selector(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_default();
        VertexStep {
            selector,
            backlog: None,
        }
    }
}

impl PipeStep for VertexStep {
    fn step(&mut self, graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        let backlog = self.backlog.get_or_insert_with(|| {
            // Reversed so pop() hands out matches in insertion order
            let mut slots = graph.resolve_selector(&self.selector);
            slots.reverse();
            slots
        });
        match backlog.pop() {
            Some(vertex) => {
                // Mid-pipeline (after a merge) the minted gremlin continues
                // the caller's lineage; at the head it starts a fresh one.
                let state = input.map(|g| g.state).unwrap_or_default();
                PipeResult::Gremlin(Gremlin::new(vertex, state))
            }
            None => PipeResult::Done,
        }
    }
}

enum Direction {
    Out,
    In,
}

/// Walks one hop along edges: `out` follows edges leaving the current
/// vertex, `in` follows edges arriving at it. Queries the adjacency once per
/// input gremlin, then drains one neighbor per call.
struct TraverseStep {
    direction: Direction,
    filter: EdgeFilter,
    /// Pending other-endpoints for the saved gremlin
    queue: Vec<VertexIx>,
    /// The input whose neighbors are being emitted
    source: Option<Gremlin>,
}

impl TraverseStep {
    fn new(direction: Direction, args: &[StepArg]) -> Self {
        let filter = args
            .iter()
            .find_map(|arg| match arg {
                StepArg::Filter(f) => Some(f.clone()),
                _ => None,
            })
            .unwrap_or_default();
        TraverseStep {
            direction,
            filter,
            queue: Vec::new(),
            source: None,
        }
    }
}

impl PipeStep for TraverseStep {
    fn step(&mut self, graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        if self.queue.is_empty() {
            let gremlin = match input {
                Some(g) => g,
                None => return PipeResult::Pull,
            };
            // Reversed so pop() emits neighbors in adjacency order
            self.queue = match self.direction {
                Direction::Out => graph
                    .out_edges_at(gremlin.vertex, &self.filter)
                    .iter()
                    .rev()
                    .map(|edge| edge.target)
                    .collect(),
                Direction::In => graph
                    .in_edges_at(gremlin.vertex, &self.filter)
                    .iter()
                    .rev()
                    .map(|edge| edge.source)
                    .collect(),
            };
            self.source = Some(gremlin);
        }
        match self.queue.pop() {
            Some(vertex) => match &self.source {
                Some(gremlin) => PipeResult::Gremlin(gremlin.goto(vertex)),
                None => PipeResult::Pull,
            },
            None => PipeResult::Pull,
        }
    }
}

/// Swaps the gremlin's payload for one of its vertex's property values.
struct PropertyStep {
    key: String,
}

impl PipeStep for PropertyStep {
    fn step(&mut self, graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        let mut gremlin = match input {
            Some(g) => g,
            None => return PipeResult::Pull,
        };
        match graph.vertex_at(gremlin.vertex).property(&self.key) {
            // A stored Null counts as absent, same as a missing key
            Some(value) if !value.is_null() => {
                gremlin.result = Some(value.clone());
                PipeResult::Gremlin(gremlin)
            }
            _ => PipeResult::Reject,
        }
    }
}

/// Drops every gremlin whose vertex was already seen this run.
struct UniqueStep {
    seen: FxHashSet<VertexIx>,
}

impl PipeStep for UniqueStep {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        let gremlin = match input {
            Some(g) => g,
            None => return PipeResult::Pull,
        };
        if self.seen.insert(gremlin.vertex) {
            PipeResult::Gremlin(gremlin)
        } else {
            PipeResult::Reject
        }
    }
}

enum FilterMode {
    Props(PropertyMap),
    Predicate(StepPredicate),
}

/// Keeps gremlins whose vertex satisfies a property selector or predicate.
struct FilterStep {
    mode: FilterMode,
}

impl PipeStep for FilterStep {
    fn step(&mut self, graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        let gremlin = match input {
            Some(g) => g,
            None => return PipeResult::Pull,
        };
        let vertex = graph.vertex_at(gremlin.vertex);
        let keep = match &self.mode {
            FilterMode::Props(selector) => matches_selector(&vertex.properties, selector),
            FilterMode::Predicate(predicate) => predicate.test(vertex, &gremlin),
        };
        if keep {
            PipeResult::Gremlin(gremlin)
        } else {
            PipeResult::Reject
        }
    }
}

/// Caps how many gremlins pass through, then reports exhaustion.
struct TakeStep {
    limit: usize,
    taken: usize,
}

impl PipeStep for TakeStep {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        if self.taken == self.limit {
            // Counter resets on exhaustion, so the state is reusable
            self.taken = 0;
            return PipeResult::Done;
        }
        let gremlin = match input {
            Some(g) => g,
            None => return PipeResult::Pull,
        };
        self.taken += 1;
        PipeResult::Gremlin(gremlin)
    }
}

/// Bookmarks the current vertex in the gremlin's lineage state.
struct AsStep {
    label: String,
}

impl PipeStep for AsStep {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        let gremlin = match input {
            Some(g) => g,
            None => return PipeResult::Pull,
        };
        gremlin.state.set(self.label.as_str(), gremlin.vertex);
        PipeResult::Gremlin(gremlin)
    }
}

/// Teleports the gremlin back to a bookmarked vertex.
struct BackStep {
    label: String,
}

impl PipeStep for BackStep {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        let gremlin = match input {
            Some(g) => g,
            None => return PipeResult::Pull,
        };
        match gremlin.state.get(&self.label) {
            Some(vertex) => PipeResult::Gremlin(gremlin.goto(vertex)),
            // Never bookmarked: this token has nowhere to go back to
            None => PipeResult::Reject,
        }
    }
}

/// Drops gremlins standing on a bookmarked vertex.
struct ExceptStep {
    label: String,
}

impl PipeStep for ExceptStep {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        let gremlin = match input {
            Some(g) => g,
            None => return PipeResult::Pull,
        };
        if gremlin.state.get(&self.label) == Some(gremlin.vertex) {
            PipeResult::Reject
        } else {
            PipeResult::Gremlin(gremlin)
        }
    }
}

/// Re-roots the pipeline at bookmarked vertices, one gremlin per call.
///
/// Each input gremlin seeds a backlog from its bookmarks, in argument order;
/// labels never bookmarked are dropped. Every gremlin minted from one
/// backlog shares the seeding input's lineage.
struct MergeStep {
    labels: Vec<String>,
    /// None until the first input arrives
    backlog: Option<Vec<VertexIx>>,
    /// Lineage shared by every gremlin minted from the current backlog
    seed: LabelState,
}

impl PipeStep for MergeStep {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        if self.backlog.is_none() && input.is_none() {
            return PipeResult::Pull;
        }
        let drained = self.backlog.as_ref().map_or(true, |b| b.is_empty());
        if drained {
            if let Some(gremlin) = input {
                // Reversed so pop() emits bookmarks in argument order
                let mut slots: Vec<VertexIx> = self
                    .labels
                    .iter()
                    .filter_map(|label| gremlin.state.get(label))
                    .collect();
                slots.reverse();
                self.backlog = Some(slots);
                self.seed = gremlin.state;
            }
        }
        match self.backlog.as_mut().and_then(|b| b.pop()) {
            Some(vertex) => PipeResult::Gremlin(Gremlin::new(vertex, self.seed.clone())),
            None => PipeResult::Pull,
        }
    }
}
