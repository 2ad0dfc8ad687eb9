//! In-memory graph storage
//!
//! Owns all vertices and edges for one graph:
//! - vertices: arena `Vec<Vertex>`, slot = `VertexIx`
//! - edges: arena `Vec<Edge>`, addressed only through vertex adjacency
//! - index: `VertexId -> VertexIx` for O(1) identifier lookup
//!
//! There is no deletion API, so arena slots stay valid for the lifetime of
//! the store. Mutation failures are reported through `tracing` and returned
//! as [`GraphError`]; a failed mutation never leaves the store partially
//! updated.

use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use super::edge::{Edge, EdgeFilter, EdgeRecord};
use super::property::{matches_selector, PropertyMap};
use super::types::{EdgeIx, VertexId, VertexIx};
use super::vertex::{Vertex, VertexRecord};

/// Which endpoint of an edge record failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    /// The `_out` endpoint (the vertex the edge leaves)
    Out,
    /// The `_in` endpoint (the vertex the edge points at)
    In,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeEnd::Out => write!(f, "out"),
            EdgeEnd::In => write!(f, "in"),
        }
    }
}

/// Errors that can occur during graph mutation
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Vertex id {0} already exists")]
    DuplicateVertexId(VertexId),

    #[error("Invalid edge: {end} vertex {id} was not found")]
    DanglingEdgeEndpoint { end: EdgeEnd, id: VertexId },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Selector argument accepted by vertex lookups and by `start_at`.
///
/// Converts from the argument shapes lookups accept: nothing (all vertices),
/// one or more identifiers, or a property selector.
#[derive(Debug, Clone, Default)]
pub enum VertexSelector {
    /// Every vertex, in insertion order
    #[default]
    All,
    /// The vertices with these identifiers, misses dropped
    Ids(Vec<VertexId>),
    /// Vertices whose properties match every selector entry
    Props(PropertyMap),
}

impl From<()> for VertexSelector {
    fn from(_: ()) -> Self {
        VertexSelector::All
    }
}

impl From<VertexId> for VertexSelector {
    fn from(id: VertexId) -> Self {
        VertexSelector::Ids(vec![id])
    }
}

impl From<&str> for VertexSelector {
    fn from(id: &str) -> Self {
        VertexSelector::Ids(vec![id.into()])
    }
}

impl From<String> for VertexSelector {
    fn from(id: String) -> Self {
        VertexSelector::Ids(vec![id.into()])
    }
}

impl From<i64> for VertexSelector {
    fn from(id: i64) -> Self {
        VertexSelector::Ids(vec![id.into()])
    }
}

impl From<i32> for VertexSelector {
    fn from(id: i32) -> Self {
        VertexSelector::Ids(vec![id.into()])
    }
}

impl From<Vec<VertexId>> for VertexSelector {
    fn from(ids: Vec<VertexId>) -> Self {
        VertexSelector::Ids(ids)
    }
}

impl<T: Into<VertexId>, const N: usize> From<[T; N]> for VertexSelector {
    fn from(ids: [T; N]) -> Self {
        VertexSelector::Ids(ids.into_iter().map(Into::into).collect())
    }
}

impl From<PropertyMap> for VertexSelector {
    fn from(selector: PropertyMap) -> Self {
        VertexSelector::Props(selector)
    }
}

/// In-memory property graph
///
/// Uses arena storage with an identifier index:
/// - vertices: Vec<Vertex> (slot = VertexIx, assigned at insertion)
/// - edges: Vec<Edge> (reachable only via vertex adjacency lists)
/// - index: VertexId -> VertexIx (O(1) lookup)
#[derive(Debug)]
pub struct GraphStore {
    /// Vertex arena
    vertices: Vec<Vertex>,

    /// Edge arena
    edges: Vec<Edge>,

    /// Identifier index
    index: FxHashMap<VertexId, VertexIx>,

    /// Next auto-assigned integer identifier
    next_id: i64,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            vertices: Vec::new(),
            edges: Vec::new(),
            index: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// Build a graph from vertex and edge records.
    ///
    /// Insertion failures (duplicate ids, dangling endpoints) are logged and
    /// skipped; they never abort the batch.
    pub fn from_records(
        vertices: impl IntoIterator<Item = VertexRecord>,
        edges: impl IntoIterator<Item = EdgeRecord>,
    ) -> Self {
        let mut graph = GraphStore::new();
        graph.add_vertices(vertices);
        graph.add_edges(edges);
        graph
    }

    /// Insert one vertex, assigning an identifier if the record carries none.
    ///
    /// Auto-assignment consumes a counter value even when the insert then
    /// fails on a collision; explicit-id failures never touch the counter.
    pub fn add_vertex(&mut self, record: VertexRecord) -> GraphResult<VertexId> {
        let id = match record.id {
            Some(id) => id,
            None => {
                let id = VertexId::Int(self.next_id);
                self.next_id += 1;
                id
            }
        };

        if self.index.contains_key(&id) {
            let err = GraphError::DuplicateVertexId(id);
            warn!("{}", err);
            return Err(err);
        }

        let ix = VertexIx(self.vertices.len());
        self.vertices.push(Vertex::new(id.clone(), record.properties));
        self.index.insert(id.clone(), ix);
        debug!("Added vertex {} at slot {}", id, ix.index());
        Ok(id)
    }

    /// Insert many vertices; failures are logged and skipped.
    ///
    /// Returns the identifiers of the vertices actually inserted.
    pub fn add_vertices(&mut self, records: impl IntoIterator<Item = VertexRecord>) -> Vec<VertexId> {
        records
            .into_iter()
            .filter_map(|record| self.add_vertex(record).ok())
            .collect()
    }

    /// Insert one edge, resolving both endpoint identifiers.
    ///
    /// If either endpoint is missing nothing is mutated. The `_in` endpoint
    /// resolves first, so an edge with both endpoints missing reports the
    /// in side.
    pub fn add_edge(&mut self, record: EdgeRecord) -> GraphResult<()> {
        let target = match self.index.get(&record.target) {
            Some(&ix) => ix,
            None => {
                let err = GraphError::DanglingEdgeEndpoint {
                    end: EdgeEnd::In,
                    id: record.target,
                };
                warn!("{}", err);
                return Err(err);
            }
        };
        let source = match self.index.get(&record.source) {
            Some(&ix) => ix,
            None => {
                let err = GraphError::DanglingEdgeEndpoint {
                    end: EdgeEnd::Out,
                    id: record.source,
                };
                warn!("{}", err);
                return Err(err);
            }
        };

        let eix = EdgeIx(self.edges.len());
        self.edges.push(Edge {
            label: record.label,
            properties: record.properties,
            source,
            target,
        });
        self.vertices[source.0].out_edges.push(eix);
        self.vertices[target.0].in_edges.push(eix);
        debug!(
            "Added edge {} -> {}",
            self.vertices[source.0].id, self.vertices[target.0].id
        );
        Ok(())
    }

    /// Insert many edges; failures are logged and skipped.
    ///
    /// Returns how many edges were actually inserted.
    pub fn add_edges(&mut self, records: impl IntoIterator<Item = EdgeRecord>) -> usize {
        records
            .into_iter()
            .filter_map(|record| self.add_edge(record).ok())
            .count()
    }

    /// Look up a vertex by identifier
    pub fn find_vertex_by_id(&self, id: &VertexId) -> Option<&Vertex> {
        self.index.get(id).map(|&ix| &self.vertices[ix.0])
    }

    /// Look up many vertices by identifier, preserving input order and
    /// duplicates; missing identifiers are dropped.
    pub fn find_vertices_by_ids(&self, ids: &[VertexId]) -> Vec<&Vertex> {
        ids.iter()
            .filter_map(|id| self.find_vertex_by_id(id))
            .collect()
    }

    /// Find vertices by selector.
    ///
    /// The returned vector is freshly allocated; reordering or truncating it
    /// never affects the store.
    pub fn find_vertices(&self, selector: &VertexSelector) -> Vec<&Vertex> {
        match selector {
            VertexSelector::All => self.vertices.iter().collect(),
            VertexSelector::Ids(ids) => self.find_vertices_by_ids(ids),
            VertexSelector::Props(props) => self
                .vertices
                .iter()
                .filter(|v| matches_selector(&v.properties, props))
                .collect(),
        }
    }

    /// Resolve a selector to arena slots, for seeding traversals.
    pub(crate) fn resolve_selector(&self, selector: &VertexSelector) -> Vec<VertexIx> {
        match selector {
            VertexSelector::All => (0..self.vertices.len()).map(VertexIx).collect(),
            VertexSelector::Ids(ids) => ids
                .iter()
                .filter_map(|id| self.index.get(id).copied())
                .collect(),
            VertexSelector::Props(props) => self
                .vertices
                .iter()
                .enumerate()
                .filter(|(_, v)| matches_selector(&v.properties, props))
                .map(|(i, _)| VertexIx(i))
                .collect(),
        }
    }

    /// Edges leaving the vertex with this identifier, filtered
    pub fn out_edges(&self, id: &VertexId, filter: &EdgeFilter) -> Vec<&Edge> {
        match self.index.get(id) {
            Some(&ix) => self.out_edges_at(ix, filter),
            None => Vec::new(),
        }
    }

    /// Edges arriving at the vertex with this identifier, filtered
    pub fn in_edges(&self, id: &VertexId, filter: &EdgeFilter) -> Vec<&Edge> {
        match self.index.get(id) {
            Some(&ix) => self.in_edges_at(ix, filter),
            None => Vec::new(),
        }
    }

    pub(crate) fn out_edges_at(&self, ix: VertexIx, filter: &EdgeFilter) -> Vec<&Edge> {
        self.vertices[ix.0]
            .out_edges
            .iter()
            .map(|&e| &self.edges[e.0])
            .filter(|e| e.matches(filter))
            .collect()
    }

    pub(crate) fn in_edges_at(&self, ix: VertexIx, filter: &EdgeFilter) -> Vec<&Edge> {
        self.vertices[ix.0]
            .in_edges
            .iter()
            .map(|&e| &self.edges[e.0])
            .filter(|e| e.matches(filter))
            .collect()
    }

    /// Resolve an arena slot back to its vertex.
    ///
    /// Slots are only minted by the store they index into; passing a slot
    /// obtained from a different store may panic or return an unrelated
    /// vertex.
    pub fn vertex_at(&self, ix: VertexIx) -> &Vertex {
        &self.vertices[ix.0]
    }

    /// Mutable access to a vertex by identifier, for property updates
    pub fn vertex_mut(&mut self, id: &VertexId) -> Option<&mut Vertex> {
        let ix = *self.index.get(id)?;
        Some(&mut self.vertices[ix.0])
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True if the graph holds no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// All vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
