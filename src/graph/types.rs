//! Core type definitions for the graph store

use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing identifier for a vertex.
///
/// Identifiers are either integers (the form the auto-assigning counter
/// produces) or strings. They are unique within one [`GraphStore`] and are
/// never reassigned.
///
/// [`GraphStore`]: crate::graph::GraphStore
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VertexId {
    Int(i64),
    Str(String),
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexId::Int(i) => write!(f, "{}", i),
            VertexId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for VertexId {
    fn from(id: i64) -> Self {
        VertexId::Int(id)
    }
}

impl From<i32> for VertexId {
    fn from(id: i32) -> Self {
        VertexId::Int(id as i64)
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self {
        VertexId::Str(id.to_string())
    }
}

impl From<String> for VertexId {
    fn from(id: String) -> Self {
        VertexId::Str(id)
    }
}

/// Stable arena slot of a vertex within one [`GraphStore`].
///
/// Slots are assigned at insertion and never move (there is no deletion API),
/// so a `VertexIx` stays valid for the lifetime of the store it came from.
/// Gremlins carry their current position as a `VertexIx`; resolve it back to
/// the vertex with [`GraphStore::vertex_at`].
///
/// [`GraphStore`]: crate::graph::GraphStore
/// [`GraphStore::vertex_at`]: crate::graph::GraphStore::vertex_at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIx(pub(crate) usize);

impl VertexIx {
    /// Position of the vertex in the store's insertion order.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexIx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexIx({})", self.0)
    }
}

/// Arena slot of an edge. Edges have no user-facing identifier and are found
/// only through adjacency traversal, so this stays crate-private.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct EdgeIx(pub(crate) usize);

/// Edge label (e.g. "knows", "works_at").
///
/// Labels are optional on edges; an unlabeled edge matches the no-filter
/// traversal but never a specific label filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}
