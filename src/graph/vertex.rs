//! Vertex representation and input records
//!
//! Stored vertices carry adjacency lists of slot indices so that traversal
//! never searches the edge table. Callers build [`VertexRecord`]s; the store
//! turns them into [`Vertex`] entries and owns the index bookkeeping.

use serde::{Deserialize, Serialize};

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeIx, VertexId};

/// A vertex as stored in the graph.
///
/// The adjacency lists are maintained by the store when edges are added and
/// are not part of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// External identifier, unique within the graph
    pub id: VertexId,
    /// Open property map
    pub properties: PropertyMap,
    /// Slots of edges leaving this vertex
    #[serde(skip)]
    pub(crate) out_edges: Vec<EdgeIx>,
    /// Slots of edges arriving at this vertex
    #[serde(skip)]
    pub(crate) in_edges: Vec<EdgeIx>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, properties: PropertyMap) -> Self {
        Self {
            id,
            properties,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    /// Look up a property value by name
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Set a property, replacing any previous value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }
}

/// Input record for creating a vertex.
///
/// Deserializes from a flat map in which `_id` names the identifier and every
/// other field becomes a property, so external JSON like
/// `{"_id": "alice", "age": 30}` loads directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Identifier to assign; when absent the store generates one
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VertexId>,
    /// Properties to attach
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl VertexRecord {
    /// Record with no identifier; the store will generate one
    pub fn new() -> Self {
        Self::default()
    }

    /// Record with an explicit identifier
    pub fn with_id(id: impl Into<VertexId>) -> Self {
        Self {
            id: Some(id.into()),
            properties: PropertyMap::new(),
        }
    }

    /// Attach a property (builder style)
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
