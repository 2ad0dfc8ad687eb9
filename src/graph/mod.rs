//! Property graph data model and storage
//!
//! This module implements the in-memory property graph:
//! - Vertices with open property maps and explicit or auto-assigned ids
//! - Directed edges with optional labels and properties
//! - Arena storage with an id index and per-vertex adjacency lists

pub mod edge;
pub mod property;
pub mod store;
pub mod types;
pub mod vertex;

// Re-export main types
pub use edge::{Edge, EdgeFilter, EdgeRecord};
pub use property::{PropertyMap, PropertyValue};
pub use store::{EdgeEnd, GraphError, GraphResult, GraphStore, VertexSelector};
pub use types::{Label, VertexId, VertexIx};
pub use vertex::{Vertex, VertexRecord};
