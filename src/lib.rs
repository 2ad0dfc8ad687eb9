//! Gremlite
//!
//! An embeddable, in-memory property graph with a lazily-evaluated,
//! gremlin-style traversal query language.
//!
//! # Features
//!
//! - Property graph model: vertices and directed edges, both with open,
//!   schema-free property maps; optional edge labels
//! - Explicit or auto-assigned vertex identifiers with O(1) lookup
//! - Chainable query builder over a catalog of traversal steps (pipetypes):
//!   `out`, `in`, `property`, `unique`, `filter`, `take`, `as`, `back`,
//!   `except`, `merge`
//! - Demand-driven evaluation: results are produced one at a time, on
//!   request, with nothing computed past what the consumer asked for
//! - Custom pipetypes, registered per query through an explicit catalog
//! - Everything in process and single threaded; no server, no persistence
//!
//! # Example Usage
//!
//! ```rust
//! use gremlite::{EdgeRecord, GraphStore, VertexRecord};
//!
//! let mut graph = GraphStore::new();
//! graph.add_vertex(VertexRecord::with_id("odin")).unwrap();
//! graph
//!     .add_vertex(VertexRecord::with_id("thor").property("weapon", "Mjolnir"))
//!     .unwrap();
//! graph.add_vertex(VertexRecord::with_id("magni")).unwrap();
//! graph.add_edge(EdgeRecord::new("odin", "thor").label("parent")).unwrap();
//! graph.add_edge(EdgeRecord::new("thor", "magni").label("parent")).unwrap();
//!
//! // Grandchildren of odin, evaluated lazily
//! let grandchildren: Vec<String> = graph
//!     .start_at("odin")
//!     .out("parent")
//!     .out("parent")
//!     .run()
//!     .filter_map(|r| r.as_vertex().map(|v| v.id.to_string()))
//!     .collect();
//! assert_eq!(grandchildren, vec!["magni"]);
//! ```

#![warn(clippy::all)]

pub mod graph;
pub mod query;

// Re-export main types for convenience
pub use graph::{
    Edge, EdgeEnd, EdgeFilter, EdgeRecord, GraphError, GraphResult, GraphStore, Label,
    PropertyMap, PropertyValue, Vertex, VertexId, VertexIx, VertexRecord, VertexSelector,
};

pub use query::{
    Gremlin, LabelState, PipeResult, PipeStep, Pipetypes, Query, QueryValue, Run, Step, StepArg,
    StepPredicate,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
