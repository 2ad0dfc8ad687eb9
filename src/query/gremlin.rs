//! Traversal tokens and their shared bookmark state
//!
//! A gremlin marks one position in the graph while a query runs. Pipetypes
//! move gremlins from vertex to vertex, attach property results to them, and
//! record bookmarks in the label-state that later steps read back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::graph::{PropertyValue, VertexIx};

/// Bookmark map shared across one traversal lineage.
///
/// `Clone` is shallow: every clone is a handle to the same underlying map.
/// This aliasing is load-bearing. A bookmark recorded through any handle (the
/// `as` step) is visible through every other handle of the lineage, which is
/// how `back`, `merge` and `except` recover checkpoints set on an ancestor
/// gremlin. Do not replace the sharing with a deep copy.
///
/// Interior mutability via `Rc<RefCell<..>>` keeps the whole query machinery
/// single threaded, which matches the evaluation model: one run, one thread,
/// no suspension.
#[derive(Debug, Clone, Default)]
pub struct LabelState {
    labels: Rc<RefCell<HashMap<String, VertexIx>>>,
}

impl LabelState {
    /// Fresh, empty bookmark map (a new lineage)
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `vertex` under `label`, replacing any previous bookmark
    pub fn set(&self, label: impl Into<String>, vertex: VertexIx) {
        self.labels.borrow_mut().insert(label.into(), vertex);
    }

    /// Look up the bookmark recorded under `label`
    pub fn get(&self, label: &str) -> Option<VertexIx> {
        self.labels.borrow().get(label).copied()
    }
}

/// A traversal token: one position in the graph, plus lineage bookmarks and
/// an optional property result attached by the `property` pipetype.
#[derive(Debug, Clone)]
pub struct Gremlin {
    /// Current position
    pub vertex: VertexIx,
    /// Bookmarks shared with the rest of this gremlin's lineage
    pub state: LabelState,
    /// Property value carried to the consumer instead of the vertex
    pub result: Option<PropertyValue>,
}

impl Gremlin {
    /// Token at `vertex` joining the lineage of `state`
    pub fn new(vertex: VertexIx, state: LabelState) -> Self {
        Gremlin {
            vertex,
            state,
            result: None,
        }
    }

    /// Derived token at a new position.
    ///
    /// The bookmark map is shared with `self`, not copied; any carried
    /// property result is dropped.
    pub fn goto(&self, vertex: VertexIx) -> Gremlin {
        Gremlin::new(vertex, self.state.clone())
    }
}
