//! Edge representation, input records and traversal filters
//!
//! Edges are directed, optionally labeled, and carry their own property map.
//! They are addressed only through the adjacency lists of their endpoint
//! vertices; there is no external edge identifier.

use serde::{Deserialize, Serialize};

use super::property::{matches_selector, PropertyMap, PropertyValue};
use super::types::{Label, VertexId, VertexIx};

/// A directed edge as stored in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Optional label naming the relationship
    pub label: Option<Label>,
    /// Open property map
    pub properties: PropertyMap,
    /// Slot of the vertex this edge leaves
    #[serde(skip)]
    pub(crate) source: VertexIx,
    /// Slot of the vertex this edge points at
    #[serde(skip)]
    pub(crate) target: VertexIx,
}

impl Edge {
    /// Label, if the edge has one
    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Look up a property value by name
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub(crate) fn matches(&self, filter: &EdgeFilter) -> bool {
        match filter {
            EdgeFilter::Any => true,
            EdgeFilter::Label(label) => self.label.as_ref() == Some(label),
            EdgeFilter::Labels(labels) => match &self.label {
                Some(label) => labels.contains(label),
                None => false,
            },
            EdgeFilter::Props(selector) => matches_selector(&self.properties, selector),
        }
    }
}

/// Input record for creating an edge.
///
/// Uses the `_out` / `_in` / `_label` field names in its serialized form, so
/// external JSON like `{"_out": "alice", "_in": "bob", "_label": "knows"}`
/// loads directly. Remaining fields become edge properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Identifier of the vertex the edge leaves
    #[serde(rename = "_out")]
    pub source: VertexId,
    /// Identifier of the vertex the edge points at
    #[serde(rename = "_in")]
    pub target: VertexId,
    /// Optional relationship label
    #[serde(rename = "_label", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    /// Properties to attach
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl EdgeRecord {
    /// Unlabeled edge between two vertex identifiers
    pub fn new(source: impl Into<VertexId>, target: impl Into<VertexId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
            properties: PropertyMap::new(),
        }
    }

    /// Set the relationship label (builder style)
    pub fn label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach a property (builder style)
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Filter applied to edges during `out` / `in` traversal.
///
/// Converts from the argument shapes traversals accept: nothing, a single
/// label, a list of labels, or a property selector.
#[derive(Debug, Clone, Default)]
pub enum EdgeFilter {
    /// Accept every edge
    #[default]
    Any,
    /// Accept edges carrying exactly this label
    Label(Label),
    /// Accept edges whose label is any of these
    Labels(Vec<Label>),
    /// Accept edges whose properties match every selector entry
    Props(PropertyMap),
}

impl From<()> for EdgeFilter {
    fn from(_: ()) -> Self {
        EdgeFilter::Any
    }
}

impl From<&str> for EdgeFilter {
    fn from(label: &str) -> Self {
        EdgeFilter::Label(Label::new(label))
    }
}

impl From<String> for EdgeFilter {
    fn from(label: String) -> Self {
        EdgeFilter::Label(Label::new(label))
    }
}

impl From<Label> for EdgeFilter {
    fn from(label: Label) -> Self {
        EdgeFilter::Label(label)
    }
}

impl<const N: usize> From<[&str; N]> for EdgeFilter {
    fn from(labels: [&str; N]) -> Self {
        EdgeFilter::Labels(labels.iter().copied().map(Label::new).collect())
    }
}

impl From<Vec<Label>> for EdgeFilter {
    fn from(labels: Vec<Label>) -> Self {
        EdgeFilter::Labels(labels)
    }
}

impl From<PropertyMap> for EdgeFilter {
    fn from(selector: PropertyMap) -> Self {
        EdgeFilter::Props(selector)
    }
}
