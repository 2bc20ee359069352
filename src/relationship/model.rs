//! Relationship operation results and graph shapes.

use crate::context::{ContextRef, RelationshipEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Options for `add_relationship`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOptions {
    /// Skip relationship-type and target-type validation
    #[serde(default)]
    pub force: bool,
}

impl AddOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// Which edges `get_relationships` reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_outgoing(&self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }

    pub fn includes_incoming(&self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipResult {
    pub source: ContextRef,
    pub target: ContextRef,
    pub relationship: String,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalResult {
    pub source: String,
    pub target: String,
    pub relationship: String,
    /// Whether the source actually held the edge
    pub removed: bool,
}

/// An edge pointing at the queried context, found on another context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEdge {
    pub source: String,
    pub source_type: String,
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// Edges of one context grouped by relationship type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipView {
    pub context_id: String,
    pub outgoing: BTreeMap<String, Vec<RelationshipEntry>>,
    pub incoming: BTreeMap<String, Vec<IncomingEdge>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub context_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hops from the nearest start node that reached it first
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relationship: String,
    pub properties: Map<String, Value>,
}

/// Result of a bounded-depth traversal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipGraph {
    pub nodes: BTreeMap<String, GraphNode>,
    /// In discovery order; a node's edges are visited by relationship type name,
    /// then by insertion order within a type
    pub edges: Vec<GraphEdge>,
}

impl RelationshipGraph {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Deepest node depth, if any node was reached.
    pub fn max_depth(&self) -> Option<usize> {
        self.nodes.values().map(|n| n.depth).max()
    }
}
