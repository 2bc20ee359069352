//! Bounded-depth relationship traversal.
//!
//! Depth-first from each start node in turn, over a snapshot of the store. One
//! visited set is shared by all start nodes, so a node is expanded at most once per
//! query and its recorded depth is the one it was first reached at. Edges are
//! recorded whenever they are followed, including edges to visited or missing nodes;
//! nothing is followed from a node at `max_depth`.

use super::model::{GraphEdge, GraphNode, RelationshipGraph};
use crate::context::Context;
use std::collections::{HashMap, HashSet};

/// Traverse `snapshot` from `start_ids`, following only `types` (all when empty).
pub fn traverse(
    snapshot: &[Context],
    start_ids: &[String],
    types: &[String],
    max_depth: usize,
) -> RelationshipGraph {
    let mut index: HashMap<&str, &Context> = HashMap::with_capacity(snapshot.len());
    for context in snapshot {
        // first document in path order wins, like a by-id lookup
        index.entry(context.id.as_str()).or_insert(context);
    }

    let mut traversal = Traversal {
        index,
        types,
        max_depth,
        visited: HashSet::new(),
        graph: RelationshipGraph::default(),
    };
    for id in start_ids {
        traversal.visit(id, 0);
    }
    traversal.graph
}

struct Traversal<'a> {
    index: HashMap<&'a str, &'a Context>,
    types: &'a [String],
    max_depth: usize,
    visited: HashSet<String>,
    graph: RelationshipGraph,
}

impl Traversal<'_> {
    fn follows(&self, relationship: &str) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t == relationship)
    }

    fn visit(&mut self, id: &str, depth: usize) {
        if depth > self.max_depth || !self.visited.insert(id.to_string()) {
            return;
        }
        let Some(&context) = self.index.get(id) else {
            return;
        };

        self.graph.nodes.insert(
            id.to_string(),
            GraphNode {
                id: context.id.clone(),
                context_type: context.context_type.clone(),
                name: context.name.clone(),
                depth,
            },
        );

        if depth >= self.max_depth {
            return;
        }
        for (relationship, entries) in &context.relationships {
            if !self.follows(relationship) {
                continue;
            }
            for entry in entries {
                self.graph.edges.push(GraphEdge {
                    source: id.to_string(),
                    target: entry.target.clone(),
                    relationship: relationship.clone(),
                    properties: entry.properties.clone(),
                });
                self.visit(&entry.target, depth + 1);
            }
        }
    }
}
