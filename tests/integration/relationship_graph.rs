//! Bounded-depth graph queries through `ContextApi`

use super::test_utils::create_test_api;
use serde_json::Map;
use stratum::containment::CreateOptions;
use stratum::context::{Context, ContextConfig};
use stratum::relationship::AddOptions;
use stratum::ContextApi;

fn task(api: &ContextApi, name: &str) -> Context {
    api.create_context("task", ContextConfig::named(name).with_id(name), None, CreateOptions::default())
        .unwrap()
}

fn link(api: &ContextApi, source: &str, relationship: &str, target: &str) {
    api.add_relationship(source, relationship, target, Map::new(), AddOptions::forced())
        .unwrap();
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// t1 -> t2 -> t3 -> t4 via `references` (not mirrored)
fn build_chain(api: &ContextApi) {
    for name in ["t1", "t2", "t3", "t4"] {
        task(api, name);
    }
    link(api, "t1", "references", "t2");
    link(api, "t2", "references", "t3");
    link(api, "t3", "references", "t4");
}

#[test]
fn test_default_depth_is_two() {
    let (api, _temp_dir) = create_test_api();
    build_chain(&api);

    let graph = api.query_relationship_graph(&ids(&["t1"]), &[], None).unwrap();
    assert_eq!(api.default_depth(), 2);
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.nodes["t1"].depth, 0);
    assert_eq!(graph.nodes["t3"].depth, 2);
    assert_eq!(graph.nodes["t2"].name.as_deref(), Some("t2"));
    assert_eq!(graph.nodes["t2"].context_type, "task");
    assert!(!graph.contains_node("t4"));
    assert_eq!(graph.edges.len(), 2);
}

#[test]
fn test_explicit_depth_and_type_filter() {
    let (api, _temp_dir) = create_test_api();
    build_chain(&api);
    link(&api, "t1", "depends_on", "t4");

    let deep = api.query_relationship_graph(&ids(&["t1"]), &[], Some(10)).unwrap();
    assert_eq!(deep.nodes.len(), 4);
    // t4 is one hop away through depends_on
    assert_eq!(deep.nodes["t4"].depth, 1);

    let filtered = api
        .query_relationship_graph(&ids(&["t1"]), &ids(&["depends_on"]), Some(10))
        .unwrap();
    assert_eq!(filtered.nodes.len(), 2);
    assert!(filtered.edges.iter().all(|e| e.relationship == "depends_on"));
}

#[test]
fn test_mirrored_edges_form_cycles_that_terminate() {
    let (api, _temp_dir) = create_test_api();
    task(&api, "a");
    task(&api, "b");
    api.add_relationship("a", "depends_on", "b", Map::new(), AddOptions::default())
        .unwrap();

    let graph = api.query_relationship_graph(&ids(&["a"]), &[], Some(5)).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    // a -depends_on-> b and b -blocks-> a
    assert_eq!(graph.edges.len(), 2);
    assert!(graph
        .edges
        .iter()
        .any(|e| e.source == "b" && e.relationship == "blocks" && e.target == "a"));
}

#[test]
fn test_unknown_start_nodes_are_ignored() {
    let (api, _temp_dir) = create_test_api();
    build_chain(&api);
    let graph = api
        .query_relationship_graph(&ids(&["nope", "t3"]), &[], Some(1))
        .unwrap();
    let nodes: Vec<&String> = graph.nodes.keys().collect();
    assert_eq!(nodes, vec!["t3", "t4"]);
}
