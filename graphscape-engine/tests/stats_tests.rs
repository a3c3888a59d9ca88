// Tests for graph statistics

use graphscape_engine::SpatialGraph;
use graphscape_engine::stats::{compute, compute_sample};
use serde_json::{Map, Value};

fn edge(graph: &mut SpatialGraph, a: &str, b: &str) {
    graph.add_edge(
        a,
        Value::String(a.to_string()),
        b,
        Value::String(b.to_string()),
        1.0,
        Map::new(),
    );
}

fn triangle() -> SpatialGraph {
    let mut graph = SpatialGraph::new();
    edge(&mut graph, "a", "b");
    edge(&mut graph, "b", "c");
    edge(&mut graph, "a", "c");
    graph
}

// ============================================================================
// Metadata Tests
// ============================================================================

#[test]
fn test_empty_graph() {
    let graph = SpatialGraph::new();
    let metadata = compute(&graph, Vec::new());

    assert_eq!(metadata.node_count, 0);
    assert_eq!(metadata.edge_count, 0);
    assert_eq!(metadata.density, 0.0);
    // Connectivity short-circuits to false rather than raising.
    assert!(!metadata.is_connected);
    assert_eq!(metadata.avg_degree, 0.0);
}

#[test]
fn test_nodes_without_edges() {
    let mut graph = SpatialGraph::new();
    graph.ensure_node("x", Value::String("x".to_string()));
    graph.ensure_node("y", Value::String("y".to_string()));
    let metadata = compute(&graph, Vec::new());

    assert_eq!(metadata.node_count, 2);
    assert_eq!(metadata.edge_count, 0);
    assert_eq!(metadata.density, 0.0);
    assert!(!metadata.is_connected);
    assert_eq!(metadata.avg_degree, 0.0);
}

#[test]
fn test_single_node_is_connected() {
    let mut graph = SpatialGraph::new();
    graph.ensure_node("x", Value::String("x".to_string()));
    let metadata = compute(&graph, Vec::new());

    assert!(metadata.is_connected);
    assert_eq!(metadata.density, 0.0);
}

#[test]
fn test_triangle_statistics() {
    let metadata = compute(&triangle(), Vec::new());

    assert_eq!(metadata.node_count, 3);
    assert_eq!(metadata.edge_count, 3);
    assert_eq!(metadata.density, 1.0);
    assert!(metadata.is_connected);
    assert_eq!(metadata.avg_degree, 2.0);
}

#[test]
fn test_path_graph_statistics() {
    let mut graph = SpatialGraph::new();
    edge(&mut graph, "a", "b");
    edge(&mut graph, "b", "c");
    let metadata = compute(&graph, Vec::new());

    assert_eq!(metadata.node_count, 3);
    assert_eq!(metadata.edge_count, 2);
    assert!((metadata.density - 2.0 / 3.0).abs() < 1e-12);
    assert!((metadata.avg_degree - 4.0 / 3.0).abs() < 1e-12);
    assert!(metadata.is_connected);
}

#[test]
fn test_disconnected_components() {
    let mut graph = SpatialGraph::new();
    edge(&mut graph, "a", "b");
    edge(&mut graph, "c", "d");
    let metadata = compute(&graph, Vec::new());

    assert!(!metadata.is_connected);
}

#[test]
fn test_columns_carried_through() {
    let metadata = compute(&triangle(), vec!["from".to_string(), "to".to_string()]);

    assert_eq!(metadata.columns, vec!["from", "to"]);
}

// ============================================================================
// Sample Statistics Tests
// ============================================================================

#[test]
fn test_sample_stats_density_rounded() {
    let mut graph = SpatialGraph::new();
    edge(&mut graph, "a", "b");
    edge(&mut graph, "b", "c");
    let stats = compute_sample(&graph, 2);

    // 2/3 rounded to four decimals
    assert_eq!(stats.density, 0.6667);
    assert_eq!(stats.sample_size, 2);
}

#[test]
fn test_sample_stats_counts() {
    let stats = compute_sample(&triangle(), 3);

    assert_eq!(stats.node_count, 3);
    assert_eq!(stats.edge_count, 3);
    assert!(stats.is_connected);
}
