// Graph statistics

use crate::graph::SpatialGraph;
use petgraph::algo::connected_components;
use serde::{Deserialize, Serialize};

/// Summary of a built graph. A view derived from the current node and edge
/// sets, recomputed on every rebuild; computed before layout runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub is_connected: bool,
    pub avg_degree: f64,
    pub columns: Vec<String>,
}

/// Reduced statistics for interactive previews over a bounded sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub is_connected: bool,
    pub sample_size: usize,
}

pub fn compute(graph: &SpatialGraph, columns: Vec<String>) -> Metadata {
    let n = graph.node_count();
    let e = graph.edge_count();
    Metadata {
        node_count: n,
        edge_count: e,
        density: graph.density(),
        is_connected: is_connected(graph),
        // Every undirected edge contributes 2 to the degree sum.
        avg_degree: if n > 0 { 2.0 * e as f64 / n as f64 } else { 0.0 },
        columns,
    }
}

pub fn compute_sample(graph: &SpatialGraph, sample_size: usize) -> SampleStats {
    SampleStats {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        density: round4(graph.density()),
        is_connected: is_connected(graph),
        sample_size,
    }
}

/// Connectivity of the whole graph; false for the empty graph rather than
/// an error.
pub fn is_connected(graph: &SpatialGraph) -> bool {
    graph.node_count() > 0 && connected_components(graph.inner()) == 1
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
