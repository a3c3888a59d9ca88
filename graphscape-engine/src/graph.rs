// Spatial graph model over petgraph

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct NodeData {
    /// The original identifier as it appeared in the input (string or number).
    pub id: Value,
    /// Attributes carried over from the input, minus the id itself.
    pub attrs: Map<String, Value>,
    /// Assigned by the layout engine.
    pub position: Option<[f64; 3]>,
}

#[derive(Debug, Clone)]
pub struct EdgeData {
    pub weight: f64,
    pub attrs: Map<String, Value>,
}

/// An undirected weighted graph with simple-graph semantics: repeated edges
/// between the same pair update the stored weight and attributes in place
/// (last write wins). Self-loops are kept. Nodes are keyed by the string
/// rendering of their identifier.
#[derive(Debug, Default)]
pub struct SpatialGraph {
    graph: UnGraph<NodeData, EdgeData>,
    ids: HashMap<String, NodeIndex>,
}

impl SpatialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn inner(&self) -> &UnGraph<NodeData, EdgeData> {
        &self.graph
    }

    pub fn node_index(&self, key: &str) -> Option<NodeIndex> {
        self.ids.get(key).copied()
    }

    /// Insert a node if its key is new, returning its index either way.
    pub fn ensure_node(&mut self, key: &str, id: Value) -> NodeIndex {
        if let Some(&index) = self.ids.get(key) {
            return index;
        }
        let index = self.graph.add_node(NodeData {
            id,
            attrs: Map::new(),
            position: None,
        });
        self.ids.insert(key.to_string(), index);
        index
    }

    /// Insert a node with attributes, merging attributes into an existing
    /// node with the same key.
    pub fn add_node_with_attrs(
        &mut self,
        key: &str,
        id: Value,
        attrs: Map<String, Value>,
    ) -> NodeIndex {
        let index = self.ensure_node(key, id);
        self.graph[index].attrs.extend(attrs);
        index
    }

    /// Insert or update an undirected edge between two node keys.
    pub fn add_edge(
        &mut self,
        source_key: &str,
        source_id: Value,
        target_key: &str,
        target_id: Value,
        weight: f64,
        attrs: Map<String, Value>,
    ) {
        let a = self.ensure_node(source_key, source_id);
        let b = self.ensure_node(target_key, target_id);
        if let Some(existing) = self.graph.find_edge(a, b) {
            let data = &mut self.graph[existing];
            data.weight = weight;
            data.attrs.extend(attrs);
        } else {
            self.graph.add_edge(a, b, EdgeData { weight, attrs });
        }
    }

    pub fn set_position(&mut self, index: NodeIndex, position: [f64; 3]) {
        self.graph[index].position = Some(position);
    }

    /// Node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn node(&self, index: NodeIndex) -> &NodeData {
        &self.graph[index]
    }

    /// Edges as (source position, target position, weight) over the dense
    /// 0..node_count index range, the form the layout passes consume.
    pub fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    edge.source().index(),
                    edge.target().index(),
                    edge.weight().weight,
                )
            })
            .collect()
    }

    /// Graph density for a simple undirected graph: 2E / (N * (N - 1)).
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n <= 1 {
            return 0.0;
        }
        2.0 * self.edge_count() as f64 / (n as f64 * (n as f64 - 1.0))
    }
}
