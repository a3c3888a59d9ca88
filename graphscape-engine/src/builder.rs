// Graph construction from parsed records

use crate::error::{PipelineError, Result};
use crate::gexf::GexfGraph;
use crate::graph::SpatialGraph;
use crate::mapping::Mapping;
use crate::reader::Table;
use serde_json::{Map, Value};

/// Build a graph from a tabular record set. Both `source` and `target` must
/// be resolved and name present columns.
pub fn from_table(table: &Table, mapping: &Mapping) -> Result<SpatialGraph> {
    let source_col = required_role(mapping.source.as_deref(), "source")?;
    let target_col = required_role(mapping.target.as_deref(), "target")?;
    let source_idx = table.column_index(source_col).ok_or_else(|| {
        PipelineError::Mapping(format!("source column '{source_col}' not found"))
    })?;
    let target_idx = table.column_index(target_col).ok_or_else(|| {
        PipelineError::Mapping(format!("target column '{target_col}' not found"))
    })?;
    let weight_idx = mapping
        .weight
        .as_deref()
        .and_then(|col| table.column_index(col));

    let mut graph = SpatialGraph::new();
    for row in &table.rows {
        let source = row.get(source_idx).map(|s| s.as_str());
        let target = row.get(target_idx).map(|s| s.as_str());
        let (Some(source), Some(target)) = (retained_str(source), retained_str(target)) else {
            continue;
        };
        let weight = weight_idx
            .and_then(|i| row.get(i))
            .map_or(1.0, |v| coerce_weight_str(v));
        graph.add_edge(
            source,
            Value::String(source.to_string()),
            target,
            Value::String(target.to_string()),
            weight,
            Map::new(),
        );
    }
    Ok(graph)
}

/// Build a graph from a JSON edge list. Roles must be resolved.
pub fn from_records(records: &[Map<String, Value>], mapping: &Mapping) -> Result<SpatialGraph> {
    let source_key = required_role(mapping.source.as_deref(), "source")?;
    let target_key = required_role(mapping.target.as_deref(), "target")?;
    let weight_key = mapping.weight.as_deref();

    let mut graph = SpatialGraph::new();
    for record in records {
        add_record_edge(&mut graph, record, source_key, target_key, weight_key);
    }
    Ok(graph)
}

/// Build a graph from a node-link document. Unset roles default to the
/// literal field names `source`/`target`/`weight`; when no weight role was
/// supplied and the first edge carries a `value` key, `value` is used
/// instead (the D3 convention). Returns the graph together with the mapping
/// actually used.
pub fn from_node_link(
    nodes: &[Map<String, Value>],
    edges: &[Map<String, Value>],
    mapping: &Mapping,
) -> (SpatialGraph, Mapping) {
    let source_key = mapping.source.clone().unwrap_or_else(|| "source".into());
    let target_key = mapping.target.clone().unwrap_or_else(|| "target".into());
    let mut weight_key = mapping.weight.clone().unwrap_or_else(|| "weight".into());
    if mapping.weight.is_none()
        && edges.first().is_some_and(|edge| edge.contains_key("value"))
    {
        weight_key = "value".into();
    }

    let mut graph = SpatialGraph::new();

    // Declared nodes are added up front so isolated nodes survive; their
    // attributes are kept verbatim, minus the id.
    for node in nodes {
        let Some(id) = node.get("id") else { continue };
        let Some(key) = retained_key(id) else { continue };
        let attrs: Map<String, Value> = node
            .iter()
            .filter(|(k, _)| k.as_str() != "id")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        graph.add_node_with_attrs(&key, id.clone(), attrs);
    }

    for edge in edges {
        add_record_edge(&mut graph, edge, &source_key, &target_key, Some(&weight_key));
    }

    let used = Mapping {
        source: Some(source_key),
        target: Some(target_key),
        weight: Some(weight_key),
    };
    (graph, used)
}

/// Build a graph from a GEXF document; GEXF fixes its own field roles.
pub fn from_gexf(document: &GexfGraph) -> SpatialGraph {
    let (graph, _) = from_node_link(&document.nodes, &document.edges, &Mapping::default());
    graph
}

fn add_record_edge(
    graph: &mut SpatialGraph,
    record: &Map<String, Value>,
    source_key: &str,
    target_key: &str,
    weight_key: Option<&str>,
) {
    let source = record.get(source_key);
    let target = record.get(target_key);
    let (Some(source_id), Some(target_id)) = (source, target) else {
        return;
    };
    let (Some(sk), Some(tk)) = (retained_key(source_id), retained_key(target_id)) else {
        return;
    };
    let weight = coerce_weight(weight_key.and_then(|k| record.get(k)));
    let role_keys = [Some(source_key), Some(target_key), weight_key];
    let attrs: Map<String, Value> = record
        .iter()
        .filter(|(k, _)| !role_keys.contains(&Some(k.as_str())))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    graph.add_edge(&sk, source_id.clone(), &tk, target_id.clone(), weight, attrs);
}

fn required_role<'a>(role: Option<&'a str>, name: &str) -> Result<&'a str> {
    role.ok_or_else(|| {
        PipelineError::Mapping(format!("the {name} column is required but was not resolved"))
    })
}

/// The node key for an endpoint value, or None when the edge must be
/// dropped. Trimming applies to the emptiness check only.
fn retained_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn retained_str(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Weight coercion: 1.0 on absence, blank input or any parse failure.
fn coerce_weight(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Null) => 1.0,
        Some(Value::Number(n)) => n.as_f64().filter(|w| w.is_finite()).unwrap_or(1.0),
        Some(Value::String(s)) => coerce_weight_str(s),
        Some(_) => 1.0,
    }
}

fn coerce_weight_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 1.0;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite())
        .unwrap_or(1.0)
}
