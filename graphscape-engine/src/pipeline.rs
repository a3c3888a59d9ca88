// Pipeline orchestration: reader -> resolver -> builder -> stats -> layout

use crate::builder;
use crate::error::{PipelineError, Result};
use crate::gexf;
use crate::graph::SpatialGraph;
use crate::layout::{self, LayoutOptions};
use crate::mapping::Mapping;
use crate::reader::{self, JsonContent};
use crate::sanitize::{finite_or_zero, sanitize_value};
use crate::stats::{self, Metadata, SampleStats};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

/// Rows shown in an analysis preview.
pub const PREVIEW_ROWS: usize = 5;

/// Upper bound on rows consulted by `analyze`.
pub const SAMPLE_ROWS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    CsvProcessed,
    JsonNodeLink,
    JsonList,
    Gexf,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CsvProcessed => "csv_processed",
            Self::JsonNodeLink => "json_node_link",
            Self::JsonList => "json_list",
            Self::Gexf => "gexf",
        }
    }
}

/// The full result of one pipeline run. Serializes with exactly the
/// top-level keys `metadata`, `nodes`, `edges`, `format` and
/// `algorithm_used`; the mapping actually applied rides along unserialized
/// for callers that persist it.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub metadata: Metadata,
    pub nodes: Vec<Value>,
    pub edges: Vec<Value>,
    pub format: SourceFormat,
    pub algorithm_used: String,
    #[serde(skip)]
    pub resolved_mapping: Mapping,
}

/// Preview report from `analyze`: enough to choose a mapping without paying
/// for a full build and layout.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    #[serde(rename = "type")]
    pub kind: String,
    pub columns: Vec<String>,
    pub preview: Value,
    pub suggestions: Mapping,
    pub stats: Option<SampleStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Analysis {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            columns: Vec::new(),
            preview: Value::Array(Vec::new()),
            suggestions: Mapping::default(),
            stats: None,
            node_count: None,
            edge_count: None,
            keys: None,
            message: None,
        }
    }
}

/// Run the whole pipeline with default layout options.
pub fn process(path: &Path, mapping: &Mapping, algorithm: &str) -> Result<PipelineOutput> {
    process_with_options(path, mapping, algorithm, LayoutOptions::default())
}

/// Run the whole pipeline: read the file, resolve the mapping, build the
/// graph, compute statistics, lay the graph out and export it. Synchronous
/// and CPU-bound; latency-sensitive callers offload this to a worker.
pub fn process_with_options(
    path: &Path,
    mapping: &Mapping,
    algorithm: &str,
    options: LayoutOptions,
) -> Result<PipelineOutput> {
    match extension(path)?.as_str() {
        "csv" => process_csv(path, mapping, algorithm, options),
        "json" => process_json(path, mapping, algorithm, options),
        _ => process_gexf(path, algorithm, options),
    }
}

/// Inspect a file on a bounded sample: columns, a short preview, a suggested
/// mapping and quick statistics. No layout is run.
pub fn analyze(path: &Path) -> Result<Analysis> {
    match extension(path)?.as_str() {
        "csv" => analyze_csv(path),
        "json" => analyze_json(path),
        _ => analyze_gexf(path),
    }
}

fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "json" | "gexf" => Ok(ext),
        "" => Err(PipelineError::UnsupportedFormat(format!(
            "'{}' has no file extension",
            path.display()
        ))),
        other => Err(PipelineError::UnsupportedFormat(format!(".{other}"))),
    }
}

fn process_csv(
    path: &Path,
    mapping: &Mapping,
    algorithm: &str,
    options: LayoutOptions,
) -> Result<PipelineOutput> {
    let table = reader::read_csv(path, None)?;
    let resolved = mapping.resolved(&table.columns);
    let graph = builder::from_table(&table, &resolved)?;
    finish(
        graph,
        table.columns.clone(),
        SourceFormat::CsvProcessed,
        resolved,
        algorithm,
        options,
    )
}

fn process_json(
    path: &Path,
    mapping: &Mapping,
    algorithm: &str,
    options: LayoutOptions,
) -> Result<PipelineOutput> {
    match reader::read_json(path)? {
        JsonContent::NodeLink { nodes, edges } => {
            let (graph, used) = builder::from_node_link(&nodes, &edges, mapping);
            let columns = edges
                .first()
                .map(|edge| edge.keys().cloned().collect())
                .unwrap_or_default();
            finish(
                graph,
                columns,
                SourceFormat::JsonNodeLink,
                used,
                algorithm,
                options,
            )
        }
        JsonContent::Records(records) => {
            let columns: Vec<String> = records
                .first()
                .map(|record| record.keys().cloned().collect())
                .unwrap_or_default();
            let resolved = mapping.resolved(&columns);
            let graph = builder::from_records(&records, &resolved)?;
            finish(
                graph,
                columns,
                SourceFormat::JsonList,
                resolved,
                algorithm,
                options,
            )
        }
        JsonContent::Incompatible { .. } => Err(PipelineError::Format(
            "JSON object is not a supported graph shape; expected a node-link object or a list \
             of edge records"
                .to_string(),
        )),
    }
}

fn process_gexf(path: &Path, algorithm: &str, options: LayoutOptions) -> Result<PipelineOutput> {
    let document = gexf::read_gexf(path)?;
    let (graph, used) = builder::from_node_link(&document.nodes, &document.edges, &Mapping::default());
    finish(graph, Vec::new(), SourceFormat::Gexf, used, algorithm, options)
}

fn finish(
    mut graph: SpatialGraph,
    columns: Vec<String>,
    format: SourceFormat,
    resolved_mapping: Mapping,
    algorithm: &str,
    options: LayoutOptions,
) -> Result<PipelineOutput> {
    let metadata = stats::compute(&graph, columns);
    let algorithm_used = layout::apply_layout(&mut graph, algorithm, options);
    info!(
        nodes = metadata.node_count,
        edges = metadata.edge_count,
        format = format.as_str(),
        algorithm = %algorithm_used,
        "pipeline run complete"
    );
    let (nodes, edges) = export_graph(&graph);
    Ok(PipelineOutput {
        metadata,
        nodes,
        edges,
        format,
        algorithm_used,
        resolved_mapping,
    })
}

/// Flatten the laid-out graph into node-link JSON values, scrubbing
/// non-finite floats on the way out.
fn export_graph(graph: &SpatialGraph) -> (Vec<Value>, Vec<Value>) {
    let nodes = graph
        .node_indices()
        .map(|index| {
            let data = graph.node(index);
            let mut map = Map::new();
            map.insert("id".to_string(), data.id.clone());
            for (key, value) in &data.attrs {
                map.insert(key.clone(), value.clone());
            }
            let position = data.position.unwrap_or([0.0; 3]);
            map.insert("x".to_string(), Value::from(finite_or_zero(position[0])));
            map.insert("y".to_string(), Value::from(finite_or_zero(position[1])));
            map.insert("z".to_string(), Value::from(finite_or_zero(position[2])));
            let mut value = Value::Object(map);
            sanitize_value(&mut value);
            value
        })
        .collect();

    let edges = graph
        .inner()
        .edge_references()
        .map(|edge| {
            let mut map = Map::new();
            map.insert(
                "source".to_string(),
                graph.node(edge.source()).id.clone(),
            );
            map.insert(
                "target".to_string(),
                graph.node(edge.target()).id.clone(),
            );
            map.insert(
                "weight".to_string(),
                Value::from(finite_or_zero(edge.weight().weight)),
            );
            for (key, value) in &edge.weight().attrs {
                map.insert(key.clone(), value.clone());
            }
            let mut value = Value::Object(map);
            sanitize_value(&mut value);
            value
        })
        .collect();

    (nodes, edges)
}

fn analyze_csv(path: &Path) -> Result<Analysis> {
    let table = reader::read_csv(path, Some(SAMPLE_ROWS))?;
    let suggestions = Mapping::suggest(&table.columns);

    let preview: Vec<Value> = table
        .rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(|row| row_object(&table.columns, row))
        .collect();

    let stats = if suggestions.is_complete() {
        builder::from_table(&table, &suggestions)
            .ok()
            .map(|graph| stats::compute_sample(&graph, table.rows.len()))
    } else {
        None
    };

    let mut analysis = Analysis::new("csv");
    analysis.columns = table.columns;
    analysis.preview = Value::Array(preview);
    analysis.suggestions = suggestions;
    analysis.stats = stats;
    Ok(analysis)
}

fn analyze_json(path: &Path) -> Result<Analysis> {
    match reader::read_json(path)? {
        JsonContent::Records(records) => {
            let columns: Vec<String> = records
                .first()
                .map(|record| record.keys().cloned().collect())
                .unwrap_or_default();
            let suggestions = Mapping::suggest(&columns);
            let sample = &records[..records.len().min(SAMPLE_ROWS)];

            let stats = if suggestions.is_complete() {
                builder::from_records(sample, &suggestions)
                    .ok()
                    .map(|graph| stats::compute_sample(&graph, sample.len()))
            } else {
                None
            };

            let mut analysis = Analysis::new("json_list");
            analysis.columns = columns;
            analysis.preview = Value::Array(
                records
                    .iter()
                    .take(PREVIEW_ROWS)
                    .map(|record| Value::Object(record.clone()))
                    .collect(),
            );
            analysis.suggestions = suggestions;
            analysis.stats = stats;
            Ok(analysis)
        }
        JsonContent::NodeLink { nodes, edges } => {
            if nodes.is_empty() || edges.is_empty() {
                let mut analysis = Analysis::new("json_node_link_empty");
                analysis.node_count = Some(nodes.len());
                analysis.edge_count = Some(edges.len());
                return Ok(analysis);
            }

            let edge_keys: Vec<String> = edges[0].keys().cloned().collect();
            let suggestions = Mapping::suggest(&edge_keys);

            let stats = if edge_keys.iter().any(|k| k == "source")
                && edge_keys.iter().any(|k| k == "target")
            {
                let sample = &edges[..edges.len().min(SAMPLE_ROWS)];
                let literal = Mapping {
                    source: Some("source".to_string()),
                    target: Some("target".to_string()),
                    weight: None,
                };
                builder::from_records(sample, &literal)
                    .ok()
                    .map(|graph| stats::compute_sample(&graph, sample.len()))
            } else {
                None
            };

            let mut analysis = Analysis::new("json_node_link");
            analysis.columns = edge_keys;
            analysis.preview = Value::Array(
                edges
                    .iter()
                    .take(PREVIEW_ROWS)
                    .map(|edge| Value::Object(edge.clone()))
                    .collect(),
            );
            analysis.suggestions = suggestions;
            analysis.stats = stats;
            analysis.node_count = Some(nodes.len());
            analysis.edge_count = Some(edges.len());
            Ok(analysis)
        }
        JsonContent::Incompatible { keys, preview } => {
            let mut analysis = Analysis::new("json_object");
            analysis.preview = Value::Object(preview);
            analysis.keys = Some(keys);
            analysis.message = Some(
                "JSON object is not a compatible graph format; use CSV, a JSON list of edges, \
                 or a node-link object"
                    .to_string(),
            );
            Ok(analysis)
        }
    }
}

fn analyze_gexf(path: &Path) -> Result<Analysis> {
    let document = gexf::read_gexf(path)?;
    let graph = builder::from_gexf(&document);

    let mut analysis = Analysis::new("gexf");
    analysis.node_count = Some(graph.node_count());
    analysis.edge_count = Some(graph.edge_count());
    analysis.stats = Some(stats::compute_sample(&graph, document.edges.len()));
    Ok(analysis)
}

fn row_object(columns: &[String], row: &[String]) -> Value {
    let map: Map<String, Value> = columns
        .iter()
        .zip(row)
        .map(|(column, value)| (column.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(map)
}
