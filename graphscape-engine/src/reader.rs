// Format detection and decoding for raw input files

use crate::error::{PipelineError, Result};
use encoding_rs::Encoding;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Candidate encodings tried against CSV bytes, in priority order.
pub const CSV_ENCODINGS: [&str; 4] = ["utf-8", "latin1", "cp1252", "iso-8859-1"];

/// Candidate separators tried for each encoding, in priority order.
pub const CSV_SEPARATORS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// A parsed tabular record set: a header plus positional rows.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up a cell of `row` by column name.
    pub fn value<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|i| row.get(i))
            .map(|s| s.as_str())
    }
}

/// The recognized shapes of a JSON input file.
#[derive(Debug, Clone)]
pub enum JsonContent {
    /// A list of flat objects, treated as an edge list.
    Records(Vec<Map<String, Value>>),
    /// A node-link document: `{"nodes": [...], "edges"|"links": [...]}`.
    NodeLink {
        nodes: Vec<Map<String, Value>>,
        edges: Vec<Map<String, Value>>,
    },
    /// Some other object. Not an error: the caller surfaces the keys and a
    /// truncated preview so the user can see what was actually uploaded.
    Incompatible {
        keys: Vec<String>,
        preview: Map<String, Value>,
    },
}

/// Read a CSV file, trying every candidate encoding and separator.
///
/// The first attempt that parses to more than one column wins. If nothing
/// produces multiple columns, the first successful single-column parse is
/// returned. If every attempt fails, the last underlying error is reported.
pub fn read_csv(path: &Path, limit: Option<usize>) -> Result<Table> {
    let bytes = fs::read(path)?;
    let mut single_column: Option<Table> = None;
    let mut last_error: Option<String> = None;

    for encoding in CSV_ENCODINGS {
        let Some(text) = decode(&bytes, encoding) else {
            last_error = Some(format!("{encoding}: invalid byte sequence"));
            continue;
        };
        for separator in CSV_SEPARATORS {
            match parse_csv(&text, separator, limit) {
                Ok(table) if table.columns.len() > 1 => {
                    debug!(
                        encoding,
                        separator = %(separator as char),
                        columns = table.columns.len(),
                        "csv attempt accepted"
                    );
                    return Ok(table);
                }
                Ok(table) => {
                    if single_column.is_none() {
                        single_column = Some(table);
                    }
                }
                Err(err) => {
                    last_error = Some(err.to_string());
                }
            }
        }
    }

    if let Some(table) = single_column {
        return Ok(table);
    }
    Err(PipelineError::Format(format!(
        "could not read CSV file, last error: {}",
        last_error.unwrap_or_else(|| "no parse attempt succeeded".to_string())
    )))
}

fn decode(bytes: &[u8], label: &str) -> Option<String> {
    let encoding = Encoding::for_label(label.as_bytes())?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

fn parse_csv(
    text: &str,
    separator: u8,
    limit: Option<usize>,
) -> std::result::Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
        if limit.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
    }

    Ok(Table { columns, rows })
}

/// Parse a JSON file and classify its shape.
pub fn read_json(path: &Path) -> Result<JsonContent> {
    let bytes = fs::read(path)?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|err| PipelineError::Format(format!("invalid JSON: {err}")))?;

    match value {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(map) => records.push(map),
                    other => {
                        return Err(PipelineError::Format(format!(
                            "JSON list items must be objects, found {}",
                            json_type_name(&other)
                        )));
                    }
                }
            }
            Ok(JsonContent::Records(records))
        }
        Value::Object(mut map) => {
            let edges = map.remove("edges").or_else(|| map.remove("links"));
            match (map.contains_key("nodes"), edges) {
                (true, Some(edges)) => {
                    let nodes = object_list(map.remove("nodes").unwrap_or(Value::Null), "nodes")?;
                    let edges = object_list(edges, "edges")?;
                    Ok(JsonContent::NodeLink { nodes, edges })
                }
                (_, edges) => {
                    // Restore the removed key for the preview.
                    if let Some(edges) = edges {
                        map.insert("edges".to_string(), edges);
                    }
                    let keys = map.keys().cloned().collect();
                    let preview = map
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(truncate_preview(v))))
                        .collect();
                    Ok(JsonContent::Incompatible { keys, preview })
                }
            }
        }
        other => Err(PipelineError::Format(format!(
            "unsupported JSON shape: {}",
            json_type_name(&other)
        ))),
    }
}

fn object_list(value: Value, what: &str) -> Result<Vec<Map<String, Value>>> {
    let Value::Array(items) = value else {
        return Err(PipelineError::Format(format!("'{what}' must be a list")));
    };
    let mut maps = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(map) => maps.push(map),
            other => {
                return Err(PipelineError::Format(format!(
                    "'{what}' entries must be objects, found {}",
                    json_type_name(&other)
                )));
            }
        }
    }
    Ok(maps)
}

fn truncate_preview(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() > 100 {
        let truncated: String = rendered.chars().take(100).collect();
        format!("{truncated}...")
    } else {
        rendered
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
