// GEXF (Graph Exchange XML Format) reading with malformed-file remediation

use crate::error::{PipelineError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A GEXF document reduced to node-link records. Node maps carry `id`,
/// `label` when present, and declared attribute values resolved to their
/// titles; edge maps carry `source`, `target` and `weight` when present.
#[derive(Debug, Clone)]
pub struct GexfGraph {
    pub nodes: Vec<Map<String, Value>>,
    pub edges: Vec<Map<String, Value>>,
}

/// Read a GEXF file.
///
/// A direct parse is attempted first. On failure two remediations are applied
/// in sequence: the unsupported `version="1.3"` declaration (and its
/// namespace) is rewritten to the 1.2draft equivalent, then XML-invalid
/// control characters are replaced with spaces. If the sanitized document
/// still does not parse, the original error is reported, truncated.
pub fn read_gexf(path: &Path) -> Result<GexfGraph> {
    let bytes = fs::read(path)?;
    match parse_gexf(&bytes) {
        Ok(graph) => Ok(graph),
        Err(first_error) => {
            debug!(error = %first_error, "direct GEXF parse failed, remediating");
            let text = decode_lossy(&bytes);
            let text = rewrite_version(&text);
            let text = sanitize_xml_text(&text);
            parse_gexf(text.as_bytes()).map_err(|_| {
                let snippet: String = first_error.chars().take(200).collect();
                PipelineError::Format(format!("could not parse GEXF file: {snippet}"))
            })
        }
    }
}

fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            // Any byte sequence decodes under latin1.
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

fn rewrite_version(text: &str) -> String {
    if text.contains("version=\"1.3\"") {
        text.replace("version=\"1.3\"", "version=\"1.2\"")
            .replace("http://www.gexf.net/1.3", "http://www.gexf.net/1.2draft")
    } else {
        text.to_string()
    }
}

/// Keep only characters valid in XML 1.0:
/// #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD].
fn is_valid_xml_char(c: char) -> bool {
    let cp = c as u32;
    cp == 0x9 || cp == 0xA || cp == 0xD || (0x20..=0xD7FF).contains(&cp)
        || (0xE000..=0xFFFD).contains(&cp)
}

fn sanitize_xml_text(text: &str) -> String {
    text.chars()
        .map(|c| if is_valid_xml_char(c) { c } else { ' ' })
        .collect()
}

const SUPPORTED_VERSIONS: [&str; 3] = ["1.1", "1.2", "1.2draft"];

#[derive(Default)]
struct ParseState {
    nodes: Vec<Map<String, Value>>,
    edges: Vec<Map<String, Value>>,
    // Attribute declarations: (class, id) -> (title, type)
    attr_defs: HashMap<(String, String), (String, String)>,
    attr_class: String,
    current_node: Option<Map<String, Value>>,
    current_edge: Option<Map<String, Value>>,
    saw_graph: bool,
}

fn parse_gexf(bytes: &[u8]) -> std::result::Result<GexfGraph, String> {
    // quick-xml tolerates raw control bytes, so reject them explicitly the
    // way a validating parser would.
    if bytes
        .iter()
        .any(|&b| b < 0x20 && b != 0x9 && b != 0xA && b != 0xD)
    {
        return Err("invalid XML character in document".to_string());
    }

    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut state = ParseState {
        attr_class: "node".to_string(),
        ..ParseState::default()
    };
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(|err| err.to_string())? {
            Event::Start(e) => state.open_element(&e, false)?,
            Event::Empty(e) => state.open_element(&e, true)?,
            Event::End(e) => state.close_element(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !state.saw_graph {
        return Err("no <graph> element found".to_string());
    }

    Ok(GexfGraph {
        nodes: state.nodes,
        edges: state.edges,
    })
}

impl ParseState {
    fn open_element(
        &mut self,
        element: &BytesStart,
        is_empty: bool,
    ) -> std::result::Result<(), String> {
        let attrs = element_attributes(element)?;
        match element.local_name().as_ref() {
            b"gexf" => {
                if let Some(version) = attrs.get("version") {
                    if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
                        return Err(format!("unsupported GEXF version {version}"));
                    }
                }
            }
            b"graph" => self.saw_graph = true,
            b"attributes" => {
                self.attr_class = attrs.get("class").cloned().unwrap_or_else(|| "node".into());
            }
            b"attribute" => {
                if let Some(id) = attrs.get("id") {
                    let title = attrs.get("title").cloned().unwrap_or_else(|| id.clone());
                    let kind = attrs.get("type").cloned().unwrap_or_else(|| "string".into());
                    self.attr_defs
                        .insert((self.attr_class.clone(), id.clone()), (title, kind));
                }
            }
            b"node" => {
                let mut map = Map::new();
                if let Some(id) = attrs.get("id") {
                    map.insert("id".to_string(), Value::String(id.clone()));
                }
                if let Some(label) = attrs.get("label") {
                    map.insert("label".to_string(), Value::String(label.clone()));
                }
                if is_empty {
                    self.nodes.push(map);
                } else {
                    self.current_node = Some(map);
                }
            }
            b"edge" => {
                let mut map = Map::new();
                if let Some(source) = attrs.get("source") {
                    map.insert("source".to_string(), Value::String(source.clone()));
                }
                if let Some(target) = attrs.get("target") {
                    map.insert("target".to_string(), Value::String(target.clone()));
                }
                if let Some(weight) = attrs.get("weight") {
                    if let Ok(w) = weight.parse::<f64>() {
                        if let Some(number) = serde_json::Number::from_f64(w) {
                            map.insert("weight".to_string(), Value::Number(number));
                        }
                    }
                }
                if is_empty {
                    self.edges.push(map);
                } else {
                    self.current_edge = Some(map);
                }
            }
            b"attvalue" => {
                let class = if self.current_edge.is_some() { "edge" } else { "node" };
                if let (Some(id), Some(value)) = (attrs.get("for"), attrs.get("value")) {
                    let (title, kind) = self
                        .attr_defs
                        .get(&(class.to_string(), id.clone()))
                        .cloned()
                        .unwrap_or_else(|| (id.clone(), "string".to_string()));
                    let value = typed_value(value, &kind);
                    if let Some(edge) = self.current_edge.as_mut() {
                        edge.insert(title, value);
                    } else if let Some(node) = self.current_node.as_mut() {
                        node.insert(title, value);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_element(&mut self, name: &[u8]) {
        match name {
            b"node" => {
                if let Some(map) = self.current_node.take() {
                    self.nodes.push(map);
                }
            }
            b"edge" => {
                if let Some(map) = self.current_edge.take() {
                    self.edges.push(map);
                }
            }
            _ => {}
        }
    }
}

fn element_attributes(e: &BytesStart) -> std::result::Result<HashMap<String, String>, String> {
    let mut out = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| err.to_string())?
            .to_string();
        out.insert(key, value);
    }
    Ok(out)
}

fn typed_value(raw: &str, kind: &str) -> Value {
    match kind {
        "integer" | "long" => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        "float" | "double" => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        "boolean" => raw
            .parse::<bool>()
            .map(Value::Bool)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}
