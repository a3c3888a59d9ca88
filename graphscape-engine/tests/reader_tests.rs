// Tests for format reading and shape detection

use graphscape_engine::PipelineError;
use graphscape_engine::reader::{JsonContent, read_csv, read_json};
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// CSV Reading Tests
// ============================================================================

#[test]
fn test_read_csv_comma() {
    let file = temp_file(b"from,to,weight\nA,B,2.0\nB,C,1.0\n");
    let table = read_csv(file.path(), None).unwrap();

    assert_eq!(table.columns, vec!["from", "to", "weight"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], vec!["A", "B", "2.0"]);
}

#[test]
fn test_read_csv_semicolon() {
    let file = temp_file(b"from;to\nA;B\n");
    let table = read_csv(file.path(), None).unwrap();

    assert_eq!(table.columns, vec!["from", "to"]);
    assert_eq!(table.rows[0], vec!["A", "B"]);
}

#[test]
fn test_read_csv_tab() {
    let file = temp_file(b"from\tto\nA\tB\n");
    let table = read_csv(file.path(), None).unwrap();

    assert_eq!(table.columns, vec!["from", "to"]);
}

#[test]
fn test_read_csv_pipe() {
    let file = temp_file(b"from|to\nA|B\n");
    let table = read_csv(file.path(), None).unwrap();

    assert_eq!(table.columns, vec!["from", "to"]);
}

#[test]
fn test_read_csv_column_count_matches_header_separators() {
    // With a correctly detected separator the column count equals the
    // number of separators in the header plus one.
    let header = "a,b,c,d,e";
    let body = "1,2,3,4,5\n";
    let file = temp_file(format!("{header}\n{body}").as_bytes());
    let table = read_csv(file.path(), None).unwrap();

    let separators = header.matches(',').count();
    assert_eq!(table.columns.len(), separators + 1);
}

#[test]
fn test_read_csv_latin1_bytes() {
    // 0xE9 is é in latin1 and invalid UTF-8, so the utf-8 attempts must be
    // skipped and the latin1 + semicolon attempt should win.
    let file = temp_file(b"caf\xe9;prix\nespresso;2\n");
    let table = read_csv(file.path(), None).unwrap();

    assert_eq!(table.columns, vec!["caf\u{e9}", "prix"]);
    assert_eq!(table.rows[0], vec!["espresso", "2"]);
}

#[test]
fn test_read_csv_single_column_fallback() {
    // No separator produces more than one column; the first successful
    // single-column parse is returned instead of an error.
    let file = temp_file(b"name\nalpha\nbeta\n");
    let table = read_csv(file.path(), None).unwrap();

    assert_eq!(table.columns, vec!["name"]);
    assert_eq!(table.rows.len(), 2);
}

#[test]
fn test_read_csv_ragged_rows_fall_back() {
    // Ragged rows make the comma attempt fail; the file still reads as a
    // single column under another separator.
    let file = temp_file(b"a,b\n1,2,3\n");
    let table = read_csv(file.path(), None).unwrap();

    assert_eq!(table.columns.len(), 1);
}

#[test]
fn test_read_csv_row_limit() {
    let file = temp_file(b"a,b\n1,2\n3,4\n5,6\n");
    let table = read_csv(file.path(), Some(2)).unwrap();

    assert_eq!(table.rows.len(), 2);
}

#[test]
fn test_table_value_lookup() {
    let file = temp_file(b"from,to\nA,B\n");
    let table = read_csv(file.path(), None).unwrap();

    let row = &table.rows[0];
    assert_eq!(table.value(row, "from"), Some("A"));
    assert_eq!(table.value(row, "to"), Some("B"));
    assert_eq!(table.value(row, "missing"), None);
}

// ============================================================================
// JSON Reading Tests
// ============================================================================

#[test]
fn test_read_json_list_of_objects() {
    let file = temp_file(br#"[{"from": "A", "to": "B"}, {"from": "B", "to": "C"}]"#);
    let content = read_json(file.path()).unwrap();

    match content {
        JsonContent::Records(records) => {
            assert_eq!(records.len(), 2);
            assert_eq!(records[0]["from"], "A");
        }
        other => panic!("expected records, got {other:?}"),
    }
}

#[test]
fn test_read_json_node_link_with_edges() {
    let file = temp_file(
        br#"{"nodes": [{"id": "x"}, {"id": "y"}], "edges": [{"source": "x", "target": "y"}]}"#,
    );
    let content = read_json(file.path()).unwrap();

    match content {
        JsonContent::NodeLink { nodes, edges } => {
            assert_eq!(nodes.len(), 2);
            assert_eq!(edges.len(), 1);
        }
        other => panic!("expected node-link, got {other:?}"),
    }
}

#[test]
fn test_read_json_node_link_with_links_alias() {
    let file = temp_file(
        br#"{"nodes": [{"id": "x"}], "links": [{"source": "x", "target": "x"}]}"#,
    );
    let content = read_json(file.path()).unwrap();

    assert!(matches!(content, JsonContent::NodeLink { .. }));
}

#[test]
fn test_read_json_arbitrary_object_is_incompatible_not_error() {
    let file = temp_file(br#"{"config": {"deep": [1, 2, 3]}, "title": "not a graph"}"#);
    let content = read_json(file.path()).unwrap();

    match content {
        JsonContent::Incompatible { keys, preview } => {
            assert!(keys.contains(&"config".to_string()));
            assert!(keys.contains(&"title".to_string()));
            assert!(preview.contains_key("title"));
        }
        other => panic!("expected incompatible, got {other:?}"),
    }
}

#[test]
fn test_read_json_object_with_nodes_but_no_edges_is_incompatible() {
    let file = temp_file(br#"{"nodes": [{"id": "x"}]}"#);
    let content = read_json(file.path()).unwrap();

    assert!(matches!(content, JsonContent::Incompatible { .. }));
}

#[test]
fn test_read_json_invalid_syntax() {
    let file = temp_file(b"{not json");
    let result = read_json(file.path());

    assert!(matches!(result, Err(PipelineError::Format(_))));
}

#[test]
fn test_read_json_scalar_root_is_error() {
    let file = temp_file(b"42");
    let result = read_json(file.path());

    assert!(matches!(result, Err(PipelineError::Format(_))));
}

#[test]
fn test_read_json_list_of_scalars_is_error() {
    let file = temp_file(b"[1, 2, 3]");
    let result = read_json(file.path());

    assert!(matches!(result, Err(PipelineError::Format(_))));
}

#[test]
fn test_read_json_preview_values_truncated() {
    let long_value = "x".repeat(300);
    let file = temp_file(format!(r#"{{"blob": "{long_value}"}}"#).as_bytes());
    let content = read_json(file.path()).unwrap();

    match content {
        JsonContent::Incompatible { preview, .. } => {
            let rendered = preview["blob"].as_str().unwrap();
            assert!(rendered.ends_with("..."));
            assert!(rendered.chars().count() <= 103);
        }
        other => panic!("expected incompatible, got {other:?}"),
    }
}
