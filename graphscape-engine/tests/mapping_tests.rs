// Tests for keyword-based mapping suggestion and resolution

use graphscape_engine::Mapping;

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// ============================================================================
// Suggestion Tests
// ============================================================================

#[test]
fn test_suggest_exact_names() {
    let mapping = Mapping::suggest(&fields(&["source", "target", "weight"]));

    assert_eq!(mapping.source.as_deref(), Some("source"));
    assert_eq!(mapping.target.as_deref(), Some("target"));
    assert_eq!(mapping.weight.as_deref(), Some("weight"));
}

#[test]
fn test_suggest_keyword_priority_beats_field_order() {
    // 'src' comes before 'from' in the keyword list, so it wins even though
    // 'from' appears first among the fields.
    let mapping = Mapping::suggest(&fields(&["from", "src", "to"]));

    assert_eq!(mapping.source.as_deref(), Some("src"));
    assert_eq!(mapping.target.as_deref(), Some("to"));
}

#[test]
fn test_suggest_case_insensitive_preserves_original() {
    let mapping = Mapping::suggest(&fields(&["Source", "TARGET"]));

    assert_eq!(mapping.source.as_deref(), Some("Source"));
    assert_eq!(mapping.target.as_deref(), Some("TARGET"));
}

#[test]
fn test_suggest_alternate_keywords() {
    let mapping = Mapping::suggest(&fields(&["origin", "dest", "score"]));

    assert_eq!(mapping.source.as_deref(), Some("origin"));
    assert_eq!(mapping.target.as_deref(), Some("dest"));
    assert_eq!(mapping.weight.as_deref(), Some("score"));
}

#[test]
fn test_suggest_weight_value_before_w() {
    let mapping = Mapping::suggest(&fields(&["u", "v", "w", "value"]));

    assert_eq!(mapping.weight.as_deref(), Some("value"));
}

#[test]
fn test_suggest_french_weight() {
    let mapping = Mapping::suggest(&fields(&["source", "target", "poids"]));

    assert_eq!(mapping.weight.as_deref(), Some("poids"));
}

#[test]
fn test_suggest_no_match() {
    let mapping = Mapping::suggest(&fields(&["alpha", "beta"]));

    assert!(mapping.source.is_none());
    assert!(mapping.target.is_none());
    assert!(mapping.weight.is_none());
    assert!(mapping.is_empty());
}

#[test]
fn test_suggest_no_substring_matching() {
    // Matching is exact on the lowercased name, not substring.
    let mapping = Mapping::suggest(&fields(&["source_id", "target_id"]));

    assert!(mapping.source.is_none());
    assert!(mapping.target.is_none());
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_resolved_explicit_takes_precedence() {
    let explicit = Mapping {
        source: Some("col_a".to_string()),
        target: None,
        weight: None,
    };
    let resolved = explicit.resolved(&fields(&["source", "target", "weight", "col_a"]));

    assert_eq!(resolved.source.as_deref(), Some("col_a"));
    assert_eq!(resolved.target.as_deref(), Some("target"));
    assert_eq!(resolved.weight.as_deref(), Some("weight"));
}

#[test]
fn test_resolved_fills_all_from_suggestions() {
    let resolved = Mapping::default().resolved(&fields(&["from", "to"]));

    assert_eq!(resolved.source.as_deref(), Some("from"));
    assert_eq!(resolved.target.as_deref(), Some("to"));
    assert!(resolved.weight.is_none());
}

#[test]
fn test_is_complete() {
    let mapping = Mapping {
        source: Some("a".to_string()),
        target: Some("b".to_string()),
        weight: None,
    };
    assert!(mapping.is_complete());
    assert!(!Mapping::default().is_complete());
}

#[test]
fn test_mapping_serde_round_trip() {
    let mapping = Mapping {
        source: Some("from".to_string()),
        target: Some("to".to_string()),
        weight: None,
    };
    let json = serde_json::to_string(&mapping).unwrap();
    let back: Mapping = serde_json::from_str(&json).unwrap();

    assert_eq!(mapping, back);
    // Unset roles are omitted from the serialized form.
    assert!(!json.contains("weight"));
}
