// Tests for the project store

use graphscape_core::data::{Database, ProjectStatus};
use tempfile::TempDir;

fn test_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::new(&dir.path().join("graphscape.db")).unwrap();
    (dir, db)
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[test]
fn test_database_create_and_exists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graphscape.db");

    assert!(!Database::exists(&path));
    let _db = Database::new(&path).unwrap();
    assert!(Database::exists(&path));
}

#[test]
fn test_project_status_round_trip() {
    for status in [
        ProjectStatus::Pending,
        ProjectStatus::Processing,
        ProjectStatus::Ready,
        ProjectStatus::Failed,
    ] {
        assert_eq!(ProjectStatus::from_str(status.as_str()), Some(status));
    }
    assert_eq!(ProjectStatus::from_str("bogus"), None);
}

// ============================================================================
// Project CRUD Tests
// ============================================================================

#[test]
fn test_create_and_get_project() {
    let (_dir, db) = test_db();
    let id = db
        .create_project("demo", "/tmp/demo.csv", Some(r#"{"source":"from"}"#), "auto")
        .unwrap();

    let project = db.get_project(&id).unwrap().expect("project missing");
    assert_eq!(project.id, id);
    assert_eq!(project.name, "demo");
    assert_eq!(project.source_file, "/tmp/demo.csv");
    assert_eq!(project.mapping.as_deref(), Some(r#"{"source":"from"}"#));
    assert_eq!(project.algorithm, "auto");
    assert_eq!(project.status, ProjectStatus::Pending);
    assert!(project.graph_data.is_none());
    assert!(project.created_at > 0);
}

#[test]
fn test_get_project_by_name() {
    let (_dir, db) = test_db();
    db.create_project("alpha", "/tmp/a.csv", None, "auto").unwrap();

    let project = db.get_project_by_name("alpha").unwrap();
    assert!(project.is_some());
    assert!(db.get_project_by_name("beta").unwrap().is_none());
}

#[test]
fn test_list_projects() {
    let (_dir, db) = test_db();
    db.create_project("one", "/tmp/1.csv", None, "auto").unwrap();
    db.create_project("two", "/tmp/2.csv", None, "sphere").unwrap();

    let projects = db.list_projects().unwrap();
    assert_eq!(projects.len(), 2);
}

#[test]
fn test_duplicate_name_rejected() {
    let (_dir, db) = test_db();
    db.create_project("same", "/tmp/1.csv", None, "auto").unwrap();

    assert!(db.create_project("same", "/tmp/2.csv", None, "auto").is_err());
}

#[test]
fn test_delete_project() {
    let (_dir, db) = test_db();
    let id = db.create_project("gone", "/tmp/g.csv", None, "auto").unwrap();
    db.delete_project(&id).unwrap();

    assert!(db.get_project(&id).unwrap().is_none());
}

// ============================================================================
// Result Persistence Tests
// ============================================================================

#[test]
fn test_set_status() {
    let (_dir, db) = test_db();
    let id = db.create_project("p", "/tmp/p.csv", None, "auto").unwrap();
    db.set_status(&id, ProjectStatus::Processing).unwrap();

    let project = db.get_project(&id).unwrap().unwrap();
    assert_eq!(project.status, ProjectStatus::Processing);
}

#[test]
fn test_save_result() {
    let (_dir, db) = test_db();
    let id = db.create_project("p", "/tmp/p.csv", None, "auto").unwrap();
    db.save_result(
        &id,
        r#"{"nodes":[]}"#,
        r#"{"node_count":0}"#,
        Some(r#"{"source":"from","target":"to"}"#),
        "fruchterman_reingold",
    )
    .unwrap();

    let project = db.get_project(&id).unwrap().unwrap();
    assert_eq!(project.status, ProjectStatus::Ready);
    assert_eq!(project.graph_data.as_deref(), Some(r#"{"nodes":[]}"#));
    assert_eq!(project.metadata.as_deref(), Some(r#"{"node_count":0}"#));
    // The stored algorithm is the one actually executed, not the request.
    assert_eq!(project.algorithm, "fruchterman_reingold");
    assert!(project.last_error.is_none());
}

#[test]
fn test_save_result_without_mapping_keeps_previous() {
    let (_dir, db) = test_db();
    let id = db
        .create_project("p", "/tmp/p.csv", Some(r#"{"source":"u"}"#), "auto")
        .unwrap();
    db.save_result(&id, "{}", "{}", None, "grid").unwrap();

    let project = db.get_project(&id).unwrap().unwrap();
    assert_eq!(project.mapping.as_deref(), Some(r#"{"source":"u"}"#));
}

#[test]
fn test_mark_failed_keeps_graph_data() {
    let (_dir, db) = test_db();
    let id = db.create_project("p", "/tmp/p.csv", None, "auto").unwrap();
    db.save_result(&id, r#"{"nodes":[]}"#, "{}", None, "grid").unwrap();
    db.mark_failed(&id, "layout exploded").unwrap();

    let project = db.get_project(&id).unwrap().unwrap();
    assert_eq!(project.status, ProjectStatus::Failed);
    assert_eq!(project.last_error.as_deref(), Some("layout exploded"));
    // Prior result untouched, available for retry.
    assert_eq!(project.graph_data.as_deref(), Some(r#"{"nodes":[]}"#));
}
