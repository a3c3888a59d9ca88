// Tests for the processing worker and its rollback semantics

use graphscape_core::data::{Database, ProjectStatus};
use graphscape_core::worker::{self, ProcessJob};
use graphscape_engine::Mapping;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn open_db(dir: &TempDir) -> Database {
    Database::new(&dir.path().join("graphscape.db")).unwrap()
}

// ============================================================================
// Pipeline Execution Tests
// ============================================================================

#[tokio::test]
async fn test_run_pipeline() {
    let dir = TempDir::new().unwrap();
    let file = write_csv(&dir, "graph.csv", "from,to\nA,B\nB,C\n");

    let job = ProcessJob::new(file).with_algorithm("grid");
    let output = worker::run_pipeline(job, None).await.unwrap();

    assert_eq!(output.metadata.node_count, 3);
    assert_eq!(output.algorithm_used, "grid");
}

#[tokio::test]
async fn test_run_pipeline_mapping_failure() {
    let dir = TempDir::new().unwrap();
    let file = write_csv(&dir, "graph.csv", "alpha,beta\nA,B\n");

    let job = ProcessJob::new(file);
    let err = worker::run_pipeline(job, None).await.unwrap_err();

    assert!(err.contains("mapping"));
}

#[tokio::test]
async fn test_run_pipeline_explicit_mapping() {
    let dir = TempDir::new().unwrap();
    let file = write_csv(&dir, "graph.csv", "alpha,beta\nA,B\n");

    let mapping = Mapping {
        source: Some("alpha".to_string()),
        target: Some("beta".to_string()),
        weight: None,
    };
    let job = ProcessJob::new(file).with_mapping(mapping).with_algorithm("grid");
    let output = worker::run_pipeline(job, None).await.unwrap();

    assert_eq!(output.metadata.node_count, 2);
}

#[tokio::test]
async fn test_run_pipeline_seed_determinism() {
    let dir = TempDir::new().unwrap();
    let file = write_csv(&dir, "graph.csv", "from,to\nA,B\nB,C\nC,A\n");

    let job = || {
        ProcessJob::new(file.clone())
            .with_algorithm("fruchterman_reingold")
            .with_seed(99)
    };
    let first = worker::run_pipeline(job(), None).await.unwrap();
    let second = worker::run_pipeline(job(), None).await.unwrap();

    assert_eq!(first.nodes, second.nodes);
}

// ============================================================================
// Persisted Job Tests
// ============================================================================

#[tokio::test]
async fn test_run_job_success_persists_result() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let file = write_csv(&dir, "graph.csv", "from,to,weight\nA,B,2\nB,C,1\n");

    let id = db
        .create_project("demo", file.to_str().unwrap(), None, "grid")
        .unwrap();
    let job = ProcessJob::new(file.clone()).with_algorithm("grid");
    let output = worker::run_job(&db, &id, job, true, None).await.unwrap();

    let project = db.get_project(&id).unwrap().unwrap();
    assert_eq!(project.status, ProjectStatus::Ready);
    assert_eq!(project.algorithm, output.algorithm_used);
    assert!(project.graph_data.is_some());
    // The resolved mapping was stored for later recomputation.
    let mapping: Mapping = serde_json::from_str(project.mapping.as_deref().unwrap()).unwrap();
    assert_eq!(mapping.source.as_deref(), Some("from"));
    // The source file survives a successful run.
    assert!(file.exists());
}

#[tokio::test]
async fn test_run_job_failure_rolls_back_new_project() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    // Unmappable columns: the run will fail with a mapping error.
    let file = write_csv(&dir, "broken.csv", "alpha,beta\nA,B\n");

    let id = db
        .create_project("broken", file.to_str().unwrap(), None, "auto")
        .unwrap();
    let job = ProcessJob::new(file.clone());
    let result = worker::run_job(&db, &id, job, true, None).await;

    assert!(result.is_err());
    // New project: the row and the saved source file are both gone.
    assert!(db.get_project(&id).unwrap().is_none());
    assert!(!file.exists());
}

#[tokio::test]
async fn test_run_job_failure_keeps_existing_project() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let good = write_csv(&dir, "good.csv", "from,to\nA,B\n");

    let id = db
        .create_project("stable", good.to_str().unwrap(), None, "grid")
        .unwrap();
    let job = ProcessJob::new(good.clone()).with_algorithm("grid");
    worker::run_job(&db, &id, job, true, None).await.unwrap();
    let before = db.get_project(&id).unwrap().unwrap();

    // Sabotage the source file, then recompute as an existing project.
    fs::write(&good, "alpha,beta\nA,B\n").unwrap();
    let job = ProcessJob::new(good.clone()).with_algorithm("grid");
    let result = worker::run_job(&db, &id, job, false, None).await;

    assert!(result.is_err());
    let after = db.get_project(&id).unwrap().unwrap();
    // Prior valid state untouched, failure recorded for retry.
    assert_eq!(after.status, ProjectStatus::Failed);
    assert_eq!(after.graph_data, before.graph_data);
    assert!(after.last_error.is_some());
    assert!(good.exists());
}

#[tokio::test]
async fn test_recompute_uses_stored_mapping() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let file = write_csv(&dir, "graph.csv", "from,to\nA,B\nB,C\n");

    let id = db
        .create_project("again", file.to_str().unwrap(), None, "grid")
        .unwrap();
    let job = ProcessJob::new(file.clone()).with_algorithm("grid");
    worker::run_job(&db, &id, job, true, None).await.unwrap();

    let output = worker::recompute(&db, &id, Some("sphere".to_string()), None)
        .await
        .unwrap();

    assert_eq!(output.algorithm_used, "sphere");
    let project = db.get_project(&id).unwrap().unwrap();
    assert_eq!(project.algorithm, "sphere");
    assert_eq!(project.status, ProjectStatus::Ready);
}

#[tokio::test]
async fn test_recompute_unknown_project() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    let result = worker::recompute(&db, "no-such-id", None, None).await;
    assert!(result.is_err());
}
