// Background processing jobs around the engine pipeline

use crate::data::{Database, ProjectStatus};
use graphscape_engine::layout::{DEFAULT_SCALE, DEFAULT_SEED, LayoutOptions};
use graphscape_engine::{Mapping, PipelineOutput, pipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Callback for reporting job progress
pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Options for one processing job: one file, one graph, one layout run.
#[derive(Debug, Clone)]
pub struct ProcessJob {
    pub file: PathBuf,
    pub mapping: Mapping,
    pub algorithm: String,
    pub scale: f64,
    pub seed: u64,
}

impl ProcessJob {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            mapping: Mapping::default(),
            algorithm: "auto".to_string(),
            scale: DEFAULT_SCALE,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Run the pipeline off the caller's async thread. The pipeline itself is
/// synchronous and CPU-bound, so it goes through `spawn_blocking`.
pub async fn run_pipeline(
    job: ProcessJob,
    progress: Option<ProgressCallback>,
) -> Result<PipelineOutput, String> {
    if let Some(callback) = &progress {
        callback(format!("Processing {}", job.file.display()));
    }
    let handle = tokio::task::spawn_blocking(move || {
        pipeline::process_with_options(
            &job.file,
            &job.mapping,
            &job.algorithm,
            LayoutOptions {
                scale: job.scale,
                seed: job.seed,
            },
        )
    });
    let result = handle
        .await
        .map_err(|err| format!("worker task failed: {err}"))?;
    result.map_err(|err| err.to_string())
}

/// Process a file and persist the outcome on a project row.
///
/// A failed run for a newly created project rolls the project back entirely,
/// including its saved source file, so no orphaned broken state survives. A
/// failed recompute of an existing project leaves the previous graph intact
/// and records the failure for retry.
pub async fn run_job(
    db: &Database,
    project_id: &str,
    job: ProcessJob,
    is_new_project: bool,
    progress: Option<ProgressCallback>,
) -> Result<PipelineOutput, String> {
    db.set_status(project_id, ProjectStatus::Processing)
        .map_err(|err| err.to_string())?;

    match run_pipeline(job, progress).await {
        Ok(output) => {
            let graph_json =
                serde_json::to_string(&output).map_err(|err| err.to_string())?;
            let metadata_json =
                serde_json::to_string(&output.metadata).map_err(|err| err.to_string())?;
            let mapping_json =
                serde_json::to_string(&output.resolved_mapping).map_err(|err| err.to_string())?;
            db.save_result(
                project_id,
                &graph_json,
                &metadata_json,
                Some(&mapping_json),
                &output.algorithm_used,
            )
            .map_err(|err| err.to_string())?;
            info!(
                project = project_id,
                algorithm = %output.algorithm_used,
                "graph processing complete"
            );
            Ok(output)
        }
        Err(err) => {
            if is_new_project {
                rollback(db, project_id);
            } else {
                warn!(project = project_id, error = %err, "recompute failed, keeping previous state");
                if let Err(db_err) = db.mark_failed(project_id, &err) {
                    error!(project = project_id, error = %db_err, "could not record failure");
                }
            }
            Err(err)
        }
    }
}

/// Recompute the layout of an existing project from its retained source file
/// and stored mapping.
pub async fn recompute(
    db: &Database,
    project_id: &str,
    algorithm: Option<String>,
    progress: Option<ProgressCallback>,
) -> Result<PipelineOutput, String> {
    let project = db
        .get_project(project_id)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("no project with id {project_id}"))?;

    let mapping = match &project.mapping {
        Some(json) => serde_json::from_str(json)
            .map_err(|err| format!("stored mapping is invalid: {err}"))?,
        None => Mapping::default(),
    };
    let job = ProcessJob::new(PathBuf::from(&project.source_file))
        .with_mapping(mapping)
        .with_algorithm(algorithm.unwrap_or(project.algorithm));

    run_job(db, project_id, job, false, progress).await
}

fn rollback(db: &Database, project_id: &str) {
    if let Ok(Some(project)) = db.get_project(project_id) {
        let source = Path::new(&project.source_file);
        if source.exists() {
            if let Err(err) = std::fs::remove_file(source) {
                warn!(
                    project = project_id,
                    file = %source.display(),
                    error = %err,
                    "could not remove source file during rollback"
                );
            }
        }
    }
    match db.delete_project(project_id) {
        Ok(()) => info!(project = project_id, "rolled back failed new project"),
        Err(err) => error!(project = project_id, error = %err, "rollback failed"),
    }
}
