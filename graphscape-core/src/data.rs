use rusqlite::{Connection, OptionalExtension, Result, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Pending,
    Processing,
    Ready,
    Failed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Processing => "processing",
            ProjectStatus::Ready => "ready",
            ProjectStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProjectStatus::Pending),
            "processing" => Some(ProjectStatus::Processing),
            "ready" => Some(ProjectStatus::Ready),
            "failed" => Some(ProjectStatus::Failed),
            _ => None,
        }
    }
}

/// A stored visualization project: one source file, one mapping, one laid-out
/// graph. The mapping is persisted so layout recomputation does not require
/// re-mapping the columns.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub source_file: String,
    pub mapping: Option<String>,    // JSON
    pub algorithm: String,
    pub status: ProjectStatus,
    pub graph_data: Option<String>, // JSON
    pub metadata: Option<String>,   // JSON
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

impl Database {
    pub fn drop(path: &Path) {
        fs::remove_file(path).unwrap();
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Optimize for concurrent writers
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    source_file TEXT NOT NULL,
    mapping TEXT,             -- JSON {source, target, weight}
    algorithm TEXT NOT NULL DEFAULT 'auto',
    status TEXT NOT NULL CHECK(status IN ('pending', 'processing', 'ready', 'failed')),
    graph_data TEXT,          -- JSON pipeline output
    metadata TEXT,            -- JSON graph statistics
    last_error TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);
            ",
        )?;
        Ok(())
    }

    pub fn create_project(
        &self,
        name: &str,
        source_file: &str,
        mapping: Option<&str>,
        algorithm: &str,
    ) -> Result<String> {
        let project_id = uuid::Uuid::new_v4().to_string();
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO projects (id, name, source_file, mapping, algorithm, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &project_id,
                name,
                source_file,
                mapping,
                algorithm,
                "pending",
                timestamp,
                timestamp,
            ],
        )?;

        Ok(project_id)
    }

    pub fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, source_file, mapping, algorithm, status, graph_data, metadata,
                    last_error, created_at, updated_at
             FROM projects WHERE id = ?1",
        )?;
        stmt.query_row(params![project_id], row_to_project).optional()
    }

    pub fn get_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, source_file, mapping, algorithm, status, graph_data, metadata,
                    last_error, created_at, updated_at
             FROM projects WHERE name = ?1",
        )?;
        stmt.query_row(params![name], row_to_project).optional()
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, source_file, mapping, algorithm, status, graph_data, metadata,
                    last_error, created_at, updated_at
             FROM projects ORDER BY created_at",
        )?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<Result<Vec<_>>>()?;
        Ok(projects)
    }

    pub fn set_status(&self, project_id: &str, status: ProjectStatus) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE projects SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), timestamp, project_id],
        )?;
        Ok(())
    }

    /// Store a completed run: graph, statistics, the mapping actually used
    /// and the algorithm actually executed (after auto-resolution).
    pub fn save_result(
        &self,
        project_id: &str,
        graph_data: &str,
        metadata: &str,
        mapping: Option<&str>,
        algorithm: &str,
    ) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE projects
             SET status = 'ready', graph_data = ?1, metadata = ?2,
                 mapping = COALESCE(?3, mapping), algorithm = ?4,
                 last_error = NULL, updated_at = ?5
             WHERE id = ?6",
            params![graph_data, metadata, mapping, algorithm, timestamp, project_id],
        )?;
        Ok(())
    }

    /// Mark a run as failed without touching the previously stored graph.
    pub fn mark_failed(&self, project_id: &str, error: &str) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE projects SET status = 'failed', last_error = ?1, updated_at = ?2 WHERE id = ?3",
            params![error, timestamp, project_id],
        )?;
        Ok(())
    }

    pub fn delete_project(&self, project_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
        Ok(())
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

fn row_to_project(row: &rusqlite::Row) -> Result<Project> {
    let status: String = row.get(5)?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        source_file: row.get(2)?,
        mapping: row.get(3)?,
        algorithm: row.get(4)?,
        status: ProjectStatus::from_str(&status).unwrap_or(ProjectStatus::Failed),
        graph_data: row.get(6)?,
        metadata: row.get(7)?,
        last_error: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
