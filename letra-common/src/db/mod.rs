//! Database access layer
//!
//! The local durable store is a single SQLite table of project snapshots:
//! the raw (uncompressed) project JSON keyed by project id, alongside the
//! last-modified timestamp and denormalized title/artist columns for
//! listing. Snapshots are whole-tree: there are no partial updates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::model::Project;
use crate::{Error, Result};

/// Connect to the snapshot database, creating the file if needed
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
        .map_err(Error::Database)?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Create the snapshot table if it does not exist
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            project_id TEXT PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            artist TEXT NOT NULL DEFAULT '',
            data TEXT NOT NULL,
            last_modified TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Listing row for the saved-projects screen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub title: String,
    pub artist: String,
    pub last_modified: DateTime<Utc>,
}

/// Insert or replace the snapshot for a project
pub async fn upsert_snapshot(pool: &SqlitePool, project: &Project) -> Result<()> {
    let data = serde_json::to_string(project)?;
    sqlx::query(
        r#"
        INSERT INTO projects (project_id, title, artist, data, last_modified)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(project_id) DO UPDATE SET
            title = excluded.title,
            artist = excluded.artist,
            data = excluded.data,
            last_modified = excluded.last_modified
        "#,
    )
    .bind(project.id.to_string())
    .bind(&project.song_info.title)
    .bind(&project.song_info.artist)
    .bind(data)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load a snapshot; `None` when the project has never been saved
pub async fn load_snapshot(pool: &SqlitePool, project_id: Uuid) -> Result<Option<Project>> {
    let row = sqlx::query("SELECT data FROM projects WHERE project_id = ?")
        .bind(project_id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let data: String = row.get("data");
            Ok(Some(serde_json::from_str(&data)?))
        }
        None => Ok(None),
    }
}

/// List saved projects, most recently modified first
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<ProjectSummary>> {
    let rows = sqlx::query(
        "SELECT project_id, title, artist, last_modified FROM projects \
         ORDER BY last_modified DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let id: String = row.get("project_id");
            let ts: String = row.get("last_modified");
            Ok(ProjectSummary {
                project_id: Uuid::parse_str(&id)
                    .map_err(|e| Error::Internal(format!("bad project id in db: {e}")))?,
                title: row.get("title"),
                artist: row.get("artist"),
                last_modified: DateTime::parse_from_rfc3339(&ts)
                    .map_err(|e| Error::Internal(format!("bad timestamp in db: {e}")))?
                    .with_timezone(&Utc),
            })
        })
        .collect()
}

/// Delete a snapshot; true when a row was removed
pub async fn delete_project(pool: &SqlitePool, project_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE project_id = ?")
        .bind(project_id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
