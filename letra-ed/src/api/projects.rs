//! Project lifecycle handlers: create, list, open, save, delete, metadata

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use letra_common::db::{self, ProjectSummary};
use letra_common::gating::CompletionGate;
use letra_common::model::{Project, SongInfo};

use super::{open_or_hydrate, ApiError};
use crate::{schedule_saves, AppState};

/// POST /api/projects
///
/// Create a project with one empty default strophe and open its session.
pub async fn create_project(State(state): State<AppState>) -> Result<Json<Project>, ApiError> {
    let project = Project::new();
    info!(project_id = %project.id, "project created");
    let entry = state.sessions.open(project.clone()).await;
    schedule_saves(&state, &entry, project.clone()).await;
    Ok(Json(project))
}

/// GET /api/projects: saved projects, most recently modified first
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    Ok(Json(db::list_projects(&state.db).await?))
}

/// GET /api/projects/:id: open (hydrating from the local store if needed)
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let project = entry.session.read().await.project.clone();
    Ok(Json(project))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// DELETE /api/projects/:id: close the session and drop the snapshot
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let had_session = state.sessions.close(project_id).await.is_some();
    let had_row = db::delete_project(&state.db, project_id).await?;
    if !had_session && !had_row {
        return Err(ApiError::NotFound(format!("project {project_id}")));
    }
    info!(%project_id, "project deleted");
    Ok(Json(DeleteResponse { deleted: true }))
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
}

/// POST /api/projects/:id/save
///
/// Explicit user-triggered save: validates required metadata, writes the
/// local snapshot synchronously and pushes to the cloud best-effort.
pub async fn save_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<SaveResponse>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let project = entry.session.read().await.project.clone();

    if project.song_info.title.trim().is_empty() {
        return Err(ApiError::Validation("project is missing a song title".to_string()));
    }
    if project.song_info.artist.trim().is_empty() {
        return Err(ApiError::Validation("project is missing an artist".to_string()));
    }

    db::upsert_snapshot(&state.db, &project).await?;

    // Cloud push stays best-effort even for explicit saves
    let cloud = state.cloud.clone();
    tokio::spawn(async move { cloud.push(&project).await });

    Ok(Json(SaveResponse { saved: true }))
}

/// PUT /api/projects/:id/song-info
pub async fn update_song_info(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(song_info): Json<SongInfo>,
) -> Result<Json<Project>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let snapshot = {
        let mut session = entry.session.write().await;
        session.project.song_info = song_info;
        session.project.touch();
        session.project.clone()
    };
    schedule_saves(&state, &entry, snapshot.clone()).await;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ModeRequest {
    pub mode: CompletionGate,
}

/// PUT /api/projects/:id/mode: switch between standard and scholarly gating
pub async fn set_mode(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ModeRequest>,
) -> Result<Json<ModeRequest>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    entry.session.write().await.gate = body.mode;
    Ok(Json(body))
}
