//! PDF export handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;
use uuid::Uuid;

use super::{open_or_hydrate, ApiError};
use crate::services::pdf::{self, ExportError};
use crate::AppState;

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

fn pdf_response(bytes: Vec<u8>, filename: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /api/projects/:id/export/lyrics.pdf
pub async fn export_lyrics(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let project = entry.session.read().await.project.clone();

    let bytes = pdf::lyric_sheet(&project)?;
    let filename = pdf::export_filename(&project.song_info, "");
    info!(%project_id, %filename, bytes = bytes.len(), "lyric sheet exported");
    Ok(pdf_response(bytes, filename))
}

/// GET /api/projects/:id/export/shooting-script.pdf
pub async fn export_shooting_script(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let project = entry.session.read().await.project.clone();

    let bytes = pdf::shooting_script(&project)?;
    let filename = pdf::export_filename(&project.song_info, "_guiao");
    info!(%project_id, %filename, bytes = bytes.len(), "shooting script exported");
    Ok(pdf_response(bytes, filename))
}
