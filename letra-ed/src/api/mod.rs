//! HTTP API handlers for letra-ed

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::MeterError;
use crate::session::SessionEntry;
use crate::AppState;

pub mod analysis;
pub mod export;
pub mod health;
pub mod planning;
pub mod projects;
pub mod structure;

pub use health::health_routes;

/// API error taxonomy.
///
/// Failures are contained within the operation that caused them; none may
/// corrupt the in-memory project tree. Background saves log-and-swallow
/// instead of going through here.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Completion gate rejected an edit
    #[error("Locked: {0}")]
    Locked(String),

    /// The meter analyzer is unreachable or returned garbage
    #[error("Analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Locked(_) => StatusCode::CONFLICT,
            ApiError::AnalysisUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<letra_common::Error> for ApiError {
    fn from(e: letra_common::Error) -> Self {
        match e {
            letra_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            letra_common::Error::InvalidInput(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<MeterError> for ApiError {
    fn from(e: MeterError) -> Self {
        ApiError::AnalysisUnavailable(e.to_string())
    }
}

/// Resolve a project session, hydrating from the local store when the
/// project is not currently open. Unknown ids are a 404.
pub async fn open_or_hydrate(
    state: &AppState,
    project_id: Uuid,
) -> Result<Arc<SessionEntry>, ApiError> {
    if let Some(entry) = state.sessions.get(project_id).await {
        return Ok(entry);
    }

    let snapshot = letra_common::db::load_snapshot(&state.db, project_id).await?;
    match snapshot {
        Some(project) => Ok(state.sessions.open(project).await),
        None => Err(ApiError::NotFound(format!("project {project_id}"))),
    }
}
