//! Meter-analysis handlers
//!
//! Analysis is an explicit request: flatten the verse lines, call the
//! external analyzer, and only on a validated response write stress flags
//! back onto the tree. A failed call leaves the project and the analysis
//! view untouched.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use letra_common::meter::{self, MeterAnalysis};

use super::{open_or_hydrate, ApiError};
use crate::{schedule_saves, AppState};

/// POST /api/projects/:id/analyze
pub async fn analyze_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<MeterAnalysis>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;

    let lines = {
        let session = entry.session.read().await;
        meter::flatten_lines(&session.project)
    };
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Err(ApiError::Validation(
            "project has no verse text to analyze".to_string(),
        ));
    }

    // The analyzer call happens outside the session lock; a slow upstream
    // must not block editing.
    let analysis = state.meter.analyze(lines).await?;
    info!(%project_id, lines = analysis.original_lines.len(), meter = ?analysis.meter, "meter analysis applied");

    let snapshot = {
        let mut session = entry.session.write().await;
        meter::apply_stress(&mut session.project, &analysis);
        session.project.touch();
        session.analysis = Some(analysis.clone());
        session.show_analysis = true;
        session.project.clone()
    };
    schedule_saves(&state, &entry, snapshot).await;

    Ok(Json(analysis))
}

/// Current analysis view state for a project
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub show_analysis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MeterAnalysis>,
}

/// GET /api/projects/:id/analysis
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<AnalysisView>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let session = entry.session.read().await;
    Ok(Json(AnalysisView {
        show_analysis: session.show_analysis,
        analysis: session.analysis.clone(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisVisibility {
    pub show_analysis: bool,
}

/// PUT /api/projects/:id/analysis: toggle the overlay without re-analyzing
pub async fn set_analysis_visibility(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<AnalysisVisibility>,
) -> Result<Json<AnalysisView>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let mut session = entry.session.write().await;
    session.show_analysis = body.show_analysis;
    Ok(Json(AnalysisView {
        show_analysis: session.show_analysis,
        analysis: session.analysis.clone(),
    }))
}
