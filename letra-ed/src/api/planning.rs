//! Production-planning handlers: budget, wardrobe, contracts, release plan
//!
//! The planning lists are replaced wholesale by the corresponding screen;
//! only the release checklist has server-side behavior (the phase unlock
//! rule).

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use letra_common::planning::{
    outstanding_cents, phase_unlocked, BudgetItem, Planning, ReleasePhase, TeamMember,
    WardrobeItem,
};

use super::{open_or_hydrate, ApiError};
use crate::{schedule_saves, AppState};

async fn replace_planning<F>(
    state: &AppState,
    project_id: Uuid,
    apply: F,
) -> Result<Json<Planning>, ApiError>
where
    F: FnOnce(&mut Planning) -> Result<(), ApiError>,
{
    let entry = open_or_hydrate(state, project_id).await?;
    let (snapshot, planning) = {
        let mut session = entry.session.write().await;
        apply(&mut session.project.planning)?;
        session.project.touch();
        (session.project.clone(), session.project.planning.clone())
    };
    schedule_saves(state, &entry, snapshot).await;
    Ok(Json(planning))
}

/// GET /api/projects/:id/planning
pub async fn get_planning(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Planning>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let planning = entry.session.read().await.project.planning.clone();
    Ok(Json(planning))
}

/// PUT /api/projects/:id/planning/budget
pub async fn replace_budget(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(items): Json<Vec<BudgetItem>>,
) -> Result<Json<Planning>, ApiError> {
    replace_planning(&state, project_id, |planning| {
        planning.budget = items;
        Ok(())
    })
    .await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub total_cents: i64,
    pub outstanding_cents: i64,
}

/// GET /api/projects/:id/planning/budget/summary
pub async fn budget_summary(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<BudgetSummary>, ApiError> {
    let entry = open_or_hydrate(&state, project_id).await?;
    let session = entry.session.read().await;
    let budget = &session.project.planning.budget;
    Ok(Json(BudgetSummary {
        total_cents: budget.iter().map(|b| b.amount_cents).sum(),
        outstanding_cents: outstanding_cents(budget),
    }))
}

/// PUT /api/projects/:id/planning/wardrobe
pub async fn replace_wardrobe(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(items): Json<Vec<WardrobeItem>>,
) -> Result<Json<Planning>, ApiError> {
    replace_planning(&state, project_id, |planning| {
        planning.wardrobe = items;
        Ok(())
    })
    .await
}

/// PUT /api/projects/:id/planning/team
pub async fn replace_team(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(members): Json<Vec<TeamMember>>,
) -> Result<Json<Planning>, ApiError> {
    replace_planning(&state, project_id, |planning| {
        planning.team = members;
        Ok(())
    })
    .await
}

/// PUT /api/projects/:id/planning/release: replace the whole checklist
pub async fn replace_release_plan(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(phases): Json<Vec<ReleasePhase>>,
) -> Result<Json<Planning>, ApiError> {
    replace_planning(&state, project_id, |planning| {
        planning.release = phases;
        Ok(())
    })
    .await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStepToggle {
    pub step_id: String,
    pub completed: bool,
}

/// POST /api/projects/:id/planning/release/toggle
///
/// Completing a step in a still-locked phase is rejected; un-checking is
/// always allowed.
pub async fn toggle_release_step(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ReleaseStepToggle>,
) -> Result<Json<Planning>, ApiError> {
    replace_planning(&state, project_id, |planning| {
        let phase_index = planning
            .release
            .iter()
            .position(|p| p.steps.iter().any(|s| s.id == body.step_id))
            .ok_or_else(|| ApiError::NotFound(format!("release step {}", body.step_id)))?;

        if body.completed && !phase_unlocked(&planning.release, phase_index) {
            return Err(ApiError::Locked(format!(
                "phase '{}' is locked until earlier phases are complete",
                planning.release[phase_index].title
            )));
        }

        let step = planning.release[phase_index]
            .steps
            .iter_mut()
            .find(|s| s.id == body.step_id)
            .expect("phase located by containing this step");
        step.completed = body.completed;
        Ok(())
    })
    .await
}
