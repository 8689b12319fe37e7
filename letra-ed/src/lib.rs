//! letra-ed - Songwriting and music-video production editor service
//!
//! Serves the editor HTTP API: project lifecycle, song-structure editing,
//! bulk lyric import, meter analysis, production planning and PDF exports.
//! Open projects live in per-project sessions; every mutation schedules a
//! debounced local snapshot save and a debounced cloud sync.

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use letra_common::db;
use letra_common::model::Project;

pub mod api;
pub mod services;
pub mod session;

use services::{CloudSync, MeterClient};
use session::{SessionEntry, SessionManager};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: Arc<SessionManager>,
    pub meter: Arc<MeterClient>,
    pub cloud: Arc<CloudSync>,
}

impl AppState {
    pub fn new(db: SqlitePool, meter: MeterClient, cloud: CloudSync) -> Self {
        Self {
            db,
            sessions: Arc::new(SessionManager::new()),
            meter: Arc::new(meter),
            cloud: Arc::new(cloud),
        }
    }
}

/// Schedule the debounced local save and cloud sync for a fresh snapshot.
///
/// Both writes are fire-and-forget; failures are logged and never surfaced
/// to the edit that triggered them.
pub async fn schedule_saves(state: &AppState, entry: &SessionEntry, snapshot: Project) {
    let pool = state.db.clone();
    let local = snapshot.clone();
    entry
        .local_save
        .schedule(async move {
            match db::upsert_snapshot(&pool, &local).await {
                Ok(()) => debug!(project_id = %local.id, "local snapshot saved"),
                Err(e) => warn!(project_id = %local.id, "local save failed: {e}"),
            }
        })
        .await;

    let cloud = state.cloud.clone();
    entry
        .cloud_sync
        .schedule(async move {
            cloud.push(&snapshot).await;
        })
        .await;
}

/// Build the axum router with all editor routes
pub fn build_router(state: AppState) -> Router {
    use api::{analysis, export, planning, projects, structure};

    Router::new()
        .route(
            "/api/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/api/projects/:id",
            get(projects::get_project).delete(projects::delete_project),
        )
        .route("/api/projects/:id/save", post(projects::save_project))
        .route("/api/projects/:id/song-info", put(projects::update_song_info))
        .route("/api/projects/:id/mode", put(projects::set_mode))
        .route("/api/projects/:id/strophes", post(structure::add_strophe))
        .route(
            "/api/projects/:id/strophes/:sid",
            put(structure::update_strophe).delete(structure::delete_strophe),
        )
        .route(
            "/api/projects/:id/strophes/:sid/verses",
            post(structure::add_verse),
        )
        .route(
            "/api/projects/:id/strophes/:sid/verses/:vid",
            put(structure::update_verse).delete(structure::delete_verse),
        )
        .route("/api/projects/:id/reorder", post(structure::reorder))
        .route("/api/projects/:id/import", post(structure::import_lyrics))
        .route(
            "/api/projects/:id/music-structure",
            put(structure::replace_music_structure),
        )
        .route(
            "/api/projects/:id/music-structure/add",
            post(structure::add_music_section),
        )
        .route(
            "/api/projects/:id/music-structure/remove",
            post(structure::remove_music_section),
        )
        .route("/api/projects/:id/analyze", post(analysis::analyze_project))
        .route(
            "/api/projects/:id/analysis",
            get(analysis::get_analysis).put(analysis::set_analysis_visibility),
        )
        .route(
            "/api/projects/:id/export/lyrics.pdf",
            get(export::export_lyrics),
        )
        .route(
            "/api/projects/:id/export/shooting-script.pdf",
            get(export::export_shooting_script),
        )
        .route("/api/projects/:id/planning", get(planning::get_planning))
        .route(
            "/api/projects/:id/planning/budget",
            put(planning::replace_budget),
        )
        .route(
            "/api/projects/:id/planning/budget/summary",
            get(planning::budget_summary),
        )
        .route(
            "/api/projects/:id/planning/wardrobe",
            put(planning::replace_wardrobe),
        )
        .route("/api/projects/:id/planning/team", put(planning::replace_team))
        .route(
            "/api/projects/:id/planning/release",
            put(planning::replace_release_plan),
        )
        .route(
            "/api/projects/:id/planning/release/toggle",
            post(planning::toggle_release_step),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
