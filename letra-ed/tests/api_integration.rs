//! End-to-end API tests against the full router with an in-memory store

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use letra_common::db;
use letra_ed::services::{CloudSync, MeterClient};
use letra_ed::{build_router, AppState};

async fn test_app() -> Router {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::init_schema(&pool).await.expect("schema init");
    // Analyzer endpoint is never reached by these tests
    let meter = MeterClient::new("http://127.0.0.1:1").expect("client");
    let cloud = CloudSync::new(None).expect("client");
    build_router(AppState::new(pool, meter, cloud))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_project(app: &Router) -> Value {
    let (status, project) = send(app, "POST", "/api/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    project
}

fn project_uri(project: &Value, rest: &str) -> String {
    format!("/api/projects/{}{rest}", project["id"].as_str().unwrap())
}

#[tokio::test]
async fn health_reports_module_and_version() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "letra-ed");
}

#[tokio::test]
async fn new_project_starts_with_one_prologue_strophe() {
    let app = test_app().await;
    let project = create_project(&app).await;

    let strophes = project["strophes"].as_array().unwrap();
    assert_eq!(strophes.len(), 1);
    assert_eq!(strophes[0]["architecture"], "Prólogo");
    assert!(strophes[0]["verses"].as_array().unwrap().is_empty());

    // Release checklist is seeded
    assert_eq!(project["planning"]["release"].as_array().unwrap().len(), 3);

    let (status, fetched) = send(&app, "GET", &project_uri(&project, ""), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], project["id"]);
}

#[tokio::test]
async fn unknown_project_is_404() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "GET",
        "/api/projects/00000000-0000-4000-8000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Not found"));
}

#[tokio::test]
async fn explicit_save_requires_title_and_artist() {
    let app = test_app().await;
    let project = create_project(&app).await;

    let (status, _) = send(&app, "POST", &project_uri(&project, "/save"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "PUT",
        &project_uri(&project, "/song-info"),
        Some(json!({
            "title": "Obra Erudita",
            "artist": "Diepretty",
            "featuring": [],
            "producer": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", &project_uri(&project, "/save"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);

    let (status, listing) = send(&app, "GET", "/api/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    let listing = listing.as_array().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["title"], "Obra Erudita");
}

#[tokio::test]
async fn added_verses_are_uppercased_and_ordered() {
    let app = test_app().await;
    let project = create_project(&app).await;
    let strophe_id = project["strophes"][0]["id"].as_str().unwrap().to_string();
    let verses_uri = project_uri(&project, &format!("/strophes/{strophe_id}/verses"));

    let (status, updated) = send(
        &app,
        "POST",
        &verses_uri,
        Some(json!({"line": "faz te um ambo agora"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let verse = &updated["strophes"][0]["verses"][0];
    let words: Vec<&str> = verse["words"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["text"].as_str().unwrap())
        .collect();
    assert_eq!(words, ["FAZ", "TE", "UM", "AMBO", "AGORA"]);
    assert_eq!(verse["tag"], "A");
    // New verses carry the standard camera setup
    assert_eq!(verse["camera"]["shotType"], "eyeLevel");
}

#[tokio::test]
async fn import_splits_blank_line_groups_into_strophes() {
    let app = test_app().await;
    let project = create_project(&app).await;

    let (status, updated) = send(
        &app,
        "POST",
        &project_uri(&project, "/import"),
        Some(json!({"text": "primeira linha\nsegunda linha\n\nterceira linha"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // One seeded strophe plus two imported
    let strophes = updated["strophes"].as_array().unwrap();
    assert_eq!(strophes.len(), 3);
    assert_eq!(strophes[1]["verses"].as_array().unwrap().len(), 2);
    assert_eq!(strophes[2]["verses"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        &project_uri(&project, "/import"),
        Some(json!({"text": "   \n\n  "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn reorder_moves_verses_and_ignores_out_of_range_indices() {
    let app = test_app().await;
    let project = create_project(&app).await;
    let strophe_id = project["strophes"][0]["id"].as_str().unwrap().to_string();
    let verses_uri = project_uri(&project, &format!("/strophes/{strophe_id}/verses"));

    for line in ["um", "dois", "tres"] {
        let (status, _) = send(&app, "POST", &verses_uri, Some(json!({"line": line}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, updated) = send(
        &app,
        "POST",
        &project_uri(&project, "/reorder"),
        Some(json!({"target": "verses", "strophe": strophe_id, "from": 0, "to": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let lines: Vec<String> = updated["strophes"][0]["verses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["words"][0]["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(lines, ["DOIS", "TRES", "UM"]);

    // Out-of-range index: 200, tree unchanged
    let (status, unchanged) = send(
        &app,
        "POST",
        &project_uri(&project, "/reorder"),
        Some(json!({"target": "verses", "strophe": strophe_id, "from": 7, "to": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["strophes"][0]["verses"], updated["strophes"][0]["verses"]);
}

#[tokio::test]
async fn move_verse_relocates_across_strophes() {
    let app = test_app().await;
    let project = create_project(&app).await;
    let first = project["strophes"][0]["id"].as_str().unwrap().to_string();

    let (_, project) = send(&app, "POST", &project_uri(&project, "/strophes"), None).await;
    let second = project["strophes"][1]["id"].as_str().unwrap().to_string();

    let (_, project) = send(
        &app,
        "POST",
        &project_uri(&project, &format!("/strophes/{first}/verses")),
        Some(json!({"line": "migrante"})),
    )
    .await;
    let verse_id = project["strophes"][0]["verses"][0]["id"].as_str().unwrap().to_string();

    let (status, moved) = send(
        &app,
        "POST",
        &project_uri(&project, "/reorder"),
        Some(json!({
            "target": "moveVerse",
            "verse": verse_id,
            "fromStrophe": first,
            "toStrophe": second,
            "destIndex": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(moved["strophes"][0]["verses"].as_array().unwrap().is_empty());
    assert_eq!(moved["strophes"][1]["verses"][0]["id"], verse_id.as_str());
}

#[tokio::test]
async fn scholarly_mode_locks_annotations_until_metadata_complete() {
    let app = test_app().await;
    let project = create_project(&app).await;
    let strophe_id = project["strophes"][0]["id"].as_str().unwrap().to_string();

    let (_, project) = send(
        &app,
        "POST",
        &project_uri(&project, &format!("/strophes/{strophe_id}/verses")),
        Some(json!({"line": "a vida e um sonho"})),
    )
    .await;
    let verse = project["strophes"][0]["verses"][0].clone();
    let verse_id = verse["id"].as_str().unwrap().to_string();
    let verse_uri = project_uri(
        &project,
        &format!("/strophes/{strophe_id}/verses/{verse_id}"),
    );

    let (status, _) = send(
        &app,
        "PUT",
        &project_uri(&project, "/mode"),
        Some(json!({"mode": "scholarly"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Annotation edit while metadata is incomplete: rejected
    let mut annotated = verse.clone();
    annotated["adlib"] = json!("yeah");
    let (status, body) = send(&app, "PUT", &verse_uri, Some(annotated.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Locked"));

    // Filling the required metadata is always allowed
    let mut completed = verse.clone();
    completed["function"] = json!("Tese");
    completed["technique"] = json!("Storytelling");
    completed["figure"] = json!("Metáfora");
    let (status, _) = send(&app, "PUT", &verse_uri, Some(completed.clone())).await;
    assert_eq!(status, StatusCode::OK);

    // Now the annotation edit goes through
    completed["adlib"] = json!("yeah");
    let (status, updated) = send(&app, "PUT", &verse_uri, Some(completed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["strophes"][0]["verses"][0]["adlib"], "yeah");
}

#[tokio::test]
async fn music_structure_add_is_idempotent() {
    let app = test_app().await;
    let project = create_project(&app).await;
    let uri = project_uri(&project, "/music-structure/add");

    let (_, updated) = send(&app, "POST", &uri, Some(json!({"section": "refrao"}))).await;
    let (_, updated2) = send(&app, "POST", &uri, Some(json!({"section": "refrao"}))).await;
    assert_eq!(updated["musicStructure"], json!(["refrao"]));
    assert_eq!(updated2["musicStructure"], json!(["refrao"]));

    let (_, removed) = send(
        &app,
        "POST",
        &project_uri(&project, "/music-structure/remove"),
        Some(json!({"section": "refrao"})),
    )
    .await;
    assert!(removed["musicStructure"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn release_steps_unlock_phase_by_phase() {
    let app = test_app().await;
    let project = create_project(&app).await;
    let toggle_uri = project_uri(&project, "/planning/release/toggle");

    // Second-phase step while the first phase is incomplete: locked
    let (status, _) = send(
        &app,
        "POST",
        &toggle_uri,
        Some(json!({"stepId": "youtube-1", "completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for step in ["launch-1", "launch-2", "launch-3"] {
        let (status, _) = send(
            &app,
            "POST",
            &toggle_uri,
            Some(json!({"stepId": step, "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, planning) = send(
        &app,
        "POST",
        &toggle_uri,
        Some(json!({"stepId": "youtube-1", "completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(planning["release"][1]["steps"][0]["completed"], true);

    // Unknown step id
    let (status, _) = send(
        &app,
        "POST",
        &toggle_uri,
        Some(json!({"stepId": "nope", "completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn budget_replace_and_summary() {
    let app = test_app().await;
    let project = create_project(&app).await;

    let (status, _) = send(
        &app,
        "PUT",
        &project_uri(&project, "/planning/budget"),
        Some(json!([
            {"id": "8f4e4f9e-1111-4e3b-8a77-000000000001", "label": "Estúdio",
             "category": "Gravação", "amountCents": 25000, "paid": true},
            {"id": "8f4e4f9e-1111-4e3b-8a77-000000000002", "label": "Drone",
             "category": "Vídeo", "amountCents": 10000, "paid": false}
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, summary) = send(
        &app,
        "GET",
        &project_uri(&project, "/planning/budget/summary"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalCents"], 35000);
    assert_eq!(summary["outstandingCents"], 10000);
}

#[tokio::test]
async fn lyric_sheet_export_returns_a_pdf_attachment() {
    let app = test_app().await;
    let project = create_project(&app).await;
    let strophe_id = project["strophes"][0]["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        &project_uri(&project, &format!("/strophes/{strophe_id}/verses")),
        Some(json!({"line": "faz te um ambo"})),
    )
    .await;

    let request = Request::builder()
        .method("GET")
        .uri(project_uri(&project, "/export/lyrics.pdf"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("artista_musica.pdf"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn delete_removes_the_project_everywhere() {
    let app = test_app().await;
    let project = create_project(&app).await;

    let (status, body) = send(&app, "DELETE", &project_uri(&project, ""), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = send(&app, "GET", &project_uri(&project, ""), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &project_uri(&project, ""), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
