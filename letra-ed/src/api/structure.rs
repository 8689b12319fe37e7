//! Song-structure handlers: strophes, verses, reordering, bulk import,
//! music-structure tags
//!
//! Every successful mutation touches the project and schedules the
//! debounced local save and cloud sync. Mutations happen while holding the
//! session write lock; a newer edit simply wins in local state.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use letra_common::model::import::{parse_lyric_sheet, TagAssignment};
use letra_common::model::{
    ops, Architecture, EpisodeBeat, MusicSection, Project, RhymeTag, Strophe, Verse,
};

use super::{open_or_hydrate, ApiError};
use crate::session::SessionEntry;
use crate::{schedule_saves, AppState};

/// Run `mutate` under the session write lock, then schedule debounced saves
/// and return the updated project.
async fn mutate_project<F>(
    state: &AppState,
    project_id: Uuid,
    mutate: F,
) -> Result<Json<Project>, ApiError>
where
    F: FnOnce(&mut crate::session::ProjectSession) -> Result<(), ApiError>,
{
    let entry = open_or_hydrate(state, project_id).await?;
    let snapshot = mutate_entry(&entry, mutate).await?;
    schedule_saves(state, &entry, snapshot.clone()).await;
    Ok(Json(snapshot))
}

async fn mutate_entry<F>(entry: &SessionEntry, mutate: F) -> Result<Project, ApiError>
where
    F: FnOnce(&mut crate::session::ProjectSession) -> Result<(), ApiError>,
{
    let mut session = entry.session.write().await;
    mutate(&mut session)?;
    session.project.touch();
    Ok(session.project.clone())
}

/// POST /api/projects/:id/strophes: append an empty default strophe
pub async fn add_strophe(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        session.project.strophes.push(Strophe::prologue());
        Ok(())
    })
    .await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StropheMeta {
    pub architecture: Architecture,
    #[serde(default)]
    pub architecture_desc: Option<EpisodeBeat>,
    pub description: String,
    #[serde(default)]
    pub music_section: Option<MusicSection>,
}

/// PUT /api/projects/:id/strophes/:sid: replace strophe metadata
pub async fn update_strophe(
    State(state): State<AppState>,
    Path((project_id, strophe_id)): Path<(Uuid, Uuid)>,
    Json(meta): Json<StropheMeta>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        let strophe = session
            .project
            .strophe_mut(strophe_id)
            .ok_or_else(|| ApiError::NotFound(format!("strophe {strophe_id}")))?;
        strophe.architecture = meta.architecture;
        strophe.architecture_desc = meta.architecture_desc;
        strophe.description = meta.description;
        strophe.music_section = meta.music_section;
        Ok(())
    })
    .await
}

/// DELETE /api/projects/:id/strophes/:sid
pub async fn delete_strophe(
    State(state): State<AppState>,
    Path((project_id, strophe_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        ops::remove(&mut session.project.strophes, strophe_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("strophe {strophe_id}")))
    })
    .await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVerseRequest {
    /// Raw line; split on whitespace, upper-cased
    pub line: String,
    /// Insert after this verse; append when absent
    #[serde(default)]
    pub after: Option<Uuid>,
    #[serde(default)]
    pub tag: Option<RhymeTag>,
}

/// POST /api/projects/:id/strophes/:sid/verses
pub async fn add_verse(
    State(state): State<AppState>,
    Path((project_id, strophe_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<AddVerseRequest>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        let strophe = session
            .project
            .strophe_mut(strophe_id)
            .ok_or_else(|| ApiError::NotFound(format!("strophe {strophe_id}")))?;
        let verse = Verse::from_line(&body.line, body.tag.unwrap_or(RhymeTag::A));
        ops::insert_after(&mut strophe.verses, body.after, verse);
        Ok(())
    })
    .await
}

/// Annotation fields changed between the stored verse and the replacement.
///
/// Lyric edits (words, rhyme tag) and the gate's own required metadata
/// (function, technique, figure) are always allowed; everything deeper is
/// what the scholarly gate locks.
fn annotation_changed(old: &Verse, new: &Verse) -> bool {
    old.adlib != new.adlib
        || old.voice_type != new.voice_type
        || old.meta_tool != new.meta_tool
        || old.persona != new.persona
        || old.three_act != new.three_act
        || old.music_section != new.music_section
        || old.camera != new.camera
        || old.media != new.media
}

/// PUT /api/projects/:id/strophes/:sid/verses/:vid: whole-verse replace
pub async fn update_verse(
    State(state): State<AppState>,
    Path((project_id, strophe_id, verse_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(mut body): Json<Verse>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        if body.id != verse_id {
            return Err(ApiError::Validation(
                "verse id in body does not match path".to_string(),
            ));
        }
        // Re-apply case normalization; clients are not trusted to upper-case
        for word in &mut body.words {
            let text = word.text.clone();
            word.set_text(&text);
        }

        let gate = session.gate;
        let strophe = session
            .project
            .strophe_mut(strophe_id)
            .ok_or_else(|| ApiError::NotFound(format!("strophe {strophe_id}")))?;
        let position = strophe
            .verses
            .iter()
            .position(|v| v.id == verse_id)
            .ok_or_else(|| ApiError::NotFound(format!("verse {verse_id}")))?;

        let existing = &strophe.verses[position];
        if gate.locks(existing) && annotation_changed(existing, &body) {
            return Err(ApiError::Locked(
                "annotations are locked until function, technique and figure are set".to_string(),
            ));
        }

        strophe.verses[position] = body;
        Ok(())
    })
    .await
}

/// DELETE /api/projects/:id/strophes/:sid/verses/:vid
pub async fn delete_verse(
    State(state): State<AppState>,
    Path((project_id, strophe_id, verse_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        let strophe = session
            .project
            .strophe_mut(strophe_id)
            .ok_or_else(|| ApiError::NotFound(format!("strophe {strophe_id}")))?;
        ops::remove(&mut strophe.verses, verse_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("verse {verse_id}")))
    })
    .await
}

/// Reorder request: which ordered collection, and how
#[derive(Debug, Deserialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum ReorderRequest {
    /// Reorder the strophe sequence
    Strophes { from: usize, to: usize },
    /// Reorder verses within one strophe
    #[serde(rename_all = "camelCase")]
    Verses { strophe: Uuid, from: usize, to: usize },
    /// Reorder the music-structure tag sequence
    MusicStructure { from: usize, to: usize },
    /// Move a verse into another strophe
    #[serde(rename_all = "camelCase")]
    MoveVerse {
        verse: Uuid,
        from_strophe: Uuid,
        to_strophe: Uuid,
        dest_index: usize,
    },
}

/// POST /api/projects/:id/reorder
///
/// Out-of-range indices are a no-op, not an error: the tree is returned
/// unchanged and the UI stays responsive.
pub async fn reorder(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        let project = &mut session.project;
        match request {
            ReorderRequest::Strophes { from, to } => {
                ops::reorder(&mut project.strophes, from, to);
            }
            ReorderRequest::Verses { strophe, from, to } => {
                let strophe = project
                    .strophe_mut(strophe)
                    .ok_or_else(|| ApiError::NotFound("strophe".to_string()))?;
                ops::reorder(&mut strophe.verses, from, to);
            }
            ReorderRequest::MusicStructure { from, to } => {
                ops::reorder(&mut project.music_structure, from, to);
            }
            ReorderRequest::MoveVerse {
                verse,
                from_strophe,
                to_strophe,
                dest_index,
            } => {
                move_verse(project, verse, from_strophe, to_strophe, dest_index)?;
            }
        }
        Ok(())
    })
    .await
}

fn move_verse(
    project: &mut Project,
    verse: Uuid,
    from_strophe: Uuid,
    to_strophe: Uuid,
    dest_index: usize,
) -> Result<(), ApiError> {
    let from_idx = project
        .strophes
        .iter()
        .position(|s| s.id == from_strophe)
        .ok_or_else(|| ApiError::NotFound(format!("strophe {from_strophe}")))?;
    let to_idx = project
        .strophes
        .iter()
        .position(|s| s.id == to_strophe)
        .ok_or_else(|| ApiError::NotFound(format!("strophe {to_strophe}")))?;

    if from_idx == to_idx {
        let strophe = &mut project.strophes[from_idx];
        let moved = ops::remove(&mut strophe.verses, verse)
            .ok_or_else(|| ApiError::NotFound(format!("verse {verse}")))?;
        let index = dest_index.min(strophe.verses.len());
        strophe.verses.insert(index, moved);
        return Ok(());
    }

    // Disjoint split so both strophes can be borrowed mutably at once
    let (source, dest) = if from_idx < to_idx {
        let (left, right) = project.strophes.split_at_mut(to_idx);
        (&mut left[from_idx], &mut right[0])
    } else {
        let (left, right) = project.strophes.split_at_mut(from_idx);
        (&mut right[0], &mut left[to_idx])
    };

    if !ops::move_across(&mut source.verses, &mut dest.verses, verse, dest_index) {
        return Err(ApiError::NotFound(format!("verse {verse}")));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Full lyric sheet; strophes separated by blank lines
    pub text: String,
    /// Pseudo-random rhyme tags instead of all-A
    #[serde(default)]
    pub random_tags: bool,
}

/// POST /api/projects/:id/import
///
/// Appends the parsed batch; re-importing the same text appends a duplicate
/// batch by design.
pub async fn import_lyrics(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ImportRequest>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        let tags = if body.random_tags {
            TagAssignment::Random
        } else {
            TagAssignment::Fixed
        };
        let batch = parse_lyric_sheet(&body.text, tags);
        if batch.is_empty() {
            return Err(ApiError::Validation("no verses found in pasted text".to_string()));
        }
        session.project.strophes.extend(batch);
        Ok(())
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct MusicStructureReplace {
    pub sections: Vec<MusicSection>,
}

/// PUT /api/projects/:id/music-structure: replace the whole tag sequence
pub async fn replace_music_structure(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<MusicStructureReplace>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        session.project.music_structure = body.sections;
        Ok(())
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct MusicSectionRequest {
    pub section: MusicSection,
}

/// POST /api/projects/:id/music-structure/add: no-op when already present
pub async fn add_music_section(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<MusicSectionRequest>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        session.project.add_music_section(body.section);
        Ok(())
    })
    .await
}

/// POST /api/projects/:id/music-structure/remove
pub async fn remove_music_section(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<MusicSectionRequest>,
) -> Result<Json<Project>, ApiError> {
    mutate_project(&state, project_id, |session| {
        session.project.remove_music_section(body.section);
        Ok(())
    })
    .await
}
