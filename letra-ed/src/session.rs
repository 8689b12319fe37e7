//! In-memory project sessions
//!
//! One session per open project: the project tree, its transient analysis
//! view state, and the two per-project debouncers. The tree has a single
//! owner; every mutation happens while holding the session's write lock, so
//! edits are serialized and background saves only ever read snapshots.
//! Analysis results are view state: held here, never persisted.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use letra_common::gating::CompletionGate;
use letra_common::meter::MeterAnalysis;
use letra_common::model::Project;

use crate::services::{Debouncer, CLOUD_SYNC_DEBOUNCE, LOCAL_SAVE_DEBOUNCE};

/// Mutable per-project editing state
pub struct ProjectSession {
    pub project: Project,
    pub gate: CompletionGate,
    /// Last analyzer response; transient, not part of the snapshot
    pub analysis: Option<MeterAnalysis>,
    pub show_analysis: bool,
}

impl ProjectSession {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            gate: CompletionGate::Standard,
            analysis: None,
            show_analysis: false,
        }
    }
}

/// A session plus its save schedulers
pub struct SessionEntry {
    pub session: RwLock<ProjectSession>,
    pub local_save: Debouncer,
    pub cloud_sync: Debouncer,
}

impl SessionEntry {
    fn new(project: Project) -> Self {
        Self {
            session: RwLock::new(ProjectSession::new(project)),
            local_save: Debouncer::new(LOCAL_SAVE_DEBOUNCE),
            cloud_sync: Debouncer::new(CLOUD_SYNC_DEBOUNCE),
        }
    }
}

/// Registry of open projects
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, Arc<SessionEntry>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project, returning its session entry. An already-open
    /// project keeps its existing session.
    pub async fn open(&self, project: Project) -> Arc<SessionEntry> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(project.id)
            .or_insert_with(|| Arc::new(SessionEntry::new(project)))
            .clone()
    }

    /// Look up an open session
    pub async fn get(&self, project_id: Uuid) -> Option<Arc<SessionEntry>> {
        self.sessions.read().await.get(&project_id).cloned()
    }

    /// Close a session, cancelling any pending debounced saves
    pub async fn close(&self, project_id: Uuid) -> Option<Arc<SessionEntry>> {
        let entry = self.sessions.write().await.remove(&project_id)?;
        entry.local_save.cancel().await;
        entry.cloud_sync.cancel().await;
        Some(entry)
    }
}
