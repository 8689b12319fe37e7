//! Best-effort remote project sync
//!
//! Pushes gzip-compressed project snapshots to the per-user remote store.
//! Sync is fire-and-forget: failures are logged, never surfaced to the
//! caller, and never roll back in-memory state. With no authenticated
//! session configured, sync is a silent no-op (no queuing, no retry). The
//! store keeps last-writer-wins semantics; two in-flight syncs race and the
//! last to complete wins.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use letra_common::config::CloudConfig;
use letra_common::model::Project;

const USER_AGENT: &str = concat!("letra-ed/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote sync errors (internal; callers only see logs)
#[derive(Debug, Error)]
enum SyncError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("compression failed: {0}")]
    Compress(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("remote store returned HTTP {0}")]
    Api(u16),
}

/// Client for the remote project store
pub struct CloudSync {
    http: reqwest::Client,
    config: Option<CloudConfig>,
}

impl CloudSync {
    /// Create the sync client; `config: None` means no authenticated session
    pub fn new(config: Option<CloudConfig>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Whether a user session is configured
    pub fn is_authenticated(&self) -> bool {
        self.config.is_some()
    }

    /// Push a snapshot. Never fails from the caller's perspective.
    pub async fn push(&self, project: &Project) {
        let Some(config) = &self.config else {
            debug!("cloud sync skipped: no authenticated session");
            return;
        };

        match self.try_push(config, project).await {
            Ok(()) => debug!(project_id = %project.id, "cloud sync completed"),
            Err(e) => warn!(project_id = %project.id, "cloud sync failed: {e}"),
        }
    }

    async fn try_push(&self, config: &CloudConfig, project: &Project) -> Result<(), SyncError> {
        let payload = compress_snapshot(project)?;
        let url = format!(
            "{}/users/{}/projects/{}",
            config.base_url.trim_end_matches('/'),
            config.user_id,
            project.id
        );

        let response = self
            .http
            .put(&url)
            .bearer_auth(&config.session_token)
            .header(reqwest::header::CONTENT_TYPE, "application/gzip")
            .header("x-client-timestamp", chrono::Utc::now().to_rfc3339())
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Api(status.as_u16()));
        }
        Ok(())
    }
}

/// Serialize a project and gzip the JSON blob
fn compress_snapshot(project: &Project) -> Result<Vec<u8>, SyncError> {
    let json = serde_json::to_vec(project)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}
