//! Meter-analysis HTTP client
//!
//! Sends the flattened verse lines to the external syllable/stress analyzer
//! and returns the validated scansion. Fire-once on explicit user action:
//! no retry, no caching. The response is parsed defensively so a malformed
//! analyzer never produces a render-time panic downstream.

use std::time::Duration;
use thiserror::Error;

use letra_common::meter::{AnalyzeRequest, MeterAnalysis};

const USER_AGENT: &str = concat!("letra-ed/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Meter-analysis client errors
#[derive(Debug, Error)]
pub enum MeterError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Analyzer returned a non-2xx status
    #[error("Analyzer error: HTTP {0}")]
    Api(u16),

    /// Response did not match the expected schema
    #[error("Malformed analyzer response: {0}")]
    Malformed(String),
}

/// Client for the external meter-analysis service
pub struct MeterClient {
    http: reqwest::Client,
    base_url: String,
}

impl MeterClient {
    /// Create a client for the analyzer at `base_url`
    pub fn new(base_url: &str) -> Result<Self, MeterError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MeterError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST the verse lines to `{base}/analyze` and validate the response
    pub async fn analyze(&self, lines: Vec<String>) -> Result<MeterAnalysis, MeterError> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&AnalyzeRequest { lines })
            .send()
            .await
            .map_err(|e| MeterError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeterError::Api(status.as_u16()));
        }

        let analysis: MeterAnalysis = response
            .json()
            .await
            .map_err(|e| MeterError::Malformed(e.to_string()))?;

        analysis
            .validate()
            .map_err(|e| MeterError::Malformed(e.to_string()))?;

        Ok(analysis)
    }
}
