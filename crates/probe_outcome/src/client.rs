//! Reqwest client for the generative outcome endpoint.

use crate::backend::{fallback_outcome, normalize_outcome};
use crate::request::{build_prompt, OutcomeRequest};
use probe_core::{MissionConfig, MissionOutcome};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("empty response from the outcome service")]
    EmptyResponse,
    #[error("malformed outcome payload: {0}")]
    Parse(#[from] serde_json::Error),
}

// Wire shape of a generateContent reply; only the first candidate's text
// matters here.
#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Client for the external generative endpoint. `simulate` never fails from
/// the caller's perspective; every error path serves the fallback outcome.
#[derive(Debug, Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GenerativeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Point the client somewhere else, e.g. a local stub during development.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        GenerativeClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub async fn simulate(&self, config: &MissionConfig, launch_score: u32) -> MissionOutcome {
        let request = OutcomeRequest::from_config(config, launch_score);
        match self.request_outcome(&request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("outcome request failed, serving fallback: {err}");
                fallback_outcome()
            }
        }
    }

    async fn request_outcome(
        &self,
        request: &OutcomeRequest,
    ) -> Result<MissionOutcome, OutcomeError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(request) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.7,
            },
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let reply: GenerateReply = response.json().await?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(OutcomeError::EmptyResponse)?;

        let outcome: MissionOutcome = serde_json::from_str(&text)?;
        Ok(normalize_outcome(outcome))
    }
}
