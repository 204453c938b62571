//! Minimal Gemini client for our use-case.
//!
//! We only call `models/{model}:generateContent` with a single user turn and
//! read back the concatenated text parts. Calls are instrumented and log the
//! model name, latency and response size (not contents).
//!
//! NOTE: We never log the API key.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::GeminiSettings;
use crate::gateway::{CompletionBackend, GatewayError};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  pub fn new(settings: GeminiSettings) -> Result<Self, GatewayError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(|e| GatewayError::Transport(e.to_string()))?;
    Ok(Self {
      client,
      api_key: settings.api_key,
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      model: settings.model,
    })
  }

  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let settings = GeminiSettings::from_env()?;
    match Self::new(settings) {
      Ok(g) => Some(g),
      Err(e) => {
        tracing::error!(target: "doomsday", error = %e, "Failed to build Gemini HTTP client");
        None
      }
    }
  }

  fn endpoint(&self) -> String {
    format!("{}/models/{}:generateContent", self.base_url, self.model)
  }
}

#[async_trait]
impl CompletionBackend for Gemini {
  fn name(&self) -> &str {
    &self.model
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
    let req = GenerateContentRequest {
      contents: vec![Content {
        role: "user".into(),
        parts: vec![Part { text: prompt.to_string() }],
      }],
    };

    let res = self.client.post(self.endpoint())
      .header(USER_AGENT, "doomsday-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, &self.api_key)
      .json(&req).send().await.map_err(|e| GatewayError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or(body);
      return Err(GatewayError::Upstream { status: status.as_u16(), message });
    }

    let body: GenerateContentResponse = res.json().await
      .map_err(|e| GatewayError::Malformed(format!("response envelope: {}", e)))?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, completion_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    Ok(body.text())
  }
}

// --- Gemini DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<Content>,
}
#[derive(Serialize)]
struct Content { role: String, parts: Vec<Part> }
#[derive(Serialize)]
struct Part { text: String }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate { #[serde(default)] content: Option<CandidateContent> }
#[derive(Deserialize)]
struct CandidateContent { #[serde(default)] parts: Vec<PartResp> }
#[derive(Deserialize)]
struct PartResp { #[serde(default)] text: Option<String> }
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

impl GenerateContentResponse {
  /// Text parts of the first candidate, concatenated.
  fn text(&self) -> String {
    self.candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
      .unwrap_or_default()
  }
}

/// Try to extract a clean error message from a Google API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
