//! Loading quiz configuration (timings + prompt overrides) from TOML.
//!
//! Everything is optional; a missing or broken file means defaults. Schema:
//!
//! ```toml
//! [quiz]
//! question_count = 5
//! countdown_secs = 60
//! shake_every_secs = 7
//! shake_ms = 500
//! min_analysis_ms = 7000
//! session_ttl_secs = 1800
//!
//! [prompts.ko]
//! questions = "... {count} ..."
//! result = "... {history} ..."
//! ```

use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub quiz: QuizTimings,
  /// Per-locale template overrides, keyed by locale code.
  #[serde(default)]
  pub prompts: HashMap<String, PromptOverride>,
}

/// Durations and sizes that drive the quiz flow.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizTimings {
  pub question_count: usize,
  pub countdown_secs: u32,
  pub shake_every_secs: u64,
  pub shake_ms: u64,
  pub min_analysis_ms: u64,
  pub session_ttl_secs: u64,
}

impl Default for QuizTimings {
  fn default() -> Self {
    Self {
      question_count: 5,
      countdown_secs: 60,
      shake_every_secs: 7,
      shake_ms: 500,
      min_analysis_ms: 7000,
      session_ttl_secs: 30 * 60,
    }
  }
}

impl QuizTimings {
  pub fn shake_every(&self) -> Duration { Duration::from_secs(self.shake_every_secs) }
  pub fn shake_duration(&self) -> Duration { Duration::from_millis(self.shake_ms) }
  pub fn min_analysis(&self) -> Duration { Duration::from_millis(self.min_analysis_ms) }
  pub fn session_ttl(&self) -> Duration { Duration::from_secs(self.session_ttl_secs) }
}

/// Replacement templates for one locale. `{count}` and `{history}` are filled in.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct PromptOverride {
  #[serde(default)] pub questions: Option<String>,
  #[serde(default)] pub result: Option<String>,
}

/// Upstream model settings, read from the environment.
#[derive(Clone, Debug)]
pub struct GeminiSettings {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub timeout: Option<Duration>,
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite-preview-06-17";

impl GeminiSettings {
  /// None when GEMINI_API_KEY is absent or empty.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into());
    let timeout = std::env::var("GEMINI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .filter(|s| *s > 0)
      .map(Duration::from_secs);
    Some(Self { api_key, base_url, model, timeout })
  }
}

/// Parse TOML text into `AppConfig`.
pub fn parse_config(text: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(text)
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "doomsday", %path, overrides = cfg.prompts.len(), "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "doomsday", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "doomsday", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse_config("").unwrap();
    assert_eq!(cfg.quiz.question_count, 5);
    assert_eq!(cfg.quiz.countdown_secs, 60);
    assert_eq!(cfg.quiz.min_analysis(), Duration::from_millis(7000));
    assert!(cfg.prompts.is_empty());
  }

  #[test]
  fn partial_quiz_table_keeps_other_defaults() {
    let cfg = parse_config(
      r#"
      [quiz]
      countdown_secs = 30

      [prompts.ko]
      result = "분석: {history}"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.quiz.countdown_secs, 30);
    assert_eq!(cfg.quiz.shake_every_secs, 7);
    let ko = cfg.prompts.get("ko").unwrap();
    assert!(ko.questions.is_none());
    assert_eq!(ko.result.as_deref(), Some("분석: {history}"));
  }

  #[test]
  fn malformed_config_is_an_error() {
    assert!(parse_config("[quiz]\ncountdown_secs = \"soon\"").is_err());
  }
}
