//! Completion gateway: prompt in, validated domain payload out.
//!
//! The upstream service sits behind `CompletionBackend` so the HTTP layer and
//! tests can swap it. Failures come back as a typed `GatewayError`; choosing
//! to show a fallback payload is the caller's decision.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{HistoryEntry, Question, ResultPayload};
use crate::prompts::PromptRegistry;
use crate::util::{extract_json_array, strip_code_fences, trunc_for_log};

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("completion service not configured (GEMINI_API_KEY missing)")]
  Unavailable,
  #[error("transport error: {0}")]
  Transport(String),
  #[error("upstream HTTP {status}: {message}")]
  Upstream { status: u16, message: String },
  #[error("empty completion")]
  EmptyCompletion,
  #[error("malformed completion: {0}")]
  Malformed(String),
  #[error("completion missing required fields: {0}")]
  MissingFields(String),
}

/// Opaque text-completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
  /// Short identifier for logs (model name).
  fn name(&self) -> &str;
  async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[derive(Clone)]
pub struct CompletionGateway {
  backend: Option<Arc<dyn CompletionBackend>>,
  prompts: Arc<PromptRegistry>,
  question_count: usize,
}

impl CompletionGateway {
  pub fn new(
    backend: Option<Arc<dyn CompletionBackend>>,
    prompts: Arc<PromptRegistry>,
    question_count: usize,
  ) -> Self {
    Self { backend, prompts, question_count }
  }

  #[instrument(level = "info", skip(self), fields(count = self.question_count))]
  pub async fn generate_questions(&self, locale: &str) -> Result<Vec<Question>, GatewayError> {
    let prompt = self.prompts.questions_prompt(locale, self.question_count);
    let text = self.complete(&prompt).await?;
    let questions = parse_questions(&text, self.question_count)?;
    info!(target: "doomsday", %locale, count = questions.len(), "Questions generated");
    Ok(questions)
  }

  #[instrument(level = "info", skip(self, history), fields(answers = history.len()))]
  pub async fn generate_result(&self, locale: &str, history: &[HistoryEntry]) -> Result<ResultPayload, GatewayError> {
    let prompt = self.prompts.result_prompt(locale, history);
    let text = self.complete(&prompt).await?;
    let mut result = parse_result(&text)?;
    if let Some(sent) = result.normalize() {
      warn!(target: "doomsday", %sent, repaired = %result.rarity, percentile = result.percentile, "Model rarity disagreed with percentile; repaired");
    }
    info!(target: "doomsday", %locale, rarity = %result.rarity, percentile = result.percentile, "Result generated");
    Ok(result)
  }

  async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
    let backend = self.backend.as_ref().ok_or(GatewayError::Unavailable)?;
    let start = std::time::Instant::now();
    let result = backend.complete(prompt).await;
    let elapsed = start.elapsed();
    match &result {
      Ok(text) => info!(target: "doomsday", backend = backend.name(), ?elapsed, response_len = text.len(), "Completion received"),
      Err(e) => warn!(target: "doomsday", backend = backend.name(), ?elapsed, error = %e, "Completion failed"),
    }
    let text = result?;
    if text.trim().is_empty() {
      return Err(GatewayError::EmptyCompletion);
    }
    Ok(text)
  }
}

/// First `[` .. last `]`, parsed as a question list; keeps the first `count`.
pub fn parse_questions(text: &str, count: usize) -> Result<Vec<Question>, GatewayError> {
  let slice = extract_json_array(text)
    .ok_or_else(|| GatewayError::Malformed(format!("no JSON array in: {}", trunc_for_log(text, 120))))?;
  let value: serde_json::Value =
    serde_json::from_str(slice).map_err(|e| GatewayError::Malformed(e.to_string()))?;
  let mut questions: Vec<Question> =
    serde_json::from_value(value).map_err(|e| GatewayError::MissingFields(e.to_string()))?;

  if questions.len() < count {
    return Err(GatewayError::MissingFields(format!("expected {} questions, got {}", count, questions.len())));
  }
  questions.truncate(count);
  for (i, q) in questions.iter().enumerate() {
    q.validate().map_err(|e| GatewayError::MissingFields(format!("question {}: {}", i + 1, e)))?;
  }
  Ok(questions)
}

/// Code fences stripped, remainder parsed whole as a result object.
pub fn parse_result(text: &str) -> Result<ResultPayload, GatewayError> {
  let cleaned = strip_code_fences(text);
  let value: serde_json::Value =
    serde_json::from_str(&cleaned).map_err(|e| GatewayError::Malformed(e.to_string()))?;
  let result: ResultPayload =
    serde_json::from_value(value).map_err(|e| GatewayError::MissingFields(e.to_string()))?;
  result.validate().map_err(GatewayError::MissingFields)?;
  Ok(result)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::domain::Rarity;
  use std::sync::Mutex;
  use std::time::Duration;

  /// Replays canned completions in order; records prompts.
  pub struct ScriptedBackend {
    pub replies: Mutex<Vec<Result<String, GatewayError>>>,
    pub prompts: Mutex<Vec<String>>,
    delay: Duration,
  }

  impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
      Self { replies: Mutex::new(replies), prompts: Mutex::new(vec![]), delay: Duration::ZERO }
    }

    /// Every reply takes `delay` to arrive.
    pub fn with_delay(mut self, delay: Duration) -> Self {
      self.delay = delay;
      self
    }
  }

  #[async_trait]
  impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str { "scripted" }
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
      self.prompts.lock().unwrap().push(prompt.to_string());
      if !self.delay.is_zero() {
        tokio::time::sleep(self.delay).await;
      }
      let mut replies = self.replies.lock().unwrap();
      if replies.is_empty() { Err(GatewayError::EmptyCompletion) } else { replies.remove(0) }
    }
  }

  fn questions_json(n: usize) -> String {
    let items: Vec<String> = (0..n)
      .map(|i| format!(r#"{{"question":"Q{}","options":["a","b","c"]}}"#, i))
      .collect();
    format!("[{}]", items.join(","))
  }

  fn gateway(backend: ScriptedBackend) -> (CompletionGateway, Arc<ScriptedBackend>) {
    let backend = Arc::new(backend);
    let dyn_backend: Arc<dyn CompletionBackend> = backend.clone();
    let gw = CompletionGateway::new(Some(dyn_backend), Arc::new(PromptRegistry::builtin()), 5);
    (gw, backend)
  }

  #[test]
  fn parse_questions_accepts_fenced_array() {
    let raw = format!("```json\n{}\n```", questions_json(5));
    let qs = parse_questions(&raw, 5).unwrap();
    assert_eq!(qs.len(), 5);
    assert_eq!(qs[4].question, "Q4");
  }

  #[test]
  fn parse_questions_truncates_extra_and_rejects_short() {
    assert_eq!(parse_questions(&questions_json(7), 5).unwrap().len(), 5);
    assert!(matches!(parse_questions(&questions_json(3), 5), Err(GatewayError::MissingFields(_))));
  }

  #[test]
  fn parse_questions_distinguishes_malformed_from_missing() {
    assert!(matches!(parse_questions("I refuse.", 5), Err(GatewayError::Malformed(_))));
    assert!(matches!(parse_questions("[{\"question\": \"cut off", 5), Err(GatewayError::Malformed(_))));
    assert!(matches!(parse_questions("[{\"q\":1}]", 1), Err(GatewayError::MissingFields(_))));
  }

  #[test]
  fn parse_result_handles_fences_and_missing_fields() {
    let raw = "```json\n{\"type\":\"t\",\"summary\":\"s\",\"advice\":\"a\",\"quote\":\"q\",\"badge\":\"b\",\"rarity\":\"Rare\",\"tags\":[\"x\"],\"percentile\":25}\n```";
    let r = parse_result(raw).unwrap();
    assert_eq!(r.rarity, Rarity::Rare);
    assert!(matches!(parse_result("{\"type\":\"t\"}"), Err(GatewayError::MissingFields(_))));
    assert!(matches!(parse_result("not json"), Err(GatewayError::Malformed(_))));
  }

  #[tokio::test]
  async fn generate_result_repairs_rarity() {
    let reply = r#"{"type":"t","summary":"s","advice":"a","quote":"q","badge":"b","rarity":"Legendary","tags":[],"percentile":70}"#;
    let (gw, backend) = gateway(ScriptedBackend::new(vec![Ok(reply.into())]));
    let history = vec![HistoryEntry { question: "Q?".into(), options: vec!["a".into()], selected: "a".into() }];
    let r = gw.generate_result("ko", &history).await.unwrap();
    assert_eq!(r.rarity, Rarity::Common);
    let prompts = backend.prompts.lock().unwrap();
    assert!(prompts[0].contains("Q1: Q?\nA: a"));
  }

  #[tokio::test]
  async fn errors_are_returned_not_swallowed() {
    let (gw, _) = gateway(ScriptedBackend::new(vec![
      Ok("   ".into()),
      Err(GatewayError::Upstream { status: 503, message: "overloaded".into() }),
      Ok("[]".into()),
    ]));
    assert!(matches!(gw.generate_questions("en").await, Err(GatewayError::EmptyCompletion)));
    assert!(matches!(gw.generate_questions("en").await, Err(GatewayError::Upstream { status: 503, .. })));
    assert!(matches!(gw.generate_questions("en").await, Err(GatewayError::MissingFields(_))));
  }

  #[tokio::test]
  async fn disabled_gateway_is_unavailable() {
    let gw = CompletionGateway::new(None, Arc::new(PromptRegistry::builtin()), 5);
    assert!(matches!(gw.generate_questions("en").await, Err(GatewayError::Unavailable)));
  }
}
