//! Application state: completion gateway, session store and quiz timings.
//!
//! Built once at startup from the environment (and optional TOML config) and
//! shared behind an `Arc` with every handler.

use std::{path::PathBuf, sync::Arc};

use tracing::{error, info, instrument};

use crate::config::{load_config_from_env, AppConfig, QuizTimings};
use crate::domain::Question;
use crate::gateway::{CompletionBackend, CompletionGateway};
use crate::gemini::Gemini;
use crate::prompts::PromptRegistry;
use crate::quiz::QuizSession;
use crate::seeds::fallback_questions;
use crate::session::{SessionStore, SharedSlot};

pub const DEFAULT_STATIC_DIR: &str = "./static";

#[derive(Clone)]
pub struct AppState {
  pub gateway: CompletionGateway,
  pub sessions: SessionStore,
  pub timings: QuizTimings,
  pub static_dir: PathBuf,
}

impl AppState {
  /// Build state from env: load config, register prompts, init the Gemini client.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let config = load_config_from_env().unwrap_or_default();

    let backend: Option<Arc<dyn CompletionBackend>> = match Gemini::from_env() {
      Some(g) => {
        info!(target: "doomsday", base_url = %g.base_url, model = %g.model, "Gemini enabled.");
        Some(Arc::new(g))
      }
      None => {
        error!(target: "doomsday", "Gemini disabled (no GEMINI_API_KEY). Every generation will fall back.");
        None
      }
    };

    let static_dir = std::env::var("STATIC_DIR")
      .ok()
      .filter(|s| !s.trim().is_empty())
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

    Self::with_backend(&config, backend, static_dir)
  }

  pub fn with_backend(config: &AppConfig, backend: Option<Arc<dyn CompletionBackend>>, static_dir: PathBuf) -> Self {
    let prompts = PromptRegistry::with_overrides(&config.prompts);
    info!(target: "doomsday", locales = prompts.len(), overrides = config.prompts.len(), "Prompt registry ready");
    let gateway = CompletionGateway::new(backend, Arc::new(prompts), config.quiz.question_count);
    Self { gateway, sessions: SessionStore::new(), timings: config.quiz.clone(), static_dir }
  }

  /// Questions for `locale`, or the fallback set. The flag is true when the
  /// model answered properly.
  #[instrument(level = "info", skip(self))]
  pub async fn questions_or_fallback(&self, locale: &str) -> (Vec<Question>, bool) {
    match self.gateway.generate_questions(locale).await {
      Ok(questions) => (questions, true),
      Err(e) => {
        error!(target: "doomsday", %locale, error = %e, "Question generation failed; serving fallback");
        (fallback_questions(locale), false)
      }
    }
  }

  /// Create a session with its questions already loaded.
  #[instrument(level = "info", skip(self))]
  pub async fn open_session(&self, locale: &'static str) -> (SharedSlot, bool) {
    let (questions, ok) = self.questions_or_fallback(locale).await;
    let quiz = QuizSession::with_countdown(questions, self.timings.countdown_secs);
    let (id, slot) = self.sessions.create(locale, quiz, !ok).await;
    info!(target: "quiz", session = %id, %locale, degraded = !ok, "Session opened");
    (slot, ok)
  }
}
