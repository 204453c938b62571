//! Public HTTP protocol structs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{HistoryEntry, Question};
use crate::quiz::{Effect, FailScreen, QuizPhase};
use crate::seeds::random_loading_message;
use crate::session::SessionSlot;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuestionsIn {
  #[serde(default)]
  pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResultIn {
  pub history: Vec<HistoryEntry>,
  #[serde(default)]
  pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionCreateIn {
  #[serde(default)]
  pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  pub option: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

/// Client-facing view of one quiz session.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
  pub id: Uuid,
  pub locale: &'static str,
  pub phase: QuizPhase,
  pub step: usize,
  pub total: usize,
  pub countdown: u32,
  pub countdown_display: String,
  pub shaking: bool,
  pub can_start: bool,
  /// Questions came from the fallback set.
  pub degraded: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub question: Option<Question>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub loading_message: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fail_screen: Option<FailScreen>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub effects: Vec<Effect>,
}

impl SessionSnapshot {
  pub fn of(slot: &SessionSlot) -> Self {
    let quiz = &slot.quiz;
    Self {
      id: slot.id,
      locale: slot.locale,
      phase: quiz.phase(),
      step: quiz.step(),
      total: quiz.questions().len(),
      countdown: quiz.countdown(),
      countdown_display: quiz.countdown_display(),
      shaking: quiz.is_shaking(),
      can_start: quiz.can_start(),
      degraded: slot.degraded,
      question: quiz.current_question().cloned(),
      loading_message: slot.analyzing.then(|| random_loading_message(slot.locale)),
      fail_screen: (quiz.phase() == QuizPhase::Failed).then(FailScreen::new),
      effects: Vec::new(),
    }
  }

  pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
    self.effects = effects;
    self
  }
}
