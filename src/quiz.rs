//! Quiz session state machine.
//!
//! Pure and clock-free: the caller drives it with `tick()` once per second
//! and `pulse_shake()` / `clear_shake()` for the cosmetic shake. Every
//! transition reports the side effects (navigation, audio) the frontend must
//! perform.
//!
//! ```text
//! NotStarted --start--> InProgress --select (last)--> Completing
//!                            |
//!                            +--tick (1 -> 0)--> Failed
//! ```

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::audio::{as_millis, AudioCue, FadePlan, AMBIENT, CLICK, DOOM, EMERGENCY_ALERT};
use crate::domain::{HistoryEntry, Question, Screen};

pub const DEFAULT_COUNTDOWN_SECS: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
  NotStarted,
  InProgress,
  Completing,
  Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
  #[error("questions are not loaded yet")]
  QuestionsNotLoaded,
  #[error("action not allowed while {0:?}")]
  InvalidPhase(QuizPhase),
  #[error("'{0}' is not an option of the current question")]
  UnknownOption(String),
}

/// Side effects requested by a transition, in order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
  Navigate { to: Screen },
  Play { cue: AudioCue },
  Stop { cue: AudioCue },
  FadeOut { cue: AudioCue, plan: FadePlan },
  NavigateAfter {
    to: Screen,
    #[serde(rename = "delay_ms", serialize_with = "as_millis")]
    delay: Duration,
  },
}

/// Leaving the home screen for a fresh quiz.
pub fn enter_effects() -> Vec<Effect> {
  vec![
    Effect::Play { cue: CLICK },
    Effect::FadeOut { cue: AMBIENT, plan: FadePlan::for_cue(&AMBIENT) },
    Effect::Navigate { to: Screen::Test },
  ]
}

/// What the failure screen does, and when. The doom loop only starts on the
/// first completed hold, so it never plays without a user gesture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FailScreen {
  #[serde(rename = "hold_ms", serialize_with = "as_millis")]
  pub hold: Duration,
  pub on_hold: Vec<Effect>,
  #[serde(rename = "retry_enabled_after_ms", serialize_with = "as_millis")]
  pub retry_enabled_after: Duration,
  /// Retrying means a fresh session; the old one stays failed.
  pub on_retry: Vec<Effect>,
  #[serde(rename = "auto_return_after_ms", serialize_with = "as_millis")]
  pub auto_return_after: Duration,
  pub on_auto_return: Vec<Effect>,
}

impl FailScreen {
  pub fn new() -> Self {
    let fade_doom = Effect::FadeOut { cue: DOOM, plan: FadePlan::for_cue(&DOOM) };
    Self {
      hold: Duration::from_millis(800),
      on_hold: vec![Effect::Play { cue: DOOM }],
      retry_enabled_after: Duration::from_secs(7),
      on_retry: vec![
        Effect::Play { cue: CLICK },
        fade_doom.clone(),
        Effect::NavigateAfter { to: Screen::Test, delay: Duration::from_millis(300) },
      ],
      auto_return_after: Duration::from_secs(20),
      on_auto_return: vec![fade_doom, Effect::Navigate { to: Screen::Home }],
    }
  }
}

impl Default for FailScreen {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
  Started,
  Advanced { step: usize },
  /// Last question answered; carries the full history for the hand-off.
  Completed(Vec<HistoryEntry>),
  Failed,
}

impl Transition {
  pub fn effects(&self) -> Vec<Effect> {
    match self {
      Transition::Started => vec![Effect::Play { cue: EMERGENCY_ALERT }],
      Transition::Advanced { .. } => vec![],
      Transition::Completed(_) => vec![
        Effect::FadeOut { cue: EMERGENCY_ALERT, plan: FadePlan::for_cue(&EMERGENCY_ALERT) },
        Effect::Navigate { to: Screen::Loading },
      ],
      Transition::Failed => vec![Effect::Stop { cue: EMERGENCY_ALERT }, Effect::Navigate { to: Screen::Fail }],
    }
  }
}

#[derive(Clone, Debug)]
pub struct QuizSession {
  questions: Vec<Question>,
  phase: QuizPhase,
  step: usize,
  countdown: u32,
  shaking: bool,
  history: Vec<HistoryEntry>,
}

impl QuizSession {
  pub fn new(questions: Vec<Question>) -> Self {
    Self::with_countdown(questions, DEFAULT_COUNTDOWN_SECS)
  }

  pub fn with_countdown(questions: Vec<Question>, countdown_secs: u32) -> Self {
    Self {
      questions,
      phase: QuizPhase::NotStarted,
      step: 0,
      countdown: countdown_secs,
      shaking: false,
      history: Vec::new(),
    }
  }

  pub fn phase(&self) -> QuizPhase { self.phase }
  pub fn step(&self) -> usize { self.step }
  pub fn countdown(&self) -> u32 { self.countdown }
  pub fn is_shaking(&self) -> bool { self.shaking }
  pub fn history(&self) -> &[HistoryEntry] { &self.history }
  pub fn questions(&self) -> &[Question] { &self.questions }

  /// The start action is only available once questions exist.
  pub fn can_start(&self) -> bool {
    self.phase == QuizPhase::NotStarted && !self.questions.is_empty()
  }

  /// Question currently on screen (None outside InProgress).
  pub fn current_question(&self) -> Option<&Question> {
    match self.phase {
      QuizPhase::InProgress => self.questions.get(self.step),
      _ => None,
    }
  }

  pub fn start(&mut self) -> Result<Transition, QuizError> {
    if self.phase != QuizPhase::NotStarted {
      return Err(QuizError::InvalidPhase(self.phase));
    }
    if self.questions.is_empty() {
      return Err(QuizError::QuestionsNotLoaded);
    }
    self.phase = QuizPhase::InProgress;
    Ok(Transition::Started)
  }

  /// One second elapsed. Fires `Failed` exactly once, on the 1 -> 0 tick.
  pub fn tick(&mut self) -> Option<Transition> {
    if self.phase != QuizPhase::InProgress {
      return None;
    }
    self.countdown = self.countdown.saturating_sub(1);
    if self.countdown == 0 {
      self.phase = QuizPhase::Failed;
      self.shaking = false;
      return Some(Transition::Failed);
    }
    None
  }

  pub fn pulse_shake(&mut self) {
    if self.phase == QuizPhase::InProgress {
      self.shaking = true;
    }
  }

  pub fn clear_shake(&mut self) {
    self.shaking = false;
  }

  /// Record the answer to the current question. The countdown keeps running
  /// across questions; the last answer completes regardless of time left.
  pub fn select(&mut self, option: &str) -> Result<Transition, QuizError> {
    if self.phase != QuizPhase::InProgress {
      return Err(QuizError::InvalidPhase(self.phase));
    }
    let current = self.questions.get(self.step).ok_or(QuizError::QuestionsNotLoaded)?;
    if !current.options.iter().any(|o| o == option) {
      return Err(QuizError::UnknownOption(option.to_string()));
    }

    self.history.push(HistoryEntry {
      question: current.question.clone(),
      options: current.options.clone(),
      selected: option.to_string(),
    });

    if self.step + 1 < self.questions.len() {
      self.step += 1;
      Ok(Transition::Advanced { step: self.step })
    } else {
      self.phase = QuizPhase::Completing;
      self.shaking = false;
      Ok(Transition::Completed(self.history.clone()))
    }
  }

  /// "MM:SS", both parts zero-padded.
  pub fn countdown_display(&self) -> String {
    format!("{:02}:{:02}", self.countdown / 60, self.countdown % 60)
  }
}
