//! Core session behaviors behind the HTTP handlers.
//!
//! Handlers resolve inputs and shape responses; everything that touches a
//! session slot or the quiz state machine lives here.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::protocol::SessionSnapshot;
use crate::quiz::Transition;
use crate::session::{start_quiz_timer, SharedSlot};
use crate::state::AppState;

/// Look a session up by its path segment.
pub async fn find_session(state: &AppState, raw_id: &str) -> Result<SharedSlot, ApiError> {
  let id = Uuid::parse_str(raw_id).map_err(|_| ApiError::BadRequest(format!("'{}' is not a session id", raw_id)))?;
  state.sessions.get(&id).await.ok_or(ApiError::SessionNotFound(id))
}

/// Current view of a session. Effects the timer raised since the last read
/// ride along once.
pub async fn snapshot(slot: &SharedSlot) -> SessionSnapshot {
  let mut s = slot.lock().await;
  s.touch();
  let effects = s.take_effects();
  SessionSnapshot::of(&s).with_effects(effects)
}

/// Start the countdown and spawn the session timer.
#[instrument(level = "info", skip_all)]
pub async fn start_session(state: &AppState, slot: &SharedSlot) -> Result<SessionSnapshot, ApiError> {
  let transition = {
    let mut s = slot.lock().await;
    s.touch();
    let t = s.quiz.start()?;
    info!(target: "quiz", session = %s.id, questions = s.quiz.questions().len(), "Quiz started");
    t
  };
  start_quiz_timer(slot, &state.timings).await;
  let s = slot.lock().await;
  Ok(SessionSnapshot::of(&s).with_effects(transition.effects()))
}

/// Record one answer. The last one parks the history for the loading screen.
#[instrument(level = "info", skip(slot))]
pub async fn answer_session(slot: &SharedSlot, option: &str) -> Result<SessionSnapshot, ApiError> {
  let mut s = slot.lock().await;
  s.touch();
  let transition = s.quiz.select(option)?;
  let effects = transition.effects();
  match transition {
    Transition::Completed(history) => {
      info!(target: "quiz", session = %s.id, answers = history.len(), countdown = s.quiz.countdown(), "Quiz completed");
      s.put_history(history);
    }
    Transition::Advanced { step } => {
      info!(target: "quiz", session = %s.id, step, "Answer recorded");
    }
    Transition::Started | Transition::Failed => {}
  }
  Ok(SessionSnapshot::of(&s).with_effects(effects))
}
