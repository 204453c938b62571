//! Per-session runtime: typed hand-off slots, the quiz timer task and idle reaping.
//!
//! Every quiz gets its own slot keyed by a UUID, so two tabs never overwrite
//! each other's history or result. Hand-off values are single-use: `take_*`
//! removes what it returns.

use std::{
  collections::HashMap,
  sync::{Arc, Weak},
  time::Duration,
};

use tokio::{
  sync::{watch, Mutex, RwLock},
  task::AbortHandle,
  time::{interval_at, sleep_until, Instant, MissedTickBehavior},
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::QuizTimings;
use crate::domain::{HistoryEntry, ResultPayload};
use crate::handoff::Redirect;
use crate::quiz::{Effect, QuizPhase, QuizSession};

/// Outcome of an in-flight analysis; `None` until it settles.
pub type AnalysisOutcome = watch::Receiver<Option<Redirect>>;

pub struct SessionSlot {
  pub id: Uuid,
  pub locale: &'static str,
  pub quiz: QuizSession,
  /// Questions came from the fallback set rather than the model.
  pub degraded: bool,
  /// An analyze call is in flight.
  pub analyzing: bool,
  pending_history: Option<Vec<HistoryEntry>>,
  pending_result: Option<ResultPayload>,
  analysis: Option<AnalysisOutcome>,
  /// Effects raised by the timer, handed out on the next read.
  pending_effects: Vec<Effect>,
  last_touched: Instant,
  timer: Option<AbortHandle>,
}

impl SessionSlot {
  fn new(id: Uuid, locale: &'static str, quiz: QuizSession, degraded: bool) -> Self {
    Self {
      id,
      locale,
      quiz,
      degraded,
      analyzing: false,
      pending_history: None,
      pending_result: None,
      analysis: None,
      pending_effects: Vec::new(),
      last_touched: Instant::now(),
      timer: None,
    }
  }

  pub fn touch(&mut self) {
    self.last_touched = Instant::now();
  }

  pub fn put_history(&mut self, history: Vec<HistoryEntry>) {
    self.pending_history = Some(history);
  }

  pub fn take_history(&mut self) -> Option<Vec<HistoryEntry>> {
    self.pending_history.take()
  }

  pub fn has_history(&self) -> bool {
    self.pending_history.is_some()
  }

  pub fn put_result(&mut self, result: ResultPayload) {
    self.pending_result = Some(result);
  }

  pub fn take_result(&mut self) -> Option<ResultPayload> {
    self.pending_result.take()
  }

  pub fn has_result(&self) -> bool {
    self.pending_result.is_some()
  }

  pub fn analysis(&self) -> Option<AnalysisOutcome> {
    self.analysis.clone()
  }

  pub fn set_analysis(&mut self, outcome: AnalysisOutcome) {
    self.analysis = Some(outcome);
  }

  pub fn clear_analysis(&mut self) {
    self.analysis = None;
  }

  pub fn push_effects(&mut self, effects: Vec<Effect>) {
    self.pending_effects.extend(effects);
  }

  pub fn take_effects(&mut self) -> Vec<Effect> {
    std::mem::take(&mut self.pending_effects)
  }

  fn set_timer(&mut self, handle: AbortHandle) {
    if let Some(old) = self.timer.replace(handle) {
      old.abort();
    }
  }
}

impl Drop for SessionSlot {
  fn drop(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.abort();
    }
  }
}

pub type SharedSlot = Arc<Mutex<SessionSlot>>;

/// In-memory session registry.
#[derive(Clone, Default)]
pub struct SessionStore {
  slots: Arc<RwLock<HashMap<Uuid, SharedSlot>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  #[instrument(level = "debug", skip(self, quiz))]
  pub async fn create(&self, locale: &'static str, quiz: QuizSession, degraded: bool) -> (Uuid, SharedSlot) {
    let id = Uuid::new_v4();
    let slot = Arc::new(Mutex::new(SessionSlot::new(id, locale, quiz, degraded)));
    self.slots.write().await.insert(id, slot.clone());
    (id, slot)
  }

  pub async fn get(&self, id: &Uuid) -> Option<SharedSlot> {
    self.slots.read().await.get(id).cloned()
  }

  pub async fn remove(&self, id: &Uuid) -> bool {
    self.slots.write().await.remove(id).is_some()
  }

  pub async fn len(&self) -> usize {
    self.slots.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.slots.read().await.is_empty()
  }

  /// Drop sessions untouched for longer than `ttl`. Returns how many went.
  #[instrument(level = "debug", skip(self))]
  pub async fn reap_idle(&self, ttl: Duration) -> usize {
    let now = Instant::now();
    let snapshot: Vec<(Uuid, SharedSlot)> =
      self.slots.read().await.iter().map(|(k, v)| (*k, v.clone())).collect();

    let mut stale = Vec::new();
    for (id, slot) in snapshot {
      let s = slot.lock().await;
      if now.duration_since(s.last_touched) > ttl && !s.analyzing {
        stale.push(id);
      }
    }

    if stale.is_empty() {
      return 0;
    }
    let mut slots = self.slots.write().await;
    for id in &stale {
      slots.remove(id);
    }
    info!(target: "doomsday", reaped = stale.len(), remaining = slots.len(), "Reaped idle sessions");
    stale.len()
  }
}

/// Periodically reap idle sessions for the lifetime of the process.
pub fn spawn_reaper(store: SessionStore, ttl: Duration) -> tokio::task::JoinHandle<()> {
  let every = (ttl / 4).max(Duration::from_secs(1));
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      store.reap_idle(ttl).await;
    }
  })
}

/// Drive a started quiz: a 1 s countdown tick, a periodic shake pulse and the
/// shake clear. Exits as soon as the quiz leaves `InProgress` or the slot is gone.
pub async fn start_quiz_timer(slot: &SharedSlot, timings: &QuizTimings) {
  let weak = Arc::downgrade(slot);
  let timings = timings.clone();
  let handle = tokio::spawn(run_quiz_timer(weak, timings)).abort_handle();
  slot.lock().await.set_timer(handle);
}

async fn run_quiz_timer(slot: Weak<Mutex<SessionSlot>>, timings: QuizTimings) {
  let start = Instant::now();
  let second = Duration::from_secs(1);
  let shake_every = timings.shake_every().max(Duration::from_millis(100));

  let mut countdown = interval_at(start + second, second);
  let mut shake = interval_at(start + shake_every, shake_every);
  let mut clear_at: Option<Instant> = None;

  loop {
    let clear_deadline = clear_at.unwrap_or(start);
    tokio::select! {
      _ = countdown.tick() => {
        let Some(slot) = slot.upgrade() else { break };
        let mut s = slot.lock().await;
        if let Some(failed) = s.quiz.tick() {
          info!(target: "quiz", session = %s.id, "Countdown exhausted; session failed");
          s.push_effects(failed.effects());
        }
        if s.quiz.phase() != QuizPhase::InProgress {
          break;
        }
      }
      _ = shake.tick() => {
        let Some(slot) = slot.upgrade() else { break };
        let mut s = slot.lock().await;
        if s.quiz.phase() != QuizPhase::InProgress {
          break;
        }
        s.quiz.pulse_shake();
        clear_at = Some(Instant::now() + timings.shake_duration());
      }
      _ = sleep_until(clear_deadline), if clear_at.is_some() => {
        clear_at = None;
        let Some(slot) = slot.upgrade() else { break };
        slot.lock().await.quiz.clear_shake();
      }
    }
  }
  debug!(target: "quiz", "Quiz timer stopped");
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Question, Rarity};
  use crate::quiz::Transition;

  fn quiz(n: usize) -> QuizSession {
    let qs = (0..n)
      .map(|i| Question { question: format!("Q{}", i), options: vec!["a".into(), "b".into(), "c".into()] })
      .collect();
    QuizSession::new(qs)
  }

  fn result() -> ResultPayload {
    ResultPayload {
      kind: "t".into(),
      summary: "s".into(),
      advice: "a".into(),
      quote: "q".into(),
      badge: "b".into(),
      rarity: Rarity::Rare,
      tags: vec![],
      percentile: 25,
    }
  }

  #[tokio::test]
  async fn handoff_values_are_single_use() {
    let store = SessionStore::new();
    let (_, slot) = store.create("en", quiz(1), false).await;
    let mut s = slot.lock().await;

    s.put_history(vec![HistoryEntry { question: "Q0".into(), options: vec![], selected: "a".into() }]);
    assert!(s.take_history().is_some());
    assert!(s.take_history().is_none());

    s.put_result(result());
    assert_eq!(s.take_result().map(|r| r.percentile), Some(25));
    assert!(s.take_result().is_none());
  }

  #[tokio::test]
  async fn sessions_do_not_share_slots() {
    let store = SessionStore::new();
    let (a, slot_a) = store.create("en", quiz(1), false).await;
    let (b, slot_b) = store.create("ko", quiz(1), false).await;
    assert_ne!(a, b);
    slot_a.lock().await.put_result(result());
    assert!(slot_b.lock().await.take_result().is_none());
    assert!(store.get(&a).await.unwrap().lock().await.has_result());
    assert_eq!(store.len().await, 2);
    assert!(store.remove(&a).await);
    assert!(store.get(&a).await.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn reaper_drops_only_idle_sessions() {
    let store = SessionStore::new();
    let (old, _) = store.create("en", quiz(1), false).await;
    tokio::time::advance(Duration::from_secs(100)).await;
    let (fresh, _) = store.create("en", quiz(1), false).await;

    assert_eq!(store.reap_idle(Duration::from_secs(60)).await, 1);
    assert!(store.get(&old).await.is_none());
    assert!(store.get(&fresh).await.is_some());
  }

  #[tokio::test(start_paused = true)]
  async fn timer_fails_the_quiz_after_the_countdown() {
    let store = SessionStore::new();
    let (_, slot) = store.create("en", quiz(5), false).await;
    slot.lock().await.quiz.start().unwrap();
    start_quiz_timer(&slot, &QuizTimings::default()).await;

    tokio::time::sleep(Duration::from_millis(59_500)).await;
    {
      let s = slot.lock().await;
      assert_eq!(s.quiz.phase(), QuizPhase::InProgress);
      assert_eq!(s.quiz.countdown(), 1);
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    let mut s = slot.lock().await;
    assert_eq!(s.quiz.phase(), QuizPhase::Failed);
    assert_eq!(s.quiz.countdown(), 0);
    assert!(!s.has_history());
    assert!(!s.has_result());
    assert_eq!(s.take_effects(), Transition::Failed.effects());
    assert!(s.take_effects().is_empty(), "failure effects are handed out once");
  }

  #[tokio::test(start_paused = true)]
  async fn timer_pulses_shake_for_half_a_second() {
    let store = SessionStore::new();
    let (_, slot) = store.create("en", quiz(5), false).await;
    slot.lock().await.quiz.start().unwrap();
    start_quiz_timer(&slot, &QuizTimings::default()).await;

    tokio::time::sleep(Duration::from_millis(6_900)).await;
    assert!(!slot.lock().await.quiz.is_shaking());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(slot.lock().await.quiz.is_shaking());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!slot.lock().await.quiz.is_shaking());
  }
}
