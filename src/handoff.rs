//! Loading-screen hand-off: history in, stored result out.
//!
//! The analysis always lasts at least the configured minimum so the loading
//! screen is seen; a slow model simply takes longer. It is owned by the
//! session, not by the request that started it.

use std::{future::Future, time::Duration};

use chrono::Local;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::domain::{HistoryEntry, Screen};
use crate::gateway::CompletionGateway;
use crate::render::ResultView;
use crate::seeds::analysis_failed_alert;
use crate::session::SharedSlot;

/// Where the client should go next, plus an optional message to show first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Redirect {
  pub redirect: Screen,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alert: Option<String>,
}

impl Redirect {
  pub fn to(screen: Screen) -> Self {
    Self { redirect: screen, alert: None }
  }

  pub fn home() -> Self {
    Self::to(Screen::Home)
  }
}

/// Await `fut` and a `min` timer together; completes at max(t_fut, min).
pub async fn with_min_duration<F: Future>(fut: F, min: Duration) -> F::Output {
  let (out, ()) = tokio::join!(fut, tokio::time::sleep(min));
  out
}

/// Consume the session's history, ask for a result and stash it for `/result`.
///
/// The model call runs in its own task and settles into the slot even when the
/// caller goes away. A later call (or a concurrent one) waits on that outcome
/// instead of starting another request.
#[instrument(level = "info", skip_all)]
pub async fn analyze(slot: &SharedSlot, gateway: &CompletionGateway, min_wait: Duration) -> Redirect {
  let mut outcome = {
    let mut s = slot.lock().await;
    s.touch();
    match s.analysis() {
      Some(outcome) => {
        info!(target: "doomsday", session = %s.id, settled = !s.analyzing, "Joining existing analysis");
        outcome
      }
      None => {
        let Some(history) = s.take_history() else {
          info!(target: "doomsday", session = %s.id, "No history to analyze; back to start");
          return Redirect::home();
        };
        let (done, outcome) = watch::channel(None);
        s.analyzing = true;
        s.set_analysis(outcome.clone());
        tokio::spawn(run_analysis(slot.clone(), gateway.clone(), s.locale, history, min_wait, done));
        outcome
      }
    }
  };

  let redirect = match outcome.wait_for(Option::is_some).await {
    Ok(settled) => (*settled).clone().unwrap_or_else(Redirect::home),
    Err(_) => {
      warn!(target: "doomsday", "Analysis task ended without an outcome");
      Redirect::home()
    }
  };

  let mut s = slot.lock().await;
  s.clear_analysis();
  s.touch();
  redirect
}

async fn run_analysis(
  slot: SharedSlot,
  gateway: CompletionGateway,
  locale: &'static str,
  history: Vec<HistoryEntry>,
  min_wait: Duration,
  done: watch::Sender<Option<Redirect>>,
) {
  let outcome = with_min_duration(gateway.generate_result(locale, &history), min_wait).await;

  let mut s = slot.lock().await;
  s.analyzing = false;
  s.touch();
  let redirect = match outcome {
    Ok(result) => {
      info!(target: "doomsday", session = %s.id, rarity = %result.rarity, "Result ready");
      s.put_result(result);
      Redirect::to(Screen::Result)
    }
    Err(e) => {
      error!(target: "doomsday", session = %s.id, error = %e, "Result analysis failed");
      Redirect { redirect: Screen::Home, alert: Some(analysis_failed_alert(locale).to_string()) }
    }
  };
  done.send_replace(Some(redirect));
}

/// Outcome of opening the result screen.
#[derive(Debug)]
pub enum ResultOutcome {
  View(Box<ResultView>),
  Redirect(Redirect),
}

/// Take the stored result (single use) and build the card view.
pub async fn consume_result(slot: &SharedSlot) -> ResultOutcome {
  let mut s = slot.lock().await;
  s.touch();
  s.clear_analysis();
  match s.take_result() {
    Some(result) => ResultOutcome::View(Box::new(ResultView::new(result, Local::now().date_naive()))),
    None => ResultOutcome::Redirect(Redirect::home()),
  }
}
