//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! - LOG_LEVEL controls the filter (e.g. "debug" or directives like
//!   "info,quiz=debug,doomsday=debug,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json".
//!
//! Targets are printed so `doomsday` (generation, hand-off) and `quiz`
//! (session timers) lines are easy to tell apart from tower-http spans.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,quiz=info,doomsday=debug,doomsday_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
  let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  match std::env::var("LOG_FORMAT").as_deref() {
    Ok("json") => builder.json().init(),
    _ => builder.init(),
  }
}
