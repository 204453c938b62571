//! Doomsday quiz backend binary.
//!
//! - Axum HTTP API + static SPA fallback (STATIC_DIR, default ./static)
//! - Gemini integration when GEMINI_API_KEY is set, canned fallbacks otherwise
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   GEMINI_API_KEY      : enables Gemini if present
//!   GEMINI_BASE_URL     : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL        : default "gemini-2.5-flash-lite-preview-06-17"
//!   GEMINI_TIMEOUT_SECS : optional request timeout
//!   STATIC_DIR          : frontend build directory
//!   QUIZ_CONFIG_PATH    : path to TOML config (timings + prompt overrides)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::info;

use doomsday_backend::{build_router, session::spawn_reaper, telemetry, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::new());
  spawn_reaper(state.sessions.clone(), state.timings.session_ttl());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "doomsday", %addr, static_dir = %state.static_dir.display(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "doomsday", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "doomsday", "Shutdown signal received");
}
