//! Router assembly: API endpoints, static files, locale cookie, CORS and HTTP tracing.

use std::sync::Arc;

use axum::{
  middleware,
  routing::{get, post},
  Router,
};
use tower_http::{
  cors::{Any, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::locale::locale_middleware;
use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/...`
/// - Static SPA from `STATIC_DIR` with index fallback
/// - Locale negotiation for page requests (`/api` is skipped by the middleware)
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
  let index = state.static_dir.join("index.html");
  let static_service = ServeDir::new(&state.static_dir)
    .append_index_html_on_directories(true)
    .not_found_service(ServeFile::new(index));

  Router::new()
    .route("/api/health", get(http::http_health))
    .route("/api/generate-questions", post(http::http_generate_questions))
    .route("/api/generate-result", post(http::http_generate_result))
    .route("/api/sessions", post(http::http_create_session))
    .route("/api/sessions/:id", get(http::http_get_session))
    .route("/api/sessions/:id/start", post(http::http_start_session))
    .route("/api/sessions/:id/answer", post(http::http_answer))
    .route("/api/sessions/:id/analyze", post(http::http_analyze))
    .route("/api/sessions/:id/result", get(http::http_result))
    .with_state(state)
    // Frontend fallback
    .fallback_service(static_service)
    .layer(middleware::from_fn(locale_middleware))
    .layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any),
    )
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}
