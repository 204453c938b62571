//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::handoff::{analyze, consume_result, ResultOutcome};
use crate::locale::resolve_request_locale;
use crate::logic::{answer_session, find_session, snapshot, start_session};
use crate::protocol::*;
use crate::quiz::enter_effects;
use crate::seeds::fallback_result;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip_all)]
pub async fn http_generate_questions(
  State(state): State<Arc<AppState>>,
  jar: CookieJar,
  body: Option<Json<GenerateQuestionsIn>>,
) -> impl IntoResponse {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let locale = resolve_request_locale(body.locale.as_deref(), &jar);
  let (questions, ok) = state.questions_or_fallback(locale).await;
  let status = if ok { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
  info!(target: "doomsday", %locale, count = questions.len(), %status, "HTTP questions served");
  (status, Json(questions))
}

#[instrument(level = "info", skip_all, fields(answers = body.history.len()))]
pub async fn http_generate_result(
  State(state): State<Arc<AppState>>,
  jar: CookieJar,
  Json(body): Json<GenerateResultIn>,
) -> impl IntoResponse {
  let locale = resolve_request_locale(body.locale.as_deref(), &jar);
  match state.gateway.generate_result(locale, &body.history).await {
    Ok(result) => (StatusCode::OK, Json(result)),
    Err(e) => {
      warn!(target: "doomsday", %locale, error = %e, "Result generation failed; serving fallback");
      (StatusCode::INTERNAL_SERVER_ERROR, Json(fallback_result(locale)))
    }
  }
}

#[instrument(level = "info", skip_all)]
pub async fn http_create_session(
  State(state): State<Arc<AppState>>,
  jar: CookieJar,
  body: Option<Json<SessionCreateIn>>,
) -> impl IntoResponse {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let locale = resolve_request_locale(body.locale.as_deref(), &jar);
  let (slot, ok) = state.open_session(locale).await;
  let status = if ok { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
  (status, Json(snapshot(&slot).await.with_effects(enter_effects())))
}

#[instrument(level = "debug", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
  let slot = find_session(&state, &id).await?;
  Ok(Json(snapshot(&slot).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
  let slot = find_session(&state, &id).await?;
  Ok(Json(start_session(&state, &slot).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<SessionSnapshot>, ApiError> {
  let slot = find_session(&state, &id).await?;
  Ok(Json(answer_session(&slot, &body.option).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_analyze(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError> {
  let slot = find_session(&state, &id).await?;
  let out = analyze(&slot, &state.gateway, state.timings.min_analysis()).await;
  info!(target: "doomsday", session = %id, redirect = out.redirect.path(), alerted = out.alert.is_some(), "HTTP analyze finished");
  Ok(Json(out).into_response())
}

#[instrument(level = "info", skip(state))]
pub async fn http_result(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError> {
  let slot = find_session(&state, &id).await?;
  Ok(match consume_result(&slot).await {
    ResultOutcome::View(view) => Json(view).into_response(),
    ResultOutcome::Redirect(r) => Json(r).into_response(),
  })
}
