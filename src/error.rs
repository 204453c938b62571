//! HTTP-facing errors for the session API.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::quiz::QuizError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unknown session {0}")]
  SessionNotFound(Uuid),
  #[error(transparent)]
  Quiz(#[from] QuizError),
  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Quiz(QuizError::UnknownOption(_)) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Quiz(_) => StatusCode::CONFLICT,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quiz::QuizPhase;

  #[test]
  fn quiz_errors_map_to_conflict_or_unprocessable() {
    assert_eq!(ApiError::from(QuizError::QuestionsNotLoaded).status(), StatusCode::CONFLICT);
    assert_eq!(ApiError::from(QuizError::InvalidPhase(QuizPhase::Failed)).status(), StatusCode::CONFLICT);
    assert_eq!(ApiError::from(QuizError::UnknownOption("x".into())).status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ApiError::SessionNotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
  }
}
