use axum::{
  body::Body,
  http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use doomsday_backend::gateway::GatewayError;

mod common;
use common::{create_test_app, questions_json, result_json, send};

#[tokio::test]
async fn test_health() {
  let (app, _) = create_test_app(vec![]);
  let (status, body) = send(&app, "GET", "/api/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_generate_questions_returns_five() {
  let (app, backend) = create_test_app(vec![Ok(format!("```json\n{}\n```", questions_json(6)))]);
  let (status, body) = send(&app, "POST", "/api/generate-questions", Some(json!({ "locale": "ko" }))).await;

  assert_eq!(status, StatusCode::OK);
  let questions = body.as_array().unwrap();
  assert_eq!(questions.len(), 5);
  assert_eq!(questions[0]["options"].as_array().unwrap().len(), 3);
  assert!(backend.prompts.lock().unwrap()[0].contains("지구 멸망"));
}

#[tokio::test]
async fn test_generate_questions_without_body_uses_cookie_locale() {
  let (app, backend) = create_test_app(vec![Ok(questions_json(5))]);
  let request = Request::builder()
    .method("POST")
    .uri("/api/generate-questions")
    .header(header::COOKIE, "locale=ja")
    .body(Body::empty())
    .unwrap();
  let response = app.clone().oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert!(backend.prompts.lock().unwrap()[0].contains("Japanese"));
}

#[tokio::test]
async fn test_generate_questions_failure_serves_fallback_with_500() {
  let (app, _) = create_test_app(vec![Ok("Sorry, I can't help with that.".into())]);
  let (status, body) = send(&app, "POST", "/api/generate-questions", Some(json!({ "locale": "en" }))).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  let questions = body.as_array().unwrap();
  assert_eq!(questions.len(), 2);
  for q in questions {
    assert!(!q["question"].as_str().unwrap().is_empty());
    assert_eq!(q["options"].as_array().unwrap().len(), 3);
  }
}

#[tokio::test]
async fn test_generate_result_repairs_rarity() {
  let (app, _) = create_test_app(vec![Ok(result_json(25, "Legendary"))]);
  let history = json!([{ "question": "Q", "options": ["a", "b", "c"], "selected": "b" }]);
  let (status, body) = send(&app, "POST", "/api/generate-result", Some(json!({ "history": history }))).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["type"], "🧟 Zombie Survivalist");
  assert_eq!(body["rarity"], "Rare");
  assert_eq!(body["percentile"], 25);
}

#[tokio::test]
async fn test_generate_result_upstream_error_serves_fallback() {
  let (app, _) = create_test_app(vec![Err(GatewayError::Upstream { status: 429, message: "quota".into() })]);
  let (status, body) = send(&app, "POST", "/api/generate-result", Some(json!({ "history": [], "locale": "ko" }))).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["rarity"], "Epic");
  assert_eq!(body["percentile"], 10);
  assert_eq!(body["tags"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_and_malformed_session_ids() {
  let (app, _) = create_test_app(vec![]);
  let (status, body) = send(&app, "GET", "/api/sessions/00000000-0000-0000-0000-000000000000", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("unknown session"));

  let (status, _) = send(&app, "POST", "/api/sessions/not-a-uuid/start", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_requests_get_a_locale_cookie() {
  let (app, _) = create_test_app(vec![]);
  let request = Request::builder()
    .uri("/test")
    .header(header::ACCEPT_LANGUAGE, "fr-CA;q=0.4, ko-KR;q=0.9, en;q=0.1")
    .body(Body::empty())
    .unwrap();
  let response = app.clone().oneshot(request).await.unwrap();
  let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
  assert!(cookie.starts_with("locale=ko"));
  assert!(cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_api_requests_do_not_get_a_locale_cookie() {
  let (app, _) = create_test_app(vec![]);
  let request = Request::builder()
    .uri("/api/health")
    .header(header::ACCEPT_LANGUAGE, "ko")
    .body(Body::empty())
    .unwrap();
  let response = app.clone().oneshot(request).await.unwrap();
  assert!(response.headers().get(header::SET_COOKIE).is_none());
}
