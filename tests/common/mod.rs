#![allow(dead_code)]

use std::{
  path::PathBuf,
  sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
  body::{to_bytes, Body},
  http::{Request, StatusCode},
  Router,
};
use serde_json::Value;
use tower::ServiceExt;

use doomsday_backend::{
  build_router,
  config::AppConfig,
  gateway::{CompletionBackend, GatewayError},
  AppState,
};

/// Replays canned replies in order and records every prompt it receives.
pub struct ScriptedBackend {
  replies: Mutex<Vec<Result<String, GatewayError>>>,
  pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
  fn name(&self) -> &str {
    "scripted"
  }

  async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
    self.prompts.lock().unwrap().push(prompt.to_string());
    let mut replies = self.replies.lock().unwrap();
    if replies.is_empty() {
      Err(GatewayError::Transport("no scripted reply left".into()))
    } else {
      replies.remove(0)
    }
  }
}

pub fn create_test_app(replies: Vec<Result<String, GatewayError>>) -> (Router, Arc<ScriptedBackend>) {
  let backend = Arc::new(ScriptedBackend { replies: Mutex::new(replies), prompts: Mutex::new(vec![]) });
  let dyn_backend: Arc<dyn CompletionBackend> = backend.clone();
  let state = AppState::with_backend(&AppConfig::default(), Some(dyn_backend), PathBuf::from("./static"));
  (build_router(Arc::new(state)), backend)
}

pub fn questions_json(n: usize) -> String {
  let items: Vec<String> = (0..n)
    .map(|i| format!(r#"{{"question":"Dilemma {}","options":["left","middle","right"]}}"#, i))
    .collect();
  format!("[{}]", items.join(","))
}

pub fn result_json(percentile: u8, rarity: &str) -> String {
  format!(
    r#"{{"type":"🧟 Zombie Survivalist","summary":"You survive.","advice":"Keep running.","quote":"Braaains.","badge":"Runner","rarity":"{}","tags":["cardio","snacks"],"percentile":{}}}"#,
    rarity, percentile
  )
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(json) => builder
      .header("content-type", "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, json)
}
