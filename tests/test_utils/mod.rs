//! Test utilities for integration tests
#![allow(dead_code)]

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use solace::ai::testing::ScriptedInference;
use solace::ai::{OpenAiBackend, SharedInference};
use solace::api::app;
use solace::core::{AppConfig, ChatVariant, GenerationParams};

pub const INDEX_HTML: &str = "<!doctype html><title>Solace test page</title>";

/// Creates a config with a throwaway static directory holding an
/// `index.html`.
pub fn test_config(variant: ChatVariant, llm_api_hostname: &str) -> AppConfig {
    // Unique directory per call so parallel tests don't collide
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string();
    let dir = env::temp_dir().join(format!("solace-test-{}", ts));
    fs::create_dir_all(&dir).expect("Failed to create static directory");
    fs::write(dir.join("index.html"), INDEX_HTML).expect("Failed to write index.html");

    AppConfig {
        llm_api_hostname: llm_api_hostname.to_string(),
        llm_api_key: String::from("test-api-key"),
        llm_model: String::from("test-model"),
        llm_timeout: Duration::from_secs(5),
        generation: GenerationParams::default(),
        system_message: String::from("You are a supportive listener."),
        variant,
        static_dir: dir.display().to_string(),
    }
}

/// Creates a test application router backed by `backend`.
pub fn test_app(variant: ChatVariant, backend: Arc<ScriptedInference>) -> Router {
    let config = test_config(variant, "http://127.0.0.1:9");
    app(&config, backend)
}

/// Creates a test application router that talks to a real OpenAI
/// compatible server at `url`, e.g. a `mockito` server.
pub fn test_app_with_backend_url(variant: ChatVariant, url: &str) -> Router {
    let config = test_config(variant, url);
    let backend: SharedInference = Arc::new(OpenAiBackend::new(&config));
    app(&config, backend)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> Value {
    let body = body_to_string(body).await;
    serde_json::from_str(&body).expect("Body is not JSON")
}

/// POSTs `json` to `uri` and returns the status and parsed body.
pub async fn post_json(app: &Router, uri: &str, json: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}
