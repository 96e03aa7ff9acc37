// tests/integration/mod.rs

pub use serde_json::{json, Value};
pub use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use site_backend::{
    api::routes::{create_router, AppState},
    config::Config,
    storage::{open_repository, ConversationRepository, LocalConversationRepository},
};
use tempfile::TempDir;
use tower::ServiceExt;

pub mod cors;
pub mod forms;
pub mod static_pages;

// ============================================
// Shared Test Helpers
// ============================================

/// Router over a fresh SQLite file. Keep the `TempDir` alive for the test.
pub async fn create_sqlite_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = sqlite_config(&temp_dir);
    let repo = open_repository(&config).await.unwrap();
    (create_router(AppState::new(config, repo)), temp_dir)
}

/// Router over the in-memory local store.
pub fn create_local_app() -> Router {
    create_app_with(Arc::new(LocalConversationRepository::in_memory()))
}

pub fn create_app_with(repo: Arc<dyn ConversationRepository>) -> Router {
    let config = Config {
        local_store_path: String::new(),
        ..Config::default()
    };
    create_router(AppState::new(config, repo))
}

pub fn sqlite_config(temp_dir: &TempDir) -> Config {
    Config {
        database_url: Some(format!(
            "sqlite://{}",
            temp_dir.path().join("site.db").display()
        )),
        ..Config::default()
    }
}

/// Sends one request and returns the status plus the decoded JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub fn test_conversation(id: &str, device_id: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "deviceId": device_id,
        "title": format!("Conversation {}", id),
        "messages": [
            {"role": "user", "content": "How do you price a discovery workshop?", "timestamp": created_at},
            {"role": "assistant", "content": "It depends on scope.", "timestamp": created_at}
        ],
        "createdAt": created_at
    })
}

/// Distinct, lexically ordered timestamps for index `i`.
pub fn minute(i: usize) -> String {
    format!("2024-01-01T{:02}:{:02}:00.000Z", i / 60, i % 60)
}
