use super::{send, sqlite_config};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use site_backend::{
    api::routes::{create_router, AppState},
    config::Config,
    storage::{open_repository, ConversationRepository, LocalConversationRepository},
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

#[tokio::test]
async fn test_static_dir_serves_pages() {
    let site = TempDir::new().unwrap();
    std::fs::write(site.path().join("index.html"), "<h1>Strategy that ships</h1>").unwrap();

    let config = Config {
        static_dir: Some(site.path().display().to_string()),
        local_store_path: String::new(),
        ..Config::default()
    };
    let app = create_router(AppState::new(
        config,
        Arc::new(LocalConversationRepository::in_memory()),
    ));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"<h1>Strategy that ships</h1>");

    // API routes still win over the static fallback
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_backend_selection_follows_database_url() {
    let temp_dir = TempDir::new().unwrap();

    let with_db = open_repository(&sqlite_config(&temp_dir)).await.unwrap();
    assert_eq!(with_db.backend(), "sqlite");

    let store_path = temp_dir.path().join("local").join("conversations.json");
    let without_db = open_repository(&Config {
        local_store_path: store_path.display().to_string(),
        ..Config::default()
    })
    .await
    .unwrap();
    assert_eq!(without_db.backend(), "local");
    assert_eq!(without_db.database_name(), store_path.display().to_string());
}
