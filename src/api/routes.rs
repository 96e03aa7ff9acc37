use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    api::{
        docs,
        dto::*,
        error::{ApiError, AppJson, AppQuery},
        forms,
    },
    config::Config,
    models::Conversation,
    services::ConversationService,
    storage::ConversationRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub conversations: ConversationService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, repo: Arc<dyn ConversationRepository>) -> Self {
        Self {
            config: Arc::new(config),
            conversations: ConversationService::new(repo),
            started_at: Instant::now(),
        }
    }
}

fn require_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::Validation("Conversation ID is required".to_string()));
    }
    Ok(id)
}

fn conversation_not_found() -> ApiError {
    ApiError::NotFound("Conversation not found".to_string())
}

#[utoipa::path(
    get,
    path = "/conversations",
    tag = "conversations",
    responses(
        (status = 200, description = "Latest 100 conversations, newest first", body = ApiResponse<Vec<Conversation>>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Conversation>>>, ApiError> {
    let conversations = state.conversations.list().await?;
    Ok(Json(ApiResponse::new(conversations)))
}

#[utoipa::path(
    post,
    path = "/conversations",
    tag = "conversations",
    request_body = Conversation,
    responses(
        (status = 201, description = "Conversation created", body = ApiResponse<Conversation>),
        (status = 200, description = "Conversation replaced", body = ApiResponse<Conversation>),
        (status = 400, description = "Missing id or malformed body", body = ErrorResponse)
    )
)]
pub async fn save_conversation(
    State(state): State<AppState>,
    AppJson(conv): AppJson<Conversation>,
) -> Result<(StatusCode, Json<ApiResponse<Conversation>>), ApiError> {
    require_id(&conv.id)?;

    let outcome = state.conversations.save(conv).await?;
    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Conversation created")
    } else {
        (StatusCode::OK, "Conversation updated")
    };

    Ok((
        status,
        Json(ApiResponse::new(outcome.conversation).with_message(message)),
    ))
}

#[utoipa::path(
    get,
    path = "/conversations/{id}",
    tag = "conversations",
    params(("id" = String, Path, description = "Application-assigned conversation id")),
    responses(
        (status = 200, description = "The conversation", body = ApiResponse<Conversation>),
        (status = 404, description = "No such conversation", body = ErrorResponse)
    )
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Conversation>>, ApiError> {
    let id = require_id(&id)?;

    match state.conversations.get(id).await? {
        Some(conv) => Ok(Json(ApiResponse::new(conv))),
        None => Err(conversation_not_found()),
    }
}

#[utoipa::path(
    delete,
    path = "/conversations/{id}",
    tag = "conversations",
    params(("id" = String, Path, description = "Application-assigned conversation id")),
    responses(
        (status = 200, description = "Conversation deleted", body = MessageResponse),
        (status = 404, description = "No such conversation", body = ErrorResponse)
    )
)]
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = require_id(&id)?;

    if state.conversations.delete(id).await? {
        Ok(Json(MessageResponse::new("Conversation deleted")))
    } else {
        Err(conversation_not_found())
    }
}

#[utoipa::path(
    post,
    path = "/conversations/bulk",
    tag = "conversations",
    request_body = BulkImportRequest,
    responses(
        (status = 200, description = "Number of conversations inserted", body = MessageResponse),
        (status = 400, description = "Missing, empty or non-array conversations", body = ErrorResponse)
    )
)]
pub async fn import_conversations(
    State(state): State<AppState>,
    AppJson(req): AppJson<BulkImportRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let items = match req.conversations {
        Some(serde_json::Value::Array(items)) if !items.is_empty() => items,
        _ => {
            return Err(ApiError::Validation(
                "conversations must be a non-empty array".to_string(),
            ))
        }
    };

    let inserted = state.conversations.import(items).await?;
    Ok(Json(MessageResponse::new(format!(
        "Imported {} conversations",
        inserted
    ))))
}

#[utoipa::path(
    delete,
    path = "/conversations/bulk",
    tag = "conversations",
    params(("deviceId" = String, Query, description = "Owning device")),
    responses(
        (status = 200, description = "Number of conversations deleted", body = MessageResponse),
        (status = 400, description = "Missing deviceId", body = ErrorResponse)
    )
)]
pub async fn delete_device_conversations(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DeviceQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let device_id = query
        .device_id
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("deviceId is required".to_string()))?;

    let deleted = state.conversations.delete_for_device(device_id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Deleted {} conversations",
        deleted
    ))))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and storage are up", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Storage unreachable", body = ErrorResponse)
    )
)]
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    state
        .conversations
        .ping()
        .await
        .map_err(|e| ApiError::Unavailable(format!("Database unavailable: {}", e)))?;

    let repo = state.conversations.repository();
    Ok(Json(ApiResponse::new(HealthResponse {
        status: "ok".to_string(),
        storage: repo.backend().to_string(),
        database: repo.database_name(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Any origin; preflight requests are answered here and never reach a handler.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(save_conversation),
        )
        .route(
            "/conversations/bulk",
            post(import_conversations).delete(delete_device_conversations),
        )
        .route(
            "/conversations/{id}",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/contact", post(forms::submit_contact))
        .route("/newsletter", post(forms::subscribe_newsletter))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .method_not_allowed_fallback(method_not_allowed);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}
