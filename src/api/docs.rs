use axum::Json;
use utoipa::OpenApi;

use crate::api::{dto, forms, routes};
use crate::models::{ChatMessage, Conversation, Role};

#[derive(OpenApi)]
#[openapi(
    info(title = "Site backend API"),
    paths(
        routes::list_conversations,
        routes::save_conversation,
        routes::get_conversation,
        routes::delete_conversation,
        routes::import_conversations,
        routes::delete_device_conversations,
        routes::health,
        forms::submit_contact,
        forms::subscribe_newsletter,
    ),
    components(schemas(
        Conversation,
        ChatMessage,
        Role,
        dto::BulkImportRequest,
        dto::ContactRequest,
        dto::NewsletterRequest,
        dto::MessageResponse,
        dto::HealthResponse,
        dto::ErrorResponse,
    )),
    tags(
        (name = "conversations", description = "Chat conversation storage"),
        (name = "forms", description = "Contact and newsletter forms"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
