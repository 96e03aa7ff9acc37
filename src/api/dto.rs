use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Conversation;

// ==================== REQUEST DTOs ====================

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkImportRequest {
    /// Checked for shape by the handler, then decoded item by item
    #[serde(default)]
    #[schema(value_type = Option<Vec<Conversation>>)]
    pub conversations: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    #[serde(rename = "deviceId")]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    /// Service the visitor is asking about
    pub service: Option<String>,
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewsletterRequest {
    #[validate(required, email)]
    pub email: Option<String>,
}

// ==================== RESPONSE DTOs ====================

/// Success envelope carrying a payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Success envelope without a payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub database: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
