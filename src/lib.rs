//! Site backend - conversation storage and lead forms for the marketing site

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;

// Re-export main types for convenience
pub use crate::api::dto::*;
pub use crate::api::routes::{create_router, AppState};
pub use crate::config::Config;
pub use crate::models::{ChatMessage, Conversation, Role};
pub use crate::services::ConversationService;
pub use crate::storage::{
    open_repository, ConversationRepository, LocalConversationRepository,
    SeaOrmConversationRepository,
};
