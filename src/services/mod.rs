pub mod conversation_service;

pub use conversation_service::{ConversationService, LIST_LIMIT};
