pub mod conversation;

pub use conversation::{now_iso, write_stamp, ChatMessage, Conversation, Role};
