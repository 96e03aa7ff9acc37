use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use utoipa::ToSchema;

/// Last millisecond handed out by [`write_stamp`].
static LAST_WRITE_MS: AtomicI64 = AtomicI64::new(0);

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Like [`now_iso`], but strictly later than any stamp this process returned
/// before, even for writes landing in the same millisecond.
pub fn write_stamp() -> String {
    let now = Utc::now().timestamp_millis();
    let last = LAST_WRITE_MS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    let millis = now.max(last + 1);

    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

/// A chat conversation owned by an anonymous device.
///
/// `id` is assigned by the client and is the key for every lookup and upsert.
/// Fields a client leaves out decode to empty values, so a replace clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Conversation {
    /// Overwrites `updatedAt` with the write time, whatever the client sent.
    pub fn stamp(&mut self, now: &str) {
        self.updated_at = Some(now.to_string());
    }

    /// Fills a missing `createdAt` from the stored copy, or from `updatedAt` for a
    /// document that is being inserted.
    pub fn settle_created_at(&mut self, stored: Option<&str>) {
        if self.created_at.is_none() {
            let created_at = stored
                .map(str::to_string)
                .or_else(|| self.updated_at.clone())
                .unwrap_or_else(now_iso);
            self.created_at = Some(created_at);
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}
