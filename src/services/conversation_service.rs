use serde_json::Value;
use std::sync::Arc;

use crate::models::{now_iso, write_stamp, Conversation};
use crate::storage::{ConversationRepository, RepositoryError, UpsertOutcome};

/// Most conversations returned by a listing.
pub const LIST_LIMIT: u64 = 100;

/// Server-side rules shared by every conversation endpoint, whichever backend
/// sits underneath.
#[derive(Clone)]
pub struct ConversationService {
    repo: Arc<dyn ConversationRepository>,
}

impl ConversationService {
    pub fn new(repo: Arc<dyn ConversationRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn ConversationRepository> {
        &self.repo
    }

    pub async fn list(&self) -> Result<Vec<Conversation>, RepositoryError> {
        self.repo.list_recent(LIST_LIMIT).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Conversation>, RepositoryError> {
        self.repo.find_by_id(id).await
    }

    /// Stamps `updatedAt` and upserts by id.
    pub async fn save(&self, mut conv: Conversation) -> Result<UpsertOutcome, RepositoryError> {
        conv.stamp(&write_stamp());
        self.repo.upsert(conv).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        self.repo.delete(id).await
    }

    /// Decodes each item on its own and inserts the usable ones as new documents.
    ///
    /// Items that do not decode or carry no id are dropped, as are ids that are
    /// already taken. Only the number inserted comes back.
    pub async fn import(&self, items: Vec<Value>) -> Result<u64, RepositoryError> {
        let now = now_iso();
        let total = items.len();

        let convs: Vec<Conversation> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<Conversation>(item) {
                Ok(conv) if conv.has_id() => Some(conv),
                Ok(_) => {
                    tracing::warn!("Skipping import item {}: missing id", index);
                    None
                }
                Err(e) => {
                    tracing::warn!("Skipping import item {}: {}", index, e);
                    None
                }
            })
            .map(|mut conv| {
                conv.stamp(&now);
                conv.settle_created_at(None);
                conv
            })
            .collect();

        let inserted = self.repo.insert_many(convs).await?;
        tracing::info!("Imported {} of {} conversations", inserted, total);
        Ok(inserted)
    }

    pub async fn delete_for_device(&self, device_id: &str) -> Result<u64, RepositoryError> {
        let deleted = self.repo.delete_by_device(device_id).await?;
        tracing::info!("Deleted {} conversations for device {}", deleted, device_id);
        Ok(deleted)
    }

    pub async fn ping(&self) -> Result<(), RepositoryError> {
        self.repo.ping().await
    }
}
