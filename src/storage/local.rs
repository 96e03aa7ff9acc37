//! File-backed stand-in for the document store.
//!
//! Used when no `database_url` is configured. All documents live in one JSON
//! object keyed by conversation id, rewritten after every mutation.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::models::Conversation;
use crate::storage::db::StorageError;
use crate::storage::repository::{ConversationRepository, RepositoryError, UpsertOutcome};

type Documents = BTreeMap<String, Conversation>;

pub struct LocalConversationRepository {
    path: Option<PathBuf>,
    docs: RwLock<Documents>,
}

impl LocalConversationRepository {
    /// A store that keeps nothing across restarts.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            docs: RwLock::new(Documents::new()),
        }
    }

    /// Opens the store at `path`, loading whatever an earlier run left there.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Documents::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Documents::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Local store opened at {} ({} conversations)",
            path.display(),
            docs.len()
        );

        Ok(Self {
            path: Some(path),
            docs: RwLock::new(docs),
        })
    }

    async fn persist(&self, docs: &Documents) -> Result<(), RepositoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(docs)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Applies `change` to a copy of the documents and swaps it in once it is on disk.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Documents) -> T,
    ) -> Result<T, RepositoryError> {
        let mut docs = self.docs.write().await;
        let mut next = docs.clone();
        let result = change(&mut next);
        self.persist(&next).await?;
        *docs = next;
        Ok(result)
    }
}

#[async_trait]
impl ConversationRepository for LocalConversationRepository {
    async fn list_recent(&self, limit: u64) -> Result<Vec<Conversation>, RepositoryError> {
        let docs = self.docs.read().await;
        let mut all: Vec<Conversation> = docs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn upsert(&self, mut conv: Conversation) -> Result<UpsertOutcome, RepositoryError> {
        self.commit(|docs| {
            let stored = docs.get(&conv.id).and_then(|c| c.created_at.clone());
            let created = !docs.contains_key(&conv.id);
            conv.settle_created_at(stored.as_deref());
            docs.insert(conv.id.clone(), conv.clone());
            UpsertOutcome {
                conversation: conv,
                created,
            }
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        if !self.docs.read().await.contains_key(id) {
            return Ok(false);
        }
        self.commit(|docs| docs.remove(id).is_some()).await
    }

    async fn insert_many(&self, convs: Vec<Conversation>) -> Result<u64, RepositoryError> {
        self.commit(|docs| {
            let mut inserted = 0;
            for mut conv in convs {
                if docs.contains_key(&conv.id) {
                    tracing::warn!("Skipping import of existing conversation {}", conv.id);
                    continue;
                }
                conv.settle_created_at(None);
                docs.insert(conv.id.clone(), conv);
                inserted += 1;
            }
            inserted
        })
        .await
    }

    async fn delete_by_device(&self, device_id: &str) -> Result<u64, RepositoryError> {
        self.commit(|docs| {
            let before = docs.len();
            docs.retain(|_, conv| conv.device_id != device_id);
            (before - docs.len()) as u64
        })
        .await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "local"
    }

    fn database_name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        }
    }
}
