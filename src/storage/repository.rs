use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{prelude::*, QueryOrder, QuerySelect, Set};

use crate::models::{now_iso, Conversation};
use crate::storage::db::DatabaseHandle;
use crate::storage::entities::conversations;

/// Rows per INSERT statement during bulk import, well under SQLite's bind limit.
const INSERT_BATCH: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DbError(#[from] sea_orm::DbErr),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a create-or-update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub conversation: Conversation,
    pub created: bool,
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Newest first by `createdAt`.
    async fn list_recent(&self, limit: u64) -> Result<Vec<Conversation>, RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>, RepositoryError>;

    /// Inserts or fully replaces the document keyed by `conv.id`.
    async fn upsert(&self, conv: Conversation) -> Result<UpsertOutcome, RepositoryError>;

    /// Returns `false` when nothing matched.
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Inserts every document whose id is not taken yet and returns how many went in.
    async fn insert_many(&self, convs: Vec<Conversation>) -> Result<u64, RepositoryError>;

    async fn delete_by_device(&self, device_id: &str) -> Result<u64, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Short backend name reported by the health probe.
    fn backend(&self) -> &'static str;

    fn database_name(&self) -> String;
}

pub struct SeaOrmConversationRepository {
    db: DatabaseConnection,
    name: String,
}

impl SeaOrmConversationRepository {
    pub fn new(handle: DatabaseHandle) -> Self {
        Self {
            db: handle.connection,
            name: handle.name,
        }
    }
}

impl TryFrom<conversations::Model> for Conversation {
    type Error = serde_json::Error;

    fn try_from(model: conversations::Model) -> Result<Self, Self::Error> {
        Ok(Conversation {
            id: model.id,
            device_id: model.device_id,
            title: model.title,
            messages: serde_json::from_value(model.messages)?,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
        })
    }
}

fn to_active_model(conv: &Conversation) -> Result<conversations::ActiveModel, serde_json::Error> {
    let updated_at = conv.updated_at.clone().unwrap_or_else(now_iso);
    let created_at = conv.created_at.clone().unwrap_or_else(|| updated_at.clone());

    Ok(conversations::ActiveModel {
        id: Set(conv.id.clone()),
        device_id: Set(conv.device_id.clone()),
        title: Set(conv.title.clone()),
        messages: Set(serde_json::to_value(&conv.messages)?),
        created_at: Set(created_at),
        updated_at: Set(updated_at),
    })
}

#[async_trait]
impl ConversationRepository for SeaOrmConversationRepository {
    async fn list_recent(&self, limit: u64) -> Result<Vec<Conversation>, RepositoryError> {
        let models = conversations::Entity::find()
            .order_by_desc(conversations::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|m| Conversation::try_from(m).map_err(RepositoryError::from))
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>, RepositoryError> {
        let model = conversations::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;

        Ok(model.map(Conversation::try_from).transpose()?)
    }

    async fn upsert(&self, mut conv: Conversation) -> Result<UpsertOutcome, RepositoryError> {
        let stored_created_at = conversations::Entity::find_by_id(conv.id.clone())
            .select_only()
            .column(conversations::Column::CreatedAt)
            .into_tuple::<String>()
            .one(&self.db)
            .await?;
        let created = stored_created_at.is_none();
        let keep_stored_created_at = conv.created_at.is_none();
        conv.settle_created_at(stored_created_at.as_deref());

        // A single INSERT .. ON CONFLICT statement: concurrent writers wait on
        // the busy timeout rather than failing a read-to-write lock upgrade.
        let mut replaced = vec![
            conversations::Column::DeviceId,
            conversations::Column::Title,
            conversations::Column::Messages,
            conversations::Column::UpdatedAt,
        ];
        if !keep_stored_created_at {
            replaced.push(conversations::Column::CreatedAt);
        }

        let stored = conversations::Entity::insert(to_active_model(&conv)?)
            .on_conflict(
                OnConflict::column(conversations::Column::Id)
                    .update_columns(replaced)
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        tracing::debug!("Upserted conversation {} (created: {})", stored.id, created);

        Ok(UpsertOutcome {
            conversation: Conversation::try_from(stored)?,
            created,
        })
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = conversations::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_many(&self, convs: Vec<Conversation>) -> Result<u64, RepositoryError> {
        let models = convs
            .iter()
            .map(to_active_model)
            .collect::<Result<Vec<_>, _>>()?;

        let mut inserted = 0;
        for batch in models.chunks(INSERT_BATCH) {
            // Taken ids are skipped row by row; the rest of the batch still lands
            inserted += conversations::Entity::insert_many(batch.to_vec())
                .on_conflict(
                    OnConflict::column(conversations::Column::Id)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
        }

        Ok(inserted)
    }

    async fn delete_by_device(&self, device_id: &str) -> Result<u64, RepositoryError> {
        let result = conversations::Entity::delete_many()
            .filter(conversations::Column::DeviceId.eq(device_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.db.ping().await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn database_name(&self) -> String {
        self.name.clone()
    }
}
