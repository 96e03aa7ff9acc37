pub mod db;
pub mod entities;
pub mod local;
pub mod migration;
pub mod repository;

use std::sync::Arc;

use crate::config::Config;

pub use db::{connect, DatabaseHandle, StorageError};
pub use entities::conversations;
pub use local::LocalConversationRepository;
pub use repository::{
    ConversationRepository, RepositoryError, SeaOrmConversationRepository, UpsertOutcome,
};

/// Picks the storage backend once, at startup: the database when a connection
/// string is configured, the local store otherwise.
pub async fn open_repository(
    config: &Config,
) -> Result<Arc<dyn ConversationRepository>, StorageError> {
    if config.database_url().is_some() {
        let handle = connect(config).await?;
        tracing::info!("Using database storage ({})", handle.name);
        return Ok(Arc::new(SeaOrmConversationRepository::new(handle)));
    }

    let repo = match config.local_store_file() {
        Some(path) => LocalConversationRepository::open(path).await?,
        None => LocalConversationRepository::in_memory(),
    };
    tracing::warn!(
        "No database_url configured; using local storage at {}",
        repo.database_name()
    );
    Ok(Arc::new(repo))
}
