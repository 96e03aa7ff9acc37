use once_cell::sync::Lazy;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::storage::migration::Migrator;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Connection failed: {0}")]
    Connection(DbErr),
    #[error("Migration failed: {0}")]
    Migration(DbErr),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Local store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A verified connection plus the name of the database it targets.
#[derive(Debug, Clone)]
pub struct DatabaseHandle {
    pub name: String,
    pub connection: DatabaseConnection,
}

// Handles are kept for the lifetime of the process, keyed by connection string.
static DB_HANDLES: Lazy<Mutex<HashMap<String, DatabaseHandle>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns the cached handle for the configured database, connecting on first use.
///
/// The first call opens a pool, pings it and applies the schema. A handle that
/// fails later is not evicted; there is no reconnect.
pub async fn connect(config: &Config) -> Result<DatabaseHandle, StorageError> {
    let url = config
        .database_url()
        .ok_or_else(|| StorageError::Config("database_url is not set".to_string()))?;

    let mut handles = DB_HANDLES.lock().await;
    if let Some(handle) = handles.get(url) {
        return Ok(handle.clone());
    }

    tracing::info!("Connecting to database: {}", url);
    let connection = open(url, config).await?;
    connection.ping().await.map_err(StorageError::Connection)?;

    tracing::info!("Applying migrations...");
    Migrator::up(&connection, None)
        .await
        .map_err(StorageError::Migration)?;

    let handle = DatabaseHandle {
        name: config.database_name.clone(),
        connection,
    };
    handles.insert(url.to_string(), handle.clone());
    tracing::info!("Database '{}' ready", handle.name);

    Ok(handle)
}

async fn open(url: &str, config: &Config) -> Result<DatabaseConnection, StorageError> {
    let mut options = ConnectOptions::new(url);
    options.connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    if url.starts_with("sqlite::memory:") {
        // Every pooled connection to :memory: would get its own empty database
        options.max_connections(1).min_connections(1);
    } else if let Some(path_str) = url.strip_prefix("sqlite://") {
        let path_str = path_str.split('?').next().unwrap_or(path_str);
        let path = std::path::Path::new(path_str);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Created database directory: {}", parent.display());
            }
        }

        if !path.exists() {
            std::fs::File::create(path)?;
            tracing::info!("Created database file: {}", path.display());
        }

        options.max_connections(config.max_connections);
    } else {
        return Err(StorageError::Config(format!(
            "Unsupported database URL: {}",
            url
        )));
    }

    Database::connect(options)
        .await
        .map_err(StorageError::Connection)
}
