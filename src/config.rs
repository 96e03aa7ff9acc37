use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Main configuration for the site backend
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    /// Interface the HTTP server binds to
    pub server_host: String,

    /// HTTP server port
    #[validate(range(min = 1024, max = 65535))]
    pub server_port: u16,

    /// Document store connection string. When absent the local store is used.
    pub database_url: Option<String>,

    /// Name of the target database, reported by the health probe
    #[validate(length(min = 1))]
    pub database_name: String,

    /// Maximum database connections
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,

    /// Connect timeout applied to the pool, in seconds
    #[validate(range(min = 1, max = 300))]
    pub connect_timeout_secs: u64,

    /// File backing the local store; an empty string keeps it in memory only
    pub local_store_path: String,

    /// Directory holding the pre-built front-end bundle
    pub static_dir: Option<String>,

    /// Log level (e.g., info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            database_url: None,
            database_name: "website".to_string(),
            max_connections: 10,
            connect_timeout_secs: 10,
            local_store_path: "data/conversations.json".to_string(),
            static_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `~/.site-backend/config` (if present) and `SITE__*` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let default_file = PathBuf::from(home).join(".site-backend").join("config");
        Self::build(config::File::from(default_file).required(false))
    }

    /// Loads an explicit config file, which must exist, plus `SITE__*` overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Config::default();
        let settings = config::Config::builder()
            .set_default("server_host", defaults.server_host)?
            .set_default("server_port", i64::from(defaults.server_port))?
            .set_default("database_name", defaults.database_name)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("local_store_path", defaults.local_store_path)?
            .set_default("log_level", defaults.log_level)?
            .add_source(file)
            // Environment overrides: SITE__SERVER_PORT, SITE__DATABASE_URL, etc.
            .add_source(config::Environment::with_prefix("SITE").separator("__"))
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The configured connection string, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Local store file, or `None` for a memory-only store.
    pub fn local_store_file(&self) -> Option<PathBuf> {
        let path = self.local_store_path.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
