//! Configuration management for the server.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub max_connections: u32,
    /// Prefix of every stored snapshot key
    pub snapshot_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidMaxConnections)?;

        let snapshot_key = env::var("SNAPSHOT_KEY")
            .unwrap_or_else(|_| taskgrid_engine::STORAGE_KEY.to_string());
        if snapshot_key.is_empty() {
            return Err(ConfigError::EmptySnapshotKey);
        }

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            snapshot_key,
        })
    }

    /// Storage key of the workspace named `workspace`.
    pub fn storage_key(&self, workspace: &str) -> String {
        format!("{}:{}", self.snapshot_key, workspace)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid DATABASE_MAX_CONNECTIONS value")]
    InvalidMaxConnections,

    #[error("SNAPSHOT_KEY must not be empty")]
    EmptySnapshotKey,
}
