use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Invalid value for column '{column}': {message}")]
    InvalidValue { column: String, message: String },

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool setup for the PostgreSQL backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect a pool using the configured URL and limits
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Connected database pool (max {} connections)",
            config.max_connections
        );
        Ok(pool)
    }

    fn validate_url(raw: &str) -> Result<(), StoreError> {
        let url = url::Url::parse(raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            _ => Err(StoreError::InvalidDatabaseUrl),
        }
    }

    /// Quote SQL identifier to prevent injection
    pub(crate) fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
