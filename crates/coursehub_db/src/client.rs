//! Database client
//!
//! Wraps an SQLite connection pool. File databases get their parent directory
//! created on first start; `sqlite::memory:` URLs are pinned to a single
//! long-lived connection because every new in-memory connection would
//! otherwise see an empty database.

use crate::error::DbError;
use crate::schema;
use coursehub_config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database transaction
pub type DbTransaction<'a> = Transaction<'a, Sqlite>;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    /// Connects using the `database` section of the configuration.
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }

        let max = db_config.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let pool = Self::create_pool(&db_config.url, max).await?;
        Ok(Self { pool })
    }

    /// Connects to the given URL with default pool settings.
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }

        let pool = Self::create_pool(db_url, DEFAULT_MAX_CONNECTIONS).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self, DbError> {
        let client = Self::from_url("sqlite::memory:").await?;
        client.init_schema().await?;
        Ok(client)
    }

    async fn create_pool(db_url: &str, max_connections: u32) -> Result<SqlitePool, DbError> {
        debug!("Creating database pool with URL: {}", db_url);

        let options = SqliteConnectOptions::from_str(db_url)
            .map_err(|e| DbError::ConfigError(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = db_url.contains(":memory:") || db_url.contains("mode=memory");

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            ensure_parent_dir(db_url)?;
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(3))
                .idle_timeout(Duration::from_secs(600))
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            error!("Failed to create database pool: {}", e);
            DbError::PoolError(e.to_string())
        })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<DbTransaction<'_>, DbError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    /// Creates all tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing database schema");
        let mut tx = self.begin().await?;
        for statement in schema::STATEMENTS {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to apply schema statement: {}", e);
                    DbError::QueryError(e.to_string())
                })?;
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;
        info!("Database schema initialized successfully");
        Ok(())
    }

    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

fn ensure_parent_dir(db_url: &str) -> Result<(), DbError> {
    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .unwrap_or(db_url);
    let path = path.split('?').next().unwrap_or(path);

    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating directory for SQLite database: {:?}", dir);
            std::fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory for SQLite database: {}", e);
                DbError::PoolError(format!("Failed to create directory: {}", e))
            })?;
        }
    }
    Ok(())
}
