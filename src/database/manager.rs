use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, ConfigError};
use crate::filter::FilterError;

/// Postgres SQLSTATE codes the API distinguishes.
const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Unique violation: {0}")]
    UniqueViolation(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let detail = db_err.constraint().unwrap_or_else(|| db_err.message()).to_string();
            match db_err.code().as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => return DatabaseError::ForeignKeyViolation(detail),
                Some(UNIQUE_VIOLATION) => return DatabaseError::UniqueViolation(detail),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

impl From<FilterError> for DatabaseError {
    fn from(err: FilterError) -> Self {
        DatabaseError::QueryError(err.to_string())
    }
}

/// Process-wide connection pool, built once at startup and passed to every
/// component that needs storage.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &AppConfig) -> Result<Self, DatabaseError> {
        let url = config.database_url()?;
        let pool = Self::pool_options(config).connect(url).await?;
        info!(
            database = %config.redacted_database_url(),
            max_connections = config.database.max_connections,
            "connected to database"
        );
        Ok(Self { pool })
    }

    /// Builds the pool without opening a connection until first use.
    pub fn connect_lazy(config: &AppConfig) -> Result<Self, DatabaseError> {
        let url = config.database_url()?;
        let pool = Self::pool_options(config).connect_lazy(url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }

    fn pool_options(config: &AppConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
    }
}
