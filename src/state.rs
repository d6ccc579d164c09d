use std::sync::Arc;

use crate::auth::{KeyStore, PgKeyStore};
use crate::config::AppConfig;
use crate::database::Database;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub keys: Arc<dyn KeyStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, keys: Arc<dyn KeyStore>, config: AppConfig) -> Self {
        Self { db, keys, config: Arc::new(config) }
    }

    /// State whose key store reads the same database as the catalog.
    pub fn with_pg_keys(db: Database, config: AppConfig) -> Self {
        let keys = Arc::new(PgKeyStore::new(db.pool().clone()));
        Self::new(db, keys, config)
    }
}
