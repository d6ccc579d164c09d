//! API key access gate for mutating routes.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::database::models::ApiKey;
use crate::database::DatabaseError;

/// Lookup of active, scoped credentials.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn find_active(&self, key: &str, scope: &str) -> Result<Option<ApiKey>, DatabaseError>;
}

/// Credential store backed by the `api_keys` table.
#[derive(Clone)]
pub struct PgKeyStore {
    pool: PgPool,
}

impl PgKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyStore for PgKeyStore {
    async fn find_active(&self, key: &str, scope: &str) -> Result<Option<ApiKey>, DatabaseError> {
        ApiKey::find_active(&self.pool, key, scope).await
    }
}

/// Why a request was refused.
#[derive(Debug, Error)]
pub enum GateDenial {
    #[error("API key missing")]
    Missing,

    #[error("Invalid API key")]
    Invalid,

    /// The store could not answer; not a verdict on the credential.
    #[error("key lookup failed: {0}")]
    Internal(DatabaseError),
}

/// Admits a presented key only if it is active and scoped to `scope`. Empty
/// header values count as missing.
pub async fn authorize(store: &dyn KeyStore, presented: Option<&str>, scope: &str) -> Result<ApiKey, GateDenial> {
    let key = match presented {
        Some(k) if !k.is_empty() => k,
        _ => return Err(GateDenial::Missing),
    };
    match store.find_active(key, scope).await {
        Ok(Some(found)) => Ok(found),
        Ok(None) => Err(GateDenial::Invalid),
        Err(err) => Err(GateDenial::Internal(err)),
    }
}
