use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// A credential presented in the API key header. Only active keys whose
/// `usage_type` matches the required scope open the write endpoints.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub is_active: bool,
    pub usage_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn generate_key() -> String {
        Uuid::new_v4().to_string()
    }

    pub async fn create<'c, E>(executor: E, name: &str, usage_type: &str) -> Result<ApiKey, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let key = sqlx::query_as::<_, ApiKey>(
            "INSERT INTO api_keys (id, key, name, is_active, usage_type) VALUES ($1, $2, $3, TRUE, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(Self::generate_key())
        .bind(name)
        .bind(usage_type)
        .fetch_one(executor)
        .await?;
        Ok(key)
    }

    pub async fn find_active<'c, E>(executor: E, key: &str, usage_type: &str) -> Result<Option<ApiKey>, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let found = sqlx::query_as::<_, ApiKey>(
            "SELECT * FROM api_keys WHERE key = $1 AND is_active = TRUE AND usage_type = $2",
        )
        .bind(key)
        .bind(usage_type)
        .fetch_optional(executor)
        .await?;
        Ok(found)
    }

    /// Deactivates a key. Returns false when no such key exists.
    pub async fn revoke<'c, E>(executor: E, key: &str) -> Result<bool, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE api_keys SET is_active = FALSE, updated_at = now() WHERE key = $1")
            .bind(key)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_distinct_uuids() {
        let a = ApiKey::generate_key();
        let b = ApiKey::generate_key();
        assert_eq!(a.len(), 36);
        assert!(Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b);
    }
}
