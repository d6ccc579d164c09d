use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use super::card_set::CardSet;
use super::{require_text, require_v4_id, Entity, FieldErrors};
use crate::database::manager::DatabaseError;

/// Chronological grouping of sets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Era {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Era {
    const TABLE: &'static str = "eras";
}

#[derive(Debug, Serialize)]
pub struct EraWithSets {
    #[serde(flatten)]
    pub era: Era,
    pub sets: Vec<CardSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEra {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
}

impl NewEra {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_v4_id(&mut errors, self.id);
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "slug", &self.slug);
        errors
    }

    pub async fn insert<'c, E>(&self, executor: E) -> Result<Era, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let era = sqlx::query_as::<_, Era>("INSERT INTO eras (id, name, slug) VALUES ($1, $2, $3) RETURNING *")
            .bind(self.id.unwrap_or_else(Uuid::new_v4))
            .bind(&self.name)
            .bind(&self.slug)
            .fetch_one(executor)
            .await?;
        Ok(era)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_id_must_be_v4() {
        let v1: NewEra = serde_json::from_value(json!({
            "id": "c232ab00-9414-11ec-b3c8-9f6bdeced846",
            "name": "Neo",
            "slug": "neo"
        }))
        .unwrap();
        assert_eq!(v1.validate().get("id").map(String::as_str), Some("Must be a version 4 UUID"));

        let v4 = NewEra { id: Some(Uuid::new_v4()), ..v1 };
        assert!(v4.validate().is_empty());
    }

    #[test]
    fn missing_id_is_generated_later() {
        let era: NewEra = serde_json::from_value(json!({ "name": "Neo", "slug": "neo" })).unwrap();
        assert!(era.id.is_none());
        assert!(era.validate().is_empty());
    }
}
