use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use super::{require_text, require_v4_id, Entity, FieldErrors};
use crate::database::manager::DatabaseError;

/// A trading card game, the root of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tcg {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Tcg {
    const TABLE: &'static str = "tcgs";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTcg {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    #[serde(default, alias = "img")]
    pub image: Option<String>,
}

impl NewTcg {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_v4_id(&mut errors, self.id);
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "slug", &self.slug);
        errors
    }

    pub async fn insert<'c, E>(&self, executor: E) -> Result<Tcg, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let tcg = sqlx::query_as::<_, Tcg>(
            "INSERT INTO tcgs (id, name, slug, image) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(self.id.unwrap_or_else(Uuid::new_v4))
        .bind(&self.name)
        .bind(&self.slug)
        .bind(&self.image)
        .fetch_one(executor)
        .await?;
        Ok(tcg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_id_must_be_v4() {
        // v7, time-ordered
        let tcg: NewTcg = serde_json::from_value(json!({
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "name": "Pokemon",
            "slug": "pokemon",
            "img": "https://example.com/logo.png"
        }))
        .unwrap();
        assert!(tcg.validate().contains_key("id"));
        assert_eq!(tcg.image.as_deref(), Some("https://example.com/logo.png"));

        let tcg = NewTcg { id: Some(Uuid::new_v4()), ..tcg };
        assert!(tcg.validate().is_empty());
    }
}
