use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use super::card::Card;
use super::{require_text, require_v4_id, Entity, FieldErrors};
use crate::database::manager::DatabaseError;
use crate::filter::types::{field, FieldMapping};

/// A released collection of cards. Belongs to one era and one game.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub cover_image: Option<String>,
    pub era_id: Uuid,
    pub release_date: String,
    pub total_cards: Option<i32>,
    pub set_code: Option<String>,
    pub tcg_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for CardSet {
    const TABLE: &'static str = "sets";
}

impl CardSet {
    pub const SORTABLE: &'static [FieldMapping] = &[field("releaseDate", "release_date"), field("name", "name")];
}

#[derive(Debug, Serialize)]
pub struct SetWithCards {
    #[serde(flatten)]
    pub set: CardSet,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSet {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    #[serde(default, alias = "setImg")]
    pub cover_image: Option<String>,
    pub era_id: Uuid,
    pub release_date: String,
    #[serde(default)]
    pub total_cards: Option<i32>,
    #[serde(default)]
    pub set_code: Option<String>,
    pub tcg_id: Uuid,
}

impl NewSet {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_v4_id(&mut errors, self.id);
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "slug", &self.slug);
        if NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d").is_err() {
            errors.insert("releaseDate".to_string(), "Expected a YYYY-MM-DD date".to_string());
        }
        if matches!(self.total_cards, Some(n) if n < 0) {
            errors.insert("totalCards".to_string(), "Must not be negative".to_string());
        }
        errors
    }

    pub async fn insert<'c, E>(&self, executor: E) -> Result<CardSet, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let set = sqlx::query_as::<_, CardSet>(
            r#"
            INSERT INTO sets (id, name, slug, cover_image, era_id, release_date, total_cards, set_code, tcg_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(self.id.unwrap_or_else(Uuid::new_v4))
        .bind(&self.name)
        .bind(&self.slug)
        .bind(&self.cover_image)
        .bind(self.era_id)
        .bind(&self.release_date)
        .bind(self.total_cards)
        .bind(&self.set_code)
        .bind(self.tcg_id)
        .fetch_one(executor)
        .await?;
        Ok(set)
    }
}
