//! Idempotent bulk card ingest.
//!
//! A batch is deduplicated by natural key, first against itself and then
//! against storage, and only new cards are inserted. The whole batch commits
//! or rolls back as one transaction.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{NaturalKey, NewCard};
use crate::database::DatabaseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub created_count: usize,
    pub existing_count: usize,
    pub message: String,
}

impl IngestReport {
    fn new(created_count: usize, existing_count: usize) -> Self {
        let message = if created_count == 0 {
            "All cards already exist".to_string()
        } else {
            format!("Created {} cards, {} already existed", created_count, existing_count)
        };
        Self { created_count, existing_count, message }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No cards provided")]
    Empty,

    #[error(transparent)]
    Storage(#[from] DatabaseError),

    #[error("Failed to encode card: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::Storage(err.into())
    }
}

/// Splits a batch into cards to insert and a count of the rest. A card is
/// dropped if its natural key is in `existing` or appeared earlier in the batch.
pub fn partition(candidates: Vec<NewCard>, existing: &HashSet<NaturalKey>) -> (Vec<NewCard>, usize) {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut fresh = Vec::with_capacity(candidates.len());
    let mut duplicates = 0;
    for card in candidates {
        let key = card.natural_key();
        if existing.contains(&key) || !seen.insert(key) {
            duplicates += 1;
        } else {
            fresh.push(card);
        }
    }
    (fresh, duplicates)
}

/// Runs [`ingest_in`] in its own transaction on `pool`.
pub async fn ingest(pool: &PgPool, candidates: Vec<NewCard>) -> Result<IngestReport, IngestError> {
    if candidates.is_empty() {
        return Err(IngestError::Empty);
    }

    let mut tx = pool.begin().await?;
    match ingest_in(&mut *tx, candidates).await {
        Ok(report) => {
            tx.commit().await?;
            info!(created = report.created_count, existing = report.existing_count, "bulk card ingest committed");
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback after failed ingest also failed");
            }
            Err(err)
        }
    }
}

/// Ingests on an open connection, normally inside the caller's transaction.
pub async fn ingest_in(conn: &mut PgConnection, candidates: Vec<NewCard>) -> Result<IngestReport, IngestError> {
    if candidates.is_empty() {
        return Err(IngestError::Empty);
    }
    let total = candidates.len();

    let existing = existing_keys(conn, &candidates).await?;
    let (fresh, duplicates) = partition(candidates, &existing);
    if fresh.is_empty() {
        return Ok(IngestReport::new(0, duplicates));
    }

    let created = insert_new(conn, &fresh).await?;
    Ok(IngestReport::new(created, total - created))
}

/// Natural keys from the batch already present in storage, in one round trip.
async fn existing_keys(conn: &mut PgConnection, candidates: &[NewCard]) -> Result<HashSet<NaturalKey>, IngestError> {
    let mut slugs = Vec::with_capacity(candidates.len());
    let mut set_ids = Vec::with_capacity(candidates.len());
    let mut numbers = Vec::with_capacity(candidates.len());
    for card in candidates {
        let key = card.natural_key();
        slugs.push(key.slug);
        set_ids.push(key.set_id);
        numbers.push(key.number);
    }

    let rows: Vec<(String, Uuid, String)> = sqlx::query_as(
        r#"
        SELECT c.slug, c.set_id, c.details #>> '{set_position,number}'
        FROM cards c
        JOIN UNNEST($1::text[], $2::uuid[], $3::text[]) AS k(slug, set_id, number)
          ON c.slug = k.slug
         AND c.set_id = k.set_id
         AND c.details #>> '{set_position,number}' = k.number
        "#,
    )
    .bind(slugs)
    .bind(set_ids)
    .bind(numbers)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(slug, set_id, number)| NaturalKey { slug, set_id, number })
        .collect())
}

/// Inserts in one statement. Rows that lost a race to a concurrent batch are
/// skipped by the natural-key index and not counted as created.
async fn insert_new(conn: &mut PgConnection, cards: &[NewCard]) -> Result<usize, IngestError> {
    let mut ids = Vec::with_capacity(cards.len());
    let mut names = Vec::with_capacity(cards.len());
    let mut slugs = Vec::with_capacity(cards.len());
    let mut set_ids = Vec::with_capacity(cards.len());
    let mut details = Vec::with_capacity(cards.len());
    let mut links = Vec::with_capacity(cards.len());
    for card in cards {
        ids.push(card.id.unwrap_or_else(Uuid::new_v4));
        names.push(card.name.clone());
        slugs.push(card.slug.clone());
        set_ids.push(card.set_id);
        details.push(serde_json::to_string(&card.details)?);
        links.push(serde_json::to_string(&card.affiliate_links)?);
    }

    let inserted: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO cards (id, name, slug, set_id, details, affiliate_links)
        SELECT id, name, slug, set_id, details::jsonb, links::jsonb
        FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::uuid[], $5::text[], $6::text[])
             AS t(id, name, slug, set_id, details, links)
        ON CONFLICT DO NOTHING
        RETURNING id
        "#,
    )
    .bind(ids)
    .bind(names)
    .bind(slugs)
    .bind(set_ids)
    .bind(details)
    .bind(links)
    .fetch_all(&mut *conn)
    .await?;

    Ok(inserted.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card(slug: &str, set_id: Uuid, number: &str) -> NewCard {
        serde_json::from_value(json!({
            "name": slug,
            "slug": slug,
            "setId": set_id,
            "details": {"card_type": "pokemon", "set_position": {"number": number}}
        }))
        .unwrap()
    }

    #[test]
    fn nothing_existing_keeps_whole_batch() {
        let set = Uuid::new_v4();
        let batch = vec![card("bulbasaur", set, "44"), card("ivysaur", set, "30")];
        let (fresh, duplicates) = partition(batch, &HashSet::new());
        assert_eq!(fresh.len(), 2);
        assert_eq!(duplicates, 0);
    }

    #[test]
    fn existing_keys_are_dropped_and_counted() {
        let set = Uuid::new_v4();
        let existing: HashSet<_> = [card("pikachu", set, "58").natural_key()].into_iter().collect();
        let batch = vec![card("pikachu", set, "58"), card("raichu", set, "14")];
        let (fresh, duplicates) = partition(batch, &existing);
        assert_eq!(fresh.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>(), vec!["raichu"]);
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn repeats_within_batch_count_as_existing() {
        let set = Uuid::new_v4();
        let batch = vec![card("onix", set, "56"), card("onix", set, "56"), card("onix", set, "57")];
        let (fresh, duplicates) = partition(batch, &HashSet::new());
        assert_eq!(fresh.len(), 2);
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn same_slug_in_other_set_is_new() {
        let existing: HashSet<_> = [card("mew", Uuid::new_v4(), "8").natural_key()].into_iter().collect();
        let (fresh, duplicates) = partition(vec![card("mew", Uuid::new_v4(), "8")], &existing);
        assert_eq!(fresh.len(), 1);
        assert_eq!(duplicates, 0);
    }

    #[test]
    fn report_serializes_camel_case() {
        let value = serde_json::to_value(IngestReport::new(1, 2)).unwrap();
        assert_eq!(value["createdCount"], 1);
        assert_eq!(value["existingCount"], 2);
        assert!(value["message"].is_string());
    }
}
