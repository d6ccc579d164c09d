//! Loads catalog fixtures (YAML or JSON) into storage.
//!
//! Parents are referenced by slug and created only if absent, and cards go
//! through the bulk ingest path, so loading the same fixture twice changes
//! nothing.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::models::card_details::CardDetails;
use crate::database::models::{AffiliateLink, NewCard, NewEra, NewSet, NewTcg};
use crate::services::card_ingest::{self, IngestReport};

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tcgs: Vec<NewTcg>,
    #[serde(default)]
    pub eras: Vec<NewEra>,
    #[serde(default)]
    pub sets: Vec<FixtureSet>,
    #[serde(default)]
    pub cards: Vec<FixtureCard>,
}

/// A set whose parents are named by slug.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSet {
    pub name: String,
    pub slug: String,
    pub era: String,
    pub tcg: String,
    pub release_date: String,
    #[serde(default, alias = "setImg")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub total_cards: Option<i32>,
    #[serde(default)]
    pub set_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCard {
    pub name: String,
    pub slug: String,
    pub set: String,
    pub details: CardDetails,
    #[serde(default)]
    pub affiliate_links: Vec<AffiliateLink>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub tcgs_created: usize,
    pub eras_created: usize,
    pub sets_created: usize,
    pub cards: Option<IngestReport>,
}

impl Fixture {
    /// Parses by extension: `.json` as JSON, anything else as YAML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let fixture = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?,
            _ => serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(fixture)
    }
}

/// Applies a fixture in one transaction.
pub async fn seed(pool: &PgPool, fixture: Fixture) -> anyhow::Result<SeedReport> {
    let mut tx = pool.begin().await?;
    let report = seed_in(&mut *tx, fixture).await?;
    tx.commit().await?;
    Ok(report)
}

async fn seed_in(conn: &mut PgConnection, fixture: Fixture) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    let mut tcg_ids = HashMap::new();
    for tcg in &fixture.tcgs {
        let (id, created) = match find_id(conn, "tcgs", &tcg.slug).await? {
            Some(id) => (id, false),
            None => (tcg.insert(&mut *conn).await?.id, true),
        };
        report.tcgs_created += created as usize;
        tcg_ids.insert(tcg.slug.clone(), id);
    }

    let mut era_ids = HashMap::new();
    for era in &fixture.eras {
        let (id, created) = match find_id(conn, "eras", &era.slug).await? {
            Some(id) => (id, false),
            None => (era.insert(&mut *conn).await?.id, true),
        };
        report.eras_created += created as usize;
        era_ids.insert(era.slug.clone(), id);
    }

    let mut set_ids = HashMap::new();
    for set in &fixture.sets {
        if let Some(id) = find_id(conn, "sets", &set.slug).await? {
            set_ids.insert(set.slug.clone(), id);
            continue;
        }
        let new_set = NewSet {
            id: None,
            name: set.name.clone(),
            slug: set.slug.clone(),
            cover_image: set.cover_image.clone(),
            era_id: resolve(conn, &era_ids, "eras", &set.era).await?,
            release_date: set.release_date.clone(),
            total_cards: set.total_cards,
            set_code: set.set_code.clone(),
            tcg_id: resolve(conn, &tcg_ids, "tcgs", &set.tcg).await?,
        };
        let errors = new_set.validate();
        if !errors.is_empty() {
            return Err(anyhow!("set '{}' is invalid: {:?}", set.slug, errors));
        }
        let created = new_set.insert(&mut *conn).await?;
        report.sets_created += 1;
        set_ids.insert(set.slug.clone(), created.id);
    }

    if !fixture.cards.is_empty() {
        let mut cards = Vec::with_capacity(fixture.cards.len());
        for card in fixture.cards {
            let new_card = NewCard {
                id: None,
                set_id: resolve(conn, &set_ids, "sets", &card.set).await?,
                name: card.name,
                slug: card.slug,
                details: card.details,
                affiliate_links: card.affiliate_links,
            };
            let errors = new_card.validate();
            if !errors.is_empty() {
                return Err(anyhow!("card '{}' is invalid: {:?}", new_card.slug, errors));
            }
            cards.push(new_card);
        }
        report.cards = Some(card_ingest::ingest_in(conn, cards).await?);
    }

    Ok(report)
}

/// Slug lookup against the fixture first, then storage.
async fn resolve(
    conn: &mut PgConnection,
    known: &HashMap<String, Uuid>,
    table: &'static str,
    slug: &str,
) -> anyhow::Result<Uuid> {
    if let Some(id) = known.get(slug) {
        return Ok(*id);
    }
    find_id(conn, table, slug)
        .await?
        .ok_or_else(|| anyhow!("{} has no row with slug '{}'", table, slug))
}

async fn find_id(conn: &mut PgConnection, table: &'static str, slug: &str) -> anyhow::Result<Option<Uuid>> {
    let sql = format!("SELECT id FROM {} WHERE slug = $1", table);
    let id: Option<(Uuid,)> = sqlx::query_as(&sql).bind(slug).fetch_optional(&mut *conn).await?;
    Ok(id.map(|(id,)| id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_fixture() {
        let yaml = r#"
tcgs:
  - name: Pokemon
    slug: pokemon
eras:
  - name: Original
    slug: original
sets:
  - name: Base Set
    slug: base-set
    era: original
    tcg: pokemon
    releaseDate: "1999-01-09"
    totalCards: 102
cards:
  - name: Charizard
    slug: charizard
    set: base-set
    details:
      card_type: pokemon
      hp: 120
      set_position:
        number: 4
"#;
        let fixture: Fixture = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fixture.tcgs.len(), 1);
        assert_eq!(fixture.sets[0].era, "original");
        assert_eq!(fixture.sets[0].total_cards, Some(102));
        assert_eq!(fixture.cards[0].details.set_position.number, "4");
    }

    #[test]
    fn sample_fixture_is_well_formed() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/pokemon-base.yaml");
        let fixture = Fixture::load(&path).unwrap();
        assert!(!fixture.cards.is_empty());
        let set_slugs: Vec<_> = fixture.sets.iter().map(|s| s.slug.as_str()).collect();
        assert!(fixture.cards.iter().all(|c| set_slugs.contains(&c.set.as_str())));
    }
}
