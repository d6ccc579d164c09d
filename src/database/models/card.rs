use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use super::card_details::CardDetails;
use super::{require_text, require_v4_id, Entity, FieldErrors};
use crate::database::manager::DatabaseError;
use crate::filter::types::{field, FieldMapping, FilterOrderInfo, SortDirection};

/// A single printed card. Category-specific attributes live in `details`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub set_id: Uuid,
    pub details: serde_json::Value,
    pub affiliate_links: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Card {
    const TABLE: &'static str = "cards";
    const DOCUMENT_COLUMN: Option<&'static str> = Some("details");
}

impl Card {
    /// Top-level keys the list endpoint filters on directly; anything else is
    /// looked up inside `details`.
    pub const FILTER_COLUMNS: &'static [FieldMapping] = &[
        field("id", "id"),
        field("name", "name"),
        field("slug", "slug"),
        field("setId", "set_id"),
    ];

    /// Numeric part of `details.set_position.number`, so "10/102" sorts after "9/102".
    pub const POSITION_ORDER: &'static str =
        r#"NULLIF(regexp_replace(split_part("details" #>> '{set_position,number}', '/', 1), '[^0-9]', '', 'g'), '')::numeric"#;

    /// Catalog order: grouped by set, then by printed position, then by id.
    pub fn catalog_order() -> Vec<FilterOrderInfo> {
        vec![
            FilterOrderInfo { expression: "\"set_id\"".to_string(), sort: SortDirection::Asc },
            FilterOrderInfo { expression: Self::POSITION_ORDER.to_string(), sort: SortDirection::Asc },
            FilterOrderInfo { expression: "\"id\"".to_string(), sort: SortDirection::Asc },
        ]
    }

    /// Order within one set, for the set detail view.
    pub fn position_order() -> Vec<FilterOrderInfo> {
        Self::catalog_order().into_iter().skip(1).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub site: String,
    pub url: String,
}

/// Identity of a card independent of its generated id: one printing of a
/// slug at one position of one set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub slug: String,
    pub set_id: Uuid,
    pub number: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub set_id: Uuid,
    pub details: CardDetails,
    #[serde(default)]
    pub affiliate_links: Vec<AffiliateLink>,
}

impl NewCard {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            slug: self.slug.clone(),
            set_id: self.set_id,
            number: self.details.set_position.number.clone(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_v4_id(&mut errors, self.id);
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "slug", &self.slug);
        errors.extend(self.details.validate());
        for (i, link) in self.affiliate_links.iter().enumerate() {
            if url::Url::parse(&link.url).is_err() {
                errors.insert(format!("affiliateLinks[{}].url", i), "Must be an absolute URL".to_string());
            }
        }
        errors
    }

    pub async fn insert<'c, E>(&self, executor: E) -> Result<Card, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (id, name, slug, set_id, details, affiliate_links)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(self.id.unwrap_or_else(Uuid::new_v4))
        .bind(&self.name)
        .bind(&self.slug)
        .bind(self.set_id)
        .bind(Json(&self.details))
        .bind(Json(&self.affiliate_links))
        .fetch_one(executor)
        .await?;
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn charizard(number: serde_json::Value) -> NewCard {
        serde_json::from_value(json!({
            "name": "Charizard",
            "slug": "charizard",
            "setId": "6f1c7a53-29a5-4b55-9c1b-0f4f3f3c2a10",
            "details": {
                "card_type": "pokemon",
                "hp": 120,
                "set_position": {"number": number}
            },
            "affiliateLinks": [{"site": "tcgplayer", "url": "https://www.tcgplayer.com/product/1"}]
        }))
        .unwrap()
    }

    #[test]
    fn natural_key_normalizes_numeric_position() {
        let a = charizard(json!(4));
        let b = charizard(json!("4"));
        assert_eq!(a.natural_key(), b.natural_key());
        assert_ne!(a.natural_key(), charizard(json!("4/102")).natural_key());
    }

    #[test]
    fn validate_checks_links_and_details() {
        let mut card = charizard(json!("4"));
        assert!(card.validate().is_empty());

        card.affiliate_links.push(AffiliateLink { site: "x".to_string(), url: "not a url".to_string() });
        card.name = "  ".to_string();
        let errors = card.validate();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("affiliateLinks[1].url"));
    }

    #[test]
    fn rejects_non_v4_client_id() {
        let mut card = charizard(json!("4"));
        card.id = Some(Uuid::parse_str("c232ab00-9414-11ec-b3c8-9f6bdeced846").unwrap());
        assert!(card.validate().contains_key("id"));
        card.id = Some(Uuid::new_v4());
        assert!(card.validate().is_empty());
    }

    #[test]
    fn catalog_order_ends_with_id_tiebreak() {
        let order = Card::catalog_order();
        assert_eq!(order.first().unwrap().expression, "\"set_id\"");
        assert_eq!(order.last().unwrap().expression, "\"id\"");
        assert_eq!(Card::position_order().len(), 2);
    }
}
