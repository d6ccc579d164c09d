use std::collections::{BTreeMap, HashMap};

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::database::models::{Card, NewCard};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::types::{Page, Paginated};
use crate::filter::{Lookup, QueryFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::card_ingest::{self, IngestReport};
use crate::state::AppState;

/// GET /cards - filtered, paginated listing
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<BTreeMap<String, String>>, QueryRejection>,
) -> ApiResult<Paginated<Card>> {
    let Query(params) = params?;
    let filter_config = &state.config.filter;
    let page = Page::normalize(
        params.get("limit").map(String::as_str),
        params.get("offset").map(String::as_str),
        filter_config.default_limit,
    );
    let predicate = QueryFilter::new(Card::FILTER_COLUMNS, &filter_config.numeric_document_fields)
        .strict(filter_config.strict_operators)
        .compile(&params)?;

    let cards = Repository::<Card>::new(state.db.pool().clone())
        .select_page(predicate, Card::catalog_order(), page)
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to fetch Pokémon cards."))?;
    Ok(ApiResponse::success(cards))
}

/// GET /cards/:identifier
pub async fn get(
    State(state): State<AppState>,
    identifier: Result<Path<String>, PathRejection>,
) -> ApiResult<Card> {
    let Path(identifier) = identifier?;
    let card = Repository::<Card>::new(state.db.pool().clone())
        .select_404(&Lookup::resolve(&identifier), "Card not found.")
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to fetch Pokémon card."))?;
    Ok(ApiResponse::success(card))
}

/// POST /cards
pub async fn create(State(state): State<AppState>, payload: Result<Json<NewCard>, JsonRejection>) -> ApiResult<Card> {
    let Json(input) = payload?;
    ApiError::check_fields(input.validate())?;

    let card = input
        .insert(state.db.pool())
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to create card"))?;
    tracing::info!(id = %card.id, slug = %card.slug, "card created");
    Ok(ApiResponse::created(card))
}

/// POST /cards/bulk - idempotent batch import
pub async fn bulk(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<IngestReport> {
    let Json(body) = payload?;
    let cards = parse_batch(body)?;

    let report = card_ingest::ingest(state.db.pool(), cards).await?;
    let status = if report.created_count > 0 { StatusCode::CREATED } else { StatusCode::OK };
    Ok(ApiResponse::with_status(report, status))
}

/// Accepts `[card, ...]` or `{"cards": [card, ...]}` and validates every card.
fn parse_batch(body: Value) -> Result<Vec<NewCard>, ApiError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("cards") {
            Some(Value::Array(items)) => items,
            _ => return Err(ApiError::bad_request("No cards provided")),
        },
        _ => return Err(ApiError::bad_request("Expected a JSON array of cards")),
    };
    if items.is_empty() {
        return Err(ApiError::bad_request("No cards provided"));
    }

    let mut cards = Vec::with_capacity(items.len());
    let mut field_errors = HashMap::new();
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<NewCard>(item) {
            Ok(card) => {
                for (field, problem) in card.validate() {
                    field_errors.insert(format!("cards[{}].{}", i, field), problem);
                }
                cards.push(card);
            }
            Err(e) => {
                field_errors.insert(format!("cards[{}]", i), e.to_string());
            }
        }
    }
    ApiError::check_fields(field_errors)?;
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card(slug: &str) -> Value {
        json!({
            "name": slug,
            "slug": slug,
            "setId": "1b4e28ba-2fa1-41d2-883f-0016d3cca427",
            "details": {"card_type": "pokemon", "hp": "60", "set_position": {"number": "7"}}
        })
    }

    #[test]
    fn accepts_array_and_wrapped_batches() {
        assert_eq!(parse_batch(json!([card("a"), card("b")])).unwrap().len(), 2);
        assert_eq!(parse_batch(json!({ "cards": [card("a")] })).unwrap().len(), 1);
    }

    #[test]
    fn empty_batch_is_bad_request() {
        for body in [json!([]), json!({ "cards": [] }), json!({})] {
            let err = parse_batch(body).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.message(), "No cards provided");
        }
    }

    #[test]
    fn invalid_cards_are_reported_by_index() {
        let mut bad = card("c");
        bad["details"]["set_position"]["number"] = json!("");
        let err = parse_batch(json!([card("a"), {"name": "x"}, bad])).unwrap_err();
        let body = err.to_json();
        assert!(body["field_errors"].get("cards[1]").is_some());
        assert!(body["field_errors"].get("cards[2].details.set_position.number").is_some());
    }
}
