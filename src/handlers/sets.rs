use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::database::models::{Card, CardSet, Era, NewSet, SetWithCards};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::filter_order::FilterOrder;
use crate::filter::types::{Condition, FieldRef, FilterOp, FilterOrderInfo, FilterValue, Predicate, SortDirection};
use crate::filter::Lookup;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SetsQuery {
    /// Era id or slug.
    pub era: Option<String>,
    /// Case-insensitive substring of the set name.
    pub name: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

const LIST_FAILURE: &str = "Failed to fetch Pokémon sets.";

/// GET /sets
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<SetsQuery>, QueryRejection>,
) -> ApiResult<Vec<CardSet>> {
    let Query(query) = query?;
    let pool = state.db.pool().clone();
    let mut predicate = Predicate::all();

    if let Some(era) = query.era.as_deref() {
        let era_id = match Lookup::resolve(era) {
            Lookup::Id(id) => id,
            slug @ Lookup::Slug(_) => {
                let found = Repository::<Era>::new(pool.clone())
                    .select_one(&slug)
                    .await
                    .map_err(|e| ApiError::from_storage(e, LIST_FAILURE))?;
                match found {
                    Some(era) => era.id,
                    None => return Ok(ApiResponse::success(vec![])),
                }
            }
        };
        predicate.push(Condition::column_eq("era_id", FilterValue::Uuid(era_id)));
    }

    if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
        predicate.push(Condition::new(
            FieldRef::Column("name"),
            FilterOp::ILike,
            FilterValue::Text(format!("%{}%", name)),
        ));
    }

    let mut order = FilterOrder::parse(query.sort.as_deref(), query.order.as_deref(), CardSet::SORTABLE);
    order.push(FilterOrderInfo { expression: "\"id\"".to_string(), sort: SortDirection::Asc });

    let sets = Repository::<CardSet>::new(pool)
        .select_any(predicate, order)
        .await
        .map_err(|e| ApiError::from_storage(e, LIST_FAILURE))?;
    Ok(ApiResponse::success(sets))
}

/// GET /sets/:identifier - the set with its cards in printed order
pub async fn get(
    State(state): State<AppState>,
    identifier: Result<Path<String>, PathRejection>,
) -> ApiResult<SetWithCards> {
    let Path(identifier) = identifier?;
    const FAILURE: &str = "Failed to fetch Pokémon set.";
    let pool = state.db.pool().clone();

    let set = Repository::<CardSet>::new(pool.clone())
        .select_404(&Lookup::resolve(&identifier), "Set not found.")
        .await
        .map_err(|e| ApiError::from_storage(e, FAILURE))?;

    let in_set = Predicate::all().and(Condition::column_eq("set_id", FilterValue::Uuid(set.id)));
    let cards = Repository::<Card>::new(pool)
        .select_any(in_set, Card::position_order())
        .await
        .map_err(|e| ApiError::from_storage(e, FAILURE))?;

    Ok(ApiResponse::success(SetWithCards { set, cards }))
}

/// POST /sets
pub async fn create(State(state): State<AppState>, payload: Result<Json<NewSet>, JsonRejection>) -> ApiResult<CardSet> {
    let Json(input) = payload?;
    ApiError::check_fields(input.validate())?;

    let set = input
        .insert(state.db.pool())
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to create set"))?;
    tracing::info!(id = %set.id, slug = %set.slug, "set created");
    Ok(ApiResponse::created(set))
}
