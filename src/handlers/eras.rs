use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{CardSet, Era, EraWithSets, NewEra};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::types::{Condition, FilterOrderInfo, FilterValue, Predicate, SortDirection};
use crate::filter::Lookup;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /eras
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Era>> {
    let order = vec![FilterOrderInfo { expression: "\"name\"".to_string(), sort: SortDirection::Asc }];
    let eras = Repository::<Era>::new(state.db.pool().clone())
        .select_any(Predicate::all(), order)
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to fetch Pokemon Eras"))?;
    Ok(ApiResponse::success(eras))
}

/// GET /eras/:identifier - the era with its sets
pub async fn get(
    State(state): State<AppState>,
    identifier: Result<Path<String>, PathRejection>,
) -> ApiResult<EraWithSets> {
    let Path(identifier) = identifier?;
    let failure = format!("Failed to fetch pokemon era with identifier \"{}\"", identifier);
    let pool = state.db.pool().clone();

    let era = Repository::<Era>::new(pool.clone())
        .select_404(
            &Lookup::resolve(&identifier),
            format!("Era not found with id or slug: \"{}\"", identifier),
        )
        .await
        .map_err(|e| ApiError::from_storage(e, &failure))?;

    let by_era = Predicate::all().and(Condition::column_eq("era_id", FilterValue::Uuid(era.id)));
    let order = vec![FilterOrderInfo { expression: "\"release_date\"".to_string(), sort: SortDirection::Asc }];
    let sets = Repository::<CardSet>::new(pool)
        .select_any(by_era, order)
        .await
        .map_err(|e| ApiError::from_storage(e, &failure))?;

    Ok(ApiResponse::success(EraWithSets { era, sets }))
}

/// POST /eras
pub async fn create(State(state): State<AppState>, payload: Result<Json<NewEra>, JsonRejection>) -> ApiResult<Era> {
    let Json(input) = payload?;
    ApiError::check_fields(input.validate())?;

    let era = input
        .insert(state.db.pool())
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to create era"))?;
    tracing::info!(id = %era.id, slug = %era.slug, "era created");
    Ok(ApiResponse::created(era))
}
