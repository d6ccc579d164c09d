use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{NewTcg, Tcg};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::types::{FilterOrderInfo, Predicate, SortDirection};
use crate::filter::Lookup;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /tcg
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Tcg>> {
    let order = vec![FilterOrderInfo { expression: "\"name\"".to_string(), sort: SortDirection::Asc }];
    let tcgs = Repository::<Tcg>::new(state.db.pool().clone())
        .select_any(Predicate::all(), order)
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to fetch TCGs"))?;
    Ok(ApiResponse::success(tcgs))
}

/// GET /tcg/:identifier
pub async fn get(
    State(state): State<AppState>,
    identifier: Result<Path<String>, PathRejection>,
) -> ApiResult<Tcg> {
    let Path(identifier) = identifier?;
    let tcg = Repository::<Tcg>::new(state.db.pool().clone())
        .select_404(&Lookup::resolve(&identifier), "TCG not found")
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to fetch TCG"))?;
    Ok(ApiResponse::success(tcg))
}

/// POST /tcg
pub async fn create(State(state): State<AppState>, payload: Result<Json<NewTcg>, JsonRejection>) -> ApiResult<Tcg> {
    let Json(input) = payload?;
    ApiError::check_fields(input.validate())?;

    let tcg = input
        .insert(state.db.pool())
        .await
        .map_err(|e| ApiError::from_storage(e, "Failed to create TCG"))?;
    tracing::info!(id = %tcg.id, slug = %tcg.slug, "tcg created");
    Ok(ApiResponse::created(tcg))
}
