use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - service description
pub async fn root(State(state): State<AppState>) -> ApiResult<Value> {
    let prefix = &state.config.server.api_prefix;
    Ok(ApiResponse::success(json!({
        "name": "TCG Catalog API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tcg": format!("{}/tcg[/:identifier]", prefix),
            "eras": format!("{}/eras[/:identifier]", prefix),
            "sets": format!("{}/sets[/:identifier]", prefix),
            "cards": format!("{}/cards[/:identifier]", prefix),
            "bulk": format!("{}/cards/bulk (api key)", prefix),
        }
    })))
}

/// GET /health - storage ping
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    match state.db.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }))),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            Err(ApiError::ServiceUnavailable("Database unavailable".to_string()))
        }
    }
}
