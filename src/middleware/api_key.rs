use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{authorize, GateDenial};
use crate::error::ApiError;
use crate::state::AppState;

/// Gate for mutating routes. Rejects before the handler runs unless the
/// configured header carries an active key with the required scope.
pub async fn require_api_key(State(state): State<AppState>, headers: HeaderMap, request: Request, next: Next) -> Response {
    let security = &state.config.security;
    // Issued keys are ASCII; an opaque header value cannot match one.
    let presented = match headers.get(security.api_key_header.as_str()).map(|v| v.to_str()) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => return deny(&request, GateDenial::Invalid),
    };

    match authorize(state.keys.as_ref(), presented, &security.api_key_scope).await {
        Ok(key) => {
            tracing::debug!(key_name = %key.name, "api key accepted");
            next.run(request).await
        }
        Err(denial) => deny(&request, denial),
    }
}

fn deny(request: &Request, denial: GateDenial) -> Response {
    if !matches!(denial, GateDenial::Internal(_)) {
        tracing::warn!(path = %request.uri().path(), reason = %denial, "api key rejected");
    }
    ApiError::from(denial).into_response()
}
