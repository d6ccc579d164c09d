use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{cards, eras, sets, system, tcg};
use crate::middleware::require_api_key;
use crate::state::AppState;

/// Full application router. Reads are public; every POST sits behind the
/// API key gate.
pub fn app(state: AppState) -> Router {
    let prefix = state.config.server.api_prefix.clone();
    let catalog = catalog_routes(state.clone());

    let router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health));

    let router = if prefix.is_empty() || prefix == "/" {
        router.merge(catalog)
    } else {
        router.nest(&prefix, catalog)
    };

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn catalog_routes(state: AppState) -> Router<AppState> {
    let gate = middleware::from_fn_with_state(state, require_api_key);

    Router::new()
        .route("/tcg", get(tcg::list).merge(post(tcg::create).route_layer(gate.clone())))
        .route("/tcg/:identifier", get(tcg::get))
        .route("/eras", get(eras::list).merge(post(eras::create).route_layer(gate.clone())))
        .route("/eras/:identifier", get(eras::get))
        .route("/sets", get(sets::list).merge(post(sets::create).route_layer(gate.clone())))
        .route("/sets/:identifier", get(sets::get))
        .route("/cards", get(cards::list).merge(post(cards::create).route_layer(gate.clone())))
        .route("/cards/bulk", post(cards::bulk).route_layer(gate))
        .route("/cards/:identifier", get(cards::get))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let mut origins = Vec::new();
    for origin in &security.cors_origins {
        match HeaderValue::from_str(origin) {
            Ok(value) => origins.push(value),
            Err(err) => tracing::warn!("ignoring invalid CORS origin '{origin}': {err}"),
        }
    }
    let mut headers = vec![axum::http::header::CONTENT_TYPE];
    if let Ok(key_header) = HeaderName::from_bytes(security.api_key_header.as_bytes()) {
        headers.push(key_header);
    }
    Some(
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(headers)
            .allow_origin(origins),
    )
}
