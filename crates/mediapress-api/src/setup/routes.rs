//! Route configuration and setup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthState};
use crate::handlers::{convert_image, convert_video, meta};
use crate::middleware::rate_limit::{rate_limit_middleware, SlidingWindowLimiter};
use crate::state::AppState;

/// Slack on top of the aggregate upload limit for multipart framing.
const BODY_LIMIT_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes.
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let config = &state.config;

    let cors = setup_cors(&config.cors_origins)?;
    let auth_state = Arc::new(AuthState {
        api_key: config.api_key.clone(),
    });
    let rate_limiter = Arc::new(SlidingWindowLimiter::new(
        config.rate_limit_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1024)
        .max(1);

    let public_routes = Router::new()
        .route("/health", get(meta::health))
        .route("/info", get(meta::info));

    let protected_routes = Router::new()
        .route("/convert-image", post(convert_image::convert_image))
        .route("/convert-video", post(convert_video::convert_video))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    // Layers run outermost-last: rate limiting sees a request before auth,
    // auth before any body handling in the handlers.
    let app = public_routes
        .merge(protected_routes)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.max_total_size_bytes + BODY_LIMIT_OVERHEAD_BYTES,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(origins: &[String]) -> Result<CorsLayer, anyhow::Error> {
    let parsed = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}
