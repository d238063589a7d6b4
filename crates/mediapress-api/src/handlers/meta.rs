//! Health and service info endpoints. No conversion side effects.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};

use crate::state::AppState;

/// Liveness/health probe.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mediapress",
        "rate_limit": format!(
            "{} requests per {}s",
            state.config.rate_limit_requests, state.config.rate_limit_window_secs
        ),
    }))
}

/// Limits and capabilities, for client discovery.
pub async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = &state.config;
    Json(serde_json::json!({
        "limits": {
            "max_file_size_mb": config.max_file_size_bytes / 1024 / 1024,
            "max_total_size_mb": config.max_total_size_bytes / 1024 / 1024,
            "max_files_per_request": config.max_files,
            "rate_limit_requests": config.rate_limit_requests,
            "rate_limit_window_seconds": config.rate_limit_window_secs,
        },
        "supported_formats": {
            "image_input": config.allowed_image_types,
            "image_output": "image/webp",
            "video_output": "video/webm",
        },
        "features": [
            "Batch conversion",
            "Quality adjustment",
            "Rate limiting",
            "ZIP packaging for multiple files",
        ],
    }))
}
