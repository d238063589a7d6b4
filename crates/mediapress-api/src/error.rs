//! HTTP error response conversion
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse,
//! HttpAppError>`. Use `AppError` (or types that implement
//! `Into<HttpAppError>`) for errors so they render consistently (status,
//! body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediapress_core::{AppError, ErrorMetadata, LogLevel};
use mediapress_processing::{BatchExhausted, ImageError, ValidationError, VideoError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Reduce file size")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from
/// mediapress-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match &err {
            ValidationError::FileTooLarge { .. } | ValidationError::TotalSizeExceeded { .. } => {
                AppError::PayloadTooLarge(err.to_string())
            }
            _ => AppError::InvalidInput(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<ImageError> for HttpAppError {
    fn from(err: ImageError) -> Self {
        HttpAppError(AppError::ImageProcessing(err.to_string()))
    }
}

impl From<VideoError> for HttpAppError {
    fn from(err: VideoError) -> Self {
        let app = match &err {
            // Setup and filesystem problems are ours, not the caller's.
            VideoError::InvalidBinaryPath | VideoError::Io(_) => {
                AppError::Internal(err.to_string())
            }
            _ => AppError::VideoProcessing(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<BatchExhausted> for HttpAppError {
    fn from(err: BatchExhausted) -> Self {
        HttpAppError(AppError::BatchExhausted(err.0))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let detail = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %detail, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %detail, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %detail, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details for sensitive errors and in production.
        let details = if is_production_env() || app_error.is_sensitive() {
            None
        } else {
            Some(app_error.detailed_message())
        };

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        });

        (status, body).into_response()
    }
}
