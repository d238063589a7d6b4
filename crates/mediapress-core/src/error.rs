//! Error types module
//!
//! All failures the service reports to a caller are unified under [`AppError`].
//! The [`ErrorMetadata`] trait lets each variant self-describe its HTTP
//! presentation (status, machine code, client message, sensitivity) so the
//! API layer can render errors without matching on variants itself.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like rejected media
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_INPUT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Video processing error: {0}")]
    VideoProcessing(String),

    #[error("Batch conversion produced no output: {0}")]
    BatchExhausted(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable,
/// suggested_action, sensitive, log_level). client_message stays per-variant
/// for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Supply a valid API key in the x-api-key header"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size or split the batch"),
            false,
            LogLevel::Debug,
        ),
        AppError::ImageProcessing(_) => (
            400,
            "IMAGE_PROCESSING_ERROR",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::VideoProcessing(_) => (
            400,
            "VIDEO_PROCESSING_ERROR",
            false,
            Some("Check video format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::BatchExhausted(_) => (
            400,
            "BATCH_EXHAUSTED",
            false,
            Some("Fix the reported files and resubmit"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, None, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, None, true, LogLevel::Error)
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            // Sensitive variants get a generic message; detail is only logged.
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error during conversion".to_string()
            }
            other => other.to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }
}

impl AppError {
    /// Short variant name for structured log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::VideoProcessing(_) => "VideoProcessing",
            AppError::BatchExhausted(_) => "BatchExhausted",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "InternalWithSource",
        }
    }

    /// Full message including any wrapped source, for logs only.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {}", message, source)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidInput("x".into()).http_status_code(), 400);
        assert_eq!(AppError::Unauthorized("x".into()).http_status_code(), 401);
        assert_eq!(
            AppError::PayloadTooLarge("x".into()).http_status_code(),
            413
        );
        assert_eq!(
            AppError::ImageProcessing("x".into()).http_status_code(),
            400
        );
        assert_eq!(AppError::BatchExhausted("x".into()).http_status_code(), 400);
        assert_eq!(AppError::Internal("x".into()).http_status_code(), 500);
    }

    #[test]
    fn test_internal_errors_hide_detail_from_clients() {
        let err = AppError::Internal("connection reset by peer".into());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("connection reset"));
    }

    #[test]
    fn test_validation_errors_keep_detail() {
        let err = AppError::InvalidInput("empty file: a.png".into());
        assert!(!err.is_sensitive());
        assert!(err.client_message().contains("a.png"));
    }

    #[test]
    fn test_from_anyhow_preserves_source() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_type(), "InternalWithSource");
        assert!(err.detailed_message().contains("boom"));
    }
}
