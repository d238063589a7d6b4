//! API-key authorization middleware.

use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mediapress_core::constants::API_KEY_HEADER;
use mediapress_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AuthState {
    pub api_key: String,
}

/// Constant-time comparison of two strings to prevent timing attacks on API
/// key validation.
fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Middleware to authenticate requests using the shared API key.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = match request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            tracing::debug!(path = %request.uri().path(), "Request without API key");
            return HttpAppError(AppError::Unauthorized("missing credential".to_string()))
                .into_response();
        }
    };

    if !secure_compare(presented, &auth_state.api_key) {
        tracing::warn!(path = %request.uri().path(), "Request with invalid API key");
        return HttpAppError(AppError::Unauthorized("invalid credential".to_string()))
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_compare_equal() {
        assert!(secure_compare("secret-key", "secret-key"));
    }

    #[test]
    fn test_secure_compare_different_values() {
        assert!(!secure_compare("secret-key", "secret-kez"));
    }

    #[test]
    fn test_secure_compare_different_lengths() {
        assert!(!secure_compare("secret", "secret-key"));
        assert!(!secure_compare("", "secret-key"));
    }
}
