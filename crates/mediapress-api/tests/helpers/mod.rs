//! Shared test setup: config construction and an in-process test server.

pub mod fixtures;

use axum_test::TestServer;
use mediapress_core::Config;

pub const TEST_API_KEY: &str = "test-api-key";

/// Baseline config for tests; individual tests override limits as needed.
pub fn test_config() -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        environment: "test".to_string(),
        api_key: TEST_API_KEY.to_string(),
        // Generous so unrelated tests never trip the limiter.
        rate_limit_requests: 1000,
        rate_limit_window_secs: 60,
        max_files: 20,
        max_file_size_bytes: 10 * 1024 * 1024,
        max_total_size_bytes: 50 * 1024 * 1024,
        allowed_image_types: [
            "image/jpeg",
            "image/jpg",
            "image/png",
            "image/gif",
            "image/webp",
            "image/bmp",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        default_quality: 80,
        webp_method: 6,
        preserve_metadata: true,
        auto_orient: true,
        max_image_dimension: None,
        ffmpeg_path: "ffmpeg".to_string(),
    }
}

/// Build a test server around a fresh application instance. Every call gets
/// its own rate-limiter store.
pub fn setup_test_server(config: Config) -> TestServer {
    let (_state, router) =
        mediapress_api::setup::initialize_app(config).expect("failed to initialize app");
    TestServer::new(router).expect("failed to start test server")
}
