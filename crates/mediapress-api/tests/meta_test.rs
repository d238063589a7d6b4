//! Health and info endpoint tests.

mod helpers;

use helpers::{setup_test_server, test_config};

#[tokio::test]
async fn test_health_is_public() {
    let server = setup_test_server(test_config());

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "mediapress");
}

#[tokio::test]
async fn test_info_reports_limits() {
    let server = setup_test_server(test_config());

    let response = server.get("/info").await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["limits"]["max_file_size_mb"], 10);
    assert_eq!(body["limits"]["max_total_size_mb"], 50);
    assert_eq!(body["limits"]["max_files_per_request"], 20);
    assert_eq!(body["supported_formats"]["image_output"], "image/webp");
}
