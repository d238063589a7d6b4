//! Video conversion endpoint: a single uploaded video transcoded to WebM.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
};

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_single_file;
use mediapress_core::AppError;

/// Replace the input's extension with `.webm`, keeping the stem.
fn webm_output_filename(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("converted");
    format!("{}.webm", stem)
}

/// Convert a single video to WebM (VP9/Opus).
///
/// Blocks for the duration of the external transcode; there is no batch
/// video path.
#[tracing::instrument(skip(state, multipart))]
pub async fn convert_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let file = extract_single_file(multipart).await?;
    if file.data.is_empty() {
        return Err(AppError::InvalidInput(format!("empty file: {}", file.filename)).into());
    }

    tracing::info!(
        input = %file.filename,
        input_bytes = file.data.len(),
        "Transcoding video to WebM"
    );
    let output = state.video.convert_to_webm(&file.data).await?;
    let filename = webm_output_filename(&file.filename);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/webm")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(output))
        .map_err(|e| AppError::Internal(format!("failed to build response: {}", e)).into())
}
