//! Image conversion endpoint: 1..N uploaded images re-encoded as WebP,
//! returned as a raw stream (one success) or a zip archive (batch).

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::collect_image_files;
use mediapress_core::constants::{MAX_QUALITY, MIN_QUALITY};
use mediapress_core::AppError;
use mediapress_processing::{convert_batch, package, BatchValidator, Packaged};

#[derive(Debug, Deserialize)]
pub struct ConvertImageQuery {
    pub quality: Option<u8>,
}

/// Convert one or more images to WebP.
///
/// Accepts multipart fields named `file` (single) or `files` (repeated) and
/// an optional `quality` query parameter (60-100, default from config).
///
/// # Responses
/// - 200 `image/webp` when exactly one file was uploaded and converted
/// - 200 `application/zip` otherwise: converted files plus an error
///   manifest when some files failed
/// - 400 validation failure or no convertible files
/// - 413 per-file or aggregate size limit exceeded
#[tracing::instrument(skip(state, multipart), fields(quality = ?query.quality))]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConvertImageQuery>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let files = collect_image_files(multipart).await?;

    let validator = BatchValidator::new(
        state.config.max_files,
        state.config.max_file_size_bytes,
        state.config.max_total_size_bytes,
        state.config.allowed_image_types.clone(),
        (MIN_QUALITY, MAX_QUALITY),
    );
    let batch = validator.validate(files, query.quality)?;
    let quality = query.quality.unwrap_or(state.config.default_quality);

    let result = convert_batch(&state.image, batch, quality)?;
    let converted = result.converted();
    let failed = result.failed();
    let total_input_bytes = result.total_input_bytes;

    match package(result)? {
        Packaged::Single { filename, bytes } => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/webp")
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            )
            .header("X-Converted-Files", converted.to_string())
            .header("X-Failed-Files", failed.to_string())
            .body(Body::from(bytes))
            .map_err(|e| AppError::Internal(format!("failed to build response: {}", e)).into()),
        Packaged::Archive { bytes } => {
            let archive_name = format!(
                "converted_images_{}.zip",
                chrono::Utc::now().format("%Y%m%d_%H%M%S")
            );
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/zip")
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", archive_name),
                )
                .header("X-Converted-Files", converted.to_string())
                .header("X-Failed-Files", failed.to_string())
                .header("X-Total-Size", total_input_bytes.to_string())
                .body(Body::from(bytes))
                .map_err(|e| AppError::Internal(format!("failed to build response: {}", e)).into())
        }
    }
}
