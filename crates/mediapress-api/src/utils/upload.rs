//! Common utilities for file upload handlers

use axum::extract::Multipart;
use mediapress_core::AppError;
use mediapress_processing::UploadedFile;

/// Collect uploaded files from a multipart form.
///
/// Accepts a single field named `file` or repeated fields named `files`;
/// fields without a filename are skipped. Count and size limits are the
/// validator's job, not this function's.
pub async fn collect_image_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default();
        if field_name != "file" && field_name != "files" {
            continue;
        }

        let Some(filename) = field
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
        else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        files.push(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Ok(files)
}

/// Extract exactly one file from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are
/// rejected.
pub async fn extract_single_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart body: {}", e)))?
    {
        if field.name().unwrap_or_default() != "file" {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        file = Some(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}
