//! Batch conversion orchestrator.
//!
//! Folds over a validated file set invoking the image adapter once per file.
//! A failing file is captured as a tagged outcome and never aborts the rest
//! of the batch.

use std::path::Path;

use crate::image::WebpConverter;
use crate::validator::ValidatedBatch;

/// Per-file result. Outcomes keep the input order.
#[derive(Debug)]
pub enum ConversionOutcome {
    Success {
        output_filename: String,
        bytes: Vec<u8>,
    },
    Failure {
        original_filename: String,
        error: String,
    },
}

/// Result of converting one batch.
#[derive(Debug)]
pub struct BatchResult {
    pub outcomes: Vec<ConversionOutcome>,
    pub total_input_bytes: u64,
}

impl BatchResult {
    pub fn converted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ConversionOutcome::Success { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    /// Failure messages in the order the files were processed.
    pub fn failure_messages(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ConversionOutcome::Failure {
                    original_filename,
                    error,
                } => Some(format!("{}: {}", original_filename, error)),
                _ => None,
            })
            .collect()
    }
}

/// Every file in the batch failed. Returning an empty successful response
/// would misrepresent the outcome, so the batch as a whole errors instead.
#[derive(Debug, thiserror::Error)]
#[error("no files could be converted: {0}")]
pub struct BatchExhausted(pub String);

/// Replace the input's extension with `.webp`, keeping the stem.
pub fn webp_output_filename(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("converted");
    format!("{}.webp", stem)
}

/// Convert every file in the batch, isolating per-file failures.
pub fn convert_batch(
    converter: &WebpConverter,
    batch: ValidatedBatch,
    quality: u8,
) -> Result<BatchResult, BatchExhausted> {
    let total_input_bytes = batch.total_bytes;
    let mut outcomes = Vec::with_capacity(batch.files.len());

    for file in batch.files {
        match converter.convert(&file.data, quality) {
            Ok(bytes) => {
                let output_filename = webp_output_filename(&file.filename);
                tracing::info!(
                    input = %file.filename,
                    output = %output_filename,
                    input_bytes = file.data.len(),
                    output_bytes = bytes.len(),
                    "Converted image"
                );
                outcomes.push(ConversionOutcome::Success {
                    output_filename,
                    bytes,
                });
            }
            Err(err) => {
                tracing::warn!(input = %file.filename, error = %err, "Image conversion failed");
                outcomes.push(ConversionOutcome::Failure {
                    original_filename: file.filename,
                    error: err.to_string(),
                });
            }
        }
    }

    let result = BatchResult {
        outcomes,
        total_input_bytes,
    };

    if result.converted() == 0 {
        return Err(BatchExhausted(result.failure_messages().join("; ")));
    }

    Ok(result)
}
