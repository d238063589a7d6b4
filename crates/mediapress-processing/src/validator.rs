//! Batch request validation.
//!
//! Checks a set of uploaded files against count, type, and size limits
//! before any conversion work begins. Validation only inspects metadata and
//! byte lengths; it never invokes a codec.

use bytes::Bytes;

/// A file as received from the request, before any checks.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A file that passed the per-file checks. Consumed by the batch
/// orchestrator; never re-validated.
#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// The full validated request.
#[derive(Debug)]
pub struct ValidatedBatch {
    pub files: Vec<ValidatedFile>,
    pub total_bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no files provided")]
    NoFiles,

    #[error("too many files: {count} (max {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("quality out of range: {quality} (allowed {min}-{max})")]
    QualityOutOfRange { quality: u8, min: u8, max: u8 },

    #[error("empty file: {0}")]
    EmptyFile(String),

    #[error("unsupported type: {filename} ({content_type})")]
    UnsupportedType {
        filename: String,
        content_type: String,
    },

    #[error("file too large: {filename} ({size} bytes, max {max})")]
    FileTooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("aggregate size exceeded: {total} bytes (max {max})")]
    TotalSizeExceeded { total: u64, max: usize },
}

/// Normalize a MIME type by stripping parameters
/// (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Validates one conversion request as a set.
pub struct BatchValidator {
    max_files: usize,
    max_file_size: usize,
    max_total_size: usize,
    allowed_content_types: Vec<String>,
    quality_range: (u8, u8),
}

impl BatchValidator {
    pub fn new(
        max_files: usize,
        max_file_size: usize,
        max_total_size: usize,
        allowed_content_types: Vec<String>,
        quality_range: (u8, u8),
    ) -> Self {
        Self {
            max_files,
            max_file_size,
            max_total_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
            quality_range,
        }
    }

    /// Validate the request. Count and quality fail fast; per-file rules
    /// report the offending filename; the aggregate size is checked once all
    /// per-file sizes are known.
    pub fn validate(
        &self,
        files: Vec<UploadedFile>,
        quality: Option<u8>,
    ) -> Result<ValidatedBatch, ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        if files.len() > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count: files.len(),
                max: self.max_files,
            });
        }

        let (min_q, max_q) = self.quality_range;
        if let Some(q) = quality {
            if !(min_q..=max_q).contains(&q) {
                return Err(ValidationError::QualityOutOfRange {
                    quality: q,
                    min: min_q,
                    max: max_q,
                });
            }
        }

        let mut total_bytes: u64 = 0;
        let mut validated = Vec::with_capacity(files.len());

        for file in files {
            if file.data.is_empty() {
                return Err(ValidationError::EmptyFile(file.filename));
            }

            let normalized = normalize_mime_type(&file.content_type);
            if !self.allowed_content_types.contains(&normalized) {
                return Err(ValidationError::UnsupportedType {
                    filename: file.filename,
                    content_type: file.content_type,
                });
            }

            let size = file.data.len();
            if size > self.max_file_size {
                return Err(ValidationError::FileTooLarge {
                    filename: file.filename,
                    size,
                    max: self.max_file_size,
                });
            }

            total_bytes += size as u64;
            validated.push(ValidatedFile {
                filename: file.filename,
                content_type: file.content_type,
                data: file.data,
            });
        }

        if total_bytes > self.max_total_size as u64 {
            return Err(ValidationError::TotalSizeExceeded {
                total: total_bytes,
                max: self.max_total_size,
            });
        }

        Ok(ValidatedBatch {
            files: validated,
            total_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> BatchValidator {
        BatchValidator::new(
            3,
            1024,
            2048,
            vec!["image/jpeg".to_string(), "image/png".to_string()],
            (60, 100),
        )
    }

    fn file(name: &str, content_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn test_rejects_empty_batch() {
        let result = test_validator().validate(vec![], None);
        assert!(matches!(result, Err(ValidationError::NoFiles)));
    }

    #[test]
    fn test_rejects_too_many_files() {
        let files = (0..4).map(|i| file(&format!("{i}.png"), "image/png", 10)).collect();
        let result = test_validator().validate(files, None);
        assert!(matches!(
            result,
            Err(ValidationError::TooManyFiles { count: 4, max: 3 })
        ));
    }

    #[test]
    fn test_rejects_quality_out_of_range() {
        let files = vec![file("a.png", "image/png", 10)];
        let result = test_validator().validate(files, Some(42));
        assert!(matches!(
            result,
            Err(ValidationError::QualityOutOfRange { quality: 42, .. })
        ));
    }

    #[test]
    fn test_accepts_quality_bounds() {
        for q in [60, 100] {
            let files = vec![file("a.png", "image/png", 10)];
            assert!(test_validator().validate(files, Some(q)).is_ok());
        }
    }

    #[test]
    fn test_rejects_empty_file_by_name() {
        let files = vec![file("good.png", "image/png", 10), file("bad.png", "image/png", 0)];
        match test_validator().validate(files, None) {
            Err(ValidationError::EmptyFile(name)) => assert_eq!(name, "bad.png"),
            other => panic!("expected EmptyFile, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unsupported_type_by_name() {
        let files = vec![file("doc.pdf", "application/pdf", 10)];
        match test_validator().validate(files, None) {
            Err(ValidationError::UnsupportedType { filename, .. }) => {
                assert_eq!(filename, "doc.pdf")
            }
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn test_content_type_parameters_and_case_are_ignored() {
        let files = vec![file("a.jpg", "IMAGE/JPEG; charset=utf-8", 10)];
        assert!(test_validator().validate(files, None).is_ok());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let files = vec![file("big.png", "image/png", 1025)];
        assert!(matches!(
            test_validator().validate(files, None),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_aggregate() {
        // Each file fits individually but the sum is over the cap.
        let files = vec![
            file("a.png", "image/png", 1000),
            file("b.png", "image/png", 1000),
            file("c.png", "image/png", 1000),
        ];
        assert!(matches!(
            test_validator().validate(files, None),
            Err(ValidationError::TotalSizeExceeded { .. })
        ));
    }

    #[test]
    fn test_valid_batch_reports_total() {
        let files = vec![
            file("a.png", "image/png", 100),
            file("b.jpg", "image/jpeg", 200),
        ];
        let batch = test_validator().validate(files, Some(80)).unwrap();
        assert_eq!(batch.files.len(), 2);
        assert_eq!(batch.total_bytes, 300);
    }
}
