//! Media conversion pipeline: validation, codec adapters, batch
//! orchestration, and response packaging.

pub mod archive;
pub mod batch;
pub mod image;
pub mod validator;
pub mod video;

pub use archive::{package, Packaged, ERROR_MANIFEST_NAME};
pub use batch::{convert_batch, BatchExhausted, BatchResult, ConversionOutcome};
pub use image::{ImageError, WebpConverter, WebpSettings};
pub use validator::{BatchValidator, UploadedFile, ValidatedBatch, ValidatedFile, ValidationError};
pub use video::{VideoError, VideoTranscoder};
