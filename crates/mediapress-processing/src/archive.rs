//! Response packaging: a raw WebP stream for a lone success, otherwise a
//! deflate-compressed zip carrying every successful output plus an error
//! manifest for the files that failed.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::batch::{BatchResult, ConversionOutcome};

/// Archive entry listing the files that could not be converted.
pub const ERROR_MANIFEST_NAME: &str = "conversion_errors.txt";

/// Deflate level inside the archive; outputs are already compressed, so this
/// is a size/CPU tradeoff rather than a correctness knob.
const ARCHIVE_COMPRESSION_LEVEL: i32 = 6;

/// Packaged response body.
#[derive(Debug)]
pub enum Packaged {
    /// Exactly one success and zero failures: the raw WebP bytes.
    Single { filename: String, bytes: Vec<u8> },
    /// Everything else: a zip of successes plus the error manifest.
    Archive { bytes: Vec<u8> },
}

/// Sanitize a filename for use as an archive entry (strips path components
/// like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Package a batch result for the response.
///
/// Entry names are not deduplicated: two inputs mapping to the same output
/// name are both written, and the later entry wins on extraction.
pub fn package(result: BatchResult) -> Result<Packaged> {
    let failures = result.failure_messages();

    // The single/archive branch is decided by shape, not by content: one
    // success with no failures streams directly.
    if result.outcomes.len() == 1 && failures.is_empty() {
        if let Some(ConversionOutcome::Success {
            output_filename,
            bytes,
        }) = result.outcomes.into_iter().next()
        {
            return Ok(Packaged::Single {
                filename: output_filename,
                bytes,
            });
        }
        unreachable!("single outcome with no failures must be a success");
    }

    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(ARCHIVE_COMPRESSION_LEVEL))
            .unix_permissions(0o644);

        for (index, outcome) in result.outcomes.iter().enumerate() {
            if let ConversionOutcome::Success {
                output_filename,
                bytes,
            } = outcome
            {
                let safe_filename =
                    sanitize_archive_filename(output_filename, &format!("converted_{index}.webp"));
                zip.start_file(&safe_filename, options)
                    .with_context(|| format!("Failed to add file to zip: {}", safe_filename))?;
                zip.write_all(bytes)
                    .with_context(|| format!("Failed to write zip entry: {}", safe_filename))?;
            }
        }

        if !failures.is_empty() {
            zip.start_file(ERROR_MANIFEST_NAME, options)
                .context("Failed to add error manifest to zip")?;
            let mut manifest = String::from("FILES THAT COULD NOT BE CONVERTED:\n\n");
            for failure in &failures {
                manifest.push_str(failure);
                manifest.push('\n');
            }
            zip.write_all(manifest.as_bytes())
                .context("Failed to write error manifest")?;
        }

        zip.finish().context("Failed to finalize zip archive")?;
    }

    Ok(Packaged::Archive { bytes: buffer })
}
