//! WebP re-encoding adapter around the `image` and `webp` crates.

use bytes::Bytes;
use image::{imageops::FilterType, DynamicImage, ImageReader, Limits, Rgb, RgbImage};
use img_parts::{jpeg::Jpeg, png::Png, webp::WebP, ImageEXIF};
use std::io::Cursor;

/// Decoder guard rails. Images whose claimed dimensions would require more
/// than this are rejected before allocation instead of decoded.
const MAX_DECODE_DIMENSION: u32 = 16_384;
const MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("empty image payload")]
    EmptyInput,

    #[error("unrecognized image format")]
    Unrecognized,

    #[error("image dimensions exceed decode limits")]
    DecompressionBomb,

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("webp encode failed: {0}")]
    Encode(String),
}

/// Conversion behavior that does not vary per request.
#[derive(Debug, Clone)]
pub struct WebpSettings {
    /// libwebp effort setting, 0 (fast) to 6 (slowest/best).
    pub method: u8,
    /// Carry the source's EXIF bytes into the output.
    pub preserve_metadata: bool,
    /// Rotate/flip according to the EXIF orientation tag.
    pub auto_orient: bool,
    /// Downscale so neither dimension exceeds this bound.
    pub max_dimension: Option<u32>,
}

impl Default for WebpSettings {
    fn default() -> Self {
        Self {
            method: 6,
            preserve_metadata: true,
            auto_orient: true,
            max_dimension: None,
        }
    }
}

/// Re-encodes arbitrary raster input as lossy WebP.
pub struct WebpConverter {
    settings: WebpSettings,
}

impl WebpConverter {
    pub fn new(settings: WebpSettings) -> Self {
        Self { settings }
    }

    /// Convert `data` to WebP at the given quality (0-100).
    ///
    /// Transparency is composited onto an opaque white background; the lossy
    /// output path has no alpha channel. All decode and encode failures come
    /// back as [`ImageError`].
    pub fn convert(&self, data: &[u8], quality: u8) -> Result<Vec<u8>, ImageError> {
        if data.is_empty() {
            return Err(ImageError::EmptyInput);
        }

        let mut img = self.decode(data)?;

        if self.settings.auto_orient {
            img = super::apply_orientation(img, data);
        }

        // Captured from the raw input so the original EXIF survives the
        // transforms below.
        let exif = if self.settings.preserve_metadata {
            capture_exif(data)
        } else {
            None
        };

        if let Some(max) = self.settings.max_dimension {
            let (width, height) = (img.width(), img.height());
            if width > max || height > max {
                tracing::debug!(width, height, max, "Downscaling oversized image");
                img = img.resize(max, max, FilterType::Lanczos3);
            }
        }

        let rgb = flatten_onto_white(img);
        let encoded = self.encode(&rgb, quality)?;

        Ok(match exif {
            Some(exif) => attach_exif(encoded, exif),
            None => encoded,
        })
    }

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, ImageError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        if reader.format().is_none() {
            return Err(ImageError::Unrecognized);
        }

        let mut reader = reader;
        let mut limits = Limits::default();
        limits.max_image_width = Some(MAX_DECODE_DIMENSION);
        limits.max_image_height = Some(MAX_DECODE_DIMENSION);
        limits.max_alloc = Some(MAX_DECODE_ALLOC);
        reader.limits(limits);

        reader.decode().map_err(|e| match e {
            image::ImageError::Limits(_) => ImageError::DecompressionBomb,
            image::ImageError::Unsupported(_) => ImageError::Unrecognized,
            other => ImageError::Decode(other.to_string()),
        })
    }

    fn encode(&self, rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
        let (width, height) = rgb.dimensions();
        let encoder = webp::Encoder::from_rgb(rgb.as_raw(), width, height);

        let mut config = webp::WebPConfig::new()
            .map_err(|_| ImageError::Encode("failed to initialize encoder config".into()))?;
        config.lossless = 0;
        config.quality = quality as f32;
        config.method = self.settings.method as i32;

        let memory = encoder
            .encode_advanced(&config)
            .map_err(|e| ImageError::Encode(format!("{e:?}")))?;
        Ok(memory.to_vec())
    }
}

/// Composite transparent pixels onto an opaque white background and drop the
/// alpha channel. Non-RGB modes (grayscale, palette) come out as plain RGB.
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        rgb.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    rgb
}

/// Pull the EXIF segment out of JPEG or PNG input. Failures are non-fatal;
/// the conversion simply proceeds without metadata.
fn capture_exif(data: &[u8]) -> Option<Bytes> {
    if let Ok(jpeg) = Jpeg::from_bytes(data.to_vec().into()) {
        return jpeg.exif();
    }
    if let Ok(png) = Png::from_bytes(data.to_vec().into()) {
        return png.exif();
    }
    None
}

/// Reattach captured EXIF to the encoded WebP. Falls back to the bare
/// encoding when the container rewrite fails.
fn attach_exif(encoded: Vec<u8>, exif: Bytes) -> Vec<u8> {
    let bytes = Bytes::from(encoded);
    match WebP::from_bytes(bytes.clone()) {
        Ok(mut webp) => {
            webp.set_exif(Some(exif));
            webp.encoder().bytes().to_vec()
        }
        Err(_) => bytes.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn converter() -> WebpConverter {
        WebpConverter::new(WebpSettings::default())
    }

    #[test]
    fn test_rejects_empty_input() {
        let result = converter().convert(&[], 80);
        assert!(matches!(result, Err(ImageError::EmptyInput)));
    }

    #[test]
    fn test_rejects_unrecognized_bytes() {
        let result = converter().convert(b"definitely not an image", 80);
        assert!(matches!(result, Err(ImageError::Unrecognized)));
    }

    #[test]
    fn test_output_is_webp() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([200, 40, 40, 255]));
        let out = converter().convert(&png_bytes(&img), 80).unwrap();
        // RIFF....WEBP container magic.
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");
    }

    #[test]
    fn test_roundtrip_preserves_dimensions() {
        let img = RgbaImage::from_pixel(97, 41, Rgba([10, 200, 30, 255]));
        let out = converter().convert(&png_bytes(&img), 100).unwrap();

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (97, 41));
    }

    #[test]
    fn test_transparency_becomes_white() {
        // Fully transparent pixels must come out white, not black.
        let img = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 0]));
        let out = converter().convert(&png_bytes(&img), 100).unwrap();

        let decoded = image::load_from_memory(&out).unwrap().to_rgb8();
        let pixel = decoded.get_pixel(8, 8);
        for channel in 0..3 {
            assert!(pixel[channel] > 245, "expected near-white, got {pixel:?}");
        }
    }

    #[test]
    fn test_max_dimension_downscales_preserving_aspect() {
        let img = RgbaImage::from_pixel(400, 200, Rgba([0, 0, 255, 255]));
        let converter = WebpConverter::new(WebpSettings {
            max_dimension: Some(100),
            ..WebpSettings::default()
        });
        let out = converter.convert(&png_bytes(&img), 80).unwrap();

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let img = RgbaImage::from_pixel(20, 10, Rgba([0, 0, 255, 255]));
        let converter = WebpConverter::new(WebpSettings {
            max_dimension: Some(100),
            ..WebpSettings::default()
        });
        let out = converter.convert(&png_bytes(&img), 80).unwrap();

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[test]
    fn test_flatten_keeps_opaque_colors() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([12, 34, 56, 255])));
        let rgb = flatten_onto_white(img);
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([12, 34, 56]));
    }

    #[test]
    fn test_flatten_blends_partial_alpha() {
        // 50% black over white lands mid-gray.
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let rgb = flatten_onto_white(img);
        let pixel = rgb.get_pixel(0, 0);
        for channel in 0..3 {
            assert!((120..=135).contains(&pixel[channel]), "got {pixel:?}");
        }
    }
}
