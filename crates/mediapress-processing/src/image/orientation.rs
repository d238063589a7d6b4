//! EXIF orientation handling (rotation and flipping).

use image::{imageops, DynamicImage};
use std::io::Cursor;

/// Read the EXIF orientation tag from raw image bytes.
///
/// Returns the orientation value (1-8), or 1 (normal) when the image carries
/// no EXIF segment or the tag is absent. Read failures are treated as
/// "normal"; orientation correction is best-effort.
pub fn read_exif_orientation(data: &[u8]) -> u8 {
    let mut cursor = Cursor::new(data);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(meta) => meta
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(|v| v as u8)
            .unwrap_or(1),
        Err(_) => 1,
    }
}

/// Rotation and flip operations needed for a given EXIF orientation.
/// Returns (rotate_angle, flip_horizontal, flip_vertical).
pub fn orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
    match orientation {
        1 => (None, false, false),      // Normal
        2 => (None, true, false),       // Mirror horizontal
        3 => (Some(180), false, false), // Rotate 180
        4 => (None, false, true),       // Mirror vertical
        5 => (Some(270), true, false),  // Mirror horizontal + Rotate 270 CW
        6 => (Some(90), false, false),  // Rotate 90 CW
        7 => (Some(90), true, false),   // Mirror horizontal + Rotate 90 CW
        8 => (Some(270), false, false), // Rotate 270 CW
        _ => (None, false, false),      // Invalid, treat as normal
    }
}

/// Apply EXIF orientation correction so the image is stored upright.
pub fn apply_orientation(mut img: DynamicImage, data: &[u8]) -> DynamicImage {
    let orientation = read_exif_orientation(data);
    let (rotate, flip_h, flip_v) = orientation_transforms(orientation);

    if orientation != 1 {
        tracing::debug!(
            orientation,
            rotate = ?rotate,
            flip_horizontal = flip_h,
            flip_vertical = flip_v,
            "Applying EXIF orientation"
        );
    }

    img = match rotate {
        Some(90) => DynamicImage::ImageRgba8(imageops::rotate90(&img.to_rgba8())),
        Some(180) => DynamicImage::ImageRgba8(imageops::rotate180(&img.to_rgba8())),
        Some(270) => DynamicImage::ImageRgba8(imageops::rotate270(&img.to_rgba8())),
        _ => img,
    };

    if flip_h {
        img = DynamicImage::ImageRgba8(imageops::flip_horizontal(&img.to_rgba8()));
    }
    if flip_v {
        img = DynamicImage::ImageRgba8(imageops::flip_vertical(&img.to_rgba8()));
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn test_orientation_transforms_table() {
        assert_eq!(orientation_transforms(1), (None, false, false));
        assert_eq!(orientation_transforms(2), (None, true, false));
        assert_eq!(orientation_transforms(3), (Some(180), false, false));
        assert_eq!(orientation_transforms(4), (None, false, true));
        assert_eq!(orientation_transforms(5), (Some(270), true, false));
        assert_eq!(orientation_transforms(6), (Some(90), false, false));
        assert_eq!(orientation_transforms(7), (Some(90), true, false));
        assert_eq!(orientation_transforms(8), (Some(270), false, false));
    }

    #[test]
    fn test_orientation_transforms_invalid_is_normal() {
        for orientation in [0u8, 9, 255] {
            assert_eq!(orientation_transforms(orientation), (None, false, false));
        }
    }

    #[test]
    fn test_read_orientation_without_exif() {
        // PNG without EXIF reads as normal.
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let mut buffer = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .unwrap();
        assert_eq!(read_exif_orientation(&buffer), 1);
    }

    #[test]
    fn test_apply_orientation_no_exif_is_identity() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, Rgba([0, 255, 0, 255])));
        let oriented = apply_orientation(img.clone(), b"");
        assert_eq!(oriented.dimensions(), img.dimensions());
    }
}
