//! Image codec adapter: decode, orient, resize, normalize, encode to WebP.

mod converter;
mod orientation;

pub use converter::{ImageError, WebpConverter, WebpSettings};
pub use orientation::{apply_orientation, orientation_transforms, read_exif_orientation};
