//! Byte fixtures for upload tests.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([180, 60, 60, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([60, 180, 60, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Gif)
        .unwrap();
    buffer
}

/// Bytes that claim to be a JPEG but decode as nothing.
pub fn corrupt_jpeg_bytes() -> Vec<u8> {
    b"renamed text file pretending to be a jpeg".to_vec()
}
