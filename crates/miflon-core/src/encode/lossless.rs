//! PNG and BMP encoding. Neither takes a quality parameter.

use image::codecs::bmp::BmpEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::check_rgb;
use crate::error::{EditError, Result};

/// Encode RGB pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    check_rgb(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EditError::encode(format!("PNG: {}", e)))?;
    Ok(buffer.into_inner())
}

/// Encode RGB pixel data to 24-bit BMP bytes.
pub fn encode_bmp(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    check_rgb(pixels, width, height)?;

    let mut buffer = Vec::new();
    BmpEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EditError::encode(format!("BMP: {}", e)))?;
    Ok(buffer)
}
