//! Image decoding with EXIF orientation handling.

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

use super::orientation::{extract_orientation, Orientation};
use crate::error::{EditError, Result};
use crate::PixelBuffer;

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// The format is sniffed from the content; JPEG, PNG and BMP are supported.
///
/// # Errors
///
/// Returns `EditError::Decode` if the bytes are not a supported or intact image.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
    let orientation = extract_orientation(bytes);
    decode_with(bytes, orientation)
}

/// Decode an image from bytes without applying EXIF orientation.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<PixelBuffer> {
    decode_with(bytes, Orientation::Normal)
}

/// Read and decode an image file.
///
/// # Errors
///
/// Returns `EditError::ResourceUnavailable` if the file cannot be read and
/// `EditError::Decode` if its contents are not a supported image.
pub fn load_image(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| EditError::resource(format!("{}: {}", path.display(), e)))?;
    let image = decode_image(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        "Loaded image"
    );
    Ok(image)
}

/// Extract the EXIF orientation value from encoded bytes (for external use).
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn decode_with(bytes: &[u8], orientation: Orientation) -> Result<PixelBuffer> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EditError::Decode(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| EditError::Decode(e.to_string()))?;

    let rgb = orientation.apply(img).into_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(EditError::Decode("image has no pixels".to_string()));
    }
    Ok(PixelBuffer::from_rgb_image(rgb))
}
