//! Image encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_image } from '@miflon/wasm';
//!
//! const bytes = encode_image(image, 'JPG', 95);
//! const blob = new Blob([bytes], { type: 'image/jpeg' });
//! ```

use crate::types::{js_error, JsPixelBuffer};
use miflon_core::encode::{self, ExportFormat};
use wasm_bindgen::prelude::*;

/// Encode an image as `"JPG"`, `"PNG"` or `"BMP"`.
///
/// `quality` (1-100) is used for JPG only.
///
/// # Errors
///
/// Returns an error for an unknown format or malformed pixel data.
#[wasm_bindgen]
pub fn encode_image(image: &JsPixelBuffer, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let format: ExportFormat = format.parse().map_err(js_error)?;
    let buffer = image.to_buffer()?;
    encode::encode(&buffer, format, quality).map_err(js_error)
}

/// Encode raw RGB pixel data to JPEG bytes.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(js_error)
}

/// File extension (without the dot) for a format name, e.g. `"jpg"`.
#[wasm_bindgen]
pub fn format_extension(format: &str) -> Result<String, JsValue> {
    let format: ExportFormat = format.parse().map_err(js_error)?;
    Ok(format.extension().to_string())
}


/// WASM-specific tests that require JsValue.
///
/// These tests use functions that return `Result<T, JsValue>` on error paths
/// and can only run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_unknown_format_is_error() {
        let image = JsPixelBuffer::new(2, 2, vec![0u8; 12]);
        assert!(encode_image(&image, "GIF", 90).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let pixels = vec![128u8; 50 * 50 * 3];
        assert!(encode_jpeg(&pixels, 100, 100, 90).is_err());
    }
}
