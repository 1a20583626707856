//! Miflon WASM - WebAssembly bindings for Miflon
//!
//! This crate exposes the miflon-core editing engine to a browser UI.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data and rectangles
//! - `decode` - Decoding JPEG/PNG/BMP bytes
//! - `geometry` - Canvas layout and pointer-to-pixel mapping
//! - `transform` - Crop window, crop and resize
//! - `redact` - Blur and pixelate redaction
//! - `watermark` - Logo and text overlays from in-memory assets
//! - `encode` - Export encoding
//! - `naming` - Output file names from templates
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, blur_region, JsRect } from '@miflon/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const redacted = blur_region(image, new JsRect(40, 40, 120, 60), 19, 0, 'ellipse');
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod geometry;
mod naming;
mod redact;
mod transform;
mod types;
mod watermark;

pub use decode::{decode_image, get_orientation};
pub use encode::{encode_image, encode_jpeg, format_extension};
pub use geometry::{fit_to_viewport, selection_rect, to_image_space, JsDisplayLayout};
pub use naming::{render_filename, render_filename_now, sanitize_filename};
pub use redact::{apply_redaction, blur_region, pixelate_region};
pub use transform::{apply_crop, clamp_offset, maximal_rect, preset_widths, resize, JsCropWindow};
pub use types::{JsPixelBuffer, JsRect};
pub use watermark::{apply_watermark, JsWatermarkResult};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
