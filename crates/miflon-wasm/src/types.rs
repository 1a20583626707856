//! WASM-compatible wrapper types.
//!
//! This module provides JavaScript-friendly types that wrap the core Miflon
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use std::fmt::Display;

use miflon_core::{PixelBuffer, Rect};
use wasm_bindgen::prelude::*;

/// An RGB image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`. Keep images in WASM memory between
/// edits and only extract pixels when drawing.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    /// Create a new JsPixelBuffer from dimensions and RGB pixel data.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsPixelBuffer {
        JsPixelBuffer {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 3)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {}
}

impl JsPixelBuffer {
    pub(crate) fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            pixels: buffer.pixels,
        }
    }

    /// Convert to a core buffer, validating the pixel length. Clones the data.
    pub(crate) fn to_buffer(&self) -> Result<PixelBuffer, JsValue> {
        PixelBuffer::try_new(self.width, self.height, self.pixels.clone()).map_err(js_error)
    }
}

/// A pixel rectangle.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[wasm_bindgen]
impl JsRect {
    #[wasm_bindgen(constructor)]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> JsRect {
        JsRect {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<Rect> for JsRect {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }
}

impl From<JsRect> for Rect {
    fn from(rect: JsRect) -> Self {
        Rect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Convert any core error into a JavaScript string value.
pub(crate) fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_pixel_buffer_creation() {
        let img = JsPixelBuffer::new(100, 50, vec![0u8; 100 * 50 * 3]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 15000);
    }

    #[test]
    fn test_buffer_roundtrip() {
        let buffer = PixelBuffer::filled(4, 3, [10, 20, 30]);
        let js = JsPixelBuffer::from_buffer(buffer.clone());
        assert_eq!(js.pixels(), buffer.pixels);
        assert_eq!(js.to_buffer().unwrap(), buffer);
    }

    #[test]
    fn test_rect_conversion() {
        let rect = Rect::new(1, 2, 3, 4);
        let js: JsRect = rect.into();
        assert_eq!(Rect::from(js), rect);
    }
}
