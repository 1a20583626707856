//! WASM bindings for watermark compositing.
//!
//! The browser has no file system access, so the logo and font are passed in
//! as encoded bytes. The options are a plain object matching the core
//! `WatermarkSpec`; its `logo_path` and `font_path` are ignored here.

use crate::types::{js_error, JsPixelBuffer};
use miflon_core::watermark::{self, WatermarkAssets, WatermarkSpec};
use wasm_bindgen::prelude::*;

/// Output of a watermark pass.
#[wasm_bindgen]
pub struct JsWatermarkResult {
    image: Option<JsPixelBuffer>,
    skipped: Vec<String>,
}

#[wasm_bindgen]
impl JsWatermarkResult {
    /// The watermarked image. Can only be taken once.
    pub fn take_image(&mut self) -> Option<JsPixelBuffer> {
        self.image.take()
    }

    /// Human-readable reasons for overlays that were left out.
    #[wasm_bindgen(getter)]
    pub fn skipped(&self) -> Vec<String> {
        self.skipped.clone()
    }
}

/// Composite a logo and/or text onto the image.
///
/// A logo that fails to decode is skipped and reported, as is text when no
/// font is supplied.
///
/// # Errors
///
/// Returns an error if the options cannot be read or a percentage is out of range.
#[wasm_bindgen]
pub fn apply_watermark(
    image: &JsPixelBuffer,
    spec: JsValue,
    logo: Option<Vec<u8>>,
    font: Option<Vec<u8>>,
) -> Result<JsWatermarkResult, JsValue> {
    let spec: WatermarkSpec = serde_wasm_bindgen::from_value(spec).map_err(js_error)?;
    watermark_with_bytes(image, &spec, logo.as_deref(), font)
}

fn watermark_with_bytes(
    image: &JsPixelBuffer,
    spec: &WatermarkSpec,
    logo: Option<&[u8]>,
    font: Option<Vec<u8>>,
) -> Result<JsWatermarkResult, JsValue> {
    let buffer = image.to_buffer()?;
    let mut skipped = Vec::new();

    let logo = match logo.map(watermark::logo_from_bytes) {
        Some(Ok(logo)) => Some(logo),
        Some(Err(e)) => {
            skipped.push(format!("logo skipped: {}", e));
            None
        }
        None => None,
    };
    let font = match font.map(watermark::font_from_bytes) {
        Some(Ok(font)) => Some(font),
        Some(Err(e)) => {
            skipped.push(format!("font unusable: {}", e));
            None
        }
        None => None,
    };

    let outcome = watermark::apply_watermark_with(&buffer, spec, &WatermarkAssets { logo, font })
        .map_err(js_error)?;
    skipped.extend(outcome.skipped.iter().map(|s| s.to_string()));

    Ok(JsWatermarkResult {
        image: Some(JsPixelBuffer::from_buffer(outcome.image)),
        skipped,
    })
}
