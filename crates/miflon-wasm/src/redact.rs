//! WASM bindings for region redaction.
//!
//! The effect is passed as a plain object matching the core `EffectSpec`:
//!
//! ```typescript
//! const out = apply_redaction(image, new JsRect(10, 10, 200, 80),
//!   { kind: 'pixelate', strength: 12, feather_radius: 4 }, 'ellipse');
//! ```

use crate::types::{js_error, JsPixelBuffer, JsRect};
use miflon_core::redact::{self, EffectSpec, SelectionShape};
use wasm_bindgen::prelude::*;

fn parse_shape(shape: &str) -> Result<SelectionShape, JsValue> {
    match shape {
        "rectangle" => Ok(SelectionShape::Rectangle),
        "ellipse" | "oval" => Ok(SelectionShape::Ellipse),
        other => Err(JsValue::from_str(&format!("unknown selection shape '{}'", other))),
    }
}

/// Blur or pixelate a region of the image.
///
/// # Errors
///
/// Returns an error for an unknown shape, an effect outside its accepted
/// range, or a region that is degenerate or outside the image. The input
/// image is never modified.
#[wasm_bindgen]
pub fn apply_redaction(
    image: &JsPixelBuffer,
    region: &JsRect,
    effect: JsValue,
    shape: &str,
) -> Result<JsPixelBuffer, JsValue> {
    let effect: EffectSpec = serde_wasm_bindgen::from_value(effect).map_err(js_error)?;
    apply_effect(image, region, effect, parse_shape(shape)?)
}

/// Gaussian blur a region with a hard or feathered edge.
#[wasm_bindgen]
pub fn blur_region(
    image: &JsPixelBuffer,
    region: &JsRect,
    kernel_size: u32,
    feather_radius: u32,
    shape: &str,
) -> Result<JsPixelBuffer, JsValue> {
    apply_effect(
        image,
        region,
        EffectSpec::blur(kernel_size, feather_radius),
        parse_shape(shape)?,
    )
}

/// Pixelate a region with a hard or feathered edge.
#[wasm_bindgen]
pub fn pixelate_region(
    image: &JsPixelBuffer,
    region: &JsRect,
    cell_size: u32,
    feather_radius: u32,
    shape: &str,
) -> Result<JsPixelBuffer, JsValue> {
    apply_effect(
        image,
        region,
        EffectSpec::pixelate(cell_size, feather_radius),
        parse_shape(shape)?,
    )
}

fn apply_effect(
    image: &JsPixelBuffer,
    region: &JsRect,
    effect: EffectSpec,
    shape: SelectionShape,
) -> Result<JsPixelBuffer, JsValue> {
    let buffer = image.to_buffer()?;
    redact::apply_redaction(&buffer, &(*region).into(), &effect, shape)
        .map(JsPixelBuffer::from_buffer)
        .map_err(js_error)
}
