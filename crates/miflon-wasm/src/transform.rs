//! WASM bindings for crop and resize.
//!
//! Ratios are passed as the same strings the settings use (`"original"`,
//! `"16:9"`); anything else is rejected with an error.

use crate::types::{js_error, JsPixelBuffer, JsRect};
use miflon_core::transform::{self, AspectRatio, CropWindow, ResizeTarget};
use wasm_bindgen::prelude::*;

fn parse_ratio(ratio: &str) -> Result<AspectRatio, JsValue> {
    ratio.parse::<AspectRatio>().map_err(js_error)
}

/// Largest centered rectangle of `ratio` that fits in the image.
#[wasm_bindgen]
pub fn maximal_rect(ratio: &str, image_width: u32, image_height: u32) -> Result<JsRect, JsValue> {
    let ratio = parse_ratio(ratio)?;
    Ok(transform::maximal_rect(ratio, image_width, image_height).into())
}

/// Clamp a crop offset into `[0, max_offset]`.
#[wasm_bindgen]
pub fn clamp_offset(offset: f64, max_offset: u32) -> u32 {
    transform::clamp_offset(offset.round() as i64, max_offset)
}

/// Crop window that the UI drags around the image.
#[wasm_bindgen]
pub struct JsCropWindow {
    inner: CropWindow,
}

#[wasm_bindgen]
impl JsCropWindow {
    /// Create a centered, maximal crop window.
    #[wasm_bindgen(constructor)]
    pub fn new(ratio: &str, image_width: u32, image_height: u32) -> Result<JsCropWindow, JsValue> {
        Ok(JsCropWindow {
            inner: CropWindow::new(parse_ratio(ratio)?, image_width, image_height),
        })
    }

    /// Switch ratio; the window is re-centered. An invalid ratio keeps the
    /// current one.
    pub fn set_ratio(&mut self, ratio: &str) -> Result<(), JsValue> {
        self.inner.set_ratio(parse_ratio(ratio)?);
        Ok(())
    }

    /// Move by a delta in image pixels.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.inner.drag(dx.round() as i64, dy.round() as i64);
    }

    /// Move by a delta measured on a preview scaled by `scale_x`/`scale_y`
    /// image pixels per preview pixel.
    pub fn drag_preview(&mut self, dx: f64, dy: f64, scale_x: f64, scale_y: f64) {
        self.inner.drag_preview(dx, dy, (scale_x, scale_y));
    }

    pub fn rect(&self) -> JsRect {
        self.inner.rect().into()
    }

    /// Crop `image` with the current window.
    pub fn apply(&self, image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
        let buffer = image.to_buffer()?;
        self.inner
            .apply(&buffer)
            .map(JsPixelBuffer::from_buffer)
            .map_err(js_error)
    }
}

/// Crop a pixel rectangle out of an image.
#[wasm_bindgen]
pub fn apply_crop(image: &JsPixelBuffer, rect: &JsRect) -> Result<JsPixelBuffer, JsValue> {
    let buffer = image.to_buffer()?;
    transform::apply_crop(&buffer, &(*rect).into())
        .map(JsPixelBuffer::from_buffer)
        .map_err(js_error)
}

/// Resize an image. Pass only one side to keep the aspect ratio.
#[wasm_bindgen]
pub fn resize(
    image: &JsPixelBuffer,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<JsPixelBuffer, JsValue> {
    let buffer = image.to_buffer()?;
    transform::resize(&buffer, ResizeTarget { width, height })
        .map(JsPixelBuffer::from_buffer)
        .map_err(js_error)
}

/// Preset widths worth offering for an image of `width` pixels, narrowest
/// first. "Original" is implied and not listed.
#[wasm_bindgen]
pub fn preset_widths(width: u32) -> Vec<u32> {
    transform::available_presets(width)
        .into_iter()
        .filter_map(|preset| preset.width())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> JsPixelBuffer {
        let pixels: Vec<u8> = (0..(width * height * 3) as usize)
            .map(|i| (i % 256) as u8)
            .collect();
        JsPixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_maximal_rect_square_on_landscape() {
        let rect = maximal_rect("1:1", 1920, 1080).unwrap();
        assert_eq!(rect, JsRect::new(420, 0, 1080, 1080));
    }

    #[test]
    fn test_clamp_offset() {
        assert_eq!(clamp_offset(-12.0, 840), 0);
        assert_eq!(clamp_offset(900.4, 840), 840);
        assert_eq!(clamp_offset(10.6, 840), 11);
    }

    #[test]
    fn test_crop_window_drag_and_apply() {
        let mut window = JsCropWindow::new("1:1", 40, 20).unwrap();
        assert_eq!(window.rect(), JsRect::new(10, 0, 20, 20));

        window.drag(100.0, 0.0);
        assert_eq!(window.rect(), JsRect::new(20, 0, 20, 20));

        let cropped = window.apply(&test_image(40, 20)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (20, 20));
    }

    #[test]
    fn test_apply_crop_rect() {
        let cropped = apply_crop(&test_image(10, 10), &JsRect::new(2, 2, 5, 4)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (5, 4));
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let resized = resize(&test_image(100, 50), Some(50), None).unwrap();
        assert_eq!((resized.width(), resized.height()), (50, 25));
    }

    #[test]
    fn test_preset_widths() {
        assert_eq!(preset_widths(1000), vec![854]);
        assert_eq!(preset_widths(4000), vec![854, 1280, 1920]);
    }
}
