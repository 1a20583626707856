//! WASM bindings for canvas layout and pointer mapping.
//!
//! The browser draws the image letterboxed inside its canvas. These bindings
//! compute that layout and map pointer positions and drags back onto image
//! pixels.
//!
//! # Example
//!
//! ```typescript
//! const layout = fit_to_viewport(image.width, image.height, canvas.width, canvas.height);
//! if (layout) {
//!   const rect = selection_rect(layout, downX, downY, upX, upY, image.width, image.height);
//! }
//! ```

use crate::types::JsRect;
use miflon_core::geometry::{self, DisplayLayout, DisplayPoint};
use wasm_bindgen::prelude::*;

/// Where the image is drawn inside the viewport.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsDisplayLayout {
    inner: DisplayLayout,
}

#[wasm_bindgen]
impl JsDisplayLayout {
    #[wasm_bindgen(constructor)]
    pub fn new(origin_x: i32, origin_y: i32, width: u32, height: u32) -> JsDisplayLayout {
        JsDisplayLayout {
            inner: DisplayLayout {
                origin_x,
                origin_y,
                width,
                height,
            },
        }
    }

    #[wasm_bindgen(getter)]
    pub fn origin_x(&self) -> i32 {
        self.inner.origin_x
    }

    #[wasm_bindgen(getter)]
    pub fn origin_y(&self) -> i32 {
        self.inner.origin_y
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }
}

/// Fit an image into the viewport.
///
/// Returns `undefined` while the viewport is still too small to lay out.
#[wasm_bindgen]
pub fn fit_to_viewport(
    image_width: u32,
    image_height: u32,
    viewport_width: u32,
    viewport_height: u32,
) -> Option<JsDisplayLayout> {
    geometry::fit_to_viewport(image_width, image_height, viewport_width, viewport_height)
        .map(|inner| JsDisplayLayout { inner })
}

/// Map a viewport point to `[x, y]` image pixel coordinates.
///
/// Returns `undefined` when the layout is degenerate.
#[wasm_bindgen]
pub fn to_image_space(
    layout: &JsDisplayLayout,
    x: f64,
    y: f64,
    image_width: u32,
    image_height: u32,
) -> Option<Vec<u32>> {
    geometry::to_image_space(
        DisplayPoint::new(x, y),
        &layout.inner,
        image_width,
        image_height,
    )
    .map(|(px, py)| vec![px, py])
}

/// Convert a pointer drag into an image-space rectangle.
///
/// Returns `undefined` when the drag misses the image or has no area.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn selection_rect(
    layout: &JsDisplayLayout,
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    image_width: u32,
    image_height: u32,
) -> Option<JsRect> {
    geometry::selection_rect(
        DisplayPoint::new(start_x, start_y),
        DisplayPoint::new(end_x, end_y),
        &layout.inner,
        image_width,
        image_height,
    )
    .map(JsRect::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_map() {
        let layout = fit_to_viewport(2000, 1000, 1010, 1010).unwrap();
        assert_eq!((layout.width(), layout.height()), (1000, 500));

        let point = to_image_space(&layout, 5.0, 255.0, 2000, 1000).unwrap();
        assert_eq!(point, vec![0, 0]);
    }

    #[test]
    fn test_viewport_not_ready() {
        assert!(fit_to_viewport(100, 100, 5, 5).is_none());
    }

    #[test]
    fn test_selection_rect_any_direction() {
        let layout = JsDisplayLayout::new(10, 10, 50, 50);
        let rect = selection_rect(&layout, 40.0, 40.0, 20.0, 20.0, 100, 100).unwrap();
        assert_eq!(rect, JsRect::new(20, 20, 40, 40));
    }
}
