//! Ratio-constrained cropping with a draggable crop window.
//!
//! The crop window is the largest rectangle of the chosen ratio that fits in
//! the image. The user slides it around by dragging; every drag delta is
//! accumulated and re-clamped so the window never leaves the image.
//!
//! # Example
//!
//! ```ignore
//! let mut window = CropWindow::new("1:1".parse()?, 1920, 1080);
//! assert_eq!(window.rect(), Rect::new(420, 0, 1080, 1080));
//! window.drag(-1000, 0);
//! assert_eq!(window.rect().x, 0);
//! ```

use serde::{Deserialize, Serialize};

use super::ratio::{clamp_offset, crop_size, AspectRatio};
use crate::buffer::{PixelBuffer, Rect};
use crate::error::Result;

/// Crop a pixel rectangle out of an image.
///
/// # Errors
///
/// Returns `DegenerateRegion` or `RegionOutOfBounds` when `rect` is not a
/// valid region of `image`.
pub fn apply_crop(image: &PixelBuffer, rect: &Rect) -> Result<PixelBuffer> {
    // Fast path: full crop returns a clone
    if *rect == image.bounds() {
        return Ok(image.clone());
    }
    image.extract(rect)
}

/// Crop window state for one image and one ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    ratio: AspectRatio,
    image_width: u32,
    image_height: u32,
    offset_x: u32,
    offset_y: u32,
}

impl CropWindow {
    /// Create a window with the maximal crop for `ratio`, centered.
    pub fn new(ratio: AspectRatio, image_width: u32, image_height: u32) -> Self {
        let mut window = Self {
            ratio,
            image_width,
            image_height,
            offset_x: 0,
            offset_y: 0,
        };
        window.recenter();
        window
    }

    pub fn ratio(&self) -> AspectRatio {
        self.ratio
    }

    /// Switch to a different ratio. The window is re-centered.
    pub fn set_ratio(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
        self.recenter();
    }

    /// Track a new image size (for example after an edit changed it).
    pub fn resize_image(&mut self, image_width: u32, image_height: u32) {
        self.image_width = image_width;
        self.image_height = image_height;
        self.recenter();
    }

    /// Largest allowed offset on each axis.
    pub fn max_offset(&self) -> (u32, u32) {
        let (w, h) = crop_size(self.ratio, self.image_width, self.image_height);
        (self.image_width - w, self.image_height - h)
    }

    /// Current offset of the window's top-left corner.
    pub fn offset(&self) -> (u32, u32) {
        (self.offset_x, self.offset_y)
    }

    /// Move the window by a delta in image pixels.
    ///
    /// `Original` has nothing to move and ignores drags.
    pub fn drag(&mut self, dx: i64, dy: i64) {
        if self.ratio.is_original() {
            return;
        }
        let (max_x, max_y) = self.max_offset();
        self.offset_x = clamp_offset(self.offset_x as i64 + dx, max_x);
        self.offset_y = clamp_offset(self.offset_y as i64 + dy, max_y);
    }

    /// Move the window by a delta measured on a scaled preview.
    ///
    /// `scale` is image pixels per preview pixel on each axis.
    pub fn drag_preview(&mut self, dx: f64, dy: f64, scale: (f64, f64)) {
        self.drag(
            (dx * scale.0).round() as i64,
            (dy * scale.1).round() as i64,
        );
    }

    /// The crop rectangle in image pixels.
    pub fn rect(&self) -> Rect {
        let (w, h) = crop_size(self.ratio, self.image_width, self.image_height);
        Rect::new(self.offset_x, self.offset_y, w, h)
    }

    /// Crop `image` with this window.
    pub fn apply(&self, image: &PixelBuffer) -> Result<PixelBuffer> {
        apply_crop(image, &self.rect())
    }

    fn recenter(&mut self) {
        let (max_x, max_y) = self.max_offset();
        self.offset_x = max_x / 2;
        self.offset_y = max_y / 2;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
