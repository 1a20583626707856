//! Display-space to image-space coordinate mapping.
//!
//! The editing canvas shows the image letterboxed inside a viewport: the image
//! is scaled to fill the limiting dimension (minus a fixed margin), the other
//! dimension follows from the aspect ratio, and the result is centered.
//! Pointer positions arrive in viewport coordinates and must be mapped back
//! onto source pixels before any edit is applied.
//!
//! # Coordinate System
//!
//! - Viewport and display coordinates are `f64`, origin at the viewport's top-left
//! - Image coordinates are integer pixels, origin at the image's top-left
//! - Mapping rounds each axis to the nearest pixel independently

use serde::{Deserialize, Serialize};

use crate::buffer::Rect;

/// Total margin (in viewport pixels) left around the fitted image.
pub const VIEWPORT_MARGIN: u32 = 10;

/// Viewports smaller than this on either axis are not laid out yet.
pub const MIN_VIEWPORT_EDGE: u32 = VIEWPORT_MARGIN + 2;

/// Displayed images smaller than this on either axis cannot be mapped.
pub const MIN_DISPLAY_EDGE: u32 = 2;

/// A pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where the image was drawn inside the viewport, and at what size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayLayout {
    /// Left edge of the displayed image in viewport coordinates.
    pub origin_x: i32,
    /// Top edge of the displayed image in viewport coordinates.
    pub origin_y: i32,
    /// Displayed image width.
    pub width: u32,
    /// Displayed image height.
    pub height: u32,
}

impl DisplayLayout {
    /// Image pixels per display pixel on each axis.
    ///
    /// Returns `None` when the displayed image is too small to map.
    pub fn scale_to_image(&self, image_width: u32, image_height: u32) -> Option<(f64, f64)> {
        if self.width < MIN_DISPLAY_EDGE || self.height < MIN_DISPLAY_EDGE {
            return None;
        }
        Some((
            image_width as f64 / self.width as f64,
            image_height as f64 / self.height as f64,
        ))
    }
}

/// Fit an image into a viewport while preserving its aspect ratio.
///
/// Returns `None` ("not ready") when the viewport is below
/// [`MIN_VIEWPORT_EDGE`] on either axis or the image has no pixels; this is the
/// normal state while a window is still being laid out.
pub fn fit_to_viewport(
    image_width: u32,
    image_height: u32,
    viewport_width: u32,
    viewport_height: u32,
) -> Option<DisplayLayout> {
    if viewport_width < MIN_VIEWPORT_EDGE || viewport_height < MIN_VIEWPORT_EDGE {
        return None;
    }
    if image_width == 0 || image_height == 0 {
        return None;
    }

    let image_ratio = image_width as f64 / image_height as f64;
    let viewport_ratio = viewport_width as f64 / viewport_height as f64;

    let (width, height) = if image_ratio > viewport_ratio {
        // Width is the limiting dimension
        let width = viewport_width - VIEWPORT_MARGIN;
        let height = (width as f64 / image_ratio).round() as u32;
        (width, height.clamp(1, viewport_height - VIEWPORT_MARGIN))
    } else {
        let height = viewport_height - VIEWPORT_MARGIN;
        let width = (height as f64 * image_ratio).round() as u32;
        (width.clamp(1, viewport_width - VIEWPORT_MARGIN), height)
    };

    Some(DisplayLayout {
        origin_x: ((viewport_width - width) / 2) as i32,
        origin_y: ((viewport_height - height) / 2) as i32,
        width,
        height,
    })
}

/// Map a viewport point onto a source pixel.
///
/// `image = (display - origin) * (image_size / display_size)`, rounded to the
/// nearest integer per axis and clamped to `[0, image_size)`. Points outside the
/// displayed image clamp to the nearest edge pixel.
///
/// Returns `None` when the layout is degenerate.
pub fn to_image_space(
    point: DisplayPoint,
    layout: &DisplayLayout,
    image_width: u32,
    image_height: u32,
) -> Option<(u32, u32)> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    let (sx, sy) = layout.scale_to_image(image_width, image_height)?;

    let x = ((point.x - layout.origin_x as f64) * sx).round();
    let y = ((point.y - layout.origin_y as f64) * sy).round();

    Some((
        x.clamp(0.0, (image_width - 1) as f64) as u32,
        y.clamp(0.0, (image_height - 1) as f64) as u32,
    ))
}

/// Convert a drag between two viewport points into an image-space rectangle.
///
/// The drag may go in any direction. It is first clipped to the displayed
/// image, then each edge is scaled and rounded independently. Returns `None`
/// when the layout is degenerate or the clipped selection has no area.
pub fn selection_rect(
    start: DisplayPoint,
    end: DisplayPoint,
    layout: &DisplayLayout,
    image_width: u32,
    image_height: u32,
) -> Option<Rect> {
    let (sx, sy) = layout.scale_to_image(image_width, image_height)?;

    let clip = |v: f64, origin: i32, extent: u32| (v - origin as f64).clamp(0.0, extent as f64);
    let x1 = clip(start.x.min(end.x), layout.origin_x, layout.width);
    let x2 = clip(start.x.max(end.x), layout.origin_x, layout.width);
    let y1 = clip(start.y.min(end.y), layout.origin_y, layout.height);
    let y2 = clip(start.y.max(end.y), layout.origin_y, layout.height);

    if x2 - x1 <= 0.0 || y2 - y1 <= 0.0 {
        return None;
    }

    let to_px = |v: f64, scale: f64, limit: u32| ((v * scale).round() as u32).min(limit);
    let left = to_px(x1, sx, image_width);
    let right = to_px(x2, sx, image_width);
    let top = to_px(y1, sy, image_height);
    let bottom = to_px(y2, sy, image_height);

    if right <= left || bottom <= top {
        return None;
    }

    Some(Rect::new(left, top, right - left, bottom - top))
}

/// Largest size that fits inside `max_width x max_height` with the same aspect
/// ratio, never enlarging the source.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let w = (width as f64 * scale).round() as u32;
    let h = (height as f64 * scale).round() as u32;
    (w.clamp(1, max_width.max(1)), h.clamp(1, max_height.max(1)))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
