//! Mosaic pixelation.
//!
//! The region is area-averaged down to `max(1, w / cell) x max(1, h / cell)`
//! and scaled back up with nearest-neighbor sampling, so every block of the
//! output is a single color.

use crate::buffer::PixelBuffer;
use crate::transform::{area_average, nearest_neighbor};

/// Pixelate `image` with square cells of `cell_size` pixels.
pub fn pixelate(image: &PixelBuffer, cell_size: u32) -> PixelBuffer {
    if image.is_empty() {
        return image.clone();
    }
    let cell = cell_size.max(1);
    let small_w = (image.width / cell).max(1);
    let small_h = (image.height / cell).max(1);

    let small = area_average(image, small_w, small_h);
    nearest_neighbor(&small, image.width, image.height)
}

#[cfg(test)]
fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8]);
        }
    }
    PixelBuffer::new(width, height, pixels)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
