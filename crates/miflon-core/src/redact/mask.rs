//! Selection masks for redaction blending.
//!
//! A mask holds one 8-bit alpha value per pixel of the region: 255 means the
//! processed pixel wins, 0 means the original is kept.

use super::blur::gaussian_blur_zero_border;
use crate::buffer::PixelBuffer;

/// Per-pixel alpha over a redaction region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMask {
    pub width: u32,
    pub height: u32,
    /// One alpha byte per pixel, row-major.
    pub alpha: Vec<u8>,
}

impl SelectionMask {
    /// Mask covering the whole region.
    pub fn rectangle(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![255; width as usize * height as usize],
        }
    }

    /// Mask covering the ellipse inscribed in the region.
    ///
    /// The ellipse is centered at `(width / 2, height / 2)` with semi-axes
    /// `width / 2` and `height / 2`. A pixel is inside when its center is.
    pub fn ellipse(width: u32, height: u32) -> Self {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        let rx = cx.max(0.5);
        let ry = cy.max(0.5);

        let mut alpha = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let dy = (y as f32 + 0.5 - cy) / ry;
            for x in 0..width {
                let dx = (x as f32 + 0.5 - cx) / rx;
                alpha.push(if dx * dx + dy * dy <= 1.0 { 255 } else { 0 });
            }
        }

        Self {
            width,
            height,
            alpha,
        }
    }

    /// Soften the mask edge with a Gaussian of kernel size `2 * radius + 1`.
    ///
    /// Everything outside the region counts as unselected, so even a
    /// rectangle mask gets a ramp along its border. Radius 0 is a no-op.
    pub fn feathered(self, radius: u32) -> Self {
        if radius == 0 || self.alpha.is_empty() {
            return self;
        }
        let alpha = gaussian_blur_zero_border(&self.alpha, self.width, self.height, 2 * radius + 1);
        Self { alpha, ..self }
    }

    /// Alpha at (x, y) as a fraction in `[0, 1]`.
    #[inline]
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        self.alpha[(y * self.width + x) as usize] as f32 / 255.0
    }

    /// Blend `processed` over `original` through this mask.
    ///
    /// `output = processed * a + original * (1 - a)` per channel, rounded.
    /// Both buffers must match the mask's dimensions.
    pub fn composite(&self, processed: &PixelBuffer, original: &PixelBuffer) -> PixelBuffer {
        debug_assert_eq!((processed.width, processed.height), (self.width, self.height));
        debug_assert_eq!((original.width, original.height), (self.width, self.height));

        let mut output = original.pixels.clone();
        for (i, &a) in self.alpha.iter().enumerate() {
            // Fully unselected: keep the original bytes
            if a == 0 {
                continue;
            }
            let base = i * 3;
            if a == 255 {
                output[base..base + 3].copy_from_slice(&processed.pixels[base..base + 3]);
                continue;
            }
            let t = a as f32 / 255.0;
            for c in 0..3 {
                let p = processed.pixels[base + c] as f32;
                let o = original.pixels[base + c] as f32;
                output[base + c] = (p * t + o * (1.0 - t)).round().clamp(0.0, 255.0) as u8;
            }
        }

        PixelBuffer::new(self.width, self.height, output)
    }
}
