//! Gaussian blur with an explicit odd kernel size.
//!
//! The kernel size is what the user picks, so sigma is derived from it
//! (`0.3 * ((k - 1) * 0.5 - 1) + 0.8`) rather than the other way round.
//! Filtering runs through `imageproc` on `f32` planes so only the final
//! result is rounded back to 8 bits.

use image::{ImageBuffer, Luma, Pixel, Rgb};
use imageproc::filter::separable_filter_equal;

use crate::buffer::PixelBuffer;

/// Normalized 1-D Gaussian weights for an odd `size`.
///
/// Even sizes are not expected here; callers normalize first.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) as i32;
    let radius = size / 2;
    let sigma = (0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8).max(0.1);
    let denom = 2.0 * sigma * sigma;

    let raw: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i * i) as f64 / denom).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.iter().map(|w| (w / sum) as f32).collect()
}

/// Blur an RGB buffer with a `kernel_size` x `kernel_size` Gaussian.
///
/// Edges replicate the border pixel.
pub fn gaussian_blur(image: &PixelBuffer, kernel_size: u32) -> PixelBuffer {
    if image.is_empty() {
        return image.clone();
    }
    let plane: ImageBuffer<Rgb<f32>, Vec<f32>> =
        ImageBuffer::from_fn(image.width, image.height, |x, y| {
            Rgb(image.pixel(x, y).map(f32::from))
        });

    let blurred = separable_filter_equal(&plane, &gaussian_kernel(kernel_size));
    let pixels = blurred.into_raw().into_iter().map(to_u8).collect();
    PixelBuffer::new(image.width, image.height, pixels)
}

/// Blur a single-channel plane, treating everything outside it as zero.
///
/// The plane is padded with `kernel_size / 2` zero samples per side before
/// filtering, so the edge replication inside `imageproc` only ever sees zeros.
pub(crate) fn gaussian_blur_zero_border(
    data: &[u8],
    width: u32,
    height: u32,
    kernel_size: u32,
) -> Vec<u8> {
    let kernel = gaussian_kernel(kernel_size);
    let pad = (kernel.len() / 2) as u32;

    let padded: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width + 2 * pad, height + 2 * pad, |x, y| {
            let inside = (pad..pad + width).contains(&x) && (pad..pad + height).contains(&y);
            if inside {
                let idx = ((y - pad) * width + (x - pad)) as usize;
                Luma([f32::from(data[idx])])
            } else {
                Luma([0.0])
            }
        });

    let blurred = separable_filter_equal(&padded, &kernel);
    let mut output = Vec::with_capacity(data.len());
    for y in pad..pad + height {
        for x in pad..pad + width {
            output.push(to_u8(blurred.get_pixel(x, y).channels()[0]));
        }
    }
    output
}

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
