//! Core raster types: the RGB pixel buffer and pixel-space rectangles.

use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};

/// An axis-aligned rectangle in pixel units.
///
/// A rectangle is valid for an image when it has positive area and
/// `x + width <= image_width` and `y + height <= image_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering an entire image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Check that the rectangle has positive area and lies inside the image.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= image_width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= image_height)
    }
}

/// An owned RGB image, 3 bytes per pixel in row-major order.
///
/// Editing operations never mutate a buffer they were handed; they return a
/// new buffer instead, so snapshots held by the history stay untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a buffer and verify that the pixel data matches the dimensions.
    pub fn try_new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EditError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(EditError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 3);
        for _ in 0..count {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a PixelBuffer from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Byte offset of the pixel at (x, y).
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Read one pixel.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = self.index_of(x, y);
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Rectangle covering this whole buffer.
    pub fn bounds(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    /// Fail unless `rect` has positive area and lies inside this buffer.
    pub fn check_region(&self, rect: &Rect) -> Result<()> {
        if rect.width == 0 || rect.height == 0 {
            return Err(EditError::DegenerateRegion {
                width: rect.width,
                height: rect.height,
            });
        }
        if !rect.fits_within(self.width, self.height) {
            return Err(EditError::RegionOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                image_width: self.width,
                image_height: self.height,
            });
        }
        Ok(())
    }

    /// Copy the pixels under `rect` into a new buffer.
    pub fn extract(&self, rect: &Rect) -> Result<PixelBuffer> {
        self.check_region(rect)?;

        let row_bytes = rect.width as usize * 3;
        let mut output = Vec::with_capacity(row_bytes * rect.height as usize);
        for y in rect.y..rect.bottom() {
            let start = self.index_of(rect.x, y);
            output.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }

        Ok(PixelBuffer::new(rect.width, rect.height, output))
    }

    /// Return a copy of this buffer with `patch` written at the origin of `rect`.
    ///
    /// The patch must have exactly the rectangle's dimensions.
    pub fn with_region(&self, rect: &Rect, patch: &PixelBuffer) -> Result<PixelBuffer> {
        self.check_region(rect)?;
        if patch.width != rect.width || patch.height != rect.height {
            return Err(EditError::InvalidDimensions {
                width: patch.width,
                height: patch.height,
            });
        }

        let mut output = self.clone();
        let row_bytes = rect.width as usize * 3;
        for row in 0..rect.height {
            let dst = output.index_of(rect.x, rect.y + row);
            let src = patch.index_of(0, row);
            output.pixels[dst..dst + row_bytes].copy_from_slice(&patch.pixels[src..src + row_bytes]);
        }

        Ok(output)
    }
}
