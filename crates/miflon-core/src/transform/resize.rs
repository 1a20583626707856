//! Resampling to explicit target dimensions.
//!
//! Downscaling on both axes uses area averaging, which is anti-aliased by
//! construction: every source pixel contributes to exactly the output pixel
//! whose footprint covers it. Any other scale direction goes through the
//! `image` crate's Lanczos3 filter.
//!
//! All functions return new `PixelBuffer` instances without modifying the input.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{EditError, Result};

/// Requested output size. A missing side is derived from the source ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResizeTarget {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeTarget {
    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            height: None,
        }
    }

    pub fn height(height: u32) -> Self {
        Self {
            width: None,
            height: Some(height),
        }
    }

    /// Resolve to concrete dimensions for a source of the given size.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` when a supplied side is zero or neither
    /// side is supplied.
    pub fn resolve(&self, src_width: u32, src_height: u32) -> Result<(u32, u32)> {
        let invalid = || EditError::InvalidDimensions {
            width: self.width.unwrap_or(0),
            height: self.height.unwrap_or(0),
        };
        if src_width == 0 || src_height == 0 {
            return Err(EditError::InvalidDimensions {
                width: src_width,
                height: src_height,
            });
        }

        let ratio = src_width as f64 / src_height as f64;
        match (self.width, self.height) {
            (Some(0), _) | (_, Some(0)) | (None, None) => Err(invalid()),
            (Some(w), Some(h)) => Ok((w, h)),
            (Some(w), None) => Ok((w, ((w as f64 / ratio).round() as u32).max(1))),
            (None, Some(h)) => Ok((((h as f64 * ratio).round() as u32).max(1), h)),
        }
    }
}

/// Named output widths offered after cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePreset {
    /// Keep the cropped size.
    #[default]
    Original,
    /// 854 pixels wide.
    Small,
    /// 1280 pixels wide.
    Medium,
    /// 1920 pixels wide.
    Large,
}

impl ResizePreset {
    /// Target width, or `None` for `Original`.
    pub fn width(self) -> Option<u32> {
        match self {
            ResizePreset::Original => None,
            ResizePreset::Small => Some(854),
            ResizePreset::Medium => Some(1280),
            ResizePreset::Large => Some(1920),
        }
    }

    /// Resize target for this preset, or `None` for `Original`.
    pub fn target(self) -> Option<ResizeTarget> {
        self.width().map(ResizeTarget::width)
    }
}

/// Presets worth offering for an image of the given width.
///
/// A preset is only listed when it would shrink the image.
pub fn available_presets(width: u32) -> Vec<ResizePreset> {
    let mut presets = vec![ResizePreset::Original];
    presets.extend(
        [ResizePreset::Small, ResizePreset::Medium, ResizePreset::Large]
            .into_iter()
            .filter(|p| p.width().is_some_and(|w| width > w)),
    );
    presets
}

/// Preset selected when the export dialog opens: Medium if it is offered.
pub fn default_preset(width: u32) -> ResizePreset {
    if available_presets(width).contains(&ResizePreset::Medium) {
        ResizePreset::Medium
    } else {
        ResizePreset::Original
    }
}

/// Resize an image.
///
/// If only one side of `target` is given, the other follows the source aspect
/// ratio; if both are given, the image is stretched to exactly that size.
///
/// # Errors
///
/// Returns `EditError::InvalidDimensions` for zero or missing target sides.
pub fn resize(image: &PixelBuffer, target: ResizeTarget) -> Result<PixelBuffer> {
    let (width, height) = target.resolve(image.width, image.height)?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let resized = if width <= image.width && height <= image.height {
        area_average(image, width, height)
    } else {
        let rgb = image
            .to_rgb_image()
            .ok_or(EditError::InvalidPixelData {
                expected: image.width as usize * image.height as usize * 3,
                actual: image.pixels.len(),
            })?;
        let out = image::imageops::resize(&rgb, width, height, image::imageops::FilterType::Lanczos3);
        PixelBuffer::from_rgb_image(out)
    };

    tracing::debug!(
        from_width = image.width,
        from_height = image.height,
        to_width = width,
        to_height = height,
        "Resized image"
    );
    Ok(resized)
}

/// Source index range covered by output index `i` when mapping `src` onto `dst`.
#[inline]
fn footprint(i: u32, src: u32, dst: u32) -> (u32, u32) {
    let start = (i as u64 * src as u64 / dst as u64) as u32;
    let end = ((i as u64 + 1) * src as u64 / dst as u64) as u32;
    (start, end.max(start + 1).min(src))
}

/// Downscale by averaging every source pixel inside each output footprint.
///
/// Requires `0 < width <= image.width` and `0 < height <= image.height`.
pub(crate) fn area_average(image: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let mut output = Vec::with_capacity(width as usize * height as usize * 3);

    for oy in 0..height {
        let (y0, y1) = footprint(oy, image.height, height);
        for ox in 0..width {
            let (x0, x1) = footprint(ox, image.width, width);

            let mut sum = [0u64; 3];
            for y in y0..y1 {
                for x in x0..x1 {
                    let p = image.pixel(x, y);
                    sum[0] += p[0] as u64;
                    sum[1] += p[1] as u64;
                    sum[2] += p[2] as u64;
                }
            }

            let count = ((x1 - x0) * (y1 - y0)) as f64;
            for s in sum {
                output.push((s as f64 / count).round() as u8);
            }
        }
    }

    PixelBuffer::new(width, height, output)
}

/// Upscale by repeating the source pixel whose footprint covers each output pixel.
pub(crate) fn nearest_neighbor(image: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let mut output = Vec::with_capacity(width as usize * height as usize * 3);

    for oy in 0..height {
        let sy = (oy as u64 * image.height as u64 / height as u64) as u32;
        for ox in 0..width {
            let sx = (ox as u64 * image.width as u64 / width as u64) as u32;
            output.extend_from_slice(&image.pixel(sx, sy));
        }
    }

    PixelBuffer::new(width, height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Output always has exactly the resolved dimensions.
        #[test]
        fn prop_output_matches_target(
            (sw, sh) in (1u32..=60, 1u32..=60),
            (tw, th) in (1u32..=90, 1u32..=90),
        ) {
            let img = PixelBuffer::filled(sw, sh, [90, 90, 90]);
            let out = resize(&img, ResizeTarget::exact(tw, th)).unwrap();
            prop_assert_eq!((out.width, out.height), (tw, th));
            prop_assert_eq!(out.pixels.len(), (tw * th * 3) as usize);
        }

        /// Property: Single-side targets keep the aspect ratio within one pixel.
        #[test]
        fn prop_single_side_keeps_ratio(
            (sw, sh) in (10u32..=400, 10u32..=400),
            tw in 1u32..=400,
        ) {
            let (w, h) = ResizeTarget::width(tw).resolve(sw, sh).unwrap();
            prop_assert_eq!(w, tw);
            let expected = tw as f64 * sh as f64 / sw as f64;
            prop_assert!((h as f64 - expected).abs() <= 1.0);
        }
    }
}
