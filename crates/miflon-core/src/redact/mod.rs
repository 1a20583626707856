//! Region redaction: blur or pixelate part of an image.
//!
//! A redaction takes a rectangular region, runs an effect over a copy of its
//! pixels, then blends the processed pixels back through a selection mask.
//!
//! ## Selection Shapes
//!
//! - **Rectangle**: the whole region is affected
//! - **Ellipse**: only the ellipse inscribed in the region is affected
//!
//! ## Algorithm
//!
//! 1. Validate the effect parameters and the region
//! 2. Extract the region and apply the effect to it
//! 3. Build the shape mask, feathered when `feather_radius > 0`
//! 4. Blend: `output = processed * mask + original * (1 - mask)`
//! 5. Write the blended region into a copy of the image
//!
//! Validation happens before any pixel is touched, so a rejected redaction
//! leaves nothing half-applied.

mod blur;
mod mask;
mod pixelate;

pub use blur::{gaussian_blur, gaussian_kernel};
pub use mask::SelectionMask;
pub use pixelate::pixelate;

use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, Rect};
use crate::error::{EditError, Result};

/// Regions with this many pixels or fewer are rejected as degenerate.
pub const MIN_REGION_AREA: u64 = 4;

/// Largest accepted blur kernel.
pub const MAX_BLUR_KERNEL: u32 = 99;

/// Accepted pixelation cell sizes.
pub const PIXEL_CELL_RANGE: std::ops::RangeInclusive<u32> = 2..=50;

/// Largest accepted feather radius.
pub const MAX_FEATHER_RADIUS: u32 = 50;

/// Which filter a redaction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    Blur,
    Pixelate,
}

/// Which mask generator a redaction uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionShape {
    Rectangle,
    #[default]
    Ellipse,
}

/// Effect parameters.
///
/// `strength` is the blur kernel size for [`EffectKind::Blur`] and the cell
/// size in pixels for [`EffectKind::Pixelate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub kind: EffectKind,
    pub strength: u32,
    #[serde(default)]
    pub feather_radius: u32,
}

impl Default for EffectSpec {
    fn default() -> Self {
        Self::blur(19, 0)
    }
}

impl EffectSpec {
    pub fn blur(kernel_size: u32, feather_radius: u32) -> Self {
        Self {
            kind: EffectKind::Blur,
            strength: kernel_size,
            feather_radius,
        }
    }

    pub fn pixelate(cell_size: u32, feather_radius: u32) -> Self {
        Self {
            kind: EffectKind::Pixelate,
            strength: cell_size,
            feather_radius,
        }
    }

    /// Check ranges and return the effect with its blur kernel forced odd.
    ///
    /// Blur kernels below 3 are raised to 3 and even kernels are bumped to the
    /// next odd size. A zero kernel, a kernel above [`MAX_BLUR_KERNEL`], a cell
    /// size outside [`PIXEL_CELL_RANGE`] or a feather above
    /// [`MAX_FEATHER_RADIUS`] is rejected.
    pub fn validated(self) -> Result<Self> {
        if self.feather_radius > MAX_FEATHER_RADIUS {
            return Err(EditError::InvalidEffectParameter {
                name: "feather_radius",
                value: self.feather_radius as i64,
                reason: "must be at most 50",
            });
        }

        let strength = match self.kind {
            EffectKind::Blur => {
                if self.strength == 0 || self.strength > MAX_BLUR_KERNEL {
                    return Err(EditError::InvalidEffectParameter {
                        name: "blur_kernel",
                        value: self.strength as i64,
                        reason: "must be between 1 and 99",
                    });
                }
                odd_kernel(self.strength)
            }
            EffectKind::Pixelate => {
                if !PIXEL_CELL_RANGE.contains(&self.strength) {
                    return Err(EditError::InvalidEffectParameter {
                        name: "pixel_cell",
                        value: self.strength as i64,
                        reason: "must be between 2 and 50",
                    });
                }
                self.strength
            }
        };

        Ok(Self { strength, ..self })
    }
}

/// Nearest odd kernel size that is at least 3.
#[inline]
pub fn odd_kernel(size: u32) -> u32 {
    let size = size.max(3);
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Apply a redaction to `region` of `image` and return the edited copy.
///
/// # Errors
///
/// - `InvalidEffectParameter` when the effect is out of range
/// - `DegenerateRegion` when the region has at most [`MIN_REGION_AREA`] pixels
/// - `RegionOutOfBounds` when the region does not fit in the image
pub fn apply_redaction(
    image: &PixelBuffer,
    region: &Rect,
    effect: &EffectSpec,
    shape: SelectionShape,
) -> Result<PixelBuffer> {
    let effect = effect.validated()?;

    if region.area() <= MIN_REGION_AREA {
        return Err(EditError::DegenerateRegion {
            width: region.width,
            height: region.height,
        });
    }
    let original = image.extract(region)?;

    let processed = match effect.kind {
        EffectKind::Blur => gaussian_blur(&original, effect.strength),
        EffectKind::Pixelate => pixelate(&original, effect.strength),
    };

    let mask = match shape {
        SelectionShape::Rectangle => SelectionMask::rectangle(region.width, region.height),
        SelectionShape::Ellipse => SelectionMask::ellipse(region.width, region.height),
    }
    .feathered(effect.feather_radius);

    let blended = mask.composite(&processed, &original);

    tracing::debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        kind = ?effect.kind,
        strength = effect.strength,
        feather = effect.feather_radius,
        shape = ?shape,
        "Applied redaction"
    );

    image.with_region(region, &blended)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Vertical stripes, so both blur and pixelate visibly change pixels.
    fn striped_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _y in 0..height {
            for x in 0..width {
                let v = if x % 2 == 0 { 0 } else { 250 };
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_odd_kernel() {
        assert_eq!(odd_kernel(1), 3);
        assert_eq!(odd_kernel(2), 3);
        assert_eq!(odd_kernel(3), 3);
        assert_eq!(odd_kernel(18), 19);
        assert_eq!(odd_kernel(19), 19);
    }

    #[test]
    fn test_validated_blur_forces_odd() {
        let spec = EffectSpec::blur(20, 0).validated().unwrap();
        assert_eq!(spec.strength, 21);
        let spec = EffectSpec::blur(98, 0).validated().unwrap();
        assert_eq!(spec.strength, 99);
    }

    #[test]
    fn test_validated_rejects_out_of_range() {
        assert!(EffectSpec::blur(0, 0).validated().is_err());
        assert!(EffectSpec::blur(100, 0).validated().is_err());
        assert!(EffectSpec::pixelate(0, 0).validated().is_err());
        assert!(EffectSpec::pixelate(1, 0).validated().is_err());
        assert!(EffectSpec::pixelate(51, 0).validated().is_err());
        assert!(EffectSpec::pixelate(7, 51).validated().is_err());
        assert!(EffectSpec::pixelate(7, 50).validated().is_ok());
    }

    #[test]
    fn test_redaction_only_touches_region() {
        let img = striped_image(40, 40);
        let region = Rect::new(10, 10, 20, 20);
        let out = apply_redaction(&img, &region, &EffectSpec::blur(9, 0), SelectionShape::Rectangle)
            .unwrap();

        // Outside the region: untouched
        assert_eq!(out.pixel(5, 5), img.pixel(5, 5));
        assert_eq!(out.pixel(35, 20), img.pixel(35, 20));
        // Inside: stripes are smoothed toward gray
        let center = out.pixel(20, 20)[0];
        assert!(center > 50 && center < 200, "expected smoothed value, got {}", center);
        // Source buffer never mutated
        assert_eq!(img, striped_image(40, 40));
    }

    #[test]
    fn test_ellipse_leaves_corners() {
        let img = striped_image(40, 40);
        let region = Rect::new(0, 0, 40, 40);
        let out = apply_redaction(&img, &region, &EffectSpec::pixelate(8, 0), SelectionShape::Ellipse)
            .unwrap();

        // Corners lie outside the inscribed ellipse
        assert_eq!(out.pixel(0, 0), img.pixel(0, 0));
        assert_eq!(out.pixel(39, 39), img.pixel(39, 39));
        // Center is inside
        assert_ne!(out.pixel(21, 20), img.pixel(21, 20));
    }

    #[test]
    fn test_degenerate_region_rejected() {
        let img = striped_image(10, 10);
        let result = apply_redaction(
            &img,
            &Rect::new(0, 0, 2, 2),
            &EffectSpec::default(),
            SelectionShape::Rectangle,
        );
        assert!(matches!(result, Err(EditError::DegenerateRegion { .. })));

        let result = apply_redaction(
            &img,
            &Rect::new(0, 0, 0, 9),
            &EffectSpec::default(),
            SelectionShape::Rectangle,
        );
        assert!(matches!(result, Err(EditError::DegenerateRegion { .. })));
    }

    #[test]
    fn test_out_of_bounds_region_rejected() {
        let img = striped_image(10, 10);
        let result = apply_redaction(
            &img,
            &Rect::new(5, 5, 10, 10),
            &EffectSpec::default(),
            SelectionShape::Rectangle,
        );
        assert!(matches!(result, Err(EditError::RegionOutOfBounds { .. })));
    }

    #[test]
    fn test_invalid_effect_rejected_before_region_check() {
        let img = striped_image(10, 10);
        let result = apply_redaction(
            &img,
            &Rect::new(0, 0, 0, 0),
            &EffectSpec::pixelate(1, 0),
            SelectionShape::Rectangle,
        );
        assert!(matches!(result, Err(EditError::InvalidEffectParameter { .. })));
    }

    #[test]
    fn test_effect_spec_serde_tags() {
        let spec: EffectSpec =
            serde_json::from_str(r#"{"kind":"pixelate","strength":7}"#).unwrap();
        assert_eq!(spec, EffectSpec::pixelate(7, 0));
        let shape: SelectionShape = serde_json::from_str("\"ellipse\"").unwrap();
        assert_eq!(shape, SelectionShape::Ellipse);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
