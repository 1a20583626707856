//! Watermark compositing: an optional logo and an optional line of text.
//!
//! Overlays are composited onto an RGBA working copy in a fixed order, logo
//! first and text second, and the result is flattened back to RGB. The
//! configured anchor places the logo; text is always placed bottom-right.
//!
//! A missing logo or an unusable font does not fail the pass. The overlay is
//! left out, a warning is logged, and the omission is reported in
//! [`WatermarkOutcome::skipped`].

mod logo;
mod text;

pub use logo::{load_logo, logo_from_bytes};
pub use text::{
    fit_text, font_from_bytes, load_font, resolve_font, TextFit, TextMeasure,
    TEXT_WIDTH_BUDGET_PERCENT,
};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ab_glyph::FontArc;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{EditError, Result};

/// Distance in pixels between an overlay and the image edge it is anchored to.
pub const WATERMARK_MARGIN: u32 = 10;

/// Largest text height, as a percentage of the image height.
pub const MAX_TEXT_SIZE_PERCENT: u32 = 15;

/// Named placement of an overlay relative to the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl Anchor {
    /// Top-left corner of an `overlay_w` x `overlay_h` overlay placed at this
    /// anchor. `Center` ignores the margin.
    pub fn position(
        self,
        image_w: u32,
        image_h: u32,
        overlay_w: u32,
        overlay_h: u32,
        margin: u32,
    ) -> (i64, i64) {
        let (iw, ih) = (image_w as i64, image_h as i64);
        let (ow, oh) = (overlay_w as i64, overlay_h as i64);
        let m = margin as i64;
        match self {
            Anchor::TopLeft => (m, m),
            Anchor::TopRight => (iw - ow - m, m),
            Anchor::BottomLeft => (m, ih - oh - m),
            Anchor::BottomRight => (iw - ow - m, ih - oh - m),
            Anchor::Center => ((iw - ow) / 2, (ih - oh) / 2),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
            Anchor::Center => "center",
        })
    }
}

impl FromStr for Anchor {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-left" => Ok(Anchor::TopLeft),
            "top-right" => Ok(Anchor::TopRight),
            "bottom-left" => Ok(Anchor::BottomLeft),
            "bottom-right" => Ok(Anchor::BottomRight),
            "center" => Ok(Anchor::Center),
            _ => Err(EditError::settings(format!("unknown anchor '{}'", s))),
        }
    }
}

/// Watermark parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSpec {
    /// Text to draw, or `None` for no text overlay.
    pub text: Option<String>,
    /// Glyph height as a percentage of the image height.
    pub text_size_percent: u32,
    pub text_color: [u8; 3],
    /// Logo file, or `None` for no logo overlay.
    pub logo_path: Option<PathBuf>,
    /// Logo width as a percentage of the image width.
    pub logo_size_percent: u32,
    /// 0 (invisible) to 100 (opaque). Applies to both overlays.
    pub opacity: u8,
    /// Placement of the logo.
    pub anchor: Anchor,
    /// Preferred font file for the text overlay.
    pub font_path: Option<PathBuf>,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: None,
            text_size_percent: 4,
            text_color: [255, 255, 255],
            logo_path: None,
            logo_size_percent: 20,
            opacity: 60,
            anchor: Anchor::BottomRight,
            font_path: None,
        }
    }
}

impl WatermarkSpec {
    /// Text overlay content, if any non-blank text is configured.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Whether this spec would draw anything at all.
    pub fn is_empty(&self) -> bool {
        self.text().is_none() && self.logo_path.is_none()
    }

    /// Check that all percentages are within range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEffectParameter` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let check = |name: &'static str, value: u32, range: std::ops::RangeInclusive<u32>| {
            if range.contains(&value) {
                Ok(())
            } else {
                Err(EditError::InvalidEffectParameter {
                    name,
                    value: value as i64,
                    reason: "percentage out of range",
                })
            }
        };
        check("text_size_percent", self.text_size_percent, 1..=MAX_TEXT_SIZE_PERCENT)?;
        check("logo_size_percent", self.logo_size_percent, 1..=100)?;
        check("opacity", self.opacity as u32, 0..=100)
    }
}

/// An overlay that was requested but left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedOverlay {
    Logo { reason: String },
    Text { reason: String },
}

impl fmt::Display for SkippedOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedOverlay::Logo { reason } => write!(f, "logo skipped: {}", reason),
            SkippedOverlay::Text { reason } => write!(f, "text skipped: {}", reason),
        }
    }
}

/// Result of a watermark pass.
#[derive(Debug, Clone)]
pub struct WatermarkOutcome {
    /// The flattened, opaque output image.
    pub image: PixelBuffer,
    /// Overlays that were requested but could not be drawn.
    pub skipped: Vec<SkippedOverlay>,
}

/// Loaded overlay resources.
///
/// Bindings that receive the logo and font as bytes build this directly;
/// [`apply_watermark`] fills it from the paths in the [`WatermarkSpec`].
#[derive(Default, Clone)]
pub struct WatermarkAssets {
    pub logo: Option<RgbaImage>,
    pub font: Option<FontArc>,
}

/// Apply a watermark, loading the logo and font from disk.
///
/// # Errors
///
/// Returns `InvalidEffectParameter` for out-of-range percentages. Resource
/// failures are reported through [`WatermarkOutcome::skipped`] instead.
pub fn apply_watermark(image: &PixelBuffer, spec: &WatermarkSpec) -> Result<WatermarkOutcome> {
    spec.validate()?;

    let mut skipped = Vec::new();
    let mut assets = WatermarkAssets::default();

    if let Some(path) = &spec.logo_path {
        match load_logo(path) {
            Ok(logo) => assets.logo = Some(logo),
            Err(e) => {
                tracing::warn!(error = %e, "Logo unavailable, continuing without it");
                skipped.push(SkippedOverlay::Logo {
                    reason: e.to_string(),
                });
            }
        }
    }
    if spec.text().is_some() {
        assets.font = resolve_font(spec.font_path.as_deref());
    }

    let mut outcome = apply_watermark_with(image, spec, &assets)?;
    skipped.append(&mut outcome.skipped);
    outcome.skipped = skipped;
    Ok(outcome)
}

/// Apply a watermark with resources already in memory.
///
/// The logo is drawn whenever `assets.logo` is present; text needs non-blank
/// `text` and `assets.font`.
pub fn apply_watermark_with(
    image: &PixelBuffer,
    spec: &WatermarkSpec,
    assets: &WatermarkAssets,
) -> Result<WatermarkOutcome> {
    spec.validate()?;

    let mut skipped = Vec::new();
    let mut canvas = image
        .to_rgb_image()
        .map(|rgb| DynamicImage::ImageRgb8(rgb).to_rgba8())
        .ok_or(EditError::InvalidPixelData {
            expected: image.width as usize * image.height as usize * 3,
            actual: image.pixels.len(),
        })?;

    if let Some(logo) = &assets.logo {
        let prepared = logo::prepare_logo(logo, image.width, spec.logo_size_percent, spec.opacity);
        logo::draw_logo_overlay(&mut canvas, &prepared, spec.anchor, WATERMARK_MARGIN);
    }

    if let Some(content) = spec.text() {
        match &assets.font {
            Some(font) => {
                text::draw_text_overlay(
                    &mut canvas,
                    font,
                    content,
                    spec.text_size_percent,
                    spec.text_color,
                    spec.opacity,
                    WATERMARK_MARGIN,
                );
            }
            None => {
                tracing::warn!("No usable font found, text overlay skipped");
                skipped.push(SkippedOverlay::Text {
                    reason: "no usable font".to_string(),
                });
            }
        }
    }

    // The base is opaque, so dropping alpha is a lossless flatten
    let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();

    tracing::debug!(
        width = image.width,
        height = image.height,
        skipped = skipped.len(),
        "Applied watermark"
    );

    Ok(WatermarkOutcome {
        image: PixelBuffer::from_rgb_image(flattened),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn white(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::filled(width, height, [255, 255, 255])
    }

    fn logo_spec(anchor: Anchor, opacity: u8) -> WatermarkSpec {
        WatermarkSpec {
            logo_path: Some(PathBuf::from("logo.png")),
            logo_size_percent: 10,
            opacity,
            anchor,
            ..Default::default()
        }
    }

    fn black_logo() -> WatermarkAssets {
        WatermarkAssets {
            logo: Some(RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255]))),
            font: None,
        }
    }

    #[test]
    fn test_anchor_positions() {
        assert_eq!(Anchor::TopLeft.position(200, 100, 20, 10, 10), (10, 10));
        assert_eq!(Anchor::TopRight.position(200, 100, 20, 10, 10), (170, 10));
        assert_eq!(Anchor::BottomLeft.position(200, 100, 20, 10, 10), (10, 80));
        assert_eq!(Anchor::BottomRight.position(200, 100, 20, 10, 10), (170, 80));
        assert_eq!(Anchor::Center.position(200, 100, 20, 10, 10), (90, 45));
    }

    #[test]
    fn test_anchor_serde_names() {
        let anchor: Anchor = serde_json::from_str("\"top-left\"").unwrap();
        assert_eq!(anchor, Anchor::TopLeft);
        assert_eq!(serde_json::to_string(&Anchor::BottomRight).unwrap(), "\"bottom-right\"");
        assert_eq!(Anchor::Center.to_string(), "center");
        assert_eq!("Top-Right".parse::<Anchor>().unwrap(), Anchor::TopRight);
        assert!("middle".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_logo_at_anchor_is_opaque_rgb() {
        let img = white(200, 100);
        let out = apply_watermark_with(&img, &logo_spec(Anchor::TopLeft, 100), &black_logo())
            .unwrap();

        assert!(out.skipped.is_empty());
        assert_eq!((out.image.width, out.image.height), (200, 100));
        assert_eq!(out.image.pixels.len(), 200 * 100 * 3);
        // Logo is 10% of 200 = 20px wide, at (10, 10)
        assert_eq!(out.image.pixel(10, 10), [0, 0, 0]);
        assert_eq!(out.image.pixel(29, 19), [0, 0, 0]);
        assert_eq!(out.image.pixel(30, 10), [255, 255, 255]);
        assert_eq!(out.image.pixel(9, 9), [255, 255, 255]);
    }

    #[test]
    fn test_logo_opacity_blends() {
        let img = white(200, 100);
        let out = apply_watermark_with(&img, &logo_spec(Anchor::Center, 50), &black_logo())
            .unwrap();
        let [r, g, b] = out.image.pixel(100, 50);
        assert!(r > 100 && r < 155, "half-transparent black over white, got {}", r);
        assert_eq!((r, g), (g, b));
    }

    #[test]
    fn test_zero_opacity_leaves_image() {
        let img = white(200, 100);
        let out = apply_watermark_with(&img, &logo_spec(Anchor::Center, 0), &black_logo())
            .unwrap();
        assert_eq!(out.image, img);
    }

    #[test]
    fn test_text_is_composited_over_logo() {
        let spec = WatermarkSpec {
            text: Some("MMMM".to_string()),
            text_size_percent: 15,
            text_color: [255, 0, 0],
            opacity: 100,
            logo_size_percent: 100,
            anchor: Anchor::BottomRight,
            ..Default::default()
        };
        let assets = WatermarkAssets {
            logo: Some(RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]))),
            font: Some(text::test_font()),
        };

        let out = apply_watermark_with(&white(400, 200), &spec, &assets).unwrap();
        assert!(out.skipped.is_empty());
        // The logo covers the whole canvas, so any red comes from text drawn after it
        assert_eq!(out.image.pixel(5, 5), [0, 0, 0]);
        let red: Vec<(u32, u32)> = (0..200)
            .flat_map(|y| (0..400).map(move |x| (x, y)))
            .filter(|&(x, y)| out.image.pixel(x, y) == [255, 0, 0])
            .collect();
        assert!(!red.is_empty());
        assert!(red.iter().all(|&(x, y)| x >= 200 && y >= 100));
    }

    #[test]
    fn test_missing_font_skips_text() {
        let img = white(64, 64);
        let spec = WatermarkSpec {
            text: Some("(c) Miflon".to_string()),
            ..Default::default()
        };
        let out = apply_watermark_with(&img, &spec, &WatermarkAssets::default()).unwrap();
        assert_eq!(out.image, img);
        assert!(matches!(out.skipped.as_slice(), [SkippedOverlay::Text { .. }]));
    }

    #[test]
    fn test_missing_logo_file_is_skipped() {
        let img = white(64, 64);
        let spec = WatermarkSpec {
            logo_path: Some(PathBuf::from("/nonexistent/logo.png")),
            ..Default::default()
        };
        let out = apply_watermark(&img, &spec).unwrap();
        assert_eq!(out.image, img);
        assert!(matches!(out.skipped.as_slice(), [SkippedOverlay::Logo { .. }]));
    }

    #[test]
    fn test_blank_text_is_not_an_overlay() {
        let spec = WatermarkSpec {
            text: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(spec.is_empty());
        let out = apply_watermark_with(&white(8, 8), &spec, &WatermarkAssets::default()).unwrap();
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_percentages() {
        let spec = WatermarkSpec {
            opacity: 101,
            ..Default::default()
        };
        assert!(matches!(
            spec.validate(),
            Err(EditError::InvalidEffectParameter { name: "opacity", .. })
        ));
        let spec = WatermarkSpec {
            logo_size_percent: 0,
            ..Default::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_text_size_range() {
        let mut spec = WatermarkSpec::default();
        for size in [1, MAX_TEXT_SIZE_PERCENT] {
            spec.text_size_percent = size;
            assert!(spec.validate().is_ok());
        }
        spec.text_size_percent = MAX_TEXT_SIZE_PERCENT + 1;
        assert!(matches!(
            spec.validate(),
            Err(EditError::InvalidEffectParameter { name: "text_size_percent", .. })
        ));
    }

    #[test]
    fn test_spec_partial_json() {
        let spec: WatermarkSpec =
            serde_json::from_str(r#"{"text":"hi","anchor":"top-right"}"#).unwrap();
        assert_eq!(spec.text(), Some("hi"));
        assert_eq!(spec.anchor, Anchor::TopRight);
        assert_eq!(spec.opacity, WatermarkSpec::default().opacity);
    }
}
