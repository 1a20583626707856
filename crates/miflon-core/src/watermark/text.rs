//! Text overlay: font loading, auto-fit sizing and rendering.

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::{EditError, Result};

/// Fraction of the image width the text may occupy, in percent.
pub const TEXT_WIDTH_BUDGET_PERCENT: u32 = 94;

/// Fonts tried, in order, when no font file is configured or it fails to load.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Anything that can report the rendered size of a string.
pub trait TextMeasure {
    /// Rendered `(width, height)` of `text` at a glyph height of `px` pixels.
    fn measure(&self, text: &str, px: f32) -> (u32, u32);
}

impl TextMeasure for FontArc {
    fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        text_size(PxScale::from(px), self, text)
    }
}

/// Font size and rendered extent chosen for a text overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFit {
    pub px: f32,
    pub width: u32,
    pub height: u32,
}

/// Pick a font size for `text` on an image of the given size.
///
/// The starting size is `image_height * size_percent / 100`. If the text is
/// wider than the whole-pixel width budget, the size is scaled down by the
/// overflow ratio, truncated to two decimals and lowered one more hundredth,
/// then measured once more. There is no second shrink pass.
///
/// Glyph advances scale linearly with the size and the measured width
/// truncates their sum, so shrinking against the floored budget keeps the
/// re-measured width within it; the extra hundredth absorbs `f32` error.
pub fn fit_text(
    measure: &impl TextMeasure,
    text: &str,
    image_width: u32,
    image_height: u32,
    size_percent: u32,
) -> TextFit {
    let mut px = (image_height as f32 * size_percent as f32 / 100.0).max(1.0);
    let (mut width, mut height) = measure.measure(text, px);

    let budget = text_width_budget(image_width) as f32;
    if width as f32 > budget {
        let shrunk = (px * budget / width as f32 * 100.0).floor() / 100.0 - 0.01;
        px = shrunk.max(1.0);
        (width, height) = measure.measure(text, px);
    }

    TextFit { px, width, height }
}

/// Widest text, in whole pixels, allowed on an image `image_width` wide.
pub fn text_width_budget(image_width: u32) -> u32 {
    (image_width as u64 * TEXT_WIDTH_BUDGET_PERCENT as u64 / 100) as u32
}

/// Load a TrueType/OpenType font from disk.
///
/// # Errors
///
/// Returns `ResourceUnavailable` if the file cannot be read or parsed.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let data = std::fs::read(path)
        .map_err(|e| EditError::resource(format!("font {}: {}", path.display(), e)))?;
    FontArc::try_from_vec(data)
        .map_err(|e| EditError::resource(format!("font {}: {}", path.display(), e)))
}

/// Parse font bytes held in memory.
pub fn font_from_bytes(data: Vec<u8>) -> Result<FontArc> {
    FontArc::try_from_vec(data).map_err(|e| EditError::resource(e.to_string()))
}

/// Resolve the font for a text overlay.
///
/// The configured font is tried first, then a list of common system fonts.
/// Returns `None` when nothing usable is found.
pub fn resolve_font(configured: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = configured {
        match load_font(path) {
            Ok(font) => return Some(font),
            Err(e) => tracing::warn!(error = %e, "Configured font unusable, trying system fonts"),
        }
    }

    SYSTEM_FONT_CANDIDATES
        .iter()
        .find_map(|candidate| load_font(Path::new(candidate)).ok())
}

/// Draw `text` onto `canvas` with its box anchored bottom-right.
///
/// Glyph coverage is rendered on a transparent layer whose alpha is
/// `coverage * opacity / 100`, then alpha-composited onto the canvas.
pub(crate) fn draw_text_overlay(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    size_percent: u32,
    color: [u8; 3],
    opacity: u8,
    margin: u32,
) -> TextFit {
    let (width, height) = canvas.dimensions();
    let fit = fit_text(font, text, width, height, size_percent);

    let x = width as i32 - fit.width as i32 - margin as i32;
    let y = height as i32 - fit.height as i32 - margin as i32;

    let mut coverage = GrayImage::new(width, height);
    draw_text_mut(&mut coverage, Luma([255]), x, y, PxScale::from(fit.px), font, text);

    let opacity = opacity.min(100) as f32 / 100.0;
    let [r, g, b] = color;
    let layer = RgbaImage::from_fn(width, height, |px, py| {
        let cov = coverage.get_pixel(px, py)[0] as f32;
        Rgba([r, g, b, (cov * opacity).round() as u8])
    });
    imageops::overlay(canvas, &layer, 0, 0);

    tracing::debug!(px = fit.px, x, y, width = fit.width, height = fit.height, "Drew text overlay");
    fit
}

#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/test_fixtures/DejaVuSans.ttf"));

#[cfg(test)]
pub(crate) fn test_font() -> FontArc {
    FontArc::try_from_slice(TEST_FONT).unwrap()
}


// ============================================================================
// Property-Based Tests
// ============================================================================
