//! Aspect ratio parsing and maximal crop rectangles.
//!
//! Ratios arrive as strings from settings and UI ("16:9", "1.85:1",
//! "original"). They are parsed by a strict numeric grammar: each term is an
//! unsigned decimal number, nothing is ever evaluated as an expression.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::Rect;
use crate::error::EditError;

/// Target aspect ratio for a crop.
///
/// `Original` is the "no constraint" variant: it keeps the whole image and is
/// not represented as a ratio value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectRatio {
    #[default]
    Original,
    Fixed { width: f64, height: f64 },
}

impl AspectRatio {
    /// Create a fixed ratio. Both terms must be finite and positive.
    pub fn fixed(width: f64, height: f64) -> Result<Self, EditError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EditError::InvalidRatio(format!("{}:{}", width, height)));
        }
        Ok(AspectRatio::Fixed { width, height })
    }

    /// Width divided by height, or `None` for `Original`.
    pub fn value(&self) -> Option<f64> {
        match self {
            AspectRatio::Original => None,
            AspectRatio::Fixed { width, height } => Some(width / height),
        }
    }

    pub fn is_original(&self) -> bool {
        matches!(self, AspectRatio::Original)
    }
}

/// Parse one ratio term: `digits`, `digits.digits` or `.digits`.
fn parse_term(term: &str) -> Option<f64> {
    let (int_part, frac_part) = match term.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (term, None),
    };

    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(int_part) {
        return None;
    }
    match frac_part {
        Some(f) if f.is_empty() || !digits_only(f) => return None,
        None if int_part.is_empty() => return None,
        _ => {}
    }

    term.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl FromStr for AspectRatio {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("original") {
            return Ok(AspectRatio::Original);
        }

        let invalid = || EditError::InvalidRatio(s.to_string());
        let (w, h) = trimmed.split_once(':').ok_or_else(invalid)?;
        let width = parse_term(w.trim()).ok_or_else(invalid)?;
        let height = parse_term(h.trim()).ok_or_else(invalid)?;

        if width <= 0.0 || height <= 0.0 {
            return Err(invalid());
        }
        Ok(AspectRatio::Fixed { width, height })
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = EditError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.to_string()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Original => f.write_str("original"),
            AspectRatio::Fixed { width, height } => write!(f, "{}:{}", width, height),
        }
    }
}

/// Size of the largest crop with the given ratio that fits in the image.
///
/// If the image is wider than the target, the crop keeps the full height;
/// otherwise it keeps the full width. The derived side is rounded and clamped
/// to the image.
pub fn crop_size(ratio: AspectRatio, image_width: u32, image_height: u32) -> (u32, u32) {
    let AspectRatio::Fixed { width: rw, height: rh } = ratio else {
        return (image_width, image_height);
    };
    if image_width == 0 || image_height == 0 {
        return (image_width, image_height);
    }

    let (w, h) = (image_width as f64, image_height as f64);
    if w * rh > h * rw {
        let crop_w = (h * rw / rh).round() as u32;
        (crop_w.clamp(1, image_width), image_height)
    } else {
        let crop_h = (w * rh / rw).round() as u32;
        (image_width, crop_h.clamp(1, image_height))
    }
}

/// Largest crop rectangle for the ratio, centered in the image.
///
/// `Original` returns the full image.
pub fn maximal_rect(ratio: AspectRatio, image_width: u32, image_height: u32) -> Rect {
    let (crop_w, crop_h) = crop_size(ratio, image_width, image_height);
    Rect::new(
        (image_width - crop_w) / 2,
        (image_height - crop_h) / 2,
        crop_w,
        crop_h,
    )
}

/// Clamp an offset into `[0, max_offset]`.
#[inline]
pub fn clamp_offset(offset: i64, max_offset: u32) -> u32 {
    offset.clamp(0, max_offset as i64) as u32
}


// ============================================================================
// Property-Based Tests
// ============================================================================
