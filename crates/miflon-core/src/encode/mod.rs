//! Image encoding for export.
//!
//! This module provides:
//! - [`ExportFormat`]: the three output formats and their file extensions
//! - [`encode`]: encode a [`PixelBuffer`] in a given format
//! - Per-format encoders over raw RGB bytes
//!
//! JPG is the only lossy format and the only one that uses `quality`.
//!
//! # Examples
//!
//! ```ignore
//! use miflon_core::encode::{encode, ExportFormat};
//!
//! let bytes = encode(&buffer, ExportFormat::Png, 95)?;
//! ```

mod jpeg;
mod lossless;

pub use jpeg::encode_jpeg;
pub use lossless::{encode_bmp, encode_png};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{EditError, Result};

/// Quality used for JPG when nothing else is configured.
pub const DEFAULT_JPG_QUALITY: u8 = 95;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    #[default]
    Jpg,
    Png,
    Bmp,
}

impl ExportFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpg => "jpg",
            ExportFormat::Png => "png",
            ExportFormat::Bmp => "bmp",
        }
    }

    /// Whether the format takes a quality parameter.
    pub fn is_lossy(self) -> bool {
        matches!(self, ExportFormat::Jpg)
    }

    /// Match a file extension, case-insensitively. `jpeg` counts as JPG.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ExportFormat::Jpg),
            "png" => Some(ExportFormat::Png),
            "bmp" => Some(ExportFormat::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Jpg => "JPG",
            ExportFormat::Png => "PNG",
            ExportFormat::Bmp => "BMP",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim())
            .ok_or_else(|| EditError::settings(format!("unknown export format '{}'", s)))
    }
}

/// Encode a buffer. `quality` is used for JPG only.
///
/// # Errors
///
/// Returns `InvalidDimensions`/`InvalidPixelData` for malformed buffers and
/// `EncodeFailure` if the codec fails.
pub fn encode(image: &PixelBuffer, format: ExportFormat, quality: u8) -> Result<Vec<u8>> {
    let bytes = match format {
        ExportFormat::Jpg => encode_jpeg(&image.pixels, image.width, image.height, quality)?,
        ExportFormat::Png => encode_png(&image.pixels, image.width, image.height)?,
        ExportFormat::Bmp => encode_bmp(&image.pixels, image.width, image.height)?,
    };
    tracing::debug!(%format, width = image.width, height = image.height, bytes = bytes.len(), "Encoded image");
    Ok(bytes)
}

/// Validate raw RGB input before it reaches a codec.
pub(crate) fn check_rgb(pixels: &[u8], width: u32, height: u32) -> Result<()> {
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
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(ExportFormat::Jpg.extension(), "jpg");
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Bmp.extension(), "bmp");
        assert!(ExportFormat::Jpg.is_lossy());
        assert!(!ExportFormat::Png.is_lossy());
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(ExportFormat::from_extension("JPEG"), Some(ExportFormat::Jpg));
        assert_eq!(ExportFormat::from_extension("png"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_extension("gif"), None);
        assert!("tiff".parse::<ExportFormat>().is_err());
        assert_eq!("BMP".parse::<ExportFormat>().unwrap(), ExportFormat::Bmp);
    }

    #[test]
    fn test_serde_uses_uppercase_tags() {
        assert_eq!(serde_json::to_string(&ExportFormat::Png).unwrap(), "\"PNG\"");
        let format: ExportFormat = serde_json::from_str("\"JPG\"").unwrap();
        assert_eq!(format, ExportFormat::Jpg);
    }

    #[test]
    fn test_encode_each_format() {
        let img = PixelBuffer::filled(8, 6, [10, 200, 30]);
        for format in [ExportFormat::Jpg, ExportFormat::Png, ExportFormat::Bmp] {
            let bytes = encode(&img, format, 90).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (8, 6), "{}", format);
        }
    }

    #[test]
    fn test_encode_rejects_malformed_buffer() {
        let img = PixelBuffer {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        };
        assert!(matches!(
            encode(&img, ExportFormat::Png, 90),
            Err(EditError::InvalidPixelData { .. })
        ));
    }
}
