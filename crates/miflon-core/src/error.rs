//! Error types for the Miflon editing engine.
//!
//! Every fallible core operation returns [`EditError`]. Geometry and parameter
//! errors are raised before any pixel is touched, so a caller that receives an
//! error still holds a valid image and history.

use thiserror::Error;

/// Errors that can occur while editing or exporting an image.
#[derive(Debug, Error)]
pub enum EditError {
    /// A ratio string was malformed, or one of its terms was zero or negative.
    #[error("Invalid aspect ratio '{0}': expected 'original' or 'W:H' with positive terms")]
    InvalidRatio(String),

    /// A selection or crop area is too small to process.
    #[error("Region {width}x{height} is below the minimum editable area")]
    DegenerateRegion { width: u32, height: u32 },

    /// A region does not fit inside the image it is applied to.
    #[error(
        "Region ({x}, {y}, {width}x{height}) exceeds image bounds {image_width}x{image_height}"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// An effect parameter is outside its accepted range.
    #[error("Invalid effect parameter {name} = {value}: {reason}")]
    InvalidEffectParameter {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },

    /// Requested output dimensions are zero or unusable.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match the declared dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// A logo, font or source file could not be read.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Image bytes could not be decoded.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Encoding or writing the output file failed.
    #[error("Encode failed: {0}")]
    EncodeFailure(String),

    /// Settings could not be read, parsed or written.
    #[error("Settings error: {0}")]
    Settings(String),
}

impl EditError {
    /// Creates an encode failure with the given message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeFailure(msg.into())
    }

    /// Creates a resource error with the given message.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Creates a settings error with the given message.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

/// A convenient alias for Result with [`EditError`].
pub type Result<T> = std::result::Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EditError::InvalidRatio("16/9".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid aspect ratio '16/9': expected 'original' or 'W:H' with positive terms"
        );

        let err = EditError::DegenerateRegion {
            width: 1,
            height: 2,
        };
        assert_eq!(err.to_string(), "Region 1x2 is below the minimum editable area");
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            EditError::encode("disk full"),
            EditError::EncodeFailure(msg) if msg == "disk full"
        ));
        assert!(matches!(
            EditError::resource("logo.png"),
            EditError::ResourceUnavailable(_)
        ));
        assert!(matches!(EditError::settings("bad"), EditError::Settings(_)));
    }
}
