//! Image decoding for Miflon.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG and BMP images into a [`PixelBuffer`](crate::PixelBuffer)
//! - Applying EXIF orientation so the edited pixels match what the user sees
//! - Loading images straight from disk
//!
//! All inputs are converted to 8-bit RGB. Alpha, if present, is dropped: the
//! editing buffer is always opaque and alpha only appears while compositing
//! watermarks.

mod orientation;
mod reader;

pub use orientation::Orientation;
pub use reader::{decode_image, decode_image_no_orientation, get_orientation, load_image};
