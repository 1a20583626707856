//! Geometric transforms applied when preparing an export: crop and resize.
//!
//! # Transform Order
//!
//! When exporting an image, transforms are applied in this order:
//! 1. Crop (ratio-constrained crop window)
//! 2. Resize (preset width or explicit dimensions)
//!
//! Watermarks may be composited before or after the resize step.
//!
//! # Coordinate System
//!
//! - Crop rectangles and offsets are in source-image pixels
//! - Origin is top-left corner

mod crop;
mod ratio;
mod resize;

pub use crop::{apply_crop, CropWindow};
pub use ratio::{clamp_offset, crop_size, maximal_rect, AspectRatio};
pub use resize::{available_presets, default_preset, resize, ResizePreset, ResizeTarget};
pub(crate) use resize::{area_average, nearest_neighbor};
