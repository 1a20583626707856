//! Miflon Core - Image redaction and export engine
//!
//! This crate provides the editing engine behind Miflon: mapping pointer
//! positions onto image pixels, ratio-constrained cropping, blur and pixelate
//! redaction with feathered masks, resizing, logo and text watermarks, a
//! bounded undo history, and templated file export.
//!
//! Every operation reads one [`PixelBuffer`] and returns a new one; nothing is
//! edited in place. The [`session::Editor`] strings the operations together
//! behind a command interface.

pub mod buffer;
pub mod decode;
pub mod encode;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod naming;
pub mod redact;
pub mod session;
pub mod settings;
pub mod transform;
pub mod watermark;

pub use buffer::{PixelBuffer, Rect};
pub use decode::{decode_image, load_image, Orientation};
pub use encode::{encode, ExportFormat};
pub use error::{EditError, Result};
pub use export::{export, render_export, ExportReport, ExportRequest, WatermarkStage};
pub use geometry::{fit_to_viewport, selection_rect, to_image_space, DisplayLayout, DisplayPoint};
pub use history::{HistoryStack, UndoOutcome};
pub use naming::{FilenameTemplate, NamingContext};
pub use redact::{apply_redaction, EffectKind, EffectSpec, SelectionShape};
pub use session::{CommandOutcome, EditCommand, EditSession, Editor, ImageSource};
pub use settings::Settings;
pub use transform::{
    apply_crop, maximal_rect, resize, AspectRatio, CropWindow, ResizePreset, ResizeTarget,
};
pub use watermark::{apply_watermark, Anchor, SkippedOverlay, WatermarkSpec};
