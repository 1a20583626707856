//! Export pipeline: crop, resize, watermark, encode, name and write.
//!
//! # Pipeline Order
//!
//! 1. Crop with the request's crop window, if any
//! 2. Watermark, when placed before the resize
//! 3. Resize to the requested target, if any
//! 4. Watermark, when placed after the resize (the default)
//! 5. Encode, render the file name, and write atomically
//!
//! Files are written to a temporary file in the target folder and renamed
//! into place, so a failed export never leaves a partial file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::buffer::PixelBuffer;
use crate::encode::{encode, ExportFormat, DEFAULT_JPG_QUALITY};
use crate::error::{EditError, Result};
use crate::naming::{unique_path, FilenameTemplate, NamingContext};
use crate::transform::{resize, CropWindow, ResizeTarget};
use crate::watermark::{apply_watermark, SkippedOverlay, WatermarkSpec};

/// When the watermark is composited relative to the resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkStage {
    BeforeResize,
    #[default]
    AfterResize,
}

/// Everything needed to turn the current image into a file on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub crop: Option<CropWindow>,
    pub resize: Option<ResizeTarget>,
    pub watermark: Option<WatermarkSpec>,
    #[serde(default)]
    pub watermark_stage: WatermarkStage,
    #[serde(default)]
    pub format: ExportFormat,
    pub quality: u8,
    pub folder: PathBuf,
    #[serde(default)]
    pub template: FilenameTemplate,
}

impl ExportRequest {
    /// A plain export of the whole image into `folder`.
    pub fn new(folder: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            crop: None,
            resize: None,
            watermark: None,
            watermark_stage: WatermarkStage::default(),
            format,
            quality: DEFAULT_JPG_QUALITY,
            folder: folder.into(),
            template: FilenameTemplate::default(),
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub skipped: Vec<SkippedOverlay>,
}

/// Run the pixel stages of the pipeline and return the final buffer.
///
/// The input is never modified.
pub fn render_export(
    image: &PixelBuffer,
    request: &ExportRequest,
) -> Result<(PixelBuffer, Vec<SkippedOverlay>)> {
    let mut skipped = Vec::new();

    let mut current = match &request.crop {
        Some(window) => window.apply(image)?,
        None => image.clone(),
    };

    let watermark = request.watermark.as_ref().filter(|spec| !spec.is_empty());

    if request.watermark_stage == WatermarkStage::BeforeResize {
        if let Some(spec) = watermark {
            let mut outcome = apply_watermark(&current, spec)?;
            skipped.append(&mut outcome.skipped);
            current = outcome.image;
        }
    }

    if let Some(target) = request.resize {
        current = resize(&current, target)?;
    }

    if request.watermark_stage == WatermarkStage::AfterResize {
        if let Some(spec) = watermark {
            let mut outcome = apply_watermark(&current, spec)?;
            skipped.append(&mut outcome.skipped);
            current = outcome.image;
        }
    }

    Ok((current, skipped))
}

/// Export `image` to disk.
///
/// `context` supplies `{name}`, the timestamp and the index; width, height and
/// extension are filled in from the final buffer and format.
///
/// # Errors
///
/// Geometry errors from the crop or resize, and `EncodeFailure` when the
/// folder cannot be created or the file cannot be written.
pub fn export(
    image: &PixelBuffer,
    request: &ExportRequest,
    context: &NamingContext,
) -> Result<ExportReport> {
    let (output, skipped) = render_export(image, request)?;
    let bytes = encode(&output, request.format, request.quality)?;

    let context = NamingContext {
        width: output.width,
        height: output.height,
        extension: request.format.extension().to_string(),
        ..context.clone()
    };
    let file_name = request.template.file_name(&context);

    std::fs::create_dir_all(&request.folder).map_err(|e| {
        EditError::encode(format!("cannot create {}: {}", request.folder.display(), e))
    })?;
    let path = unique_path(&request.folder, &file_name);
    write_atomic(&path, &bytes)
        .map_err(|e| EditError::encode(format!("{}: {}", path.display(), e)))?;

    tracing::info!(
        path = %path.display(),
        width = output.width,
        height = output.height,
        format = %request.format,
        "Exported image"
    );

    Ok(ExportReport {
        path,
        width: output.width,
        height: output.height,
        bytes: bytes.len(),
        skipped,
    })
}

/// Write `data` to `path` via a temporary file in the same directory.
///
/// The temporary file is removed if anything fails before the rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
