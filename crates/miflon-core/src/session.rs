//! Command-driven editing session.
//!
//! An [`Editor`] owns the working image (as the current entry of its
//! [`HistoryStack`]) and an [`EditSession`] holding every parameter the
//! commands need. The UI never mutates pixels directly; it builds an
//! [`EditCommand`] and hands it to [`Editor::apply`], which runs it to
//! completion. A command that fails leaves the image and history untouched.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, Rect};
use crate::decode::{decode_image, load_image};
use crate::encode::{ExportFormat, DEFAULT_JPG_QUALITY};
use crate::error::{EditError, Result};
use crate::export::{export, ExportReport, ExportRequest, WatermarkStage};
use crate::geometry::{selection_rect, DisplayLayout, DisplayPoint};
use crate::history::{HistoryStack, UndoOutcome, DEFAULT_HISTORY_DEPTH};
use crate::naming::{FilenameTemplate, NamingContext, FALLBACK_STEM};
use crate::redact::{apply_redaction, EffectKind, EffectSpec, SelectionShape};
use crate::settings::Settings;
use crate::transform::{AspectRatio, CropWindow, ResizeTarget};
use crate::watermark::{apply_watermark, SkippedOverlay, WatermarkSpec};

/// Export parameters carried by a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOptions {
    pub folder: PathBuf,
    pub format: ExportFormat,
    pub quality: u8,
    pub template: FilenameTemplate,
    /// Value of `{index}` for the next export.
    pub index: u32,
    pub resize: Option<ResizeTarget>,
    /// Watermark the exported file, and at which stage. `None` exports the
    /// working image as-is.
    pub watermark_stage: Option<WatermarkStage>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            format: ExportFormat::Jpg,
            quality: DEFAULT_JPG_QUALITY,
            template: FilenameTemplate::default(),
            index: 1,
            resize: None,
            watermark_stage: None,
        }
    }
}

/// All editing parameters, independent of any UI toolkit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditSession {
    pub effect: EffectSpec,
    pub shape: SelectionShape,
    pub ratio: AspectRatio,
    /// Crop window for the current image; `None` until an image is loaded.
    pub crop: Option<CropWindow>,
    pub watermark: WatermarkSpec,
    pub save: SaveOptions,
}

impl EditSession {
    /// Build a session from persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRatio` if the stored crop ratio does not parse.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let watermark = settings.watermark_spec();
        let watermark_stage = (!watermark.is_empty()).then_some(WatermarkStage::AfterResize);

        Ok(Self {
            effect: settings.effect(),
            shape: settings.selection_shape(),
            ratio: settings.crop_ratio()?,
            crop: None,
            watermark,
            save: SaveOptions {
                folder: settings.save_folder(),
                format: settings.export_format(),
                quality: settings.jpg_quality(),
                template: settings.template(),
                index: settings.save.index,
                resize: None,
                watermark_stage,
            },
        })
    }

    /// Copy the session's tool choices and save counter back into `settings`.
    pub fn store_into(&self, settings: &mut Settings) {
        settings.crop.ratio = String::from(self.ratio);

        let app = &mut settings.app;
        match self.effect.kind {
            EffectKind::Blur => {
                app.effect_type = "blur".to_string();
                app.blur_value = self.effect.strength;
            }
            EffectKind::Pixelate => {
                app.effect_type = "pixel".to_string();
                app.pixel_value = self.effect.strength;
            }
        }
        app.feather_value = self.effect.feather_radius;
        app.selection_type = match self.shape {
            SelectionShape::Rectangle => "rectangle",
            SelectionShape::Ellipse => "oval",
        }
        .to_string();

        settings.save.index = self.save.index;
    }

    /// Switch the crop ratio. The crop window, if any, is re-centered.
    pub fn set_ratio(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
        if let Some(window) = self.crop.as_mut() {
            window.set_ratio(ratio);
        }
    }
}

/// Where a `Load` command reads its image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// Encoded bytes plus the name used for `{name}`.
    Bytes { name: String, data: Vec<u8> },
}

/// A single user-triggered operation.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    Load(ImageSource),
    /// Redact an image-space region with the session effect and shape.
    Redact { region: Rect },
    /// Redact the region dragged out between two viewport points.
    RedactSelection {
        start: DisplayPoint,
        end: DisplayPoint,
        layout: DisplayLayout,
    },
    /// Replace the working image with the crop window's contents.
    Crop,
    /// Burn the session watermark into the working image.
    Watermark,
    Undo,
    /// Export the working image; `timestamp` feeds `{date}` and `{time}`.
    Export { timestamp: NaiveDateTime },
}

/// What a successful command did.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Loaded { width: u32, height: u32 },
    /// A new snapshot was pushed.
    Edited,
    /// The command had nothing to change.
    Unchanged,
    Watermarked { skipped: Vec<SkippedOverlay> },
    Undone,
    NothingToUndo,
    Exported(ExportReport),
}

/// Working image, undo history and session parameters.
#[derive(Debug, Clone)]
pub struct Editor {
    history: HistoryStack,
    session: EditSession,
    source_name: String,
    /// Settings file the save counter is written back to.
    settings_path: Option<PathBuf>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditSession::default())
    }
}

impl Editor {
    pub fn new(session: EditSession) -> Self {
        Self::with_depth(session, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_depth(session: EditSession, max_depth: usize) -> Self {
        Self {
            history: HistoryStack::new(max_depth),
            session,
            source_name: String::new(),
            settings_path: None,
        }
    }

    /// Editor whose session is read from the settings file at `path`.
    ///
    /// After every successful export the save counter is written back to
    /// that file, so numbering continues across editors and restarts.
    ///
    /// # Errors
    ///
    /// Returns `Settings` if the file exists but cannot be read or parsed, or
    /// `InvalidRatio` if its crop ratio does not parse.
    pub fn from_settings_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Settings::load(&path)?;
        let mut editor = Self::new(EditSession::from_settings(&settings)?);
        editor.settings_path = Some(path);
        Ok(editor)
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    /// Write the session's tool choices and save counter to the settings file.
    ///
    /// Sections the session does not own are kept as they are on disk. Does
    /// nothing for an editor without a settings file.
    pub fn save_settings(&self) -> Result<()> {
        let Some(path) = &self.settings_path else {
            return Ok(());
        };
        let mut settings = Settings::load(path)?;
        self.session.store_into(&mut settings);
        settings.save(path)
    }

    /// The working image, if one is loaded.
    pub fn image(&self) -> Option<&PixelBuffer> {
        self.history.current()
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Move the crop window by a delta in image pixels.
    pub fn drag_crop(&mut self, dx: i64, dy: i64) {
        if let Some(window) = self.session.crop.as_mut() {
            window.drag(dx, dy);
        }
    }

    /// Run one command.
    pub fn apply(&mut self, command: EditCommand) -> Result<CommandOutcome> {
        match command {
            EditCommand::Load(source) => self.load(source),
            EditCommand::Redact { region } => self.redact(&region),
            EditCommand::RedactSelection { start, end, layout } => {
                let image = self.require_image()?;
                let region = selection_rect(start, end, &layout, image.width, image.height)
                    .ok_or(EditError::DegenerateRegion {
                        width: 0,
                        height: 0,
                    })?;
                self.redact(&region)
            }
            EditCommand::Crop => self.crop(),
            EditCommand::Watermark => self.watermark(),
            EditCommand::Undo => Ok(self.undo()),
            EditCommand::Export { timestamp } => self.export(timestamp),
        }
    }

    fn require_image(&self) -> Result<&PixelBuffer> {
        self.history
            .current()
            .ok_or_else(|| EditError::resource("no image loaded"))
    }

    fn load(&mut self, source: ImageSource) -> Result<CommandOutcome> {
        let (image, name) = match source {
            ImageSource::Path(path) => {
                let image = load_image(&path)?;
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (image, name)
            }
            ImageSource::Bytes { name, data } => (decode_image(&data)?, name),
        };

        self.history.clear();
        self.history.push(&image);
        self.source_name = name;
        self.session.crop = Some(CropWindow::new(self.session.ratio, image.width, image.height));

        tracing::debug!(
            name = %self.source_name,
            width = image.width,
            height = image.height,
            "Loaded image into session"
        );
        Ok(CommandOutcome::Loaded {
            width: image.width,
            height: image.height,
        })
    }

    fn redact(&mut self, region: &Rect) -> Result<CommandOutcome> {
        let image = self.require_image()?;
        let edited = apply_redaction(image, region, &self.session.effect, self.session.shape)?;
        self.history.push(&edited);
        Ok(CommandOutcome::Edited)
    }

    fn crop(&mut self) -> Result<CommandOutcome> {
        let image = self.require_image()?;
        let window = self
            .session
            .crop
            .unwrap_or_else(|| CropWindow::new(self.session.ratio, image.width, image.height));
        if window.rect() == image.bounds() {
            return Ok(CommandOutcome::Unchanged);
        }

        let cropped = window.apply(image)?;
        self.history.push(&cropped);
        self.track_image_size();
        Ok(CommandOutcome::Edited)
    }

    fn watermark(&mut self) -> Result<CommandOutcome> {
        let image = self.require_image()?;
        if self.session.watermark.is_empty() {
            return Ok(CommandOutcome::Unchanged);
        }

        let outcome = apply_watermark(image, &self.session.watermark)?;
        if outcome.image != *image {
            self.history.push(&outcome.image);
        }
        Ok(CommandOutcome::Watermarked {
            skipped: outcome.skipped,
        })
    }

    fn undo(&mut self) -> CommandOutcome {
        if let UndoOutcome::NothingToUndo = self.history.undo() {
            return CommandOutcome::NothingToUndo;
        }
        self.track_image_size();
        CommandOutcome::Undone
    }

    fn export(&mut self, timestamp: NaiveDateTime) -> Result<CommandOutcome> {
        let index = self.next_index();
        let image = self.require_image()?;
        let save = &self.session.save;

        let request = ExportRequest {
            crop: self.session.crop.filter(|w| !w.ratio().is_original()),
            resize: save.resize,
            watermark: save.watermark_stage.map(|_| self.session.watermark.clone()),
            watermark_stage: save.watermark_stage.unwrap_or_default(),
            format: save.format,
            quality: save.quality,
            folder: save.folder.clone(),
            template: save.template.clone(),
        };

        let name = if self.source_name.is_empty() {
            FALLBACK_STEM.to_string()
        } else {
            self.source_name.clone()
        };
        let context = NamingContext {
            name,
            timestamp,
            width: 0,
            height: 0,
            extension: String::new(),
            index,
        };

        let report = export(image, &request, &context)?;
        self.session.save.index = index.saturating_add(1);
        self.persist_index();
        Ok(CommandOutcome::Exported(report))
    }

    /// Index for the next export: the session's, or the stored counter if
    /// another editor has moved it further.
    fn next_index(&self) -> u32 {
        let session_index = self.session.save.index;
        let Some(path) = &self.settings_path else {
            return session_index;
        };
        match Settings::load(path) {
            Ok(stored) => stored.save.index.max(session_index),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read save counter, using session value");
                session_index
            }
        }
    }

    /// Write the advanced save counter back to the settings file.
    ///
    /// The export already succeeded, so a failure here is logged, not returned.
    fn persist_index(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        let result = Settings::load(path).and_then(|mut settings| {
            settings.save.index = self.session.save.index;
            settings.save(path)
        });
        match result {
            Ok(()) => tracing::debug!(index = self.session.save.index, "Persisted save counter"),
            Err(e) => tracing::warn!(error = %e, "Could not persist save counter"),
        }
    }

    /// Keep the crop window in step with the working image's dimensions.
    fn track_image_size(&mut self) {
        let Some((width, height)) = self.history.current().map(|b| (b.width, b.height)) else {
            return;
        };
        match self.session.crop.as_mut() {
            Some(window) => {
                let (max_x, max_y) = window.max_offset();
                let current = window.rect();
                if current.width + max_x != width || current.height + max_y != height {
                    window.resize_image(width, height);
                }
            }
            None => self.session.crop = Some(CropWindow::new(self.session.ratio, width, height)),
        }
    }
}
