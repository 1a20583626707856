//! Persisted user settings.
//!
//! Settings are stored as pretty-printed JSON with four sections: `crop`,
//! `watermark`, `save` and `app`. Every field has a default, so a partial or
//! older file still loads. Tags such as `"blur"`, `"oval"` or `"JPG"` are
//! plain strings here and are turned into typed values by the accessor
//! methods; [`Settings::sanitized`] repairs anything out of range.
//!
//! Loading is lenient field by field: a negative or fractional number is
//! rounded and saturated into range, and a value of the wrong kind falls
//! back to that field's default instead of rejecting the whole file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::encode::{ExportFormat, DEFAULT_JPG_QUALITY};
use crate::error::{EditError, Result};
use crate::export::write_atomic;
use crate::naming::FilenameTemplate;
use crate::redact::{odd_kernel, EffectSpec, SelectionShape};
use crate::transform::AspectRatio;
use crate::watermark::{Anchor, WatermarkSpec, MAX_TEXT_SIZE_PERCENT};

/// Crop preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropSettings {
    /// `"original"` or `"W:H"`.
    pub ratio: String,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            ratio: "original".to_string(),
        }
    }
}

/// Watermark preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSettings {
    pub enable_text: bool,
    pub enable_logo: bool,
    pub text: String,
    /// 1 to 15.
    pub text_size_percent: u32,
    pub color: [u8; 3],
    /// 0 to 100.
    pub opacity: u32,
    /// Empty when no logo is configured.
    pub logo_path: String,
    /// 1 to 100.
    pub logo_size_percent: u32,
    pub anchor: String,
    /// Empty to use a system font.
    pub font_path: String,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        let spec = WatermarkSpec::default();
        Self {
            enable_text: false,
            enable_logo: false,
            text: String::new(),
            text_size_percent: spec.text_size_percent,
            color: spec.text_color,
            opacity: spec.opacity as u32,
            logo_path: String::new(),
            logo_size_percent: spec.logo_size_percent,
            anchor: spec.anchor.to_string(),
            font_path: String::new(),
        }
    }
}

/// Export preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSettings {
    pub folder: String,
    /// `"JPG"`, `"PNG"` or `"BMP"`.
    pub format: String,
    /// 50 to 100.
    pub jpg_quality: u32,
    pub template: String,
    /// Next value of `{index}`, at least 1.
    pub index: u32,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            folder: String::new(),
            format: ExportFormat::Jpg.to_string(),
            jpg_quality: DEFAULT_JPG_QUALITY as u32,
            template: FilenameTemplate::default().as_str().to_string(),
            index: 1,
        }
    }
}

/// Editing tool preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// `"blur"` or `"pixel"`.
    pub effect_type: String,
    /// `"rectangle"` or `"oval"`.
    pub selection_type: String,
    /// Odd, 3 to 99.
    pub blur_value: u32,
    /// 2 to 50.
    pub pixel_value: u32,
    /// 0 to 50.
    pub feather_value: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            effect_type: "blur".to_string(),
            selection_type: "oval".to_string(),
            blur_value: 19,
            pixel_value: 7,
            feather_value: 0,
        }
    }
}

/// All persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crop: CropSettings,
    pub watermark: WatermarkSettings,
    pub save: SaveSettings,
    pub app: AppSettings,
}

fn clamp_field(name: &str, value: u32, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        tracing::warn!(field = name, value, clamped, "Setting out of range, clamped");
    }
    clamped
}

fn default_tag(name: &str, value: &str, valid: bool, fallback: String) -> String {
    if valid {
        value.to_string()
    } else {
        tracing::warn!(field = name, value, fallback = %fallback, "Unknown setting value, using default");
        fallback
    }
}

/// Make a parsed settings document match the schema of `defaults`.
///
/// Unknown sections and fields are left for serde to ignore. Fields whose
/// value cannot be coerced are removed so `#[serde(default)]` fills them.
fn coerce_document(document: &mut Value, defaults: &Value) {
    let (Value::Object(sections), Value::Object(default_sections)) = (document, defaults) else {
        return;
    };
    sections.retain(|section, fields| {
        let Some(Value::Object(default_fields)) = default_sections.get(section) else {
            return true;
        };
        match fields {
            Value::Object(fields) => {
                coerce_section(section, fields, default_fields);
                true
            }
            _ => {
                tracing::warn!(section = %section, "Settings section is not an object, using defaults");
                false
            }
        }
    });
}

fn coerce_section(section: &str, fields: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    fields.retain(|name, value| {
        let Some(expected) = defaults.get(name) else {
            return true;
        };
        let keep = coerce_value(value, expected);
        if !keep {
            tracing::warn!(field = %format!("{}.{}", section, name), %value, "Setting has the wrong type, using default");
        }
        keep
    });
}

/// Coerce `value` to the kind of `expected` in place. Returns `false` when
/// that is not possible.
fn coerce_value(value: &mut Value, expected: &Value) -> bool {
    match expected {
        Value::Number(_) => match saturating_number(value, u32::MAX as f64) {
            Some(n) => {
                *value = Value::from(n as u32);
                true
            }
            None => false,
        },
        Value::Array(items) => {
            let Value::Array(actual) = value else {
                return false;
            };
            if actual.len() != items.len() {
                return false;
            }
            let coerced: Option<Vec<Value>> = actual
                .iter()
                .map(|item| saturating_number(item, u8::MAX as f64).map(|n| Value::from(n as u8)))
                .collect();
            match coerced {
                Some(coerced) => {
                    *actual = coerced;
                    true
                }
                None => false,
            }
        }
        Value::Bool(_) => value.is_boolean(),
        Value::String(_) => value.is_string(),
        _ => true,
    }
}

/// A finite number rounded and clamped into `[0, max]`.
fn saturating_number(value: &Value, max: f64) -> Option<f64> {
    let n = value.as_f64().filter(|n| n.is_finite())?;
    let clamped = n.round().clamp(0.0, max);
    if clamped != n {
        tracing::warn!(value = n, clamped, "Setting number adjusted");
    }
    Some(clamped)
}

impl Settings {
    /// Load settings from `path`, or defaults if the file does not exist.
    ///
    /// The result is always [`sanitized`](Self::sanitized).
    ///
    /// # Errors
    ///
    /// Returns `Settings` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| EditError::settings(format!("read {}: {}", path.display(), e)))?;
        let settings = Self::from_json(&content)
            .map_err(|e| EditError::settings(format!("parse {}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), "Loaded settings");
        Ok(settings.sanitized())
    }

    /// Parse a settings document, coercing fields that do not fit the schema.
    ///
    /// The result is not sanitized.
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let mut document: Value = serde_json::from_str(content)?;
        let defaults = serde_json::to_value(Settings::default())?;
        coerce_document(&mut document, &defaults);
        serde_json::from_value(document)
    }

    /// Write settings to `path` atomically, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EditError::settings(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| EditError::settings(format!("create {}: {}", parent.display(), e)))?;
        }
        write_atomic(path, json.as_bytes())
            .map_err(|e| EditError::settings(format!("write {}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Return a copy with every numeric field clamped into range and every
    /// unknown tag replaced by its default.
    pub fn sanitized(&self) -> Self {
        let defaults = Settings::default();
        let mut s = self.clone();

        s.crop.ratio = default_tag(
            "crop.ratio",
            &s.crop.ratio,
            s.crop.ratio.parse::<AspectRatio>().is_ok(),
            defaults.crop.ratio,
        );

        let wm = &mut s.watermark;
        wm.text_size_percent =
            clamp_field("watermark.text_size_percent", wm.text_size_percent, 1, MAX_TEXT_SIZE_PERCENT);
        wm.opacity = clamp_field("watermark.opacity", wm.opacity, 0, 100);
        wm.logo_size_percent = clamp_field("watermark.logo_size_percent", wm.logo_size_percent, 1, 100);
        wm.anchor = default_tag(
            "watermark.anchor",
            &wm.anchor,
            wm.anchor.parse::<Anchor>().is_ok(),
            defaults.watermark.anchor,
        );

        let save = &mut s.save;
        save.format = default_tag(
            "save.format",
            &save.format,
            save.format.parse::<ExportFormat>().is_ok(),
            defaults.save.format,
        );
        save.jpg_quality = clamp_field("save.jpg_quality", save.jpg_quality, 50, 100);
        save.index = clamp_field("save.index", save.index, 1, u32::MAX);

        let app = &mut s.app;
        app.effect_type = default_tag(
            "app.effect_type",
            &app.effect_type,
            matches!(app.effect_type.as_str(), "blur" | "pixel"),
            defaults.app.effect_type,
        );
        app.selection_type = default_tag(
            "app.selection_type",
            &app.selection_type,
            matches!(app.selection_type.as_str(), "rectangle" | "oval"),
            defaults.app.selection_type,
        );
        app.blur_value = odd_kernel(clamp_field("app.blur_value", app.blur_value, 3, 99));
        app.pixel_value = clamp_field("app.pixel_value", app.pixel_value, 2, 50);
        app.feather_value = clamp_field("app.feather_value", app.feather_value, 0, 50);

        s
    }

    /// Crop ratio.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRatio` if the stored ratio does not parse.
    pub fn crop_ratio(&self) -> Result<AspectRatio> {
        self.crop.ratio.parse()
    }

    /// Current redaction effect, including feathering.
    pub fn effect(&self) -> EffectSpec {
        match self.app.effect_type.as_str() {
            "pixel" => EffectSpec::pixelate(self.app.pixel_value, self.app.feather_value),
            _ => EffectSpec::blur(self.app.blur_value, self.app.feather_value),
        }
    }

    pub fn selection_shape(&self) -> SelectionShape {
        match self.app.selection_type.as_str() {
            "rectangle" => SelectionShape::Rectangle,
            _ => SelectionShape::Ellipse,
        }
    }

    /// Watermark spec with only the enabled overlays present.
    pub fn watermark_spec(&self) -> WatermarkSpec {
        let wm = &self.watermark;
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());

        WatermarkSpec {
            text: if wm.enable_text { non_empty(&wm.text) } else { None },
            text_size_percent: wm.text_size_percent,
            text_color: wm.color,
            logo_path: if wm.enable_logo {
                non_empty(&wm.logo_path).map(PathBuf::from)
            } else {
                None
            },
            logo_size_percent: wm.logo_size_percent,
            opacity: wm.opacity.min(100) as u8,
            anchor: wm.anchor.parse().unwrap_or_default(),
            font_path: non_empty(&wm.font_path).map(PathBuf::from),
        }
    }

    /// Export format, JPG if the stored tag is unknown.
    pub fn export_format(&self) -> ExportFormat {
        self.save.format.parse().unwrap_or_default()
    }

    pub fn jpg_quality(&self) -> u8 {
        self.save.jpg_quality.min(100) as u8
    }

    pub fn template(&self) -> FilenameTemplate {
        FilenameTemplate::from(self.save.template.as_str())
    }

    /// Export folder; the current directory when unset.
    pub fn save_folder(&self) -> PathBuf {
        if self.save.folder.trim().is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.save.folder)
        }
    }

    /// Advance the save counter after a successful export.
    pub fn record_save(&mut self) {
        self.save.index = self.save.index.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redact::EffectKind;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.crop_ratio().unwrap(), AspectRatio::Original);
        assert_eq!(s.effect(), EffectSpec::blur(19, 0));
        assert_eq!(s.selection_shape(), SelectionShape::Ellipse);
        assert_eq!(s.export_format(), ExportFormat::Jpg);
        assert_eq!(s.jpg_quality(), 95);
        assert_eq!(s.save.index, 1);
        assert!(s.watermark_spec().is_empty());
        assert_eq!(s.sanitized(), s);
    }

    #[test]
    fn test_partial_json_loads_with_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"app": {"effect_type": "pixel"}, "save": {"index": 42}}"#)
                .unwrap();
        assert_eq!(s.app.effect_type, "pixel");
        assert_eq!(s.app.pixel_value, 7);
        assert_eq!(s.save.index, 42);
        assert_eq!(s.crop.ratio, "original");
        assert_eq!(s.effect().kind, EffectKind::Pixelate);
    }

    #[test]
    fn test_sanitized_clamps_and_repairs() {
        let mut s = Settings::default();
        s.crop.ratio = "16/9".to_string();
        s.watermark.text_size_percent = 40;
        s.watermark.opacity = 250;
        s.watermark.anchor = "middle".to_string();
        s.save.format = "GIF".to_string();
        s.save.jpg_quality = 10;
        s.save.index = 0;
        s.app.effect_type = "swirl".to_string();
        s.app.blur_value = 20;
        s.app.pixel_value = 1;
        s.app.feather_value = 80;

        let s = s.sanitized();
        assert_eq!(s.crop.ratio, "original");
        assert_eq!(s.watermark.text_size_percent, 15);
        assert_eq!(s.watermark.opacity, 100);
        assert_eq!(s.watermark.anchor, "bottom-right");
        assert_eq!(s.save.format, "JPG");
        assert_eq!(s.save.jpg_quality, 50);
        assert_eq!(s.save.index, 1);
        assert_eq!(s.app.effect_type, "blur");
        assert_eq!(s.app.blur_value, 21);
        assert_eq!(s.app.pixel_value, 2);
        assert_eq!(s.app.feather_value, 50);
    }

    #[test]
    fn test_watermark_spec_respects_enable_flags() {
        let mut s = Settings::default();
        s.watermark.text = "(c) me".to_string();
        s.watermark.logo_path = "/tmp/logo.png".to_string();
        s.watermark.anchor = "top-left".to_string();
        assert!(s.watermark_spec().is_empty());

        s.watermark.enable_text = true;
        s.watermark.enable_logo = true;
        let spec = s.watermark_spec();
        assert_eq!(spec.text(), Some("(c) me"));
        assert_eq!(spec.logo_path, Some(PathBuf::from("/tmp/logo.png")));
        assert_eq!(spec.anchor, Anchor::TopLeft);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not-json").unwrap();
        assert!(matches!(Settings::load(&path), Err(EditError::Settings(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut s = Settings::default();
        s.crop.ratio = "4:3".to_string();
        s.save.format = "PNG".to_string();
        s.record_save();
        s.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.save.index, 2);
        assert_eq!(loaded.export_format(), ExportFormat::Png);
    }

    #[test]
    fn test_load_sanitizes_hand_edited_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"app": {"blur_value": 1000}}"#).unwrap();

        let s = Settings::load(&path).unwrap();
        assert_eq!(s.app.blur_value, 99);
    }

    #[test]
    fn test_load_coerces_bad_numbers_field_by_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "watermark": {"opacity": -20, "text_size_percent": 7.6, "color": [300, -1, 12.4], "text": "kept"},
                "save": {"index": 12.2, "jpg_quality": "high", "format": "PNG"},
                "app": {"pixel_value": 1e12, "feather_value": null, "effect_type": "pixel"}
            }"#,
        )
        .unwrap();

        let s = Settings::load(&path).unwrap();
        assert_eq!(s.watermark.opacity, 0);
        assert_eq!(s.watermark.text_size_percent, 8);
        assert_eq!(s.watermark.color, [255, 0, 12]);
        assert_eq!(s.watermark.text, "kept");
        assert_eq!(s.save.index, 12);
        assert_eq!(s.save.jpg_quality, DEFAULT_JPG_QUALITY as u32);
        assert_eq!(s.save.format, "PNG");
        assert_eq!(s.app.pixel_value, 50);
        assert_eq!(s.app.feather_value, 0);
        assert_eq!(s.app.effect_type, "pixel");
    }

    #[test]
    fn test_from_json_drops_wrong_kinds() {
        let s = Settings::from_json(
            r#"{"crop": 5, "watermark": {"enable_text": "yes", "color": [1, 2], "anchor": 3}, "extra": true}"#,
        )
        .unwrap();
        assert_eq!(s.crop, CropSettings::default());
        assert!(!s.watermark.enable_text);
        assert_eq!(s.watermark.color, WatermarkSettings::default().color);
        assert_eq!(s.watermark.anchor, "bottom-right");
    }

    #[test]
    fn test_from_json_rejects_non_object_document() {
        assert!(Settings::from_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_save_folder_default() {
        let mut s = Settings::default();
        assert_eq!(s.save_folder(), PathBuf::from("."));
        s.save.folder = "/exports".to_string();
        assert_eq!(s.save_folder(), PathBuf::from("/exports"));
    }
}
