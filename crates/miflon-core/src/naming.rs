//! Output file naming from a placeholder template.
//!
//! # Placeholders
//!
//! | Placeholder    | Value                                   |
//! |----------------|-----------------------------------------|
//! | `{name}`       | source file stem                        |
//! | `{date}`       | `YYYYMMDD`                              |
//! | `{time}`       | `HHMMSS`                                |
//! | `{w}` / `{h}`  | output width / height in pixels         |
//! | `{ext}`        | output extension without the dot        |
//! | `{index}`      | save counter, unpadded                  |
//! | `{index:0Nd}`  | save counter zero-padded to N (1 to 32) |
//!
//! Anything else in braces is copied through unchanged.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Stem used when a template renders to nothing.
pub const FALLBACK_STEM: &str = "image";

/// Extensions stripped from a rendered stem before the real one is appended.
const KNOWN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Widest zero padding `{index:0Nd}` accepts.
const MAX_INDEX_WIDTH: usize = 32;

/// Values available to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub name: String,
    pub timestamp: NaiveDateTime,
    pub width: u32,
    pub height: u32,
    pub extension: String,
    pub index: u32,
}

impl NamingContext {
    /// Context for a source file, using its stem as `{name}`.
    pub fn for_source(source: &Path, timestamp: NaiveDateTime) -> Self {
        let name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            timestamp,
            width: 0,
            height: 0,
            extension: String::new(),
            index: 1,
        }
    }
}

/// A naming pattern, persisted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilenameTemplate(String);

impl Default for FilenameTemplate {
    fn default() -> Self {
        Self("{name}_{index:03d}".to_string())
    }
}

impl From<&str> for FilenameTemplate {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FilenameTemplate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FilenameTemplate {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute placeholders. The result is not sanitized.
    pub fn render(&self, ctx: &NamingContext) -> String {
        let mut out = String::with_capacity(self.0.len() + 16);
        let mut rest = self.0.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                // Unterminated brace: copy the remainder as-is
                out.push_str(&rest[open..]);
                return out;
            };

            let token = &after[..close];
            match expand(token, ctx) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('{');
                    out.push_str(token);
                    out.push('}');
                }
            }
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        out
    }

    /// Render a complete file name: sanitized stem plus `.extension`.
    ///
    /// A known image extension the user typed into the template is removed
    /// first, so `"{name}.png"` exported as JPG becomes `name.jpg`.
    pub fn file_name(&self, ctx: &NamingContext) -> String {
        let rendered = self.render(ctx);
        let stem = sanitize_component(strip_known_extension(rendered.trim()));
        let stem = if stem.is_empty() {
            FALLBACK_STEM.to_string()
        } else {
            stem
        };

        if ctx.extension.is_empty() {
            stem
        } else {
            format!("{}.{}", stem, ctx.extension)
        }
    }
}

fn expand(token: &str, ctx: &NamingContext) -> Option<String> {
    match token {
        "name" => Some(ctx.name.clone()),
        "date" => Some(ctx.timestamp.format("%Y%m%d").to_string()),
        "time" => Some(ctx.timestamp.format("%H%M%S").to_string()),
        "w" => Some(ctx.width.to_string()),
        "h" => Some(ctx.height.to_string()),
        "ext" => Some(ctx.extension.clone()),
        "index" => Some(ctx.index.to_string()),
        _ => {
            let digits = token.strip_prefix("index:0")?.strip_suffix('d')?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let width = digits
                .parse::<usize>()
                .ok()
                .filter(|w| (1..=MAX_INDEX_WIDTH).contains(w))?;
            Some(format!("{:0width$}", ctx.index, width = width))
        }
    }
}

fn strip_known_extension(stem: &str) -> &str {
    if let Some((base, ext)) = stem.rsplit_once('.') {
        if KNOWN_EXTENSIONS.iter().any(|k| ext.eq_ignore_ascii_case(k)) {
            return base;
        }
    }
    stem
}

/// Replace characters that are illegal in a path component with `_`.
///
/// Covers `< > : " / \ | ? *` and control characters. Trailing dots and
/// spaces are trimmed.
pub fn sanitize_component(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    replaced.trim_end_matches(['.', ' ']).to_string()
}

/// Return `dir/file_name`, or `dir/stem_N.ext` with the smallest free `N`
/// when the name is taken.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    (1u32..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{}_{}.{}", stem, n, ext)),
            None => dir.join(format!("{}_{}", stem, n)),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    proptest! {
        /// Property: Whatever the template, the file name is a single
        /// non-empty path component ending in the format extension.
        #[test]
        fn prop_file_name_is_safe_component(
            template in ".{0,40}",
            name in ".{0,20}",
            index in 0u32..100_000,
        ) {
            let ctx = NamingContext {
                name,
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                width: 10,
                height: 10,
                extension: "png".to_string(),
                index,
            };
            let file_name = FilenameTemplate::from(template).file_name(&ctx);

            prop_assert!(file_name.ends_with(".png"));
            prop_assert!(file_name.len() > ".png".len());
            prop_assert!(!file_name.contains('/'));
            prop_assert!(!file_name.contains('\\'));
        }

        /// Property: Padded index always has at least N digits and parses back.
        #[test]
        fn prop_padded_index(width in 1usize..=MAX_INDEX_WIDTH, index in 0u32..1_000_000) {
            let template = FilenameTemplate::from(format!("{{index:0{}d}}", width));
            let ctx = NamingContext {
                name: String::new(),
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                width: 0,
                height: 0,
                extension: String::new(),
                index,
            };
            let rendered = template.render(&ctx);
            prop_assert!(rendered.len() >= width);
            prop_assert_eq!(rendered.parse::<u32>().unwrap(), index);
        }
    }
}
