//! WASM bindings for output file naming.
//!
//! ```typescript
//! const name = render_filename_now('{name}_{date}_{index:03d}', 'holiday', 1280, 720, 'JPG', 4);
//! // "holiday_20240601_004.jpg"
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use crate::types::js_error;
use miflon_core::encode::ExportFormat;
use miflon_core::naming::{sanitize_component, FilenameTemplate, NamingContext};
use wasm_bindgen::prelude::*;

/// Render a complete file name for the given format.
///
/// `timestamp_ms` is milliseconds since the Unix epoch, interpreted as UTC.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn render_filename(
    template: &str,
    name: &str,
    width: u32,
    height: u32,
    format: &str,
    index: u32,
    timestamp_ms: f64,
) -> Result<String, JsValue> {
    let timestamp = DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default();
    file_name(template, name, width, height, format, index, timestamp)
}

/// Render a complete file name stamped with the browser's local time.
#[wasm_bindgen]
pub fn render_filename_now(
    template: &str,
    name: &str,
    width: u32,
    height: u32,
    format: &str,
    index: u32,
) -> Result<String, JsValue> {
    file_name(template, name, width, height, format, index, local_now())
}

/// Replace characters that are illegal in file names with `_`.
#[wasm_bindgen]
pub fn sanitize_filename(raw: &str) -> String {
    sanitize_component(raw)
}

fn local_now() -> NaiveDateTime {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .and_then(|date| date.and_hms_opt(now.get_hours(), now.get_minutes(), now.get_seconds()))
    .unwrap_or_default()
}

fn file_name(
    template: &str,
    name: &str,
    width: u32,
    height: u32,
    format: &str,
    index: u32,
    timestamp: NaiveDateTime,
) -> Result<String, JsValue> {
    let format: ExportFormat = format.parse().map_err(js_error)?;
    let context = NamingContext {
        name: name.to_string(),
        timestamp,
        width,
        height,
        extension: format.extension().to_string(),
        index,
    };
    Ok(FilenameTemplate::from(template).file_name(&context))
}
