//! Logo overlay: load, scale to a share of the image width, fade, place.

use std::path::Path;

use image::{imageops, imageops::FilterType, RgbaImage};

use super::Anchor;
use crate::error::{EditError, Result};

/// Load a logo image with its alpha channel.
///
/// # Errors
///
/// Returns `ResourceUnavailable` if the file is missing or not a decodable image.
pub fn load_logo(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .map_err(|e| EditError::resource(format!("logo {}: {}", path.display(), e)))?;
    Ok(img.to_rgba8())
}

/// Decode logo bytes held in memory.
pub fn logo_from_bytes(data: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(data).map_err(|e| EditError::resource(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Scale a logo so its width is `size_percent` of `image_width`, keeping its
/// aspect ratio, and multiply its alpha by `opacity / 100`.
pub(crate) fn prepare_logo(logo: &RgbaImage, image_width: u32, size_percent: u32, opacity: u8) -> RgbaImage {
    let (logo_w, logo_h) = logo.dimensions();
    let target_w = ((image_width as f64 * size_percent as f64 / 100.0).round() as u32).max(1);
    let target_h = ((logo_h as f64 * target_w as f64 / logo_w.max(1) as f64).round() as u32).max(1);

    let mut scaled = if (target_w, target_h) == (logo_w, logo_h) {
        logo.clone()
    } else {
        imageops::resize(logo, target_w, target_h, FilterType::Lanczos3)
    };

    let opacity = opacity.min(100) as u32;
    if opacity < 100 {
        for pixel in scaled.pixels_mut() {
            pixel[3] = ((pixel[3] as u32 * opacity + 50) / 100) as u8;
        }
    }
    scaled
}

/// Composite a prepared logo onto `canvas` at `anchor`.
///
/// The position is clamped so a logo as wide or tall as the canvas stays
/// inside it instead of being pushed off the far edge by the margin.
/// Returns the top-left position used.
pub(crate) fn draw_logo_overlay(
    canvas: &mut RgbaImage,
    logo: &RgbaImage,
    anchor: Anchor,
    margin: u32,
) -> (i64, i64) {
    let (width, height) = canvas.dimensions();
    let (logo_w, logo_h) = logo.dimensions();
    let (x, y) = anchor.position(width, height, logo_w, logo_h, margin);
    let x = x.clamp(0, (width as i64 - logo_w as i64).max(0));
    let y = y.clamp(0, (height as i64 - logo_h as i64).max(0));
    imageops::overlay(canvas, logo, x, y);

    tracing::debug!(x, y, width = logo_w, height = logo_h, ?anchor, "Drew logo overlay");
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_prepare_logo_scales_to_width_share() {
        let logo = RgbaImage::from_pixel(100, 50, Rgba([0, 0, 0, 255]));
        let prepared = prepare_logo(&logo, 400, 25, 100);
        assert_eq!(prepared.dimensions(), (100, 50));

        let prepared = prepare_logo(&logo, 400, 50, 100);
        assert_eq!(prepared.dimensions(), (200, 100));
    }

    #[test]
    fn test_prepare_logo_fades_alpha() {
        let logo = RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 200]));
        let prepared = prepare_logo(&logo, 10, 100, 50);
        assert!(prepared.pixels().all(|p| p[3] == 100));
        assert!(prepared.pixels().all(|p| p[0] == 10));
    }

    #[test]
    fn test_prepare_logo_tiny_width_clamps_to_one() {
        let logo = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let prepared = prepare_logo(&logo, 20, 1, 100);
        assert_eq!(prepared.dimensions(), (1, 1));
    }

    #[test]
    fn test_draw_logo_bottom_right() {
        let mut canvas = RgbaImage::from_pixel(100, 80, Rgba([255, 255, 255, 255]));
        let logo = RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255]));

        let pos = draw_logo_overlay(&mut canvas, &logo, Anchor::BottomRight, 10);
        assert_eq!(pos, (70, 60));
        assert_eq!(canvas.get_pixel(70, 60), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(89, 69), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(90, 70), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(69, 59), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_full_width_logo_is_not_pushed_off_canvas() {
        let mut canvas = RgbaImage::from_pixel(100, 80, Rgba([255, 255, 255, 255]));
        let logo = prepare_logo(&RgbaImage::from_pixel(50, 20, Rgba([0, 0, 0, 255])), 100, 100, 100);
        assert_eq!(logo.dimensions(), (100, 40));

        let pos = draw_logo_overlay(&mut canvas, &logo, Anchor::TopLeft, 10);
        assert_eq!(pos, (0, 10));
        assert_eq!(canvas.get_pixel(99, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 49), &Rgba([0, 0, 0, 255]));

        let mut canvas = RgbaImage::from_pixel(100, 80, Rgba([255, 255, 255, 255]));
        let pos = draw_logo_overlay(&mut canvas, &logo, Anchor::BottomRight, 10);
        assert_eq!(pos, (0, 30));
        assert_eq!(canvas.get_pixel(0, 30), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_logo_taller_than_canvas_pins_to_origin() {
        let mut canvas = RgbaImage::from_pixel(40, 10, Rgba([255, 255, 255, 255]));
        let logo = RgbaImage::from_pixel(20, 30, Rgba([0, 0, 0, 255]));
        let pos = draw_logo_overlay(&mut canvas, &logo, Anchor::BottomLeft, 10);
        assert_eq!(pos, (10, 0));
    }

    #[test]
    fn test_load_logo_missing() {
        assert!(matches!(
            load_logo(Path::new("/nonexistent/logo.png")),
            Err(EditError::ResourceUnavailable(_))
        ));
    }

    #[test]
    fn test_logo_from_png_bytes() {
        let logo = RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 128]));
        let mut bytes = Vec::new();
        logo.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = logo_from_bytes(&bytes).unwrap();
        assert_eq!(decoded, logo);
    }
}
