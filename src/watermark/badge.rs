//! Generated "@MUPICS"-style badge.
//!
//! A 200x60 rounded rectangle in translucent black with the badge text
//! centered on it in bold white with a drop shadow. Used as the last
//! watermark strategy and written to disk by `generate-watermark`.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use std::path::Path;

use super::compositor::composite;
use super::text_renderer::{measure_text, render_text, Color, TextRenderOptions};
use super::{WatermarkError, WatermarkPosition};
use crate::constants::{BADGE_CORNER_RADIUS, BADGE_FONT_SIZE, BADGE_HEIGHT, BADGE_WIDTH};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 77]); // black at 30%
const TEXT_OPACITY: f32 = 0.9;
const MIN_FONT_SIZE: f32 = 8.0;
// Horizontal room left free of text on each side
const TEXT_INSET: u32 = 8;

/// Render the badge with `text` on it.
pub fn render_badge(text: &str) -> Result<RgbaImage, WatermarkError> {
    let mut badge = rounded_rect(BADGE_WIDTH, BADGE_HEIGHT, BADGE_CORNER_RADIUS, BACKGROUND);

    let options = TextRenderOptions {
        text: text.to_string(),
        font_size: fitted_font_size(text)?,
        color: Color::white(),
        opacity: TEXT_OPACITY,
        ..Default::default()
    };
    let label = render_text(&options)?;
    composite(&mut badge, label, WatermarkPosition::Center, 0, 1.0);

    Ok(badge)
}

/// Largest size up to the badge font size at which `text` fits the badge.
fn fitted_font_size(text: &str) -> Result<f32, WatermarkError> {
    let (width, _) = measure_text(text, BADGE_FONT_SIZE)?;
    let available = BADGE_WIDTH.saturating_sub(2 * TEXT_INSET) as f32;
    if width as f32 <= available {
        return Ok(BADGE_FONT_SIZE);
    }
    Ok((BADGE_FONT_SIZE * available / width as f32).floor().max(MIN_FONT_SIZE))
}

/// Filled rectangle with anti-aliased rounded corners.
fn rounded_rect(width: u32, height: u32, radius: u32, fill: Rgba<u8>) -> RgbaImage {
    let radius = radius.min(width / 2).min(height / 2) as f32;

    if radius == 0.0 {
        return RgbaImage::from_pixel(width, height, fill);
    }

    RgbaImage::from_fn(width, height, |x, y| {
        // Pixel centers
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;

        // Nearest point inside the straight-edged core
        let cx = px.clamp(radius, width as f32 - radius);
        let cy = py.clamp(radius, height as f32 - radius);
        let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();

        let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
        Rgba([
            fill[0],
            fill[1],
            fill[2],
            (fill[3] as f32 * coverage).round() as u8,
        ])
    })
}

/// Encode an RGBA image as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, WatermarkError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(|e| WatermarkError::EncodeError(e.to_string()))?;
    Ok(buffer)
}

/// Render the badge and write it as a PNG file, creating parent directories.
pub fn write_badge(path: &Path, text: &str) -> Result<(), WatermarkError> {
    let write_error = |e: std::io::Error| WatermarkError::WriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let png = encode_png(&render_badge(text)?)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, png).map_err(write_error)?;

    tracing::info!(path = %path.display(), text = text, "Watermark badge written");
    Ok(())
}
