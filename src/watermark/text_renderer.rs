//! Text watermark rendering.
//!
//! Renders text with the embedded DejaVu Sans Bold font onto a transparent
//! RGBA canvas, optionally with a blurred drop shadow underneath.
//!
//! # Example
//!
//! ```
//! use gallery_proxy::watermark::text_renderer::{parse_hex_color, render_text, TextRenderOptions};
//!
//! let options = TextRenderOptions {
//!     text: "@MUPICS".to_string(),
//!     font_size: 30.0,
//!     color: parse_hex_color("#FFFFFF").unwrap(),
//!     ..Default::default()
//! };
//!
//! let image = render_text(&options).unwrap();
//! assert!(image.width() > image.height());
//! ```

use super::WatermarkError;
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{imageops, Rgba, RgbaImage};
use std::sync::OnceLock;

use crate::constants::{SHADOW_BLUR_SIGMA, SHADOW_OFFSET, SHADOW_OPACITY};

static DEFAULT_FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();

const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");

fn default_font() -> Result<&'static FontRef<'static>, WatermarkError> {
    DEFAULT_FONT
        .get_or_init(|| FontRef::try_from_slice(EMBEDDED_FONT_DATA).ok())
        .as_ref()
        .ok_or_else(|| WatermarkError::RenderError("Embedded font failed to load".to_string()))
}

/// RGB color parsed from a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    fn with_alpha(self, alpha: f32) -> Rgba<u8> {
        Rgba([
            self.r,
            self.g,
            self.b,
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        ])
    }
}

/// Blurred copy of the glyphs drawn beneath the text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    pub offset_x: i32,
    pub offset_y: i32,
    pub blur_sigma: f32,
    pub color: Color,
    pub opacity: f32,
}

impl Default for DropShadow {
    /// Offset 2px right and down, sigma 2, black at 50%.
    fn default() -> Self {
        Self {
            offset_x: SHADOW_OFFSET,
            offset_y: SHADOW_OFFSET,
            blur_sigma: SHADOW_BLUR_SIGMA,
            color: Color::black(),
            opacity: SHADOW_OPACITY,
        }
    }
}

impl DropShadow {
    /// Room the shadow needs around the text box.
    fn margin(&self) -> u32 {
        let spread = (self.blur_sigma.max(0.0) * 3.0).ceil() as u32;
        spread + self.offset_x.unsigned_abs().max(self.offset_y.unsigned_abs())
    }
}

/// Options for text rendering.
#[derive(Debug, Clone)]
pub struct TextRenderOptions {
    pub text: String,
    /// Font size in pixels
    pub font_size: f32,
    pub color: Color,
    /// Alpha of the glyph fill (0.0 to 1.0)
    pub opacity: f32,
    pub shadow: Option<DropShadow>,
}

impl Default for TextRenderOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 30.0,
            color: Color::white(),
            opacity: 1.0,
            shadow: Some(DropShadow::default()),
        }
    }
}

/// Parse a hex color string (`#RGB` or `#RRGGBB`).
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::RenderError("Color must start with '#'".to_string()))?;

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::RenderError(format!(
            "Invalid hex color '{}'",
            hex
        )));
    }

    let component = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| WatermarkError::RenderError(format!("Invalid hex color '{}'", hex)))
    };

    match digits.len() {
        // #RGB: each digit doubled, 0xF -> 0xFF
        3 => Ok(Color::new(
            component(&digits[0..1])? * 17,
            component(&digits[1..2])? * 17,
            component(&digits[2..3])? * 17,
        )),
        6 => Ok(Color::new(
            component(&digits[0..2])?,
            component(&digits[2..4])?,
            component(&digits[4..6])?,
        )),
        n => Err(WatermarkError::RenderError(format!(
            "Color must be #RGB or #RRGGBB format, got {} characters",
            n
        ))),
    }
}

/// Size of the text box in pixels, without shadow margin.
pub fn measure_text(text: &str, font_size: f32) -> Result<(u32, u32), WatermarkError> {
    let font = default_font()?;
    let scaled_font = font.as_scaled(PxScale::from(font_size));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok((width.ceil().max(1.0) as u32, scaled_font.height().ceil().max(1.0) as u32))
}

/// Draw `text` with its top-left corner at `origin`.
fn draw_glyphs(
    canvas: &mut RgbaImage,
    text: &str,
    font_size: f32,
    fill: Rgba<u8>,
    origin: (f32, f32),
) -> Result<(), WatermarkError> {
    let font = default_font()?;
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);

    let (canvas_width, canvas_height) = canvas.dimensions();
    let baseline_y = origin.1 + scaled_font.ascent();
    let mut cursor_x = origin.0;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x < 0 || y < 0 || x >= canvas_width as i32 || y >= canvas_height as i32 {
                    return;
                }
                let top = Rgba([
                    fill[0],
                    fill[1],
                    fill[2],
                    (coverage.clamp(0.0, 1.0) * fill[3] as f32).round() as u8,
                ]);
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                *pixel = super::compositor::blend_pixels(*pixel, top, 1.0);
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok(())
}

/// Render text to a transparent RGBA image.
///
/// With a shadow the canvas grows by the shadow margin on every side and the
/// text sits in the middle of it.
pub fn render_text(options: &TextRenderOptions) -> Result<RgbaImage, WatermarkError> {
    if options.text.trim().is_empty() {
        return Err(WatermarkError::RenderError(
            "Cannot render empty text".to_string(),
        ));
    }
    if !options.font_size.is_finite() || options.font_size <= 0.0 {
        return Err(WatermarkError::RenderError(format!(
            "Invalid font size {}",
            options.font_size
        )));
    }

    let (text_width, text_height) = measure_text(&options.text, options.font_size)?;
    let margin = options.shadow.map(|s| s.margin()).unwrap_or(0);
    let mut canvas = RgbaImage::new(text_width + 2 * margin, text_height + 2 * margin);
    let origin = (margin as f32, margin as f32);

    if let Some(shadow) = options.shadow {
        let mut shadow_layer = RgbaImage::new(canvas.width(), canvas.height());
        draw_glyphs(
            &mut shadow_layer,
            &options.text,
            options.font_size,
            shadow.color.with_alpha(shadow.opacity),
            (
                origin.0 + shadow.offset_x as f32,
                origin.1 + shadow.offset_y as f32,
            ),
        )?;
        canvas = if shadow.blur_sigma > 0.0 {
            imageops::blur(&shadow_layer, shadow.blur_sigma)
        } else {
            shadow_layer
        };
    }

    draw_glyphs(
        &mut canvas,
        &options.text,
        options.font_size,
        options.color.with_alpha(options.opacity),
        origin,
    )?;

    Ok(canvas)
}
