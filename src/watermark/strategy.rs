//! Watermark strategies and the fallback chain.
//!
//! A strategy turns the configuration into a watermark raster sized for one
//! source image. Strategies are tried in order and the first one that
//! produces a raster wins:
//!
//! - image mode: asset file, then generated badge
//! - text mode: configured text, then generated badge

use image::imageops::FilterType;
use image::RgbaImage;
use std::path::PathBuf;

use super::badge::render_badge;
use super::config::{TextWatermarkConfig, WatermarkDefinition};
use super::position::ImageDimensions;
use super::text_renderer::{parse_hex_color, render_text, DropShadow, TextRenderOptions};
use super::WatermarkError;
use crate::constants::{DEFAULT_WATERMARK_SCALE, MIN_FONT_SIZE_RATIO};

/// One way of producing a watermark raster.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkStrategy {
    /// PNG (or any decodable image) on disk, scaled to a fraction of the source width
    AssetFile { path: PathBuf, scale: f32 },
    /// Text rendered with the embedded font
    Text(TextWatermarkConfig),
    /// Generated badge, scaled like an asset
    Badge { text: String, scale: f32 },
}

impl WatermarkStrategy {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssetFile { .. } => "asset_file",
            Self::Text(_) => "text",
            Self::Badge { .. } => "badge",
        }
    }

    /// Produce the watermark raster for a source of `image` dimensions.
    pub fn render(&self, image: &ImageDimensions) -> Result<RgbaImage, WatermarkError> {
        match self {
            Self::AssetFile { path, scale } => {
                let bytes = std::fs::read(path).map_err(|e| WatermarkError::AssetError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                let asset = image::load_from_memory(&bytes)
                    .map_err(|e| WatermarkError::DecodeError(e.to_string()))?
                    .to_rgba8();
                scale_to_width(&asset, image.width, *scale)
            }
            Self::Text(config) => render_configured_text(config, image),
            Self::Badge { text, scale } => {
                let badge = render_badge(text)?;
                scale_to_width(&badge, image.width, *scale)
            }
        }
    }
}

/// Build the ordered chain for a watermark definition.
pub fn strategy_chain(
    definition: &WatermarkDefinition,
    badge_text: &str,
) -> Vec<WatermarkStrategy> {
    match definition {
        WatermarkDefinition::Image(config) => vec![
            WatermarkStrategy::AssetFile {
                path: config.path.clone(),
                scale: config.scale,
            },
            WatermarkStrategy::Badge {
                text: badge_text.to_string(),
                scale: config.scale,
            },
        ],
        WatermarkDefinition::Text(config) => vec![
            WatermarkStrategy::Text(config.clone()),
            WatermarkStrategy::Badge {
                text: badge_text.to_string(),
                scale: DEFAULT_WATERMARK_SCALE,
            },
        ],
    }
}

/// Resize `watermark` to `round(scale * target_width)` wide, keeping its aspect ratio.
pub fn scale_to_width(
    watermark: &RgbaImage,
    target_width: u32,
    scale: f32,
) -> Result<RgbaImage, WatermarkError> {
    let (src_w, src_h) = watermark.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(WatermarkError::DecodeError(
            "Watermark image has zero size".to_string(),
        ));
    }

    let width = ((scale as f64) * target_width as f64).round().max(1.0) as u32;
    let height = ((width as f64) * src_h as f64 / src_w as f64).round().max(1.0) as u32;

    if (width, height) == (src_w, src_h) {
        return Ok(watermark.clone());
    }
    Ok(image::imageops::resize(watermark, width, height, FilterType::Lanczos3))
}

/// Font size for a source image: the configured size, or 3% of the shorter
/// side when that is larger.
pub fn effective_font_size(configured: u32, image: &ImageDimensions) -> f32 {
    let shorter = image.width.min(image.height) as f32;
    (configured as f32).max(shorter * MIN_FONT_SIZE_RATIO)
}

fn render_configured_text(
    config: &TextWatermarkConfig,
    image: &ImageDimensions,
) -> Result<RgbaImage, WatermarkError> {
    let options = TextRenderOptions {
        text: config.text.clone(),
        font_size: effective_font_size(config.font_size, image),
        color: parse_hex_color(&config.color)?,
        opacity: 1.0,
        shadow: Some(DropShadow::default()),
    };
    render_text(&options)
}
