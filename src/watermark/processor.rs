//! Applies the configured watermark to a decoded source image.
//!
//! The source is drawn unmodified onto an RGBA canvas of the same size, then
//! the strategy chain is walked until one strategy yields a watermark. A
//! failing strategy is logged and skipped; when all of them fail the canvas
//! is returned without a watermark.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};

use super::compositor::composite;
use super::position::{ImageDimensions, PlacementPosition};
use super::strategy::strategy_chain;
use super::{WatermarkConfig, WatermarkError};

/// Result of [`apply_watermark`].
#[derive(Debug)]
pub struct Watermarked {
    pub image: RgbaImage,
    /// Name of the strategy that was applied, if any
    pub strategy: Option<&'static str>,
    pub placement: Option<PlacementPosition>,
}

/// Composite the configured watermark onto `source`.
///
/// Never fails: the worst case is the unmodified source on the canvas.
pub fn apply_watermark(source: &DynamicImage, config: &WatermarkConfig) -> Watermarked {
    let mut canvas = source.to_rgba8();
    let dims = ImageDimensions {
        width: canvas.width(),
        height: canvas.height(),
    };

    let definition = &config.style;
    for strategy in strategy_chain(definition, &config.badge_text) {
        match strategy.render(&dims) {
            Ok(mark) => {
                let (mark_width, mark_height) = mark.dimensions();
                let placement = composite(
                    &mut canvas,
                    mark,
                    definition.position(),
                    definition.padding(),
                    definition.opacity(),
                );
                tracing::debug!(
                    strategy = strategy.name(),
                    source_width = dims.width,
                    source_height = dims.height,
                    watermark_width = mark_width,
                    watermark_height = mark_height,
                    position = definition.position().as_str(),
                    x = placement.x,
                    y = placement.y,
                    "Watermark applied"
                );
                return Watermarked {
                    image: canvas,
                    strategy: Some(strategy.name()),
                    placement: Some(placement),
                };
            }
            Err(e) => {
                tracing::warn!(
                    strategy = strategy.name(),
                    error = %e,
                    "Watermark strategy failed, trying next"
                );
            }
        }
    }

    tracing::warn!("All watermark strategies failed, serving image without watermark");
    Watermarked {
        image: canvas,
        strategy: None,
        placement: None,
    }
}

/// Encode an RGBA canvas as JPEG. Alpha is dropped.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, WatermarkError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(WatermarkError::EncodeError(
            "Cannot encode an empty image".to_string(),
        ));
    }

    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| WatermarkError::EncodeError(e.to_string()))?;
    Ok(buffer)
}
