//! Alpha compositing of a watermark onto the source raster.
//!
//! The source is copied unmodified into an RGBA canvas of the same size and
//! the watermark is blended on top with the Porter-Duff "over" operator,
//! scaled by the configured opacity.

use super::position::{calculate_position, ImageDimensions, PlacementPosition, WatermarkDimensions};
use super::WatermarkPosition;
use image::{Rgba, RgbaImage};

/// A watermark positioned on the target image.
#[derive(Clone)]
pub struct WatermarkLayer {
    pub image: RgbaImage,
    pub position: PlacementPosition,
    /// Multiplied into the watermark's own alpha channel (0.0 to 1.0)
    pub opacity: f32,
}

impl std::fmt::Debug for WatermarkLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .field("opacity", &self.opacity)
            .finish()
    }
}

impl WatermarkLayer {
    /// Place `watermark` on an image of `image_dims`.
    pub fn positioned(
        watermark: RgbaImage,
        image_dims: &ImageDimensions,
        position: WatermarkPosition,
        padding: u32,
        opacity: f32,
    ) -> Self {
        let wm_dims = WatermarkDimensions {
            width: watermark.width(),
            height: watermark.height(),
        };
        let position = calculate_position(position, image_dims, &wm_dims, padding);
        Self {
            image: watermark,
            position,
            opacity,
        }
    }

    /// Blend this layer onto `target`. Parts outside the target are dropped.
    pub fn blend_onto(&self, target: &mut RgbaImage) {
        let target_width = target.width() as i64;
        let target_height = target.height() as i64;
        let px = self.position.x as i64;
        let py = self.position.y as i64;

        let x_start = px.max(0);
        let y_start = py.max(0);
        let x_end = (px + self.image.width() as i64).min(target_width);
        let y_end = (py + self.image.height() as i64).min(target_height);

        for ty in y_start..y_end {
            for tx in x_start..x_end {
                let wm_pixel = self.image.get_pixel((tx - px) as u32, (ty - py) as u32);
                let target_pixel = target.get_pixel_mut(tx as u32, ty as u32);
                *target_pixel = blend_pixels(*target_pixel, *wm_pixel, self.opacity);
            }
        }
    }
}

/// Blend two pixels using alpha compositing with additional opacity.
///
/// "over" operator: result = foreground + background * (1 - foreground.alpha)
pub(crate) fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Composite `watermark` onto `target` and return where it was placed.
pub fn composite(
    target: &mut RgbaImage,
    watermark: RgbaImage,
    position: WatermarkPosition,
    padding: u32,
    opacity: f32,
) -> PlacementPosition {
    let image_dims = ImageDimensions {
        width: target.width(),
        height: target.height(),
    };
    let layer = WatermarkLayer::positioned(watermark, &image_dims, position, padding, opacity);
    layer.blend_onto(target);
    layer.position
}
