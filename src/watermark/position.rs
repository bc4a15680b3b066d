//! Position calculation for watermark placement.
//!
//! `center` centers the watermark box on the image. Corner positions keep the
//! box `padding` pixels away from the two adjacent edges. When the image is
//! smaller than the watermark plus padding, coordinates are clamped to zero so
//! the box starts at the image edge instead of outside it.
//!
//! # Example
//!
//! ```
//! use gallery_proxy::watermark::position::{
//!     calculate_position, ImageDimensions, WatermarkDimensions,
//! };
//! use gallery_proxy::watermark::WatermarkPosition;
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let watermark = WatermarkDimensions { width: 120, height: 36 };
//!
//! let pos = calculate_position(WatermarkPosition::BottomRight, &image, &watermark, 20);
//! assert_eq!((pos.x, pos.y), (660, 544)); // 800 - 120 - 20, 600 - 36 - 20
//! ```

use super::WatermarkPosition;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the watermark to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner of the watermark box on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Calculate where the watermark box goes. Never returns negative coordinates.
pub fn calculate_position(
    position: WatermarkPosition,
    image: &ImageDimensions,
    watermark: &WatermarkDimensions,
    padding: u32,
) -> PlacementPosition {
    let img_w = image.width as i64;
    let img_h = image.height as i64;
    let wm_w = watermark.width as i64;
    let wm_h = watermark.height as i64;
    let p = padding as i64;

    let (x, y) = match position {
        WatermarkPosition::Center => ((img_w - wm_w) / 2, (img_h - wm_h) / 2),
        WatermarkPosition::TopLeft => (p, p),
        WatermarkPosition::TopRight => (img_w - wm_w - p, p),
        WatermarkPosition::BottomLeft => (p, img_h - wm_h - p),
        WatermarkPosition::BottomRight => (img_w - wm_w - p, img_h - wm_h - p),
    };

    PlacementPosition::new(clamp_coordinate(x), clamp_coordinate(y))
}

fn clamp_coordinate(value: i64) -> i32 {
    value.clamp(0, i32::MAX as i64) as i32
}
