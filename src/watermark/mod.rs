//! Watermarking of gallery images.
//!
//! One process-wide watermark is configured, either an image asset or a line
//! of text, placed at the center or a corner of every served image.
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   enabled: true
//!   jpeg_quality: 95
//!   badge_text: "@MUPICS"
//!   style:
//!     type: image
//!     path: public/watermark.png
//!     scale: 0.15
//!     opacity: 0.7
//!     position: bottom-right
//!     padding: 20
//! ```
//!
//! If the configured watermark cannot be produced, a generated badge is used
//! instead, and if that fails too the image is served unmarked. See
//! [`strategy`] for the chain.

pub mod badge;
pub mod compositor;
pub mod config;
pub mod error;
pub mod position;
pub mod processor;
pub mod strategy;
pub mod text_renderer;

pub use badge::{render_badge, write_badge};
pub use compositor::{composite, WatermarkLayer};
pub use config::{
    ImageWatermarkConfig, TextWatermarkConfig, WatermarkConfig, WatermarkDefinition,
    WatermarkPosition,
};
pub use error::WatermarkError;
pub use position::{calculate_position, ImageDimensions, PlacementPosition, WatermarkDimensions};
pub use processor::{apply_watermark, encode_jpeg, Watermarked};
pub use strategy::{strategy_chain, WatermarkStrategy};
pub use text_renderer::{measure_text, parse_hex_color, render_text, Color, TextRenderOptions};
