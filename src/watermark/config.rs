//! Watermark configuration types.
//!
//! This module defines the single, process-wide watermark setup:
//! - Image watermarks loaded from a local asset file, scaled to the source
//! - Text watermarks rendered with the embedded font
//! - Five placement modes (center and the four corners)
//! - Output encoding quality and the text of the generated fallback badge

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_FONT_SIZE, DEFAULT_JPEG_QUALITY, DEFAULT_TEXT_COLOR, DEFAULT_WATERMARK_OPACITY,
    DEFAULT_WATERMARK_PADDING, DEFAULT_WATERMARK_PATH, DEFAULT_WATERMARK_SCALE,
    DEFAULT_WATERMARK_TEXT,
};

// Default values
fn default_enabled() -> bool {
    true
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_text() -> String {
    DEFAULT_WATERMARK_TEXT.to_string()
}

fn default_opacity() -> f32 {
    DEFAULT_WATERMARK_OPACITY
}

fn default_padding() -> u32 {
    DEFAULT_WATERMARK_PADDING
}

fn default_scale() -> f32 {
    DEFAULT_WATERMARK_SCALE
}

fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_WATERMARK_PATH)
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

/// Watermark position on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl WatermarkPosition {
    /// Name as written in configuration, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// Watermark definition - either text or image.
///
/// Uses serde tag to distinguish between types in YAML:
/// ```yaml
/// - type: text
///   text: "@MUPICS"
///   position: bottom-right
/// - type: image
///   path: "public/watermark.png"
///   scale: 0.15
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WatermarkDefinition {
    Text(TextWatermarkConfig),
    Image(ImageWatermarkConfig),
}

impl Default for WatermarkDefinition {
    fn default() -> Self {
        Self::Image(ImageWatermarkConfig::default())
    }
}

/// Text watermark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextWatermarkConfig {
    /// Text content (default: "@MUPICS")
    #[serde(default = "default_text")]
    pub text: String,

    /// Minimum font size in pixels (default: 30). The rendered size grows with
    /// the image so the text stays legible on large sources.
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Text color as hex string (default: "#FFFFFF")
    #[serde(default = "default_color")]
    pub color: String,

    /// Opacity from 0.0 (transparent) to 1.0 (opaque) (default: 0.7)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Position on the image (default: bottom-right)
    #[serde(default)]
    pub position: WatermarkPosition,

    /// Distance from the edges in pixels for corner positions (default: 20)
    #[serde(default = "default_padding")]
    pub padding: u32,
}

impl Default for TextWatermarkConfig {
    fn default() -> Self {
        Self {
            text: default_text(),
            font_size: default_font_size(),
            color: default_color(),
            opacity: default_opacity(),
            position: WatermarkPosition::default(),
            padding: default_padding(),
        }
    }
}

/// Image watermark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageWatermarkConfig {
    /// Local watermark asset (default: "public/watermark.png")
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Watermark width as a fraction of the source width (default: 0.15)
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Opacity from 0.0 (transparent) to 1.0 (opaque) (default: 0.7)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Position on the image (default: bottom-right)
    #[serde(default)]
    pub position: WatermarkPosition,

    /// Distance from the edges in pixels for corner positions (default: 20)
    #[serde(default = "default_padding")]
    pub padding: u32,
}

impl Default for ImageWatermarkConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            scale: default_scale(),
            opacity: default_opacity(),
            position: WatermarkPosition::default(),
            padding: default_padding(),
        }
    }
}

/// Process-wide watermark configuration.
///
/// ```yaml
/// watermark:
///   enabled: true
///   jpeg_quality: 95
///   badge_text: "@MUPICS"
///   style:
///     type: image
///     path: public/watermark.png
///     position: bottom-right
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// When disabled, upstream bytes are passed through untouched (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// JPEG quality of the watermarked output, 1-100 (default: 95)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Text of the generated badge used when the configured mark fails
    #[serde(default = "default_text")]
    pub badge_text: String,

    /// The watermark itself
    #[serde(default)]
    pub style: WatermarkDefinition,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            jpeg_quality: default_jpeg_quality(),
            badge_text: default_text(),
            style: WatermarkDefinition::default(),
        }
    }
}

fn validate_opacity(kind: &str, opacity: f32) -> Result<(), String> {
    // Check for NaN/Infinity and valid range
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(format!(
            "{} watermark opacity must be a finite value between 0.0 and 1.0, got {}",
            kind, opacity
        ));
    }
    Ok(())
}

impl TextWatermarkConfig {
    /// Validate the text watermark configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("Text watermark 'text' field cannot be empty".to_string());
        }

        if self.font_size == 0 {
            return Err("Text watermark font_size must be > 0".to_string());
        }

        validate_opacity("Text", self.opacity)?;

        // Validate hex color format (#RGB or #RRGGBB)
        if let Some(hex_part) = self.color.strip_prefix('#') {
            let len = hex_part.len();
            if (len != 3 && len != 6) || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!(
                    "Text watermark color must be #RGB or #RRGGBB hex, got '{}'",
                    self.color
                ));
            }
        } else {
            return Err(format!(
                "Text watermark color must be a hex string starting with '#', got '{}'",
                self.color
            ));
        }

        Ok(())
    }
}

impl ImageWatermarkConfig {
    /// Validate the image watermark configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("Image watermark 'path' field cannot be empty".to_string());
        }

        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > 1.0 {
            return Err(format!(
                "Image watermark scale must be greater than 0.0 and at most 1.0, got {}",
                self.scale
            ));
        }

        validate_opacity("Image", self.opacity)
    }
}

impl WatermarkDefinition {
    /// Validate the watermark definition.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Text(config) => config.validate(),
            Self::Image(config) => config.validate(),
        }
    }

    pub fn position(&self) -> WatermarkPosition {
        match self {
            Self::Text(config) => config.position,
            Self::Image(config) => config.position,
        }
    }

    pub fn padding(&self) -> u32 {
        match self {
            Self::Text(config) => config.padding,
            Self::Image(config) => config.padding,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            Self::Text(config) => config.opacity,
            Self::Image(config) => config.opacity,
        }
    }
}

impl WatermarkConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "Watermark jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }
        if self.badge_text.trim().is_empty() {
            return Err("Watermark badge_text cannot be empty".to_string());
        }
        self.style
            .validate()
            .map_err(|e| format!("Watermark style: {}", e))
    }
}
