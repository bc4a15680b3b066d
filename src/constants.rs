// Constants module - centralized default values for configuration
//
// Every default used by the config structs lives here so the YAML
// documentation, the serde defaults and the tests agree.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

/// Default path of the image endpoint
pub const DEFAULT_IMAGE_PATH: &str = "/api/image";

/// Path of the health endpoint
pub const HEALTH_PATH: &str = "/health";

// =============================================================================
// Upstream CDN defaults
// =============================================================================

/// Default CDN host serving the CMS assets
pub const DEFAULT_CDN_HOST: &str = "cdn.sanity.io";

/// Default CMS dataset name
pub const DEFAULT_DATASET: &str = "production";

/// Default timeout for the upstream fetch in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Query parameter the CDN understands as "resize to width"
pub const UPSTREAM_WIDTH_PARAM: &str = "w";

/// Largest source image body read from the CDN (32 MiB)
pub const DEFAULT_MAX_UPSTREAM_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Content type assumed when the CDN does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

// =============================================================================
// Response defaults
// =============================================================================

/// Default `Cache-Control` max-age in seconds (one day)
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 86_400;

// =============================================================================
// Watermark defaults
// =============================================================================

/// Default watermark asset location
pub const DEFAULT_WATERMARK_PATH: &str = "public/watermark.png";

/// Default watermark width as a fraction of the source image width
pub const DEFAULT_WATERMARK_SCALE: f32 = 0.15;

/// Default watermark opacity
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.7;

/// Default distance between the watermark and the image edges
pub const DEFAULT_WATERMARK_PADDING: u32 = 20;

/// Default text of the generated badge and of text watermarks
pub const DEFAULT_WATERMARK_TEXT: &str = "@MUPICS";

/// Default text watermark font size in pixels
pub const DEFAULT_FONT_SIZE: u32 = 30;

/// Minimum text size as a fraction of the shorter image side
pub const MIN_FONT_SIZE_RATIO: f32 = 0.03;

/// Default text color
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";

/// Default JPEG quality for watermarked output
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Generated badge dimensions
pub const BADGE_WIDTH: u32 = 200;
pub const BADGE_HEIGHT: u32 = 60;

/// Generated badge corner radius
pub const BADGE_CORNER_RADIUS: u32 = 8;

/// Generated badge font size
pub const BADGE_FONT_SIZE: f32 = 30.0;

/// Drop shadow offset applied under text, in pixels
pub const SHADOW_OFFSET: i32 = 2;

/// Drop shadow blur sigma
pub const SHADOW_BLUR_SIGMA: f32 = 2.0;

/// Drop shadow opacity
pub const SHADOW_OPACITY: f32 = 0.5;
