// Image endpoint tests
//
// Drive the full request flow (guard, identifier checks, fetch, watermark,
// response headers) against a counting fake CDN.

use super::test_harness::*;
use gallery_proxy::upstream::UpstreamError;
use image::GenericImageView;

const SOURCE_BLACK: [u8; 4] = [0, 0, 0, 255];

fn max_brightness(img: &image::DynamicImage, x0: u32, y0: u32, x1: u32, y1: u32) -> u8 {
    let rgb = img.to_rgb8();
    let mut max = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = rgb.get_pixel(x, y);
            max = max.max(p[0]).max(p[1]).max(p[2]);
        }
    }
    max
}

#[tokio::test]
async fn test_missing_id_returns_400_without_fetch() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("width=640")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(json_body(&response)["error"], "Image ID is required.");
    assert_eq!(upstream.calls(), 0, "No fetch may happen for a missing id");
}

#[tokio::test]
async fn test_upstream_404_becomes_generic_500() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::failing(UpstreamError::Status {
        status: 404,
        url: "https://cdn.sanity.io/images/abc123/production/missing.jpg".to_string(),
    });

    let response = TestRequest::get("id=missing.jpg")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(json_body(&response)["error"], "Internal Server Error");
    assert_eq!(upstream.calls(), 1, "Upstream must be fetched exactly once");
    let body = String::from_utf8_lossy(&response.body);
    assert!(!body.contains("cdn.sanity.io"), "Upstream details leaked: {}", body);
}

#[tokio::test]
async fn test_upstream_timeout_becomes_500() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::failing(UpstreamError::Timeout {
        url: "https://cdn.sanity.io/images/abc123/production/slow.jpg".to_string(),
    });

    let response = TestRequest::get("id=slow.jpg")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_forbidden_origin_returns_403_without_fetch() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a.jpg")
        .origin("https://evil.example.net")
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 403);
    assert_eq!(
        json_body(&response)["error"],
        "Forbidden: Hotlinking not allowed."
    );
    assert_eq!(upstream.calls(), 0);
    assert!(response.header("Access-Control-Allow-Origin").is_none());
}

#[tokio::test]
async fn test_guard_runs_before_id_validation() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("width=10")
        .origin("https://evil.example.net")
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 403);
}

#[tokio::test]
async fn test_request_without_any_origin_header_is_forbidden() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a.jpg").send(&loaded, &upstream).await;

    assert_eq!(response.status, 403);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_successful_request_returns_watermarked_jpeg() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(400, 300, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a1b2c3-400x300.png")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/jpeg");
    assert_eq!(response.header("Cache-Control"), Some("public, max-age=86400"));
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some(GALLERY_ORIGIN)
    );
    assert_eq!(response.header("Vary"), Some("Origin"));
    assert_eq!(&response.body[..2], &[0xFF, 0xD8], "Body should be a JPEG");

    let output = decode(&response);
    assert_eq!(output.dimensions(), (400, 300));

    // Text lands in the bottom-right corner, the opposite corner stays untouched
    assert!(max_brightness(&output, 200, 200, 380, 280) > 100);
    assert!(max_brightness(&output, 0, 0, 100, 100) < 40);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_width_and_timeout_forwarded_to_upstream() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(64, 64, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a1b2c3-1200x800.jpg&width=640")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        upstream.last_url().as_deref(),
        Some("https://cdn.sanity.io/images/abc123/production/a1b2c3-1200x800.jpg?w=640")
    );
    assert_eq!(upstream.last_timeout(), Some(std::time::Duration::from_secs(7)));
}

#[tokio::test]
async fn test_invalid_width_returns_400_without_fetch() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    for query in ["id=a.jpg&width=abc", "id=a.jpg&width=0", "id=a.jpg&width=-20"] {
        let response = TestRequest::get(query)
            .origin(GALLERY_ORIGIN)
            .send(&loaded, &upstream)
            .await;
        assert_eq!(response.status, 400, "{} should be rejected", query);
        assert_eq!(
            json_body(&response)["error"],
            "Width must be a positive integer."
        );
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_path_traversal_id_rejected() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    for query in ["id=..%2Fsecret", "id=a%3Fw%3D1", "id=%2E%2E"] {
        let response = TestRequest::get(query)
            .origin(GALLERY_ORIGIN)
            .send(&loaded, &upstream)
            .await;
        assert_eq!(response.status, 400, "{} should be rejected", query);
        assert_eq!(json_body(&response)["error"], "Invalid image ID.");
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_undecodable_source_becomes_500() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream =
        CountingUpstream::serving(bytes::Bytes::from_static(b"not an image"), "image/jpeg");

    let response = TestRequest::get("id=a.jpg")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(json_body(&response)["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_referer_is_reduced_to_origin() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(32, 32, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a.jpg")
        .referer("https://gallery.example.com/albums/42?page=2")
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some(GALLERY_ORIGIN)
    );
    assert_eq!(response.header("Vary"), Some("Origin"));
}

#[tokio::test]
async fn test_wildcard_origin_is_echoed() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN, "https://*.vercel.app"]);
    let upstream = CountingUpstream::serving(solid_png(32, 32, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a.jpg")
        .origin("https://preview-git-main.vercel.app")
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://preview-git-main.vercel.app")
    );

    let denied = TestRequest::get("id=a.jpg")
        .origin("https://vercel.app")
        .send(&loaded, &upstream)
        .await;
    assert_eq!(denied.status, 403);
}

#[tokio::test]
async fn test_host_fallback_uses_fixed_cors_origin() {
    let loaded = text_watermark_config(&["https://*.vercel.app", GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(32, 32, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a.jpg")
        .host("gallery.example.com")
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some(GALLERY_ORIGIN),
        "Host-based decisions send the first fixed allow-list origin"
    );
    assert_eq!(response.header("Cache-Control"), Some("public, max-age=86400"));
    assert_eq!(
        response.header("Vary"),
        Some("Origin"),
        "Shared caches must key the fixed CORS origin on Origin too"
    );

    let with_port = TestRequest::get("id=a.jpg")
        .host("gallery.example.com:443")
        .send(&loaded, &upstream)
        .await;
    assert_eq!(with_port.status, 200);

    let denied = TestRequest::get("id=a.jpg")
        .host("images.evil.net")
        .send(&loaded, &upstream)
        .await;
    assert_eq!(denied.status, 403);
}

#[tokio::test]
async fn test_asset_watermark_scaled_and_padded_bottom_right() {
    let dir = tempfile::tempdir().unwrap();
    let asset = dir.path().join("watermark.png");
    write_asset(&asset, 100, 50, [255, 0, 0, 255]);

    let loaded = config_with(
        &[GALLERY_ORIGIN],
        &format!(
            "watermark:\n  style:\n    type: image\n    path: \"{}\"\n\
             \x20   scale: 0.15\n    opacity: 1.0\n    padding: 20\n",
            asset.display()
        ),
        false,
    );
    let upstream = CountingUpstream::serving(solid_png(1000, 800, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=photo.png")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;
    assert_eq!(response.status, 200);

    let output = decode(&response).to_rgb8();
    assert_eq!(output.dimensions(), (1000, 800));

    // 15% of 1000 is 150 wide, aspect kept gives 75 high, so the watermark
    // spans x 830..980 and y 705..780.
    let center = output.get_pixel(905, 742);
    assert!(center[0] > 200 && center[1] < 60, "center {:?}", center);

    let inside_left = output.get_pixel(840, 742);
    assert!(inside_left[0] > 200, "left edge {:?}", inside_left);

    let left_of_mark = output.get_pixel(815, 742);
    assert!(left_of_mark[0] < 60, "left of mark {:?}", left_of_mark);

    let in_padding = output.get_pixel(990, 790);
    assert!(in_padding[0] < 60, "padding {:?}", in_padding);

    let above_mark = output.get_pixel(905, 690);
    assert!(above_mark[0] < 60, "above mark {:?}", above_mark);
}

#[tokio::test]
async fn test_missing_asset_falls_back_to_badge() {
    let loaded = config_with(
        &[GALLERY_ORIGIN],
        "watermark:\n  style:\n    type: image\n\
         \x20   path: \"/nonexistent/gallery/watermark.png\"\n    opacity: 1.0\n",
        false,
    );
    let upstream = CountingUpstream::serving(solid_png(1000, 800, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=photo.png")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    let output = decode(&response);
    assert_eq!(output.dimensions(), (1000, 800));
    // Badge text shows up in the bottom-right corner
    assert!(max_brightness(&output, 830, 735, 980, 780) > 80);
}

#[tokio::test]
async fn test_pass_through_when_watermark_disabled() {
    let loaded = config_with(&[GALLERY_ORIGIN], "watermark:\n  enabled: false\n", false);
    let source = solid_png(40, 30, [10, 20, 30, 255]);
    let upstream = CountingUpstream::serving(source.clone(), "image/png");

    let response = TestRequest::get("id=a.png")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/png");
    assert_eq!(response.body, source);
}

#[tokio::test]
async fn test_debug_trace_when_enabled() {
    let loaded = config_with(
        &[GALLERY_ORIGIN, "https://*.vercel.app"],
        "watermark:\n  enabled: false\n",
        true,
    );
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    let allowed = TestRequest::get("id=a.jpg&debug=true")
        .origin("https://x.vercel.app")
        .send(&loaded, &upstream)
        .await;
    assert_eq!(allowed.status, 200);
    assert_eq!(allowed.header("Cache-Control"), Some("no-store"));
    let trace = json_body(&allowed);
    assert_eq!(trace["allowed"], true);
    assert_eq!(trace["source"], "origin");
    assert_eq!(trace["candidate"], "https://x.vercel.app");
    assert_eq!(trace["matched_entry"], "https://*.vercel.app");
    assert_eq!(trace["checks"].as_array().unwrap().len(), 2);

    let denied = TestRequest::get("debug=true")
        .origin("https://evil.example.net")
        .send(&loaded, &upstream)
        .await;
    assert_eq!(denied.status, 403);
    assert_eq!(json_body(&denied)["allowed"], false);

    assert_eq!(upstream.calls(), 0, "Debug mode never fetches");
}

#[tokio::test]
async fn test_debug_query_ignored_when_disabled_in_config() {
    let loaded = config_with(&[GALLERY_ORIGIN], "watermark:\n  enabled: false\n", false);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a.png&debug=true")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/png");
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_head_request_served() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(32, 32, SOURCE_BLACK), "image/png");

    let response = TestRequest::get("id=a.png")
        .method("HEAD")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/jpeg");
}

#[tokio::test]
async fn test_other_methods_rejected() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    for method in ["POST", "PUT", "DELETE"] {
        let response = TestRequest::get("id=a.png")
            .method(method)
            .origin(GALLERY_ORIGIN)
            .send(&loaded, &upstream)
            .await;
        assert_eq!(response.status, 405, "{} should be rejected", method);
        assert_eq!(response.header("Allow"), Some("GET, HEAD"));
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_health_and_unknown_paths() {
    let loaded = text_watermark_config(&[GALLERY_ORIGIN]);
    let upstream = CountingUpstream::serving(solid_png(10, 10, SOURCE_BLACK), "image/png");

    let health = TestRequest::get("").path("/health").send(&loaded, &upstream).await;
    assert_eq!(health.status, 200);
    assert_eq!(json_body(&health)["status"], "healthy");

    let unknown = TestRequest::get("id=a.png")
        .path("/api/other")
        .origin(GALLERY_ORIGIN)
        .send(&loaded, &upstream)
        .await;
    assert_eq!(unknown.status, 404);
    assert_eq!(json_body(&unknown)["error"], "Not Found");
    assert_eq!(upstream.calls(), 0);
}
