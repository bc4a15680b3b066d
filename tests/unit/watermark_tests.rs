// Watermark placement and rendering tests

use gallery_proxy::watermark::{
    apply_watermark, calculate_position, render_badge, ImageDimensions, PlacementPosition,
    WatermarkConfig, WatermarkDimensions, WatermarkPosition,
};
use image::{DynamicImage, Rgba, RgbaImage};
use rstest::rstest;

#[rstest]
#[case::bottom_right(WatermarkPosition::BottomRight, 830, 705)]
#[case::bottom_left(WatermarkPosition::BottomLeft, 20, 705)]
#[case::top_right(WatermarkPosition::TopRight, 830, 20)]
#[case::top_left(WatermarkPosition::TopLeft, 20, 20)]
#[case::center(WatermarkPosition::Center, 425, 362)]
fn test_placement_on_1000x800(
    #[case] position: WatermarkPosition,
    #[case] x: i32,
    #[case] y: i32,
) {
    let image = ImageDimensions {
        width: 1000,
        height: 800,
    };
    let watermark = WatermarkDimensions {
        width: 150,
        height: 75,
    };
    assert_eq!(
        calculate_position(position, &image, &watermark, 20),
        PlacementPosition::new(x, y)
    );
}

#[rstest]
#[case(WatermarkPosition::BottomRight)]
#[case(WatermarkPosition::Center)]
#[case(WatermarkPosition::TopRight)]
fn test_oversized_watermark_never_negative(#[case] position: WatermarkPosition) {
    let image = ImageDimensions {
        width: 50,
        height: 40,
    };
    let watermark = WatermarkDimensions {
        width: 200,
        height: 60,
    };
    let placement = calculate_position(position, &image, &watermark, 20);
    assert!(placement.x >= 0 && placement.y >= 0, "{:?}", placement);
}

#[test]
fn test_badge_has_fixed_size_and_translucent_corners() {
    let badge = render_badge("@MUPICS").unwrap();
    assert_eq!(badge.dimensions(), (200, 60));
    // Rounded corner pixel is outside the rectangle
    assert_eq!(badge.get_pixel(0, 0)[3], 0);
    // Body of the badge is the translucent dark background or text
    assert!(badge.get_pixel(100, 2)[3] > 0);
}

#[test]
fn test_apply_watermark_keeps_dimensions_with_unavailable_asset() {
    let yaml = "style:\n  type: image\n  path: /nonexistent/watermark.png\n";
    let config: WatermarkConfig = serde_yaml::from_str(yaml).unwrap();
    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(640, 480, Rgba([40, 40, 40, 255])));

    let result = apply_watermark(&source, &config);

    assert_eq!(result.image.dimensions(), (640, 480));
    assert_eq!(result.strategy, Some("badge"));
    assert!(result.placement.is_some());
}
