//! Black-box round-trip and robustness scenarios against in-memory
//! generated PNGs, mirroring the engine's documented testable properties.

use invis_watermark::{embed, extract, robustness, WatermarkMethod};

fn solid_gray_png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([128, 128, 128]));
    encode_png(image::DynamicImage::ImageRgb8(img))
}

fn noise_png(w: u32, h: u32) -> Vec<u8> {
    let mut state: u32 = 0x2545F491;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    let img = image::RgbImage::from_fn(w, h, |_, _| {
        image::Rgb([(next() % 256) as u8, (next() % 256) as u8, (next() % 256) as u8])
    });
    encode_png(image::DynamicImage::ImageRgb8(img))
}

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn scenario_1_dct_round_trip_on_solid_gray() {
    let png = solid_gray_png(1024, 768);
    let watermarked = embed(&png, "hello", WatermarkMethod::Dct).expect("embed should succeed");
    assert_eq!(extract(&watermarked, WatermarkMethod::Dct), "hello");
}

#[test]
fn scenario_2_dwt_round_trip_on_solid_gray() {
    let png = solid_gray_png(1024, 768);
    let payload = "x".repeat(100);
    let watermarked = embed(&png, &payload, WatermarkMethod::Dwt).expect("embed should succeed");
    assert_eq!(extract(&watermarked, WatermarkMethod::Dwt), payload);
}

#[test]
fn scenario_3_dct_capacity_exceeded_returns_input_unchanged() {
    let png = solid_gray_png(64, 64);
    let payload = "A".repeat(200);
    let result = embed(&png, &payload, WatermarkMethod::Dct).expect("embed should succeed");
    assert_eq!(result, png);
}

#[test]
fn scenario_4_dct_survives_jpeg_q85() {
    let png = solid_gray_png(512, 512);
    let watermarked = embed(&png, "abc", WatermarkMethod::Dct).expect("embed should succeed");
    let plane = invis_watermark::plane::decode(&watermarked).unwrap();
    let recompressed = robustness::jpeg_round_trip(&plane, 85).expect("jpeg round trip");
    let recompressed_png = invis_watermark::plane::encode_png(&recompressed).unwrap();
    assert_eq!(extract(&recompressed_png, WatermarkMethod::Dct), "abc");
}

#[test]
fn scenario_5_extract_on_random_noise_is_empty() {
    let noise = noise_png(256, 256);
    assert_eq!(extract(&noise, WatermarkMethod::Dct), "");
}

#[test]
fn scenario_6_lsb_embed_dct_extract_mismatch() {
    let png = solid_gray_png(256, 256);
    let watermarked = embed(&png, "Z", WatermarkMethod::Lsb).expect("embed should succeed");
    assert_eq!(extract(&watermarked, WatermarkMethod::Lsb), "Z");
    // A DCT extraction against an LSB-only watermarked image must never
    // raise and must not recover the LSB payload.
    let dct_result = extract(&watermarked, WatermarkMethod::Dct);
    assert_ne!(dct_result, "Z");
}

#[test]
fn dct_survives_center_crop_90_percent() {
    let png = solid_gray_png(512, 512);
    let watermarked = embed(&png, "crop", WatermarkMethod::Dct).expect("embed should succeed");
    let plane = invis_watermark::plane::decode(&watermarked).unwrap();
    let cropped = robustness::center_crop(&plane, 0.9);
    let truncated = cropped.truncate_to_multiple(invis_watermark::dct::BLOCK_SIZE);
    let cropped_png = invis_watermark::plane::encode_png(&truncated).unwrap();
    assert_eq!(extract(&cropped_png, WatermarkMethod::Dct), "crop");
}

#[test]
fn dwt_survives_brightness_adjustment() {
    let png = solid_gray_png(512, 512);
    let watermarked = embed(&png, "light", WatermarkMethod::Dwt).expect("embed should succeed");
    let plane = invis_watermark::plane::decode(&watermarked).unwrap();
    let brightened = robustness::adjust_brightness(&plane, 1.1);
    let brightened_png = invis_watermark::plane::encode_png(&brightened).unwrap();
    assert_eq!(extract(&brightened_png, WatermarkMethod::Dwt), "light");
}

#[test]
fn rotation_does_not_raise_or_hang() {
    let png = solid_gray_png(256, 256);
    let watermarked = embed(&png, "rot", WatermarkMethod::Dct).expect("embed should succeed");
    let plane = invis_watermark::plane::decode(&watermarked).unwrap();
    let start = std::time::Instant::now();
    let rotated = robustness::rotate(&plane, 5.0);
    let rotated_png = invis_watermark::plane::encode_png(&rotated).unwrap();
    let _ = extract(&rotated_png, WatermarkMethod::Dct);
    assert!(start.elapsed().as_millis() < 1000);
}

#[test]
fn empty_input_safety_across_all_methods() {
    let png = solid_gray_png(128, 128);
    for method in [WatermarkMethod::Lsb, WatermarkMethod::Dct, WatermarkMethod::Dwt] {
        assert_eq!(extract(&png, method), "");
    }
}

#[test]
fn idempotent_embed_last_write_wins() {
    let png = solid_gray_png(256, 256);
    let once = embed(&png, "first", WatermarkMethod::Dct).expect("embed should succeed");
    let twice = embed(&once, "second", WatermarkMethod::Dct).expect("embed should succeed");
    assert_eq!(extract(&twice, WatermarkMethod::Dct), "second");
}

#[test]
fn embed_never_enlarges_dimensions() {
    let png = solid_gray_png(130, 130);
    let watermarked = embed(&png, "hi", WatermarkMethod::Dct).expect("embed should succeed");
    let out_plane = invis_watermark::plane::decode(&watermarked).unwrap();
    let in_plane = invis_watermark::plane::decode(&png).unwrap();
    assert!(out_plane.height() <= in_plane.height());
    assert!(out_plane.width() <= in_plane.width());
}
