//! Logo compositing: pastes a (typically semi-transparent) logo image
//! onto a base image, scaled to a fraction of the base width and
//! opacity-adjusted, at one of five named positions.

use image::imageops::{overlay, resize, FilterType};
use image::RgbaImage;

use crate::error::Result;
use crate::visible::Position;

const MARGIN: i64 = 20;

/// Scales `logo` so its width is `size_fraction` of `base_width`,
/// preserving aspect ratio.
fn scale_logo(logo: &RgbaImage, base_width: u32, size_fraction: f32) -> RgbaImage {
    let target_w = ((base_width as f32) * size_fraction).round().max(1.0) as u32;
    let target_h = ((target_w as f32) * (logo.height() as f32) / (logo.width() as f32))
        .round()
        .max(1.0) as u32;
    resize(logo, target_w, target_h, FilterType::Lanczos3)
}

/// Multiplies the logo's alpha channel by `opacity` in place.
fn apply_opacity(logo: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in logo.pixels_mut() {
        pixel[3] = ((pixel[3] as f32) * opacity).round() as u8;
    }
}

fn paste_offset(position: Position, base_w: u32, base_h: u32, logo_w: u32, logo_h: u32) -> (i64, i64) {
    match position {
        Position::TopLeft => (MARGIN, MARGIN),
        Position::TopRight => (base_w as i64 - logo_w as i64 - MARGIN, MARGIN),
        Position::BottomLeft => (MARGIN, base_h as i64 - logo_h as i64 - MARGIN),
        Position::BottomRight => (
            base_w as i64 - logo_w as i64 - MARGIN,
            base_h as i64 - logo_h as i64 - MARGIN,
        ),
        Position::Center => (
            (base_w as i64 - logo_w as i64) / 2,
            (base_h as i64 - logo_h as i64) / 2,
        ),
    }
}

/// Composites `logo_bytes` onto `base_bytes` at `position`, scaled to
/// `size_fraction` of the base width and alpha-scaled by `opacity`.
/// Returns re-encoded PNG bytes.
pub fn embed_logo(
    base_bytes: &[u8],
    logo_bytes: &[u8],
    position: Position,
    opacity: f32,
    size_fraction: f32,
) -> Result<Vec<u8>> {
    let mut base = image::load_from_memory(base_bytes)?.to_rgba8();
    let logo = image::load_from_memory(logo_bytes)?.to_rgba8();

    let mut scaled = scale_logo(&logo, base.width(), size_fraction);
    apply_opacity(&mut scaled, opacity);

    let (x, y) = paste_offset(position, base.width(), base.height(), scaled.width(), scaled.height());
    overlay(&mut base, &scaled, x, y);

    let flattened = image::DynamicImage::ImageRgba8(base).to_rgb8();
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(flattened).write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}
