//! Robustness transform primitives: the distortions a watermarked image
//! might undergo before extraction is attempted again. These are plain
//! pixel transforms, not a test-sweep harness — orchestrating them into a
//! robustness report is left to an external collaborator.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::error::Result;
use crate::plane::{self, RgbPlane};

fn plane_to_rgb_image(plane: &RgbPlane) -> RgbImage {
    let h = plane.height();
    let w = plane.width();
    RgbImage::from_fn(w as u32, h as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        image::Rgb([
            plane.r[[y, x]].clamp(0.0, 255.0) as u8,
            plane.g[[y, x]].clamp(0.0, 255.0) as u8,
            plane.b[[y, x]].clamp(0.0, 255.0) as u8,
        ])
    })
}

/// Re-encodes the plane as JPEG at the given quality (`0..=100`) and
/// decodes it back, applying the codec's lossy compression artifacts.
pub fn jpeg_round_trip(plane: &RgbPlane, quality: u8) -> Result<RgbPlane> {
    let img = DynamicImage::ImageRgb8(plane_to_rgb_image(plane));
    let mut bytes = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
        img.write_with_encoder(encoder)?;
    }
    plane::decode(&bytes)
}

/// Crops to the central `fraction` of both dimensions (e.g. `0.9` keeps
/// the central 90%).
pub fn center_crop(plane: &RgbPlane, fraction: f32) -> RgbPlane {
    let h = plane.height();
    let w = plane.width();
    let new_h = ((h as f32) * fraction).round() as usize;
    let new_w = ((w as f32) * fraction).round() as usize;
    let top = (h - new_h) / 2;
    let left = (w - new_w) / 2;
    RgbPlane {
        r: plane
            .r
            .slice(ndarray::s![top..top + new_h, left..left + new_w])
            .to_owned(),
        g: plane
            .g
            .slice(ndarray::s![top..top + new_h, left..left + new_w])
            .to_owned(),
        b: plane
            .b
            .slice(ndarray::s![top..top + new_h, left..left + new_w])
            .to_owned(),
    }
}

/// Multiplies every sample by `factor`, clamping is deferred to encode
/// time; `factor` of `1.0` is a no-op.
pub fn adjust_brightness(plane: &RgbPlane, factor: f32) -> RgbPlane {
    RgbPlane {
        r: plane.r.mapv(|v| v * factor),
        g: plane.g.mapv(|v| v * factor),
        b: plane.b.mapv(|v| v * factor),
    }
}

/// Scales each sample's distance from the mid-gray point (`128`) by
/// `factor`, the standard linear contrast adjustment.
pub fn adjust_contrast(plane: &RgbPlane, factor: f32) -> RgbPlane {
    let adjust = |v: f32| 128.0 + (v - 128.0) * factor;
    RgbPlane {
        r: plane.r.mapv(adjust),
        g: plane.g.mapv(adjust),
        b: plane.b.mapv(adjust),
    }
}

/// Rotates about the image center by `degrees`, filling uncovered area
/// with white, bilinear-resampled.
pub fn rotate(plane: &RgbPlane, degrees: f32) -> RgbPlane {
    let img = plane_to_rgb_image(plane);
    let radians = degrees.to_radians();
    let rotated = rotate_about_center(
        &img,
        radians,
        Interpolation::Bilinear,
        image::Rgb([255, 255, 255]),
    );
    plane::from_dynamic_image(&DynamicImage::ImageRgb8(rotated))
}

/// Downscales to `fraction` of the original size (Lanczos3) then scales
/// back up to the original dimensions, the classic scale round trip.
pub fn scale_round_trip(plane: &RgbPlane, fraction: f32) -> RgbPlane {
    let img = plane_to_rgb_image(plane);
    let (w, h) = (img.width(), img.height());
    let small_w = ((w as f32) * fraction).round().max(1.0) as u32;
    let small_h = ((h as f32) * fraction).round().max(1.0) as u32;
    let down = image::imageops::resize(&img, small_w, small_h, FilterType::Lanczos3);
    let up = image::imageops::resize(&down, w, h, FilterType::Lanczos3);
    plane::from_dynamic_image(&DynamicImage::ImageRgb8(up))
}

/// Re-encodes bytes at the given format, byte-level helper used when a
/// caller only has the encoded form rather than a decoded plane.
pub fn reencode_bytes(bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
    plane::reencode(bytes, format)
}
