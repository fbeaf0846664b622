//! Invisible image watermarking engine.
//!
//! Three embedding methods share a common payload framer and majority-vote
//! recovery discipline: spatial LSB, DCT mid-frequency coefficients, and
//! DWT detail-subband coefficients. `embed_visible` and `embed_logo` round
//! out the public surface with the (unrelated, non-recoverable) visible
//! overlay operations.

pub mod dct;
pub mod dwt;
pub mod error;
pub mod frame;
pub mod logo;
pub mod lsb;
pub mod plane;
pub mod robustness;
pub mod visible;

pub use error::{Result, WatermarkError};
pub use visible::Position;

use log::{debug, warn};

/// The four embedding methods exposed at the public boundary. `Robust`
/// is a pure alias of `Dct`: the original implementation advertised a
/// combined DCT+DWT scheme under this name but only ever ran the DCT
/// path, and that mismatch is preserved here rather than "fixed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkMethod {
    Lsb,
    Dct,
    Dwt,
    Robust,
}

impl WatermarkMethod {
    pub fn parse(tag: &str) -> Option<WatermarkMethod> {
        match tag {
            "lsb" => Some(WatermarkMethod::Lsb),
            "dct" => Some(WatermarkMethod::Dct),
            "dwt" => Some(WatermarkMethod::Dwt),
            "robust" => Some(WatermarkMethod::Robust),
            _ => None,
        }
    }
}

/// Embeds `text` into the image bytes using `method`.
///
/// Decode failure and an unknown `method` are fatal (`Err`). If the
/// framed payload exceeds the chosen method's capacity, the input bytes
/// are returned unchanged — this is a plain success value, not an error.
pub fn embed(bytes: &[u8], text: &str, method: WatermarkMethod) -> Result<Vec<u8>> {
    debug!("embed: method={method:?}, {} input bytes, {} chars", bytes.len(), text.len());
    let input_plane = plane::decode(bytes)?;

    match method {
        WatermarkMethod::Lsb => match lsb::embed(&input_plane, text) {
            Some(watermarked) => plane::encode_png(&watermarked),
            None => {
                warn!("lsb capacity exceeded, returning input unchanged");
                Ok(bytes.to_vec())
            }
        },
        WatermarkMethod::Dct | WatermarkMethod::Robust => {
            let truncated = input_plane.truncate_to_multiple(dct::BLOCK_SIZE);
            let bits = frame::encode(text);
            match dct::embed(&truncated, &bits) {
                Some(watermarked) => plane::encode_png(&watermarked),
                None => {
                    warn!("dct block capacity exceeded, returning input unchanged");
                    Ok(bytes.to_vec())
                }
            }
        }
        WatermarkMethod::Dwt => {
            let bits = frame::encode(text);
            let watermarked = dwt::embed(&input_plane, &bits);
            plane::encode_png(&watermarked)
        }
    }
}

/// Extracts a watermark from the image bytes using `method`. Never
/// raises: any failure — an unparsable image, an unknown method tag, or
/// simply no watermark present — degrades to `""`.
pub fn extract(bytes: &[u8], method: WatermarkMethod) -> String {
    debug!("extract: method={method:?}, {} input bytes", bytes.len());
    let Ok(input_plane) = plane::decode(bytes) else {
        warn!("extract: image decode failed, returning empty string");
        return String::new();
    };

    match method {
        WatermarkMethod::Lsb => lsb::extract(&input_plane),
        WatermarkMethod::Dct | WatermarkMethod::Robust => {
            let truncated = input_plane.truncate_to_multiple(dct::BLOCK_SIZE);
            let bits = dct::extract(&truncated);
            frame::decode(&bits)
        }
        WatermarkMethod::Dwt => {
            let bits = dwt::extract(&input_plane);
            frame::decode(&bits)
        }
    }
}

/// Extracts using a method tag (`"lsb"`, `"dct"`, `"dwt"`, `"robust"`)
/// rather than the enum directly; an unrecognized tag degrades to `""`
/// exactly like any other extraction failure.
pub fn extract_by_tag(bytes: &[u8], method_tag: &str) -> String {
    match WatermarkMethod::parse(method_tag) {
        Some(method) => extract(bytes, method),
        None => String::new(),
    }
}

/// Embeds using a method tag; an unrecognized tag is the one case where
/// embed raises, via [`WatermarkError::UnknownMethod`].
pub fn embed_by_tag(bytes: &[u8], text: &str, method_tag: &str) -> Result<Vec<u8>> {
    match WatermarkMethod::parse(method_tag) {
        Some(method) => embed(bytes, text, method),
        None => Err(WatermarkError::UnknownMethod(method_tag.to_string())),
    }
}

/// Renders visible (non-recoverable) watermark text onto the image.
/// Defaults mirror the original tool: bottom-right, 50% opacity, 20pt.
pub fn embed_visible(
    bytes: &[u8],
    text: &str,
    position: Position,
    opacity: f32,
    point_size: f32,
) -> Result<Vec<u8>> {
    visible::embed_visible(bytes, text, position, opacity, point_size)
}

/// Composites a logo image onto the base image. Defaults mirror the
/// original tool: bottom-right, 70% opacity, 10% of base width.
pub fn embed_logo(
    base_bytes: &[u8],
    logo_bytes: &[u8],
    position: Position,
    opacity: f32,
    size_fraction: f32,
) -> Result<Vec<u8>> {
    logo::embed_logo(base_bytes, logo_bytes, position, opacity, size_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([((x + y) % 256) as u8, 120, ((x * 3) % 256) as u8])
        });
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn round_trip_each_method() {
        let png = sample_png(128, 128);
        for method in [
            WatermarkMethod::Lsb,
            WatermarkMethod::Dct,
            WatermarkMethod::Dwt,
            WatermarkMethod::Robust,
        ] {
            let watermarked = embed(&png, "secret", method).expect("embed should succeed");
            let recovered = extract(&watermarked, method);
            assert_eq!(recovered, "secret", "method {method:?} failed round trip");
        }
    }

    #[test]
    fn robust_aliases_dct() {
        let png = sample_png(128, 128);
        let via_robust = embed(&png, "abc", WatermarkMethod::Robust).unwrap();
        let via_dct_extract = extract(&via_robust, WatermarkMethod::Dct);
        assert_eq!(via_dct_extract, "abc");
    }

    #[test]
    fn unknown_method_tag_is_fatal_at_embed_and_empty_at_extract() {
        let png = sample_png(64, 64);
        assert!(embed_by_tag(&png, "x", "nonsense").is_err());
        assert_eq!(extract_by_tag(&png, "nonsense"), "");
    }

    #[test]
    fn decode_failure_is_fatal_at_embed_and_empty_at_extract() {
        let garbage = vec![0u8, 1, 2, 3];
        assert!(embed(&garbage, "x", WatermarkMethod::Lsb).is_err());
        assert_eq!(extract(&garbage, WatermarkMethod::Lsb), "");
    }

    #[test]
    fn payload_too_large_returns_input_unchanged() {
        let png = sample_png(8, 8);
        let huge_text = "A".repeat(500);
        let result = embed(&png, &huge_text, WatermarkMethod::Dct).unwrap();
        assert_eq!(result, png);
    }
}
