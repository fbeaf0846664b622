//! Image codec adapter: raw bytes <-> float RGB pixel plane.

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use ndarray::Array2;
use std::io::Cursor;

use crate::error::{Result, WatermarkError};

/// Three equally-sized float channels, row-major `(height, width)`.
#[derive(Clone)]
pub struct RgbPlane {
    pub r: Array2<f32>,
    pub g: Array2<f32>,
    pub b: Array2<f32>,
}

impl RgbPlane {
    pub fn height(&self) -> usize {
        self.r.nrows()
    }

    pub fn width(&self) -> usize {
        self.r.ncols()
    }

    /// Per-channel iterator, in R, G, B order. Used to apply the same
    /// transform independently to each channel.
    pub fn channels_mut(&mut self) -> [&mut Array2<f32>; 3] {
        [&mut self.r, &mut self.g, &mut self.b]
    }

    pub fn channels(&self) -> [&Array2<f32>; 3] {
        [&self.r, &self.g, &self.b]
    }

    /// Truncates `(height, width)` to the largest multiples of `block`
    /// not exceeding the current dimensions. Used by the DCT path, which
    /// requires whole 8x8 blocks; a no-op when dimensions already align.
    pub fn truncate_to_multiple(&self, block: usize) -> RgbPlane {
        let h = (self.height() / block) * block;
        let w = (self.width() / block) * block;
        RgbPlane {
            r: self.r.slice(ndarray::s![0..h, 0..w]).to_owned(),
            g: self.g.slice(ndarray::s![0..h, 0..w]).to_owned(),
            b: self.b.slice(ndarray::s![0..h, 0..w]).to_owned(),
        }
    }

    /// Crops all three channels to the common `(h, w)`, used by the DWT
    /// path after inverse transform when border expansion has made the
    /// reconstructed channels larger than the original.
    pub fn crop_to(&self, h: usize, w: usize) -> RgbPlane {
        RgbPlane {
            r: self.r.slice(ndarray::s![0..h, 0..w]).to_owned(),
            g: self.g.slice(ndarray::s![0..h, 0..w]).to_owned(),
            b: self.b.slice(ndarray::s![0..h, 0..w]).to_owned(),
        }
    }
}

/// Decodes image bytes (any format the `image` crate recognizes) into an
/// [`RgbPlane`] of `f32` samples.
pub fn decode(bytes: &[u8]) -> Result<RgbPlane> {
    let img = image::load_from_memory(bytes)?;
    Ok(from_dynamic_image(&img))
}

pub fn from_dynamic_image(img: &DynamicImage) -> RgbPlane {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut r = Array2::<f32>::zeros((h, w));
    let mut g = Array2::<f32>::zeros((h, w));
    let mut b = Array2::<f32>::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let p = rgb.get_pixel(x as u32, y as u32);
            r[[y, x]] = p[0] as f32;
            g[[y, x]] = p[1] as f32;
            b[[y, x]] = p[2] as f32;
        }
    }
    RgbPlane { r, g, b }
}

/// Clips every sample to `[0, 255]` and re-encodes as PNG bytes.
pub fn encode_png(plane: &RgbPlane) -> Result<Vec<u8>> {
    let h = plane.height();
    let w = plane.width();
    let mut raw = Vec::with_capacity(h * w * 3);
    for y in 0..h {
        for x in 0..w {
            raw.push(plane.r[[y, x]].clamp(0.0, 255.0) as u8);
            raw.push(plane.g[[y, x]].clamp(0.0, 255.0) as u8);
            raw.push(plane.b[[y, x]].clamp(0.0, 255.0) as u8);
        }
    }
    let mut out = Cursor::new(Vec::new());
    let encoder = PngEncoder::new(&mut out);
    encoder
        .write_image(&raw, w as u32, h as u32, ExtendedColorType::Rgb8)
        .map_err(WatermarkError::Decode)?;
    Ok(out.into_inner())
}

/// Re-encodes image bytes at a given format without touching pixel data,
/// used by callers that just need format conversion (e.g. robustness
/// utilities' JPEG re-encode).
pub fn reencode(bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)?;
    Ok(out.into_inner())
}
