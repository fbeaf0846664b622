//! Plain spatial-domain LSB steganography: one payload bit per pixel
//! channel, no transform, no cross-channel redundancy.
//!
//! Framing is independent of [`crate::frame`]: a 16-bit length header
//! (bit count) followed by the payload bits, since exact bit-compatibility
//! with any particular external LSB tool is not required.

use crate::plane::RgbPlane;

const HEADER_BITS: usize = 16;
const MIN_PAYLOAD_BITS: usize = 1;
const MAX_PAYLOAD_BITS: usize = 1000;

fn frame(text: &str) -> Vec<bool> {
    let payload_bits: Vec<bool> = text
        .bytes()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect();
    let header_len = payload_bits.len() as u16;
    let mut bits = Vec::with_capacity(HEADER_BITS + payload_bits.len());
    bits.extend((0..HEADER_BITS).rev().map(|i| (header_len >> i) & 1 == 1));
    bits.extend(payload_bits);
    bits
}

fn deframe(bits: &[bool]) -> String {
    if bits.len() < HEADER_BITS {
        return String::new();
    }
    let declared_len = bits[..HEADER_BITS]
        .iter()
        .fold(0u32, |acc, &b| (acc << 1) | (b as u32)) as usize;
    if !(MIN_PAYLOAD_BITS..=MAX_PAYLOAD_BITS).contains(&declared_len) {
        return String::new();
    }
    if bits.len() < HEADER_BITS + declared_len {
        return String::new();
    }
    let payload = &bits[HEADER_BITS..HEADER_BITS + declared_len];
    let mut text = String::new();
    for byte_bits in payload.chunks(8) {
        if byte_bits.len() < 8 {
            break;
        }
        let code = byte_bits.iter().fold(0u32, |acc, &b| (acc << 1) | (b as u32)) as u8;
        if (32..=126).contains(&code) {
            text.push(code as char);
        }
    }
    text
}

/// Total LSB capacity of a plane: one bit per pixel, across all three
/// channels laid out sequentially (R plane first, then G, then B).
fn capacity_bits(plane: &RgbPlane) -> usize {
    plane.height() * plane.width() * 3
}

/// Embeds `text` into the least-significant bit of every sample,
/// sequentially across R, then G, then B planes, row-major. Returns
/// `None` if the framed payload exceeds the plane's capacity.
pub fn embed(plane: &RgbPlane, text: &str) -> Option<RgbPlane> {
    let bits = frame(text);
    if bits.len() > capacity_bits(plane) {
        return None;
    }

    let mut out = plane.clone();
    let channels = out.channels_mut();
    let mut bit_index = 0usize;
    'outer: for channel in channels {
        let (h, w) = channel.dim();
        for y in 0..h {
            for x in 0..w {
                if bit_index >= bits.len() {
                    break 'outer;
                }
                let sample = channel[[y, x]].round().clamp(0.0, 255.0) as u8;
                let cleared = sample & !1;
                let with_bit = cleared | (bits[bit_index] as u8);
                channel[[y, x]] = with_bit as f32;
                bit_index += 1;
            }
        }
    }
    Some(out)
}

/// Extracts the least-significant bit of every sample in the same
/// traversal order as [`embed`] and deframes the payload. Never fails:
/// an image with no embedded watermark simply yields `""`.
pub fn extract(plane: &RgbPlane) -> String {
    let channels = plane.channels();
    let max_bits = capacity_bits(plane).min(HEADER_BITS + MAX_PAYLOAD_BITS);
    let mut bits = Vec::with_capacity(max_bits);
    'outer: for channel in channels {
        let (h, w) = channel.dim();
        for y in 0..h {
            for x in 0..w {
                if bits.len() >= max_bits {
                    break 'outer;
                }
                let sample = channel[[y, x]].round().clamp(0.0, 255.0) as u8;
                bits.push(sample & 1 == 1);
            }
        }
    }
    deframe(&bits)
}
