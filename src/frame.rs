//! Length-prefixed payload framing shared by the DCT and DWT embedders.
//!
//! Frame layout: a 32-bit big-endian length header (bit count of the
//! payload) followed by one 8-bit code unit per character, MSB first.

const HEADER_BITS: usize = 32;
const MIN_PAYLOAD_BITS: usize = 1;
const MAX_PAYLOAD_BITS: usize = 1000;

/// Encodes `text` into a length-prefixed bit stream. Each character is
/// truncated to its low 8 bits (callers are expected to pass printable
/// ASCII for a reliable round trip, per the public API contract).
pub fn encode(text: &str) -> Vec<bool> {
    let payload_bits: Vec<bool> = text
        .bytes()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect();

    let header_len = payload_bits.len() as u32;
    let mut bits = Vec::with_capacity(HEADER_BITS + payload_bits.len());
    bits.extend((0..HEADER_BITS).rev().map(|i| (header_len >> i) & 1 == 1));
    bits.extend(payload_bits);
    bits
}

/// Decodes a bit stream produced by [`encode`]. Returns an empty string
/// (never an error) if the declared length is out of `[1, 1000]` or the
/// stream is too short; bytes outside printable ASCII (`32..=126`) are
/// silently skipped rather than surfacing as garbage characters.
pub fn decode(bits: &[bool]) -> String {
    if bits.len() < HEADER_BITS {
        return String::new();
    }
    let declared_len = bits_to_u32(&bits[..HEADER_BITS]) as usize;
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
        let code = bits_to_u32(byte_bits) as u8;
        if (32..=126).contains(&code) {
            text.push(code as char);
        }
    }
    text
}

fn bits_to_u32(bits: &[bool]) -> u32 {
    bits.iter().fold(0u32, |acc, &b| (acc << 1) | (b as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_simple() {
        let bits = encode("hello");
        assert_eq!(decode(&bits), "hello");
    }

    #[test]
    fn empty_text_is_out_of_range() {
        // 0 payload bits is below MIN_PAYLOAD_BITS, so the frame itself
        // is never produced for a meaningful round trip check against an
        // attacker-controlled bit stream, but decode must still reject it.
        let mut bits = vec![false; HEADER_BITS];
        assert_eq!(decode(&bits), "");
        bits[HEADER_BITS - 1] = false;
        assert_eq!(decode(&bits), "");
    }

    #[test]
    fn declared_length_too_large_yields_empty() {
        let mut bits = Vec::new();
        let n = 1001u32;
        bits.extend((0..HEADER_BITS).rev().map(|i| (n >> i) & 1 == 1));
        bits.extend(std::iter::repeat(false).take(n as usize));
        assert_eq!(decode(&bits), "");
    }

    #[test]
    fn truncated_stream_yields_empty() {
        let mut bits = encode("hello world");
        bits.truncate(bits.len() - 1);
        assert_eq!(decode(&bits), "");
    }

    #[test]
    fn non_printable_bytes_are_skipped() {
        let mut bits = Vec::new();
        let payload = [0x01u8, b'h', b'i', 0x00];
        let payload_bits: Vec<bool> = payload
            .iter()
            .flat_map(|b| (0..8).rev().map(move |i| (b >> i) & 1 == 1))
            .collect();
        let n = payload_bits.len() as u32;
        bits.extend((0..HEADER_BITS).rev().map(|i| (n >> i) & 1 == 1));
        bits.extend(payload_bits);
        assert_eq!(decode(&bits), "hi");
    }

    #[test]
    fn decoder_never_reads_past_declared_length() {
        let mut bits = encode("ab");
        bits.extend(std::iter::repeat(true).take(64));
        assert_eq!(decode(&bits), "ab");
    }
}
