//! Separable orthonormal 8x8 DCT-II/III kernel and the DCT-domain
//! embedder/extractor built on top of it.

use ndarray::Array2;
use rayon::prelude::*;
use std::sync::OnceLock;

use crate::plane::RgbPlane;

pub const BLOCK_SIZE: usize = 8;
pub const ALPHA: f64 = 80.0;

/// Mid-frequency coefficient positions (row, col), carrying the same bit
/// redundantly across all six.
pub const EMBED_POSITIONS: [(usize, usize); 6] = [(2, 3), (3, 2), (2, 2), (3, 3), (1, 2), (2, 1)];

type Block = [[f64; BLOCK_SIZE]; BLOCK_SIZE];

fn dct_matrix() -> &'static Block {
    static MATRIX: OnceLock<Block> = OnceLock::new();
    MATRIX.get_or_init(|| {
        let n = BLOCK_SIZE;
        let mut m = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
        for k in 0..n {
            let scale = if k == 0 {
                (1.0 / n as f64).sqrt()
            } else {
                (2.0 / n as f64).sqrt()
            };
            for x in 0..n {
                m[k][x] = scale * (std::f64::consts::PI / n as f64 * (x as f64 + 0.5) * k as f64).cos();
            }
        }
        m
    })
}

fn mat_mul(a: &Block, b: &Block) -> Block {
    let n = BLOCK_SIZE;
    let mut out = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[i][k] * b[k][j];
            }
            out[i][j] = sum;
        }
    }
    out
}

fn transpose(a: &Block) -> Block {
    let n = BLOCK_SIZE;
    let mut out = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
    for i in 0..n {
        for j in 0..n {
            out[j][i] = a[i][j];
        }
    }
    out
}

/// 2-D orthonormal DCT-II: `M . B . M^T`.
pub fn dct2d(block: &Block) -> Block {
    let m = dct_matrix();
    let mt = transpose(m);
    mat_mul(&mat_mul(m, block), &mt)
}

/// Inverse of [`dct2d`]: `M^T . Y . M`, exact since `M` is orthonormal.
pub fn idct2d(coeffs: &Block) -> Block {
    let m = dct_matrix();
    let mt = transpose(m);
    mat_mul(&mat_mul(&mt, coeffs), m)
}

fn read_block(channel: &Array2<f32>, row: usize, col: usize) -> Block {
    let mut b = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        for j in 0..BLOCK_SIZE {
            b[i][j] = channel[[row + i, col + j]] as f64;
        }
    }
    b
}

fn write_block(channel: &mut Array2<f32>, row: usize, col: usize, block: &Block) {
    for i in 0..BLOCK_SIZE {
        for j in 0..BLOCK_SIZE {
            channel[[row + i, col + j]] = block[i][j] as f32;
        }
    }
}

fn block_capacity(height: usize, width: usize) -> usize {
    (height / BLOCK_SIZE) * (width / BLOCK_SIZE)
}

/// Embeds `bits` into `plane` (already truncated to a multiple of 8).
/// Returns `None` if the plane's block capacity is smaller than
/// `bits.len()` — the caller is expected to fall back to the untouched
/// input bytes in that case, per the payload-too-large contract.
pub fn embed(plane: &RgbPlane, bits: &[bool]) -> Option<RgbPlane> {
    let height = plane.height();
    let width = plane.width();
    let capacity = block_capacity(height, width);
    if bits.len() > capacity {
        return None;
    }

    let mut out = plane.clone();
    let channels: Vec<&mut Array2<f32>> = out.channels_mut().into_iter().collect();
    channels.into_par_iter().for_each(|channel| {
        let blocks_per_row = width / BLOCK_SIZE;
        for k in 0..bits.len() {
            let row = (k / blocks_per_row) * BLOCK_SIZE;
            let col = (k % blocks_per_row) * BLOCK_SIZE;
            let block = read_block(channel, row, col);
            let mut coeffs = dct2d(&block);
            let bit = bits[k];
            for &(r, c) in &EMBED_POSITIONS {
                let magnitude = coeffs[r][c].abs() + ALPHA;
                coeffs[r][c] = if bit { magnitude } else { -magnitude };
            }
            let spatial = idct2d(&coeffs);
            write_block(channel, row, col, &spatial);
        }
    });
    Some(out)
}

/// Extracts the raw (pre-majority-vote-across-channels) bit stream: one
/// bit per block per channel, using the 6-position sign vote within each
/// block. Bits beyond what was actually embedded are noise and are
/// resolved downstream by the frame's length header.
fn extract_channel_bits(channel: &Array2<f32>, height: usize, width: usize) -> Vec<bool> {
    let blocks_per_row = width / BLOCK_SIZE;
    let blocks_per_col = height / BLOCK_SIZE;
    let total = blocks_per_row * blocks_per_col;
    (0..total)
        .map(|k| {
            let row = (k / blocks_per_row) * BLOCK_SIZE;
            let col = (k % blocks_per_row) * BLOCK_SIZE;
            let block = read_block(channel, row, col);
            let coeffs = dct2d(&block);
            let positive = EMBED_POSITIONS
                .iter()
                .filter(|&&(r, c)| coeffs[r][c] > 0.0)
                .count();
            positive > EMBED_POSITIONS.len() / 2
        })
        .collect()
}

/// Extracts the majority-voted bit stream across all three channels from
/// an already block-truncated plane.
pub fn extract(plane: &RgbPlane) -> Vec<bool> {
    let height = plane.height();
    let width = plane.width();
    let channels: Vec<&Array2<f32>> = plane.channels().into_iter().collect();
    let per_channel: Vec<Vec<bool>> = channels
        .into_par_iter()
        .map(|channel| extract_channel_bits(channel, height, width))
        .collect();

    let len = per_channel.iter().map(|v| v.len()).min().unwrap_or(0);
    (0..len)
        .map(|i| {
            let votes = per_channel.iter().filter(|v| v[i]).count();
            votes >= 2
        })
        .collect()
}
