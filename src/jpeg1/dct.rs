//! Discrete Cosine Transform (DCT) implementation for JPEG 1.
//!
//! Separable form of the ISO/IEC 10918-1 Annex A.3.3 definitions. Both
//! directions use the same cosine basis table, computed once per process.

use std::f32::consts::{FRAC_1_SQRT_2, PI};
use std::sync::LazyLock;

use crate::constants::BLOCK_SIZE;

/// `BASIS[u][x] = C(u) * cos((2x + 1) * u * PI / 16)`.
static BASIS: LazyLock<[[f32; 8]; 8]> = LazyLock::new(|| {
    let mut basis = [[0.0f32; 8]; 8];
    for (u, row) in basis.iter_mut().enumerate() {
        let cu = if u == 0 { FRAC_1_SQRT_2 } else { 1.0 };
        for (x, value) in row.iter_mut().enumerate() {
            *value = cu * ((((2 * x + 1) * u) as f32 * PI) / 16.0).cos();
        }
    }
    basis
});

/// Forward DCT of a level-shifted block of samples (row-major).
pub fn fdct_8x8(input: &[f32; BLOCK_SIZE], output: &mut [f32; BLOCK_SIZE]) {
    let basis = &*BASIS;
    let mut rows = [0.0f32; BLOCK_SIZE];
    for x in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0f32;
            for y in 0..8 {
                sum += input[x * 8 + y] * basis[v][y];
            }
            rows[x * 8 + v] = sum;
        }
    }
    for u in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0f32;
            for x in 0..8 {
                sum += basis[u][x] * rows[x * 8 + v];
            }
            output[u * 8 + v] = 0.25 * sum;
        }
    }
}

/// Inverse DCT; the output still needs the +128 level shift.
pub fn idct_8x8(input: &[f32; BLOCK_SIZE], output: &mut [f32; BLOCK_SIZE]) {
    let basis = &*BASIS;
    let mut rows = [0.0f32; BLOCK_SIZE];
    for u in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0f32;
            for v in 0..8 {
                sum += input[u * 8 + v] * basis[v][y];
            }
            rows[u * 8 + y] = sum;
        }
    }
    for x in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0f32;
            for u in 0..8 {
                sum += basis[u][x] * rows[u * 8 + y];
            }
            output[x * 8 + y] = 0.25 * sum;
        }
    }
}
