//! Quantization implementation for JPEG 1.
//! Handles quantization tables and the quantization of DCT coefficients.

use crate::constants::{BLOCK_SIZE, DEFAULT_QUALITY};
use crate::jpeg1::block::{Block, UNZIG};

/// Standard JPEG luminance quantization table (Table K.1), zig-zag order.
pub const UNSCALED_LUMINANCE_QUANT_TABLE: [u8; BLOCK_SIZE] = [
    16, 11, 12, 14, 12, 10, 16, 14,
    13, 14, 18, 17, 16, 19, 24, 40,
    26, 24, 22, 22, 24, 49, 35, 37,
    29, 40, 58, 51, 61, 60, 57, 51,
    56, 55, 64, 72, 92, 78, 64, 68,
    87, 69, 55, 56, 80, 109, 81, 87,
    95, 98, 103, 104, 103, 62, 77, 113,
    121, 112, 100, 120, 92, 101, 103, 99,
];

/// Standard JPEG chrominance quantization table (Table K.2), zig-zag order.
pub const UNSCALED_CHROMINANCE_QUANT_TABLE: [u8; BLOCK_SIZE] = [
    17, 18, 18, 24, 21, 24, 47, 26,
    26, 47, 99, 66, 56, 66, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Quantization table slots written by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum QuantIndex {
    Luminance = 0,
    Chrominance = 1,
}

impl QuantIndex {
    /// Component 0 is luma, every other component is chroma.
    pub fn for_component(component: usize) -> Self {
        if component == 0 { Self::Luminance } else { Self::Chrominance }
    }
}

/// Clamps a quality rating to 1..=100 and converts it to a percentage scale.
pub fn quality_scale(quality: u8) -> u32 {
    let quality = quality.clamp(1, 100) as u32;
    if quality < 50 { 5000 / quality } else { 200 - 2 * quality }
}

/// Scales a quantization table by a quality factor (1-100).
pub fn get_scaled_quant_table(base_table: &[u8; BLOCK_SIZE], quality: u8) -> [u8; BLOCK_SIZE] {
    let scale = quality_scale(quality);
    let mut scaled_table = [0u8; BLOCK_SIZE];
    for (scaled, &base) in scaled_table.iter_mut().zip(base_table) {
        let value = (base as u32 * scale + 50) / 100;
        *scaled = value.clamp(1, 255) as u8;
    }
    scaled_table
}

/// The luminance and chrominance tables of one encode call, zig-zag order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTables {
    tables: [[u8; BLOCK_SIZE]; 2],
}

impl QuantizationTables {
    pub fn new(quality: u8) -> Self {
        Self {
            tables: [
                get_scaled_quant_table(&UNSCALED_LUMINANCE_QUANT_TABLE, quality),
                get_scaled_quant_table(&UNSCALED_CHROMINANCE_QUANT_TABLE, quality),
            ],
        }
    }

    pub fn table(&self, index: QuantIndex) -> &[u8; BLOCK_SIZE] {
        &self.tables[index as usize]
    }

    pub fn all(&self) -> &[[u8; BLOCK_SIZE]] {
        &self.tables
    }
}

impl Default for QuantizationTables {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

/// Quantizes natural-order DCT coefficients into a zig-zag ordered block,
/// rounding to the nearest integer.
pub fn quantize_block(dct_block: &[f32; BLOCK_SIZE], quant_table: &[u8; BLOCK_SIZE]) -> Block {
    let mut output = [0i32; BLOCK_SIZE];
    for (zig, quantized) in output.iter_mut().enumerate() {
        let q_val = quant_table[zig] as f32;
        *quantized = (dct_block[UNZIG[zig]] / q_val).round() as i32;
    }
    output
}

/// De-quantizes a natural-order coefficient block with a zig-zag ordered table.
pub fn dequantize_block(block: &Block, quant_table: &[u16; BLOCK_SIZE]) -> [f32; BLOCK_SIZE] {
    let mut output = [0.0f32; BLOCK_SIZE];
    for (zig, &q_val) in quant_table.iter().enumerate() {
        let natural = UNZIG[zig];
        output[natural] = block[natural] as f32 * q_val as f32;
    }
    output
}
