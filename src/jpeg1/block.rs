//! 8x8 coefficient blocks and the zig-zag permutation.

use crate::constants::BLOCK_SIZE;

/// 64 coefficients of an 8x8 block. Blocks hold natural (row-major) order
/// unless a function says otherwise.
pub type Block = [i32; BLOCK_SIZE];

/// Maps a zig-zag scan index to the natural index of the same coefficient.
pub const UNZIG: [usize; BLOCK_SIZE] = [
    0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Maps a natural index to its zig-zag scan index.
pub const ZIG: [usize; BLOCK_SIZE] = invert(&UNZIG);

const fn invert(permutation: &[usize; BLOCK_SIZE]) -> [usize; BLOCK_SIZE] {
    let mut inverse = [0usize; BLOCK_SIZE];
    let mut i = 0;
    while i < BLOCK_SIZE {
        inverse[permutation[i]] = i;
        i += 1;
    }
    inverse
}

/// Reorders a natural-order block into zig-zag order.
pub fn to_zigzag(natural: &Block) -> Block {
    let mut zigzag = [0i32; BLOCK_SIZE];
    for (zig, coefficient) in zigzag.iter_mut().enumerate() {
        *coefficient = natural[UNZIG[zig]];
    }
    zigzag
}

/// Reorders a zig-zag block into natural order.
pub fn to_natural(zigzag: &Block) -> Block {
    let mut natural = [0i32; BLOCK_SIZE];
    for (zig, &coefficient) in zigzag.iter().enumerate() {
        natural[UNZIG[zig]] = coefficient;
    }
    natural
}

/// Row-major grid of blocks for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientPlane {
    blocks_wide: usize,
    blocks_high: usize,
    blocks: Vec<Block>,
}

impl CoefficientPlane {
    pub fn new(blocks_wide: usize, blocks_high: usize) -> Self {
        Self {
            blocks_wide,
            blocks_high,
            blocks: vec![[0; BLOCK_SIZE]; blocks_wide * blocks_high],
        }
    }

    pub fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    pub fn blocks_high(&self) -> usize {
        self.blocks_high
    }

    pub fn block(&self, bx: usize, by: usize) -> &Block {
        &self.blocks[by * self.blocks_wide + bx]
    }

    pub fn block_mut(&mut self, bx: usize, by: usize) -> &mut Block {
        &mut self.blocks[by * self.blocks_wide + bx]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}
