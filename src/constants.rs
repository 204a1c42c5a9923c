/// Number of coefficients in an 8x8 block.
pub const BLOCK_SIZE: usize = 64;

/// Highest number of frame components the decoder tracks state for.
pub const MAX_COMPONENTS: usize = 4;

/// Table destinations per class (Th / Tq in ISO/IEC 10918-1, B.2.4).
pub const MAX_TABLE_DESTINATIONS: usize = 4;

/// Largest Huffman code length in bits.
pub const MAX_HUFFMAN_CODE_LENGTH: usize = 16;

/// Quality used when the caller does not pick one.
pub const DEFAULT_QUALITY: u8 = 75;

/// SOF stores the dimensions as 16-bit values.
pub const MAXIMUM_DIMENSION: usize = u16::MAX as usize;

/// Upper bound for Ah and Al in a scan header.
pub const MAXIMUM_SUCCESSIVE_APPROXIMATION: u8 = 13;

/// Highest zig-zag index (Se).
pub const MAXIMUM_SPECTRAL_INDEX: u8 = 63;
