//! Huffman coding implementation for JPEG 1.
//! Handles the standard Annex K tables, canonical code assignment and the
//! byte-stuffed bit reader used by the scan decoder.

use std::sync::LazyLock;

use crate::constants::MAX_HUFFMAN_CODE_LENGTH;
use crate::error::JpegError;
use crate::jpeg_marker_code::JPEG_MARKER_START_BYTE;

/// Code-length counts plus the values they encode, as carried by a DHT segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanSpec {
    pub counts: [u8; MAX_HUFFMAN_CODE_LENGTH],
    pub values: &'static [u8],
}

/// Standard JPEG DC luminance Huffman table (Table K.3).
pub const STD_LUMINANCE_DC: HuffmanSpec = HuffmanSpec {
    counts: [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    values: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
};

/// Standard JPEG AC luminance Huffman table (Table K.5).
pub const STD_LUMINANCE_AC: HuffmanSpec = HuffmanSpec {
    counts: [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 125],
    values: &[
        0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12,
        0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
        0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08,
        0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
        0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16,
        0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
        0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
        0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
        0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
        0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
        0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79,
        0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
        0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98,
        0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
        0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6,
        0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
        0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4,
        0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
        0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea,
        0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
        0xf9, 0xfa,
    ],
};

/// Standard JPEG DC chrominance Huffman table (Table K.4).
pub const STD_CHROMINANCE_DC: HuffmanSpec = HuffmanSpec {
    counts: [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
    values: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
};

/// Standard JPEG AC chrominance Huffman table (Table K.6).
pub const STD_CHROMINANCE_AC: HuffmanSpec = HuffmanSpec {
    counts: [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 119],
    values: &[
        0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21,
        0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
        0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91,
        0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
        0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34,
        0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
        0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38,
        0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
        0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
        0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
        0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
        0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
        0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96,
        0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
        0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4,
        0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
        0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2,
        0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
        0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9,
        0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
        0xf9, 0xfa,
    ],
};

/// The four encoder tables, in DHT order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum HuffmanIndex {
    LuminanceDc = 0,
    LuminanceAc = 1,
    ChrominanceDc = 2,
    ChrominanceAc = 3,
}

impl HuffmanIndex {
    pub const ALL: [HuffmanIndex; 4] = [
        Self::LuminanceDc,
        Self::LuminanceAc,
        Self::ChrominanceDc,
        Self::ChrominanceAc,
    ];

    pub fn dc(component: usize) -> Self {
        if component == 0 { Self::LuminanceDc } else { Self::ChrominanceDc }
    }

    pub fn ac(component: usize) -> Self {
        if component == 0 { Self::LuminanceAc } else { Self::ChrominanceAc }
    }

    pub fn spec(self) -> &'static HuffmanSpec {
        match self {
            Self::LuminanceDc => &STD_LUMINANCE_DC,
            Self::LuminanceAc => &STD_LUMINANCE_AC,
            Self::ChrominanceDc => &STD_CHROMINANCE_DC,
            Self::ChrominanceAc => &STD_CHROMINANCE_AC,
        }
    }

    /// Table class and destination byte (`Tc << 4 | Th`) of the DHT entry.
    pub fn class_and_destination(self) -> u8 {
        match self {
            Self::LuminanceDc => 0x00,
            Self::LuminanceAc => 0x10,
            Self::ChrominanceDc => 0x01,
            Self::ChrominanceAc => 0x11,
        }
    }

    pub fn lut(self) -> &'static HuffmanLut {
        &HUFFMAN_LUTS[self as usize]
    }
}

/// Encode view of a spec. Entry `v` holds `(length << 24) | code`; zero means
/// the value has no code.
#[derive(Debug, Clone)]
pub struct HuffmanLut {
    entries: Vec<u32>,
}

impl HuffmanLut {
    pub fn compile(spec: &HuffmanSpec) -> Self {
        let max_value = spec.values.iter().copied().max().unwrap_or(0) as usize;
        let mut entries = vec![0u32; max_value + 1];
        let mut code = 0u32;
        let mut k = 0usize;
        for (i, &count) in spec.counts.iter().enumerate() {
            let length = ((i + 1) as u32) << 24;
            for _ in 0..count {
                entries[spec.values[k] as usize] = length | code;
                code += 1;
                k += 1;
            }
            code <<= 1;
        }
        Self { entries }
    }

    /// Returns `(code, length)` for `value`.
    pub fn code(&self, value: u8) -> (u32, u32) {
        let entry = self.entries.get(value as usize).copied().unwrap_or(0);
        (entry & ((1 << 24) - 1), entry >> 24)
    }
}

static HUFFMAN_LUTS: LazyLock<[HuffmanLut; 4]> =
    LazyLock::new(|| HuffmanIndex::ALL.map(|index| HuffmanLut::compile(index.spec())));

/// Number of bits needed for the magnitude of `value` (the JPEG "category").
pub fn get_category(value: i32) -> u32 {
    32 - value.unsigned_abs().leading_zeros()
}

/// Decode view of a DHT entry.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    pub values: Vec<u8>,
    pub min_code: [i32; MAX_HUFFMAN_CODE_LENGTH],
    pub max_code: [i32; MAX_HUFFMAN_CODE_LENGTH],
    pub val_ptr: [i32; MAX_HUFFMAN_CODE_LENGTH],
}

impl HuffmanTable {
    /// Builds a table from JPEG DHT lengths and values.
    pub fn build_from_dht(counts: &[u8; MAX_HUFFMAN_CODE_LENGTH], values: &[u8]) -> Result<Self, JpegError> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total == 0 {
            return Err(JpegError::Format("Huffman table has zero length"));
        }
        if total > 256 || total != values.len() {
            return Err(JpegError::Format("Huffman table has excessive length"));
        }

        let mut table = Self {
            values: values.to_vec(),
            min_code: [0; MAX_HUFFMAN_CODE_LENGTH],
            max_code: [-1; MAX_HUFFMAN_CODE_LENGTH],
            val_ptr: [0; MAX_HUFFMAN_CODE_LENGTH],
        };

        let mut code = 0i32;
        let mut val_idx = 0i32;
        for (i, &count) in counts.iter().enumerate() {
            if count != 0 {
                table.val_ptr[i] = val_idx;
                table.min_code[i] = code;
                code += count as i32;
                val_idx += count as i32;
                if code > 1 << (i + 1) {
                    return Err(JpegError::Format("bad Huffman tree"));
                }
                table.max_code[i] = code - 1;
            }
            code <<= 1;
        }
        Ok(table)
    }

    pub fn from_spec(spec: &HuffmanSpec) -> Result<Self, JpegError> {
        Self::build_from_dht(&spec.counts, spec.values)
    }

    /// Decodes the next symbol from the given JpegBitReader.
    pub fn decode(&self, reader: &mut JpegBitReader) -> Result<u8, JpegError> {
        let mut code = 0i32;
        for i in 0..MAX_HUFFMAN_CODE_LENGTH {
            code = (code << 1) | reader.decode_bit()? as i32;
            if code <= self.max_code[i] {
                let idx = self.val_ptr[i] + (code - self.min_code[i]);
                return self
                    .values
                    .get(idx as usize)
                    .copied()
                    .ok_or(JpegError::Format("bad Huffman code"));
            }
        }
        Err(JpegError::Format("bad Huffman code"))
    }
}

/// Reads entropy-coded bits, removing the stuffed zero after every 0xFF.
///
/// The reader stops at a marker: asking for more bits once the next bytes
/// are `FF xx` (xx != 0) is an error, which is how a truncated or
/// desynchronized segment surfaces.
pub struct JpegBitReader<'a> {
    source: &'a [u8],
    position: usize,
    bit_buffer: u32,
    bits_in_buffer: u32,
}

impl<'a> JpegBitReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
            bit_buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Byte offset of the next unread byte, relative to the start of `source`.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Drops any buffered bits so that the next read starts at a byte boundary.
    pub fn reset(&mut self) {
        self.bit_buffer = 0;
        self.bits_in_buffer = 0;
    }

    fn read_byte_stuffed(&mut self) -> Result<u8, JpegError> {
        let byte = *self
            .source
            .get(self.position)
            .ok_or(JpegError::Format("short Huffman data"))?;
        if byte == JPEG_MARKER_START_BYTE {
            match self.source.get(self.position + 1) {
                Some(0x00) => self.position += 2,
                Some(_) => return Err(JpegError::Format("missing 0xff00 sequence")),
                None => return Err(JpegError::Format("short Huffman data")),
            }
        } else {
            self.position += 1;
        }
        Ok(byte)
    }

    fn fill(&mut self, count: u32) -> Result<(), JpegError> {
        while self.bits_in_buffer < count {
            let byte = self.read_byte_stuffed()?;
            self.bit_buffer = (self.bit_buffer << 8) | byte as u32;
            self.bits_in_buffer += 8;
        }
        Ok(())
    }

    pub fn decode_bit(&mut self) -> Result<bool, JpegError> {
        Ok(self.decode_bits(1)? != 0)
    }

    /// Reads `count` (at most 16) raw bits, most significant first.
    pub fn decode_bits(&mut self, count: u32) -> Result<u32, JpegError> {
        if count == 0 {
            return Ok(0);
        }
        self.fill(count)?;
        let shift = self.bits_in_buffer - count;
        let value = (self.bit_buffer >> shift) & ((1 << count) - 1);
        self.bits_in_buffer = shift;
        self.bit_buffer &= (1u32 << shift).wrapping_sub(1);
        Ok(value)
    }

    /// Reads a `category`-bit literal and sign-extends it (F.2.2.1).
    pub fn receive_extend(&mut self, category: u8) -> Result<i32, JpegError> {
        if category == 0 {
            return Ok(0);
        }
        let t = category as u32;
        let bits = self.decode_bits(t)? as i32;
        if bits < 1 << (t - 1) {
            Ok(bits + (-1 << t) + 1)
        } else {
            Ok(bits)
        }
    }

    /// Moves past the next `FF <expected>` restart marker.
    ///
    /// `FF 00` pairs and `FF` fill bytes are skipped; any other marker is a
    /// format error. Returns `true` when bytes had to be skipped to find it.
    pub fn sync_to_restart(&mut self, expected: u8) -> Result<bool, JpegError> {
        self.reset();
        let mut skipped = false;
        loop {
            let (first, second) = match (self.source.get(self.position), self.source.get(self.position + 1)) {
                (Some(&a), Some(&b)) => (a, b),
                _ => return Err(JpegError::Format("short Huffman data")),
            };
            if first == JPEG_MARKER_START_BYTE {
                if second == expected {
                    self.position += 2;
                    return Ok(skipped);
                }
                match second {
                    JPEG_MARKER_START_BYTE => self.position += 1,
                    0x00 => self.position += 2,
                    _ => return Err(JpegError::Format("bad RST marker")),
                }
            } else if second == JPEG_MARKER_START_BYTE {
                self.position += 1;
            } else {
                self.position += 2;
            }
            skipped = true;
        }
    }
}
