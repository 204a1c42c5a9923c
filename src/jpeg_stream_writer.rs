//! JPEG Codestream Writer utilities.
//!
//! This module provides the `JpegStreamWriter` which handles the generation
//! of JPEG markers and segments (SOI, DQT, SOF, DHT, DRI, SOS, RSTn, EOI) and
//! the byte-stuffed bit accumulator used for entropy-coded data.

use std::io::Write;

use crate::constants::BLOCK_SIZE;
use crate::error::JpegError;
use crate::jpeg1::huffman::{HuffmanIndex, get_category};
use crate::jpeg1::quantization::QuantIndex;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};

/// A writer for JPEG codestreams that manages marker emission and byte stuffing.
///
/// Pending entropy bits are kept MSB-aligned in `bits`; `n_bits` counts them.
pub struct JpegStreamWriter<W: Write> {
    sink: W,
    position: usize,
    bits: u32,
    n_bits: u32,
}

impl<W: Write> JpegStreamWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            position: 0,
            bits: 0,
            n_bits: 0,
        }
    }

    /// Number of bytes handed to the sink so far.
    pub fn len(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    pub fn write_byte(&mut self, value: u8) -> Result<(), JpegError> {
        self.write_bytes(&[value])
    }

    pub fn write_bytes(&mut self, values: &[u8]) -> Result<(), JpegError> {
        self.sink.write_all(values)?;
        self.position += values.len();
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), JpegError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_marker(&mut self, marker: JpegMarkerCode) -> Result<(), JpegError> {
        self.write_bytes(&[JPEG_MARKER_START_BYTE, marker as u8])
    }

    fn write_segment_header(&mut self, marker: JpegMarkerCode, length: usize) -> Result<(), JpegError> {
        self.write_marker(marker)?;
        self.write_u16(length as u16)
    }

    pub fn write_start_of_image(&mut self) -> Result<(), JpegError> {
        self.write_marker(JpegMarkerCode::StartOfImage)
    }

    pub fn write_end_of_image(&mut self) -> Result<(), JpegError> {
        self.write_marker(JpegMarkerCode::EndOfImage)
    }

    /// Writes every table into one DQT segment; table `i` gets destination `i`.
    pub fn write_dqt(&mut self, tables: &[[u8; BLOCK_SIZE]]) -> Result<(), JpegError> {
        let length = 2 + tables.len() * (1 + BLOCK_SIZE);
        self.write_segment_header(JpegMarkerCode::DefineQuantizationTable, length)?;
        for (id, table) in tables.iter().enumerate() {
            self.write_byte(id as u8)?; // Precision 0 (8-bit), ID
            self.write_bytes(table)?;
        }
        Ok(())
    }

    /// Writes an 8-bit frame header. Grayscale frames are 1x1 sampled; colour
    /// frames use 4:2:0 with luma on table 0 and chroma on table 1.
    pub fn write_start_of_frame(
        &mut self,
        marker: JpegMarkerCode,
        width: u16,
        height: u16,
        component_count: usize,
    ) -> Result<(), JpegError> {
        self.write_segment_header(marker, 8 + 3 * component_count)?;
        self.write_byte(8)?;
        self.write_u16(height)?;
        self.write_u16(width)?;
        self.write_byte(component_count as u8)?;
        if component_count == 1 {
            self.write_bytes(&[1, 0x11, 0x00])?;
        } else {
            for i in 0..component_count {
                let sampling = if i == 0 { 0x22 } else { 0x11 };
                self.write_bytes(&[(i + 1) as u8, sampling, QuantIndex::for_component(i) as u8])?;
            }
        }
        Ok(())
    }

    /// Writes the given standard tables into one DHT segment.
    pub fn write_dht(&mut self, tables: &[HuffmanIndex]) -> Result<(), JpegError> {
        let length = 2 + tables.iter().map(|t| 1 + 16 + t.spec().values.len()).sum::<usize>();
        self.write_segment_header(JpegMarkerCode::DefineHuffmanTable, length)?;
        for table in tables {
            let spec = table.spec();
            self.write_byte(table.class_and_destination())?;
            self.write_bytes(&spec.counts)?;
            self.write_bytes(spec.values)?;
        }
        Ok(())
    }

    pub fn write_dri(&mut self, restart_interval: u16) -> Result<(), JpegError> {
        self.write_segment_header(JpegMarkerCode::DefineRestartInterval, 4)?;
        self.write_u16(restart_interval)
    }

    /// Writes an SOS header for the given frame component indices. Component
    /// `i` is selected by id `i + 1`; luma uses table pair 0, chroma pair 1.
    pub fn write_start_of_scan(
        &mut self,
        components: &[usize],
        spectral_start: u8,
        spectral_end: u8,
        approx_high: u8,
        approx_low: u8,
    ) -> Result<(), JpegError> {
        self.write_segment_header(JpegMarkerCode::StartOfScan, 6 + 2 * components.len())?;
        self.write_byte(components.len() as u8)?;
        for &i in components {
            let table_sel = if i == 0 { 0x00 } else { 0x11 };
            self.write_bytes(&[(i + 1) as u8, table_sel])?;
        }
        self.write_bytes(&[spectral_start, spectral_end, (approx_high << 4) | (approx_low & 0x0F)])
    }

    /// Emits the low `n_bits` bits of `bits`. Requires `n_bits <= 16` and
    /// `bits < 1 << n_bits`.
    pub fn emit(&mut self, bits: u32, n_bits: u32) -> Result<(), JpegError> {
        if n_bits == 0 {
            return Ok(());
        }
        let mut n = n_bits + self.n_bits;
        let mut acc = (bits << (32 - n)) | self.bits;
        while n >= 8 {
            let byte = (acc >> 24) as u8;
            self.write_byte(byte)?;
            if byte == JPEG_MARKER_START_BYTE {
                self.write_byte(0x00)?;
            }
            acc <<= 8;
            n -= 8;
        }
        self.bits = acc;
        self.n_bits = n;
        Ok(())
    }

    /// Emits the Huffman code of `value` from one of the standard tables.
    pub fn emit_huff(&mut self, table: HuffmanIndex, value: u8) -> Result<(), JpegError> {
        let (code, length) = table.lut().code(value);
        if length == 0 {
            return Err(JpegError::InvalidArgument("value has no Huffman code"));
        }
        self.emit(code, length)
    }

    /// Emits `run << 4 | category` followed by the `category`-bit literal of `value`.
    pub fn emit_huff_rle(&mut self, table: HuffmanIndex, run: u32, value: i32) -> Result<(), JpegError> {
        let category = get_category(value);
        let literal = if value < 0 { value - 1 } else { value };
        self.emit_huff(table, ((run << 4) | category) as u8)?;
        if category > 0 {
            self.emit(literal as u32 & ((1 << category) - 1), category)?;
        }
        Ok(())
    }

    /// Fills the partial byte with 1-bits and clears the accumulator.
    pub fn pad_to_byte(&mut self) -> Result<(), JpegError> {
        if self.n_bits > 0 {
            let needed = 8 - self.n_bits;
            self.emit((1 << needed) - 1, needed)?;
        }
        self.bits = 0;
        self.n_bits = 0;
        Ok(())
    }

    /// Terminates an entropy-coded segment: seven 1-bits, then (progressive
    /// scans only) alignment of whatever is still pending.
    pub fn finish_scan(&mut self, progressive: bool) -> Result<(), JpegError> {
        self.emit(0x7F, 7)?;
        if progressive {
            self.pad_to_byte()?;
        }
        self.bits = 0;
        self.n_bits = 0;
        Ok(())
    }

    /// Aligns the entropy data and writes `RSTn` for `index` modulo 8.
    pub fn write_restart(&mut self, index: u8) -> Result<(), JpegError> {
        self.pad_to_byte()?;
        self.write_marker(JpegMarkerCode::restart(index))
    }

    /// Flushes the sink and hands it back.
    pub fn finish(mut self) -> Result<W, JpegError> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
