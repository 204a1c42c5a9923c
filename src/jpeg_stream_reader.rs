//! JPEG Codestream Reader utilities.
//!
//! `JpegStreamReader` walks the marker segments of an interchange stream,
//! keeps the tables they define, and hands scan headers to the decoder. The
//! entropy-coded data itself is read by the scan decoder through
//! `remaining_data` and `advance`.

use crate::constants::{BLOCK_SIZE, MAX_COMPONENTS, MAX_HUFFMAN_CODE_LENGTH, MAX_TABLE_DESTINATIONS, MAXIMUM_SPECTRAL_INDEX};
use crate::error::JpegError;
use crate::image::Subsampling;
use crate::jpeg1::frame::{FrameComponent, FrameHeader, FrameKind};
use crate::jpeg1::huffman::HuffmanTable;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};

/// Component selector of a scan, resolved to the frame component index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponentSelector {
    pub component_index: usize,
    pub dc_table: usize,
    pub ac_table: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: Vec<ScanComponentSelector>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub approx_high: u8,
    pub approx_low: u8,
}

impl ScanHeader {
    pub fn component_indices(&self) -> Vec<usize> {
        self.components.iter().map(|c| c.component_index).collect()
    }

    pub fn selector(&self, component_index: usize) -> Option<&ScanComponentSelector> {
        self.components.iter().find(|c| c.component_index == component_index)
    }

    pub fn is_refinement(&self) -> bool {
        self.approx_high != 0
    }
}

/// What `read_next_segment` consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Frame,
    Tables,
    /// SOS header; the reader is positioned at the first entropy-coded byte.
    Scan(ScanHeader),
    /// An RSTn outside entropy-coded data.
    Restart,
    /// A segment the decoder has no use for, by marker code byte.
    Skipped(u8),
    EndOfImage,
}

pub struct JpegStreamReader<'a> {
    source: &'a [u8],
    position: usize,
    frame: Option<FrameHeader>,
    pub quantization_tables: [[u16; BLOCK_SIZE]; MAX_TABLE_DESTINATIONS],
    pub huffman_tables_dc: [Option<HuffmanTable>; MAX_TABLE_DESTINATIONS],
    pub huffman_tables_ac: [Option<HuffmanTable>; MAX_TABLE_DESTINATIONS],
    pub restart_interval: u16,
}

impl<'a> JpegStreamReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
            frame: None,
            quantization_tables: [[0u16; BLOCK_SIZE]; MAX_TABLE_DESTINATIONS],
            huffman_tables_dc: [const { None }; MAX_TABLE_DESTINATIONS],
            huffman_tables_ac: [const { None }; MAX_TABLE_DESTINATIONS],
            restart_interval: 0,
        }
    }

    pub fn frame(&self) -> Option<&FrameHeader> {
        self.frame.as_ref()
    }

    pub fn remaining_data(&self) -> &'a [u8] {
        &self.source[self.position.min(self.source.len())..]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn advance(&mut self, count: usize) {
        self.position += count;
    }

    /// Reads segments up to and including the frame header.
    pub fn read_header(&mut self) -> Result<&FrameHeader, JpegError> {
        if self.position == 0 {
            self.read_start_of_image()?;
        }
        while self.frame.is_none() {
            if self.read_next_segment()? == Segment::EndOfImage {
                return Err(JpegError::Format("missing SOF marker"));
            }
        }
        self.frame.as_ref().ok_or(JpegError::Format("missing SOF marker"))
    }

    pub fn read_u8(&mut self) -> Result<u8, JpegError> {
        let val = *self
            .source
            .get(self.position)
            .ok_or(JpegError::Format("unexpected end of data"))?;
        self.position += 1;
        Ok(val)
    }

    pub fn read_u16(&mut self) -> Result<u16, JpegError> {
        let b1 = self.read_u8()? as u16;
        let b2 = self.read_u8()? as u16;
        Ok((b1 << 8) | b2)
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], JpegError> {
        let source: &'a [u8] = self.source;
        let bytes = source
            .get(self.position..self.position + count)
            .ok_or(JpegError::Format("unexpected end of data"))?;
        self.position += count;
        Ok(bytes)
    }

    /// Reads the code byte of the next marker. Bytes that are not part of a
    /// marker (entropy padding, stray `FF 00` pairs, `FF` fill bytes) are
    /// skipped.
    pub fn read_marker(&mut self) -> Result<u8, JpegError> {
        loop {
            if self.read_u8()? != JPEG_MARKER_START_BYTE {
                continue;
            }
            let mut code = self.read_u8()?;
            while code == JPEG_MARKER_START_BYTE {
                code = self.read_u8()?;
            }
            if code != 0x00 {
                return Ok(code);
            }
        }
    }

    fn read_start_of_image(&mut self) -> Result<(), JpegError> {
        let soi = [JPEG_MARKER_START_BYTE, JpegMarkerCode::StartOfImage as u8];
        if self.source.get(..2) != Some(&soi[..]) {
            return Err(JpegError::Format("missing SOI marker"));
        }
        self.position = 2;
        Ok(())
    }

    /// Reads one marker and its segment.
    pub fn read_next_segment(&mut self) -> Result<Segment, JpegError> {
        if self.position == 0 {
            self.read_start_of_image()?;
        }
        let code = self.read_marker()?;
        let marker = match JpegMarkerCode::try_from(code) {
            Ok(marker) => marker,
            // JPG, DHP, EXP and JPGn carry a length like any other segment.
            Err(_) if code >= 0xC0 => {
                log::debug!("skipping reserved marker FF{code:02X}");
                self.skip_segment()?;
                return Ok(Segment::Skipped(code));
            }
            Err(_) => return Err(JpegError::Format("unknown marker")),
        };
        log::trace!("marker {marker:?} at offset {}", self.position - 2);
        match marker {
            JpegMarkerCode::StartOfFrameBaseline => self.read_start_of_frame_segment(FrameKind::Baseline)?,
            JpegMarkerCode::StartOfFrameExtendedSequential => {
                self.read_start_of_frame_segment(FrameKind::ExtendedSequential)?
            }
            JpegMarkerCode::StartOfFrameProgressive => self.read_start_of_frame_segment(FrameKind::Progressive)?,
            JpegMarkerCode::StartOfFrameLossless
            | JpegMarkerCode::StartOfFrameDifferentialSequential
            | JpegMarkerCode::StartOfFrameDifferentialProgressive
            | JpegMarkerCode::StartOfFrameDifferentialLossless => {
                return Err(JpegError::Unsupported("only sequential and progressive DCT frames are supported"));
            }
            JpegMarkerCode::StartOfFrameArithmeticSequential
            | JpegMarkerCode::StartOfFrameArithmeticProgressive
            | JpegMarkerCode::StartOfFrameArithmeticLossless
            | JpegMarkerCode::StartOfFrameArithmeticDifferentialSequential
            | JpegMarkerCode::StartOfFrameArithmeticDifferentialProgressive
            | JpegMarkerCode::StartOfFrameArithmeticDifferentialLossless
            | JpegMarkerCode::DefineArithmeticCodingConditioning => {
                return Err(JpegError::Unsupported("arithmetic coding"));
            }
            JpegMarkerCode::DefineQuantizationTable => {
                self.read_dqt_segment()?;
                return Ok(Segment::Tables);
            }
            JpegMarkerCode::DefineHuffmanTable => {
                self.read_dht_segment()?;
                return Ok(Segment::Tables);
            }
            JpegMarkerCode::DefineRestartInterval => {
                self.read_dri_segment()?;
                return Ok(Segment::Tables);
            }
            JpegMarkerCode::StartOfScan => return Ok(Segment::Scan(self.read_start_of_scan_segment()?)),
            JpegMarkerCode::EndOfImage => return Ok(Segment::EndOfImage),
            JpegMarkerCode::StartOfImage => return Err(JpegError::Format("unexpected SOI marker")),
            m if m.is_restart() => return Ok(Segment::Restart),
            other => {
                self.skip_segment()?;
                return Ok(Segment::Skipped(other as u8));
            }
        }
        Ok(Segment::Frame)
    }

    pub fn skip_segment(&mut self) -> Result<(), JpegError> {
        let length = self.read_u16()? as usize;
        if length < 2 {
            return Err(JpegError::Format("segment length too short"));
        }
        self.read_bytes(length - 2)?;
        Ok(())
    }

    fn read_start_of_frame_segment(&mut self, kind: FrameKind) -> Result<(), JpegError> {
        if self.frame.is_some() {
            return Err(JpegError::Format("multiple SOF markers"));
        }
        let length = self.read_u16()? as usize;
        if length < 8 {
            return Err(JpegError::Format("SOF has wrong length"));
        }
        let precision = self.read_u8()?;
        let height = self.read_u16()? as usize;
        let width = self.read_u16()? as usize;
        let component_count = self.read_u8()? as usize;
        if length != 8 + 3 * component_count {
            return Err(JpegError::Format("SOF has wrong length"));
        }
        if precision != 8 {
            return Err(JpegError::Unsupported("precision other than 8 bits"));
        }
        if component_count != 1 && component_count != 3 {
            return Err(JpegError::Unsupported("number of components other than 1 or 3"));
        }
        if width == 0 || height == 0 {
            return Err(JpegError::Unsupported("zero-sized frame"));
        }

        let mut components: Vec<FrameComponent> = Vec::with_capacity(component_count);
        for _ in 0..component_count {
            let id = self.read_u8()?;
            let sampling = self.read_u8()?;
            let tq = self.read_u8()? as usize;
            if components.iter().any(|c| c.id == id) {
                return Err(JpegError::Format("repeated component identifier"));
            }
            if tq >= MAX_TABLE_DESTINATIONS {
                return Err(JpegError::Format("bad Tq value"));
            }
            let (mut h, mut v) = ((sampling >> 4) as usize, (sampling & 0x0F) as usize);
            if !(1..=4).contains(&h) || !(1..=4).contains(&v) {
                return Err(JpegError::Format("luma/chroma subsampling ratio"));
            }
            if h == 3 || v == 3 {
                return Err(JpegError::Unsupported("luma/chroma subsampling ratio"));
            }
            if component_count == 1 {
                // A single component is always coded as one block per MCU.
                h = 1;
                v = 1;
            }
            components.push(FrameComponent { id, h, v, quant_table_dest: tq });
        }

        if let [y, cb, cr] = components.as_slice() {
            let supported = cb.h == cr.h
                && cb.v == cr.v
                && y.h % cb.h == 0
                && y.v % cb.v == 0
                && Subsampling::from_divisors(y.h / cb.h, y.v / cb.v).is_some();
            if !supported {
                return Err(JpegError::Unsupported("luma/chroma subsampling ratio"));
            }
        }

        let frame = FrameHeader { kind, width, height, components };
        log::debug!(
            "frame {:?} {}x{}, {} component(s), subsampling {:?}",
            frame.kind,
            frame.width,
            frame.height,
            frame.components.len(),
            frame.subsampling()
        );
        self.frame = Some(frame);
        Ok(())
    }

    pub fn read_dqt_segment(&mut self) -> Result<(), JpegError> {
        let length = self.read_u16()? as usize;
        let mut remaining = length
            .checked_sub(2)
            .ok_or(JpegError::Format("DQT has wrong length"))?;
        while remaining > 0 {
            let pq_tq = self.read_u8()?;
            remaining -= 1;
            let id = (pq_tq & 0x0F) as usize;
            if id >= MAX_TABLE_DESTINATIONS {
                return Err(JpegError::Format("bad Tq value"));
            }
            let table = &mut self.quantization_tables[id];
            match pq_tq >> 4 {
                0 => {
                    if remaining < BLOCK_SIZE {
                        break;
                    }
                    let source: &'a [u8] = self.source;
                    let bytes = source
                        .get(self.position..self.position + BLOCK_SIZE)
                        .ok_or(JpegError::Format("unexpected end of data"))?;
                    for (dst, &b) in table.iter_mut().zip(bytes) {
                        *dst = b as u16;
                    }
                    self.position += BLOCK_SIZE;
                    remaining -= BLOCK_SIZE;
                }
                1 => {
                    if remaining < 2 * BLOCK_SIZE {
                        break;
                    }
                    let source: &'a [u8] = self.source;
                    let bytes = source
                        .get(self.position..self.position + 2 * BLOCK_SIZE)
                        .ok_or(JpegError::Format("unexpected end of data"))?;
                    for (dst, pair) in table.iter_mut().zip(bytes.chunks_exact(2)) {
                        *dst = u16::from_be_bytes([pair[0], pair[1]]);
                    }
                    self.position += 2 * BLOCK_SIZE;
                    remaining -= 2 * BLOCK_SIZE;
                }
                _ => return Err(JpegError::Format("bad Pq value")),
            }
        }
        if remaining != 0 {
            return Err(JpegError::Format("DQT has wrong length"));
        }
        Ok(())
    }

    pub fn read_dht_segment(&mut self) -> Result<(), JpegError> {
        let length = self.read_u16()? as usize;
        let mut remaining = length
            .checked_sub(2)
            .ok_or(JpegError::Format("DHT has wrong length"))?;
        let baseline = self.frame.as_ref().is_some_and(|f| f.kind == FrameKind::Baseline);
        while remaining > 0 {
            if remaining < 1 + MAX_HUFFMAN_CODE_LENGTH {
                return Err(JpegError::Format("DHT has wrong length"));
            }
            let tc_th = self.read_u8()?;
            let class = tc_th >> 4;
            let id = (tc_th & 0x0F) as usize;
            if class > 1 {
                return Err(JpegError::Format("bad Tc value"));
            }
            if id >= MAX_TABLE_DESTINATIONS || (baseline && id > 1) {
                return Err(JpegError::Format("bad Th value"));
            }

            let mut counts = [0u8; MAX_HUFFMAN_CODE_LENGTH];
            counts.copy_from_slice(self.read_bytes(MAX_HUFFMAN_CODE_LENGTH)?);
            remaining -= 1 + MAX_HUFFMAN_CODE_LENGTH;
            let total_values: usize = counts.iter().map(|&c| c as usize).sum();
            if remaining < total_values {
                return Err(JpegError::Format("DHT has wrong length"));
            }
            let values = self.read_bytes(total_values)?;
            remaining -= total_values;

            let table = HuffmanTable::build_from_dht(&counts, values)?;
            if class == 0 {
                self.huffman_tables_dc[id] = Some(table);
            } else {
                self.huffman_tables_ac[id] = Some(table);
            }
        }
        Ok(())
    }

    pub fn read_dri_segment(&mut self) -> Result<(), JpegError> {
        let length = self.read_u16()?;
        if length != 4 {
            return Err(JpegError::Format("DRI has wrong length"));
        }
        self.restart_interval = self.read_u16()?;
        Ok(())
    }

    pub fn read_start_of_scan_segment(&mut self) -> Result<ScanHeader, JpegError> {
        if self.frame.is_none() {
            return Err(JpegError::Format("missing SOF marker"));
        }
        let length = self.read_u16()? as usize;
        let frame = self.frame.as_ref().ok_or(JpegError::Format("missing SOF marker"))?;
        let frame_components = frame.components.len();
        let progressive = frame.is_progressive();
        let baseline = frame.kind == FrameKind::Baseline;

        if length < 8 || length > 6 + 2 * frame_components || length % 2 != 0 {
            return Err(JpegError::Format("SOS has wrong length"));
        }
        let source: &'a [u8] = self.source;
        let body = source
            .get(self.position..self.position + length - 2)
            .ok_or(JpegError::Format("unexpected end of data"))?;
        let scan_components = body[0] as usize;
        if length != 6 + 2 * scan_components {
            return Err(JpegError::Format("SOS length inconsistent with number of components"));
        }

        let mut components: Vec<ScanComponentSelector> = Vec::with_capacity(scan_components);
        let mut total_hv = 0;
        for i in 0..scan_components {
            let selector = body[1 + 2 * i];
            let component_index = frame
                .components
                .iter()
                .position(|c| c.id == selector)
                .ok_or(JpegError::Format("unknown component selector"))?;
            if components.iter().any(|c| c.component_index == component_index) {
                return Err(JpegError::Format("repeated component selector"));
            }
            let c = &frame.components[component_index];
            total_hv += c.h * c.v;

            let tables = body[2 + 2 * i];
            let (dc_table, ac_table) = ((tables >> 4) as usize, (tables & 0x0F) as usize);
            if dc_table >= MAX_TABLE_DESTINATIONS || (baseline && dc_table > 1) {
                return Err(JpegError::Format("bad Td value"));
            }
            if ac_table >= MAX_TABLE_DESTINATIONS || (baseline && ac_table > 1) {
                return Err(JpegError::Format("bad Ta value"));
            }
            components.push(ScanComponentSelector { component_index, dc_table, ac_table });
        }
        if frame_components > 1 && total_hv > 10 {
            return Err(JpegError::Format("total sampling factors too large"));
        }

        let mut header = ScanHeader {
            components,
            spectral_start: 0,
            spectral_end: MAXIMUM_SPECTRAL_INDEX,
            approx_high: 0,
            approx_low: 0,
        };
        if progressive {
            let tail = &body[1 + 2 * scan_components..];
            header.spectral_start = tail[0];
            header.spectral_end = tail[1];
            header.approx_high = tail[2] >> 4;
            header.approx_low = tail[2] & 0x0F;
            if (header.spectral_start == 0 && header.spectral_end != 0)
                || header.spectral_start > header.spectral_end
                || header.spectral_end > MAXIMUM_SPECTRAL_INDEX
            {
                return Err(JpegError::Format("bad spectral selection bounds"));
            }
            if header.spectral_start != 0 && scan_components != 1 {
                return Err(JpegError::Format("progressive AC coefficients for more than one component"));
            }
            if header.approx_high != 0 && header.approx_high != header.approx_low + 1 {
                return Err(JpegError::Format("bad successive approximation values"));
            }
        }
        debug_assert!(header.components.len() <= MAX_COMPONENTS);
        self.position += length - 2;
        log::debug!(
            "scan components {:?}, Ss={} Se={} Ah={} Al={}",
            header.component_indices(),
            header.spectral_start,
            header.spectral_end,
            header.approx_high,
            header.approx_low
        );
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(sampling: u8) -> Vec<u8> {
        vec![
            0xFF, 0xD8, 0xFF, 0xC2, 0x00, 0x0B, 0x08, 0x00, 0x10, 0x00, 0x18, 0x01, 0x01, sampling, 0x00,
        ]
    }

    #[test]
    fn single_component_sampling_is_forced_to_one() {
        let data = gray_frame(0x22);
        let mut reader = JpegStreamReader::new(&data);
        let frame = reader.read_header().unwrap();
        assert_eq!((frame.width, frame.height), (24, 16));
        assert_eq!((frame.components[0].h, frame.components[0].v), (1, 1));
        assert!(frame.is_progressive());
    }

    #[test]
    fn frame_errors_are_classified() {
        let mut data = gray_frame(0x11);
        data[6] = 12;
        assert!(matches!(JpegStreamReader::new(&data).read_header(), Err(JpegError::Unsupported(_))));

        let data = gray_frame(0x50);
        assert!(matches!(JpegStreamReader::new(&data).read_header(), Err(JpegError::Format(_))));

        let data = [0x00, 0xD8];
        assert!(matches!(
            JpegStreamReader::new(&data).read_header(),
            Err(JpegError::Format("missing SOI marker"))
        ));

        let data = [0xFF, 0xD8, 0xFF, 0xC3, 0x00, 0x0B];
        assert!(matches!(JpegStreamReader::new(&data).read_header(), Err(JpegError::Unsupported(_))));
    }

    #[test]
    fn colour_subsampling_must_be_supported() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x10, 0x00, 0x10, 0x03];
        data.extend_from_slice(&[1, 0x22, 0, 2, 0x11, 1, 3, 0x12, 1]);
        assert!(matches!(JpegStreamReader::new(&data).read_header(), Err(JpegError::Unsupported(_))));

        let mut data = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x10, 0x00, 0x10, 0x03];
        data.extend_from_slice(&[1, 0x21, 0, 2, 0x11, 1, 3, 0x11, 1]);
        let mut reader = JpegStreamReader::new(&data);
        assert_eq!(reader.read_header().unwrap().subsampling(), Some(Subsampling::Ratio422));
    }

    #[test]
    fn markers_skip_fill_and_stuffed_pairs() {
        let data = [0xFF, 0xD8, 0x12, 0xFF, 0x00, 0xFF, 0xFF, 0xFE, 0x00, 0x03, 0x41, 0xFF, 0xD9];
        let mut reader = JpegStreamReader::new(&data);
        assert_eq!(
            reader.read_next_segment().unwrap(),
            Segment::Skipped(JpegMarkerCode::Comment as u8)
        );
        assert_eq!(reader.read_next_segment().unwrap(), Segment::EndOfImage);
    }

    #[test]
    fn reserved_markers_with_a_length_are_skipped() {
        let mut data = vec![0xFF, 0xD8];
        for code in [0xC8, 0xDE, 0xDF, 0xF0, 0xFD] {
            data.extend_from_slice(&[0xFF, code, 0x00, 0x04, 0xAB, 0xCD]);
        }
        data.extend_from_slice(&[0xFF, 0xD9]);
        let mut reader = JpegStreamReader::new(&data);
        for code in [0xC8, 0xDE, 0xDF, 0xF0, 0xFD] {
            assert_eq!(reader.read_next_segment().unwrap(), Segment::Skipped(code));
        }
        assert_eq!(reader.read_next_segment().unwrap(), Segment::EndOfImage);

        let data = [0xFF, 0xD8, 0xFF, 0x02, 0x00, 0x02];
        assert!(JpegStreamReader::new(&data).read_next_segment().unwrap_err().is_format_error());
    }

    #[test]
    fn progressive_scan_header_is_validated() {
        let mut data = gray_frame(0x11);
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x05, 0x00]);
        let mut reader = JpegStreamReader::new(&data);
        reader.read_header().unwrap();
        assert!(matches!(
            reader.read_next_segment(),
            Err(JpegError::Format("bad spectral selection bounds"))
        ));

        let mut data = gray_frame(0x11);
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x01, 0x05, 0x31]);
        let mut reader = JpegStreamReader::new(&data);
        reader.read_header().unwrap();
        assert!(matches!(
            reader.read_next_segment(),
            Err(JpegError::Format("bad successive approximation values"))
        ));

        let mut data = gray_frame(0x11);
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x07, 0x00, 0x00, 0x00, 0x00]);
        let mut reader = JpegStreamReader::new(&data);
        reader.read_header().unwrap();
        assert!(matches!(
            reader.read_next_segment(),
            Err(JpegError::Format("unknown component selector"))
        ));

        let mut data = gray_frame(0x11);
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x01, 0x05, 0x10]);
        let mut reader = JpegStreamReader::new(&data);
        reader.read_header().unwrap();
        let Segment::Scan(header) = reader.read_next_segment().unwrap() else {
            panic!("expected a scan header");
        };
        assert_eq!((header.spectral_start, header.spectral_end), (1, 5));
        assert_eq!((header.approx_high, header.approx_low), (1, 0));
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn dqt_accepts_16_bit_tables() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x83, 0x11];
        for i in 0..64u16 {
            data.extend_from_slice(&(i + 256).to_be_bytes());
        }
        let mut reader = JpegStreamReader::new(&data);
        assert_eq!(reader.read_next_segment().unwrap(), Segment::Tables);
        assert_eq!(reader.quantization_tables[1][3], 259);
    }
}
