//! Sequential and progressive DCT decoder.
//!
//! Scans are decoded into per-component coefficient planes that persist
//! across the whole stream, so later progressive scans can add bands and
//! refine bits. Pixels are reconstructed once, after the last scan (or after
//! `with_scan_limit` scans, which gives the intermediate progressive image).

use crate::constants::{BLOCK_SIZE, MAX_COMPONENTS};
use crate::error::JpegError;
use crate::image::{GrayImage, Image, YCbCrImage};
use crate::jpeg_marker_code::{JPEG_RESTART_MARKER_BASE, JPEG_RESTART_MARKER_RANGE};
use crate::jpeg_stream_reader::{JpegStreamReader, ScanHeader, Segment};
use crate::jpeg1::block::{Block, CoefficientPlane};
use crate::jpeg1::dct::idct_8x8;
use crate::jpeg1::frame::{BlockPosition, FrameHeader};
use crate::jpeg1::quantization::dequantize_block;
use crate::jpeg1::scan_decoder::{ScanBand, ScanDecoder};

pub struct Jpeg1Decoder<'a> {
    reader: JpegStreamReader<'a>,
    coefficients: [Option<CoefficientPlane>; MAX_COMPONENTS],
    scans: Vec<ScanHeader>,
    scan_limit: Option<usize>,
    finished: bool,
}

impl<'a> Jpeg1Decoder<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            reader: JpegStreamReader::new(source),
            coefficients: [const { None }; MAX_COMPONENTS],
            scans: Vec::new(),
            scan_limit: None,
            finished: false,
        }
    }

    /// Stops after `limit` scans and reconstructs from what they carried.
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = Some(limit);
        self
    }

    pub fn read_header(&mut self) -> Result<&FrameHeader, JpegError> {
        self.reader.read_header()
    }

    pub fn frame_header(&self) -> Option<&FrameHeader> {
        self.reader.frame()
    }

    /// Headers of the scans decoded so far.
    pub fn scans(&self) -> &[ScanHeader] {
        &self.scans
    }

    pub fn restart_interval(&self) -> u16 {
        self.reader.restart_interval
    }

    /// Coefficients of a component in natural order, or `None` if no scan
    /// has referenced it.
    pub fn coefficient_plane(&self, component: usize) -> Option<&CoefficientPlane> {
        self.coefficients.get(component)?.as_ref()
    }

    pub fn coefficient_blocks(&self, component: usize) -> Option<&[Block]> {
        self.coefficient_plane(component).map(CoefficientPlane::blocks)
    }

    pub fn decode(&mut self) -> Result<Image, JpegError> {
        self.decode_coefficients()?;
        self.reconstruct()
    }

    /// Decodes scans until EOI or the scan limit.
    pub fn decode_coefficients(&mut self) -> Result<(), JpegError> {
        self.read_header()?;
        while !self.finished {
            if self.scan_limit.is_some_and(|limit| self.scans.len() >= limit) {
                break;
            }
            match self.reader.read_next_segment()? {
                Segment::Scan(header) => {
                    self.decode_scan(&header)?;
                    self.scans.push(header);
                }
                Segment::EndOfImage => self.finished = true,
                Segment::Restart => log::debug!("ignoring restart marker outside a scan"),
                Segment::Frame | Segment::Tables | Segment::Skipped(_) => {}
            }
        }
        Ok(())
    }

    fn decode_scan(&mut self, header: &ScanHeader) -> Result<(), JpegError> {
        let frame = self.reader.frame().ok_or(JpegError::Format("missing SOF marker"))?.clone();
        let components = header.component_indices();
        for &c in &components {
            if self.coefficients[c].is_none() {
                let (bw, bh) = frame.grid_dimensions(c);
                self.coefficients[c] = Some(CoefficientPlane::new(bw, bh));
            }
        }

        let band = ScanBand {
            spectral_start: header.spectral_start as usize,
            spectral_end: header.spectral_end as usize,
            approx_high: header.approx_high,
            approx_low: header.approx_low,
        };
        let mut decoder = ScanDecoder::new(self.reader.remaining_data(), band);
        let total = frame.scan_unit_count(&components);
        let interval = self.reader.restart_interval as usize;
        let mut expected_restart = 0u8;
        let mut unit_blocks: Vec<BlockPosition> = Vec::with_capacity(10);

        for unit in 0..total {
            frame.scan_unit(&components, unit, &mut unit_blocks);
            for position in &unit_blocks {
                let selector = header
                    .selector(position.component)
                    .ok_or(JpegError::Format("unknown component selector"))?;
                let dc_table = self.reader.huffman_tables_dc[selector.dc_table].as_ref();
                let ac_table = self.reader.huffman_tables_ac[selector.ac_table].as_ref();
                let Some(plane) = self.coefficients[position.component].as_mut() else {
                    continue;
                };
                let block = plane.block_mut(position.bx, position.by);
                if !frame.is_progressive() {
                    *block = [0; BLOCK_SIZE];
                }
                decoder.decode_block(block, position.component, dc_table, ac_table)?;
            }

            if interval > 0 && (unit + 1) % interval == 0 && unit + 1 < total {
                decoder.restart(JPEG_RESTART_MARKER_BASE + expected_restart)?;
                expected_restart = (expected_restart + 1) % JPEG_RESTART_MARKER_RANGE;
            }
        }

        let consumed = decoder.position();
        log::trace!("scan {} consumed {consumed} entropy bytes", self.scans.len());
        self.reader.advance(consumed);
        Ok(())
    }

    /// Dequantizes and inverse-transforms the coefficient planes. Components
    /// that no scan referenced come out mid-grey.
    pub fn reconstruct(&self) -> Result<Image, JpegError> {
        let frame = self.reader.frame().ok_or(JpegError::Format("missing SOF marker"))?;
        match frame.components.len() {
            1 => {
                let mut image = GrayImage::new(frame.width, frame.height, vec![0; frame.width * frame.height])?;
                self.reconstruct_component(frame, 0, image.pixels_mut(), frame.width, frame.height);
                Ok(Image::Gray(image))
            }
            3 => {
                let subsampling = frame
                    .subsampling()
                    .ok_or(JpegError::Unsupported("luma/chroma subsampling ratio"))?;
                let mut image = YCbCrImage::new(frame.width, frame.height, subsampling);
                for c in 0..3 {
                    let (plane, width, height) = image.plane_mut(c);
                    self.reconstruct_component(frame, c, plane, width, height);
                }
                Ok(Image::YCbCr(image))
            }
            _ => Err(JpegError::Unsupported("number of components other than 1 or 3")),
        }
    }

    fn reconstruct_component(&self, frame: &FrameHeader, component: usize, dst: &mut [u8], width: usize, height: usize) {
        let Some(plane) = self.coefficients[component].as_ref() else {
            dst.fill(128);
            return;
        };
        let quant_table = &self.reader.quantization_tables[frame.components[component].quant_table_dest];
        let mut pixels = [0f32; BLOCK_SIZE];
        for by in 0..height.div_ceil(8) {
            for bx in 0..width.div_ceil(8) {
                let coefficients = dequantize_block(plane.block(bx, by), quant_table);
                idct_8x8(&coefficients, &mut pixels);
                for y in 0..8usize.min(height - 8 * by) {
                    let row = (8 * by + y) * width + 8 * bx;
                    for x in 0..8usize.min(width - 8 * bx) {
                        dst[row + x] = (pixels[8 * y + x] + 128.0).round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        }
    }
}
