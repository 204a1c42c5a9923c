//! JPEG 1 encoder orchestration: baseline (one sequential scan) or
//! progressive spectral selection (one scan per script entry).

use std::io::Write;

use crate::constants::{BLOCK_SIZE, DEFAULT_QUALITY, MAX_COMPONENTS, MAXIMUM_DIMENSION};
use crate::error::JpegError;
use crate::jpeg_stream_writer::JpegStreamWriter;
use crate::jpeg1::block::{Block, CoefficientPlane};
use crate::jpeg1::block_source::{BlockSource, scale};
use crate::jpeg1::dct::fdct_8x8;
use crate::jpeg1::frame::FrameHeader;
use crate::jpeg1::huffman::HuffmanIndex;
use crate::jpeg1::quantization::{QuantIndex, QuantizationTables, quantize_block};
use crate::jpeg1::scan_script::{ScanDescriptor, ScanScript, ScanScriptPolicy};

/// Encoding parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// 1 to 100, higher is better. Out-of-range values are clamped.
    pub quality: u8,
    /// Write SOF2 and one scan per script entry instead of a single SOF0 scan.
    pub progressive: bool,
    /// Custom scan sequence; the default for the component count when `None`.
    /// Ignored for baseline output.
    pub scan_script: Option<ScanScript>,
    pub scan_script_policy: ScanScriptPolicy,
    /// MCUs (or blocks, for single-component scans) between RST markers; 0 disables.
    pub restart_interval: u16,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            progressive: false,
            scan_script: None,
            scan_script_policy: ScanScriptPolicy::default(),
            restart_interval: 0,
        }
    }
}

pub struct Jpeg1Encoder {
    options: EncodeOptions,
    quantization: QuantizationTables,
}

impl Jpeg1Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        let quantization = QuantizationTables::new(options.quality);
        Self { options, quantization }
    }

    pub fn set_restart_interval(&mut self, interval: u16) {
        self.options.restart_interval = interval;
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub fn quantization_tables(&self) -> &QuantizationTables {
        &self.quantization
    }

    /// Encodes `source` into `sink`. The first write error aborts the encode
    /// and is returned; nothing is written after it. The sink is written to
    /// directly, so wrap files and sockets in a `BufWriter`.
    pub fn encode<W: Write, S: BlockSource + ?Sized>(&self, sink: W, source: &S) -> Result<(), JpegError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(JpegError::InvalidDimensions);
        }
        if width > MAXIMUM_DIMENSION || height > MAXIMUM_DIMENSION {
            return Err(JpegError::ImageTooLarge);
        }
        let component_count = source.component_count();
        if component_count != 1 && component_count != 3 {
            return Err(JpegError::InvalidArgument("block sources must have 1 or 3 components"));
        }

        let progressive = self.options.progressive;
        let script = if progressive {
            ScanScript::resolve(self.options.scan_script.as_ref(), component_count, self.options.scan_script_policy)?
        } else {
            ScanScript::baseline()
        };
        let frame = FrameHeader::for_encoder(width, height, component_count, progressive);
        log::debug!(
            "encoding {width}x{height}, {component_count} component(s), {:?}, {} scan(s)",
            frame.kind,
            script.len()
        );

        let planes = self.transform(&frame, source);

        let mut writer = JpegStreamWriter::new(sink);
        writer.write_start_of_image()?;
        writer.write_dqt(self.quantization.all())?;
        writer.write_start_of_frame(frame.kind.marker(), width as u16, height as u16, component_count)?;
        let tables = if component_count == 1 { &HuffmanIndex::ALL[..2] } else { &HuffmanIndex::ALL[..] };
        writer.write_dht(tables)?;
        if self.options.restart_interval > 0 {
            writer.write_dri(self.options.restart_interval)?;
        }
        for (i, scan) in script.iter().enumerate() {
            let start = writer.len();
            self.write_scan(&mut writer, &frame, &planes, scan)?;
            log::trace!("scan {i} ({scan}): {} bytes", writer.len() - start);
        }
        writer.write_end_of_image()?;
        writer.finish()?;
        Ok(())
    }

    /// Quantized zig-zag coefficients of every block, computed once and
    /// shared by all scans.
    fn transform<S: BlockSource + ?Sized>(&self, frame: &FrameHeader, source: &S) -> Vec<CoefficientPlane> {
        let mut planes: Vec<CoefficientPlane> = (0..frame.components.len())
            .map(|c| {
                let (w, h) = frame.grid_dimensions(c);
                CoefficientPlane::new(w, h)
            })
            .collect();
        let luma = self.quantization.table(QuantIndex::Luminance);
        let chroma = self.quantization.table(QuantIndex::Chrominance);

        let mut y_block: Block = [0; BLOCK_SIZE];
        let mut cb: [Block; 4] = [[0; BLOCK_SIZE]; 4];
        let mut cr: [Block; 4] = [[0; BLOCK_SIZE]; 4];

        if frame.components.len() == 1 {
            let (bw, bh) = frame.grid_dimensions(0);
            for by in 0..bh {
                for bx in 0..bw {
                    source.fill_blocks(8 * bx, 8 * by, &mut y_block, &mut cb[0], &mut cr[0]);
                    *planes[0].block_mut(bx, by) = forward_block(&y_block, luma);
                }
            }
            return planes;
        }

        for my in 0..frame.mcus_y() {
            for mx in 0..frame.mcus_x() {
                for i in 0..4 {
                    let (bx, by) = (2 * mx + (i & 1), 2 * my + (i >> 1));
                    source.fill_blocks(8 * bx, 8 * by, &mut y_block, &mut cb[i], &mut cr[i]);
                    *planes[0].block_mut(bx, by) = forward_block(&y_block, luma);
                }
                scale(&mut y_block, &cb);
                *planes[1].block_mut(mx, my) = forward_block(&y_block, chroma);
                scale(&mut y_block, &cr);
                *planes[2].block_mut(mx, my) = forward_block(&y_block, chroma);
            }
        }
        planes
    }

    fn write_scan<W: Write>(
        &self,
        writer: &mut JpegStreamWriter<W>,
        frame: &FrameHeader,
        planes: &[CoefficientPlane],
        scan: &ScanDescriptor,
    ) -> Result<(), JpegError> {
        let components = scan.component_indices(frame.components.len());
        writer.write_start_of_scan(
            &components,
            scan.spectral_start,
            scan.spectral_end,
            scan.successive_approx_high,
            scan.successive_approx_low,
        )?;

        let total = frame.scan_unit_count(&components);
        let restart_interval = self.options.restart_interval as usize;
        let mut prev_dc = [0i32; MAX_COMPONENTS];
        let mut restart_index = 0u8;
        let mut unit_blocks = Vec::new();
        for unit in 0..total {
            frame.scan_unit(&components, unit, &mut unit_blocks);
            for position in &unit_blocks {
                let block = planes[position.component].block(position.bx, position.by);
                write_block(writer, block, position.component, scan, &mut prev_dc[position.component])?;
            }
            if restart_interval > 0 && (unit + 1) % restart_interval == 0 && unit + 1 < total {
                writer.write_restart(restart_index)?;
                restart_index = restart_index.wrapping_add(1);
                prev_dc = [0; MAX_COMPONENTS];
            }
        }
        writer.finish_scan(frame.is_progressive())
    }
}

/// Level shift, forward DCT and quantization of one block of samples.
fn forward_block(samples: &Block, quant_table: &[u8; BLOCK_SIZE]) -> Block {
    let mut input = [0.0f32; BLOCK_SIZE];
    for (dst, &sample) in input.iter_mut().zip(samples) {
        *dst = sample as f32 - 128.0;
    }
    let mut dct = [0.0f32; BLOCK_SIZE];
    fdct_8x8(&input, &mut dct);
    quantize_block(&dct, quant_table)
}

/// Shifts the magnitude right by `al`, keeping the sign.
fn point_transform(value: i32, al: u8) -> i32 {
    if value < 0 { -((-value) >> al) } else { value >> al }
}

/// Emits the `[spectral_start, spectral_end]` band of a zig-zag ordered block.
fn write_block<W: Write>(
    writer: &mut JpegStreamWriter<W>,
    block: &Block,
    component: usize,
    scan: &ScanDescriptor,
    prev_dc: &mut i32,
) -> Result<(), JpegError> {
    let al = scan.successive_approx_low;
    if scan.spectral_start == 0 {
        let dc = block[0] >> al;
        writer.emit_huff_rle(HuffmanIndex::dc(component), 0, dc - *prev_dc)?;
        *prev_dc = dc;
    }
    if scan.spectral_end == 0 {
        return Ok(());
    }

    let table = HuffmanIndex::ac(component);
    let mut run = 0u32;
    for zig in scan.spectral_start.max(1) as usize..=scan.spectral_end as usize {
        let ac = point_transform(block[zig], al);
        if ac == 0 {
            run += 1;
            continue;
        }
        while run > 15 {
            writer.emit_huff(table, 0xF0)?;
            run -= 16;
        }
        writer.emit_huff_rle(table, run, ac)?;
        run = 0;
    }
    if run > 0 {
        writer.emit_huff(table, 0x00)?;
    }
    Ok(())
}
