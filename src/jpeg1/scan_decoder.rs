//! Entropy decoding of one scan: first passes and successive-approximation
//! refinement, following G.1.2 of ITU-T T.81.

use crate::constants::MAX_COMPONENTS;
use crate::error::JpegError;
use crate::jpeg1::block::{Block, UNZIG};
use crate::jpeg1::huffman::{HuffmanTable, JpegBitReader};

/// Coefficient band and point transform of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBand {
    pub spectral_start: usize,
    pub spectral_end: usize,
    pub approx_high: u8,
    pub approx_low: u8,
}

pub struct ScanDecoder<'a> {
    reader: JpegBitReader<'a>,
    band: ScanBand,
    eob_run: u32,
    dc_pred: [i32; MAX_COMPONENTS],
}

impl<'a> ScanDecoder<'a> {
    /// `data` starts at the first entropy-coded byte of the scan.
    pub fn new(data: &'a [u8], band: ScanBand) -> Self {
        Self {
            reader: JpegBitReader::new(data),
            band,
            eob_run: 0,
            dc_pred: [0; MAX_COMPONENTS],
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Decodes one block of `component` into `block` (natural order).
    pub fn decode_block(
        &mut self,
        block: &mut Block,
        component: usize,
        dc_table: Option<&HuffmanTable>,
        ac_table: Option<&HuffmanTable>,
    ) -> Result<(), JpegError> {
        if self.band.approx_high != 0 {
            return self.refine(block, ac_table, 1 << self.band.approx_low);
        }

        let ScanBand { spectral_start, spectral_end, approx_low, .. } = self.band;
        let mut zig = spectral_start;
        if zig == 0 {
            zig = 1;
            let table = dc_table.ok_or(JpegError::Format("uninitialized Huffman table"))?;
            let category = table.decode(&mut self.reader)?;
            if category > 16 {
                return Err(JpegError::Unsupported("excessive DC component"));
            }
            let delta = self.reader.receive_extend(category)?;
            self.dc_pred[component] = self.dc_pred[component].wrapping_add(delta);
            block[0] = self.dc_pred[component] << approx_low;
        }
        if zig > spectral_end {
            return Ok(());
        }
        if self.eob_run > 0 {
            self.eob_run -= 1;
            return Ok(());
        }

        let table = ac_table.ok_or(JpegError::Format("uninitialized Huffman table"))?;
        while zig <= spectral_end {
            let value = table.decode(&mut self.reader)?;
            let run = (value >> 4) as usize;
            let size = value & 0x0F;
            if size != 0 {
                zig += run;
                if zig > spectral_end {
                    break;
                }
                block[UNZIG[zig]] = self.reader.receive_extend(size)? << approx_low;
            } else if run != 15 {
                self.eob_run = self.read_eob_run(run as u32)? - 1;
                break;
            } else {
                zig += 15;
            }
            zig += 1;
        }
        Ok(())
    }

    fn read_eob_run(&mut self, run: u32) -> Result<u32, JpegError> {
        Ok((1 << run) | self.reader.decode_bits(run)?)
    }

    fn refine(&mut self, block: &mut Block, ac_table: Option<&HuffmanTable>, delta: i32) -> Result<(), JpegError> {
        let ScanBand { spectral_start, spectral_end, .. } = self.band;
        if spectral_start == 0 {
            if self.reader.decode_bit()? {
                block[0] |= delta;
            }
            return Ok(());
        }

        let mut zig = spectral_start;
        if self.eob_run == 0 {
            let table = ac_table.ok_or(JpegError::Format("uninitialized Huffman table"))?;
            while zig <= spectral_end {
                let value = table.decode(&mut self.reader)?;
                let run = (value >> 4) as i32;
                let mut z = 0;
                match value & 0x0F {
                    0 => {
                        if run != 15 {
                            self.eob_run = self.read_eob_run(run as u32)?;
                            break;
                        }
                    }
                    1 => z = if self.reader.decode_bit()? { delta } else { -delta },
                    _ => return Err(JpegError::Format("unexpected Huffman code")),
                }

                zig = self.refine_non_zeroes(block, zig, spectral_end, run, delta)?;
                if zig > spectral_end {
                    return Err(JpegError::Format("too many coefficients"));
                }
                if z != 0 {
                    block[UNZIG[zig]] = z;
                }
                zig += 1;
            }
        }
        if self.eob_run > 0 {
            self.eob_run -= 1;
            self.refine_non_zeroes(block, zig, spectral_end, -1, delta)?;
        }
        Ok(())
    }

    /// Applies correction bits to the non-zero coefficients from `zig`
    /// onwards, stopping at the zero coefficient that follows `nz` skipped
    /// zeroes. A negative `nz` walks to the end of the band.
    fn refine_non_zeroes(
        &mut self,
        block: &mut Block,
        mut zig: usize,
        spectral_end: usize,
        mut nz: i32,
        delta: i32,
    ) -> Result<usize, JpegError> {
        while zig <= spectral_end {
            let u = UNZIG[zig];
            if block[u] == 0 {
                if nz == 0 {
                    break;
                }
                nz -= 1;
            } else if self.reader.decode_bit()? {
                if block[u] >= 0 {
                    block[u] += delta;
                } else {
                    block[u] -= delta;
                }
            }
            zig += 1;
        }
        Ok(zig)
    }

    /// Consumes the restart marker `FF <expected>` and resets the predictors
    /// and the end-of-band run.
    pub fn restart(&mut self, expected: u8) -> Result<(), JpegError> {
        if self.reader.sync_to_restart(expected)? {
            log::warn!(
                "resynchronized to RST{} at offset {}",
                expected & 0x07,
                self.reader.position()
            );
        }
        self.eob_run = 0;
        self.dc_pred = [0; MAX_COMPONENTS];
        Ok(())
    }
}
