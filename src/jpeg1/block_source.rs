//! Pixel sources for the encoder.

use crate::image::{GrayImage, RgbImage, YCbCrImage, rgb_to_ycbcr};
use crate::jpeg1::block::Block;

/// Neutral chroma sample.
const MID_GREY: i32 = 128;

/// Something the encoder can read 8x8 sample blocks from.
pub trait BlockSource {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (usize, usize);

    /// 1 for grayscale sources, 3 for colour ones.
    fn component_count(&self) -> usize {
        3
    }

    /// Fills the Y, Cb and Cr samples of the 8x8 region whose top-left
    /// corner is `(x, y)`. Positions past the right or bottom edge repeat
    /// the last column or row.
    fn fill_blocks(&self, x: usize, y: usize, y_block: &mut Block, cb_block: &mut Block, cr_block: &mut Block);
}

fn for_each_sample(
    (width, height): (usize, usize),
    x: usize,
    y: usize,
    mut f: impl FnMut(usize, usize, usize),
) {
    let (xmax, ymax) = (width - 1, height - 1);
    for j in 0..8 {
        let sy = (y + j).min(ymax);
        for i in 0..8 {
            f(8 * j + i, (x + i).min(xmax), sy);
        }
    }
}

impl BlockSource for GrayImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    fn component_count(&self) -> usize {
        1
    }

    fn fill_blocks(&self, x: usize, y: usize, y_block: &mut Block, cb_block: &mut Block, cr_block: &mut Block) {
        for_each_sample(self.dimensions(), x, y, |k, sx, sy| {
            y_block[k] = self.pixel(sx, sy) as i32;
        });
        cb_block.fill(MID_GREY);
        cr_block.fill(MID_GREY);
    }
}

impl BlockSource for RgbImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    fn fill_blocks(&self, x: usize, y: usize, y_block: &mut Block, cb_block: &mut Block, cr_block: &mut Block) {
        for_each_sample(self.dimensions(), x, y, |k, sx, sy| {
            let [r, g, b] = self.pixel(sx, sy);
            let [luma, cb, cr] = rgb_to_ycbcr(r, g, b);
            y_block[k] = luma as i32;
            cb_block[k] = cb as i32;
            cr_block[k] = cr as i32;
        });
    }
}

impl BlockSource for YCbCrImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    fn fill_blocks(&self, x: usize, y: usize, y_block: &mut Block, cb_block: &mut Block, cr_block: &mut Block) {
        for_each_sample(self.dimensions(), x, y, |k, sx, sy| {
            let [luma, cb, cr] = self.pixel(sx, sy);
            y_block[k] = luma as i32;
            cb_block[k] = cb as i32;
            cr_block[k] = cr as i32;
        });
    }
}

/// Downscales the 16x16 region held by four 8x8 blocks (top-left, top-right,
/// bottom-left, bottom-right) into one 8x8 block by 2x2 averaging.
pub fn scale(dst: &mut Block, src: &[Block; 4]) {
    for (i, quadrant) in src.iter().enumerate() {
        let dst_off = ((i & 2) << 4) | ((i & 1) << 2);
        for y in 0..4 {
            for x in 0..4 {
                let j = 16 * y + 2 * x;
                let sum = quadrant[j] + quadrant[j + 1] + quadrant[j + 8] + quadrant[j + 9];
                dst[8 * y + x + dst_off] = (sum + 2) >> 2;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_replicated() {
        let image = GrayImage::from_fn(3, 2, |x, y| (10 * y + x) as u8);
        let (mut yb, mut cb, mut cr) = ([0; 64], [0; 64], [0; 64]);
        image.fill_blocks(0, 0, &mut yb, &mut cb, &mut cr);
        assert_eq!(&yb[..8], &[0, 1, 2, 2, 2, 2, 2, 2]);
        assert_eq!(&yb[56..], &[10, 11, 12, 12, 12, 12, 12, 12]);
        assert!(cb.iter().chain(cr.iter()).all(|&v| v == 128));
    }

    #[test]
    fn scale_averages_quadrants() {
        let mut src = [[0i32; 64]; 4];
        for (i, block) in src.iter_mut().enumerate() {
            block.fill(40 * i as i32 + 1);
        }
        src[0][0] = 5;
        let mut dst = [0; 64];
        scale(&mut dst, &src);
        assert_eq!(dst[0], 2);
        assert_eq!(dst[1], 1);
        assert_eq!(dst[4], 41);
        assert_eq!(dst[32], 81);
        assert_eq!(dst[63], 121);
    }

    #[test]
    fn ycbcr_source_samples_subsampled_chroma() {
        let mut image = YCbCrImage::new(4, 2, crate::image::Subsampling::Ratio422);
        let (cb, cw, _) = image.plane_mut(1);
        assert_eq!(cw, 2);
        cb.copy_from_slice(&[10, 20, 30, 40]);
        let (mut yb, mut cbb, mut crb) = ([0; 64], [0; 64], [0; 64]);
        image.fill_blocks(0, 0, &mut yb, &mut cbb, &mut crb);
        assert_eq!(&cbb[..4], &[10, 10, 20, 20]);
        assert_eq!(&cbb[8..12], &[30, 30, 40, 40]);
        assert_eq!(crb[0], 0);
    }
}
