//! Frame geometry: sampling factors, the MCU grid and the block order of scans.

use crate::image::Subsampling;
use crate::jpeg_marker_code::JpegMarkerCode;

/// DCT frame types handled by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Baseline,
    ExtendedSequential,
    Progressive,
}

impl FrameKind {
    pub fn marker(self) -> JpegMarkerCode {
        match self {
            Self::Baseline => JpegMarkerCode::StartOfFrameBaseline,
            Self::ExtendedSequential => JpegMarkerCode::StartOfFrameExtendedSequential,
            Self::Progressive => JpegMarkerCode::StartOfFrameProgressive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComponent {
    pub id: u8,
    pub h: usize,
    pub v: usize,
    pub quant_table_dest: usize,
}

/// One block of a scan: frame component index plus block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPosition {
    pub component: usize,
    pub bx: usize,
    pub by: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub kind: FrameKind,
    pub width: usize,
    pub height: usize,
    pub components: Vec<FrameComponent>,
}

impl FrameHeader {
    /// Layout written by the encoder: 1x1 grayscale or 4:2:0 YCbCr.
    pub fn for_encoder(width: usize, height: usize, component_count: usize, progressive: bool) -> Self {
        let components = (0..component_count)
            .map(|i| {
                let factor = if i == 0 && component_count > 1 { 2 } else { 1 };
                FrameComponent {
                    id: (i + 1) as u8,
                    h: factor,
                    v: factor,
                    quant_table_dest: usize::from(i > 0),
                }
            })
            .collect();
        Self {
            kind: if progressive { FrameKind::Progressive } else { FrameKind::Baseline },
            width,
            height,
            components,
        }
    }

    pub fn is_progressive(&self) -> bool {
        self.kind == FrameKind::Progressive
    }

    pub fn h_max(&self) -> usize {
        self.components.iter().map(|c| c.h).max().unwrap_or(1)
    }

    pub fn v_max(&self) -> usize {
        self.components.iter().map(|c| c.v).max().unwrap_or(1)
    }

    pub fn mcus_x(&self) -> usize {
        self.width.div_ceil(8 * self.h_max())
    }

    pub fn mcus_y(&self) -> usize {
        self.height.div_ceil(8 * self.v_max())
    }

    /// Chroma ratio of a three-component frame.
    pub fn subsampling(&self) -> Option<Subsampling> {
        match self.components.as_slice() {
            [y, c, _] => Subsampling::from_divisors(y.h / c.h, y.v / c.v),
            _ => None,
        }
    }

    /// Blocks allocated for a component: the full MCU grid.
    pub fn grid_dimensions(&self, component: usize) -> (usize, usize) {
        let c = &self.components[component];
        (self.mcus_x() * c.h, self.mcus_y() * c.v)
    }

    /// Sample dimensions of a component plane.
    pub fn component_dimensions(&self, component: usize) -> (usize, usize) {
        let c = &self.components[component];
        (
            (self.width * c.h).div_ceil(self.h_max()),
            (self.height * c.v).div_ceil(self.v_max()),
        )
    }

    /// Blocks of a component that cover at least one sample.
    pub fn blocks_in_bounds(&self, component: usize) -> (usize, usize) {
        let (w, h) = self.component_dimensions(component);
        (w.div_ceil(8), h.div_ceil(8))
    }

    /// Number of restart units in a scan: MCUs when several components are
    /// interleaved, blocks inside the component bounds otherwise.
    pub fn scan_unit_count(&self, components: &[usize]) -> usize {
        match components {
            [single] => {
                let (bw, bh) = self.blocks_in_bounds(*single);
                bw * bh
            }
            _ => self.mcus_x() * self.mcus_y(),
        }
    }

    /// Replaces `out` with the blocks of restart unit `unit`, in coding order.
    pub fn scan_unit(&self, components: &[usize], unit: usize, out: &mut Vec<BlockPosition>) {
        out.clear();
        if let [single] = components {
            let (bw, _) = self.blocks_in_bounds(*single);
            out.push(BlockPosition { component: *single, bx: unit % bw, by: unit / bw });
            return;
        }
        let mcus_x = self.mcus_x();
        let (mx, my) = (unit % mcus_x, unit / mcus_x);
        for &component in components {
            let FrameComponent { h, v, .. } = self.components[component];
            for j in 0..h * v {
                out.push(BlockPosition { component, bx: h * mx + j % h, by: v * my + j / h });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interleaved_scans_skip_blocks_outside_the_image() {
        // 24x16 4:2:0: two 16x16 MCUs, eight Y blocks in the grid but six in bounds.
        let frame = FrameHeader::for_encoder(24, 16, 3, true);
        assert_eq!((frame.mcus_x(), frame.mcus_y()), (2, 1));
        assert_eq!(frame.grid_dimensions(0), (4, 2));
        assert_eq!(frame.blocks_in_bounds(0), (3, 2));
        assert_eq!(frame.blocks_in_bounds(1), (2, 1));
        assert_eq!(frame.scan_unit_count(&[0]), 6);
        assert_eq!(frame.scan_unit_count(&[0, 1, 2]), 2);

        let mut out = Vec::new();
        frame.scan_unit(&[0], 4, &mut out);
        assert_eq!(out, vec![BlockPosition { component: 0, bx: 1, by: 1 }]);
    }

    #[test]
    fn interleaved_unit_visits_each_component_in_turn() {
        let frame = FrameHeader::for_encoder(32, 16, 3, true);
        let mut out = Vec::new();
        frame.scan_unit(&[0, 1, 2], 1, &mut out);
        let coords: Vec<_> = out.iter().map(|p| (p.component, p.bx, p.by)).collect();
        assert_eq!(
            coords,
            vec![(0, 2, 0), (0, 3, 0), (0, 2, 1), (0, 3, 1), (1, 1, 0), (2, 1, 0)]
        );
        assert_eq!(frame.subsampling(), Some(Subsampling::Ratio420));
    }

    #[test]
    fn grayscale_frame_is_one_by_one() {
        let frame = FrameHeader::for_encoder(17, 9, 1, false);
        assert_eq!(frame.kind.marker(), JpegMarkerCode::StartOfFrameBaseline);
        assert_eq!(frame.scan_unit_count(&[0]), 6);
        assert_eq!(frame.component_dimensions(0), (17, 9));
        assert_eq!(frame.subsampling(), None);
    }
}
