use num_enum::TryFromPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOF0: Baseline DCT, Huffman coding.
    StartOfFrameBaseline = 0xC0,
    /// SOF1: Extended sequential DCT, Huffman coding.
    StartOfFrameExtendedSequential = 0xC1,
    /// SOF2: Progressive DCT, Huffman coding.
    StartOfFrameProgressive = 0xC2,
    /// SOF3: Lossless (sequential), Huffman coding.
    StartOfFrameLossless = 0xC3,

    /// DHT: Defines one or more Huffman tables.
    DefineHuffmanTable = 0xC4,

    /// SOF5..SOF7: Differential (hierarchical) Huffman frames.
    StartOfFrameDifferentialSequential = 0xC5,
    StartOfFrameDifferentialProgressive = 0xC6,
    StartOfFrameDifferentialLossless = 0xC7,

    /// SOF9..SOF11, SOF13..SOF15: Arithmetic coded frames.
    StartOfFrameArithmeticSequential = 0xC9,
    StartOfFrameArithmeticProgressive = 0xCA,
    StartOfFrameArithmeticLossless = 0xCB,
    DefineArithmeticCodingConditioning = 0xCC,
    StartOfFrameArithmeticDifferentialSequential = 0xCD,
    StartOfFrameArithmeticDifferentialProgressive = 0xCE,
    StartOfFrameArithmeticDifferentialLossless = 0xCF,

    /// RST0..RST7: Restart markers, cycling modulo 8.
    Restart0 = 0xD0,
    Restart1 = 0xD1,
    Restart2 = 0xD2,
    Restart3 = 0xD3,
    Restart4 = 0xD4,
    Restart5 = 0xD5,
    Restart6 = 0xD6,
    Restart7 = 0xD7,

    /// SOI: Marks the start of an image.
    StartOfImage = 0xD8,

    /// EOI: Marks the end of an image.
    EndOfImage = 0xD9,

    /// SOS: Marks the start of scan.
    StartOfScan = 0xDA,

    /// DQT: Defines one or more quantization tables.
    DefineQuantizationTable = 0xDB,

    /// DNL: Defines the number of lines in a scan.
    DefineNumberOfLines = 0xDC,

    /// DRI: Defines the restart interval used in succeeding scans.
    DefineRestartInterval = 0xDD,

    /// APP0: Application data 0: used for JFIF header.
    ApplicationData0 = 0xE0,
    /// APP1: Application data 1: used for EXIF or XMP header.
    ApplicationData1 = 0xE1,
    /// APP2: Application data 2: used for ICC profile.
    ApplicationData2 = 0xE2,
    ApplicationData3 = 0xE3,
    ApplicationData4 = 0xE4,
    ApplicationData5 = 0xE5,
    ApplicationData6 = 0xE6,
    ApplicationData7 = 0xE7,
    ApplicationData8 = 0xE8,
    ApplicationData9 = 0xE9,
    ApplicationData10 = 0xEA,
    ApplicationData11 = 0xEB,
    ApplicationData12 = 0xEC,
    /// APP13: Application data 13: used by PhotoShop IRB
    ApplicationData13 = 0xED,
    /// APP14: Application data 14: used by Adobe
    ApplicationData14 = 0xEE,
    ApplicationData15 = 0xEF,

    /// COM: Comment block.
    Comment = 0xFE,
}

impl JpegMarkerCode {
    /// Returns the restart marker for the given position in the RST0..RST7 cycle.
    pub fn restart(index: u8) -> Self {
        match index % JPEG_RESTART_MARKER_RANGE {
            0 => Self::Restart0,
            1 => Self::Restart1,
            2 => Self::Restart2,
            3 => Self::Restart3,
            4 => Self::Restart4,
            5 => Self::Restart5,
            6 => Self::Restart6,
            _ => Self::Restart7,
        }
    }

    pub fn is_restart(self) -> bool {
        is_restart_marker(self as u8)
    }

    /// Markers that stand alone, without a length field and payload.
    pub fn is_standalone(self) -> bool {
        self.is_restart() || matches!(self, Self::StartOfImage | Self::EndOfImage)
    }
}

pub fn is_restart_marker(byte: u8) -> bool {
    (JPEG_RESTART_MARKER_BASE..JPEG_RESTART_MARKER_BASE + JPEG_RESTART_MARKER_RANGE).contains(&byte)
}

pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;
pub const JPEG_RESTART_MARKER_BASE: u8 = 0xD0;
pub const JPEG_RESTART_MARKER_RANGE: u8 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_markers_cycle_modulo_eight() {
        assert_eq!(JpegMarkerCode::restart(0), JpegMarkerCode::Restart0);
        assert_eq!(JpegMarkerCode::restart(7), JpegMarkerCode::Restart7);
        assert_eq!(JpegMarkerCode::restart(9), JpegMarkerCode::Restart1);
        assert!(JpegMarkerCode::Restart5.is_standalone());
        assert!(!JpegMarkerCode::StartOfScan.is_standalone());
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        assert_eq!(JpegMarkerCode::try_from(0xDA).ok(), Some(JpegMarkerCode::StartOfScan));
        assert!(JpegMarkerCode::try_from(0x01).is_err());
        assert!(JpegMarkerCode::try_from(0xC8).is_err());
    }
}
