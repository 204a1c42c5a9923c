//! DCT-based JPEG (ISO/IEC 10918-1 / ITU-T T.81), Huffman coded.
//!
//! Features:
//! - 8-bit grayscale and YCbCr frames, sequential (SOF0/SOF1) and progressive (SOF2).
//! - Spectral selection encoding driven by a `ScanScript`.
//! - Successive-approximation refinement on decode.
//! - Restart intervals (DRI/RSTm), with resynchronization on decode.

pub mod block;
pub mod block_source;
pub mod dct;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod huffman;
pub mod quantization;
pub mod scan_decoder;
pub mod scan_script;

pub use block::{Block, CoefficientPlane};
pub use block_source::BlockSource;
pub use decoder::Jpeg1Decoder;
pub use encoder::{EncodeOptions, Jpeg1Encoder};
pub use frame::{FrameComponent, FrameHeader, FrameKind};
pub use scan_script::{ScanComponent, ScanDescriptor, ScanScript, ScanScriptError, ScanScriptPolicy};
