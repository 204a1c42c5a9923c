pub mod constants;
pub mod error;
pub mod image;
pub mod jpeg1;
pub mod jpeg_marker_code;
pub mod jpeg_stream_reader;
pub mod jpeg_stream_writer;

use std::io::Write;

pub use error::JpegError;
pub use image::{GrayImage, Image, RgbImage, Subsampling, YCbCrImage};
pub use jpeg1::{
    BlockSource, EncodeOptions, FrameHeader, Jpeg1Decoder, Jpeg1Encoder, ScanComponent, ScanDescriptor, ScanScript,
    ScanScriptError, ScanScriptPolicy,
};

/// Encodes `image` as a JPEG interchange stream into `sink`.
///
/// Progressive output follows `options.scan_script`, or the built-in script
/// for the component count when none is given.
pub fn encode<W: Write, S: BlockSource + ?Sized>(sink: W, image: &S, options: &EncodeOptions) -> Result<(), JpegError> {
    Jpeg1Encoder::new(options.clone()).encode(sink, image)
}

/// Decodes a complete baseline, extended-sequential or progressive stream.
pub fn decode(data: &[u8]) -> Result<Image, JpegError> {
    Jpeg1Decoder::new(data).decode()
}
