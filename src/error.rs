use thiserror::Error;

use crate::jpeg1::scan_script::ScanScriptError;

/// Errors produced while encoding or decoding a JPEG stream.
#[derive(Error, Debug)]
pub enum JpegError {
    /// The bitstream is malformed or not conformant to ISO/IEC 10918-1.
    #[error("invalid JPEG format: {0}")]
    Format(&'static str),
    /// The bitstream is well formed but uses a feature this codec does not handle.
    #[error("unsupported JPEG feature: {0}")]
    Unsupported(&'static str),
    /// A caller-supplied scan script was rejected under the strict policy.
    #[error("invalid scan script: {0}")]
    InvalidScanScript(#[from] ScanScriptError),
    #[error("image is too large to encode")]
    ImageTooLarge,
    #[error("image dimensions must be non-zero")]
    InvalidDimensions,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The first error reported by the underlying byte sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JpegError {
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}
