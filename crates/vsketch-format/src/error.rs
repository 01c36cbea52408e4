//! Errors produced while reading contour and session files.

use vsketch_model::RasterError;

/// A malformed or unsupported input file.
///
/// Parsers build fresh values, so on error nothing the caller owns has
/// been modified.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A record did not start with the expected key line.
    #[error("line {line}: expected `{expected}`, found `{found}`")]
    UnexpectedKey {
        line: usize,
        expected: &'static str,
        found: String,
    },

    /// Input ended in the middle of a record.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    /// A count or coordinate failed to parse.
    #[error("line {line}: invalid number `{text}`")]
    InvalidNumber { line: usize, text: String },

    /// The session file starts with an unknown version line.
    #[error("unsupported session version `{0}`")]
    UnsupportedVersion(String),

    /// The image record names a pixel format other than 1 (8-bit) or
    /// 2 (16-bit).
    #[error("unsupported pixel format code {0}")]
    UnsupportedPixelFormat(u32),

    /// Fewer pixel bytes than the image header announces.
    #[error("truncated pixel data: expected {expected} bytes, found {found}")]
    TruncatedPixels { expected: usize, found: usize },

    /// The header announces an image too large to address.
    #[error("image of {width}x{height} pixels is too large")]
    ImageTooLarge { width: u32, height: u32 },

    /// Text records are not valid UTF-8.
    #[error("contour data is not valid UTF-8")]
    InvalidText(#[from] std::str::Utf8Error),

    /// The decoded pixels do not form a valid raster.
    #[error(transparent)]
    Raster(#[from] RasterError),
}
