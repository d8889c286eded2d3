//! Error types shared by the DEFLATE and PNG encoders.

use core::fmt;

/// Failure kinds that can be produced by any encode call in this crate.
///
/// Every variant corresponds to a named error kind in the design
/// document; none of them carry partial output, since an encode call
/// either fully succeeds or reports the first problem it detects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A configuration value is out of its valid range, or a
    /// combination of values (e.g. colour type + bit depth) is not
    /// permitted by the PNG specification.
    InvalidParameter(&'static str),
    /// The raster buffer length is inconsistent with
    /// `width * height * channels`.
    InputTooLarge,
    /// A Huffman code-length assignment over- or under-committed the
    /// canonical code space. This indicates a bug in the frequency
    /// table or the length-limiting step, not bad caller input.
    CorruptTree,
    /// The run-length encoder for the dynamic-block code-length
    /// alphabet produced a symbol outside `0..=18`.
    BadRunLength,
    /// An LZ77 token carried a length outside `3..=258`.
    InvalidLengthCode,
    /// An LZ77 token carried a distance outside `1..=32768`.
    InvalidDistanceCode,
    /// A chunk claimed a compression method other than DEFLATE.
    UnsupportedCompressionMethod,
    /// An indexed-colour palette would need more entries than
    /// `2^bit_depth` allows once the background colour is folded in.
    PaletteOverflow,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::InputTooLarge => {
                write!(f, "raster buffer length does not match width/height/channels")
            }
            Self::CorruptTree => write!(f, "huffman code length assignment is over- or under-committed"),
            Self::BadRunLength => write!(f, "run-length encoder produced a symbol outside 0..=18"),
            Self::InvalidLengthCode => write!(f, "lz77 token length outside 3..=258"),
            Self::InvalidDistanceCode => write!(f, "lz77 token distance outside 1..=32768"),
            Self::UnsupportedCompressionMethod => {
                write!(f, "chunk uses a compression method other than deflate")
            }
            Self::PaletteOverflow => write!(f, "indexed palette exceeds 2^bit_depth entries"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Convenience alias used throughout the crate.
pub type EncodeResult<T> = Result<T, EncodeError>;
