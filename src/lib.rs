//! A pure-Rust DEFLATE/zlib compressor and PNG encoder for in-memory
//! raster data.
//!
//! The two layered public entry points are [`zlib::deflate`] (RFC
//! 1950/1951) and [`png::encode`] (W3C PNG), built on shared LZ77,
//! Huffman, and bit-packing primitives. Decoding is intentionally not
//! part of the public surface; see `tests/support` for the private
//! reference inflater used only by this crate's own test suite.

pub mod bitstream;
pub mod checksum;
pub mod deflate;
pub mod error;
pub mod heap;
pub mod huffman;
pub mod lz77;
pub mod png;
pub mod zlib;

pub use deflate::{BlockType, DeflateConfig};
pub use error::{EncodeError, EncodeResult};
pub use png::{encode, ColourType, PngParams};
pub use zlib::deflate as deflate_zlib;
