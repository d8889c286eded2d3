//! zlib container format (RFC 1950), §4.G.
//!
//! Wraps a raw DEFLATE stream with the 2-byte CMF/FLG header and a
//! trailing big-endian Adler-32 of the uncompressed input.

use std::vec::Vec;

use crate::checksum::adler32;
use crate::deflate::{self, BlockType, DeflateConfig};
use crate::error::EncodeResult;

/// CM = 8 (deflate), CINFO = 7 (32K window), per RFC 1950 §2.2.
const CMF: u8 = 0x78;

/// Compresses `input` into a complete zlib stream using `config`.
pub fn deflate(input: &[u8], config: &DeflateConfig) -> EncodeResult<Vec<u8>> {
    let body = deflate::deflate(input, config)?;

    let mut out = Vec::with_capacity(body.len() + 6);
    out.push(CMF);
    out.push(flg_for(config.block_type));
    out.extend_from_slice(&body);

    let mut hasher = adler32::Adler32::new();
    hasher.update(input);
    out.extend_from_slice(&hasher.finalize_be_bytes());
    Ok(out)
}

/// Picks FLEVEL (the top two bits of FLG) from the block type, then
/// fixes up FCHECK so `(CMF*256 + FLG) % 31 == 0` (RFC 1950 §2.2).
fn flg_for(block_type: BlockType) -> u8 {
    let flevel: u8 = match block_type {
        BlockType::Stored => 0,
        BlockType::Fixed => 1,
        BlockType::Dynamic => 2,
    };
    let mut flg = flevel << 6;
    let check = (CMF as u16 * 256 + flg as u16) % 31;
    if check != 0 {
        flg += (31 - check) as u8;
    }
    flg
}
