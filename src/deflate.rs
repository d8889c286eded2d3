//! Raw DEFLATE bitstream encoder (RFC 1951), §4.F.
//!
//! Produces a single DEFLATE stream from the selected [`BlockType`].
//! The block type is an explicit configuration input; this encoder
//! never autoselects between stored/fixed/dynamic the way a
//! multi-pass optimizing compressor would.

use std::vec::Vec;

use crate::bitstream::BitWriter;
use crate::error::{EncodeError, EncodeResult};
use crate::huffman::{
    self, HuffmanTable, CODELEN_CODES, CODELEN_ORDER, FIXED_DIST_LENGTHS, FIXED_LITLEN_LENGTHS,
};
use crate::lz77::{self, Token};

/// Maximum payload of a single stored (uncompressed) block (§4.F).
const MAX_STORED_BLOCK: usize = 65535;

/// Which DEFLATE block encoding to use for the whole input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Stored,
    Fixed,
    Dynamic,
}

/// Configuration for [`deflate`].
#[derive(Debug, Clone, Copy)]
pub struct DeflateConfig {
    pub block_type: BlockType,
    pub final_block: bool,
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self {
            block_type: BlockType::Fixed,
            final_block: true,
        }
    }
}

/// Encodes `input` as a raw DEFLATE stream (no zlib/gzip wrapper).
pub fn deflate(input: &[u8], config: &DeflateConfig) -> EncodeResult<Vec<u8>> {
    let mut writer = BitWriter::with_capacity(input.len() / 2 + 16);
    match config.block_type {
        BlockType::Stored => write_stored(&mut writer, input, config.final_block),
        BlockType::Fixed => write_fixed(&mut writer, input, config.final_block)?,
        BlockType::Dynamic => write_dynamic(&mut writer, input, config.final_block)?,
    }
    Ok(writer.finish())
}

fn write_block_header(writer: &mut BitWriter, bfinal: bool, btype: u32) {
    let value = (bfinal as u32) | (btype << 1);
    writer.write_bits(value, 3, true);
}

fn write_stored(writer: &mut BitWriter, input: &[u8], final_block: bool) {
    if input.is_empty() {
        write_block_header(writer, final_block, 0);
        writer.align_to_byte();
        write_stored_len(writer, 0);
        return;
    }

    let mut offset = 0;
    while offset < input.len() {
        let chunk_len = core::cmp::min(MAX_STORED_BLOCK, input.len() - offset);
        let is_last_chunk = offset + chunk_len == input.len();
        write_block_header(writer, final_block && is_last_chunk, 0);
        writer.align_to_byte();
        write_stored_len(writer, chunk_len as u16);
        writer.write_bytes(&input[offset..offset + chunk_len]);
        offset += chunk_len;
    }
}

fn write_stored_len(writer: &mut BitWriter, len: u16) {
    let nlen = !len;
    writer.write_bytes(&len.to_le_bytes());
    writer.write_bytes(&nlen.to_le_bytes());
}

fn write_fixed(writer: &mut BitWriter, input: &[u8], final_block: bool) -> EncodeResult<()> {
    write_block_header(writer, final_block, 1);

    let litlen = HuffmanTable::from_lengths(&FIXED_LITLEN_LENGTHS)?;
    let dist = HuffmanTable::from_lengths(&FIXED_DIST_LENGTHS)?;

    let lz = lz77::compress(input, false)?;
    write_tokens(writer, &lz.tokens, &litlen, &dist)?;
    let (eob_code, eob_len) = litlen.get(256);
    writer.write_code(eob_code, eob_len);
    Ok(())
}

fn write_dynamic(writer: &mut BitWriter, input: &[u8], final_block: bool) -> EncodeResult<()> {
    write_block_header(writer, final_block, 2);

    let lz = lz77::compress(input, true)?;

    let litlen_freqs: Vec<u64> = lz.freq_litlen.iter().map(|&f| f as u64).collect();
    let dist_freqs: Vec<u64> = lz.freq_dist.iter().map(|&f| f as u64).collect();

    let litlen_lengths = huffman::build_lengths(&litlen_freqs, Some(huffman::MAX_BITS as u8));
    let dist_lengths = huffman::build_lengths(&dist_freqs, Some(huffman::MAX_BITS as u8));

    let last_litlen = litlen_lengths
        .iter()
        .rposition(|&l| l > 0)
        .unwrap_or(256)
        .max(256);
    let hlit = last_litlen - 256;

    let last_dist = dist_lengths.iter().rposition(|&l| l > 0).unwrap_or(0);
    let hdist = last_dist;

    let combined: Vec<u8> = litlen_lengths[..257 + hlit]
        .iter()
        .chain(dist_lengths[..1 + hdist].iter())
        .copied()
        .collect();

    let (codelen_symbols, codelen_freqs) = rle_encode_lengths(&combined)?;
    let codelen_freqs_u64: Vec<u64> = codelen_freqs.iter().map(|&f| f as u64).collect();
    let codelen_lengths = huffman::build_lengths(&codelen_freqs_u64, Some(huffman::CODELEN_MAX_BITS as u8));
    let codelen_table = HuffmanTable::from_lengths(&codelen_lengths)?;

    let hclen = CODELEN_ORDER
        .iter()
        .rposition(|&i| codelen_lengths[i] > 0)
        .map(|pos| pos + 1)
        .unwrap_or(4)
        .max(4)
        - 4;

    writer.write_bits(hlit as u32, 5, true);
    writer.write_bits(hdist as u32, 5, true);
    writer.write_bits(hclen as u32, 4, true);

    for &i in CODELEN_ORDER.iter().take(hclen + 4) {
        writer.write_bits(codelen_lengths[i] as u32, 3, true);
    }

    for &packed in &codelen_symbols {
        let sym = (packed & 0xFF) as usize;
        let (code, len) = codelen_table.get(sym);
        writer.write_code(code, len);
        match sym {
            16 => writer.write_bits(((packed >> 8) - 3) as u32, 2, true),
            17 => writer.write_bits(((packed >> 8) - 3) as u32, 3, true),
            18 => writer.write_bits(((packed >> 8) - 11) as u32, 7, true),
            0..=15 => {}
            _ => return Err(EncodeError::BadRunLength),
        }
    }

    let litlen = HuffmanTable::from_lengths(&litlen_lengths[..257 + hlit])
        .map(|t| pad_table(t, huffman::LITLEN_CODES))?;
    let dist = HuffmanTable::from_lengths(&dist_lengths[..1 + hdist])
        .map(|t| pad_table(t, huffman::DIST_CODES))?;

    write_tokens(writer, &lz.tokens, &litlen, &dist)?;
    let (eob_code, eob_len) = litlen.get(256);
    writer.write_code(eob_code, eob_len);

    Ok(())
}

/// `HuffmanTable::get` indexes directly into the built arrays; pad
/// them back out to the full alphabet size so out-of-range length
/// symbols (286/287, unused distance entries) can still be looked up
/// safely even though they are never assigned a code.
fn pad_table(table: HuffmanTable, full_size: usize) -> HuffmanTable {
    if table.lengths().len() >= full_size {
        return table;
    }
    let mut lengths = table.lengths().to_vec();
    lengths.resize(full_size, 0);
    // Padding with zero-length (unused) symbols never changes the
    // Kraft sum, so re-deriving codes cannot fail.
    HuffmanTable::from_lengths(&lengths).expect("padding preserves a valid canonical tree")
}

fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Token],
    litlen: &HuffmanTable,
    dist: &HuffmanTable,
) -> EncodeResult<()> {
    for &token in tokens {
        match token {
            Token::Literal(byte) => {
                let (code, len) = litlen.get(byte as usize);
                writer.write_code(code, len);
            }
            Token::Match { length, distance } => {
                let (len_sym, len_extra_bits, len_extra) = huffman::encode_length(length)?;
                let (code, len) = litlen.get(len_sym as usize);
                writer.write_code(code, len);
                if len_extra_bits > 0 {
                    writer.write_bits(len_extra as u32, len_extra_bits, true);
                }

                let (dist_sym, dist_extra_bits, dist_extra) = huffman::encode_distance(distance)?;
                let (code, len) = dist.get(dist_sym as usize);
                writer.write_code(code, len);
                if dist_extra_bits > 0 {
                    writer.write_bits(dist_extra as u32, dist_extra_bits, true);
                }
            }
        }
    }
    Ok(())
}

/// Run-length encodes a concatenated code-length sequence for the
/// dynamic block header (§4.F), returning packed symbols (low byte =
/// symbol 0..18, remaining bits = repeat count for 16/17/18) and the
/// resulting 19-symbol alphabet's frequencies.
fn rle_encode_lengths(lengths: &[u8]) -> EncodeResult<(Vec<u16>, [u32; CODELEN_CODES])> {
    let mut symbols = Vec::new();
    let mut freqs = [0u32; CODELEN_CODES];

    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];

        if len == 0 {
            let mut count = 1;
            while i + count < lengths.len() && lengths[i + count] == 0 && count < 138 {
                count += 1;
            }

            if count >= 11 {
                symbols.push(18 | ((count as u16) << 8));
                freqs[18] += 1;
            } else if count >= 3 {
                symbols.push(17 | ((count as u16) << 8));
                freqs[17] += 1;
            } else {
                for _ in 0..count {
                    symbols.push(0);
                    freqs[0] += 1;
                }
            }
            i += count;
        } else {
            symbols.push(len as u16);
            freqs[len as usize] += 1;
            i += 1;

            let mut count = 0;
            while i + count < lengths.len() && lengths[i + count] == len && count < 6 {
                count += 1;
            }

            if count >= 3 {
                // High bits carry `count - 3`; the decoder adds 3 back
                // (2 extra bits, see `tests/support/mod.rs`).
                symbols.push(16 | ((count as u16) << 8));
                freqs[16] += 1;
                i += count;
            }
        }
    }

    Ok((symbols, freqs))
}
