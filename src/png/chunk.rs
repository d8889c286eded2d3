//! PNG chunk framing (§4.J): signature, length/type/data/CRC layout.

use std::vec::Vec;

use crate::checksum::crc32;

/// The 8-byte PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Appends one complete, CRC-protected chunk to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32::chunk_crc(chunk_type, data).to_be_bytes());
}

/// Builds the 13-byte `IHDR` payload.
pub fn ihdr_payload(
    width: u32,
    height: u32,
    bit_depth: u8,
    colour_type: u8,
    interlace_method: u8,
) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = bit_depth;
    data[9] = colour_type;
    data[10] = 0; // compression method
    data[11] = 0; // filter method
    data[12] = interlace_method;
    data
}

/// Splits a single IDAT payload into `max_len`-sized chunks (§4.J:
/// splitting across multiple IDAT chunks is permitted, not required).
pub fn write_idat_chunks(out: &mut Vec<u8>, data: &[u8], max_len: usize) {
    if data.is_empty() {
        write_chunk(out, b"IDAT", &[]);
        return;
    }
    for piece in data.chunks(max_len.max(1)) {
        write_chunk(out, b"IDAT", piece);
    }
}
