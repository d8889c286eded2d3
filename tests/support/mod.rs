//! Private, test-only reference inflater (RFC 1951 + RFC 1950), ported
//! from this crate's own `inflate.rs` lineage and trimmed down to what
//! the integration tests need: no sliding-window ring buffer (the
//! whole decoded output doubles as the back-reference window, which is
//! simpler and fine for test-sized inputs), no streaming/partial-input
//! support. Not part of the public API (§10).

use std::collections::HashMap;

use rpng_deflate::huffman::{
    HuffmanTable, CODELEN_CODES, CODELEN_ORDER, DIST_BASE, DIST_EXTRA, FIXED_DIST_LENGTHS,
    FIXED_LITLEN_LENGTHS, LENGTH_BASE, LENGTH_EXTRA, MAX_BITS,
};
use rpng_deflate::checksum::adler32;

struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, byte_pos: 0, bit_pos: 0 }
    }

    fn read_bit(&mut self) -> u8 {
        let byte = self.data[self.byte_pos];
        let bit = (byte >> self.bit_pos) & 1;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        bit
    }

    /// Reads `n` bits LSB-first (block headers, HLIT/HDIST/HCLEN,
    /// extra bits, code-length triples).
    fn read_bits(&mut self, n: u8) -> u32 {
        let mut v = 0u32;
        for i in 0..n {
            v |= (self.read_bit() as u32) << i;
        }
        v
    }

    fn align_to_byte(&mut self) {
        if self.bit_pos != 0 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }

    fn read_bytes(&mut self, n: usize) -> &'a [u8] {
        debug_assert_eq!(self.bit_pos, 0);
        let slice = &self.data[self.byte_pos..self.byte_pos + n];
        self.byte_pos += n;
        slice
    }

    /// Reads one Huffman symbol: canonical codes are transmitted
    /// MSB-first, so each new bit becomes the new low bit of a
    /// left-shifting accumulator (see `bitstream::BitWriter::write_code`
    /// for the matching encode-side reasoning).
    fn read_symbol(&mut self, table: &DecodeTable) -> u16 {
        let mut code = 0u32;
        for len in 1..=MAX_BITS as u8 {
            code = (code << 1) | self.read_bit() as u32;
            if let Some(&sym) = table.map.get(&(len, code)) {
                return sym;
            }
        }
        panic!("no matching huffman code found in reference inflater");
    }
}

struct DecodeTable {
    map: HashMap<(u8, u32), u16>,
}

impl DecodeTable {
    fn from_table(table: &HuffmanTable) -> Self {
        let mut map = HashMap::new();
        for (sym, &len) in table.lengths().iter().enumerate() {
            if len > 0 {
                let (code, _) = table.get(sym);
                map.insert((len, code), sym as u16);
            }
        }
        Self { map }
    }
}

/// Inflates a raw DEFLATE stream (no zlib wrapper) back to its
/// original bytes.
pub fn inflate_raw(data: &[u8]) -> Vec<u8> {
    let mut reader = BitReader::new(data);
    let mut output = Vec::new();

    loop {
        let bfinal = reader.read_bits(1) != 0;
        let btype = reader.read_bits(2);

        match btype {
            0 => inflate_stored(&mut reader, &mut output),
            1 => inflate_huffman(
                &mut reader,
                &HuffmanTable::from_lengths(&FIXED_LITLEN_LENGTHS).unwrap(),
                &HuffmanTable::from_lengths(&FIXED_DIST_LENGTHS).unwrap(),
                &mut output,
            ),
            2 => {
                let (litlen, dist) = read_dynamic_tables(&mut reader);
                inflate_huffman(&mut reader, &litlen, &dist, &mut output);
            }
            _ => panic!("reserved block type in reference inflater"),
        }

        if bfinal {
            break;
        }
    }

    output
}

fn inflate_stored(reader: &mut BitReader, output: &mut Vec<u8>) {
    reader.align_to_byte();
    let len_bytes = reader.read_bytes(4);
    let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]);
    let nlen = u16::from_le_bytes([len_bytes[2], len_bytes[3]]);
    assert_eq!(len, !nlen, "stored block LEN/NLEN mismatch");
    output.extend_from_slice(reader.read_bytes(len as usize));
}

fn inflate_huffman(
    reader: &mut BitReader,
    litlen_table: &HuffmanTable,
    dist_table: &HuffmanTable,
    output: &mut Vec<u8>,
) {
    let litlen_decode = DecodeTable::from_table(litlen_table);
    let dist_decode = DecodeTable::from_table(dist_table);

    loop {
        let sym = reader.read_symbol(&litlen_decode);
        if sym < 256 {
            output.push(sym as u8);
        } else if sym == 256 {
            break;
        } else {
            let len_idx = (sym - 257) as usize;
            let mut length = LENGTH_BASE[len_idx] as usize;
            let extra = LENGTH_EXTRA[len_idx];
            if extra > 0 {
                length += reader.read_bits(extra) as usize;
            }

            let dist_sym = reader.read_symbol(&dist_decode) as usize;
            let mut distance = DIST_BASE[dist_sym] as usize;
            let dist_extra = DIST_EXTRA[dist_sym];
            if dist_extra > 0 {
                distance += reader.read_bits(dist_extra) as usize;
            }

            let start = output.len() - distance;
            for i in 0..length {
                let byte = output[start + i];
                output.push(byte);
            }
        }
    }
}

fn read_dynamic_tables(reader: &mut BitReader) -> (HuffmanTable, HuffmanTable) {
    let hlit = reader.read_bits(5) as usize + 257;
    let hdist = reader.read_bits(5) as usize + 1;
    let hclen = reader.read_bits(4) as usize + 4;

    let mut codelen_lengths = [0u8; CODELEN_CODES];
    for i in 0..hclen {
        codelen_lengths[CODELEN_ORDER[i]] = reader.read_bits(3) as u8;
    }
    let codelen_table = HuffmanTable::from_lengths(&codelen_lengths).unwrap();
    let codelen_decode = DecodeTable::from_table(&codelen_table);

    let mut lengths = vec![0u8; hlit + hdist];
    let mut i = 0;
    while i < lengths.len() {
        let sym = reader.read_symbol(&codelen_decode);
        match sym {
            0..=15 => {
                lengths[i] = sym as u8;
                i += 1;
            }
            16 => {
                let count = reader.read_bits(2) as usize + 3;
                let prev = lengths[i - 1];
                for _ in 0..count {
                    lengths[i] = prev;
                    i += 1;
                }
            }
            17 => {
                let count = reader.read_bits(3) as usize + 3;
                for _ in 0..count {
                    lengths[i] = 0;
                    i += 1;
                }
            }
            18 => {
                let count = reader.read_bits(7) as usize + 11;
                for _ in 0..count {
                    lengths[i] = 0;
                    i += 1;
                }
            }
            _ => panic!("invalid code-length symbol in reference inflater"),
        }
    }

    let litlen = HuffmanTable::from_lengths(&lengths[..hlit]).unwrap();
    let dist = HuffmanTable::from_lengths(&lengths[hlit..]).unwrap();
    (litlen, dist)
}

/// Unwraps a zlib stream (RFC 1950): validates the CMF/FLG header and
/// trailing Adler-32, returning the decompressed bytes.
pub fn inflate_zlib(data: &[u8]) -> Vec<u8> {
    let cmf = data[0];
    let flg = data[1];
    assert_eq!(cmf & 0x0F, 8, "not a deflate stream");
    assert_eq!((cmf as u16 * 256 + flg as u16) % 31, 0, "bad FCHECK");

    let body = &data[2..data.len() - 4];
    let output = inflate_raw(body);

    let stored_adler = u32::from_be_bytes(data[data.len() - 4..].try_into().unwrap());
    assert_eq!(stored_adler, adler32::adler32(&output), "adler32 mismatch");

    output
}
