//! Scanline filtering (PNG §9 / RFC 2083).
//!
//! Operates on already byte-packed scanlines (one byte per sample for
//! 8/16-bit depths, packed sub-byte samples otherwise); the caller
//! supplies `bpp`, the rounded-up byte count of one complete pixel
//! (minimum 1, per the PNG spec's filtering rule for sub-byte depths).

use std::vec::Vec;

/// Which predictor to apply to every scanline. A single configured
/// type is used for the whole image; adaptive per-line selection is
/// a permitted but unimplemented extension (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicFilterType {
    None,
    Sub,
    Up,
    Average,
    Paeth,
}

impl BasicFilterType {
    pub fn tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Sub => 1,
            Self::Up => 2,
            Self::Average => 3,
            Self::Paeth => 4,
        }
    }
}

/// Filters one scanline, returning the filtered bytes (without the
/// leading filter-type tag byte; the caller prepends that alongside
/// the IDAT stream assembly).
pub fn filter_scanline(
    filter: BasicFilterType,
    raw: &[u8],
    prior: Option<&[u8]>,
    bpp: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; raw.len()];
    let prior_at = |i: usize| -> u8 {
        match prior {
            Some(p) if i < p.len() => p[i],
            _ => 0,
        }
    };
    let left_at = |i: usize| -> u8 {
        if i >= bpp {
            raw[i - bpp]
        } else {
            0
        }
    };
    let upper_left_at = |i: usize| -> u8 {
        if i >= bpp {
            prior_at(i - bpp)
        } else {
            0
        }
    };

    for i in 0..raw.len() {
        out[i] = match filter {
            BasicFilterType::None => raw[i],
            BasicFilterType::Sub => raw[i].wrapping_sub(left_at(i)),
            BasicFilterType::Up => raw[i].wrapping_sub(prior_at(i)),
            BasicFilterType::Average => {
                let avg = ((left_at(i) as u16 + prior_at(i) as u16) / 2) as u8;
                raw[i].wrapping_sub(avg)
            }
            BasicFilterType::Paeth => {
                let predicted = paeth_predictor(left_at(i), prior_at(i), upper_left_at(i));
                raw[i].wrapping_sub(predicted)
            }
        };
    }
    out
}

/// The Paeth predictor (PNG §9.2): picks whichever of `a` (left), `b`
/// (above), `c` (upper-left) is closest to `a + b - c`, with ties
/// broken in favor of `a`, then `b`.
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i32 + b as i32 - c as i32;
    let pa = (p - a as i32).abs();
    let pb = (p - b as i32).abs();
    let pc = (p - c as i32).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
