//! Indexed-colour palette construction (§4.J).
//!
//! Builds the `PLTE`/`tRNS` entry tables from raw RGBA pixels, keyed
//! either by RGB (opaque-only palettes) or by full RGBA when `tRNS`
//! output is requested, since then distinct alpha values must map to
//! distinct palette slots.

use std::collections::HashMap;
use std::vec::Vec;

use crate::error::{EncodeError, EncodeResult};

/// One palette entry plus the alpha value folded into its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A built palette: deduplicated entries in emission order, plus the
/// per-pixel index assignment used to rewrite the raster into sample
/// indices.
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
    pub pixel_indices: Vec<u8>,
}

/// Builds a palette from `rgba` (4 bytes per pixel). When `want_trns`
/// is true, entries are keyed on the full RGBA tuple so translucent
/// duplicates of an otherwise-identical colour get distinct slots;
/// otherwise alpha is ignored and forced to 255 so RGB-identical
/// pixels always collapse to one entry.
pub fn build_palette(rgba: &[u8], want_trns: bool) -> EncodeResult<Palette> {
    let pixel_count = rgba.len() / 4;
    let mut order: Vec<PaletteEntry> = Vec::new();
    let mut index_of: HashMap<PaletteEntry, u8> = HashMap::new();
    let mut pixel_indices = Vec::with_capacity(pixel_count);

    for chunk in rgba.chunks_exact(4) {
        let entry = PaletteEntry {
            r: chunk[0],
            g: chunk[1],
            b: chunk[2],
            a: if want_trns { chunk[3] } else { 255 },
        };
        let idx = match index_of.get(&entry) {
            Some(&idx) => idx,
            None => {
                if order.len() >= 256 {
                    return Err(EncodeError::PaletteOverflow);
                }
                let idx = order.len() as u8;
                order.push(entry);
                index_of.insert(entry, idx);
                idx
            }
        };
        pixel_indices.push(idx);
    }

    if want_trns {
        sort_translucent_first(&mut order, &mut pixel_indices);
    }

    Ok(Palette {
        entries: order,
        pixel_indices,
    })
}

/// Reorders palette entries so every fully-opaque entry trails every
/// translucent one, then remaps the per-pixel indices to match. This
/// lets the `tRNS` chunk omit the trailing run of 255s (PNG §11.3.2).
fn sort_translucent_first(entries: &mut Vec<PaletteEntry>, pixel_indices: &mut [u8]) {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| (entries[i].a == 255, i));

    let mut remap = vec![0u8; entries.len()];
    for (new_idx, &old_idx) in order.iter().enumerate() {
        remap[old_idx] = new_idx as u8;
    }

    let reordered: Vec<PaletteEntry> = order.iter().map(|&i| entries[i]).collect();
    *entries = reordered;
    for idx in pixel_indices.iter_mut() {
        *idx = remap[*idx as usize];
    }
}

/// Builds the `tRNS` payload: alpha values up to (and including) the
/// last non-255 entry, omitting the fully-opaque trailing run.
pub fn trns_payload(entries: &[PaletteEntry]) -> Option<Vec<u8>> {
    let last_translucent = entries.iter().rposition(|e| e.a != 255)?;
    Some(entries[..=last_translucent].iter().map(|e| e.a).collect())
}

/// Ensures the built palette (after any background-colour append)
/// fits the sample range of `bit_depth`.
pub fn check_capacity(len: usize, bit_depth: u8) -> EncodeResult<()> {
    let max = 1usize << bit_depth;
    if len > max {
        Err(EncodeError::PaletteOverflow)
    } else {
        Ok(())
    }
}

/// Appends a background colour to the palette if it is not already
/// present, returning its index. Fails with `PaletteOverflow` if the
/// palette is already at `2^bit_depth` capacity.
pub fn append_background(
    entries: &mut Vec<PaletteEntry>,
    bit_depth: u8,
    r: u8,
    g: u8,
    b: u8,
) -> EncodeResult<u8> {
    if let Some(pos) = entries.iter().position(|e| e.r == r && e.g == g && e.b == b) {
        return Ok(pos as u8);
    }
    check_capacity(entries.len() + 1, bit_depth)?;
    entries.push(PaletteEntry { r, g, b, a: 255 });
    Ok((entries.len() - 1) as u8)
}
