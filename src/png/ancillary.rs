//! Encoders for the named optional PNG chunks (§4.J, §4.L). Each
//! function returns a complete, ready-to-append chunk; the top-level
//! encoder (`png::encode`) decides which ones to emit and in what
//! order based on `PngParams`.

use std::vec::Vec;

use crate::deflate::DeflateConfig;
use crate::error::EncodeResult;
use crate::png::chunk::write_chunk;
use crate::zlib;

#[derive(Debug, Clone, Copy)]
pub struct Chrm {
    pub white_point: (u32, u32),
    pub red: (u32, u32),
    pub green: (u32, u32),
    pub blue: (u32, u32),
}

#[derive(Debug, Clone, Copy)]
pub struct PhysDim {
    pub x_ppu: u32,
    pub y_ppu: u32,
    pub unit_meter: bool,
}

#[derive(Debug, Clone)]
pub struct IccpProfile {
    pub name: String,
    pub profile: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct PngTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[derive(Debug, Clone)]
pub struct TextEntry {
    pub keyword: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ItxtEntry {
    pub keyword: String,
    pub compressed: bool,
    pub language_tag: String,
    pub translated_keyword: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub enum BkgdColor {
    Grayscale(u16),
    Rgb { r: u16, g: u16, b: u16 },
    PaletteIndex(u8),
}

#[derive(Debug, Clone)]
pub struct SpltEntry {
    pub name: String,
    pub sample_depth: u8,
    /// `(r, g, b, a, frequency)` samples, each within `sample_depth` bits.
    pub entries: Vec<(u16, u16, u16, u16, u16)>,
}

pub fn write_chrm(out: &mut Vec<u8>, chrm: &Chrm) {
    let mut data = Vec::with_capacity(32);
    for &(x, y) in &[chrm.white_point, chrm.red, chrm.green, chrm.blue] {
        data.extend_from_slice(&x.to_be_bytes());
        data.extend_from_slice(&y.to_be_bytes());
    }
    write_chunk(out, b"cHRM", &data);
}

pub fn write_gama(out: &mut Vec<u8>, gamma_times_100000: u32) {
    write_chunk(out, b"gAMA", &gamma_times_100000.to_be_bytes());
}

pub fn write_srgb(out: &mut Vec<u8>, rendering_intent: u8) {
    write_chunk(out, b"sRGB", &[rendering_intent]);
}

pub fn write_sbit(out: &mut Vec<u8>, bits: &[u8]) {
    write_chunk(out, b"sBIT", bits);
}

pub fn write_phys(out: &mut Vec<u8>, phys: &PhysDim) {
    let mut data = Vec::with_capacity(9);
    data.extend_from_slice(&phys.x_ppu.to_be_bytes());
    data.extend_from_slice(&phys.y_ppu.to_be_bytes());
    data.push(phys.unit_meter as u8);
    write_chunk(out, b"pHYs", &data);
}

pub fn write_time(out: &mut Vec<u8>, time: &PngTime) {
    let mut data = Vec::with_capacity(7);
    data.extend_from_slice(&time.year.to_be_bytes());
    data.extend_from_slice(&[time.month, time.day, time.hour, time.minute, time.second]);
    write_chunk(out, b"tIME", &data);
}

pub fn write_bkgd(out: &mut Vec<u8>, bkgd: &BkgdColor) {
    let data = match *bkgd {
        BkgdColor::Grayscale(v) => v.to_be_bytes().to_vec(),
        BkgdColor::Rgb { r, g, b } => {
            let mut v = Vec::with_capacity(6);
            v.extend_from_slice(&r.to_be_bytes());
            v.extend_from_slice(&g.to_be_bytes());
            v.extend_from_slice(&b.to_be_bytes());
            v
        }
        BkgdColor::PaletteIndex(i) => vec![i],
    };
    write_chunk(out, b"bKGD", &data);
}

pub fn write_hist(out: &mut Vec<u8>, frequencies: &[u16]) {
    let data: Vec<u8> = frequencies.iter().flat_map(|f| f.to_be_bytes()).collect();
    write_chunk(out, b"hIST", &data);
}

pub fn write_text(out: &mut Vec<u8>, entry: &TextEntry) {
    let mut data = Vec::with_capacity(entry.keyword.len() + 1 + entry.text.len());
    data.extend_from_slice(entry.keyword.as_bytes());
    data.push(0);
    data.extend_from_slice(entry.text.as_bytes());
    write_chunk(out, b"tEXt", &data);
}

pub fn write_ztxt(out: &mut Vec<u8>, entry: &TextEntry) -> EncodeResult<()> {
    let compressed = zlib::deflate(entry.text.as_bytes(), &DeflateConfig::default())?;
    let mut data = Vec::with_capacity(entry.keyword.len() + 2 + compressed.len());
    data.extend_from_slice(entry.keyword.as_bytes());
    data.push(0);
    data.push(0); // compression method
    data.extend_from_slice(&compressed);
    write_chunk(out, b"zTXt", &data);
    Ok(())
}

pub fn write_itxt(out: &mut Vec<u8>, entry: &ItxtEntry) -> EncodeResult<()> {
    let mut data = Vec::new();
    data.extend_from_slice(entry.keyword.as_bytes());
    data.push(0);
    data.push(entry.compressed as u8);
    data.push(0); // compression method
    data.extend_from_slice(entry.language_tag.as_bytes());
    data.push(0);
    data.extend_from_slice(entry.translated_keyword.as_bytes());
    data.push(0);
    if entry.compressed {
        data.extend_from_slice(&zlib::deflate(
            entry.text.as_bytes(),
            &DeflateConfig::default(),
        )?);
    } else {
        data.extend_from_slice(entry.text.as_bytes());
    }
    write_chunk(out, b"iTXt", &data);
    Ok(())
}

pub fn write_iccp(out: &mut Vec<u8>, profile: &IccpProfile) -> EncodeResult<()> {
    let compressed = zlib::deflate(&profile.profile, &DeflateConfig::default())?;
    let mut data = Vec::with_capacity(profile.name.len() + 2 + compressed.len());
    data.extend_from_slice(profile.name.as_bytes());
    data.push(0);
    data.push(0); // compression method
    data.extend_from_slice(&compressed);
    write_chunk(out, b"iCCP", &data);
    Ok(())
}

pub fn write_splt(out: &mut Vec<u8>, splt: &SpltEntry) {
    let mut data = Vec::new();
    data.extend_from_slice(splt.name.as_bytes());
    data.push(0);
    data.push(splt.sample_depth);
    for &(r, g, b, a, freq) in &splt.entries {
        if splt.sample_depth == 16 {
            for v in [r, g, b, a] {
                data.extend_from_slice(&v.to_be_bytes());
            }
        } else {
            for v in [r, g, b, a] {
                data.push(v as u8);
            }
        }
        data.extend_from_slice(&freq.to_be_bytes());
    }
    write_chunk(out, b"sPLT", &data);
}
