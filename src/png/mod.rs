//! PNG encoder (§4.H/I/J): scanline filtering, Adam7 interlacing, and
//! the CRC-protected chunk stream, built on top of the zlib encoder
//! for `IDAT` (and optionally `iCCP`/`zTXt`/`iTXt`) payloads.

pub mod ancillary;
pub mod chunk;
pub mod filter;
pub mod interlace;
pub mod palette;

use std::vec::Vec;

use crate::deflate::DeflateConfig;
use crate::error::{EncodeError, EncodeResult};
use crate::zlib;

pub use ancillary::{BkgdColor, Chrm, IccpProfile, ItxtEntry, PhysDim, PngTime, SpltEntry, TextEntry};
pub use filter::BasicFilterType;
pub use interlace::InterlaceMethod;

/// PNG colour types (PNG §11.2.2), named rather than left as raw codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourType {
    Grayscale,
    TrueColor,
    Indexed,
    GrayscaleAlpha,
    TrueColorAlpha,
}

impl ColourType {
    fn code(self) -> u8 {
        match self {
            Self::Grayscale => 0,
            Self::TrueColor => 2,
            Self::Indexed => 3,
            Self::GrayscaleAlpha => 4,
            Self::TrueColorAlpha => 6,
        }
    }

    fn channels(self) -> usize {
        match self {
            Self::Grayscale | Self::Indexed => 1,
            Self::GrayscaleAlpha => 2,
            Self::TrueColor => 3,
            Self::TrueColorAlpha => 4,
        }
    }

    fn allowed_bit_depths(self) -> &'static [u8] {
        match self {
            Self::Grayscale => &[1, 2, 4, 8, 16],
            Self::Indexed => &[1, 2, 4, 8],
            Self::TrueColor | Self::GrayscaleAlpha | Self::TrueColorAlpha => &[8, 16],
        }
    }
}

/// Every recognized PNG encoder option (§6). Required fields
/// (`width`/`height`) default to zero so a missing value is caught by
/// `encode`'s eager validation rather than silently producing a
/// zero-size image.
pub struct PngParams {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub colour_type: ColourType,
    pub filter_type: BasicFilterType,
    pub interlace_method: InterlaceMethod,
    pub trns: bool,
    pub gamma: Option<u32>,
    pub chrm: Option<Chrm>,
    pub sbit: Option<Vec<u8>>,
    pub srgb: Option<u8>,
    pub iccp: Option<IccpProfile>,
    pub bkgd: Option<BkgdColor>,
    pub hist: bool,
    pub phys: Option<PhysDim>,
    pub splt: Vec<SpltEntry>,
    pub time: Option<PngTime>,
    pub text: Vec<TextEntry>,
    pub ztxt: Vec<TextEntry>,
    pub itxt: Vec<ItxtEntry>,
    pub deflate_config: DeflateConfig,
    /// Largest payload carried by a single `IDAT` chunk; splitting is
    /// permitted, not required (§4.J).
    pub idat_chunk_size: usize,
}

impl Default for PngParams {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            bit_depth: 8,
            colour_type: ColourType::TrueColorAlpha,
            filter_type: BasicFilterType::None,
            interlace_method: InterlaceMethod::None,
            trns: true,
            gamma: None,
            chrm: None,
            sbit: None,
            srgb: None,
            iccp: None,
            bkgd: None,
            hist: false,
            phys: None,
            splt: Vec::new(),
            time: None,
            text: Vec::new(),
            ztxt: Vec::new(),
            itxt: Vec::new(),
            deflate_config: DeflateConfig::default(),
            idat_chunk_size: 1 << 20,
        }
    }
}

/// Encodes `raster` (width × height pixels, RGBA, 8 bits per channel)
/// into a complete PNG byte stream per `params`.
pub fn encode(raster: &[u8], params: &PngParams) -> EncodeResult<Vec<u8>> {
    validate(raster, params)?;

    let width = params.width as usize;
    let height = params.height as usize;
    let channels = params.colour_type.channels();

    log::debug!(
        "encoding png {}x{} colour_type={:?} bit_depth={} interlace={:?}",
        width,
        height,
        params.colour_type,
        params.bit_depth,
        params.interlace_method
    );

    let mut plte: Option<palette::Palette> = None;
    let mut indexed_bkgd: Option<BkgdColor> = None;
    if params.colour_type == ColourType::Indexed {
        let mut built = palette::build_palette(raster, params.trns)?;
        if let Some(BkgdColor::Rgb { r, g, b }) = params.bkgd {
            let idx = palette::append_background(
                &mut built.entries,
                params.bit_depth,
                r as u8,
                g as u8,
                b as u8,
            )?;
            indexed_bkgd = Some(BkgdColor::PaletteIndex(idx));
        } else {
            indexed_bkgd = params.bkgd;
        }
        palette::check_capacity(built.entries.len(), params.bit_depth)?;
        plte = Some(built);
    }

    let samples = build_samples(raster, width, height, params.colour_type, params.bit_depth, plte.as_ref());

    let mut out = Vec::new();
    out.extend_from_slice(&chunk::SIGNATURE);
    chunk::write_chunk(
        &mut out,
        b"IHDR",
        &chunk::ihdr_payload(
            params.width,
            params.height,
            params.bit_depth,
            params.colour_type.code(),
            params.interlace_method.tag(),
        ),
    );

    if let Some(c) = &params.chrm {
        ancillary::write_chrm(&mut out, c);
    }
    if let Some(g) = params.gamma {
        ancillary::write_gama(&mut out, g);
    }
    if let Some(profile) = &params.iccp {
        ancillary::write_iccp(&mut out, profile)?;
    }
    if let Some(bits) = &params.sbit {
        ancillary::write_sbit(&mut out, bits);
    }
    if let Some(intent) = params.srgb {
        ancillary::write_srgb(&mut out, intent);
    }

    if let Some(built) = &plte {
        let plte_data: Vec<u8> = built.entries.iter().flat_map(|e| [e.r, e.g, e.b]).collect();
        chunk::write_chunk(&mut out, b"PLTE", &plte_data);

        if let Some(bkgd) = &indexed_bkgd {
            ancillary::write_bkgd(&mut out, bkgd);
        }
        if params.hist {
            let mut counts = vec![0u32; built.entries.len()];
            for &idx in &built.pixel_indices {
                counts[idx as usize] += 1;
            }
            let capped: Vec<u16> = counts.iter().map(|&c| c.min(u16::MAX as u32) as u16).collect();
            ancillary::write_hist(&mut out, &capped);
        }
        if params.trns {
            if let Some(trns) = palette::trns_payload(&built.entries) {
                chunk::write_chunk(&mut out, b"tRNS", &trns);
            }
        }
    } else if let Some(bkgd) = &params.bkgd {
        ancillary::write_bkgd(&mut out, bkgd);
    }

    if let Some(phys) = &params.phys {
        ancillary::write_phys(&mut out, phys);
    }
    for entry in &params.splt {
        ancillary::write_splt(&mut out, entry);
    }
    if let Some(time) = &params.time {
        ancillary::write_time(&mut out, time);
    }
    for entry in &params.text {
        ancillary::write_text(&mut out, entry);
    }
    for entry in &params.ztxt {
        ancillary::write_ztxt(&mut out, entry)?;
    }
    for entry in &params.itxt {
        ancillary::write_itxt(&mut out, entry)?;
    }

    let scanline_stream = build_scanline_stream(
        &samples,
        width,
        height,
        channels,
        params.bit_depth,
        params.filter_type,
        params.interlace_method,
    );

    let compressed = zlib::deflate(&scanline_stream, &params.deflate_config)?;
    log::trace!(
        "idat payload {} bytes (from {} filtered scanline bytes)",
        compressed.len(),
        scanline_stream.len()
    );
    chunk::write_idat_chunks(&mut out, &compressed, params.idat_chunk_size);

    chunk::write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

fn validate(raster: &[u8], params: &PngParams) -> EncodeResult<()> {
    if params.width == 0 || params.height == 0 {
        return Err(EncodeError::InvalidParameter("width and height must be nonzero"));
    }
    if !params.colour_type.allowed_bit_depths().contains(&params.bit_depth) {
        return Err(EncodeError::InvalidParameter(
            "bit depth is not permitted for this colour type",
        ));
    }
    let expected_len = params.width as usize * params.height as usize * 4;
    if raster.len() != expected_len {
        return Err(EncodeError::InputTooLarge);
    }
    Ok(())
}

/// Quantizes an 8-bit channel value down to `bit_depth` bits,
/// rounding to nearest, or up to a full 16-bit sample by byte
/// replication (so `0xFF` maps to `0xFFFF` rather than leaving the low
/// byte zero).
fn scale_sample(value: u8, bit_depth: u8) -> u16 {
    match bit_depth {
        8 => value as u16,
        16 => (value as u16) * 257,
        1 | 2 | 4 => {
            let max = (1u32 << bit_depth) - 1;
            (((value as u32) * max + 127) / 255) as u16
        }
        _ => value as u16,
    }
}

/// Builds the flat, pixel-major sample array (`width * height *
/// channels` entries) consumed by interlacing and scanline packing.
fn build_samples(
    raster: &[u8],
    width: usize,
    height: usize,
    colour_type: ColourType,
    bit_depth: u8,
    plte: Option<&palette::Palette>,
) -> Vec<u16> {
    let channels = colour_type.channels();
    let mut samples = vec![0u16; width * height * channels];

    for p in 0..width * height {
        let px = &raster[p * 4..p * 4 + 4];
        let out = &mut samples[p * channels..p * channels + channels];
        match colour_type {
            ColourType::Grayscale => out[0] = scale_sample(px[0], bit_depth),
            ColourType::TrueColor => {
                out[0] = scale_sample(px[0], bit_depth);
                out[1] = scale_sample(px[1], bit_depth);
                out[2] = scale_sample(px[2], bit_depth);
            }
            ColourType::Indexed => {
                out[0] = plte.expect("indexed colour type always builds a palette").pixel_indices[p] as u16;
            }
            ColourType::GrayscaleAlpha => {
                out[0] = scale_sample(px[0], bit_depth);
                out[1] = scale_sample(px[3], bit_depth);
            }
            ColourType::TrueColorAlpha => {
                out[0] = scale_sample(px[0], bit_depth);
                out[1] = scale_sample(px[1], bit_depth);
                out[2] = scale_sample(px[2], bit_depth);
                out[3] = scale_sample(px[3], bit_depth);
            }
        }
    }
    samples
}

/// Packs one row of `channels`-wide `u16` samples into `bit_depth`
/// bits per sample, MSB-first, padding the final byte with zero bits.
fn pack_row(row: &[u16], bit_depth: u8) -> Vec<u8> {
    if bit_depth >= 8 {
        let bytes_per_sample = (bit_depth / 8) as usize;
        let mut out = Vec::with_capacity(row.len() * bytes_per_sample);
        for &s in row {
            if bytes_per_sample == 2 {
                out.extend_from_slice(&s.to_be_bytes());
            } else {
                out.push(s as u8);
            }
        }
        out
    } else {
        let samples_per_byte = 8 / bit_depth as usize;
        let mut out = Vec::with_capacity((row.len() + samples_per_byte - 1) / samples_per_byte);
        let mut acc = 0u8;
        let mut filled = 0usize;
        for &s in row {
            let shift = 8 - bit_depth as usize * (filled + 1);
            acc |= (s as u8) << shift;
            filled += 1;
            if filled == samples_per_byte {
                out.push(acc);
                acc = 0;
                filled = 0;
            }
        }
        if filled > 0 {
            out.push(acc);
        }
        out
    }
}

/// Filters one sub-image's rows (a full image for `InterlaceMethod::None`,
/// one Adam7 pass otherwise) and appends the filter-tagged scanlines to
/// `out`.
fn encode_subimage(
    out: &mut Vec<u8>,
    samples: &[u16],
    width: usize,
    height: usize,
    channels: usize,
    bit_depth: u8,
    filter_type: BasicFilterType,
) {
    if width == 0 || height == 0 {
        return;
    }
    let bpp = core::cmp::max(1, (channels * bit_depth as usize) / 8);
    let row_samples = width * channels;

    let mut prior: Option<Vec<u8>> = None;
    for y in 0..height {
        let row = &samples[y * row_samples..(y + 1) * row_samples];
        let raw = pack_row(row, bit_depth);
        let filtered = filter::filter_scanline(filter_type, &raw, prior.as_deref(), bpp);
        out.push(filter_type.tag());
        out.extend_from_slice(&filtered);
        prior = Some(raw);
    }
}

fn build_scanline_stream(
    samples: &[u16],
    width: usize,
    height: usize,
    channels: usize,
    bit_depth: u8,
    filter_type: BasicFilterType,
    interlace_method: InterlaceMethod,
) -> Vec<u8> {
    let mut out = Vec::new();
    match interlace_method {
        InterlaceMethod::None => {
            encode_subimage(&mut out, samples, width, height, channels, bit_depth, filter_type);
        }
        InterlaceMethod::Adam7 => {
            for &pass in &interlace::ADAM7_PASSES {
                let (pw, ph) = pass.dimensions(width, height);
                let sub = interlace::extract_pass(samples, width, height, channels, pass);
                encode_subimage(&mut out, &sub, pw, ph, channels, bit_depth, filter_type);
            }
        }
    }
    out
}
