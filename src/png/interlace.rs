//! Adam7 interlacing (§4.I).

use std::vec::Vec;

/// Which interlace scheme to apply before scanline filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterlaceMethod {
    None,
    Adam7,
}

impl InterlaceMethod {
    pub fn tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Adam7 => 1,
        }
    }
}

/// One Adam7 pass's pixel-selection geometry over the full image.
#[derive(Debug, Clone, Copy)]
pub struct PassGeometry {
    pub x_start: usize,
    pub y_start: usize,
    pub x_step: usize,
    pub y_step: usize,
}

/// The seven fixed `(xStart, yStart, xStep, yStep)` tuples (§4.I).
pub const ADAM7_PASSES: [PassGeometry; 7] = [
    PassGeometry { x_start: 0, y_start: 0, x_step: 8, y_step: 8 },
    PassGeometry { x_start: 4, y_start: 0, x_step: 8, y_step: 8 },
    PassGeometry { x_start: 0, y_start: 4, x_step: 4, y_step: 8 },
    PassGeometry { x_start: 2, y_start: 0, x_step: 4, y_step: 4 },
    PassGeometry { x_start: 0, y_start: 2, x_step: 2, y_step: 4 },
    PassGeometry { x_start: 1, y_start: 0, x_step: 2, y_step: 2 },
    PassGeometry { x_start: 0, y_start: 1, x_step: 1, y_step: 2 },
];

impl PassGeometry {
    /// Width and height (in pixels) of the sub-image this pass
    /// projects out of a `width x height` source image.
    pub fn dimensions(self, width: usize, height: usize) -> (usize, usize) {
        let w = if width > self.x_start {
            (width - self.x_start + self.x_step - 1) / self.x_step
        } else {
            0
        };
        let h = if height > self.y_start {
            (height - self.y_start + self.y_step - 1) / self.y_step
        } else {
            0
        };
        (w, h)
    }
}

/// Extracts one Adam7 pass's pixels from `samples` (row-major, flat
/// per-channel sample values, `samples_per_pixel` of them per pixel),
/// returning a flat row-major sub-image buffer. Samples are carried as
/// `u16` regardless of final bit depth; the caller packs them down
/// when serializing the scanline.
pub fn extract_pass(
    samples: &[u16],
    width: usize,
    height: usize,
    samples_per_pixel: usize,
    pass: PassGeometry,
) -> Vec<u16> {
    let (pw, ph) = pass.dimensions(width, height);
    let mut out = Vec::with_capacity(pw * ph * samples_per_pixel);
    let mut y = pass.y_start;
    while y < height {
        let mut x = pass.x_start;
        while x < width {
            let offset = (y * width + x) * samples_per_pixel;
            out.extend_from_slice(&samples[offset..offset + samples_per_pixel]);
            x += pass.x_step;
        }
        y += pass.y_step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_dimensions_for_8x8_image_cover_every_pixel_once() {
        let total: usize = ADAM7_PASSES
            .iter()
            .map(|p| {
                let (w, h) = p.dimensions(8, 8);
                w * h
            })
            .sum();
        assert_eq!(total, 64);
    }

    #[test]
    fn first_pass_of_1x1_image_is_the_only_nonempty_pass() {
        let (w0, h0) = ADAM7_PASSES[0].dimensions(1, 1);
        assert_eq!((w0, h0), (1, 1));
        for pass in &ADAM7_PASSES[1..] {
            let (w, h) = pass.dimensions(1, 1);
            assert_eq!(w * h, 0);
        }
    }

    #[test]
    fn extract_pass_selects_strided_pixels() {
        // 4x1 image, single-sample pixels: [10, 11, 12, 13].
        let pixels = [10u16, 11, 12, 13];
        let pass = PassGeometry { x_start: 0, y_start: 0, x_step: 2, y_step: 1 };
        let out = extract_pass(&pixels, 4, 1, 1, pass);
        assert_eq!(out, vec![10, 12]);
    }
}
