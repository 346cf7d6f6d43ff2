//! Raster sampling
//!
//! Converts an RGBA image into a matrix of per-pixel records with a
//! lit/unlit classification. The matrix is what the matcher consumes:
//! lit coordinates drive glyph selection, the retained channel values
//! drive per-section color averaging.

use image::RgbaImage;

use crate::geometry::Coord;

/// Alpha below this is treated as transparent, and transparent pixels
/// are never lit no matter what the other rules say.
pub const ALPHA_THRESHOLD: u8 = 0x80;

/// Perceived-brightness cutoff between unlit and lit.
pub const BRIGHTNESS_THRESHOLD: u8 = 0x80;

/// Per-pixel record after sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub lit: bool,
}

/// Bounding box of the lit content, PIL-style: `right` and `lower` are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

/// Row-major grid of sampled pixels.
#[derive(Debug, Clone)]
pub struct PixelMatrix {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelMatrix {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Pixel {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Lit-pixel coordinates within a section, 1-indexed relative to the
    /// section's own top-left corner to match the shape catalog's
    /// convention.
    pub fn lit_in_section(
        &self,
        start_x: u32,
        start_y: u32,
        section_width: u32,
        section_height: u32,
    ) -> Vec<Coord> {
        let mut lit = Vec::new();
        for y in 0..section_height {
            for x in 0..section_width {
                if self.get(start_x + x, start_y + y).lit {
                    lit.push((x + 1, y + 1));
                }
            }
        }
        lit
    }

    /// Bounding box of all lit pixels, or `None` when nothing is lit.
    ///
    /// Computed on the same matrix resolution as the image it will crop,
    /// so no coordinate rescaling is ever needed.
    pub fn crop_box(&self) -> Option<CropBox> {
        let mut left = self.width;
        let mut right = 0;
        let mut upper = self.height;
        let mut lower = 0;

        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y).lit {
                    left = left.min(x);
                    right = right.max(x + 1);
                    upper = upper.min(y);
                    lower = lower.max(y + 1);
                }
            }
        }

        if right == 0 {
            return None;
        }
        Some(CropBox {
            left,
            upper,
            right,
            lower,
        })
    }
}

/// Perceived brightness per ITU-R BT.601.
pub fn perceived_brightness(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Classify every pixel of `image` as lit or unlit.
///
/// With `fill_all`, opacity is the only criterion: every sufficiently
/// opaque pixel is lit. Otherwise a pixel is lit when it is opaque and
/// bright (or opaque and dark, with `invert`). The alpha gate always
/// wins: a transparent pixel stays unlit even under `invert`.
pub fn compute_matrix(image: &RgbaImage, fill_all: bool, invert: bool) -> PixelMatrix {
    let mut pixels = Vec::with_capacity((image.width() * image.height()) as usize);

    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let opaque = a >= ALPHA_THRESHOLD;
        let lit = if fill_all {
            opaque
        } else {
            let bright = perceived_brightness(r, g, b) >= BRIGHTNESS_THRESHOLD;
            opaque && (bright != invert)
        };
        pixels.push(Pixel { r, g, b, a, lit });
    }

    PixelMatrix {
        width: image.width(),
        height: image.height(),
        pixels,
    }
}
