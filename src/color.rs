//! Color model and quantization
//!
//! Per-section colors are aggregated (median per channel over lit
//! pixels), quantized to a discrete token by the selected converter, and
//! attached to the output as sparse markers. The matcher only cares about
//! token *changes* between consecutive sections, never about the token's
//! actual representation.

use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// RGB color type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One entry of the 16-color terminal palette: reference RGB plus the
/// SGR code that renders it.
struct PaletteColor {
    rgb: Rgb,
    sgr: u8,
}

/// The classic CGA/ANSI 16-color palette. Index order matches the
/// `PaletteIndex` discriminants below.
const PALETTE: [PaletteColor; 16] = [
    PaletteColor { rgb: Rgb { r: 0x00, g: 0x00, b: 0x00 }, sgr: 30 }, // black
    PaletteColor { rgb: Rgb { r: 0x00, g: 0x00, b: 0xaa }, sgr: 34 }, // blue
    PaletteColor { rgb: Rgb { r: 0x00, g: 0xaa, b: 0x00 }, sgr: 32 }, // green
    PaletteColor { rgb: Rgb { r: 0x00, g: 0xaa, b: 0xaa }, sgr: 36 }, // cyan
    PaletteColor { rgb: Rgb { r: 0xaa, g: 0x00, b: 0x00 }, sgr: 31 }, // red
    PaletteColor { rgb: Rgb { r: 0xaa, g: 0x00, b: 0xaa }, sgr: 35 }, // magenta
    PaletteColor { rgb: Rgb { r: 0xaa, g: 0x55, b: 0x00 }, sgr: 33 }, // brown
    PaletteColor { rgb: Rgb { r: 0xaa, g: 0xaa, b: 0xaa }, sgr: 37 }, // light gray
    PaletteColor { rgb: Rgb { r: 0xff, g: 0xff, b: 0x55 }, sgr: 93 }, // yellow
    PaletteColor { rgb: Rgb { r: 0x55, g: 0x55, b: 0x55 }, sgr: 90 }, // dark gray
    PaletteColor { rgb: Rgb { r: 0x55, g: 0x55, b: 0xff }, sgr: 94 }, // light blue
    PaletteColor { rgb: Rgb { r: 0x55, g: 0xff, b: 0x55 }, sgr: 92 }, // light green
    PaletteColor { rgb: Rgb { r: 0x55, g: 0xff, b: 0xff }, sgr: 96 }, // light cyan
    PaletteColor { rgb: Rgb { r: 0xff, g: 0x55, b: 0x55 }, sgr: 91 }, // light red
    PaletteColor { rgb: Rgb { r: 0xff, g: 0x55, b: 0xff }, sgr: 95 }, // light magenta
    PaletteColor { rgb: Rgb { r: 0xff, g: 0xff, b: 0xff }, sgr: 97 }, // white
];

const BLACK: u8 = 0;
const LIGHT_GRAY: u8 = 7;
const DARK_GRAY: u8 = 9;
const WHITE: u8 = 15;

/// Saturation below which a color is treated as grayscale.
const GRAY_SATURATION: f32 = 0.15;

/// ANSI reset sequence
pub const ANSI_RESET: &str = "\x1b[0m";

/// Discrete color representation emitted into the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorToken {
    /// Index into the 16-color palette.
    Palette(u8),
    /// Unquantized color, for full-RGB output.
    Raw(Rgb),
}

impl ColorToken {
    /// ANSI foreground escape for this token.
    pub fn ansi(&self) -> String {
        match self {
            ColorToken::Palette(index) => format!("\x1b[{}m", PALETTE[*index as usize].sgr),
            ColorToken::Raw(rgb) => format!("\x1b[38;2;{};{};{}m", rgb.r, rgb.g, rgb.b),
        }
    }

    /// CSS hex representation for this token.
    pub fn css(&self) -> String {
        let rgb = match self {
            ColorToken::Palette(index) => PALETTE[*index as usize].rgb,
            ColorToken::Raw(rgb) => *rgb,
        };
        format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
    }
}

/// Strategy for turning an aggregated section color into a token.
///
/// A closed set instead of runtime-pluggable converter objects; the
/// output formatter decides how a token is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorConverter {
    /// Nearest entry of the 16-color palette.
    #[default]
    AnsiPalette,
    /// Like `AnsiPalette`, but with black/white and the two grays
    /// swapped. Useful on light terminal backgrounds.
    AnsiPaletteSwapBw,
    /// Pass the color through unquantized.
    FullRgb,
}

impl ColorConverter {
    pub fn convert(&self, rgb: Rgb) -> ColorToken {
        match self {
            ColorConverter::AnsiPalette => ColorToken::Palette(nearest_palette_index(rgb)),
            ColorConverter::AnsiPaletteSwapBw => {
                ColorToken::Palette(swap_bw(nearest_palette_index(rgb)))
            }
            ColorConverter::FullRgb => ColorToken::Raw(rgb),
        }
    }
}

fn swap_bw(index: u8) -> u8 {
    match index {
        BLACK => WHITE,
        WHITE => BLACK,
        DARK_GRAY => LIGHT_GRAY,
        LIGHT_GRAY => DARK_GRAY,
        other => other,
    }
}

/// HSV saturation and value of an RGB color, both in [0, 1].
fn saturation_value(rgb: Rgb) -> (f32, f32) {
    let hsv = Hsv::from_color(Srgb::new(
        rgb.r as f32 / 255.0,
        rgb.g as f32 / 255.0,
        rgb.b as f32 / 255.0,
    ));
    (hsv.saturation, hsv.value)
}

/// Index of the palette entry closest to `rgb`.
///
/// Near-grayscale colors are mapped straight onto the four-step gray
/// ramp; the weighted distance would otherwise pull dark grays toward
/// the saturated primaries. Everything else uses the "redmean"
/// low-cost approximation of perceptual color distance.
fn nearest_palette_index(rgb: Rgb) -> u8 {
    let (saturation, value) = saturation_value(rgb);
    if saturation < GRAY_SATURATION {
        return if value < 0.25 {
            BLACK
        } else if value < 0.5 {
            DARK_GRAY
        } else if value < 0.75 {
            LIGHT_GRAY
        } else {
            WHITE
        };
    }

    let mut best = 0;
    let mut best_distance = i64::MAX;
    for (index, entry) in PALETTE.iter().enumerate() {
        let distance = redmean_distance(entry.rgb, rgb);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best as u8
}

/// Squared "redmean" color distance.
fn redmean_distance(a: Rgb, b: Rgb) -> i64 {
    let rmean = (a.r as i64 + b.r as i64) / 2;
    let dr = a.r as i64 - b.r as i64;
    let dg = a.g as i64 - b.g as i64;
    let db = a.b as i64 - b.b as i64;
    (((512 + rmean) * dr * dr) >> 8) + 4 * dg * dg + (((767 - rmean) * db * db) >> 8)
}

/// Median of a channel's values. For an even count, the mean of the two
/// central values, like `statistics.median`.
pub fn median_channel(values: &mut [u8]) -> u8 {
    debug_assert!(!values.is_empty());
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        ((values[mid - 1] as u16 + values[mid] as u16) / 2) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors_map_to_themselves() {
        for (index, entry) in PALETTE.iter().enumerate() {
            assert_eq!(
                ColorConverter::AnsiPalette.convert(entry.rgb),
                ColorToken::Palette(index as u8),
                "palette entry {} did not round-trip",
                index
            );
        }
    }

    #[test]
    fn test_near_red_maps_to_a_red() {
        let token = ColorConverter::AnsiPalette.convert(Rgb::new(0xb0, 0x10, 0x10));
        assert_eq!(token, ColorToken::Palette(4));
    }

    #[test]
    fn test_grayscale_shortcut() {
        assert_eq!(
            ColorConverter::AnsiPalette.convert(Rgb::new(0x10, 0x10, 0x10)),
            ColorToken::Palette(BLACK)
        );
        assert_eq!(
            ColorConverter::AnsiPalette.convert(Rgb::new(0xf0, 0xf0, 0xf0)),
            ColorToken::Palette(WHITE)
        );
    }

    #[test]
    fn test_swap_bw_swaps_gray_ramp_only() {
        let converter = ColorConverter::AnsiPaletteSwapBw;
        assert_eq!(
            converter.convert(Rgb::new(0, 0, 0)),
            ColorToken::Palette(WHITE)
        );
        assert_eq!(
            converter.convert(Rgb::new(255, 255, 255)),
            ColorToken::Palette(BLACK)
        );
        // Saturated colors pass through unswapped.
        assert_eq!(
            converter.convert(Rgb::new(0xaa, 0, 0)),
            ColorToken::Palette(4)
        );
    }

    #[test]
    fn test_full_rgb_is_passthrough() {
        let rgb = Rgb::new(12, 34, 56);
        assert_eq!(ColorConverter::FullRgb.convert(rgb), ColorToken::Raw(rgb));
    }

    #[test]
    fn test_token_representations() {
        assert_eq!(ColorToken::Palette(4).ansi(), "\x1b[31m");
        assert_eq!(ColorToken::Palette(4).css(), "#aa0000");
        let raw = ColorToken::Raw(Rgb::new(255, 0, 128));
        assert_eq!(raw.ansi(), "\x1b[38;2;255;0;128m");
        assert_eq!(raw.css(), "#ff0080");
    }

    #[test]
    fn test_median_channel() {
        assert_eq!(median_channel(&mut [5]), 5);
        assert_eq!(median_channel(&mut [1, 9, 5]), 5);
        assert_eq!(median_channel(&mut [1, 3, 5, 9]), 4);
        assert_eq!(median_channel(&mut [200, 0, 0, 0, 0]), 0);
    }
}
