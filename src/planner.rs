//! Resize and section planning
//!
//! Computes working-image dimensions so the image divides evenly into
//! glyph-sized sections, then resizes and pads the image to match. One
//! output character ends up representing one `section_width` x
//! `section_height` block of working pixels.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Size in working pixels of the image block behind one output character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSize {
    pub width: u32,
    pub height: u32,
}

/// Target working width for an image, honoring the column budget and the
/// optional row cap.
///
/// Starts from `columns * quality` (never upscaling past the source
/// width), shrinks further if the projected output height would exceed
/// `max_rows`, then rounds to a multiple of `columns`: down when the
/// remainder is under a quarter of `columns` (avoids needless upscaling),
/// up otherwise (avoids degenerate single-row outputs).
pub fn plan_width(
    source_width: u32,
    source_height: u32,
    columns: u32,
    quality: u32,
    ratio: f32,
    max_rows: Option<u32>,
) -> u32 {
    let mut end_width = (columns * quality).min(source_width);

    if let Some(max_rows) = max_rows {
        let projected_height =
            source_height as f32 * ratio * end_width as f32 / source_width as f32;
        let height_cap = (max_rows * quality) as f32 * ratio;
        if projected_height > height_cap {
            end_width = (height_cap * source_width as f32
                / (ratio * source_height as f32))
                .round() as u32;
        }
    }

    let remainder = end_width % columns;
    if remainder != 0 {
        if (remainder as f32) < columns as f32 * 0.25 && end_width > columns {
            end_width -= remainder;
        } else {
            end_width += columns - remainder;
        }
    }
    end_width
}

/// Section size for a working image of `width` pixels split into
/// `columns` characters, with `ratio` being the character height/width
/// ratio.
pub fn section_size(width: u32, columns: u32, ratio: f32) -> SectionSize {
    let section_width = (width / columns).max(1);
    let section_height = ((section_width as f32 * ratio).round() as u32).max(1);
    SectionSize {
        width: section_width,
        height: section_height,
    }
}

/// Resize `image` to the planned width and pad its height up to a
/// multiple of the section height.
///
/// Nearest-neighbor resampling keeps section boundaries free of blended
/// colors that would corrupt the lit/unlit sampling. Padding rows are
/// fully transparent, split evenly between top and bottom with the odd
/// row going to the top. Already-conforming images pass through
/// untouched.
pub fn plan_resize(
    image: RgbaImage,
    columns: u32,
    quality: u32,
    ratio: f32,
    max_rows: Option<u32>,
) -> (RgbaImage, SectionSize) {
    let end_width = plan_width(
        image.width(),
        image.height(),
        columns,
        quality,
        ratio,
        max_rows,
    );

    let image = if image.width() != end_width {
        let end_height = ((end_width as f32 / image.width() as f32 * image.height() as f32)
            .round() as u32)
            .max(1);
        imageops::resize(&image, end_width, end_height, FilterType::Nearest)
    } else {
        image
    };

    let sections = section_size(image.width(), columns, ratio);

    let image = if image.height() % sections.height != 0 {
        let deficit = sections.height - image.height() % sections.height;
        let top = deficit / 2 + deficit % 2;
        let mut padded = RgbaImage::new(image.width(), image.height() + deficit);
        imageops::overlay(&mut padded, &image, 0, top as i64);
        padded
    } else {
        image
    };

    (image, sections)
}
