//! Image loading utilities
//!
//! Decoding and normalization of source images before conversion.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Load an image from a file path
///
/// Supports PNG, JPEG, GIF, and WebP formats.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img = image::open(path).with_context(|| format!("Failed to load image: {:?}", path))?;
    Ok(img)
}

/// Load an image from bytes
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;
    Ok(img)
}

/// Normalize a freshly decoded image for conversion: force RGBA (padding
/// rows added later must be able to stay transparent) and downscale
/// ridiculously large originals so a single oversized source cannot eat
/// the whole render budget.
pub fn prepare_original(image: DynamicImage, max_original_size: u32) -> RgbaImage {
    let mut image = image.to_rgba8();
    let largest = image.width().max(image.height());
    if largest > max_original_size {
        let factor = max_original_size as f32 / largest as f32;
        let width = ((image.width() as f32 * factor).round() as u32).max(1);
        let height = ((image.height() as f32 * factor).round() as u32).max(1);
        image = image::imageops::resize(&image, width, height, FilterType::Triangle);
    }
    image
}

/// Get supported image format extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "gif", "webp"]
}

/// Check if a file extension is a supported image format
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            supported_extensions().iter().any(|&e| e == ext_lower)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_supported_extensions() {
        let extensions = supported_extensions();
        assert!(extensions.contains(&"png"));
        assert!(extensions.contains(&"jpg"));
        assert!(extensions.contains(&"jpeg"));
    }

    #[test]
    fn test_is_supported_format() {
        assert!(is_supported_format(&PathBuf::from("test.png")));
        assert!(is_supported_format(&PathBuf::from("test.PNG")));
        assert!(is_supported_format(&PathBuf::from("test.jpg")));
        assert!(is_supported_format(&PathBuf::from("test.JPEG")));
        assert!(!is_supported_format(&PathBuf::from("test.txt")));
        assert!(!is_supported_format(&PathBuf::from("test")));
    }

    #[test]
    fn test_prepare_converts_to_rgba() {
        let rgb = DynamicImage::ImageRgb8(image::RgbImage::new(10, 10));
        let rgba = prepare_original(rgb, 2000);
        assert_eq!(rgba.dimensions(), (10, 10));
        assert_eq!(rgba.get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn test_prepare_downscales_oversized_originals() {
        let huge = DynamicImage::ImageRgba8(RgbaImage::new(4000, 1000));
        let scaled = prepare_original(huge, 2000);
        assert_eq!(scaled.dimensions(), (2000, 500));
    }

    #[test]
    fn test_prepare_leaves_small_images_alone() {
        let small = DynamicImage::ImageRgba8(RgbaImage::new(100, 50));
        let scaled = prepare_original(small, 2000);
        assert_eq!(scaled.dimensions(), (100, 50));
    }

    #[test]
    fn test_load_from_bytes() {
        // Create a minimal valid PNG (1x1 white pixel)
        let png_data: [u8; 69] = [
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
            0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
            0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, // 8-bit RGB
            0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, // IDAT chunk
            0x54, 0x08, 0xD7, 0x63, 0xF8, 0xFF, 0xFF, 0x3F, // data
            0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC, 0xCC, 0x59, // checksum
            0xE7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
            0x44, 0xAE, 0x42, 0x60, 0x82,
        ];

        let result = load_image_from_bytes(&png_data);
        assert!(result.is_ok());
    }
}
