//! Photometric adjustment
//!
//! Factor-based contrast, brightness and color-balance adjustment plus
//! RGB negation, applied to the working copy before sampling. A factor
//! of 1.0 is the identity; 0.0 collapses to mid-gray, black and
//! grayscale respectively. Alpha is never touched.

use image::RgbaImage;

use crate::sampler::perceived_brightness;

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Scale contrast around mid-gray by `factor`.
pub fn adjust_contrast(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = clamp_channel(128.0 + (*channel as f32 - 128.0) * factor);
        }
    }
}

/// Scale brightness by `factor` (interpolation between black and the
/// original).
pub fn adjust_brightness(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = clamp_channel(*channel as f32 * factor);
        }
    }
}

/// Scale color saturation by `factor` (interpolation between the
/// grayscale version and the original).
pub fn adjust_color_balance(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let gray = perceived_brightness(r, g, b) as f32;
        for channel in &mut pixel.0[..3] {
            *channel = clamp_channel(gray + (*channel as f32 - gray) * factor);
        }
    }
}

/// Invert the RGB channels, leaving alpha as it is.
pub fn negate(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = 255 - *channel;
        }
    }
}

/// Apply all configured adjustments in one pass over the settings.
/// Factors of exactly 1.0 are skipped.
pub fn enhance(
    image: &mut RgbaImage,
    contrast: f32,
    brightness: f32,
    color_balance: f32,
) {
    if contrast != 1.0 {
        adjust_contrast(image, contrast);
    }
    if brightness != 1.0 {
        adjust_brightness(image, brightness);
    }
    if color_balance != 1.0 {
        adjust_color_balance(image, color_balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn one_pixel(rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, Rgba(rgba))
    }

    #[test]
    fn test_identity_factors_change_nothing() {
        let mut image = one_pixel([12, 200, 99, 180]);
        enhance(&mut image, 1.0, 1.0, 1.0);
        assert_eq!(image.get_pixel(0, 0).0, [12, 200, 99, 180]);
    }

    #[test]
    fn test_zero_contrast_is_mid_gray() {
        let mut image = one_pixel([0, 255, 30, 255]);
        adjust_contrast(&mut image, 0.0);
        assert_eq!(image.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_zero_brightness_is_black() {
        let mut image = one_pixel([10, 200, 99, 77]);
        adjust_brightness(&mut image, 0.0);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 77]);
    }

    #[test]
    fn test_zero_color_balance_is_grayscale() {
        let mut image = one_pixel([255, 0, 0, 255]);
        adjust_color_balance(&mut image, 0.0);
        let [r, g, b, a] = image.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_negate_preserves_alpha() {
        let mut image = one_pixel([0, 128, 255, 42]);
        negate(&mut image);
        assert_eq!(image.get_pixel(0, 0).0, [255, 127, 0, 42]);
    }

    #[test]
    fn test_results_are_clamped() {
        let mut image = one_pixel([200, 200, 200, 255]);
        adjust_brightness(&mut image, 10.0);
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }
}
