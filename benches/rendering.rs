//! Rendering benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glyphfit::{ColorConverter, Formatter, GlyphFit, Settings};
use image::{DynamicImage, Rgba, RgbaImage};

fn create_test_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbaImage::new(width, height);
    for x in 0..width {
        for y in 0..height {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            let b = (((x + y) as f32 / (width + height) as f32) * 255.0) as u8;
            // Checkered alpha keeps some sections partially lit so the
            // shape search cannot always take the empty/filled shortcut.
            let a = if (x / 8 + y / 8) % 2 == 0 { 255 } else { 0 };
            img.put_pixel(x, y, Rgba([r, g, b, a]));
        }
    }
    DynamicImage::ImageRgba8(img)
}

fn benchmark_render_widths(c: &mut Criterion) {
    let image = create_test_image(800, 600);

    let mut group = c.benchmark_group("Render Widths");

    for width in [40, 80, 120, 160].iter() {
        let settings = Settings {
            width: *width,
            formatter: Formatter::Text,
            ..Settings::default()
        };

        group.bench_function(format!("width_{}", width), |b| {
            b.iter(|| {
                let mut converter = GlyphFit::new(settings.clone()).unwrap();
                converter.load_image(black_box(image.clone()));
                converter.render().unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_quality_levels(c: &mut Criterion) {
    let image = create_test_image(800, 600);

    let mut group = c.benchmark_group("Quality Levels");

    for quality in [1, 3, 5, 8].iter() {
        let settings = Settings {
            width: 80,
            quality: *quality,
            formatter: Formatter::Text,
            ..Settings::default()
        };

        group.bench_function(format!("quality_{}", quality), |b| {
            b.iter(|| {
                let mut converter = GlyphFit::new(settings.clone()).unwrap();
                converter.load_image(black_box(image.clone()));
                converter.render().unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_min_likeness_early_exit(c: &mut Criterion) {
    let image = create_test_image(800, 600);

    let mut group = c.benchmark_group("Likeness Threshold");

    // A low threshold exits the shape search early almost everywhere, a
    // threshold of 1.0 forces a full scan of the catalog per section.
    for min_likeness in [0.5, 0.9, 1.0].iter() {
        let settings = Settings {
            width: 80,
            min_likeness: *min_likeness,
            formatter: Formatter::Text,
            ..Settings::default()
        };

        group.bench_function(format!("min_likeness_{}", min_likeness), |b| {
            b.iter(|| {
                let mut converter = GlyphFit::new(settings.clone()).unwrap();
                converter.load_image(black_box(image.clone()));
                converter.render().unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_color_modes(c: &mut Criterion) {
    let image = create_test_image(400, 300);

    let mut group = c.benchmark_group("Color Modes");

    let cases = [
        ("no_color", false, ColorConverter::AnsiPalette),
        ("palette", true, ColorConverter::AnsiPalette),
        ("full_rgb", true, ColorConverter::FullRgb),
    ];

    for (name, color, converter) in cases.iter() {
        let settings = Settings {
            width: 80,
            color: *color,
            converter: *converter,
            formatter: Formatter::Ansi,
            ..Settings::default()
        };

        group.bench_function(*name, |b| {
            b.iter(|| {
                let mut converter = GlyphFit::new(settings.clone()).unwrap();
                converter.load_image(black_box(image.clone()));
                converter.render().unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_render_widths,
    benchmark_quality_levels,
    benchmark_min_likeness_early_exit,
    benchmark_color_modes,
);

criterion_main!(benches);
