//! Top-level image-to-text converter
//!
//! `GlyphFit` owns the loaded image, the validated settings and the
//! memoized render output. Settings changes bump a version counter; a
//! cached output is only served while its rendered-at stamp matches the
//! current version, so any mutation forces a full recompute on the next
//! render call.

use std::path::Path;

use image::{imageops, DynamicImage, RgbaImage};
use log::debug;
use sha2::{Digest, Sha256};

use crate::color::{median_channel, ColorToken, Rgb};
use crate::enhance;
use crate::geometry::ShapeCatalog;
use crate::image_loader;
use crate::output::OutputBuffer;
use crate::planner::{self, SectionSize};
use crate::sampler::{self, PixelMatrix};
use crate::settings::{Settings, SettingsError};

/// Rendering failed before any section work could start.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no image loaded; call load_path() or load_image() first")]
    NoImage,
}

/// Counters from the most recent renders, for debug output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    /// Full (non-cached) renders performed over this instance's lifetime.
    pub full_renders: u64,
    /// Wall-clock duration of the last full render, in milliseconds.
    pub last_render_ms: u128,
    /// Shape likeness evaluations during the last full render.
    pub likeness_evaluations: u64,
}

struct CachedOutput {
    text: String,
    version: u64,
}

/// Image-to-text converter with memoized output.
///
/// One instance handles one image/settings pair at a time; callers that
/// want concurrency should use one instance per logical request.
pub struct GlyphFit {
    settings: Settings,
    image: Option<RgbaImage>,
    content_hash: Option<String>,
    cached: Option<CachedOutput>,
    version: u64,
    stats: RenderStats,
}

impl GlyphFit {
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            image: None,
            content_hash: None,
            cached: None,
            version: 0,
            stats: RenderStats::default(),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            settings: Settings::default(),
            image: None,
            content_hash: None,
            cached: None,
            version: 0,
            stats: RenderStats::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Stable hash of the loaded image, for deduplication lookups in
    /// session storage. Changes only when a different image is loaded.
    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    /// Replace the whole settings bag. Invalid settings are rejected
    /// without touching the current configuration; an actual change
    /// invalidates the cached output.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        if settings != self.settings {
            self.settings = settings;
            self.version += 1;
        }
        Ok(())
    }

    /// Load and normalize an image from a file path.
    pub fn load_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let image = image_loader::load_image(path)?;
        self.load_image(image);
        Ok(())
    }

    /// Load and normalize an image from encoded bytes.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        let image = image_loader::load_image_from_bytes(bytes)?;
        self.load_image(image);
        Ok(())
    }

    /// Take ownership of a decoded image. The original stays untouched
    /// internally; every render works on a fresh copy so settings can
    /// change between renders without accumulating transforms.
    pub fn load_image(&mut self, image: DynamicImage) {
        let rgba = image_loader::prepare_original(image, self.settings.max_original_size);
        self.content_hash = Some(content_hash(&rgba));
        self.image = Some(rgba);
        self.version += 1;
    }

    /// Render the loaded image with the current settings.
    ///
    /// Served from cache when neither image nor settings changed since
    /// the last call.
    pub fn render(&mut self) -> Result<String, RenderError> {
        let original = self.image.as_ref().ok_or(RenderError::NoImage)?;

        if let Some(cached) = &self.cached {
            if cached.version == self.version {
                debug!("serving cached output for version {}", cached.version);
                return Ok(cached.text.clone());
            }
        }

        let start = std::time::Instant::now();

        let (working, sections) = self.prepare(original.clone());
        let matrix = sampler::compute_matrix(
            &working,
            self.settings.fill_all,
            self.settings.invert,
        );
        let catalog = ShapeCatalog::new(sections.width, sections.height);
        let (buffer, evaluations) = render_sections(&matrix, &catalog, &self.settings);
        let text = self.settings.formatter.render(&buffer);

        self.stats.full_renders += 1;
        self.stats.last_render_ms = start.elapsed().as_millis();
        self.stats.likeness_evaluations = evaluations;
        debug!(
            "rendered {}x{} working image as {} rows in {} ms ({} likeness evaluations)",
            working.width(),
            working.height(),
            buffer.rows().len(),
            self.stats.last_render_ms,
            evaluations,
        );

        self.cached = Some(CachedOutput {
            text: text.clone(),
            version: self.version,
        });
        Ok(text)
    }

    /// Produce the working image: crop, resize/pad to section geometry,
    /// then photometric adjustment.
    fn prepare(&self, mut working: RgbaImage) -> (RgbaImage, SectionSize) {
        if self.settings.crop {
            working = crop_to_content(working, &self.settings);
        }

        let (mut working, sections) = planner::plan_resize(
            working,
            self.settings.width,
            self.settings.quality,
            self.settings.ratio,
            self.settings.max_height,
        );
        debug!(
            "working image {}x{}, section size {}x{}",
            working.width(),
            working.height(),
            sections.width,
            sections.height,
        );

        enhance::enhance(
            &mut working,
            self.settings.contrast,
            self.settings.brightness,
            self.settings.color_balance,
        );
        if self.settings.negative {
            enhance::negate(&mut working);
        }

        (working, sections)
    }
}

/// Crop away unlit edges. The lit classification is computed from the
/// image at its current resolution, the same resolution the crop is
/// applied at.
fn crop_to_content(image: RgbaImage, settings: &Settings) -> RgbaImage {
    let matrix = sampler::compute_matrix(&image, settings.fill_all, settings.invert);
    match matrix.crop_box() {
        Some(cropbox) => imageops::crop_imm(
            &image,
            cropbox.left,
            cropbox.upper,
            cropbox.right - cropbox.left,
            cropbox.lower - cropbox.upper,
        )
        .to_image(),
        None => image,
    }
}

/// Walk all sections in row-major order, choosing a character (and,
/// with color enabled, possibly a color marker) per section.
///
/// Returns the filled buffer and the total number of likeness
/// evaluations.
fn render_sections(
    matrix: &PixelMatrix,
    catalog: &ShapeCatalog,
    settings: &Settings,
) -> (OutputBuffer, u64) {
    let section_width = catalog.section_width();
    let section_height = catalog.section_height();
    let mut buffer = OutputBuffer::new();
    let mut evaluations: u64 = 0;
    let mut last_color: Option<ColorToken> = None;

    let mut start_y = 0;
    while start_y < matrix.height() {
        let mut start_x = 0;
        while start_x < matrix.width() {
            let lit = matrix.lit_in_section(start_x, start_y, section_width, section_height);

            if settings.color && !lit.is_empty() {
                let mut reds = Vec::with_capacity(lit.len());
                let mut greens = Vec::with_capacity(lit.len());
                let mut blues = Vec::with_capacity(lit.len());
                for &(x, y) in &lit {
                    let pixel = matrix.get(start_x + x - 1, start_y + y - 1);
                    reds.push(pixel.r);
                    greens.push(pixel.g);
                    blues.push(pixel.b);
                }
                let rgb = Rgb::new(
                    median_channel(&mut reds),
                    median_channel(&mut greens),
                    median_channel(&mut blues),
                );
                let token = settings.converter.convert(rgb);
                if last_color != Some(token) {
                    buffer.add_color(token);
                    last_color = Some(token);
                }
            }

            let choice = catalog.choose(&lit, settings.min_likeness);
            evaluations += choice.evaluated as u64;
            buffer.add_text(&choice.character.to_string());

            start_x += section_width;
        }
        buffer.add_line_break();
        start_y += section_height;
    }

    (buffer, evaluations)
}

/// SHA-256 over dimensions and raw RGBA bytes, hex-encoded.
fn content_hash(image: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(image.as_raw());
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}
