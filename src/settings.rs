//! Settings management
//!
//! All render tunables in one validated bag, with optional TOML
//! persistence. Validation happens when settings are handed to the
//! converter, never at render time.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::color::ColorConverter;
use crate::output::Formatter;

pub const DEFAULT_WIDTH: u32 = 80;
pub const DEFAULT_QUALITY: u32 = 5;
pub const DEFAULT_RATIO: f32 = 2.0;
pub const DEFAULT_MIN_LIKENESS: f32 = 0.9;
pub const DEFAULT_MAX_ORIGINAL_SIZE: u32 = 2000;

/// An out-of-range or inconsistent setting, reported at assignment time.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("width must be at least 1")]
    WidthZero,
    #[error("quality must be between 1 and 10, got {0}")]
    QualityOutOfRange(u32),
    #[error("ratio must be positive, got {0}")]
    RatioNotPositive(f32),
    #[error("min-likeness must be between 0.0 and 1.0, got {0}")]
    MinLikenessOutOfRange(f32),
    #[error("{name} must be a non-negative factor, got {value}")]
    NegativeFactor { name: &'static str, value: f32 },
    #[error("max-height must be at least 1")]
    MaxHeightZero,
    #[error("max-original-size must be at least 1")]
    MaxOriginalSizeZero,
}

/// Every knob of the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output width in characters.
    pub width: u32,
    /// Source pixels per character axis; higher is slower and more
    /// detailed.
    pub quality: u32,
    /// Character height/width ratio.
    pub ratio: f32,
    /// Accept the first shape whose likeness strictly exceeds this.
    pub min_likeness: f32,
    /// Crop away unlit edges before converting.
    pub crop: bool,
    /// Swap the lit/unlit classification of opaque pixels.
    pub invert: bool,
    /// Invert the image colors before processing.
    pub negative: bool,
    /// Treat every opaque pixel as lit, regardless of color.
    pub fill_all: bool,
    /// Emit color markers.
    pub color: bool,
    pub contrast: f32,
    pub brightness: f32,
    pub color_balance: f32,
    pub converter: ColorConverter,
    pub formatter: Formatter,
    /// Cap on output rows; width shrinks to fit when set.
    pub max_height: Option<u32>,
    /// Originals larger than this on either axis are downscaled on load.
    pub max_original_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            quality: DEFAULT_QUALITY,
            ratio: DEFAULT_RATIO,
            min_likeness: DEFAULT_MIN_LIKENESS,
            crop: false,
            invert: false,
            negative: false,
            fill_all: false,
            color: false,
            contrast: 1.0,
            brightness: 1.0,
            color_balance: 1.0,
            converter: ColorConverter::default(),
            formatter: Formatter::default(),
            max_height: None,
            max_original_size: DEFAULT_MAX_ORIGINAL_SIZE,
        }
    }
}

impl Settings {
    /// Check every field, reporting the first violation found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 {
            return Err(SettingsError::WidthZero);
        }
        if !(1..=10).contains(&self.quality) {
            return Err(SettingsError::QualityOutOfRange(self.quality));
        }
        if self.ratio <= 0.0 {
            return Err(SettingsError::RatioNotPositive(self.ratio));
        }
        if !(0.0..=1.0).contains(&self.min_likeness) {
            return Err(SettingsError::MinLikenessOutOfRange(self.min_likeness));
        }
        for (name, value) in [
            ("contrast", self.contrast),
            ("brightness", self.brightness),
            ("color-balance", self.color_balance),
        ] {
            if value < 0.0 {
                return Err(SettingsError::NegativeFactor { name, value });
            }
        }
        if self.max_height == Some(0) {
            return Err(SettingsError::MaxHeightZero);
        }
        if self.max_original_size == 0 {
            return Err(SettingsError::MaxOriginalSizeZero);
        }
        Ok(())
    }

    /// Load settings from the user's config file, falling back to the
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let settings: Settings = toml::from_str(&contents)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the user's config file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "glyphfit", "glyphfit") {
            Ok(proj_dirs.config_dir().join("settings.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("glyphfit.toml"))
        }
    }
}
