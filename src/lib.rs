//! Glyphfit - Shape-matching image to text converter
//!
//! Splits an image into a grid of sections and picks, per section, the
//! character whose geometric shape best matches the section's lit
//! pixels, optionally annotated with ANSI or HTML color.

pub mod color;
pub mod converter;
pub mod enhance;
pub mod geometry;
pub mod image_loader;
pub mod output;
pub mod planner;
pub mod sampler;
pub mod settings;

// Re-export commonly used types
pub use color::ColorConverter;
pub use converter::{GlyphFit, RenderError};
pub use output::Formatter;
pub use settings::{Settings, SettingsError};
