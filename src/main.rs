//! Command-line entry point
//!
//! A thin flag-to-settings mapping around the converter; every flag
//! corresponds 1:1 to a settings field. Settings from the user's config
//! file are the baseline, flags override.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::debug;

use glyphfit::{ColorConverter, Formatter, GlyphFit, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Ansi,
    Html,
}

impl From<OutputFormat> for Formatter {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Formatter::Text,
            OutputFormat::Ansi => Formatter::Ansi,
            OutputFormat::Html => Formatter::Html,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "glyphfit", version, about = "Shape-matching image to text converter")]
struct Cli {
    /// Image to process
    file: PathBuf,

    /// Width (in number of characters) of output
    #[arg(short, long)]
    width: Option<u32>,

    /// The higher, the better (and slower); 1-10
    #[arg(short, long)]
    quality: Option<u32>,

    /// Character height/width ratio. Increase this if the result looks
    /// stretched out vertically, and vice versa
    #[arg(short, long)]
    ratio: Option<f32>,

    /// Accept a character as soon as its shape reaches this likeness
    /// (0.0 to 1.0) to the image section
    #[arg(long)]
    min_likeness: Option<f32>,

    /// Maximum number of output rows; width shrinks to fit
    #[arg(long)]
    max_height: Option<u32>,

    /// Output in glorious ANSI color
    #[arg(long)]
    color: bool,

    /// Fill characters that would have been empty, and vice versa.
    /// Not the same as --negative
    #[arg(long)]
    invert: bool,

    /// Crop away empty areas at all edges
    #[arg(long)]
    crop: bool,

    /// Fill all characters except transparent ones
    #[arg(long)]
    fill_all: bool,

    /// Invert the colors of the image before processing
    #[arg(long)]
    negative: bool,

    /// Adjust contrast before converting; 1.0 = original image
    #[arg(long)]
    contrast: Option<f32>,

    /// Adjust brightness before converting; 1.0 = original image
    #[arg(long)]
    brightness: Option<f32>,

    /// Adjust color balance before converting; 1.0 = original image
    #[arg(long)]
    color_balance: Option<f32>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip palette quantization and emit full-RGB colors
    #[arg(long)]
    full_rgb: bool,

    /// Swap black and white in the palette, for light backgrounds
    #[arg(long)]
    swap_bw: bool,

    /// Log timing details to stderr
    #[arg(long)]
    debug: bool,
}

fn build_settings(cli: &Cli) -> Settings {
    let mut settings = Settings::load().unwrap_or_default();

    if let Some(width) = cli.width {
        settings.width = width;
    }
    if let Some(quality) = cli.quality {
        settings.quality = quality;
    }
    if let Some(ratio) = cli.ratio {
        settings.ratio = ratio;
    }
    if let Some(min_likeness) = cli.min_likeness {
        settings.min_likeness = min_likeness;
    }
    if let Some(max_height) = cli.max_height {
        settings.max_height = Some(max_height);
    }
    if let Some(contrast) = cli.contrast {
        settings.contrast = contrast;
    }
    if let Some(brightness) = cli.brightness {
        settings.brightness = brightness;
    }
    if let Some(color_balance) = cli.color_balance {
        settings.color_balance = color_balance;
    }
    if let Some(format) = cli.format {
        settings.formatter = format.into();
    }

    settings.color |= cli.color;
    settings.invert |= cli.invert;
    settings.crop |= cli.crop;
    settings.fill_all |= cli.fill_all;
    settings.negative |= cli.negative;

    if cli.full_rgb {
        settings.converter = ColorConverter::FullRgb;
    } else if cli.swap_bw {
        settings.converter = ColorConverter::AnsiPaletteSwapBw;
    }

    settings
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let start = std::time::Instant::now();

    let settings = build_settings(&cli);
    let mut converter = GlyphFit::new(settings)?;
    converter.load_path(&cli.file)?;

    let output = converter.render()?;
    println!("{}", output);

    if cli.debug {
        let stats = converter.stats();
        debug!(
            "total time {} ms (render {} ms, {} likeness evaluations)",
            start.elapsed().as_millis(),
            stats.last_render_ms,
            stats.likeness_evaluations,
        );
    }

    Ok(())
}
