//! hemline-cli: measure a garment photo from the command line.
//!
//! Loads a background-removed garment photo (white background), runs
//! the measurement pipeline, and prints the result. Useful for:
//!
//! - Spot-checking masks that produced odd measurements in production
//! - Tuning band sizes and the plausibility floor against real photos
//! - Rendering review overlays without the surrounding services
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin hemline -- --category 9 [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=hemline_measure=debug` to see per-stage anchor and
//! fallback events.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use hemline_measure::{
    AnnotateStyle, Category, Landmarks, MeasureConfig, StrategyPolicy, draw_lines, measure,
};
use tracing_subscriber::EnvFilter;

/// Garment measurement extraction for background-removed photos.
#[derive(Parser)]
#[command(name = "hemline", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Garment category id (1-13, DeepFashion2 ordering).
    #[arg(long)]
    category: u8,

    /// Landmark JSON file: an array of exactly 294 `{"x":..,"y":..}`
    /// points from the pose predictor.
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Which strategy serves each category.
    #[arg(long, value_enum, default_value_t = Policy::ContourOnly)]
    policy: Policy,

    /// Grayscale cutoff above which a pixel counts as background.
    #[arg(long, default_value_t = MeasureConfig::DEFAULT_WHITE_THRESHOLD)]
    white_threshold: u8,

    /// Minimum component area kept by mask cleaning.
    #[arg(long, default_value_t = MeasureConfig::DEFAULT_MIN_COMPONENT_SIZE)]
    min_component_size: u32,

    /// Waistband tolerance band height in pixels.
    #[arg(long, default_value_t = MeasureConfig::DEFAULT_TOP_BAND_PX)]
    top_band_px: u32,

    /// Length anchor tolerance band width in pixels.
    #[arg(long, default_value_t = MeasureConfig::DEFAULT_LEFT_BAND_PX)]
    left_band_px: u32,

    /// Fraction of the vertical extent treated as the hem strip.
    #[arg(long, default_value_t = MeasureConfig::DEFAULT_BOTTOM_FRACTION)]
    bottom_fraction: f64,

    /// Plausibility floor in pixels; smaller measurements trigger the
    /// one-shot recalculation pass.
    #[arg(long, default_value_t = MeasureConfig::DEFAULT_MIN_PLAUSIBLE_PX)]
    min_plausible_px: f64,

    /// Write the annotated overlay image here.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the result as JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,

    /// Full measurement config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `MeasureConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Strategy policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// Route every category through the contour path (production
    /// default).
    ContourOnly,
    /// Use landmark guide points where the caller supplies them.
    PreferLandmarks,
}

/// Build a [`MeasureConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and
/// all individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<MeasureConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(MeasureConfig {
        white_threshold: cli.white_threshold,
        min_component_size: cli.min_component_size,
        top_band_px: cli.top_band_px,
        left_band_px: cli.left_band_px,
        bottom_fraction: cli.bottom_fraction,
        min_plausible_px: cli.min_plausible_px,
        policy: match cli.policy {
            Policy::ContourOnly => StrategyPolicy::ContourOnly,
            Policy::PreferLandmarks => StrategyPolicy::PreferLandmarks,
        },
        ..MeasureConfig::default()
    })
}

/// Load and validate a landmark JSON file.
fn load_landmarks(path: &std::path::Path) -> Result<Landmarks, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let category = match Category::from_id(cli.category) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let landmarks = match cli.landmarks.as_deref().map(load_landmarks).transpose() {
        Ok(l) => l,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut img = match image::open(&cli.image_path) {
        Ok(img) => img.to_rgb8(),
        Err(e) => {
            eprintln!("Error loading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let result = match measure(&mut img, landmarks.as_ref(), category, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Measurement failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing result: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("category:  {category:?} (id {})", category.id());
        println!("mode:      {:?}", result.measuring_mode);
        println!(
            "width:     {:.1}px  ({}, {}) -> ({}, {})",
            result.width, result.w1.x, result.w1.y, result.w2.x, result.w2.y,
        );
        println!(
            "length:    {:.1}px  ({}, {}) -> ({}, {})",
            result.length, result.l1.x, result.l1.y, result.l2.x, result.l2.y,
        );
    }

    if let Some(ref out) = cli.out {
        draw_lines(&mut img, &result, category, &AnnotateStyle::default());
        match img.save(out) {
            Ok(()) => eprintln!("Overlay written to {}", out.display()),
            Err(e) => {
                eprintln!("Error writing overlay to {}: {e}", out.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
