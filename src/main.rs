/**
 * Greedy Dither CLI - dither an image to pure black and white
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use greedy_dither::{dither_file, DitherConfig, DitherOptions, FilterType};

/// Greedy error-diffusion dithering
#[derive(Parser)]
#[command(name = "greedy-dither")]
#[command(version)]
#[command(about = "Dither an image to black and white, largest error first", long_about = None)]
struct Cli {
    /// Path of the image to dither
    input: PathBuf,

    /// Output image path
    output: PathBuf,

    /// Proportionally resize the largest dimension to this value before dithering
    #[arg(short, long)]
    size: Option<u32>,

    /// Output value for black pixels
    #[arg(long, default_value = "0")]
    black: u8,

    /// Output value for white pixels
    #[arg(long, default_value = "255")]
    white: u8,

    /// Show dithering progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Validate inputs
    if !cli.input.exists() {
        anyhow::bail!("Input file does not exist: {}", cli.input.display());
    }
    if cli.size == Some(0) {
        anyhow::bail!("Size must be positive");
    }
    if cli.black == cli.white {
        anyhow::bail!("Black and white values must differ");
    }

    println!("Processing: {}", cli.input.display());
    println!("Output: {}", cli.output.display());
    if let Some(size) = cli.size {
        println!("Size: {} (largest dimension, maintaining aspect ratio)", size);
    }
    println!();

    // Create output directory if it doesn't exist
    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    let options = DitherOptions {
        size: cli.size,
        filter: FilterType::Triangle,
        config: DitherConfig {
            black: cli.black,
            white: cli.white,
            verbose: cli.verbose,
        },
    };

    let start = Instant::now();
    let result = dither_file(&cli.input, &cli.output, &options)
        .with_context(|| format!("Failed to dither {}", cli.input.display()))?;

    println!(
        "Dithered {}×{} image in {:.2}s",
        result.width,
        result.height,
        start.elapsed().as_secs_f32()
    );
    println!("Saved to: {}", cli.output.display());

    Ok(())
}
