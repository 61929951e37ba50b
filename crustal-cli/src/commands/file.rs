use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use super::{format_range, format_shape, Settings};

pub fn run(settings: &Settings, input: PathBuf) -> Result<()> {
    if !input.is_file() {
        bail!("Input file not found: {}", input.display());
    }

    let input_dir = input.parent().unwrap_or_else(|| Path::new("."));
    let converter = settings.converter(input_dir)?;

    converter
        .ensure_output_dir()
        .context("Failed to create output directory")?;

    let processed = converter
        .process_file(&input)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    tracing::info!(output = %processed.output.display(), "Conversion complete");

    println!("Saved: {}", processed.output.display());
    println!("  Age: {} Ma", processed.age.ma());
    println!("  Shape: {}", format_shape(&processed.shape));
    println!("  Thickness: {}", format_range(processed.thickness_range));

    Ok(())
}
