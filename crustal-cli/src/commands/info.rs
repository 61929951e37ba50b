use anyhow::{Context, Result};
use crustal::{filename::AgeTag, read_elevation};
use std::path::PathBuf;

use super::{format_range, format_shape, Settings};

pub fn run(settings: &Settings, path: PathBuf) -> Result<()> {
    let grid = read_elevation(&path, &settings.variable)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let params = settings.params()?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    println!("File: {}", filename);
    println!("Path: {}", path.display());
    match AgeTag::parse(&filename) {
        Ok(age) => println!("Age: {} Ma -> {}", age.ma(), age.output_filename()),
        Err(e) => println!("Age: unknown ({})", e),
    }
    println!();

    println!("Variable: {}", grid);
    println!("Shape: {} ({} cells)", format_shape(&grid.shape()), grid.len());
    for axis in &grid.axes {
        match &axis.coords {
            Some(coords) if !coords.is_empty() => println!(
                "  {:<8} {:>6} values, {} .. {}",
                axis.name,
                axis.len,
                coords[0],
                coords[coords.len() - 1]
            ),
            _ => println!("  {:<8} {:>6} values, no coordinates", axis.name, axis.len),
        }
    }
    println!();

    println!("Elevation: {}", format_range(grid.range()));
    let thickness = grid.range().map(|range| params.thickness_range(range));
    println!("Thickness: {}", format_range(thickness));

    let missing = grid.missing_count();
    if missing > 0 && !grid.is_empty() {
        let pct = (missing as f64 / grid.len() as f64) * 100.0;
        println!("Missing cells: {} ({:.1}%)", missing, pct);
    }

    Ok(())
}
