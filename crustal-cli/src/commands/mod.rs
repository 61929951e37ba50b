pub mod convert;
pub mod file;
pub mod info;
pub mod list;
pub mod thickness;

use anyhow::{Context, Result};
use crustal::{ConverterBuilder, IsostasyParams, ThicknessConverter};
use std::path::{Path, PathBuf};

/// Options shared by every subcommand.
pub struct Settings {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub variable: String,
    pub mantle_density: f64,
    pub crust_density: f64,
    pub reference_thickness: f64,
    pub deflate_level: i32,
    pub shuffle: bool,
}

impl Settings {
    pub fn params(&self) -> Result<IsostasyParams> {
        IsostasyParams::new(
            self.mantle_density,
            self.crust_density,
            self.reference_thickness,
        )
        .context("Invalid isostasy parameters")
    }

    pub fn input_dir(&self) -> Result<&Path> {
        self.input_dir.as_deref().context(
            "CRUSTAL_INPUT_DIR environment variable not set. Use --input-dir or set CRUSTAL_INPUT_DIR",
        )
    }

    pub fn output_dir(&self) -> Result<&Path> {
        self.output_dir.as_deref().context(
            "CRUSTAL_OUTPUT_DIR environment variable not set. Use --output-dir or set CRUSTAL_OUTPUT_DIR",
        )
    }

    /// Build a converter reading from `input_dir`.
    pub fn converter(&self, input_dir: &Path) -> Result<ThicknessConverter> {
        ConverterBuilder::new(input_dir, self.output_dir()?)
            .variable(self.variable.as_str())
            .params(self.params()?)
            .deflate_level(self.deflate_level)
            .shuffle(self.shuffle)
            .build()
            .context("Failed to create converter")
    }
}

pub fn format_range(range: Option<(f64, f64)>) -> String {
    match range {
        Some((lo, hi)) => format!("{:.1} .. {:.1} m", lo, hi),
        None => "all missing".to_string(),
    }
}

pub fn format_shape(shape: &[usize]) -> String {
    shape
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("x")
}
