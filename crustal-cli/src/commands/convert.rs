use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use super::{format_range, format_shape, Settings};

#[derive(Serialize)]
struct ProcessedJson {
    input: String,
    output: String,
    age_ma: u32,
    shape: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_thickness: Option<f64>,
}

#[derive(Serialize)]
struct FailureJson {
    input: String,
    error: String,
}

#[derive(Serialize)]
struct ReportJson {
    processed: Vec<ProcessedJson>,
    failures: Vec<FailureJson>,
    elapsed_ms: u64,
}

pub fn run(settings: &Settings, json: bool) -> Result<()> {
    let converter = settings.converter(settings.input_dir()?)?;
    let jobs = converter.jobs().context("Failed to list input directory")?;
    converter.ensure_output_dir().with_context(|| {
        format!(
            "Failed to create output directory: {}",
            converter.output_dir().display()
        )
    })?;

    if jobs.is_empty() && !json {
        println!(
            "No input files found in: {}",
            converter.input_dir().display()
        );
        return Ok(());
    }

    let pb = if json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(jobs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb
    };

    let report = converter
        .run_jobs(&jobs, |outcome| {
            if let Ok(processed) = outcome {
                pb.set_message(processed.age.output_filename());
            }
            pb.inc(1);
        })
        .context("Batch conversion failed")?;

    pb.finish_and_clear();

    if json {
        let response = ReportJson {
            processed: report
                .processed
                .iter()
                .map(|p| ProcessedJson {
                    input: p.input.display().to_string(),
                    output: p.output.display().to_string(),
                    age_ma: p.age.ma(),
                    shape: p.shape.clone(),
                    min_thickness: p.thickness_range.map(|r| r.0),
                    max_thickness: p.thickness_range.map(|r| r.1),
                })
                .collect(),
            failures: report
                .failures
                .iter()
                .map(|f| FailureJson {
                    input: f.input.display().to_string(),
                    error: f.error.to_string(),
                })
                .collect(),
            elapsed_ms: report.elapsed_ms,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        for processed in &report.processed {
            println!(
                "Saved: {} ({}, {})",
                processed.output.display(),
                format_shape(&processed.shape),
                format_range(processed.thickness_range)
            );
        }

        println!();
        println!("Summary:");
        println!("  Converted: {}", report.processed.len());
        if !report.failures.is_empty() {
            println!("  Failed: {}", report.failures.len());
            for failure in &report.failures {
                println!("    {}: {}", failure.input.display(), failure.error);
            }
        }
        println!("  Output directory: {}", converter.output_dir().display());
        println!("  Elapsed: {} ms", report.elapsed_ms);
    }

    if !report.is_success() {
        bail!(
            "{} of {} files failed to convert",
            report.failures.len(),
            report.total()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings(temp_dir: &TempDir) -> Settings {
        Settings {
            input_dir: Some(temp_dir.path().join("in")),
            output_dir: Some(temp_dir.path().join("out").join("nested")),
            variable: "z".to_string(),
            mantle_density: 3300.0,
            crust_density: 2700.0,
            reference_thickness: 35000.0,
            deflate_level: 1,
            shuffle: true,
        }
    }

    #[test]
    fn test_empty_input_still_creates_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("in")).unwrap();
        fs::write(temp_dir.path().join("in").join("notes.txt"), b"").unwrap();

        run(&settings(&temp_dir), false).unwrap();

        let output_dir = temp_dir.path().join("out").join("nested");
        assert!(output_dir.is_dir());
        assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_input_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(run(&settings(&temp_dir), false).is_err());
    }
}
