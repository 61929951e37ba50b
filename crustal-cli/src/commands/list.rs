use anyhow::{Context, Result};
use crustal::filename::AgeTag;
use std::fs;

use super::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let input_dir = settings.input_dir()?;
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", input_dir.display());
    }

    // Listing only needs the input side; output names are relative.
    let converter = crustal::ConverterBuilder::new(input_dir, ".")
        .build()
        .context("Failed to create converter")?;
    let jobs = converter.jobs().context("Failed to read input directory")?;

    if jobs.is_empty() {
        println!("No input files found in: {}", input_dir.display());
        return Ok(());
    }

    let mut total_size: u64 = 0;
    let mut unnamed = 0;

    println!("{:<44} {:>8} {:>32}", "FILE", "AGE", "OUTPUT");
    println!("{}", "-".repeat(86));

    for job in &jobs {
        let name = job.file_name();
        total_size += fs::metadata(&job.input).map(|m| m.len()).unwrap_or(0);

        let (age, output) = match AgeTag::parse(&name) {
            Ok(age) => (format!("{} Ma", age.ma()), age.output_filename()),
            Err(_) => {
                unnamed += 1;
                ("???".to_string(), "(no age tag)".to_string())
            }
        };

        println!("{:<44} {:>8} {:>32}", name, age, output);
    }

    println!();
    println!("Summary:");
    println!("  Input files: {}", jobs.len());
    if unnamed > 0 {
        println!("  Without age tag: {}", unnamed);
    }
    println!("  Total size: {}", format_size(total_size));
    println!("  Input directory: {}", input_dir.display());

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
