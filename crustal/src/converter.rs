//! Batch conversion of paleoelevation files to crustal thickness files.
//!
//! [`ThicknessConverter`] scans an input directory for
//! `paleotopography_spliced_*.nc` files and writes one
//! `crustal_thickness_{age}Ma.nc` per input into the output directory.
//!
//! ```ignore
//! use crustal::ConverterBuilder;
//!
//! let converter = ConverterBuilder::new("paleotopography", "thickness")
//!     .deflate_level(1)
//!     .build()?;
//!
//! let report = converter.batch_run()?;
//! println!("{} written, {} failed", report.processed.len(), report.failures.len());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{CrustalError, Result};
use crate::filename::{is_input_filename, AgeTag, INPUT_PREFIX};
use crate::isostasy::IsostasyParams;
use crate::nc::{read_elevation, write_thickness, Encoding};

/// Default name of the elevation variable in input files.
pub const DEFAULT_VARIABLE: &str = "z";

/// One input file to convert.
///
/// Jobs are independent: each reads one file and writes one distinct output,
/// so any job can be retried or run in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Path to the input elevation file
    pub input: PathBuf,
}

impl ConversionJob {
    /// Create a job for an input path.
    pub fn new<P: AsRef<Path>>(input: P) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
        }
    }

    /// Filename of the input, lossily converted to UTF-8.
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// A successfully written output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    /// Input elevation file
    pub input: PathBuf,
    /// Written thickness file
    pub output: PathBuf,
    /// Age parsed from the input filename
    pub age: AgeTag,
    /// Dimension lengths of the grid
    pub shape: Vec<usize>,
    /// Min/max thickness (m) over non-missing cells
    pub thickness_range: Option<(f64, f64)>,
}

/// A file that could not be converted.
#[derive(Debug)]
pub struct FileFailure {
    /// Input elevation file
    pub input: PathBuf,
    /// Why it failed
    pub error: CrustalError,
}

/// Outcome of converting a single job, passed to batch progress callbacks.
pub type JobOutcome = std::result::Result<ProcessedFile, FileFailure>;

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written successfully, in processing order
    pub processed: Vec<ProcessedFile>,
    /// Files that failed, in processing order
    pub failures: Vec<FileFailure>,
    /// Total elapsed time in milliseconds
    pub elapsed_ms: u64,
}

impl BatchReport {
    /// Number of input files attempted.
    pub fn total(&self) -> usize {
        self.processed.len() + self.failures.len()
    }

    /// `true` if no file failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Converts elevation grids to crustal thickness grids.
///
/// Construct with [`ConverterBuilder`].
#[derive(Debug, Clone)]
pub struct ThicknessConverter {
    input_dir: PathBuf,
    output_dir: PathBuf,
    variable: String,
    file_prefix: String,
    params: IsostasyParams,
    encoding: Encoding,
}

impl ThicknessConverter {
    /// Create a builder for the given directories.
    pub fn builder<P: AsRef<Path>, Q: AsRef<Path>>(
        input_dir: P,
        output_dir: Q,
    ) -> ConverterBuilder {
        ConverterBuilder::new(input_dir, output_dir)
    }

    /// Directory scanned for input files.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Directory output files are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Name of the elevation variable read from inputs.
    ///
    /// Outputs always name the thickness variable [`crate::THICKNESS_VARIABLE`].
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Isostasy parameters.
    pub fn params(&self) -> &IsostasyParams {
        &self.params
    }

    /// Compression settings.
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// List input files as jobs, sorted by filename.
    ///
    /// Only regular files named `{prefix}*.nc` are included.
    ///
    /// # Errors
    ///
    /// Returns [`CrustalError::InputNotFound`] if the input directory does not
    /// exist, or an IO error if it cannot be read.
    pub fn jobs(&self) -> Result<Vec<ConversionJob>> {
        if !self.input_dir.is_dir() {
            return Err(CrustalError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&self.input_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_input_filename(&name, &self.file_prefix) && entry.path().is_file() {
                names.push(name);
            }
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| ConversionJob::new(self.input_dir.join(name)))
            .collect())
    }

    /// Output path an input file would be written to.
    ///
    /// # Errors
    ///
    /// Fails if the input filename has no single valid age tag.
    pub fn output_path_for<P: AsRef<Path>>(&self, input: P) -> Result<(AgeTag, PathBuf)> {
        let input = input.as_ref();
        let name = input.file_name().map(|n| n.to_string_lossy()).ok_or_else(|| {
            CrustalError::MissingAgeTag {
                filename: input.display().to_string(),
            }
        })?;
        let age = AgeTag::parse(&name)?;
        Ok((age, self.output_dir.join(age.output_filename())))
    }

    /// Convert one elevation file and write its thickness file.
    ///
    /// The age tag is checked before the grid is read, so a badly named file
    /// fails without touching the dataset. An existing output file is
    /// overwritten. The output directory must already exist.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ProcessedFile> {
        let path = path.as_ref();
        let (age, output) = self.output_path_for(path)?;

        let elevation = read_elevation(path, &self.variable)?;
        let thickness = elevation.to_thickness(&self.params);

        let source = path.file_name().and_then(|n| n.to_str());
        write_thickness(&output, &thickness, &self.encoding, source)?;

        tracing::info!(
            input = %path.display(),
            output = %output.display(),
            age = age.ma(),
            "Saved crustal thickness grid"
        );

        Ok(ProcessedFile {
            input: path.to_path_buf(),
            output,
            age,
            shape: thickness.shape(),
            thickness_range: thickness.range(),
        })
    }

    /// Run a single job, converting an error into a [`FileFailure`].
    pub fn run_job(&self, job: &ConversionJob) -> JobOutcome {
        self.process_file(&job.input).map_err(|error| FileFailure {
            input: job.input.clone(),
            error,
        })
    }

    /// Create the output directory if it does not exist.
    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Convert every input file in the input directory.
    ///
    /// Equivalent to [`Self::batch_run_with`] with no progress callback.
    pub fn batch_run(&self) -> Result<BatchReport> {
        self.batch_run_with(|_| {})
    }

    /// Convert every input file, calling `on_file` after each one.
    ///
    /// A failing file is logged and recorded in the report; the remaining
    /// files are still processed.
    ///
    /// # Errors
    ///
    /// Only run-level failures are returned: a missing or unreadable input
    /// directory, or an output directory that cannot be created.
    pub fn batch_run_with<F>(&self, on_file: F) -> Result<BatchReport>
    where
        F: FnMut(&JobOutcome),
    {
        let jobs = self.jobs()?;
        self.run_jobs(&jobs, on_file)
    }

    /// Convert the given jobs in order, calling `on_file` after each one.
    ///
    /// Creates the output directory first. Per-file failures are logged and
    /// recorded in the report.
    pub fn run_jobs<F>(&self, jobs: &[ConversionJob], mut on_file: F) -> Result<BatchReport>
    where
        F: FnMut(&JobOutcome),
    {
        let start = Instant::now();
        self.ensure_output_dir()?;

        tracing::info!(
            input_dir = %self.input_dir.display(),
            output_dir = %self.output_dir.display(),
            files = jobs.len(),
            "Starting batch conversion"
        );

        let mut report = BatchReport::default();
        for job in jobs {
            let outcome = self.run_job(job);
            on_file(&outcome);
            match outcome {
                Ok(processed) => report.processed.push(processed),
                Err(failure) => {
                    tracing::warn!(
                        input = %failure.input.display(),
                        error = %failure.error,
                        "Failed to convert file"
                    );
                    report.failures.push(failure);
                }
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            processed = report.processed.len(),
            failed = report.failures.len(),
            elapsed_ms = report.elapsed_ms,
            "Batch conversion complete"
        );

        Ok(report)
    }
}

/// Builder for creating [`ThicknessConverter`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use crustal::{ConverterBuilder, IsostasyParams};
///
/// let converter = ConverterBuilder::new("in", "out")
///     .variable("ElevationDL")
///     .params(IsostasyParams::new(3300.0, 2800.0, 33000.0)?)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct ConverterBuilder {
    input_dir: PathBuf,
    output_dir: PathBuf,
    variable: String,
    file_prefix: String,
    params: IsostasyParams,
    encoding: Encoding,
}

impl ConverterBuilder {
    /// Create a new builder with the specified directories and defaults.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input_dir: P, output_dir: Q) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            variable: DEFAULT_VARIABLE.to_string(),
            file_prefix: INPUT_PREFIX.to_string(),
            params: IsostasyParams::default(),
            encoding: Encoding::default(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CRUSTAL_INPUT_DIR` | Directory of elevation files | Required |
    /// | `CRUSTAL_OUTPUT_DIR` | Directory for thickness files | Required |
    /// | `CRUSTAL_VARIABLE` | Elevation variable name | `z` |
    /// | `CRUSTAL_MANTLE_DENSITY` | Mantle density (kg/m³) | 3300 |
    /// | `CRUSTAL_CRUST_DENSITY` | Crust density (kg/m³) | 2700 |
    /// | `CRUSTAL_REFERENCE_THICKNESS` | Reference thickness (m) | 35000 |
    /// | `CRUSTAL_DEFLATE_LEVEL` | Deflate level (0-9) | 1 |
    ///
    /// # Errors
    ///
    /// Returns an error if either directory variable is not set, or if a
    /// numeric variable is set but does not parse.
    pub fn from_env() -> Result<Self> {
        let input_dir = required_env("CRUSTAL_INPUT_DIR")?;
        let output_dir = required_env("CRUSTAL_OUTPUT_DIR")?;

        let mut builder = Self::new(input_dir, output_dir);

        if let Ok(variable) = std::env::var("CRUSTAL_VARIABLE") {
            builder.variable = variable;
        }

        let defaults = IsostasyParams::default();
        builder.params = IsostasyParams {
            mantle_density: parsed_env("CRUSTAL_MANTLE_DENSITY")?
                .unwrap_or(defaults.mantle_density),
            crust_density: parsed_env("CRUSTAL_CRUST_DENSITY")?.unwrap_or(defaults.crust_density),
            reference_thickness: parsed_env("CRUSTAL_REFERENCE_THICKNESS")?
                .unwrap_or(defaults.reference_thickness),
        };

        if let Some(level) = parsed_env("CRUSTAL_DEFLATE_LEVEL")? {
            builder.encoding.deflate_level = level;
        }

        Ok(builder)
    }

    /// Set the elevation variable name (default `z`).
    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    /// Set the input filename prefix (default `paleotopography_spliced_`).
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set the isostasy parameters.
    pub fn params(mut self, params: IsostasyParams) -> Self {
        self.params = params;
        self
    }

    /// Set the deflate level (0-9, default 1).
    pub fn deflate_level(mut self, level: i32) -> Self {
        self.encoding.deflate_level = level;
        self
    }

    /// Enable or disable the shuffle filter (default enabled).
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.encoding.shuffle = shuffle;
        self
    }

    /// Build the [`ThicknessConverter`].
    ///
    /// # Errors
    ///
    /// Returns [`CrustalError::InvalidConfig`] if the parameters are invalid,
    /// the deflate level is outside 0-9, or the variable name is empty.
    pub fn build(self) -> Result<ThicknessConverter> {
        self.params.validate()?;

        if !(0..=9).contains(&self.encoding.deflate_level) {
            return Err(CrustalError::InvalidConfig(format!(
                "deflate level must be between 0 and 9, got {}",
                self.encoding.deflate_level
            )));
        }
        if self.variable.is_empty() {
            return Err(CrustalError::InvalidConfig(
                "variable name must not be empty".to_string(),
            ));
        }

        Ok(ThicknessConverter {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            variable: self.variable,
            file_prefix: self.file_prefix,
            params: self.params,
            encoding: self.encoding,
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| {
        CrustalError::InvalidConfig(format!("{} environment variable not set", name))
    })
}

/// Parse an optional numeric variable. Unset is `None`, set but invalid is an error.
fn parsed_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(s) => s.trim().parse().map(Some).map_err(|_| {
            CrustalError::InvalidConfig(format!("{} must be a number, got '{}'", name, s))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_builder_defaults() {
        let converter = ConverterBuilder::new("in", "out").build().unwrap();
        assert_eq!(converter.input_dir(), Path::new("in"));
        assert_eq!(converter.output_dir(), Path::new("out"));
        assert_eq!(converter.variable(), "z");
        assert_eq!(*converter.params(), IsostasyParams::default());
        assert_eq!(*converter.encoding(), Encoding::default());
    }

    #[test]
    fn test_builder_rejects_bad_deflate_level() {
        let err = ConverterBuilder::new("in", "out")
            .deflate_level(10)
            .build()
            .unwrap_err();
        assert!(matches!(err, CrustalError::InvalidConfig(_)));

        assert!(ConverterBuilder::new("in", "out")
            .deflate_level(-1)
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_rejects_equal_densities() {
        let params = IsostasyParams {
            mantle_density: 3000.0,
            crust_density: 3000.0,
            reference_thickness: 35000.0,
        };
        assert!(ConverterBuilder::new("in", "out")
            .params(params)
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_rejects_empty_variable() {
        assert!(ConverterBuilder::new("in", "out")
            .variable("")
            .build()
            .is_err());
    }

    #[test]
    fn test_from_env() {
        let orig: Vec<(&str, Option<String>)> = [
            "CRUSTAL_INPUT_DIR",
            "CRUSTAL_OUTPUT_DIR",
            "CRUSTAL_VARIABLE",
            "CRUSTAL_MANTLE_DENSITY",
            "CRUSTAL_CRUST_DENSITY",
            "CRUSTAL_REFERENCE_THICKNESS",
            "CRUSTAL_DEFLATE_LEVEL",
        ]
        .into_iter()
        .map(|k| (k, std::env::var(k).ok()))
        .collect();

        std::env::remove_var("CRUSTAL_OUTPUT_DIR");
        std::env::remove_var("CRUSTAL_CRUST_DENSITY");
        std::env::remove_var("CRUSTAL_REFERENCE_THICKNESS");
        std::env::set_var("CRUSTAL_INPUT_DIR", "/data/in");
        assert!(ConverterBuilder::from_env().is_err());

        std::env::set_var("CRUSTAL_OUTPUT_DIR", "/data/out");
        std::env::set_var("CRUSTAL_VARIABLE", "ElevationDL");
        std::env::set_var("CRUSTAL_MANTLE_DENSITY", "3250");
        std::env::set_var("CRUSTAL_DEFLATE_LEVEL", "not-a-number");

        let err = ConverterBuilder::from_env().unwrap_err();
        assert!(matches!(err, CrustalError::InvalidConfig(_)));
        assert!(err.to_string().contains("CRUSTAL_DEFLATE_LEVEL"));

        std::env::set_var("CRUSTAL_DEFLATE_LEVEL", "4");
        std::env::set_var("CRUSTAL_CRUST_DENSITY", "2.7e3kg");
        let err = ConverterBuilder::from_env().unwrap_err();
        assert!(err.to_string().contains("CRUSTAL_CRUST_DENSITY"));
        std::env::remove_var("CRUSTAL_CRUST_DENSITY");

        let builder = ConverterBuilder::from_env().unwrap();
        assert_eq!(builder.input_dir, PathBuf::from("/data/in"));
        assert_eq!(builder.output_dir, PathBuf::from("/data/out"));
        assert_eq!(builder.variable, "ElevationDL");
        assert_eq!(builder.params.mantle_density, 3250.0);
        assert_eq!(builder.params.crust_density, 2700.0);
        assert_eq!(builder.encoding.deflate_level, 4);

        for (k, v) in orig {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        }
    }

    #[test]
    fn test_jobs_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "paleotopography_spliced_120Ma.nc");
        touch(temp_dir.path(), "paleotopography_spliced_0Ma.nc");
        touch(temp_dir.path(), "paleotopography_spliced_60Ma.nc.tmp");
        touch(temp_dir.path(), "other_60Ma.nc");
        fs::create_dir(temp_dir.path().join("paleotopography_spliced_dir.nc")).unwrap();

        let converter = ConverterBuilder::new(temp_dir.path(), temp_dir.path().join("out"))
            .build()
            .unwrap();
        let jobs = converter.jobs().unwrap();
        let names: Vec<String> = jobs.iter().map(|j| j.file_name()).collect();

        assert_eq!(
            names,
            vec![
                "paleotopography_spliced_0Ma.nc",
                "paleotopography_spliced_120Ma.nc"
            ]
        );
    }

    #[test]
    fn test_jobs_missing_input_dir() {
        let temp_dir = TempDir::new().unwrap();
        let converter = ConverterBuilder::new(temp_dir.path().join("missing"), temp_dir.path())
            .build()
            .unwrap();
        let err = converter.jobs().unwrap_err();
        assert!(matches!(err, CrustalError::InputNotFound { .. }));
    }

    #[test]
    fn test_output_path_for() {
        let converter = ConverterBuilder::new("in", "out").build().unwrap();
        let (age, path) = converter
            .output_path_for("in/paleotopography_spliced_120Ma.nc")
            .unwrap();
        assert_eq!(age.ma(), 120);
        assert_eq!(path, PathBuf::from("out/crustal_thickness_120Ma.nc"));

        assert!(converter
            .output_path_for("in/paleotopography_spliced_x.nc")
            .is_err());
    }

    #[test]
    fn test_batch_records_failures_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        fs::create_dir(&input).unwrap();
        // No age tag, and not a valid NetCDF file
        touch(&input, "paleotopography_spliced_present.nc");
        touch(&input, "paleotopography_spliced_10Ma.nc");

        let output = temp_dir.path().join("out");
        let converter = ConverterBuilder::new(&input, &output).build().unwrap();

        let mut seen = 0;
        let report = converter.batch_run_with(|_| seen += 1).unwrap();

        assert_eq!(seen, 2);
        assert_eq!(report.total(), 2);
        assert_eq!(report.failures.len(), 2);
        assert!(!report.is_success());
        assert!(output.is_dir());
        assert!(report
            .failures
            .iter()
            .any(|f| matches!(f.error, CrustalError::MissingAgeTag { .. })));
    }

    #[test]
    fn test_batch_empty_input_dir() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");
        let converter = ConverterBuilder::new(temp_dir.path(), &output).build().unwrap();

        let report = converter.batch_run().unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.is_success());
        assert!(output.is_dir());
    }
}
