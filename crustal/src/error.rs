//! Error types for the crustal library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting elevation grids.
#[derive(Error, Debug)]
pub enum CrustalError {
    /// IO error when listing directories or creating the output directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the NetCDF library while reading a dataset.
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// The input directory or file does not exist.
    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The dataset has no variable with the configured elevation name.
    #[error("Variable '{variable}' not found in {path}")]
    MissingVariable { path: PathBuf, variable: String },

    /// The filename has no `<digits>Ma` age tag.
    #[error("No age tag (e.g. '120Ma') in filename: {filename}")]
    MissingAgeTag { filename: String },

    /// The filename has more than one `<digits>Ma` age tag.
    #[error("Ambiguous age tag: {count} matches in filename {filename}")]
    AmbiguousAgeTag { filename: String, count: usize },

    /// The age digits do not fit in a `u32`.
    #[error("Age tag '{digits}Ma' out of range in filename {filename}")]
    InvalidAgeTag { filename: String, digits: String },

    /// The elevation variable is stored with a non-numeric type.
    #[error("Variable '{variable}' has unsupported type {vartype}")]
    UnsupportedType { variable: String, vartype: String },

    /// The output file could not be created or written.
    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },

    /// Converter configuration was rejected by the builder.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias using [`CrustalError`].
pub type Result<T> = std::result::Result<T, CrustalError>;
