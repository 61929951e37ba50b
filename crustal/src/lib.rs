//! # crustal - Airy isostasy crustal thickness grids
//!
//! Converts paleoelevation rasters stored as NetCDF into crustal thickness
//! rasters using the Airy isostasy approximation, writing one compressed
//! output file per input file.
//!
//! ## Quick Start
//!
//! ```ignore
//! use crustal::ConverterBuilder;
//!
//! let converter = ConverterBuilder::new(
//!     "STELLAR-Phase4A-Paleotopography-Merged-PMAG",
//!     "CrustalThickness_P4a_airy_PMAG",
//! )
//! .build()?;
//!
//! let report = converter.batch_run()?;
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.input.display(), failure.error);
//! }
//! ```
//!
//! ## The Formula
//!
//! ```text
//! thickness = H0 + elevation * rho_m / (rho_m - rho_c)
//! ```
//!
//! with `rho_m = 3300 kg/m³`, `rho_c = 2700 kg/m³` and `H0 = 35000 m` by
//! default. Sea-level elevation gives the reference thickness, 3000 m of
//! topography gives 51.5 km of crust, and a 6000 m deep basin gives 2 km.
//!
//! ## File Conventions
//!
//! - Input: `paleotopography_spliced_*.nc` with an elevation variable `z` (m)
//!   and an age tag such as `120Ma` in the filename
//! - Output: `crustal_thickness_120Ma.nc` with a thickness variable `z` (m),
//!   deflate level 1 and shuffle enabled

pub mod converter;
pub mod error;
pub mod filename;
pub mod grid;
pub mod isostasy;
pub mod nc;

// Re-export main types at crate root for convenience
pub use converter::{
    BatchReport, ConversionJob, ConverterBuilder, FileFailure, JobOutcome, ProcessedFile,
    ThicknessConverter,
};
pub use error::{CrustalError, Result};
pub use filename::AgeTag;
pub use grid::{AuxCoord, Axis, ElevationGrid, ThicknessGrid, THICKNESS_VARIABLE};
pub use isostasy::{convert_elevation_to_thickness, IsostasyParams};
pub use nc::{read_elevation, write_thickness, Encoding};
