//! Paleotopography filename utilities.
//!
//! Input grids carry their geological age in the filename as a run of digits
//! immediately followed by `Ma` (millions of years), for example
//! `paleotopography_spliced_120Ma.nc`. The age names the output file:
//! `crustal_thickness_120Ma.nc`.
//!
//! # Filename Format
//!
//! - Input: `{prefix}...{age}Ma....nc`, default prefix `paleotopography_spliced_`
//! - Output: `crustal_thickness_{age}Ma.nc`
//!
//! Leading zeros in the age are preserved (`005Ma` stays `005Ma`).

use std::fmt;
use std::path::Path;

use crate::error::{CrustalError, Result};

/// Default prefix of input filenames.
pub const INPUT_PREFIX: &str = "paleotopography_spliced_";

/// Extension of input and output files.
pub const NETCDF_EXTENSION: &str = ".nc";

/// Prefix of output filenames.
pub const OUTPUT_PREFIX: &str = "crustal_thickness_";

/// Geological age parsed from a filename, in millions of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgeTag {
    ma: u32,
    width: usize,
}

impl AgeTag {
    /// Create an age tag without zero padding.
    pub fn new(ma: u32) -> Self {
        Self { ma, width: 0 }
    }

    /// Age in millions of years.
    pub fn ma(&self) -> u32 {
        self.ma
    }

    /// Parse the age tag from a filename (with or without path).
    ///
    /// # Errors
    ///
    /// - [`CrustalError::MissingAgeTag`] if no `<digits>Ma` run exists
    /// - [`CrustalError::AmbiguousAgeTag`] if more than one exists
    /// - [`CrustalError::InvalidAgeTag`] if the digits overflow `u32`
    ///
    /// # Examples
    ///
    /// ```
    /// use crustal::filename::AgeTag;
    ///
    /// let age = AgeTag::parse("paleotopography_spliced_120Ma.nc").unwrap();
    /// assert_eq!(age.ma(), 120);
    /// assert_eq!(age.to_string(), "120");
    ///
    /// assert!(AgeTag::parse("paleotopography_spliced_present.nc").is_err());
    /// ```
    pub fn parse(filename: &str) -> Result<Self> {
        let name = base_name(filename);

        let runs = age_digit_runs(name);
        match runs.as_slice() {
            [] => Err(CrustalError::MissingAgeTag {
                filename: name.to_string(),
            }),
            [digits] => {
                let ma: u32 = digits.parse().map_err(|_| CrustalError::InvalidAgeTag {
                    filename: name.to_string(),
                    digits: digits.to_string(),
                })?;
                Ok(Self {
                    ma,
                    width: digits.len(),
                })
            }
            _ => Err(CrustalError::AmbiguousAgeTag {
                filename: name.to_string(),
                count: runs.len(),
            }),
        }
    }

    /// Output filename for this age.
    ///
    /// ```
    /// use crustal::filename::AgeTag;
    ///
    /// assert_eq!(AgeTag::new(120).output_filename(), "crustal_thickness_120Ma.nc");
    /// ```
    pub fn output_filename(&self) -> String {
        format!("{}{}Ma{}", OUTPUT_PREFIX, self, NETCDF_EXTENSION)
    }
}

impl fmt::Display for AgeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.ma, width = self.width)
    }
}

/// Derive the output filename directly from an input filename.
///
/// ```
/// use crustal::filename::output_filename_for;
///
/// assert_eq!(
///     output_filename_for("/data/paleotopography_spliced_120Ma.nc").unwrap(),
///     "crustal_thickness_120Ma.nc"
/// );
/// ```
pub fn output_filename_for(input: &str) -> Result<String> {
    AgeTag::parse(input).map(|age| age.output_filename())
}

/// Check whether a filename is a batch input: `{prefix}*.nc`.
pub fn is_input_filename(filename: &str, prefix: &str) -> bool {
    filename.starts_with(prefix) && filename.ends_with(NETCDF_EXTENSION)
}

/// Final path component of a filename, as `&str`.
fn base_name(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
}

/// Every maximal digit run that is directly followed by `Ma`.
fn age_digit_runs(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }

        if bytes[i..].starts_with(b"Ma") {
            runs.push(&name[start..i]);
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let age = AgeTag::parse("paleotopography_spliced_120Ma.nc").unwrap();
        assert_eq!(age.ma(), 120);
        assert_eq!(age.output_filename(), "crustal_thickness_120Ma.nc");
    }

    #[test]
    fn test_parse_zero_age() {
        let age = AgeTag::parse("paleotopography_spliced_0Ma.nc").unwrap();
        assert_eq!(age.ma(), 0);
        assert_eq!(age.output_filename(), "crustal_thickness_0Ma.nc");
    }

    #[test]
    fn test_parse_with_path() {
        let age = AgeTag::parse("/data/in/paleotopography_spliced_540Ma.nc").unwrap();
        assert_eq!(age.ma(), 540);
    }

    #[test]
    fn test_directory_digits_ignored() {
        // Only the final component is scanned
        let age = AgeTag::parse("/runs/10Ma/paleotopography_spliced_20Ma.nc").unwrap();
        assert_eq!(age.ma(), 20);
    }

    #[test]
    fn test_tag_inside_name() {
        let age = AgeTag::parse("paleotopography_spliced_PMAG_75Ma_v2.nc").unwrap();
        assert_eq!(age.ma(), 75);
    }

    #[test]
    fn test_zero_padding_preserved() {
        let age = AgeTag::parse("paleotopography_spliced_005Ma.nc").unwrap();
        assert_eq!(age.ma(), 5);
        assert_eq!(age.to_string(), "005");
        assert_eq!(age.output_filename(), "crustal_thickness_005Ma.nc");
    }

    #[test]
    fn test_missing_tag() {
        let err = AgeTag::parse("paleotopography_spliced_present.nc").unwrap_err();
        assert!(matches!(err, CrustalError::MissingAgeTag { .. }));

        // "Ma" without digits
        let err = AgeTag::parse("paleotopography_spliced_Ma.nc").unwrap_err();
        assert!(matches!(err, CrustalError::MissingAgeTag { .. }));

        // Digits not followed by "Ma"
        let err = AgeTag::parse("paleotopography_spliced_120.nc").unwrap_err();
        assert!(matches!(err, CrustalError::MissingAgeTag { .. }));
    }

    #[test]
    fn test_case_sensitive() {
        let err = AgeTag::parse("paleotopography_spliced_120ma.nc").unwrap_err();
        assert!(matches!(err, CrustalError::MissingAgeTag { .. }));
    }

    #[test]
    fn test_ambiguous_tag() {
        let err = AgeTag::parse("paleotopography_spliced_100Ma_to_120Ma.nc").unwrap_err();
        match err {
            CrustalError::AmbiguousAgeTag { count, .. } => assert_eq!(count, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflow() {
        let err = AgeTag::parse("paleotopography_spliced_99999999999Ma.nc").unwrap_err();
        assert!(matches!(err, CrustalError::InvalidAgeTag { .. }));
    }

    #[test]
    fn test_output_filename_for() {
        assert_eq!(
            output_filename_for("paleotopography_spliced_120Ma.nc").unwrap(),
            "crustal_thickness_120Ma.nc"
        );
        assert!(output_filename_for("nothing.nc").is_err());
    }

    #[test]
    fn test_is_input_filename() {
        assert!(is_input_filename(
            "paleotopography_spliced_120Ma.nc",
            INPUT_PREFIX
        ));
        assert!(is_input_filename("paleotopography_spliced_.nc", INPUT_PREFIX));
        assert!(!is_input_filename(
            "paleotopography_120Ma.nc",
            INPUT_PREFIX
        ));
        assert!(!is_input_filename(
            "paleotopography_spliced_120Ma.nc.bak",
            INPUT_PREFIX
        ));
        assert!(!is_input_filename(
            "crustal_thickness_120Ma.nc",
            INPUT_PREFIX
        ));
    }

    #[test]
    fn test_ordering_by_age() {
        let mut ages = [AgeTag::new(120), AgeTag::new(5), AgeTag::new(60)];
        ages.sort();
        assert_eq!(
            ages.iter().map(|a| a.ma()).collect::<Vec<_>>(),
            vec![5, 60, 120]
        );
    }
}
