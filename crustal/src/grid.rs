//! In-memory elevation and thickness rasters.
//!
//! Values are stored row-major as `f64`, in the dimension order of the source
//! variable. Missing cells are NaN.

use std::fmt;

use netcdf::AttributeValue;

use crate::isostasy::{convert_elevation_to_thickness, IsostasyParams};

/// Name of the thickness variable in every output file.
pub const THICKNESS_VARIABLE: &str = "z";

/// Description attached to every thickness dataset.
pub const THICKNESS_DESCRIPTION: &str =
    "Crustal thickness derived from paleoelevation using Airy isostasy";

/// Units of the thickness variable.
pub const THICKNESS_UNITS: &str = "m";

/// Long name of the thickness variable.
pub const THICKNESS_LONG_NAME: &str = "Crustal Thickness";

/// One named dimension of a grid, with its coordinate variable if the
/// source file had one.
#[derive(Debug, Clone)]
pub struct Axis {
    /// Dimension name (e.g. "lon")
    pub name: String,
    /// Number of cells along this dimension
    pub len: usize,
    /// Coordinate values, if a same-named variable exists
    pub coords: Option<Vec<f64>>,
    /// Attributes of the coordinate variable
    pub attributes: Vec<(String, AttributeValue)>,
}

impl Axis {
    /// An axis with no coordinate variable.
    pub fn bare(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
            coords: None,
            attributes: Vec::new(),
        }
    }

    /// An axis with coordinate values and no attributes.
    pub fn with_coords(name: impl Into<String>, coords: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            len: coords.len(),
            coords: Some(coords),
            attributes: Vec::new(),
        }
    }
}

/// A non-dimension coordinate listed in the source variable's `coordinates`
/// attribute, either scalar or defined over a subset of the grid's axes.
#[derive(Debug, Clone)]
pub struct AuxCoord {
    /// Variable name
    pub name: String,
    /// Dimension names, empty for a scalar coordinate
    pub dims: Vec<String>,
    /// Row-major values
    pub values: Vec<f64>,
    /// Attributes of the coordinate variable
    pub attributes: Vec<(String, AttributeValue)>,
}

/// Surface elevation raster in meters, as read from an input file.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    /// Name of the source variable
    pub variable: String,
    /// Axes in storage order
    pub axes: Vec<Axis>,
    /// Non-dimension coordinates
    pub aux_coords: Vec<AuxCoord>,
    /// Row-major elevation values (m)
    pub values: Vec<f64>,
}

/// Crustal thickness raster in meters, ready to be written.
#[derive(Debug, Clone)]
pub struct ThicknessGrid {
    /// Name of the output variable
    pub variable: String,
    /// Axes in storage order, identical to the source elevation grid
    pub axes: Vec<Axis>,
    /// Non-dimension coordinates carried over from the source
    pub aux_coords: Vec<AuxCoord>,
    /// Row-major thickness values (m)
    pub values: Vec<f64>,
    /// Dataset-level description
    pub description: String,
    /// Variable units
    pub units: String,
    /// Variable long name
    pub long_name: String,
    /// Parameters the values were computed with
    pub params: IsostasyParams,
}

impl ElevationGrid {
    /// Dimension lengths in storage order.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.len).collect()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Minimum and maximum of the non-NaN values, if any.
    pub fn range(&self) -> Option<(f64, f64)> {
        value_range(&self.values)
    }

    /// Number of NaN (missing) cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Apply the Airy formula to every cell.
    ///
    /// The result keeps this grid's axes, coordinates and shape, and is
    /// always named [`THICKNESS_VARIABLE`].
    pub fn to_thickness(&self, params: &IsostasyParams) -> ThicknessGrid {
        ThicknessGrid {
            variable: THICKNESS_VARIABLE.to_string(),
            axes: self.axes.clone(),
            aux_coords: self.aux_coords.clone(),
            values: convert_elevation_to_thickness(&self.values, params),
            description: THICKNESS_DESCRIPTION.to_string(),
            units: THICKNESS_UNITS.to_string(),
            long_name: THICKNESS_LONG_NAME.to_string(),
            params: *params,
        }
    }
}

impl ThicknessGrid {
    /// Dimension lengths in storage order.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.len).collect()
    }

    /// Minimum and maximum of the non-NaN values, if any.
    pub fn range(&self) -> Option<(f64, f64)> {
        value_range(&self.values)
    }
}

impl fmt::Display for ElevationGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self
            .axes
            .iter()
            .map(|a| format!("{}={}", a.name, a.len))
            .collect();
        write!(f, "{}({})", self.variable, dims.join(", "))
    }
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
