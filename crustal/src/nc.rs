//! NetCDF reading and writing of elevation and thickness grids.
//!
//! Reading follows the CF conventions for packed and missing data: cells equal
//! to `_FillValue` or `missing_value` become NaN, and `scale_factor` /
//! `add_offset` are applied to everything else. Any numeric storage type is
//! widened to `f64`.
//!
//! Writing produces a NetCDF-4 file with one `f64` data variable, a NaN fill
//! value, and deflate/shuffle filters set from [`Encoding`]. The file is
//! written under a hidden temporary name next to the target and renamed into
//! place only once complete.

use std::fs;
use std::path::{Path, PathBuf};

use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{AttributeValue, Variable};

use crate::error::{CrustalError, Result};
use crate::grid::{AuxCoord, Axis, ElevationGrid, ThicknessGrid};

/// Compression settings for the thickness variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    /// zlib deflate level, 0 (none) to 9 (max)
    pub deflate_level: i32,
    /// Byte-shuffle filter before deflate
    pub shuffle: bool,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            deflate_level: 1,
            shuffle: true,
        }
    }
}

/// Attributes of coordinate variables that are not copied to the output.
const SKIPPED_ATTRIBUTES: &[&str] = &["_FillValue"];

/// Read an elevation variable and its coordinate axes.
///
/// # Errors
///
/// - [`CrustalError::InputNotFound`] if `path` does not exist
/// - [`CrustalError::MissingVariable`] if the dataset has no `variable`
/// - [`CrustalError::UnsupportedType`] if the variable is not numeric
/// - [`CrustalError::NetCdf`] for any other library failure
pub fn read_elevation<P: AsRef<Path>>(path: P, variable: &str) -> Result<ElevationGrid> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CrustalError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = netcdf::open(path)?;
    let var = file
        .variable(variable)
        .ok_or_else(|| CrustalError::MissingVariable {
            path: path.to_path_buf(),
            variable: variable.to_string(),
        })?;

    let mut values = read_as_f64(&var)?;
    unpack_cf(&var, &mut values)?;

    let mut axes = Vec::with_capacity(var.dimensions().len());
    for dim in var.dimensions() {
        let name = dim.name();
        let axis = match file.variable(&name) {
            Some(coord) if is_coordinate_of(&coord, &name) => Axis {
                len: dim.len(),
                coords: Some(read_as_f64(&coord)?),
                attributes: copied_attributes(&coord)?,
                name,
            },
            _ => Axis::bare(name, dim.len()),
        };
        axes.push(axis);
    }

    let dim_names: Vec<&str> = axes.iter().map(|a| a.name.as_str()).collect();
    let mut aux_coords = Vec::new();
    for name in listed_coordinates(&var)? {
        if dim_names.contains(&name.as_str()) {
            continue;
        }
        let Some(coord) = file.variable(&name) else {
            tracing::debug!(coordinate = %name, "Listed coordinate not found, skipping");
            continue;
        };
        let dims: Vec<String> = coord.dimensions().iter().map(|d| d.name()).collect();
        if !dims.iter().all(|d| dim_names.contains(&d.as_str())) {
            tracing::debug!(coordinate = %name, "Coordinate spans foreign dimensions, skipping");
            continue;
        }
        aux_coords.push(AuxCoord {
            values: read_as_f64(&coord)?,
            attributes: copied_attributes(&coord)?,
            dims,
            name,
        });
    }

    tracing::debug!(
        path = %path.display(),
        variable,
        shape = ?axes.iter().map(|a| a.len).collect::<Vec<_>>(),
        "Loaded elevation grid"
    );

    Ok(ElevationGrid {
        variable: variable.to_string(),
        axes,
        aux_coords,
        values,
    })
}

/// Write a thickness grid to `path`, replacing any existing file.
///
/// `source` is recorded as the `source_file` dataset attribute when given.
///
/// # Errors
///
/// Returns [`CrustalError::WriteFailure`] if the file cannot be created or
/// any definition or data write fails.
pub fn write_thickness<P: AsRef<Path>>(
    path: P,
    grid: &ThicknessGrid,
    encoding: &Encoding,
    source: Option<&str>,
) -> Result<()> {
    let path = path.as_ref();
    let partial = partial_path(path);

    if let Err(err) = write_dataset(&partial, grid, encoding, source) {
        let _ = fs::remove_file(&partial);
        return Err(CrustalError::WriteFailure {
            path: path.to_path_buf(),
            source: err,
        });
    }

    fs::rename(&partial, path).map_err(|err| {
        let _ = fs::remove_file(&partial);
        CrustalError::Io(err)
    })
}

/// Hidden sibling of `path` used while the dataset is being written.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}

fn write_dataset(
    path: &Path,
    grid: &ThicknessGrid,
    encoding: &Encoding,
    source: Option<&str>,
) -> std::result::Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;

    file.add_attribute("description", grid.description.as_str())?;
    file.add_attribute("mantle_density", grid.params.mantle_density)?;
    file.add_attribute("crust_density", grid.params.crust_density)?;
    file.add_attribute("reference_thickness", grid.params.reference_thickness)?;
    if let Some(source) = source {
        file.add_attribute("source_file", source)?;
    }

    for axis in &grid.axes {
        file.add_dimension(&axis.name, axis.len)?;
    }

    for axis in &grid.axes {
        if let Some(coords) = &axis.coords {
            let mut coord = file.add_variable::<f64>(&axis.name, &[axis.name.as_str()])?;
            for (name, value) in &axis.attributes {
                coord.put_attribute(name, value.clone())?;
            }
            coord.put_values(coords, ..)?;
        }
    }

    for aux in &grid.aux_coords {
        let dims: Vec<&str> = aux.dims.iter().map(String::as_str).collect();
        let mut coord = file.add_variable::<f64>(&aux.name, &dims)?;
        for (name, value) in &aux.attributes {
            coord.put_attribute(name, value.clone())?;
        }
        coord.put_values(&aux.values, ..)?;
    }

    let dims: Vec<&str> = grid.axes.iter().map(|a| a.name.as_str()).collect();
    let mut var = file.add_variable::<f64>(&grid.variable, &dims)?;
    var.set_compression(encoding.deflate_level, encoding.shuffle)?;
    var.set_fill_value(f64::NAN)?;
    var.put_attribute("units", grid.units.as_str())?;
    var.put_attribute("long_name", grid.long_name.as_str())?;
    if !grid.aux_coords.is_empty() {
        let names: Vec<&str> = grid.aux_coords.iter().map(|c| c.name.as_str()).collect();
        var.put_attribute("coordinates", names.join(" "))?;
    }
    var.put_values(&grid.values, ..)?;

    Ok(())
}

/// A one-dimensional variable indexed by the dimension of the same name.
fn is_coordinate_of(var: &Variable, dim_name: &str) -> bool {
    let dims = var.dimensions();
    dims.len() == 1 && dims[0].name() == dim_name
}

fn read_as_f64(var: &Variable) -> Result<Vec<f64>> {
    let values = match var.vartype() {
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(..)?,
        NcVariableType::Float(FloatType::F32) => widen(var.get_values::<f32, _>(..)?),
        NcVariableType::Int(IntType::I8) => widen(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::U8) => widen(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::I16) => widen(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::U16) => widen(var.get_values::<u16, _>(..)?),
        NcVariableType::Int(IntType::I32) => widen(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::U32) => widen(var.get_values::<u32, _>(..)?),
        NcVariableType::Int(IntType::I64) => var
            .get_values::<i64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        NcVariableType::Int(IntType::U64) => var
            .get_values::<u64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        other => {
            return Err(CrustalError::UnsupportedType {
                variable: var.name(),
                vartype: format!("{:?}", other),
            })
        }
    };
    Ok(values)
}

fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

/// Mask fill/missing cells to NaN and apply scale and offset in place.
fn unpack_cf(var: &Variable, values: &mut [f64]) -> Result<()> {
    let fill = numeric_attribute(var, "_FillValue")?;
    let missing = numeric_attribute(var, "missing_value")?;
    let scale = numeric_attribute(var, "scale_factor")?.unwrap_or(1.0);
    let offset = numeric_attribute(var, "add_offset")?.unwrap_or(0.0);

    for v in values.iter_mut() {
        if fill == Some(*v) || missing == Some(*v) {
            *v = f64::NAN;
        } else {
            *v = *v * scale + offset;
        }
    }
    Ok(())
}

/// Names in the CF `coordinates` attribute, in order.
fn listed_coordinates(var: &Variable) -> Result<Vec<String>> {
    match var.attribute("coordinates") {
        Some(attr) => match attr.value()? {
            AttributeValue::Str(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
            _ => Ok(Vec::new()),
        },
        None => Ok(Vec::new()),
    }
}

fn numeric_attribute(var: &Variable, name: &str) -> Result<Option<f64>> {
    match var.attribute(name) {
        Some(attr) => Ok(attribute_as_f64(&attr.value()?)),
        None => Ok(None),
    }
}

/// First numeric element of an attribute value.
fn attribute_as_f64(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Double(v) => Some(*v),
        AttributeValue::Float(v) => Some(f64::from(*v)),
        AttributeValue::Schar(v) => Some(f64::from(*v)),
        AttributeValue::Uchar(v) => Some(f64::from(*v)),
        AttributeValue::Short(v) => Some(f64::from(*v)),
        AttributeValue::Ushort(v) => Some(f64::from(*v)),
        AttributeValue::Int(v) => Some(f64::from(*v)),
        AttributeValue::Uint(v) => Some(f64::from(*v)),
        AttributeValue::Longlong(v) => Some(*v as f64),
        AttributeValue::Ulonglong(v) => Some(*v as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Shorts(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Ints(v) => v.first().map(|&x| f64::from(x)),
        _ => None,
    }
}

fn copied_attributes(var: &Variable) -> Result<Vec<(String, AttributeValue)>> {
    let mut attributes = Vec::new();
    for attr in var.attributes() {
        if SKIPPED_ATTRIBUTES.contains(&attr.name()) {
            continue;
        }
        attributes.push((attr.name().to_string(), attr.value()?));
    }
    Ok(attributes)
}
