//! Airy isostasy conversion from surface elevation to crustal thickness.
//!
//! Under Airy isostasy a column of crust floats on the mantle, so every meter
//! of topography above the reference level is compensated by a root of
//! `rho_c / (rho_m - rho_c)` meters below it. The total thickness relative to
//! a reference crust of thickness `H0` is therefore:
//!
//! ```text
//! thickness = H0 + elevation * rho_m / (rho_m - rho_c)
//! ```
//!
//! Negative elevations (ocean basins) thin the crust by the same factor.

use crate::error::{CrustalError, Result};

/// Default mantle density in kg/m³.
pub const MANTLE_DENSITY: f64 = 3300.0;

/// Default crustal density in kg/m³.
pub const CRUST_DENSITY: f64 = 2700.0;

/// Default reference crustal thickness in meters.
pub const REFERENCE_THICKNESS: f64 = 35000.0;

/// Densities and reference thickness used by the Airy formula.
///
/// # Example
///
/// ```
/// use crustal::IsostasyParams;
///
/// let params = IsostasyParams::default();
/// assert_eq!(params.thickness(0.0), 35000.0);
/// assert_eq!(params.thickness(-6000.0), 2000.0);
/// assert_eq!(params.thickness(3000.0), 51500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsostasyParams {
    /// Mantle density (kg/m³)
    pub mantle_density: f64,
    /// Crustal density (kg/m³)
    pub crust_density: f64,
    /// Thickness of crust at zero elevation (m)
    pub reference_thickness: f64,
}

impl Default for IsostasyParams {
    fn default() -> Self {
        Self {
            mantle_density: MANTLE_DENSITY,
            crust_density: CRUST_DENSITY,
            reference_thickness: REFERENCE_THICKNESS,
        }
    }
}

impl IsostasyParams {
    /// Create validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CrustalError::InvalidConfig`] if any value is not finite or
    /// the two densities are equal (the formula would divide by zero).
    pub fn new(mantle_density: f64, crust_density: f64, reference_thickness: f64) -> Result<Self> {
        let params = Self {
            mantle_density,
            crust_density,
            reference_thickness,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check that the formula is defined for these parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.mantle_density.is_finite()
            || !self.crust_density.is_finite()
            || !self.reference_thickness.is_finite()
        {
            return Err(CrustalError::InvalidConfig(format!(
                "isostasy parameters must be finite: {:?}",
                self
            )));
        }
        if self.mantle_density == self.crust_density {
            return Err(CrustalError::InvalidConfig(format!(
                "mantle density and crust density must differ (both {})",
                self.mantle_density
            )));
        }
        Ok(())
    }

    /// Multiplier applied to elevation: `rho_m / (rho_m - rho_c)`.
    pub fn amplification(&self) -> f64 {
        self.mantle_density / (self.mantle_density - self.crust_density)
    }

    /// Crustal thickness in meters for an elevation in meters.
    ///
    /// NaN elevations map to NaN thickness.
    #[inline]
    pub fn thickness(&self, elevation: f64) -> f64 {
        self.reference_thickness
            + (elevation * self.mantle_density) / (self.mantle_density - self.crust_density)
    }

    /// Thickness range `(min, max)` spanned by an elevation range.
    ///
    /// The bounds are reordered when the amplification is negative
    /// (crust denser than mantle).
    pub fn thickness_range(&self, elevation_range: (f64, f64)) -> (f64, f64) {
        let a = self.thickness(elevation_range.0);
        let b = self.thickness(elevation_range.1);
        (a.min(b), a.max(b))
    }
}

/// Convert elevations (m) to crustal thickness (m) element-wise.
///
/// The output has the same length and ordering as the input, so any
/// row-major N-dimensional raster keeps its shape.
pub fn convert_elevation_to_thickness(elevation: &[f64], params: &IsostasyParams) -> Vec<f64> {
    elevation.iter().map(|&e| params.thickness(e)).collect()
}
