//! Density parameters and area unit presets.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DensityError, DensityResult};

/// Square metres to square miles (1 / 1609.344²).
pub const SQUARE_METRES_TO_SQUARE_MILES: f64 = 3.861_021_585_424_458e-7;

/// International square feet to square miles (1 / 5280²).
pub const SQUARE_FEET_TO_SQUARE_MILES: f64 = 1.0 / 27_878_400.0;

/// Square metres to square kilometres.
pub const SQUARE_METRES_TO_SQUARE_KILOMETRES: f64 = 1e-6;

/// Parameters for turning counts into densities.
///
/// `density = count / (area * unit_conversion_factor)`, where `area` is in the
/// CRS's native squared units. The factor converts that area into the
/// reporting unit, so with [`SQUARE_METRES_TO_SQUARE_MILES`] densities come
/// out as events per square mile.
///
/// # Example
///
/// ```
/// use density_aggregate::{DensityParams, SQUARE_METRES_TO_SQUARE_MILES};
///
/// let params = DensityParams::per_square_mile();
/// assert_eq!(params.unit_conversion_factor, SQUARE_METRES_TO_SQUARE_MILES);
/// assert!(DensityParams::default().with_unit_factor(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DensityParams {
    /// Multiplier from native squared units to the reporting area unit.
    pub unit_conversion_factor: f64,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            unit_conversion_factor: 1.0,
        }
    }
}

impl DensityParams {
    /// Events per square mile for a metre-based CRS.
    #[must_use]
    pub const fn per_square_mile() -> Self {
        Self {
            unit_conversion_factor: SQUARE_METRES_TO_SQUARE_MILES,
        }
    }

    /// Events per square kilometre for a metre-based CRS.
    #[must_use]
    pub const fn per_square_kilometre() -> Self {
        Self {
            unit_conversion_factor: SQUARE_METRES_TO_SQUARE_KILOMETRES,
        }
    }

    /// Set the unit conversion factor.
    #[must_use]
    pub const fn with_unit_factor(mut self, factor: f64) -> Self {
        self.unit_conversion_factor = factor;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::InvalidParams`] unless the factor is finite and
    /// strictly positive.
    pub fn validate(&self) -> DensityResult<()> {
        let f = self.unit_conversion_factor;
        if !f.is_finite() || f <= 0.0 {
            return Err(DensityError::invalid_params(format!(
                "unit_conversion_factor must be finite and > 0, got {f}"
            )));
        }
        Ok(())
    }
}
