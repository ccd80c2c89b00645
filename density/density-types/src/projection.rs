//! Explicit reprojection between coordinate reference systems.
//!
//! Nothing in this workspace reprojects implicitly. A [`Reprojection`] pairs a
//! target [`Crs`] tag with the [`Projection`] formula that produces it, and is
//! applied to a whole collection at once.
//!
//! # Formulas
//!
//! Geographic input is `(x, y) = (longitude, latitude)` in degrees. All
//! equal-area variants use a sphere of radius `R` (the authalic radius of
//! GRS 80 by default), which preserves area exactly on that sphere.
//!
//! - **Affine**: `x' = a·x + b·y + c`, `y' = d·x + e·y + f`.
//! - **Cylindrical equal-area** (standard parallel `φs`):
//!   `x = R·(λ − λ0)·cos φs`, `y = R·sin φ / cos φs`.
//! - **Albers equal-area conic** (Snyder, *Map Projections: A Working Manual*,
//!   eqs. 14-1 to 14-4): `n = (sin φ1 + sin φ2) / 2`, `C = cos² φ1 + 2n·sin φ1`,
//!   `ρ = R·√(C − 2n·sin φ) / n`, `θ = n·(λ − λ0)`,
//!   `x = ρ·sin θ`, `y = ρ0 − ρ·cos θ` with `ρ0` evaluated at `φ0`.

use nalgebra::{Affine2, Matrix3, Point2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::crs::Crs;
use crate::error::{TypesError, TypesResult};

/// Authalic radius of the GRS 80 ellipsoid in metres.
pub const AUTHALIC_RADIUS_M: f64 = 6_371_007.181;

/// A planar projection formula.
///
/// # Example
///
/// ```
/// use density_types::{Point2, Projection};
///
/// let albers = Projection::conus_albers();
/// // The projection origin maps to (0, 0)
/// let origin = albers.apply(&Point2::new(-96.0, 23.0));
/// assert!(origin.x.abs() < 1e-6 && origin.y.abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "kebab-case"))]
pub enum Projection {
    /// Coordinates are kept as-is (only the tag changes).
    Identity,

    /// A planar affine transform, valid from any source CRS.
    Affine {
        /// Homogeneous 3×3 transform.
        transform: Affine2<f64>,
    },

    /// Spherical Lambert cylindrical equal-area.
    CylindricalEqualArea {
        /// Central meridian `λ0` in degrees.
        central_meridian: f64,
        /// Standard parallel `φs` in degrees.
        standard_parallel: f64,
        /// Sphere radius in metres.
        radius: f64,
    },

    /// Spherical Albers equal-area conic.
    AlbersEqualArea {
        /// Central meridian `λ0` in degrees.
        central_meridian: f64,
        /// Latitude of origin `φ0` in degrees.
        latitude_of_origin: f64,
        /// First standard parallel `φ1` in degrees.
        parallel_1: f64,
        /// Second standard parallel `φ2` in degrees.
        parallel_2: f64,
        /// Sphere radius in metres.
        radius: f64,
    },
}

impl Projection {
    /// Affine transform from its six coefficients.
    #[must_use]
    pub fn affine(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        let matrix = Matrix3::new(a, b, c, d, e, f, 0.0, 0.0, 1.0);
        Self::Affine {
            transform: Affine2::from_matrix_unchecked(matrix),
        }
    }

    /// Uniform scale, e.g. for unit changes between projected systems.
    #[must_use]
    pub fn scale(factor: f64) -> Self {
        Self::affine(factor, 0.0, 0.0, 0.0, factor, 0.0)
    }

    /// Albers parameters of `EPSG:5070` (NAD83 / Conus Albers) on a sphere.
    #[must_use]
    pub const fn conus_albers() -> Self {
        Self::AlbersEqualArea {
            central_meridian: -96.0,
            latitude_of_origin: 23.0,
            parallel_1: 29.5,
            parallel_2: 45.5,
            radius: AUTHALIC_RADIUS_M,
        }
    }

    /// Cylindrical equal-area with `φs = 30°`, as used by EASE-Grid 2.0.
    #[must_use]
    pub const fn ease_grid2() -> Self {
        Self::CylindricalEqualArea {
            central_meridian: 0.0,
            standard_parallel: 30.0,
            radius: AUTHALIC_RADIUS_M,
        }
    }

    /// Returns `true` if the formula expects longitude/latitude input.
    #[must_use]
    pub const fn requires_geographic(&self) -> bool {
        matches!(
            self,
            Self::CylindricalEqualArea { .. } | Self::AlbersEqualArea { .. }
        )
    }

    /// Check the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidProjection`] for a non-positive radius,
    /// a standard parallel at a pole, symmetric Albers parallels (cone
    /// constant of zero) or a singular affine matrix.
    pub fn validate(&self) -> TypesResult<()> {
        match *self {
            Self::Identity => Ok(()),
            Self::Affine { ref transform } => {
                let det = transform.matrix().fixed_view::<2, 2>(0, 0).determinant();
                if det.is_finite() && det.abs() > f64::EPSILON {
                    Ok(())
                } else {
                    Err(TypesError::InvalidProjection(format!(
                        "affine transform is singular (det = {det})"
                    )))
                }
            }
            Self::CylindricalEqualArea {
                standard_parallel,
                radius,
                ..
            } => {
                check_radius(radius)?;
                if standard_parallel.to_radians().cos() <= f64::EPSILON {
                    return Err(TypesError::InvalidProjection(format!(
                        "standard parallel {standard_parallel} is at a pole"
                    )));
                }
                Ok(())
            }
            Self::AlbersEqualArea {
                parallel_1,
                parallel_2,
                radius,
                ..
            } => {
                check_radius(radius)?;
                let n = (parallel_1.to_radians().sin() + parallel_2.to_radians().sin()) / 2.0;
                if n.abs() < 1e-12 {
                    return Err(TypesError::InvalidProjection(format!(
                        "standard parallels {parallel_1} and {parallel_2} give a zero cone constant"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Project one coordinate.
    ///
    /// Latitudes outside ±90° produce a NaN point, which collection
    /// reprojection reports as malformed geometry.
    #[must_use]
    pub fn apply(&self, p: &Point2<f64>) -> Point2<f64> {
        match *self {
            Self::Identity => *p,
            Self::Affine { ref transform } => transform * p,
            Self::CylindricalEqualArea {
                central_meridian,
                standard_parallel,
                radius,
            } => {
                if p.y.abs() > 90.0 {
                    return Point2::new(f64::NAN, f64::NAN);
                }
                let lambda = wrap_longitude(p.x - central_meridian).to_radians();
                let cos_s = standard_parallel.to_radians().cos();
                Point2::new(
                    radius * lambda * cos_s,
                    radius * p.y.to_radians().sin() / cos_s,
                )
            }
            Self::AlbersEqualArea {
                central_meridian,
                latitude_of_origin,
                parallel_1,
                parallel_2,
                radius,
            } => {
                if p.y.abs() > 90.0 {
                    return Point2::new(f64::NAN, f64::NAN);
                }
                let (sin1, sin2) = (parallel_1.to_radians().sin(), parallel_2.to_radians().sin());
                let n = (sin1 + sin2) / 2.0;
                let cos1 = parallel_1.to_radians().cos();
                let c = cos1.mul_add(cos1, 2.0 * n * sin1);
                let rho_at = |lat: f64| radius * (c - 2.0 * n * lat.to_radians().sin()).sqrt() / n;

                let rho = rho_at(p.y);
                let rho0 = rho_at(latitude_of_origin);
                let theta = n * wrap_longitude(p.x - central_meridian).to_radians();
                Point2::new(rho * theta.sin(), rho.mul_add(-theta.cos(), rho0))
            }
        }
    }
}

fn check_radius(radius: f64) -> TypesResult<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(TypesError::InvalidProjection(format!(
            "radius must be positive, got {radius}"
        )))
    }
}

/// Wrap a longitude difference into `[-180, 180)`.
fn wrap_longitude(delta: f64) -> f64 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

/// A projection together with the CRS tag its output carries.
///
/// # Example
///
/// ```
/// use density_types::{Crs, PointCollection, PointRecord, Reprojection};
///
/// let lonlat = PointCollection::new(
///     Crs::wgs84(),
///     vec![PointRecord::new("p", -96.0, 23.0).unwrap()],
/// )
/// .unwrap();
///
/// let projected = lonlat.reproject(&Reprojection::conus_albers()).unwrap();
/// assert_eq!(projected.crs(), &Crs::conus_albers());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reprojection {
    target: Crs,
    projection: Projection,
}

impl Reprojection {
    /// Pair a target tag with a formula.
    #[must_use]
    pub const fn new(target: Crs, projection: Projection) -> Self {
        Self { target, projection }
    }

    /// Geographic → `EPSG:5070`-style Albers.
    #[must_use]
    pub fn conus_albers() -> Self {
        Self::new(Crs::conus_albers(), Projection::conus_albers())
    }

    /// Geographic → `EPSG:6933`-style cylindrical equal-area.
    #[must_use]
    pub fn ease_grid2() -> Self {
        Self::new(Crs::ease_grid2(), Projection::ease_grid2())
    }

    /// Target CRS tag.
    #[must_use]
    pub const fn target(&self) -> &Crs {
        &self.target
    }

    /// Projection formula.
    #[must_use]
    pub const fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Check the formula is valid and applicable to data tagged `source`.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidProjection`] or
    /// [`TypesError::ProjectionSource`].
    pub fn check_source(&self, source: &Crs) -> TypesResult<()> {
        self.projection.validate()?;
        if self.projection.requires_geographic() && !source.is_geographic() {
            return Err(TypesError::ProjectionSource(source.clone()));
        }
        Ok(())
    }
}
