//! Coordinate reference system tags.
//!
//! A [`Crs`] is a label, not a transform: it names the reference system a
//! collection's coordinates live in and the linear unit those coordinates use.
//! Converting between systems is an explicit step (see [`crate::projection`]).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear unit of a coordinate reference system's axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LinearUnit {
    /// Angular degrees (geographic longitude/latitude).
    Degrees,
    /// Metres.
    #[default]
    Metres,
    /// US survey feet.
    UsFeet,
    /// Unit not declared.
    Unknown,
}

impl LinearUnit {
    /// Returns `true` for angular units, where planar measures are meaningless.
    #[must_use]
    pub const fn is_angular(self) -> bool {
        matches!(self, Self::Degrees)
    }
}

/// A coordinate reference system tag.
///
/// Two collections may only be combined when their tags compare equal.
///
/// # Example
///
/// ```
/// use density_types::{Crs, LinearUnit};
///
/// let wgs84 = Crs::epsg(4326);
/// assert!(wgs84.is_geographic());
///
/// let albers = Crs::epsg(5070);
/// assert_eq!(albers.unit(), LinearUnit::Metres);
/// assert!(albers.is_equal_area());
/// assert_ne!(wgs84, albers);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Crs {
    code: String,
    unit: LinearUnit,
}

/// EPSG codes with a known unit; the flag marks equal-area projections.
const KNOWN_EPSG: &[(u32, LinearUnit, bool)] = &[
    (4326, LinearUnit::Degrees, false),
    (4269, LinearUnit::Degrees, false),
    (4267, LinearUnit::Degrees, false),
    (3857, LinearUnit::Metres, false),
    (5070, LinearUnit::Metres, true),
    (2163, LinearUnit::Metres, true),
    (9311, LinearUnit::Metres, true),
    (6933, LinearUnit::Metres, true),
    (3035, LinearUnit::Metres, true),
    (2263, LinearUnit::UsFeet, false),
];

impl Crs {
    /// Creates a tag from an arbitrary code and unit.
    #[must_use]
    pub fn new(code: impl Into<String>, unit: LinearUnit) -> Self {
        Self {
            code: code.into(),
            unit,
        }
    }

    /// Creates a tag for an EPSG code.
    ///
    /// A handful of common codes carry their real unit; anything else is
    /// tagged [`LinearUnit::Unknown`].
    #[must_use]
    pub fn epsg(code: u32) -> Self {
        let unit = KNOWN_EPSG
            .iter()
            .find(|(c, _, _)| *c == code)
            .map_or(LinearUnit::Unknown, |(_, unit, _)| *unit);
        Self::new(format!("EPSG:{code}"), unit)
    }

    /// WGS 84 longitude/latitude (`EPSG:4326`), the GeoJSON default.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::epsg(4326)
    }

    /// NAD83 / Conus Albers (`EPSG:5070`).
    #[must_use]
    pub fn conus_albers() -> Self {
        Self::epsg(5070)
    }

    /// WGS 84 / NSIDC EASE-Grid 2.0 Global (`EPSG:6933`).
    #[must_use]
    pub fn ease_grid2() -> Self {
        Self::epsg(6933)
    }

    /// Returns the CRS code, e.g. `EPSG:5070`.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the linear unit of the axes.
    #[must_use]
    pub const fn unit(&self) -> LinearUnit {
        self.unit
    }

    /// Returns `true` for degree-based systems.
    #[must_use]
    pub const fn is_geographic(&self) -> bool {
        self.unit.is_angular()
    }

    /// Returns `true` if the code is a known equal-area projection.
    #[must_use]
    pub fn is_equal_area(&self) -> bool {
        KNOWN_EPSG
            .iter()
            .any(|(c, _, equal_area)| *equal_area && self.code == format!("EPSG:{c}"))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
