//! Join parameters and boundary tie-break rules.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{JoinError, JoinResult};

/// How a point lying on a polygon boundary is assigned.
///
/// A point strictly inside a polygon is always assigned to it (the first such
/// polygon in iteration order if polygons overlap). The rule only decides
/// between polygons whose boundary the point lies on, such as two tracts
/// sharing an edge.
///
/// # Example
///
/// ```
/// use density_join::BoundaryRule;
///
/// assert_eq!(BoundaryRule::default(), BoundaryRule::FirstInOrder);
/// assert_eq!("lowest-id".parse::<BoundaryRule>().unwrap(), BoundaryRule::LowestId);
/// assert!("coin-flip".parse::<BoundaryRule>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BoundaryRule {
    /// The first polygon, in collection order, whose boundary-inclusive test succeeds.
    #[default]
    FirstInOrder,
    /// The polygon with the lexicographically smallest identifier.
    LowestId,
    /// Boundary points are left unassigned.
    Exclude,
}

impl BoundaryRule {
    /// Every rule, in declaration order.
    pub const ALL: [Self; 3] = [Self::FirstInOrder, Self::LowestId, Self::Exclude];

    /// Kebab-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstInOrder => "first-in-order",
            Self::LowestId => "lowest-id",
            Self::Exclude => "exclude",
        }
    }
}

impl fmt::Display for BoundaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryRule {
    type Err = JoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| {
                JoinError::invalid_params(format!(
                    "unknown boundary rule '{s}' (expected first-in-order, lowest-id or exclude)"
                ))
            })
    }
}

/// Parameters for the point-in-polygon join.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JoinParams {
    /// Tie-break rule for points on polygon boundaries.
    #[cfg_attr(feature = "serde", serde(alias = "boundary_tie_rule"))]
    pub boundary_rule: BoundaryRule,

    /// Distance (CRS units) within which a point counts as on a boundary.
    pub boundary_tolerance: f64,

    /// Use a uniform grid over polygon bounds to prune candidates.
    ///
    /// Never changes the result, only the number of containment tests.
    pub use_index: bool,

    /// Evaluate points in parallel with rayon. Output order is preserved.
    pub parallel: bool,
}

impl Default for JoinParams {
    fn default() -> Self {
        Self {
            boundary_rule: BoundaryRule::FirstInOrder,
            boundary_tolerance: 1e-9,
            use_index: true,
            parallel: false,
        }
    }
}

impl JoinParams {
    /// Set the boundary rule.
    #[must_use]
    pub const fn with_boundary_rule(mut self, rule: BoundaryRule) -> Self {
        self.boundary_rule = rule;
        self
    }

    /// Set the boundary tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.boundary_tolerance = tolerance;
        self
    }

    /// Enable or disable the grid index.
    #[must_use]
    pub const fn with_index(mut self, enable: bool) -> Self {
        self.use_index = enable;
        self
    }

    /// Enable or disable parallel evaluation.
    #[must_use]
    pub const fn with_parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::InvalidParams`] if the tolerance is negative or
    /// not finite.
    pub fn validate(&self) -> JoinResult<()> {
        if !self.boundary_tolerance.is_finite() || self.boundary_tolerance < 0.0 {
            return Err(JoinError::invalid_params(format!(
                "boundary_tolerance must be finite and >= 0, got {}",
                self.boundary_tolerance
            )));
        }
        Ok(())
    }
}
