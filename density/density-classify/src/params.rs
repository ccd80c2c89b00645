//! Classifier selection and parameters.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, ClassifyResult};

/// Classification algorithm.
///
/// # Example
///
/// ```
/// use density_classify::ClassifierKind;
///
/// assert_eq!(ClassifierKind::default(), ClassifierKind::NaturalBreaks);
/// assert_eq!("quantile".parse::<ClassifierKind>().unwrap(), ClassifierKind::Quantile);
/// assert!("jenks-ish".parse::<ClassifierKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ClassifierKind {
    /// `k` bins of equal width over `[min, max]`.
    EqualInterval,
    /// Boundaries at the `1/k, 2/k, ...` empirical quantiles.
    Quantile,
    /// Boundaries minimising within-class variance (1-D k-means).
    #[default]
    NaturalBreaks,
}

impl ClassifierKind {
    /// Every algorithm, in declaration order.
    pub const ALL: [Self; 3] = [Self::EqualInterval, Self::Quantile, Self::NaturalBreaks];

    /// Kebab-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EqualInterval => "equal-interval",
            Self::Quantile => "quantile",
            Self::NaturalBreaks => "natural-breaks",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClassifierKind {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ClassifyError::UnknownClassifier(s.to_string()))
    }
}

/// What to do when the data has fewer distinct values than requested classes.
///
/// Fewer than two distinct values is always an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DegeneratePolicy {
    /// Use one class per distinct value and report `ClassesCollapsed`.
    #[default]
    Collapse,
    /// Fail with `InsufficientDistinctValues`.
    Strict,
}

impl DegeneratePolicy {
    /// Kebab-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collapse => "collapse",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DegeneratePolicy {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collapse" => Ok(Self::Collapse),
            "strict" => Ok(Self::Strict),
            _ => Err(ClassifyError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Parameters for [`classify`](crate::classify).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassifyParams {
    /// Algorithm to use.
    #[cfg_attr(feature = "serde", serde(alias = "classifier_kind"))]
    pub kind: ClassifierKind,

    /// Requested number of classes (at least 2).
    pub class_count: usize,

    /// Handling of data with fewer distinct values than classes.
    pub degenerate_policy: DegeneratePolicy,

    /// Iteration cap for natural breaks.
    pub max_iterations: usize,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::NaturalBreaks,
            class_count: 5,
            degenerate_policy: DegeneratePolicy::Collapse,
            max_iterations: 100,
        }
    }
}

impl ClassifyParams {
    /// Parameters for the given algorithm and class count, other fields default.
    #[must_use]
    pub fn new(kind: ClassifierKind, class_count: usize) -> Self {
        Self {
            kind,
            class_count,
            ..Self::default()
        }
    }

    /// Set the algorithm.
    #[must_use]
    pub const fn with_kind(mut self, kind: ClassifierKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the class count.
    #[must_use]
    pub const fn with_class_count(mut self, class_count: usize) -> Self {
        self.class_count = class_count;
        self
    }

    /// Set the degenerate-input policy.
    #[must_use]
    pub const fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Set the natural-breaks iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidClassCount`] for fewer than two classes
    /// or [`ClassifyError::InvalidParams`] for a zero iteration cap.
    pub fn validate(&self) -> ClassifyResult<()> {
        if self.class_count < 2 {
            return Err(ClassifyError::InvalidClassCount(self.class_count));
        }
        if self.max_iterations == 0 {
            return Err(ClassifyError::invalid_params("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ClassifyParams::default();
        assert_eq!(params.kind, ClassifierKind::NaturalBreaks);
        assert_eq!(params.class_count, 5);
        assert_eq!(params.degenerate_policy, DegeneratePolicy::Collapse);
        assert_eq!(params.max_iterations, 100);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            ClassifyParams::default().with_class_count(1).validate(),
            Err(ClassifyError::InvalidClassCount(1))
        ));
        assert!(ClassifyParams::default().with_max_iterations(0).validate().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for kind in ClassifierKind::ALL {
            assert_eq!(kind.to_string().parse::<ClassifierKind>().unwrap(), kind);
        }
        for policy in [DegeneratePolicy::Collapse, DegeneratePolicy::Strict] {
            assert_eq!(policy.to_string().parse::<DegeneratePolicy>().unwrap(), policy);
        }
        assert!(matches!(
            "median".parse::<ClassifierKind>(),
            Err(ClassifyError::UnknownClassifier(name)) if name == "median"
        ));
    }
}
