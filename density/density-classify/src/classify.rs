//! Classification entry point.

use std::fmt;

use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::breaks::Breaks;
use crate::distribution::Distribution;
use crate::equal_interval::equal_interval;
use crate::error::{ClassifyError, ClassifyResult};
use crate::natural::natural_breaks;
use crate::params::{ClassifierKind, ClassifyParams, DegeneratePolicy};
use crate::quantile::quantile;

/// A recovered condition raised during classification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClassifyWarning {
    /// Fewer distinct values than requested classes; one class per value was used.
    ClassesCollapsed {
        /// Class count asked for.
        requested: usize,
        /// Class count produced.
        used: usize,
    },
    /// Natural breaks hit the iteration cap; the best solution seen was returned.
    UnboundedIteration {
        /// Iterations performed.
        iterations: usize,
    },
}

impl fmt::Display for ClassifyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassesCollapsed { requested, used } => {
                write!(f, "{requested} classes requested, collapsed to {used} distinct values")
            }
            Self::UnboundedIteration { iterations } => {
                write!(f, "natural breaks did not converge in {iterations} iterations; using best solution")
            }
        }
    }
}

/// Breaks plus how they were obtained.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Classification {
    /// Validated boundaries.
    pub breaks: Breaks,
    /// Algorithm used.
    pub kind: ClassifierKind,
    /// Class count asked for (may exceed `breaks.class_count()` after collapse).
    pub requested_classes: usize,
    /// Goodness of variance fit in `[0, 1]`; 1 means no within-class variance.
    pub goodness_of_variance_fit: f64,
    /// Recovered conditions.
    pub warnings: Vec<ClassifyWarning>,
}

impl Classification {
    /// Number of classes produced.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.breaks.class_count()
    }

    /// Returns `true` if fewer classes than requested were produced.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.class_count() < self.requested_classes
    }
}

/// Compute class breaks for a sequence of values.
///
/// Input order does not matter. With fewer distinct values than
/// `params.class_count`, [`DegeneratePolicy::Collapse`] produces one class per
/// distinct value and [`DegeneratePolicy::Strict`] fails.
///
/// # Errors
///
/// - [`ClassifyError::InvalidClassCount`] / [`ClassifyError::InvalidParams`] for bad params
/// - [`ClassifyError::EmptyInput`] / [`ClassifyError::NonFiniteValue`] for bad values
/// - [`ClassifyError::InsufficientDistinctValues`] with fewer than two distinct
///   values, or fewer than requested under the strict policy
///
/// # Example
///
/// ```
/// use density_classify::{classify, ClassifierKind, ClassifyParams};
///
/// let values = [1.0, 2.0, 3.0, 4.0, 100.0];
///
/// let equal = classify(&values, &ClassifyParams::new(ClassifierKind::EqualInterval, 2)).unwrap();
/// assert_eq!(equal.breaks.boundaries(), &[1.0, 50.5, 100.0]);
///
/// let quantile = classify(&values, &ClassifyParams::new(ClassifierKind::Quantile, 2)).unwrap();
/// assert_eq!(quantile.breaks.boundaries(), &[1.0, 3.0, 100.0]);
///
/// let natural = classify(&values, &ClassifyParams::new(ClassifierKind::NaturalBreaks, 2)).unwrap();
/// assert_eq!(natural.breaks.bin_index(100.0), Some(1));
/// assert_eq!(natural.breaks.bin_index(4.0), Some(0));
/// ```
pub fn classify(values: &[f64], params: &ClassifyParams) -> ClassifyResult<Classification> {
    params.validate()?;
    let dist = Distribution::new(values)?;

    let requested = params.class_count;
    let distinct = dist.distinct_count();
    let mut warnings = Vec::new();

    if distinct < 2 || (distinct < requested && params.degenerate_policy == DegeneratePolicy::Strict) {
        return Err(ClassifyError::InsufficientDistinctValues { requested, distinct });
    }

    let k = if distinct < requested {
        warn!(requested, distinct, "Too few distinct values, collapsing classes");
        warnings.push(ClassifyWarning::ClassesCollapsed {
            requested,
            used: distinct,
        });
        distinct
    } else {
        requested
    };

    debug!(kind = %params.kind, k, values = dist.len(), distinct, "Classifying");

    let boundaries = match params.kind {
        ClassifierKind::EqualInterval => equal_interval(&dist, k),
        ClassifierKind::Quantile => quantile(&dist, k),
        ClassifierKind::NaturalBreaks => {
            let result = natural_breaks(&dist, k, params.max_iterations);
            if !result.converged {
                warn!(
                    iterations = result.iterations,
                    "Natural breaks hit the iteration cap, returning best solution"
                );
                warnings.push(ClassifyWarning::UnboundedIteration {
                    iterations: result.iterations,
                });
            }
            result.boundaries
        }
    };

    let breaks = Breaks::new(boundaries)?;
    let gvf = goodness_of_variance_fit(dist.sorted(), &breaks);

    info!(
        kind = %params.kind,
        classes = breaks.class_count(),
        requested,
        gvf,
        "Classification complete"
    );

    Ok(Classification {
        breaks,
        kind: params.kind,
        requested_classes: requested,
        goodness_of_variance_fit: gvf,
        warnings,
    })
}

/// Goodness of variance fit: `1 - SDCM / SDAM`.
///
/// SDAM is the squared deviation of all values from the overall mean and SDCM
/// the squared deviation of each value from its class mean. Values outside the
/// breaks are ignored. Returns 1 when the values have no variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn goodness_of_variance_fit(values: &[f64], breaks: &Breaks) -> f64 {
    let k = breaks.class_count();
    let mut sums = vec![0.0; k];
    let mut counts = vec![0usize; k];
    let binned: Vec<(usize, f64)> = values
        .iter()
        .filter_map(|&v| breaks.bin_index(v).map(|b| (b, v)))
        .collect();
    if binned.is_empty() {
        return 1.0;
    }
    for &(b, v) in &binned {
        sums[b] += v;
        counts[b] += 1;
    }

    let mean = sums.iter().sum::<f64>() / binned.len() as f64;
    let sdam: f64 = binned.iter().map(|&(_, v)| (v - mean).powi(2)).sum();
    if sdam <= 0.0 {
        return 1.0;
    }
    let sdcm: f64 = binned
        .iter()
        .map(|&(b, v)| (v - sums[b] / counts[b] as f64).powi(2))
        .sum();
    1.0 - sdcm / sdam
}
