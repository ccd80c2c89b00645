//! Validated class boundaries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, ClassifyResult};

/// A strictly increasing sequence of `k + 1` class boundaries.
///
/// The first and last boundaries are the data minimum and maximum. Class `i`
/// covers `[b_i, b_{i+1})`; the last class is closed on the right so the
/// maximum falls in it.
///
/// # Example
///
/// ```
/// use density_classify::Breaks;
///
/// let breaks = Breaks::new(vec![0.0, 10.0, 20.0]).unwrap();
/// assert_eq!(breaks.class_count(), 2);
/// assert_eq!(breaks.bin_index(0.0), Some(0));
/// assert_eq!(breaks.bin_index(10.0), Some(1));
/// assert_eq!(breaks.bin_index(20.0), Some(1));
/// assert_eq!(breaks.bin_index(20.5), None);
///
/// assert!(Breaks::new(vec![0.0, 5.0, 5.0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<f64>", into = "Vec<f64>"))]
pub struct Breaks {
    boundaries: Vec<f64>,
}

impl Breaks {
    /// Validate and wrap a boundary sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidBreaks`] if there are fewer than two
    /// boundaries, any is non-finite, or the sequence is not strictly
    /// increasing.
    pub fn new(boundaries: Vec<f64>) -> ClassifyResult<Self> {
        if boundaries.len() < 2 {
            return Err(ClassifyError::invalid_breaks(format!(
                "need at least 2 boundaries, got {}",
                boundaries.len()
            )));
        }
        if let Some(b) = boundaries.iter().find(|b| !b.is_finite()) {
            return Err(ClassifyError::invalid_breaks(format!("non-finite boundary {b}")));
        }
        if let Some(w) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ClassifyError::invalid_breaks(format!(
                "boundaries not strictly increasing at {} >= {}",
                w[0], w[1]
            )));
        }
        Ok(Self { boundaries })
    }

    /// All boundaries, minimum and maximum included.
    #[must_use]
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Interior cut points (boundaries without min and max).
    #[must_use]
    pub fn interior(&self) -> &[f64] {
        &self.boundaries[1..self.boundaries.len() - 1]
    }

    /// Number of classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Lowest boundary.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.boundaries[0]
    }

    /// Highest boundary.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Class of a value, or `None` if it lies outside `[min, max]` or is NaN.
    #[must_use]
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !(self.min()..=self.max()).contains(&value) {
            return None;
        }
        let above = self.boundaries[1..].partition_point(|&b| b <= value);
        Some(above.min(self.class_count() - 1))
    }

    /// Number of values falling in each class. Values outside the domain are skipped.
    #[must_use]
    pub fn bin_counts(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.class_count()];
        for bin in values.iter().filter_map(|&v| self.bin_index(v)) {
            counts[bin] += 1;
        }
        counts
    }
}

impl TryFrom<Vec<f64>> for Breaks {
    type Error = ClassifyError;

    fn try_from(boundaries: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(boundaries)
    }
}

impl From<Breaks> for Vec<f64> {
    fn from(breaks: Breaks) -> Self {
        breaks.boundaries
    }
}
