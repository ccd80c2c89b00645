//! Sorted view of the values being classified.

// Counts are converted to f64 for weighted means
#![allow(clippy::cast_precision_loss)]

use crate::error::{ClassifyError, ClassifyResult};

/// Sorted values plus their distinct values and multiplicities.
#[derive(Debug, Clone)]
pub(crate) struct Distribution {
    sorted: Vec<f64>,
    distinct: Vec<f64>,
    weights: Vec<usize>,
}

impl Distribution {
    /// Sort and tally the values.
    #[allow(clippy::float_cmp)]
    pub(crate) fn new(values: &[f64]) -> ClassifyResult<Self> {
        if values.is_empty() {
            return Err(ClassifyError::EmptyInput);
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ClassifyError::NonFiniteValue { index, value });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut distinct: Vec<f64> = Vec::new();
        let mut weights: Vec<usize> = Vec::new();
        for &v in &sorted {
            match distinct.last() {
                // -0.0 and 0.0 tally together
                Some(&last) if last == v => {
                    if let Some(w) = weights.last_mut() {
                        *w += 1;
                    }
                }
                _ => {
                    distinct.push(v);
                    weights.push(1);
                }
            }
        }

        Ok(Self {
            sorted,
            distinct,
            weights,
        })
    }

    pub(crate) fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    pub(crate) fn distinct(&self) -> &[f64] {
        &self.distinct
    }

    pub(crate) fn weights(&self) -> &[usize] {
        &self.weights
    }

    pub(crate) fn len(&self) -> usize {
        self.sorted.len()
    }

    pub(crate) fn distinct_count(&self) -> usize {
        self.distinct.len()
    }

    pub(crate) fn min(&self) -> f64 {
        self.distinct[0]
    }

    pub(crate) fn max(&self) -> f64 {
        self.distinct[self.distinct.len() - 1]
    }
}

/// A cut strictly above `a` and at most `b`, halfway where representable.
///
/// Halving each operand first avoids overflow for values near `f64::MAX`.
pub(crate) fn midpoint(a: f64, b: f64) -> f64 {
    let m = a / 2.0 + b / 2.0;
    if m > a { m } else { b }
}

/// Smallest `f64` greater than `x`, for finite `x`.
pub(crate) fn next_up(x: f64) -> f64 {
    if x == 0.0 {
        f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        f64::from_bits(x.to_bits() - 1)
    }
}

/// Raise the top boundary above the last cut when they coincide.
///
/// Cuts come from [`midpoint`], so the last one can only reach the maximum
/// when the two largest distinct values are adjacent floats. The top boundary
/// then moves one representable step above the maximum, which keeps every
/// value in its own class.
pub(crate) fn seal_top(boundaries: &mut [f64]) {
    let n = boundaries.len();
    if n >= 2 && boundaries[n - 2] >= boundaries[n - 1] {
        boundaries[n - 1] = next_up(boundaries[n - 2]);
    }
}

/// Weighted mean of distinct values `lo..hi`.
pub(crate) fn weighted_mean(values: &[f64], weights: &[usize], lo: usize, hi: usize) -> f64 {
    let total: usize = weights[lo..hi].iter().sum();
    let sum: f64 = values[lo..hi]
        .iter()
        .zip(&weights[lo..hi])
        .map(|(v, &w)| v * w as f64)
        .sum();
    sum / total as f64
}

/// Weighted sum of squared deviations of `lo..hi` from their mean.
pub(crate) fn weighted_ssd(values: &[f64], weights: &[usize], lo: usize, hi: usize) -> f64 {
    let mean = weighted_mean(values, weights, lo, hi);
    values[lo..hi]
        .iter()
        .zip(&weights[lo..hi])
        .map(|(v, &w)| w as f64 * (v - mean).powi(2))
        .sum()
}
