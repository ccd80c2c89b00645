//! Natural breaks by one-dimensional k-means.
//!
//! Works on the distinct values weighted by multiplicity. A solution is a list
//! of `k + 1` split ranks `0 = s_0 < s_1 < ... < s_k = d`; class `j` holds
//! distinct values `s_j..s_{j+1}`. Each Lloyd step moves every split to the
//! midpoint between neighbouring class means, then restores contiguity so no
//! class is ever empty.

use tracing::debug;

use crate::distribution::{midpoint, seal_top, weighted_mean, weighted_ssd, Distribution};

/// Result of the iterative search.
#[derive(Debug, Clone)]
pub(crate) struct NaturalBreaks {
    /// `k + 1` boundaries, min and max included.
    pub boundaries: Vec<f64>,
    /// Lloyd steps performed.
    pub iterations: usize,
    /// Whether the splits reached a fixed point within the cap.
    pub converged: bool,
}

/// Minimise within-class variance for `k` classes.
///
/// Requires `2 <= k <= d`. Returns the lowest-cost split seen even when the
/// iteration cap is hit.
pub(crate) fn natural_breaks(dist: &Distribution, k: usize, max_iterations: usize) -> NaturalBreaks {
    let values = dist.distinct();
    let weights = dist.weights();

    let mut splits = seed_splits(dist, k);
    let mut best_cost = within_class_ssd(values, weights, &splits);
    let mut best = splits.clone();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < max_iterations {
        iterations += 1;
        let next = lloyd_step(values, weights, &splits);
        if next == splits {
            converged = true;
            break;
        }
        splits = next;

        let cost = within_class_ssd(values, weights, &splits);
        if cost < best_cost {
            best_cost = cost;
            best.clone_from(&splits);
        }
    }

    debug!(k, iterations, converged, sdcm = best_cost, "Natural breaks search finished");

    NaturalBreaks {
        boundaries: boundaries_from_splits(dist, &best),
        iterations,
        converged,
    }
}

/// Initial splits at the quantile ranks of the full (weighted) distribution.
fn seed_splits(dist: &Distribution, k: usize) -> Vec<usize> {
    let n = dist.len();
    let d = dist.distinct_count();

    // prefix[s] = number of values strictly below distinct value s
    let mut prefix = Vec::with_capacity(d + 1);
    prefix.push(0usize);
    for &w in dist.weights() {
        prefix.push(prefix[prefix.len() - 1] + w);
    }

    let mut splits = Vec::with_capacity(k + 1);
    splits.push(0);
    for i in 1..k {
        splits.push(prefix.partition_point(|&c| c * k < i * n));
    }
    splits.push(d);
    make_contiguous(&mut splits);
    splits
}

/// One Lloyd update: reassign each distinct value to its nearest class mean.
fn lloyd_step(values: &[f64], weights: &[usize], splits: &[usize]) -> Vec<usize> {
    let means: Vec<f64> = splits
        .windows(2)
        .map(|w| weighted_mean(values, weights, w[0], w[1]))
        .collect();

    let mut next = Vec::with_capacity(splits.len());
    next.push(0);
    for pair in means.windows(2) {
        let threshold = midpoint(pair[0], pair[1]);
        // Ties go to the lower class
        next.push(values.partition_point(|&v| v <= threshold));
    }
    next.push(values.len());
    make_contiguous(&mut next);
    next
}

/// Force `0 = s_0 < s_1 < ... < s_k = d`.
fn make_contiguous(splits: &mut [usize]) {
    let k = splits.len() - 1;
    for j in 1..k {
        splits[j] = splits[j].max(splits[j - 1] + 1);
    }
    for j in (1..k).rev() {
        splits[j] = splits[j].min(splits[j + 1] - 1);
    }
}

/// Sum of squared deviations from class means (SDCM).
fn within_class_ssd(values: &[f64], weights: &[usize], splits: &[usize]) -> f64 {
    splits
        .windows(2)
        .map(|w| weighted_ssd(values, weights, w[0], w[1]))
        .sum()
}

fn boundaries_from_splits(dist: &Distribution, splits: &[usize]) -> Vec<f64> {
    let values = dist.distinct();
    let k = splits.len() - 1;

    let mut boundaries = Vec::with_capacity(k + 1);
    boundaries.push(dist.min());
    for &s in &splits[1..k] {
        boundaries.push(midpoint(values[s - 1], values[s]));
    }
    boundaries.push(dist.max());
    seal_top(&mut boundaries);
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_outlier_isolated() {
        let dist = Distribution::new(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        let result = natural_breaks(&dist, 2, 100);
        assert!(result.converged);
        assert_eq!(result.boundaries, vec![1.0, 52.0, 100.0]);
    }

    #[test]
    fn test_three_clusters() {
        let values = [1.0, 1.2, 0.9, 10.0, 10.5, 9.8, 50.0, 51.0, 49.5];
        let dist = Distribution::new(&values).unwrap();
        let result = natural_breaks(&dist, 3, 100);
        assert!(result.converged);
        let b = &result.boundaries;
        assert_eq!(b.len(), 4);
        assert!(b[1] > 1.2 && b[1] < 9.8, "{b:?}");
        assert!(b[2] > 10.5 && b[2] < 49.5, "{b:?}");
    }

    #[test]
    fn test_one_class_per_distinct_value() {
        let dist = Distribution::new(&[1.0, 1.0, 2.0, 3.0, 3.0]).unwrap();
        let result = natural_breaks(&dist, 3, 100);
        assert_eq!(result.boundaries, vec![1.0, 1.5, 2.5, 3.0]);
    }

    #[test]
    fn test_iteration_cap_returns_best() {
        // The seed [0, 3, 5] moves to [0, 4, 5] on the first step
        let dist = Distribution::new(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        let capped = natural_breaks(&dist, 2, 1);
        assert!(!capped.converged);
        assert_eq!(capped.iterations, 1);
        assert_eq!(capped.boundaries, vec![1.0, 52.0, 100.0]);

        let full = natural_breaks(&dist, 2, 1000);
        assert!(full.converged);
        assert_eq!(full.iterations, 2);
    }

    #[test]
    fn test_many_classes_capped() {
        let values: Vec<f64> = (0..40).map(|i| f64::from(i * i)).collect();
        let dist = Distribution::new(&values).unwrap();
        let capped = natural_breaks(&dist, 4, 1);
        assert_eq!(capped.iterations, 1);
        assert_eq!(capped.boundaries.len(), 5);
        assert!(capped.boundaries.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_adjacent_float_clusters() {
        let dist = Distribution::new(&[1e16, 1e16 + 2.0, 1e16 + 4.0]).unwrap();
        let result = natural_breaks(&dist, 3, 100);
        assert_eq!(result.boundaries.len(), 4);
        assert!(result.boundaries.windows(2).all(|w| w[0] < w[1]), "{:?}", result.boundaries);
    }

    #[test]
    fn test_make_contiguous() {
        let mut splits = vec![0, 0, 0, 5, 5];
        make_contiguous(&mut splits);
        assert_eq!(splits, vec![0, 1, 2, 4, 5]);

        let mut splits = vec![0, 4, 4, 4, 4];
        make_contiguous(&mut splits);
        assert_eq!(splits, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_seed_is_quantile_split() {
        let dist = Distribution::new(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(seed_splits(&dist, 2), vec![0, 3, 5]);
    }

    #[test]
    fn test_sdcm_decreases_from_seed() {
        let dist = Distribution::new(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        let seed = seed_splits(&dist, 2);
        let step = lloyd_step(dist.distinct(), dist.weights(), &seed);
        let before = within_class_ssd(dist.distinct(), dist.weights(), &seed);
        let after = within_class_ssd(dist.distinct(), dist.weights(), &step);
        assert!(after < before);
        assert_relative_eq!(after, 5.0, epsilon = 1e-12);
    }
}
