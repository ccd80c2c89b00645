//! Empirical-quantile breaks.

use crate::distribution::{midpoint, seal_top, Distribution};

/// Boundaries at the inverted-CDF quantiles `i / k`.
///
/// Cut `i` is the smallest value `x` with `F(x) >= i / k`, found by integer
/// arithmetic on ranks, so duplicating every value leaves the cuts unchanged.
/// When ties make two cuts coincide (or a cut lands on `min` or `max`), all
/// cuts fall back to [`distinct_midpoints`].
pub(crate) fn quantile(dist: &Distribution, k: usize) -> Vec<f64> {
    let sorted = dist.sorted();
    let n = dist.len();

    let mut boundaries = Vec::with_capacity(k + 1);
    boundaries.push(dist.min());
    for i in 1..k {
        boundaries.push(sorted[(i * n).div_ceil(k) - 1]);
    }
    boundaries.push(dist.max());

    if boundaries.windows(2).all(|w| w[0] < w[1]) {
        boundaries
    } else {
        distinct_midpoints(dist, k)
    }
}

/// Cuts halfway between distinct values at ranks `floor(i * d / k)`.
///
/// Requires `d >= k`, which guarantees strictly increasing ranks in `1..d`.
/// A cut with no representable midpoint falls on the upper value; see
/// [`seal_top`] for the last one.
pub(crate) fn distinct_midpoints(dist: &Distribution, k: usize) -> Vec<f64> {
    let u = dist.distinct();
    let d = u.len();

    let mut boundaries = Vec::with_capacity(k + 1);
    boundaries.push(dist.min());
    for i in 1..k {
        let idx = i * d / k;
        boundaries.push(midpoint(u[idx - 1], u[idx]));
    }
    boundaries.push(dist.max());
    seal_top(&mut boundaries);
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_split() {
        let dist = Distribution::new(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(quantile(&dist, 2), vec![1.0, 3.0, 100.0]);
    }

    #[test]
    fn test_quartiles() {
        let values: Vec<f64> = (1..=8).map(f64::from).collect();
        let dist = Distribution::new(&values).unwrap();
        assert_eq!(quantile(&dist, 4), vec![1.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_duplication_invariant() {
        let values = [5.0, 1.0, 9.0, 2.0, 7.0, 3.0];
        let doubled: Vec<f64> = values.iter().chain(values.iter()).copied().collect();
        let a = quantile(&Distribution::new(&values).unwrap(), 3);
        let b = quantile(&Distribution::new(&doubled).unwrap(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ties_fall_back_to_midpoints() {
        // Cut 1 of 2 lands on the minimum
        let dist = Distribution::new(&[1.0, 1.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(quantile(&dist, 2), vec![1.0, 1.5, 3.0]);

        let dist = Distribution::new(&[1.0, 2.0]).unwrap();
        assert_eq!(quantile(&dist, 2), vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_adjacent_floats_keep_every_class() {
        // No float lies strictly between neighbouring values at this magnitude
        let dist = Distribution::new(&[1e16, 1e16 + 2.0, 1e16 + 4.0]).unwrap();
        let b = distinct_midpoints(&dist, 3);
        assert_eq!(b.len(), 4);
        assert!(b.windows(2).all(|w| w[0] < w[1]), "{b:?}");
        assert_eq!(b[0], 1e16);
    }

    #[test]
    fn test_midpoints_one_per_distinct() {
        let dist = Distribution::new(&[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(distinct_midpoints(&dist, 3), vec![1.0, 1.5, 3.0, 4.0]);
    }
}
