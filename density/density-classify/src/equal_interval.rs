//! Equal-width bins.

use crate::distribution::Distribution;
use crate::quantile::distinct_midpoints;

/// `k + 1` boundaries spaced `(max - min) / k` apart; the last is exactly `max`.
///
/// The step is `max / k - min / k` so the full `f64` range cannot overflow.
/// If rounding makes two boundaries coincide (values packed closely relative
/// to their magnitude) the cuts fall back to [`distinct_midpoints`].
/// Requires `d >= k`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn equal_interval(dist: &Distribution, k: usize) -> Vec<f64> {
    let (min, max) = (dist.min(), dist.max());
    let step = max / k as f64 - min / k as f64;
    let boundaries: Vec<f64> = (0..k)
        .map(|i| min + step * i as f64)
        .chain(std::iter::once(max))
        .collect();

    if boundaries.windows(2).all(|w| w[0] < w[1]) {
        boundaries
    } else {
        distinct_midpoints(dist, k)
    }
}
