//! Classification of numeric distributions into choropleth bins.
//!
//! Three closed algorithms ([`ClassifierKind`]):
//!
//! - **Equal interval** - `k` bins of equal width over `[min, max]`
//! - **Quantile** - Boundaries at the `1/k, 2/k, ...` empirical quantiles
//! - **Natural breaks** - Variance-minimising boundaries (1-D k-means seeded
//!   from the quantile split, capped iterations)
//!
//! Output is always a [`Breaks`]: `k + 1` strictly increasing boundaries with
//! the data minimum and maximum at the ends. Class `i` is `[b_i, b_{i+1})`,
//! the last class closed.
//!
//! # Example
//!
//! ```
//! use density_classify::{classify, ClassifyParams, ClassifierKind};
//!
//! let densities = [0.0, 0.4, 0.5, 3.1, 3.3, 9.0];
//! let result = classify(&densities, &ClassifyParams::new(ClassifierKind::NaturalBreaks, 3)).unwrap();
//!
//! assert_eq!(result.class_count(), 3);
//! assert_eq!(result.breaks.bin_index(9.0), Some(2));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod breaks;
mod classify;
mod distribution;
mod equal_interval;
mod error;
mod natural;
mod params;
mod quantile;

pub use breaks::Breaks;
pub use classify::{classify, goodness_of_variance_fit, Classification, ClassifyWarning};
pub use error::{ClassifyError, ClassifyResult};
pub use params::{ClassifierKind, ClassifyParams, DegeneratePolicy};
