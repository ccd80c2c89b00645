//! Class legend.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use density_classify::Breaks;

use crate::style::Rgb;

/// One legend row: a class interval and its colour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegendEntry {
    /// Class index.
    pub bin_index: usize,
    /// Inclusive lower bound.
    pub lower: f64,
    /// Upper bound (exclusive except for the last class).
    pub upper: f64,
    /// Fill colour.
    pub color: Rgb,
    /// Number of features in the class.
    pub count: usize,
    /// Human-readable interval.
    pub label: String,
}

/// Legend for a classified layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Legend {
    /// Caption.
    pub title: String,
    /// One entry per class, lowest first.
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Build a legend from breaks, class colours and per-class feature counts.
    ///
    /// `colors` and `counts` are indexed by class; missing counts read as 0.
    #[must_use]
    pub fn new(title: impl Into<String>, breaks: &Breaks, colors: &[Rgb], counts: &[usize]) -> Self {
        let b = breaks.boundaries();
        let entries = b
            .windows(2)
            .zip(colors)
            .enumerate()
            .map(|(i, (w, &color))| LegendEntry {
                bin_index: i,
                lower: w[0],
                upper: w[1],
                color,
                count: counts.get(i).copied().unwrap_or(0),
                label: format_interval(w[0], w[1]),
            })
            .collect();
        Self {
            title: title.into(),
            entries,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn format_interval(lower: f64, upper: f64) -> String {
    // More decimals for small magnitudes so neighbouring labels stay distinct
    let decimals = if (upper - lower).abs() >= 0.1 { 2 } else { 4 };
    format!("{lower:.decimals$} - {upper:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_entries() {
        let breaks = Breaks::new(vec![0.0, 1.5, 40.0]).unwrap();
        let colors = [Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)];
        let legend = Legend::new("Calls per km²", &breaks, &colors, &[3]);

        assert_eq!(legend.len(), 2);
        assert_eq!(legend.title, "Calls per km²");
        assert_eq!(legend.entries[0].label, "0.00 - 1.50");
        assert_eq!(legend.entries[1].label, "1.50 - 40.00");
        assert_eq!(legend.entries[0].count, 3);
        assert_eq!(legend.entries[1].count, 0);
        assert_eq!(legend.entries[1].color, Rgb::new(2, 2, 2));
    }

    #[test]
    fn test_small_spans() {
        assert_eq!(format_interval(0.001, 0.0015), "0.0010 - 0.0015");
    }
}
