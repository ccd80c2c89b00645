//! Colour palettes and choropleth styling.

// Channel interpolation works in f64 and rounds back to u8
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LayerError, LayerResult};

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a colour from channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a colour from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Linear blend towards `other` by `t` in `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| f64::from(a).mul_add(1.0 - t, f64::from(b) * t).round().clamp(0.0, 255.0) as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Sequential colour ramp.
///
/// Each ramp is defined by nine ColorBrewer anchors and interpolated to any
/// class count.
///
/// # Example
///
/// ```
/// use density_layer::Palette;
///
/// let colors = Palette::YlOrRd.colors(3);
/// assert_eq!(colors[0].to_string(), "#ffffcc");
/// assert_eq!(colors[2].to_string(), "#800026");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Palette {
    /// Yellow through orange to red.
    #[default]
    YlOrRd,
    /// Light to dark blue.
    Blues,
    /// Light to dark green.
    Greens,
    /// Light to dark purple.
    Purples,
}

const YL_OR_RD: [u32; 9] = [
    0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026, 0x800026,
];
const BLUES: [u32; 9] = [
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];
const GREENS: [u32; 9] = [
    0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b,
];
const PURPLES: [u32; 9] = [
    0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f, 0x3f007d,
];

impl Palette {
    /// Every palette, in declaration order.
    pub const ALL: [Self; 4] = [Self::YlOrRd, Self::Blues, Self::Greens, Self::Purples];

    /// Kebab-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::YlOrRd => "yl-or-rd",
            Self::Blues => "blues",
            Self::Greens => "greens",
            Self::Purples => "purples",
        }
    }

    const fn anchors(self) -> &'static [u32; 9] {
        match self {
            Self::YlOrRd => &YL_OR_RD,
            Self::Blues => &BLUES,
            Self::Greens => &GREENS,
            Self::Purples => &PURPLES,
        }
    }

    /// Colour at position `t` in `[0, 1]` along the ramp.
    #[must_use]
    pub fn sample(self, t: f64) -> Rgb {
        let anchors = self.anchors();
        let pos = t.clamp(0.0, 1.0) * (anchors.len() - 1) as f64;
        let lo = (pos.floor() as usize).min(anchors.len() - 2);
        Rgb::from_hex(anchors[lo]).lerp(Rgb::from_hex(anchors[lo + 1]), pos - lo as f64)
    }

    /// `count` colours evenly spaced from the light end to the dark end.
    #[must_use]
    pub fn colors(self, count: usize) -> Vec<Rgb> {
        match count {
            0 => Vec::new(),
            1 => vec![self.sample(1.0)],
            _ => (0..count)
                .map(|i| self.sample(i as f64 / (count - 1) as f64))
                .collect(),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| LayerError::invalid_style(format!("unknown palette '{s}'")))
    }
}

/// Presentation settings for the choropleth layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChoroplethStyle {
    /// Colour ramp for classes.
    pub palette: Palette,
    /// Polygon fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
    /// Polygon outline opacity in `[0, 1]`.
    pub line_opacity: f64,
    /// Legend caption.
    pub legend_name: String,
    /// Fill for polygons without a class (degenerate geometry).
    pub no_data_color: Rgb,
}

impl Default for ChoroplethStyle {
    fn default() -> Self {
        Self {
            palette: Palette::YlOrRd,
            fill_opacity: 0.7,
            line_opacity: 0.2,
            legend_name: "Density".to_string(),
            no_data_color: Rgb::new(0xcc, 0xcc, 0xcc),
        }
    }
}

impl ChoroplethStyle {
    /// Set the palette.
    #[must_use]
    pub const fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the fill and line opacities.
    #[must_use]
    pub const fn with_opacity(mut self, fill: f64, line: f64) -> Self {
        self.fill_opacity = fill;
        self.line_opacity = line;
        self
    }

    /// Set the legend caption.
    #[must_use]
    pub fn with_legend_name(mut self, name: impl Into<String>) -> Self {
        self.legend_name = name.into();
        self
    }

    /// Check opacity ranges.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidStyle`] if an opacity is outside `[0, 1]`.
    pub fn validate(&self) -> LayerResult<()> {
        for (name, value) in [("fill_opacity", self.fill_opacity), ("line_opacity", self.line_opacity)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LayerError::invalid_style(format!("{name} must be in [0, 1], got {value}")));
            }
        }
        Ok(())
    }
}
