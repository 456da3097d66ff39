//! Colour scales
//!
//! A diverging red-blue scale for signed values such as correlations, and
//! a fixed ordinal palette for categorical series.

use std::fmt;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }

    /// Relative luminance approximation, 0 (black) to 1 (white)
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.0 as f64 + 0.7152 * self.1 as f64 + 0.0722 * self.2 as f64) / 255.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// ColorBrewer RdBu, strong red through neutral to strong blue
const RD_BU: [Rgb; 11] = [
    Rgb(0x67, 0x00, 0x1f),
    Rgb(0xb2, 0x18, 0x2b),
    Rgb(0xd6, 0x60, 0x4d),
    Rgb(0xf4, 0xa5, 0x82),
    Rgb(0xfd, 0xdb, 0xc7),
    Rgb(0xf7, 0xf7, 0xf7),
    Rgb(0xd1, 0xe5, 0xf0),
    Rgb(0x92, 0xc5, 0xde),
    Rgb(0x43, 0x93, 0xc3),
    Rgb(0x21, 0x66, 0xac),
    Rgb(0x05, 0x30, 0x61),
];

/// Diverging scale over a symmetric domain, neutral at the midpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergingScale {
    min: f64,
    max: f64,
}

impl Default for DivergingScale {
    /// Correlation domain `[-1, 1]`
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

impl DivergingScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Colour for `value`; out-of-domain values clamp to the ends
    pub fn color(&self, value: f64) -> Rgb {
        if !value.is_finite() || self.max <= self.min {
            return RD_BU[RD_BU.len() / 2];
        }

        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let scaled = t * (RD_BU.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(RD_BU.len() - 2);
        RD_BU[i].lerp(RD_BU[i + 1], scaled - i as f64)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Grade palette, green (A) through red (G)
pub const GRADE_PALETTE: [&str; 7] = [
    "#198754", "#20c997", "#0dcaf0", "#0d6efd", "#ffc107", "#fd7e14", "#dc3545",
];

/// Assigns palette colours to categories in domain order, cycling when
/// there are more categories than colours
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    domain: Vec<String>,
    palette: Vec<String>,
}

impl OrdinalScale {
    pub fn new(domain: Vec<String>, palette: &[&str]) -> Self {
        Self {
            domain,
            palette: palette.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn color(&self, category: &str) -> Option<&str> {
        if self.palette.is_empty() {
            return None;
        }
        let index = self.domain.iter().position(|d| d == category)?;
        Some(self.palette[index % self.palette.len()].as_str())
    }

    /// Colour of the first category, used for legend swatches
    pub fn first(&self) -> Option<&str> {
        self.palette.first().map(String::as_str)
    }
}
