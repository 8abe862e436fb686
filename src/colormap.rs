use crate::error::HicError;
use plotters::style::RGBColor;
use std::sync::LazyLock;

/// Number of entries in the interpolated lookup table
pub const LUT_SIZE: usize = 256;

/// Paper-style Hi-C control points on a [0, 16] log2 O/E scale
const PAPER_COLORS: [(f64, &str); 23] = [
    // near zero: white fading into pale blue
    (0.0 / 16.0, "#ffffff"),
    (0.15 / 16.0, "#f5f9fd"),
    (0.3 / 16.0, "#e6f0fa"),
    // low: already clearly blue
    (0.6 / 16.0, "#d6e6f5"),
    (1.0 / 16.0, "#c6dbef"),
    (1.5 / 16.0, "#9ecae1"),
    (2.0 / 16.0, "#4292c6"),
    (3.0 / 16.0, "#2171b5"),
    (4.0 / 16.0, "#084594"),
    (5.0 / 16.0, "#08306b"),
    (6.0 / 16.0, "#5a1f0e"),
    (7.0 / 16.0, "#7f2704"),
    (8.0 / 16.0, "#a63603"),
    (9.0 / 16.0, "#c44e03"),
    (10.0 / 16.0, "#dd6b20"),
    (11.0 / 16.0, "#e88d4a"),
    (12.0 / 16.0, "#f0b784"),
    (13.0 / 16.0, "#f6d2ad"),
    (13.5 / 16.0, "#fae6cf"),
    (14.0 / 16.0, "#ffffff"),
    (14.5 / 16.0, "#d9d9d9"),
    (15.0 / 16.0, "#9e9ac8"),
    (16.0 / 16.0, "#253494"),
];

static PAPER_HIC: LazyLock<Colormap> = LazyLock::new(|| {
    Colormap::from_hex_stops(&PAPER_COLORS)
        .unwrap_or_else(|e| panic!("built-in colormap is malformed: {}", e))
});

/// The process-wide paper colormap, built on first use
pub fn paper_hic() -> &'static Colormap {
    &PAPER_HIC
}

/// Linear value normalization onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Default for Normalize {
    fn default() -> Self {
        Self {
            vmin: 0.0,
            vmax: 16.0,
        }
    }
}

impl Normalize {
    /// Map a value to [0, 1], clipping out-of-range values. NaN stays NaN.
    pub fn apply(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }
}

/// A continuous colormap sampled into a fixed lookup table
#[derive(Debug, Clone)]
pub struct Colormap {
    lut: Vec<RGBColor>,
}

impl Colormap {
    /// Build a lookup table from `(position, colour)` stops.
    ///
    /// Positions must be ascending and span [0, 1]. Each channel is linearly
    /// interpolated between neighbouring stops; entry `k` samples `k / 255`.
    pub fn from_stops(stops: &[(f64, RGBColor)]) -> Self {
        let mut lut = Vec::with_capacity(LUT_SIZE);
        for k in 0..LUT_SIZE {
            let x = k as f64 / (LUT_SIZE - 1) as f64;
            lut.push(sample_stops(stops, x));
        }
        Self { lut }
    }

    pub fn from_hex_stops(stops: &[(f64, &str)]) -> Result<Self, HicError> {
        let parsed = stops
            .iter()
            .map(|&(pos, hex)| parse_hex_color(hex).map(|c| (pos, c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_stops(&parsed))
    }

    pub fn lut(&self) -> &[RGBColor] {
        &self.lut
    }

    /// Colour for an already-normalized value in [0, 1]; `None` for NaN
    pub fn color_at(&self, x: f64) -> Option<RGBColor> {
        if x.is_nan() {
            return None;
        }
        let idx = (x.clamp(0.0, 1.0) * LUT_SIZE as f64) as usize;
        Some(self.lut[idx.min(LUT_SIZE - 1)])
    }

    /// Normalize then look up; out-of-range values saturate to the endpoints
    pub fn map(&self, value: f64, norm: &Normalize) -> Option<RGBColor> {
        self.color_at(norm.apply(value))
    }
}

fn sample_stops(stops: &[(f64, RGBColor)], x: f64) -> RGBColor {
    let first = stops[0];
    if x <= first.0 {
        return first.1;
    }
    for pair in stops.windows(2) {
        let (x0, c0) = pair[0];
        let (x1, c1) = pair[1];
        if x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 1.0 };
            return RGBColor(
                lerp_channel(c0.0, c1.0, t),
                lerp_channel(c0.1, c1.1, t),
                lerp_channel(c0.2, c1.2, t),
            );
        }
    }
    stops[stops.len() - 1].1
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

/// Parse a `#rrggbb` literal
pub fn parse_hex_color(hex: &str) -> Result<RGBColor, HicError> {
    let digits = hex
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.is_ascii())
        .ok_or_else(|| HicError::InvalidColor(hex.to_string()))?;
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| HicError::InvalidColor(hex.to_string()))
    };
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}
