//! Named continuous color ramps.
//!
//! Each ramp is an ordered table of RGB stops spaced evenly over `[0,1]`;
//! sampling interpolates linearly between the two surrounding stops and
//! clamps out-of-range inputs to the endpoints.

use plotters::style::RGBColor;

/// Anchor colors of the viridis ramp, dark purple to yellow.
const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (72, 40, 120),
    (62, 73, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (110, 206, 88),
    (181, 222, 43),
    (253, 231, 37),
];

/// Anchor colors of the sequential reds ramp, near-white to dark red.
const REDS: &[(u8, u8, u8)] = &[
    (255, 245, 240),
    (254, 224, 210),
    (252, 187, 161),
    (252, 146, 114),
    (251, 106, 74),
    (239, 59, 44),
    (203, 24, 29),
    (165, 15, 21),
    (103, 0, 13),
];

/// A named continuous color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRamp {
    name: &'static str,
    stops: &'static [(u8, u8, u8)],
}

impl ColorRamp {
    /// The viridis ramp (single-map default).
    pub const VIRIDIS: Self = Self {
        name: "viridis",
        stops: VIRIDIS,
    };

    /// The reds ramp (faceted-map default).
    pub const REDS: Self = Self {
        name: "reds",
        stops: REDS,
    };

    /// Looks a ramp up by its lowercase name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "viridis" => Some(Self::VIRIDIS),
            "reds" => Some(Self::REDS),
            _ => None,
        }
    }

    /// The ramp's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Samples the ramp at `t`, clamped to `[0,1]`.
    #[must_use]
    pub fn sample(&self, t: f64) -> RGBColor {
        let t = t.clamp(0.0, 1.0);
        #[allow(clippy::cast_precision_loss)]
        let scaled = t * (self.stops.len() - 1) as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lower = (scaled.floor() as usize).min(self.stops.len() - 1);
        let upper = (lower + 1).min(self.stops.len() - 1);
        let frac = scaled - scaled.floor();

        let (r1, g1, b1) = self.stops[lower];
        let (r2, g2, b2) = self.stops[upper];
        RGBColor(
            lerp_channel(r1, r2, frac),
            lerp_channel(g1, g2, frac),
            lerp_channel(b1, b2, frac),
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) * (1.0 - t) + f64::from(b) * t).round() as u8
}
