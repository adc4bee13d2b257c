//! Count-to-color normalization shared across every panel of a
//! rendering pass.

use plotters::style::RGBColor;

use crate::ramp::ColorRamp;

/// Linear normalization from a raw case count to the `[0,1]` domain of
/// a color ramp.
///
/// Built exactly once per rendering pass from the full set of displayed
/// counts, then shared by every panel so colors stay comparable across
/// panels. When every count is equal (`min == max`, e.g. all-zero data)
/// normalization collapses to a constant `0.0` instead of dividing by
/// zero, so every region gets the ramp's low endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountScale {
    min: f64,
    max: f64,
}

impl CountScale {
    /// Computes the global min/max over the counts displayed in one
    /// rendering pass. An empty slice yields a degenerate `[0,0]` scale.
    #[must_use]
    pub fn from_counts(counts: &[u64]) -> Self {
        let min = counts.iter().copied().min().unwrap_or(0);
        let max = counts.iter().copied().max().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let (min, max) = (min as f64, max as f64);
        Self { min, max }
    }

    /// Lower bound of the normalization range.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound of the normalization range.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Maps a count into `[0,1]`; constant `0.0` when the range is
    /// degenerate.
    #[must_use]
    pub fn normalize(&self, count: u64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let value = count as f64;
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Maps a count through the ramp to its fill color.
    #[must_use]
    pub fn color_for(&self, count: u64, ramp: &ColorRamp) -> RGBColor {
        ramp.sample(self.normalize(count))
    }
}
