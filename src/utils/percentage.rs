use std::{fmt::Display, ops::Deref};

/// Percentage of the chart height, measured from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    /// Converts `value / whole` into a percentage clamped to `[0, 100]`. A zero `whole` gives 0%.
    pub fn clamped_ratio(value: f64, whole: f64) -> Percentage {
        if whole <= 0. || !value.is_finite() {
            return Percentage(0.);
        }
        Percentage((value * 100. / whole).clamp(0., 100.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
