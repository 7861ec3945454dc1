//! Percentage value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Percentage of `part` over `whole`, rounded and capped at 100.
    ///
    /// A zero `whole` yields zero.
    pub fn of_ratio(part: u64, whole: u64) -> Self {
        if whole == 0 {
            return Self::ZERO;
        }
        let pct = (part as f64 / whole as f64 * 100.0).round();
        Self(pct.clamp(0.0, 100.0) as u8)
    }

    /// Mean of several percentages, rounded.
    pub fn mean(values: &[Percentage]) -> Self {
        if values.is_empty() {
            return Self::ZERO;
        }
        let sum: u32 = values.iter().map(|p| u32::from(p.0)).sum();
        Self::new((f64::from(sum) / values.len() as f64).round() as u8)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as a fraction (0.0 to 1.0).
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_new_clamps_to_100() {
        assert_eq!(Percentage::new(101).value(), 100);
        assert_eq!(Percentage::new(255).value(), 100);
    }

    #[test]
    fn of_ratio_caps_at_hundred() {
        assert_eq!(Percentage::of_ratio(7, 20).value(), 35);
        assert_eq!(Percentage::of_ratio(20, 20).value(), 100);
        assert_eq!(Percentage::of_ratio(75, 20).value(), 100);
    }

    #[test]
    fn of_ratio_with_zero_whole_is_zero() {
        assert_eq!(Percentage::of_ratio(5, 0), Percentage::ZERO);
    }

    #[test]
    fn mean_rounds_to_nearest() {
        let values = [Percentage::new(100), Percentage::new(50), Percentage::new(0)];
        assert_eq!(Percentage::mean(&values).value(), 50);
        assert_eq!(Percentage::mean(&[]), Percentage::ZERO);
    }

    #[test]
    fn as_fraction_converts_correctly() {
        assert_eq!(Percentage::new(35).as_fraction(), 0.35);
    }

    #[test]
    fn percentage_displays_with_percent_sign() {
        assert_eq!(format!("{}", Percentage::new(42)), "42%");
    }
}
