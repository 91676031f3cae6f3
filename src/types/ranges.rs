// Copyright (c) 2024 Mike Tsao

use core::{
    fmt::Display,
    ops::{Add, RangeInclusive, Sub},
};
use serde::{Deserialize, Serialize};

/// [RangedF64] enforces the given range limits while staying about as cheap to
/// use as a plain f64. It clamps at creation, when setting it explicitly, when
/// converting from an f64, and when converting back out. Arithmetic
/// (Add, Sub) is not checked, so intermediate results may leave the range
/// until they are converted.
///
/// Clamping is silent.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RangedF64<const LOWER: i8, const UPPER: i8>(pub f64);
#[allow(missing_docs)]
impl<const LOWER: i8, const UPPER: i8> RangedF64<LOWER, UPPER> {
    /// The highest valid value.
    pub const MAX: f64 = UPPER as f64;
    /// The lowest valid value.
    pub const MIN: f64 = LOWER as f64;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
    pub const fn maximum() -> Self {
        Self(Self::MAX)
    }
    pub const fn minimum() -> Self {
        Self(Self::MIN)
    }
    pub fn set(&mut self, value: f64) {
        self.0 = value.clamp(Self::MIN, Self::MAX);
    }

    /// Returns a copy moved by `delta`, clamped to the range.
    pub fn nudged(&self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }

    pub fn to_percentage(&self) -> f64 {
        self.0 * 100.0
    }
}
impl<const LOWER: i8, const UPPER: i8> Display for RangedF64<LOWER, UPPER> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}
impl<const LOWER: i8, const UPPER: i8> Add<f64> for RangedF64<LOWER, UPPER> {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        Self(self.0 + rhs)
    }
}
impl<const LOWER: i8, const UPPER: i8> Sub<f64> for RangedF64<LOWER, UPPER> {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        Self(self.0 - rhs)
    }
}
impl<const LOWER: i8, const UPPER: i8> From<RangedF64<LOWER, UPPER>> for f64 {
    fn from(value: RangedF64<LOWER, UPPER>) -> Self {
        value.0.clamp(Self::MIN, Self::MAX)
    }
}
impl<const LOWER: i8, const UPPER: i8> From<f64> for RangedF64<LOWER, UPPER> {
    fn from(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
}

/// A [Normal] is a RangedF64 whose range is [0.0, 1.0]. Fader positions,
/// parameter values and modulation depths are all expressed as [Normal].
pub type Normal = RangedF64<0, 1>;
#[allow(missing_docs)]
impl Normal {
    pub const fn range() -> RangeInclusive<f64> {
        0.0..=1.0
    }
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }
    /// The center of the range, which is where an unmodulated bipolar depth
    /// sits.
    pub const CENTER: Self = Self(0.5);
}
impl Default for Normal {
    fn default() -> Self {
        Self(0.0)
    }
}
impl From<BipolarNormal> for Normal {
    fn from(value: BipolarNormal) -> Self {
        Self(value.0 * 0.5 + 0.5)
    }
}

/// A [BipolarNormal] is a RangedF64 whose range is [-1.0, 1.0]. A
/// modulation's range (its signed depth) is a [BipolarNormal].
pub type BipolarNormal = RangedF64<-1, 1>;
#[allow(missing_docs)]
impl BipolarNormal {
    pub const fn range() -> RangeInclusive<f64> {
        -1.0..=1.0
    }
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }
}
impl Default for BipolarNormal {
    fn default() -> Self {
        Self(0.0)
    }
}
impl From<Normal> for BipolarNormal {
    fn from(value: Normal) -> Self {
        Self(value.0 * 2.0 - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_mainline() {
        let a = Normal::new(0.2);

        assert_eq!(a + 0.2f64, Normal::new(0.4), "Addition of f64 should work.");
        assert_eq!(a - 0.1, Normal::new(0.1), "Subtraction of f64 should work.");
        assert_eq!(
            a.nudged(1.5),
            Normal::maximum(),
            "Nudging past the top should clamp"
        );
        assert_eq!(
            a.nudged(-0.5),
            Normal::minimum(),
            "Nudging past the bottom should clamp"
        );
    }

    #[test]
    fn normal_out_of_bounds() {
        assert_eq!(
            Normal::new(-1.0),
            Normal::new(0.0),
            "Normal below 0.0 should be clamped to 0.0"
        );
        assert_eq!(
            Normal::new(1.1),
            Normal::new(1.0),
            "Normal above 1.0 should be clamped to 1.0"
        );
    }

    #[test]
    fn convert_bipolar_normal_to_normal() {
        assert_eq!(
            Normal::from(BipolarNormal::from(-1.0)),
            Normal::new(0.0),
            "Bipolar -> Normal wrong"
        );
        assert_eq!(
            Normal::from(BipolarNormal::from(0.0)),
            Normal::CENTER,
            "An unmodulated depth should sit at the center"
        );
        assert_eq!(
            BipolarNormal::from(Normal::from(1.0)),
            BipolarNormal::new(1.0),
            "Normal -> Bipolar wrong"
        );
    }
}
