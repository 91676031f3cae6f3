// Copyright (c) 2024 Mike Tsao

//! Musical subdivisions that a synthesized modulator can be clocked to.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// A tempo division, expressed as a note length. Each template column of the
/// binding engine selects one of these for the LFOs it creates.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumCount,
    EnumIter,
    Eq,
    FromRepr,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum TempoDivision {
    #[strum(serialize = "16/1")]
    Sixteen,
    #[strum(serialize = "8/1")]
    Eight,
    #[strum(serialize = "4/1")]
    Four,
    #[strum(serialize = "2/1")]
    Double,
    #[strum(serialize = "1/1")]
    Whole,
    #[strum(serialize = "1/2.")]
    HalfDotted,
    #[strum(serialize = "1/2")]
    Half,
    #[strum(serialize = "1/2T")]
    HalfTriplet,
    #[strum(serialize = "1/4.")]
    QuarterDotted,
    #[default]
    #[strum(serialize = "1/4")]
    Quarter,
    #[strum(serialize = "1/4T")]
    QuarterTriplet,
    #[strum(serialize = "1/8.")]
    EighthDotted,
    #[strum(serialize = "1/8")]
    Eighth,
    #[strum(serialize = "1/8T")]
    EighthTriplet,
    #[strum(serialize = "1/16.")]
    SixteenthDotted,
    #[strum(serialize = "1/16")]
    Sixteenth,
    #[strum(serialize = "1/16T")]
    SixteenthTriplet,
    #[strum(serialize = "1/32")]
    ThirtySecond,
}
impl TempoDivision {
    /// The length of one period, in quarter-note beats.
    pub fn beats(&self) -> f64 {
        match self {
            TempoDivision::Sixteen => 64.0,
            TempoDivision::Eight => 32.0,
            TempoDivision::Four => 16.0,
            TempoDivision::Double => 8.0,
            TempoDivision::Whole => 4.0,
            TempoDivision::HalfDotted => 3.0,
            TempoDivision::Half => 2.0,
            TempoDivision::HalfTriplet => 4.0 / 3.0,
            TempoDivision::QuarterDotted => 1.5,
            TempoDivision::Quarter => 1.0,
            TempoDivision::QuarterTriplet => 2.0 / 3.0,
            TempoDivision::EighthDotted => 0.75,
            TempoDivision::Eighth => 0.5,
            TempoDivision::EighthTriplet => 1.0 / 3.0,
            TempoDivision::SixteenthDotted => 0.375,
            TempoDivision::Sixteenth => 0.25,
            TempoDivision::SixteenthTriplet => 1.0 / 6.0,
            TempoDivision::ThirtySecond => 0.125,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn divisions_get_shorter_in_declaration_order() {
        let beats: Vec<f64> = TempoDivision::iter().map(|d| d.beats()).collect();
        assert!(
            beats.windows(2).all(|w| w[0] > w[1]),
            "each division should be shorter than the one before it: {beats:?}"
        );
    }

    #[test]
    fn divisions_serialize_in_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TempoDivision::SixteenthDotted).unwrap(),
            "\"sixteenth-dotted\""
        );
        assert_eq!(TempoDivision::Quarter.to_string(), "1/4");
    }
}
