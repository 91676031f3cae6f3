// Copyright (c) 2024 Mike Tsao

//! Value snapshots that a host hands out. They are copies; holding one never
//! pins anything inside the host.

use crate::types::{BipolarNormal, ChannelUid, DeviceUid, ModulationUid, ModulatorUid, Normal, ParameterUid, TempoDivision};
use derive_builder::Builder;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// A boolean channel attribute that a channel button can toggle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, IntoStaticStr)]
pub enum ChannelFlag {
    #[allow(missing_docs)]
    Enabled,
    #[allow(missing_docs)]
    Cue,
    #[allow(missing_docs)]
    Arm,
}

/// Which side of the crossfader a channel feeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, EnumCount, FromRepr)]
#[serde(rename_all = "kebab-case")]
pub enum CrossfadeGroup {
    #[default]
    #[allow(missing_docs)]
    Bypass,
    #[allow(missing_docs)]
    A,
    #[allow(missing_docs)]
    B,
}
impl CrossfadeGroup {
    /// The next group in the three-way cycle.
    pub fn next(self) -> Self {
        Self::from_repr((self as usize + 1) % <Self as strum::EnumCount>::COUNT).unwrap_or_default()
    }
}

/// The pattern list of a pattern channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatternState {
    /// How many patterns the channel has.
    pub count: usize,
    /// The pattern that is currently playing.
    pub active: Option<usize>,
    /// The pattern being transitioned to, if a transition is underway.
    pub next: Option<usize>,
    /// The pattern that has editing focus.
    pub focused: usize,
}

/// A snapshot of one mixer channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelView {
    #[allow(missing_docs)]
    pub uid: ChannelUid,
    #[allow(missing_docs)]
    pub label: String,
    #[allow(missing_docs)]
    pub enabled: bool,
    #[allow(missing_docs)]
    pub cue: bool,
    #[allow(missing_docs)]
    pub arm: bool,
    #[allow(missing_docs)]
    pub crossfade_group: CrossfadeGroup,
    #[allow(missing_docs)]
    pub fader: Normal,
    /// [None] if this is a bus rather than a pattern channel.
    pub patterns: Option<PatternState>,
}
impl ChannelView {
    /// Reads one of the boolean flags.
    pub fn flag(&self, flag: ChannelFlag) -> bool {
        match flag {
            ChannelFlag::Enabled => self.enabled,
            ChannelFlag::Cue => self.cue,
            ChannelFlag::Arm => self.arm,
        }
    }
}

/// A populated clip slot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ClipState {
    /// Whether the clip is playing (or recording, on an armed channel).
    pub running: bool,
}

/// A step through an ordered list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    #[allow(missing_docs)]
    Previous,
    #[allow(missing_docs)]
    Next,
}
impl Direction {
    /// Applies this step to `index`, staying within `0..len`.
    pub fn step(&self, index: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Previous => index.checked_sub(1),
            Direction::Next => Some(index + 1).filter(|i| *i < len),
        }
    }
}

/// Which way a value button pushes a parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Nudge {
    #[allow(missing_docs)]
    Up,
    #[allow(missing_docs)]
    Down,
}

/// The shape of a remote-control parameter's value space. Increment and
/// decrement behavior is carried here rather than by the parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    /// On or off.
    Boolean,
    /// One of `steps` evenly spaced positions.
    Discrete {
        #[allow(missing_docs)]
        steps: usize,
    },
    /// Anywhere in the normalized range.
    Continuous,
}
impl ParameterKind {
    /// How far one press moves a continuous parameter.
    pub const CONTINUOUS_INCREMENT: f64 = 0.1;

    /// Returns the value one press of `nudge` produces from `current`.
    pub fn nudge(&self, current: Normal, nudge: Nudge) -> Normal {
        match self {
            ParameterKind::Boolean => match nudge {
                Nudge::Up => Normal::maximum(),
                Nudge::Down => Normal::minimum(),
            },
            ParameterKind::Discrete { steps } => {
                if *steps < 2 {
                    return Normal::minimum();
                }
                let last = (*steps - 1) as f64;
                let index = (current.0 * last).round();
                let index = match nudge {
                    Nudge::Up => (index + 1.0).min(last),
                    Nudge::Down => (index - 1.0).max(0.0),
                };
                Normal::new(index / last)
            }
            ParameterKind::Continuous => match nudge {
                Nudge::Up => current.nudged(Self::CONTINUOUS_INCREMENT),
                Nudge::Down => current.nudged(-Self::CONTINUOUS_INCREMENT),
            },
        }
    }
}

/// A snapshot of a device's remote-control parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteControl {
    #[allow(missing_docs)]
    pub uid: ParameterUid,
    #[allow(missing_docs)]
    pub label: String,
    #[allow(missing_docs)]
    pub kind: ParameterKind,
    /// The current value, normalized.
    pub value: Normal,
    /// The value a reset restores.
    pub default: Normal,
    /// Whether a modulation may target this parameter.
    pub modulatable: bool,
}
impl RemoteControl {
    /// Whether the parameter sits at its default value.
    pub fn is_default(&self) -> bool {
        (self.value.0 - self.default.0).abs() < f64::EPSILON
    }
}

/// The basic waveform of a synthesized LFO.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, EnumCount, EnumIter, FromRepr,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum Waveshape {
    #[default]
    #[allow(missing_docs)]
    Sine,
    #[allow(missing_docs)]
    Triangle,
    #[allow(missing_docs)]
    Square,
    /// A rising ramp.
    Up,
}

/// Where a modulator is registered.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
pub enum ModulationScope {
    /// The show-wide modulation engine.
    #[display(fmt = "global")]
    Global,
    /// The modulation engine local to one device.
    #[display(fmt = "device {}", _0)]
    Device(DeviceUid),
}

/// What a host should build when asked for a new modulator.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
#[builder(default)]
pub struct ModulatorSpec {
    #[allow(missing_docs)]
    #[builder(setter(into))]
    pub label: String,
    /// The clock the modulator syncs to.
    pub tempo: TempoDivision,
    #[allow(missing_docs)]
    pub waveshape: Waveshape,
    /// Whether the modulator starts out running.
    pub running: bool,
}

/// A snapshot of a modulator.
#[derive(Clone, Debug, PartialEq)]
pub struct ModulatorInfo {
    #[allow(missing_docs)]
    pub uid: ModulatorUid,
    #[allow(missing_docs)]
    pub label: String,
    #[allow(missing_docs)]
    pub scope: ModulationScope,
    #[allow(missing_docs)]
    pub running: bool,
}

/// A snapshot of a modulation edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModulationInfo {
    #[allow(missing_docs)]
    pub uid: ModulationUid,
    #[allow(missing_docs)]
    pub source: ModulatorUid,
    #[allow(missing_docs)]
    pub target: ParameterUid,
    /// The signed depth applied to the target.
    pub range: BipolarNormal,
}
