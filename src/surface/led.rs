// Copyright (c) 2024 Mike Tsao

//! LED feedback encoding. A grid LED message is a note-on whose MIDI channel
//! selects brightness or animation and whose velocity selects a palette
//! color. Single-color perimeter LEDs use channel 0 with velocity 0/1/2.

use crate::types::{u7, MidiChannel, MidiMessage};
use strum_macros::{EnumCount, EnumIter, FromRepr};

/// Brightness and animation selectors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumCount, EnumIter, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum LedBehavior {
    Percent10 = 0,
    Percent25 = 1,
    Percent50 = 2,
    Percent65 = 3,
    Percent75 = 4,
    Percent90 = 5,
    Percent100 = 6,
    PulseSixteenth = 7,
    PulseEighth = 8,
    PulseQuarter = 9,
    PulseHalf = 10,
    BlinkTwentyFourth = 11,
    BlinkSixteenth = 12,
    BlinkEighth = 13,
    BlinkQuarter = 14,
    BlinkHalf = 15,
}

/// The palette entries the surface uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum LedColor {
    Off = 0,
    Gray50 = 1,
    Gray75 = 2,
    White = 3,
    Red = 5,
    Yellow = 12,
    Green = 21,
    Blue = 67,
}

/// A (behavior, color) wire pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct LedEncoding {
    #[allow(missing_docs)]
    pub behavior: LedBehavior,
    #[allow(missing_docs)]
    pub color: LedColor,
}
impl LedEncoding {
    #[allow(missing_docs)]
    pub const fn new(behavior: LedBehavior, color: LedColor) -> Self {
        Self { behavior, color }
    }

    /// The message that sets the grid LED at `note` to this encoding.
    pub fn message(&self, note: u8) -> (MidiChannel, MidiMessage) {
        (
            MidiChannel::new(self.behavior as u8),
            MidiMessage::NoteOn {
                key: u7::from(note),
                vel: u7::from(self.color as u8),
            },
        )
    }

    /// Reads back a grid LED message, if it is one.
    pub fn decode(channel: MidiChannel, message: &MidiMessage) -> Option<(u8, Self)> {
        let MidiMessage::NoteOn { key, vel } = message else {
            return None;
        };
        Some((
            key.as_int(),
            Self::new(
                LedBehavior::from_repr(channel.0)?,
                LedColor::from_repr(vel.as_int())?,
            ),
        ))
    }
}

/// Every visual state a grid LED can be in. [SurfaceLed::encoding] is the one
/// place these map onto the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum SurfaceLed {
    PatternActive,
    PatternTransition,
    PatternFocused,
    PatternInactive,
    ClipInactive,
    ClipPlaying,
    ClipArmed,
    ClipRecording,
    ParameterIncrement,
    ParameterDecrement,
    ParameterReset,
    ParameterIsDefault,
    TemplateActive,
    TemplateInactiveLocal,
    TemplateInactiveGlobal,
    ModulationNone,
    ModulationSelfOwned,
    ModulationForeign,
    /// Nothing to show here.
    Blank,
}
impl SurfaceLed {
    /// The wire pair for this state.
    pub const fn encoding(&self) -> LedEncoding {
        use LedBehavior::*;
        use LedColor::*;
        match self {
            SurfaceLed::PatternActive => LedEncoding::new(Percent100, Red),
            SurfaceLed::PatternTransition => LedEncoding::new(PulseSixteenth, Red),
            SurfaceLed::PatternFocused => LedEncoding::new(Percent100, Green),
            SurfaceLed::PatternInactive => LedEncoding::new(Percent50, White),
            SurfaceLed::ClipInactive => LedEncoding::new(Percent100, Gray50),
            SurfaceLed::ClipPlaying => LedEncoding::new(Percent100, Green),
            SurfaceLed::ClipArmed => LedEncoding::new(Percent100, Red),
            SurfaceLed::ClipRecording => LedEncoding::new(BlinkEighth, Red),
            SurfaceLed::ParameterIncrement => LedEncoding::new(Percent100, Green),
            SurfaceLed::ParameterDecrement => LedEncoding::new(Percent100, Yellow),
            SurfaceLed::ParameterReset => LedEncoding::new(Percent100, Red),
            SurfaceLed::ParameterIsDefault => LedEncoding::new(Percent100, Off),
            SurfaceLed::TemplateActive => LedEncoding::new(Percent100, Green),
            SurfaceLed::TemplateInactiveLocal => LedEncoding::new(Percent50, White),
            SurfaceLed::TemplateInactiveGlobal => LedEncoding::new(Percent50, Blue),
            SurfaceLed::ModulationNone => LedEncoding::new(Percent100, White),
            SurfaceLed::ModulationSelfOwned => LedEncoding::new(Percent100, Red),
            SurfaceLed::ModulationForeign => LedEncoding::new(Percent100, Yellow),
            SurfaceLed::Blank => LedEncoding::new(Percent100, Off),
        }
    }

    /// The message that shows this state at `note`.
    pub fn message(&self, note: u8) -> (MidiChannel, MidiMessage) {
        self.encoding().message(note)
    }
}

/// A single-color LED outside the grid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum PerimeterLed {
    Off = 0,
    On = 1,
    Blink = 2,
}
impl PerimeterLed {
    /// The channel perimeter LEDs are normally addressed on.
    pub const CHANNEL: MidiChannel = MidiChannel::new(0);

    #[allow(missing_docs)]
    pub fn lit(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }

    /// The message that sets the LED of button `code` on `channel`.
    pub fn message(&self, code: u8, channel: MidiChannel) -> (MidiChannel, MidiMessage) {
        (
            channel,
            MidiMessage::NoteOn {
                key: u7::from(code),
                vel: u7::from(*self as u8),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn behavior_selectors_are_contiguous() {
        for (i, behavior) in LedBehavior::iter().enumerate() {
            assert_eq!(behavior as usize, i);
        }
    }

    #[test]
    fn policy_table_matches_the_device() {
        let wire = |led: SurfaceLed| {
            let e = led.encoding();
            (e.behavior as u8, e.color as u8)
        };
        assert_eq!(wire(SurfaceLed::PatternActive), (6, 5));
        assert_eq!(wire(SurfaceLed::PatternTransition), (7, 5));
        assert_eq!(wire(SurfaceLed::PatternFocused), (6, 21));
        assert_eq!(wire(SurfaceLed::PatternInactive), (2, 3));
        assert_eq!(wire(SurfaceLed::ClipInactive), (6, 1));
        assert_eq!(wire(SurfaceLed::ClipPlaying), (6, 21));
        assert_eq!(wire(SurfaceLed::ClipArmed), (6, 5));
        assert_eq!(wire(SurfaceLed::ClipRecording), (13, 5));
        assert_eq!(wire(SurfaceLed::ParameterIncrement), (6, 21));
        assert_eq!(wire(SurfaceLed::ParameterDecrement), (6, 12));
        assert_eq!(wire(SurfaceLed::ParameterReset), (6, 5));
        assert_eq!(wire(SurfaceLed::ParameterIsDefault), (6, 0));
        assert_eq!(wire(SurfaceLed::TemplateActive), (6, 21));
        assert_eq!(wire(SurfaceLed::TemplateInactiveLocal), (2, 3));
        assert_eq!(wire(SurfaceLed::TemplateInactiveGlobal), (2, 67));
        assert_eq!(wire(SurfaceLed::ModulationNone), (6, 3));
        assert_eq!(wire(SurfaceLed::ModulationSelfOwned), (6, 5));
        assert_eq!(wire(SurfaceLed::ModulationForeign), (6, 12));
        assert_eq!(wire(SurfaceLed::Blank), (6, 0));
    }

    #[test]
    fn grid_messages_decode() {
        for led in SurfaceLed::iter() {
            let (channel, message) = led.message(42);
            assert_eq!(
                LedEncoding::decode(channel, &message),
                Some((42, led.encoding())),
                "{led:?} should survive the wire"
            );
        }
    }

    #[test]
    fn perimeter_messages() {
        let (channel, message) = PerimeterLed::On.message(119, PerimeterLed::CHANNEL);
        assert_eq!(channel, MidiChannel::new(0));
        assert_eq!(
            message,
            MidiMessage::NoteOn {
                key: u7::from(119),
                vel: u7::from(1)
            }
        );
        assert_eq!(PerimeterLed::lit(false), PerimeterLed::Off);
    }
}
