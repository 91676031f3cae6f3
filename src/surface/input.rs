// Copyright (c) 2024 Mike Tsao

use super::{
    address::{
        CHANNEL_BUTTON_COUNT, CHANNEL_BUTTON_FIRST, CHANNEL_FADER_COUNT, CHANNEL_FADER_FIRST,
        GRID_LAST, MASTER_FADER, SCENE_LAUNCH_COUNT, SCENE_LAUNCH_FIRST, SHIFT, TOGGLE_CLIPS,
        TOGGLE_PARAMETERS,
    },
    error::SurfaceError,
};
use crate::types::{u7, MidiChannel, MidiMessage, Normal};

/// One decoded input event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceInput {
    /// A button went down or up.
    Button {
        #[allow(missing_docs)]
        code: u8,
        #[allow(missing_docs)]
        pressed: bool,
        /// The channel the event arrived on; momentary lights answer on it.
        channel: MidiChannel,
    },
    /// A fader moved.
    Control {
        #[allow(missing_docs)]
        code: u8,
        #[allow(missing_docs)]
        value: Normal,
    },
}
impl SurfaceInput {
    /// Decodes a MIDI message. A note-on with zero velocity is a release.
    pub fn from_midi(channel: MidiChannel, message: &MidiMessage) -> Option<Self> {
        match message {
            MidiMessage::NoteOn { key, vel } => Some(Self::Button {
                code: key.as_int(),
                pressed: vel.as_int() > 0,
                channel,
            }),
            MidiMessage::NoteOff { key, .. } => Some(Self::Button {
                code: key.as_int(),
                pressed: false,
                channel,
            }),
            MidiMessage::Controller { controller, value } => Some(Self::Control {
                code: controller.as_int(),
                value: Normal::new(value.as_int() as f64 / 127.0),
            }),
            _ => None,
        }
    }

    /// The MIDI message a surface sends for a press or release of `code`.
    pub fn button_message(code: u8, pressed: bool) -> MidiMessage {
        if pressed {
            MidiMessage::NoteOn {
                key: u7::from(code),
                vel: u7::from(127),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::from(code),
                vel: u7::from(0),
            }
        }
    }
}

/// The physical zone a button code belongs to. What a press does in each zone
/// also depends on shift.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Zone {
    /// A grid note.
    Grid(u8),
    /// A channel button, by position.
    ChannelButton(usize),
    /// A scene-launch button, by position.
    SceneLaunch(usize),
    /// The clip-grid toggle.
    ToggleClips,
    /// The parameter-grid toggle, which is stop-all under shift.
    ToggleParameters,
    #[allow(missing_docs)]
    Shift,
}
impl Zone {
    /// Classifies a button code.
    pub fn of(code: u8) -> Result<Self, SurfaceError> {
        let channel_buttons =
            CHANNEL_BUTTON_FIRST..CHANNEL_BUTTON_FIRST + CHANNEL_BUTTON_COUNT as u8;
        let scene_buttons = SCENE_LAUNCH_FIRST..SCENE_LAUNCH_FIRST + SCENE_LAUNCH_COUNT as u8;
        Ok(match code {
            code if code <= GRID_LAST => Self::Grid(code),
            code if channel_buttons.contains(&code) => {
                Self::ChannelButton((code - CHANNEL_BUTTON_FIRST) as usize)
            }
            code if scene_buttons.contains(&code) => {
                Self::SceneLaunch((code - SCENE_LAUNCH_FIRST) as usize)
            }
            TOGGLE_CLIPS => Self::ToggleClips,
            TOGGLE_PARAMETERS => Self::ToggleParameters,
            SHIFT => Self::Shift,
            _ => return Err(SurfaceError::UnmappedNote(code)),
        })
    }
}

/// The fader a controller number belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fader {
    /// A channel fader, by position.
    Channel(usize),
    #[allow(missing_docs)]
    Master,
}
impl Fader {
    /// Classifies a controller number.
    pub fn of(code: u8) -> Result<Self, SurfaceError> {
        let channel_faders =
            CHANNEL_FADER_FIRST..CHANNEL_FADER_FIRST + CHANNEL_FADER_COUNT as u8;
        match code {
            MASTER_FADER => Ok(Self::Master),
            code if channel_faders.contains(&code) => {
                Ok(Self::Channel((code - CHANNEL_FADER_FIRST) as usize))
            }
            _ => Err(SurfaceError::UnmappedControl(code)),
        }
    }
}
