// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        BipolarNormal, ChannelUid, DeviceUid, IsUid, MidiChannel, MidiMessage, MidiMessagesFn,
        ModulationUid, ModulatorUid, Normal, ParameterUid, SourceId, SubscriberId, TempoDivision,
        UidFactory,
    };
}

pub use {
    midi::{u4, u7, MidiChannel, MidiMessage, MidiMessagesFn},
    ranges::{BipolarNormal, Normal, RangedF64},
    tempo::TempoDivision,
    uid::{
        ChannelUid, DeviceUid, IsUid, ModulationUid, ModulatorUid, ParameterUid, SourceId,
        SubscriberId, UidFactory,
    },
};

mod midi;
mod ranges;
mod tempo;
mod uid;
