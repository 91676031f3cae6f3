// Copyright (c) 2024 Mike Tsao

//! The host model a surface and a binding engine operate on. The mixer,
//! devices and modulation graph belong to the host; this module specifies
//! them only by the interface they present, plus an in-memory host.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ChannelFlag, ChannelView, Devices, Host, HostEvent, MemoryHost, Mixer, ModelEvent,
        ModulationEvent, ModulationHost, ModulationScope, ModulatorSpec, ModulatorSpecBuilder, ParameterKind,
        RemoteControl, Waveshape,
    };
}

pub use {
    events::{HostEvent, ModelEvent, ModulationEvent},
    memory::MemoryHost,
    traits::{Devices, Host, Mixer, ModulationHost},
    types::{
        ChannelFlag, ChannelView, ClipState, CrossfadeGroup, Direction, ModulationInfo,
        ModulationScope, ModulatorInfo, ModulatorSpec, ModulatorSpecBuilder, Nudge, ParameterKind, PatternState,
        RemoteControl, Waveshape,
    },
};

mod events;
mod memory;
mod traits;
mod types;
