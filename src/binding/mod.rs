// Copyright (c) 2024 Mike Tsao

//! The modulation-binding engine. A binding proxy stands in for the modulation
//! of one remote control; writing to an unbound proxy creates a modulator and
//! an edge behind it, and clearing it removes only what the engine made.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        BindingEngine, BindingError, BindingProxy, BindingSettings, BindingState, EngineEvent,
        ModulatorSource, Template, TouchValue,
    };
}

pub use {
    engine::{BindingEngine, EngineEvent, ModulatorSource, TouchValue},
    error::BindingError,
    proxy::{BindingProxy, BindingState},
    settings::BindingSettings,
    slots::{is_owned_label, parse_slot_label, GlobalSlotRegistry, OWNERSHIP_PREFIX},
    template::Template,
};

mod engine;
mod error;
mod proxy;
mod settings;
mod slots;
mod template;
