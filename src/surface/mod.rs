// Copyright (c) 2024 Mike Tsao

//! The 8x8 grid control surface: its wire addressing, its LED color policy,
//! and the controller that keeps the lights in step with the host.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ChannelButtonMode, GridMode, LedEncoding, ParameterGridTarget, ShiftNavigation,
        SurfaceContext, SurfaceController, SurfaceInput, SurfaceLed, SurfaceSettings,
    };
}

pub use {
    controller::{ChannelButtonMode, GridMode, SurfaceContext, SurfaceController},
    error::SurfaceError,
    input::{Fader, SurfaceInput, Zone},
    led::{LedBehavior, LedColor, LedEncoding, PerimeterLed, SurfaceLed},
    settings::{ParameterGridTarget, ShiftNavigation, SurfaceSettings},
};

pub mod address;

mod controller;
mod error;
mod input;
mod led;
mod settings;
