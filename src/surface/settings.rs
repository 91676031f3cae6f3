// Copyright (c) 2024 Mike Tsao

use super::address::SHIFT;
use crate::util::HasSettings;
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// What the parameter grid edits.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterGridTarget {
    /// The focused device's remote controls.
    #[default]
    Values,
    /// The binding proxies of those remote controls.
    Modulation,
}

/// What the shifted arrow buttons do.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftNavigation {
    /// Up/down move pattern focus; left/right move channel focus, or walk the
    /// device chain in the parameter grid.
    #[default]
    Full,
    /// The arrows only light while held.
    Reduced,
}

/// Persistent settings of one grid surface. Fields missing from saved
/// settings take their defaults.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct SurfaceSettings {
    #[derivative(Default(value = "true"))]
    pub(crate) master_fader_enabled: bool,
    #[derivative(Default(value = "true"))]
    pub(crate) channel_faders_enabled: bool,
    /// Show the binding overlay when a binding engine is attached.
    #[derivative(Default(value = "true"))]
    pub(crate) binding_mode_enabled: bool,
    /// The button that asserts the binding hold. It keeps its ordinary
    /// meaning too.
    #[derivative(Default(value = "SHIFT"))]
    pub(crate) binding_hold_button: u8,
    pub(crate) parameter_grid_target: ParameterGridTarget,
    pub(crate) shift_navigation: ShiftNavigation,

    #[serde(skip)]
    has_been_saved: bool,
}
impl HasSettings for SurfaceSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
#[allow(missing_docs)]
impl SurfaceSettings {
    pub fn master_fader_enabled(&self) -> bool {
        self.master_fader_enabled
    }

    pub fn set_master_fader_enabled(&mut self, enabled: bool) {
        self.master_fader_enabled = enabled;
        self.needs_save();
    }

    pub fn channel_faders_enabled(&self) -> bool {
        self.channel_faders_enabled
    }

    pub fn set_channel_faders_enabled(&mut self, enabled: bool) {
        self.channel_faders_enabled = enabled;
        self.needs_save();
    }

    pub fn binding_mode_enabled(&self) -> bool {
        self.binding_mode_enabled
    }

    pub fn set_binding_mode_enabled(&mut self, enabled: bool) {
        self.binding_mode_enabled = enabled;
        self.needs_save();
    }

    pub fn binding_hold_button(&self) -> u8 {
        self.binding_hold_button
    }

    pub fn set_binding_hold_button(&mut self, code: u8) {
        self.binding_hold_button = code;
        self.needs_save();
    }

    pub fn parameter_grid_target(&self) -> ParameterGridTarget {
        self.parameter_grid_target
    }

    pub fn set_parameter_grid_target(&mut self, target: ParameterGridTarget) {
        self.parameter_grid_target = target;
        self.needs_save();
    }

    pub fn shift_navigation(&self) -> ShiftNavigation {
        self.shift_navigation
    }

    pub fn set_shift_navigation(&mut self, navigation: ShiftNavigation) {
        self.shift_navigation = navigation;
        self.needs_save();
    }
}
