// Copyright (c) 2024 Mike Tsao

use super::types::{
    ChannelFlag, ChannelView, ClipState, Direction, ModulationInfo, ModulationScope,
    ModulatorInfo, ModulatorSpec, RemoteControl,
};
use crate::types::{BipolarNormal, DeviceUid, ModulationUid, ModulatorUid, Normal, ParameterUid};
use anyhow::Result;

/// The mixing engine a surface drives. Channels and clip slots are addressed
/// by position.
pub trait Mixer {
    /// How many channels the mixer has.
    fn channel_count(&self) -> usize;

    /// A snapshot of the channel at `index`, or [None] if there isn't one.
    fn channel(&self, index: usize) -> Option<ChannelView>;

    /// The position of the focused channel, if any.
    fn focused_channel(&self) -> Option<usize>;

    /// Gives `index` focus and selects it.
    fn focus_channel(&mut self, index: usize) -> Result<()>;

    #[allow(missing_docs)]
    fn toggle_channel_flag(&mut self, index: usize, flag: ChannelFlag) -> Result<()>;

    /// Advances the channel's crossfade group to the next of its three states.
    fn cycle_crossfade_group(&mut self, index: usize) -> Result<()>;

    #[allow(missing_docs)]
    fn set_channel_fader(&mut self, index: usize, value: Normal) -> Result<()>;

    #[allow(missing_docs)]
    fn set_master_fader(&mut self, value: Normal);

    /// Gives the pattern at `pattern` editing focus without playing it.
    fn focus_pattern(&mut self, index: usize, pattern: usize) -> Result<()>;

    /// Starts a transition to `pattern`.
    fn go_pattern(&mut self, index: usize, pattern: usize) -> Result<()>;

    /// The clip at `slot`, or [None] if the slot is empty.
    fn clip(&self, index: usize, slot: usize) -> Option<ClipState>;

    #[allow(missing_docs)]
    fn add_clip(&mut self, index: usize, slot: usize) -> Result<()>;

    #[allow(missing_docs)]
    fn trigger_clip(&mut self, index: usize, slot: usize) -> Result<()>;

    #[allow(missing_docs)]
    fn stop_clip(&mut self, index: usize, slot: usize) -> Result<()>;

    #[allow(missing_docs)]
    fn focus_clip(&mut self, index: usize, slot: usize) -> Result<()>;

    #[allow(missing_docs)]
    fn launch_scene(&mut self, scene: usize) -> Result<()>;

    #[allow(missing_docs)]
    fn stop_all_clips(&mut self);

    /// The device whose remote controls a surface should follow: the focused
    /// channel's focused pattern, or its first effect.
    fn focused_device(&self) -> Option<DeviceUid>;

    /// The device before or after `device` in its channel's chain.
    fn adjacent_device(&self, device: DeviceUid, direction: Direction) -> Option<DeviceUid>;
}

/// Read and write access to device remote controls.
pub trait Devices {
    /// The device's remote-control list, in order. A position may be empty.
    /// [None] means the device no longer exists.
    fn remote_controls(&self, device: DeviceUid) -> Option<Vec<Option<ParameterUid>>>;

    #[allow(missing_docs)]
    fn remote_control(&self, parameter: ParameterUid) -> Option<RemoteControl>;

    #[allow(missing_docs)]
    fn set_parameter(&mut self, parameter: ParameterUid, value: Normal) -> Result<()>;

    /// Restores the parameter's default value.
    fn reset_parameter(&mut self, parameter: ParameterUid) -> Result<()>;
}

/// The modulation graph: modulators, and edges from them to parameters.
pub trait ModulationHost {
    /// Builds and registers a modulator.
    fn add_modulator(&mut self, scope: ModulationScope, spec: &ModulatorSpec) -> Result<ModulatorUid>;

    /// Unregisters a modulator. Any edges from it go with it.
    fn remove_modulator(&mut self, uid: ModulatorUid) -> Result<()>;

    #[allow(missing_docs)]
    fn modulator(&self, uid: ModulatorUid) -> Option<ModulatorInfo>;

    /// Every modulator registered at [ModulationScope::Global].
    fn global_modulators(&self) -> Vec<ModulatorInfo>;

    /// Creates an edge from `source` to `target`, registered in the source's
    /// scope. Fails if the target can't be modulated.
    fn add_modulation(&mut self, source: ModulatorUid, target: ParameterUid) -> Result<ModulationUid>;

    #[allow(missing_docs)]
    fn remove_modulation(&mut self, uid: ModulationUid) -> Result<()>;

    #[allow(missing_docs)]
    fn modulation(&self, uid: ModulationUid) -> Option<ModulationInfo>;

    /// Every edge into `target`, oldest first.
    fn modulations_of_target(&self, target: ParameterUid) -> Vec<ModulationUid>;

    /// Every edge out of `source`.
    fn modulations_from_source(&self, source: ModulatorUid) -> Vec<ModulationUid>;

    #[allow(missing_docs)]
    fn set_modulation_range(&mut self, uid: ModulationUid, range: BipolarNormal) -> Result<()>;

    /// Restores the edge's default range.
    fn reset_modulation_range(&mut self, uid: ModulationUid) -> Result<()>;
}

/// Everything a surface needs from its host, as one object.
pub trait Host: Mixer + Devices + ModulationHost {}
impl<T: Mixer + Devices + ModulationHost + ?Sized> Host for T {}
