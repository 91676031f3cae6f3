// Copyright (c) 2024 Mike Tsao

//! A complete host that lives in memory. It records every change it makes as
//! a [HostEvent] so that a test (or a demo loop) can route the notifications
//! the way a real host would.

use super::{
    events::{HostEvent, ModelEvent, ModulationEvent},
    traits::{Devices, Mixer, ModulationHost},
    types::{
        ChannelFlag, ChannelView, ClipState, CrossfadeGroup, Direction, ModulationInfo,
        ModulationScope, ModulatorInfo, ModulatorSpec, ParameterKind, PatternState, RemoteControl,
    },
};
use crate::types::{
    BipolarNormal, ChannelUid, DeviceUid, ModulationUid, ModulatorUid, Normal, ParameterUid,
    UidFactory,
};
use anyhow::{anyhow, Result};
use derivative::Derivative;
use rustc_hash::FxHashMap;

#[derive(Debug, Derivative)]
#[derivative(Default)]
struct MemoryChannel {
    uid: ChannelUid,
    label: String,
    #[derivative(Default(value = "true"))]
    enabled: bool,
    cue: bool,
    arm: bool,
    crossfade_group: CrossfadeGroup,
    fader: Normal,
    is_bus: bool,
    patterns: Vec<DeviceUid>,
    active_pattern: Option<usize>,
    next_pattern: Option<usize>,
    focused_pattern: usize,
    clips: FxHashMap<usize, ClipState>,
    focused_clip: Option<usize>,
    effects: Vec<DeviceUid>,
}
impl MemoryChannel {
    fn devices(&self) -> impl Iterator<Item = &DeviceUid> {
        self.patterns.iter().chain(self.effects.iter())
    }

    /// The chain a surface walks with previous/next: the focused pattern,
    /// then the effects.
    fn device_chain(&self) -> Vec<DeviceUid> {
        self.patterns
            .get(self.focused_pattern)
            .into_iter()
            .chain(self.effects.iter())
            .copied()
            .collect()
    }
}

#[derive(Debug)]
struct MemoryModulator {
    info: ModulatorInfo,
    spec: ModulatorSpec,
}

/// An in-memory mixer, device set and modulation graph.
#[derive(Debug, Default)]
pub struct MemoryHost {
    channel_uids: UidFactory<ChannelUid>,
    device_uids: UidFactory<DeviceUid>,
    parameter_uids: UidFactory<ParameterUid>,
    modulator_uids: UidFactory<ModulatorUid>,
    modulation_uids: UidFactory<ModulationUid>,

    channels: Vec<MemoryChannel>,
    focused_channel: Option<usize>,
    master_fader: Normal,
    devices: FxHashMap<DeviceUid, Vec<Option<ParameterUid>>>,
    parameters: FxHashMap<ParameterUid, RemoteControl>,
    modulators: FxHashMap<ModulatorUid, MemoryModulator>,
    modulations: Vec<ModulationInfo>,

    scenes_launched: Vec<usize>,
    stop_all_count: usize,
    events: Vec<HostEvent>,
}
impl MemoryHost {
    fn model_event(&mut self, event: ModelEvent) {
        self.events.push(HostEvent::Model(event));
    }

    fn modulation_event(&mut self, event: ModulationEvent) {
        self.events.push(HostEvent::Modulation(event));
    }

    fn channel_mut(&mut self, index: usize) -> Result<&mut MemoryChannel> {
        self.channels
            .get_mut(index)
            .ok_or_else(|| anyhow!("no channel at position {index}"))
    }

    fn pattern_channel_mut(&mut self, index: usize) -> Result<&mut MemoryChannel> {
        let channel = self.channel_mut(index)?;
        if channel.is_bus {
            return Err(anyhow!("channel {index} has no patterns"));
        }
        Ok(channel)
    }

    fn new_device(&mut self) -> DeviceUid {
        let device = self.device_uids.mint_next();
        self.devices.insert(device, Vec::default());
        device
    }

    /// Drains every notification recorded since the last call.
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Appends a channel that plays `pattern_count` patterns. The first
    /// pattern starts out active.
    pub fn add_pattern_channel(&mut self, label: &str, pattern_count: usize) -> ChannelUid {
        let uid = self.channel_uids.mint_next();
        let patterns = (0..pattern_count).map(|_| self.new_device()).collect();
        self.channels.push(MemoryChannel {
            uid,
            label: label.to_string(),
            patterns,
            active_pattern: (pattern_count > 0).then_some(0),
            ..Default::default()
        });
        let index = self.channels.len() - 1;
        self.model_event(ModelEvent::ChannelAdded { index });
        uid
    }

    /// Appends a bus: a channel with effects but no patterns.
    pub fn add_bus(&mut self, label: &str) -> ChannelUid {
        let uid = self.channel_uids.mint_next();
        self.channels.push(MemoryChannel {
            uid,
            label: label.to_string(),
            is_bus: true,
            ..Default::default()
        });
        let index = self.channels.len() - 1;
        self.model_event(ModelEvent::ChannelAdded { index });
        uid
    }

    /// Appends an effect device to the channel's chain.
    pub fn add_effect(&mut self, index: usize) -> Result<DeviceUid> {
        self.channel_mut(index)?;
        let device = self.new_device();
        self.channel_mut(index)?.effects.push(device);
        Ok(device)
    }

    /// Removes the channel and everything it owns.
    pub fn remove_channel(&mut self, index: usize) -> Result<()> {
        if index >= self.channels.len() {
            return Err(anyhow!("no channel at position {index}"));
        }
        let channel = self.channels.remove(index);
        let devices: Vec<DeviceUid> = channel.devices().copied().collect();
        for device in devices {
            self.remove_device(device);
        }
        self.focused_channel = match self.focused_channel {
            Some(focused) if focused == index => None,
            Some(focused) if focused > index => Some(focused - 1),
            other => other,
        };
        self.model_event(ModelEvent::ChannelRemoved {
            uid: channel.uid,
            index,
        });
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn move_channel(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.channels.len() || to >= self.channels.len() {
            return Err(anyhow!("can't move channel {from} to {to}"));
        }
        let channel = self.channels.remove(from);
        self.channels.insert(to, channel);
        self.model_event(ModelEvent::ChannelMoved { from, to });
        Ok(())
    }

    fn remove_device(&mut self, device: DeviceUid) {
        if let Some(parameters) = self.devices.remove(&device) {
            for parameter in parameters.into_iter().flatten() {
                self.parameters.remove(&parameter);
                for uid in self.modulations_of_target(parameter) {
                    let _ = self.remove_modulation(uid);
                }
            }
        }
        let local: Vec<ModulatorUid> = self
            .modulators
            .values()
            .filter(|m| m.info.scope == ModulationScope::Device(device))
            .map(|m| m.info.uid)
            .collect();
        for uid in local {
            let _ = self.remove_modulator(uid);
        }
        self.model_event(ModelEvent::DeviceRemoved { device });
    }

    /// The device behind the channel's pattern at `pattern`.
    pub fn pattern_device(&self, index: usize, pattern: usize) -> Option<DeviceUid> {
        self.channels.get(index)?.patterns.get(pattern).copied()
    }

    /// Appends a remote control to the device. It starts at its default
    /// value, and only continuous controls accept modulation.
    pub fn add_remote_control(
        &mut self,
        device: DeviceUid,
        label: &str,
        kind: ParameterKind,
        default: Normal,
    ) -> Result<ParameterUid> {
        let uid = self.parameter_uids.mint_next();
        self.devices
            .get_mut(&device)
            .ok_or_else(|| anyhow!("unknown device {device}"))?
            .push(Some(uid));
        self.parameters.insert(
            uid,
            RemoteControl {
                uid,
                label: label.to_string(),
                kind,
                value: default,
                default,
                modulatable: kind == ParameterKind::Continuous,
            },
        );
        self.model_event(ModelEvent::RemoteControlsChanged { device });
        Ok(uid)
    }

    /// Puts a new continuous control at `position` of the device's list,
    /// replacing whatever was there.
    pub fn replace_remote_control(
        &mut self,
        device: DeviceUid,
        position: usize,
        label: &str,
    ) -> Result<ParameterUid> {
        let uid = self.parameter_uids.mint_next();
        let slot = self
            .devices
            .get_mut(&device)
            .and_then(|controls| controls.get_mut(position))
            .ok_or_else(|| anyhow!("device {device} has no control at {position}"))?;
        if let Some(old) = slot.replace(uid) {
            self.parameters.remove(&old);
        }
        self.parameters.insert(
            uid,
            RemoteControl {
                uid,
                label: label.to_string(),
                kind: ParameterKind::Continuous,
                value: Normal::default(),
                default: Normal::default(),
                modulatable: true,
            },
        );
        self.model_event(ModelEvent::RemoteControlsChanged { device });
        Ok(uid)
    }

    /// Changes whether a parameter accepts modulation.
    pub fn set_modulatable(&mut self, parameter: ParameterUid, modulatable: bool) -> Result<()> {
        self.parameters
            .get_mut(&parameter)
            .ok_or_else(|| anyhow!("unknown parameter {parameter}"))?
            .modulatable = modulatable;
        Ok(())
    }

    /// Adds a stopped modulator at global scope, the way a user would.
    pub fn add_global_modulator(&mut self, label: &str) -> ModulatorUid {
        let uid = self.modulator_uids.mint_next();
        self.insert_modulator(
            uid,
            ModulationScope::Global,
            ModulatorSpec {
                label: label.to_string(),
                tempo: Default::default(),
                waveshape: Default::default(),
                running: false,
            },
        );
        uid
    }

    fn insert_modulator(&mut self, uid: ModulatorUid, scope: ModulationScope, spec: ModulatorSpec) {
        let info = ModulatorInfo {
            uid,
            label: spec.label.clone(),
            scope,
            running: spec.running,
        };
        let label = info.label.clone();
        self.modulators.insert(uid, MemoryModulator { info, spec });
        self.modulation_event(ModulationEvent::ModulatorAdded { uid, scope, label });
    }

    #[allow(missing_docs)]
    pub fn relabel_modulator(&mut self, uid: ModulatorUid, label: &str) -> Result<()> {
        let modulator = self
            .modulators
            .get_mut(&uid)
            .ok_or_else(|| anyhow!("unknown modulator {uid}"))?;
        modulator.info.label = label.to_string();
        modulator.spec.label = label.to_string();
        let scope = modulator.info.scope;
        self.modulation_event(ModulationEvent::ModulatorRelabeled {
            uid,
            scope,
            label: label.to_string(),
        });
        Ok(())
    }

    /// The spec a modulator was built from, reflecting later relabels.
    pub fn modulator_spec(&self, uid: ModulatorUid) -> Option<&ModulatorSpec> {
        self.modulators.get(&uid).map(|m| &m.spec)
    }

    #[allow(missing_docs)]
    pub fn modulator_count(&self) -> usize {
        self.modulators.len()
    }

    #[allow(missing_docs)]
    pub fn modulation_count(&self) -> usize {
        self.modulations.len()
    }

    /// Finishes any pattern transition underway on the channel.
    pub fn complete_transition(&mut self, index: usize) -> Result<()> {
        let channel = self.pattern_channel_mut(index)?;
        if let Some(next) = channel.next_pattern.take() {
            channel.active_pattern = Some(next);
            self.model_event(ModelEvent::ActivePatternChanged { index });
        }
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn scenes_launched(&self) -> &[usize] {
        &self.scenes_launched
    }

    #[allow(missing_docs)]
    pub fn stop_all_count(&self) -> usize {
        self.stop_all_count
    }

    #[allow(missing_docs)]
    pub fn master_fader(&self) -> Normal {
        self.master_fader
    }

    /// The clip slot that has focus on the channel.
    pub fn focused_clip(&self, index: usize) -> Option<usize> {
        self.channels.get(index)?.focused_clip
    }
}
impl Mixer for MemoryHost {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel(&self, index: usize) -> Option<ChannelView> {
        let c = self.channels.get(index)?;
        Some(ChannelView {
            uid: c.uid,
            label: c.label.clone(),
            enabled: c.enabled,
            cue: c.cue,
            arm: c.arm,
            crossfade_group: c.crossfade_group,
            fader: c.fader,
            patterns: (!c.is_bus).then(|| PatternState {
                count: c.patterns.len(),
                active: c.active_pattern,
                next: c.next_pattern,
                focused: c.focused_pattern,
            }),
        })
    }

    fn focused_channel(&self) -> Option<usize> {
        self.focused_channel
    }

    fn focus_channel(&mut self, index: usize) -> Result<()> {
        self.channel_mut(index)?;
        if self.focused_channel != Some(index) {
            self.focused_channel = Some(index);
            self.model_event(ModelEvent::FocusedChannelChanged);
        }
        Ok(())
    }

    fn toggle_channel_flag(&mut self, index: usize, flag: ChannelFlag) -> Result<()> {
        let channel = self.channel_mut(index)?;
        let value = match flag {
            ChannelFlag::Enabled => &mut channel.enabled,
            ChannelFlag::Cue => &mut channel.cue,
            ChannelFlag::Arm => &mut channel.arm,
        };
        *value = !*value;
        self.model_event(ModelEvent::ChannelFlagChanged { index, flag });
        Ok(())
    }

    fn cycle_crossfade_group(&mut self, index: usize) -> Result<()> {
        let channel = self.channel_mut(index)?;
        channel.crossfade_group = channel.crossfade_group.next();
        self.model_event(ModelEvent::CrossfadeGroupChanged { index });
        Ok(())
    }

    fn set_channel_fader(&mut self, index: usize, value: Normal) -> Result<()> {
        self.channel_mut(index)?.fader = value;
        Ok(())
    }

    fn set_master_fader(&mut self, value: Normal) {
        self.master_fader = value;
    }

    fn focus_pattern(&mut self, index: usize, pattern: usize) -> Result<()> {
        let channel = self.pattern_channel_mut(index)?;
        if pattern >= channel.patterns.len() {
            return Err(anyhow!("channel {index} has no pattern {pattern}"));
        }
        if channel.focused_pattern != pattern {
            channel.focused_pattern = pattern;
            self.model_event(ModelEvent::PatternFocusChanged { index });
        }
        Ok(())
    }

    fn go_pattern(&mut self, index: usize, pattern: usize) -> Result<()> {
        let channel = self.pattern_channel_mut(index)?;
        if pattern >= channel.patterns.len() {
            return Err(anyhow!("channel {index} has no pattern {pattern}"));
        }
        if channel.active_pattern != Some(pattern) {
            channel.next_pattern = Some(pattern);
            self.model_event(ModelEvent::ActivePatternChanged { index });
        }
        Ok(())
    }

    fn clip(&self, index: usize, slot: usize) -> Option<ClipState> {
        self.channels.get(index)?.clips.get(&slot).copied()
    }

    fn add_clip(&mut self, index: usize, slot: usize) -> Result<()> {
        let channel = self.channel_mut(index)?;
        if channel.clips.contains_key(&slot) {
            return Err(anyhow!("channel {index} already has a clip at {slot}"));
        }
        channel.clips.insert(slot, ClipState::default());
        self.model_event(ModelEvent::ClipAdded { index, slot });
        Ok(())
    }

    fn trigger_clip(&mut self, index: usize, slot: usize) -> Result<()> {
        let clip = self
            .channel_mut(index)?
            .clips
            .get_mut(&slot)
            .ok_or_else(|| anyhow!("channel {index} has no clip at {slot}"))?;
        clip.running = true;
        self.model_event(ModelEvent::ClipStateChanged { index, slot });
        Ok(())
    }

    fn stop_clip(&mut self, index: usize, slot: usize) -> Result<()> {
        let clip = self
            .channel_mut(index)?
            .clips
            .get_mut(&slot)
            .ok_or_else(|| anyhow!("channel {index} has no clip at {slot}"))?;
        clip.running = false;
        self.model_event(ModelEvent::ClipStateChanged { index, slot });
        Ok(())
    }

    fn focus_clip(&mut self, index: usize, slot: usize) -> Result<()> {
        self.channel_mut(index)?.focused_clip = Some(slot);
        Ok(())
    }

    fn launch_scene(&mut self, scene: usize) -> Result<()> {
        self.scenes_launched.push(scene);
        Ok(())
    }

    fn stop_all_clips(&mut self) {
        self.stop_all_count += 1;
        let mut stopped = Vec::default();
        for (index, channel) in self.channels.iter_mut().enumerate() {
            for (slot, clip) in channel.clips.iter_mut() {
                if clip.running {
                    clip.running = false;
                    stopped.push((index, *slot));
                }
            }
        }
        for (index, slot) in stopped {
            self.model_event(ModelEvent::ClipStateChanged { index, slot });
        }
    }

    fn focused_device(&self) -> Option<DeviceUid> {
        let channel = self.channels.get(self.focused_channel?)?;
        channel.device_chain().first().copied()
    }

    fn adjacent_device(&self, device: DeviceUid, direction: Direction) -> Option<DeviceUid> {
        self.channels.iter().find_map(|channel| {
            let chain = channel.device_chain();
            let position = chain.iter().position(|d| *d == device)?;
            direction
                .step(position, chain.len())
                .and_then(|i| chain.get(i).copied())
        })
    }
}
impl Devices for MemoryHost {
    fn remote_controls(&self, device: DeviceUid) -> Option<Vec<Option<ParameterUid>>> {
        self.devices.get(&device).cloned()
    }

    fn remote_control(&self, parameter: ParameterUid) -> Option<RemoteControl> {
        self.parameters.get(&parameter).cloned()
    }

    fn set_parameter(&mut self, parameter: ParameterUid, value: Normal) -> Result<()> {
        let control = self
            .parameters
            .get_mut(&parameter)
            .ok_or_else(|| anyhow!("unknown parameter {parameter}"))?;
        control.value = value;
        self.model_event(ModelEvent::ParameterChanged { parameter });
        Ok(())
    }

    fn reset_parameter(&mut self, parameter: ParameterUid) -> Result<()> {
        let control = self
            .parameters
            .get_mut(&parameter)
            .ok_or_else(|| anyhow!("unknown parameter {parameter}"))?;
        control.value = control.default;
        self.model_event(ModelEvent::ParameterChanged { parameter });
        Ok(())
    }
}
impl ModulationHost for MemoryHost {
    fn add_modulator(&mut self, scope: ModulationScope, spec: &ModulatorSpec) -> Result<ModulatorUid> {
        if let ModulationScope::Device(device) = scope {
            if !self.devices.contains_key(&device) {
                return Err(anyhow!("unknown device {device}"));
            }
        }
        let uid = self.modulator_uids.mint_next();
        self.insert_modulator(uid, scope, spec.clone());
        Ok(uid)
    }

    fn remove_modulator(&mut self, uid: ModulatorUid) -> Result<()> {
        if !self.modulators.contains_key(&uid) {
            return Err(anyhow!("unknown modulator {uid}"));
        }
        for modulation in self.modulations_from_source(uid) {
            self.remove_modulation(modulation)?;
        }
        if let Some(modulator) = self.modulators.remove(&uid) {
            self.modulation_event(ModulationEvent::ModulatorRemoved {
                uid,
                scope: modulator.info.scope,
            });
        }
        Ok(())
    }

    fn modulator(&self, uid: ModulatorUid) -> Option<ModulatorInfo> {
        self.modulators.get(&uid).map(|m| m.info.clone())
    }

    fn global_modulators(&self) -> Vec<ModulatorInfo> {
        let mut modulators: Vec<ModulatorInfo> = self
            .modulators
            .values()
            .filter(|m| m.info.scope == ModulationScope::Global)
            .map(|m| m.info.clone())
            .collect();
        modulators.sort_by_key(|m| m.uid.0);
        modulators
    }

    fn add_modulation(&mut self, source: ModulatorUid, target: ParameterUid) -> Result<ModulationUid> {
        if !self.modulators.contains_key(&source) {
            return Err(anyhow!("unknown modulator {source}"));
        }
        let control = self
            .parameters
            .get(&target)
            .ok_or_else(|| anyhow!("unknown parameter {target}"))?;
        if !control.modulatable {
            return Err(anyhow!("parameter {} can't be modulated", control.label));
        }
        let uid = self.modulation_uids.mint_next();
        self.modulations.push(ModulationInfo {
            uid,
            source,
            target,
            range: BipolarNormal::default(),
        });
        self.modulation_event(ModulationEvent::ModulationAdded {
            uid,
            source,
            target,
        });
        Ok(uid)
    }

    fn remove_modulation(&mut self, uid: ModulationUid) -> Result<()> {
        let position = self
            .modulations
            .iter()
            .position(|m| m.uid == uid)
            .ok_or_else(|| anyhow!("unknown modulation {uid}"))?;
        let removed = self.modulations.remove(position);
        self.modulation_event(ModulationEvent::ModulationRemoved {
            uid,
            source: removed.source,
            target: removed.target,
        });
        Ok(())
    }

    fn modulation(&self, uid: ModulationUid) -> Option<ModulationInfo> {
        self.modulations.iter().find(|m| m.uid == uid).copied()
    }

    fn modulations_of_target(&self, target: ParameterUid) -> Vec<ModulationUid> {
        self.modulations
            .iter()
            .filter(|m| m.target == target)
            .map(|m| m.uid)
            .collect()
    }

    fn modulations_from_source(&self, source: ModulatorUid) -> Vec<ModulationUid> {
        self.modulations
            .iter()
            .filter(|m| m.source == source)
            .map(|m| m.uid)
            .collect()
    }

    fn set_modulation_range(&mut self, uid: ModulationUid, range: BipolarNormal) -> Result<()> {
        let modulation = self
            .modulations
            .iter_mut()
            .find(|m| m.uid == uid)
            .ok_or_else(|| anyhow!("unknown modulation {uid}"))?;
        modulation.range = range;
        let target = modulation.target;
        self.modulation_event(ModulationEvent::ModulationRangeChanged { uid, target });
        Ok(())
    }

    fn reset_modulation_range(&mut self, uid: ModulationUid) -> Result<()> {
        self.set_modulation_range(uid, BipolarNormal::default())
    }
}
