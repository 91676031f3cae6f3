// Copyright (c) 2024 Mike Tsao

use super::{
    error::BindingError,
    proxy::{BindingProxy, BindingState},
    settings::BindingSettings,
    slots::{GlobalSlotRegistry, OWNERSHIP_PREFIX},
    template::Template,
};
use crate::{
    model::{Devices, ModelEvent, ModulationEvent, ModulationHost, ModulationScope, ModulatorSpec},
    types::{BipolarNormal, DeviceUid, ModulationUid, ModulatorUid, Normal, ParameterUid, SourceId, SubscriberId, TempoDivision},
    util::Subscribers,
};
use crossbeam::channel::Receiver;
use rustc_hash::FxHashMap;

/// Something the engine tells its subscribers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineEvent {
    /// The hold state changed.
    StateChanged(bool),
    /// The selected template or the global slot table changed.
    TemplatesChanged,
    /// One proxy's edge or its range changed.
    BindingChanged {
        #[allow(missing_docs)]
        device: DeviceUid,
        #[allow(missing_docs)]
        index: usize,
    },
    /// Every proxy of the device was rebuilt or dropped.
    BindingsReplaced {
        #[allow(missing_docs)]
        device: DeviceUid,
    },
    /// The engine is going away. Subscribers should let go of it.
    WillDispose,
}

/// How a touch moves a proxy's value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchValue {
    /// Move by this much, in normalized units.
    Delta(f64),
    /// Jump to this value.
    Absolute(Normal),
}

/// A plugin that supplies the modulator the engine synthesizes for an unbound
/// proxy. The first registered source that answers wins.
pub trait ModulatorSource: core::fmt::Debug {
    /// Returns the modulator to build for a new binding named `label`, or
    /// [None] to defer.
    fn create_modulator(
        &self,
        label: &str,
        template: Template,
        tempo: TempoDivision,
    ) -> Option<ModulatorSpec>;
}

/// The proxies of one device, aligned with its remote-control list.
#[derive(Debug, Default)]
struct DeviceBindings {
    controls: Vec<Option<ParameterUid>>,
    proxies: Vec<Option<BindingProxy>>,
}

/// Owns a binding proxy for every modulatable remote control of the devices
/// it has been asked about, creates modulators and edges on first touch, and
/// tears down only what it created.
#[derive(Debug, Default)]
pub struct BindingEngine {
    settings: BindingSettings,
    template: Template,
    is_mod: bool,
    devices: FxHashMap<DeviceUid, DeviceBindings>,
    slots: GlobalSlotRegistry,
    sources: Vec<(SourceId, Box<dyn ModulatorSource>)>,
    subscribers: Subscribers<EngineEvent>,
    is_disposed: bool,
}
impl BindingEngine {
    #[allow(missing_docs)]
    pub fn new_with(settings: BindingSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &BindingSettings {
        &self.settings
    }

    #[allow(missing_docs)]
    pub fn settings_mut(&mut self) -> &mut BindingSettings {
        &mut self.settings
    }

    fn check_live(&self) -> Result<(), BindingError> {
        if self.is_disposed {
            log::error!(target: "binding", "binding engine used after dispose");
            return Err(BindingError::Disposed);
        }
        Ok(())
    }

    fn notify(&mut self, event: EngineEvent) {
        self.subscribers.broadcast(event);
    }

    /// Registers a subscriber.
    pub fn subscribe(&mut self, id: SubscriberId) -> Result<Receiver<EngineEvent>, BindingError> {
        self.check_live()?;
        self.subscribers.subscribe(id).map_err(|e| {
            log::error!(target: "binding", "{e}");
            e.into()
        })
    }

    /// Registers a subscriber and queues the current state for it.
    pub fn subscribe_immediately(
        &mut self,
        id: SubscriberId,
    ) -> Result<Receiver<EngineEvent>, BindingError> {
        let receiver = self.subscribe(id)?;
        self.subscribers
            .send_to(id, EngineEvent::StateChanged(self.is_mod))?;
        self.subscribers.send_to(id, EngineEvent::TemplatesChanged)?;
        Ok(receiver)
    }

    /// Releases a subscriber.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> Result<(), BindingError> {
        self.subscribers.unsubscribe(id).map_err(|e| {
            log::error!(target: "binding", "{e}");
            e.into()
        })
    }

    /// Registers a modulator source.
    pub fn add_source(
        &mut self,
        id: SourceId,
        source: Box<dyn ModulatorSource>,
    ) -> Result<(), BindingError> {
        self.check_live()?;
        if self.sources.iter().any(|(existing, _)| *existing == id) {
            log::error!(target: "binding", "modulator source {id} registered twice");
            return Err(BindingError::DuplicateSource(id));
        }
        self.sources.push((id, source));
        Ok(())
    }

    /// Unregisters a modulator source.
    pub fn remove_source(&mut self, id: SourceId) -> Result<(), BindingError> {
        let before = self.sources.len();
        self.sources.retain(|(existing, _)| *existing != id);
        if self.sources.len() == before {
            log::error!(target: "binding", "modulator source {id} was never registered");
            return Err(BindingError::UnknownSource(id));
        }
        Ok(())
    }

    /// Whether a binding hold is asserted.
    pub fn is_mod(&self) -> bool {
        self.is_mod
    }

    /// Records whether a binding hold is asserted.
    pub fn set_mod_state(&mut self, is_mod: bool) {
        if self.is_disposed || self.is_mod == is_mod {
            return;
        }
        self.is_mod = is_mod;
        self.notify(EngineEvent::StateChanged(is_mod));
    }

    /// The template the next synthesized modulator is built from.
    pub fn template(&self) -> Template {
        self.template
    }

    /// Selects a template. The column is clamped to the matrix.
    pub fn set_template(&mut self, column: usize, variant: usize) {
        if self.is_disposed {
            return;
        }
        self.template = Template::new(column, variant);
        log::debug!(target: "binding", "template {} selected", self.template);
        self.notify(EngineEvent::TemplatesChanged);
    }

    /// Whether a global modulator occupies the column's slot.
    pub fn is_template_global(&self, column: usize) -> bool {
        self.slots.is_occupied(column)
    }

    /// The global slot table.
    pub fn slots(&self) -> &GlobalSlotRegistry {
        &self.slots
    }

    /// Rebuilds the slot table from the host's global modulators.
    pub fn sync_global_slots<H: ModulationHost + ?Sized>(&mut self, host: &H) {
        let modulators = host.global_modulators();
        if self
            .slots
            .rebuild(modulators.iter().map(|m| (m.uid, m.label.as_str())))
        {
            self.notify(EngineEvent::TemplatesChanged);
        }
    }

    /// Brings the device's proxies in line with its remote-control list. A
    /// changed length rebuilds everything; otherwise only positions whose
    /// control changed are rebuilt.
    pub fn refresh<H: Devices + ModulationHost + ?Sized>(
        &mut self,
        host: &H,
        device: DeviceUid,
    ) -> Result<&[Option<BindingProxy>], BindingError> {
        self.check_live()?;
        let Some(controls) = host.remote_controls(device) else {
            if self.devices.remove(&device).is_some() {
                self.notify(EngineEvent::BindingsReplaced { device });
            }
            return Err(BindingError::UnknownDevice(device));
        };

        let bindings = self.devices.entry(device).or_default();
        let mut changed = Vec::default();
        if bindings.controls.len() != controls.len() {
            bindings.proxies = controls.iter().map(|c| Self::new_proxy(host, *c)).collect();
            bindings.controls = controls;
            changed.push(None);
        } else {
            for (index, control) in controls.into_iter().enumerate() {
                if bindings.controls[index] != control {
                    bindings.proxies[index] = Self::new_proxy(host, control);
                    bindings.controls[index] = control;
                    changed.push(Some(index));
                }
            }
        }
        for index in changed {
            self.notify(match index {
                Some(index) => EngineEvent::BindingChanged { device, index },
                None => EngineEvent::BindingsReplaced { device },
            });
        }
        Ok(self.proxies(device).unwrap_or_default())
    }

    fn new_proxy<H: Devices + ModulationHost + ?Sized>(
        host: &H,
        control: Option<ParameterUid>,
    ) -> Option<BindingProxy> {
        let control = host.remote_control(control?)?;
        if !control.modulatable {
            return None;
        }
        let edge = host.modulations_of_target(control.uid).first().copied();
        Some(BindingProxy::new(control.uid, control.label, edge))
    }

    /// The device's proxies as of the last refresh.
    pub fn proxies(&self, device: DeviceUid) -> Option<&[Option<BindingProxy>]> {
        self.devices
            .get(&device)
            .map(|bindings| bindings.proxies.as_slice())
    }

    #[allow(missing_docs)]
    pub fn proxy(&self, device: DeviceUid, index: usize) -> Option<&BindingProxy> {
        self.devices.get(&device)?.proxies.get(index)?.as_ref()
    }

    fn proxy_mut(&mut self, device: DeviceUid, index: usize) -> Option<&mut BindingProxy> {
        self.devices.get_mut(&device)?.proxies.get_mut(index)?.as_mut()
    }

    /// Classifies the proxy at `index`. A missing proxy is unbound.
    pub fn classify<H: ModulationHost + ?Sized>(
        &self,
        host: &H,
        device: DeviceUid,
        index: usize,
    ) -> BindingState {
        self.proxy(device, index)
            .map_or(BindingState::Unbound, |proxy| proxy.state(host))
    }

    /// Writes to a proxy. An unbound proxy first gets a modulator and an edge:
    /// the global slot's modulator for the current template column if there is
    /// one, otherwise a new running modulator local to the device.
    pub fn touch<H: ModulationHost + ?Sized>(
        &mut self,
        host: &mut H,
        device: DeviceUid,
        index: usize,
        value: TouchValue,
    ) -> Result<BindingState, BindingError> {
        self.check_live()?;
        let proxy = self
            .proxy(device, index)
            .ok_or(BindingError::NoProxy { device, index })?;
        let target = proxy.target();
        let label = proxy.label().to_string();
        let edge = match proxy.live_edge(host) {
            Some(edge) => edge,
            None => {
                let edge = self.bind(host, device, target, &label)?;
                if let Some(proxy) = self.proxy_mut(device, index) {
                    proxy.set_edge(Some(edge));
                }
                edge
            }
        };

        let current = host
            .modulation(edge)
            .map_or(Normal::CENTER, |m| Normal::from(m.range));
        let next = match value {
            TouchValue::Delta(delta) => current.nudged(delta),
            TouchValue::Absolute(value) => value,
        };
        let result = host
            .set_modulation_range(edge, BipolarNormal::from(next))
            .map_err(BindingError::host);
        self.notify(EngineEvent::BindingChanged { device, index });
        result?;
        Ok(self.classify(host, device, index))
    }

    fn bind<H: ModulationHost + ?Sized>(
        &self,
        host: &mut H,
        device: DeviceUid,
        target: ParameterUid,
        label: &str,
    ) -> Result<ModulationUid, BindingError> {
        let (source, synthesized) = match self.slots.occupant(self.template.column()) {
            Some(global) => (global, false),
            None => {
                let spec = self.modulator_spec(label);
                let uid = host
                    .add_modulator(ModulationScope::Device(device), &spec)
                    .map_err(|e| {
                        log::error!(target: "binding", "couldn't create {}: {e}", spec.label);
                        BindingError::ModulatorRejected {
                            label: spec.label.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                log::info!(target: "binding", "created modulator {} for {label}", spec.label);
                (uid, true)
            }
        };
        host.add_modulation(source, target).map_err(|e| {
            log::error!(target: "binding", "couldn't modulate {label}: {e}");
            if synthesized {
                if let Err(e) = host.remove_modulator(source) {
                    log::error!(target: "binding", "couldn't roll back modulator for {label}: {e}");
                }
            }
            BindingError::EdgeRejected {
                target,
                reason: e.to_string(),
            }
        })
    }

    fn modulator_spec(&self, target_label: &str) -> ModulatorSpec {
        let label = format!("{OWNERSHIP_PREFIX}{target_label}");
        let tempo = self.settings.tempo_division(self.template.column());
        let mut spec = self
            .sources
            .iter()
            .find_map(|(_, source)| source.create_modulator(&label, self.template, tempo))
            .unwrap_or_else(|| ModulatorSpec {
                label,
                tempo,
                waveshape: self.template.waveshape(),
                running: true,
            });
        spec.running = true;
        spec
    }

    /// Undoes a proxy's binding. A self-owned edge is deleted, along with its
    /// modulator if that modulator is local to a device and nothing else uses
    /// it. A foreign edge only has its range reset.
    pub fn clear<H: ModulationHost + ?Sized>(
        &mut self,
        host: &mut H,
        device: DeviceUid,
        index: usize,
    ) -> Result<(), BindingError> {
        self.check_live()?;
        let Some(proxy) = self.proxy(device, index) else {
            return Ok(());
        };
        let Some(edge) = proxy.edge() else {
            return Ok(());
        };
        match proxy.state(host) {
            BindingState::Unbound => {
                if let Some(proxy) = self.proxy_mut(device, index) {
                    proxy.set_edge(None);
                }
            }
            BindingState::SelfOwned => {
                let source = host.modulation(edge).map(|m| m.source);
                host.remove_modulation(edge).map_err(BindingError::host)?;
                if let Some(proxy) = self.proxy_mut(device, index) {
                    proxy.set_edge(None);
                }
                if let Some(source) = source {
                    self.release_modulator(host, source)?;
                }
            }
            BindingState::Foreign => {
                host.reset_modulation_range(edge)
                    .map_err(BindingError::host)?;
            }
        }
        self.notify(EngineEvent::BindingChanged { device, index });
        Ok(())
    }

    fn release_modulator<H: ModulationHost + ?Sized>(
        &self,
        host: &mut H,
        source: ModulatorUid,
    ) -> Result<(), BindingError> {
        let Some(modulator) = host.modulator(source) else {
            return Ok(());
        };
        if matches!(modulator.scope, ModulationScope::Device(_))
            && host.modulations_from_source(source).is_empty()
        {
            host.remove_modulator(source).map_err(BindingError::host)?;
            log::info!(target: "binding", "removed modulator {}", modulator.label);
        }
        Ok(())
    }

    fn proxies_matching(&self, mut predicate: impl FnMut(&BindingProxy) -> bool) -> Vec<(DeviceUid, usize)> {
        let mut matches = Vec::default();
        for (device, bindings) in self.devices.iter() {
            for (index, proxy) in bindings.proxies.iter().enumerate() {
                if proxy.as_ref().is_some_and(&mut predicate) {
                    matches.push((*device, index));
                }
            }
        }
        matches
    }

    /// Follows a change in the host's modulation graph.
    pub fn handle_modulation_event(&mut self, event: &ModulationEvent) {
        if self.is_disposed {
            return;
        }
        match event {
            ModulationEvent::ModulatorAdded {
                uid,
                scope: ModulationScope::Global,
                label,
            }
            | ModulationEvent::ModulatorRelabeled {
                uid,
                scope: ModulationScope::Global,
                label,
            } => {
                if self.slots.update(*uid, label) {
                    log::debug!(target: "binding", "global modulator {label} changed the slot table");
                    self.notify(EngineEvent::TemplatesChanged);
                }
            }
            ModulationEvent::ModulatorRemoved {
                uid,
                scope: ModulationScope::Global,
            } => {
                if self.slots.remove(*uid) {
                    self.notify(EngineEvent::TemplatesChanged);
                }
            }
            ModulationEvent::ModulationAdded { uid, target, .. } => {
                for (device, index) in
                    self.proxies_matching(|p| p.target() == *target && p.edge().is_none())
                {
                    if let Some(proxy) = self.proxy_mut(device, index) {
                        proxy.set_edge(Some(*uid));
                    }
                    self.notify(EngineEvent::BindingChanged { device, index });
                }
            }
            ModulationEvent::ModulationRemoved { uid, .. } => {
                for (device, index) in self.proxies_matching(|p| p.edge() == Some(*uid)) {
                    if let Some(proxy) = self.proxy_mut(device, index) {
                        proxy.set_edge(None);
                    }
                    self.notify(EngineEvent::BindingChanged { device, index });
                }
            }
            ModulationEvent::ModulationRangeChanged { uid, .. } => {
                for (device, index) in self.proxies_matching(|p| p.edge() == Some(*uid)) {
                    self.notify(EngineEvent::BindingChanged { device, index });
                }
            }
            _ => {}
        }
    }

    /// Follows device changes in the host model.
    pub fn handle_model_event<H: Devices + ModulationHost + ?Sized>(
        &mut self,
        host: &H,
        event: &ModelEvent,
    ) {
        if self.is_disposed {
            return;
        }
        match event {
            ModelEvent::DeviceRemoved { device } => {
                if self.devices.remove(device).is_some() {
                    self.notify(EngineEvent::BindingsReplaced { device: *device });
                }
            }
            ModelEvent::RemoteControlsChanged { device } => {
                if self.devices.contains_key(device) {
                    if let Err(e) = self.refresh(host, *device) {
                        log::warn!(target: "binding", "couldn't refresh device {device}: {e}");
                    }
                }
            }
            _ => {}
        }
    }

    /// Tells subscribers the engine is going away, then drops every proxy and
    /// subscriber. Later mutating calls fail with [BindingError::Disposed].
    pub fn dispose(&mut self) {
        if self.is_disposed {
            return;
        }
        self.notify(EngineEvent::WillDispose);
        self.subscribers.clear();
        self.devices.clear();
        self.sources.clear();
        self.is_disposed = true;
    }

    #[allow(missing_docs)]
    pub fn is_disposed(&self) -> bool {
        self.is_disposed
    }
}
