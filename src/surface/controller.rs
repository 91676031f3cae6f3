// Copyright (c) 2024 Mike Tsao

use super::{
    address::{
        grid_coordinates, grid_note, indicator_index, indicator_note, parameter_cell,
        parameter_note, template_cell, template_note, ParameterRole, ARM_MODE, CHANNEL_BUTTON_COUNT,
        CHANNEL_BUTTON_FIRST, CUE_MODE, ENABLED_MODE, FOCUS_MODE, GRID_COLUMNS, GRID_LAST,
        GRID_ROWS, INDICATOR_COUNT, PARAMETER_COUNT, SELECT, SELECT_DOWN, SELECT_LEFT,
        SELECT_RIGHT, SELECT_UP, TEMPLATE_ROWS, TOGGLE_CLIPS, TOGGLE_PARAMETERS,
    },
    input::{Fader, SurfaceInput, Zone},
    led::{PerimeterLed, SurfaceLed},
    settings::{ParameterGridTarget, ShiftNavigation, SurfaceSettings},
};
use crate::{
    binding::{BindingEngine, BindingError, BindingState, EngineEvent, Template, TouchValue},
    model::{
        ChannelFlag, Direction, Host, ModelEvent, Nudge, ParameterKind,
        PatternState,
    },
    types::{
        ChannelUid, DeviceUid, MidiChannel, MidiMessage, MidiMessagesFn, Normal, ParameterUid,
        SubscriberId,
    },
};
use crossbeam::channel::Receiver;
use delegate::delegate;
use rustc_hash::FxHashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// What the 8x8 grid shows when the binding overlay isn't up.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum GridMode {
    /// One column per channel, one row per pattern.
    #[default]
    Patterns,
    /// One column per channel, one row per clip slot.
    Clips,
    /// Increment/decrement/reset stacks for the followed device's remote
    /// controls.
    Parameters,
}

/// What the row of channel buttons does.
#[derive(Clone, Copy, Debug, Default, Display, EnumIter, Eq, PartialEq)]
pub enum ChannelButtonMode {
    /// Focus and select the channel.
    #[default]
    Focus,
    #[allow(missing_docs)]
    Enabled,
    #[allow(missing_docs)]
    Cue,
    #[allow(missing_docs)]
    Arm,
    /// Cycle the crossfade group.
    CrossfadeGroup,
}
impl ChannelButtonMode {
    /// The shifted channel button that selects this mode, if there is one.
    pub fn shifted_code(&self) -> Option<u8> {
        match self {
            ChannelButtonMode::Focus => Some(FOCUS_MODE),
            ChannelButtonMode::Enabled => Some(ENABLED_MODE),
            ChannelButtonMode::Cue => Some(CUE_MODE),
            ChannelButtonMode::Arm => Some(ARM_MODE),
            ChannelButtonMode::CrossfadeGroup => None,
        }
    }

    /// The mode a shifted channel button selects.
    pub fn from_shifted_code(code: u8) -> Option<Self> {
        Self::iter().find(|mode| mode.shifted_code() == Some(code))
    }

    /// The channel flag this mode toggles.
    pub fn flag(&self) -> Option<ChannelFlag> {
        match self {
            ChannelButtonMode::Enabled => Some(ChannelFlag::Enabled),
            ChannelButtonMode::Cue => Some(ChannelFlag::Cue),
            ChannelButtonMode::Arm => Some(ChannelFlag::Arm),
            ChannelButtonMode::Focus | ChannelButtonMode::CrossfadeGroup => None,
        }
    }
}

/// What a surface operates on during one call: the host, and the binding
/// engine if there is one.
pub struct SurfaceContext<'a> {
    #[allow(missing_docs)]
    pub host: &'a mut dyn Host,
    #[allow(missing_docs)]
    pub engine: Option<&'a mut BindingEngine>,
}
impl<'a> SurfaceContext<'a> {
    #[allow(missing_docs)]
    pub fn new(host: &'a mut dyn Host, engine: Option<&'a mut BindingEngine>) -> Self {
        Self { host, engine }
    }
}

fn send_led(midi_messages_fn: &mut MidiMessagesFn, note: u8, led: SurfaceLed) {
    let (channel, message) = led.message(note);
    midi_messages_fn(channel, message);
}

fn send_perimeter(
    midi_messages_fn: &mut MidiMessagesFn,
    code: u8,
    led: PerimeterLed,
    channel: MidiChannel,
) {
    let (channel, message) = led.message(code, channel);
    midi_messages_fn(channel, message);
}

fn report(result: anyhow::Result<()>, action: &str) {
    if let Err(e) = result {
        log::warn!(target: "surface", "{action} failed: {e}");
    }
}

/// The grid surface state machine. It turns button and fader input into host
/// and binding-engine edits, and turns host and engine notifications into
/// LED messages, re-rendering only the region each change affects.
#[derive(Debug)]
pub struct SurfaceController {
    id: SubscriberId,
    settings: SurfaceSettings,
    grid_mode: GridMode,
    shift: bool,
    channel_button_mode: ChannelButtonMode,
    is_enabled: bool,

    // The device the parameter grid and the indicators follow, and the first
    // remote controls of it.
    device: Option<DeviceUid>,
    knobs: Vec<Option<ParameterUid>>,

    focus_offsets: FxHashMap<ChannelUid, usize>,
    held_template: Option<u8>,
    engine_events: Option<Receiver<EngineEvent>>,
}
impl SurfaceController {
    /// Creates a disabled surface. `id` is the handle it subscribes to a
    /// binding engine with.
    pub fn new_with(id: SubscriberId, settings: SurfaceSettings) -> Self {
        Self {
            id,
            settings,
            grid_mode: Default::default(),
            shift: false,
            channel_button_mode: Default::default(),
            is_enabled: false,
            device: None,
            knobs: Vec::default(),
            focus_offsets: Default::default(),
            held_template: None,
            engine_events: None,
        }
    }

    delegate! {
        to self.settings {
            #[allow(missing_docs)]
            pub fn master_fader_enabled(&self) -> bool;
            #[allow(missing_docs)]
            pub fn channel_faders_enabled(&self) -> bool;
            #[allow(missing_docs)]
            pub fn binding_mode_enabled(&self) -> bool;
            #[allow(missing_docs)]
            pub fn parameter_grid_target(&self) -> ParameterGridTarget;
        }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &SurfaceSettings {
        &self.settings
    }

    /// Settings that take effect on the next input. Use
    /// [set_binding_mode_enabled](Self::set_binding_mode_enabled) and
    /// [set_parameter_grid_target](Self::set_parameter_grid_target) for the
    /// ones that change what the grid shows.
    pub fn settings_mut(&mut self) -> &mut SurfaceSettings {
        &mut self.settings
    }

    #[allow(missing_docs)]
    pub fn grid_mode(&self) -> GridMode {
        self.grid_mode
    }

    #[allow(missing_docs)]
    pub fn is_shifted(&self) -> bool {
        self.shift
    }

    #[allow(missing_docs)]
    pub fn channel_button_mode(&self) -> ChannelButtonMode {
        self.channel_button_mode
    }

    #[allow(missing_docs)]
    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// The device the parameter grid and indicators follow.
    pub fn device(&self) -> Option<DeviceUid> {
        self.device
    }

    /// Whether the surface is subscribed to a binding engine.
    pub fn is_attached(&self) -> bool {
        self.engine_events.is_some()
    }

    /// The first row of patterns the channel's grid column shows.
    pub fn focus_offset(&self, channel: ChannelUid) -> usize {
        self.focus_offsets.get(&channel).copied().unwrap_or_default()
    }

    fn is_overlay_active(&self) -> bool {
        self.settings.binding_mode_enabled && self.engine_events.is_some()
    }

    fn shows(&self, mode: GridMode) -> bool {
        !self.is_overlay_active() && self.grid_mode == mode
    }

    /// Subscribes to the context's binding engine and syncs its global slots.
    pub fn attach(
        &mut self,
        ctx: &mut SurfaceContext,
        midi_messages_fn: &mut MidiMessagesFn,
    ) -> Result<(), BindingError> {
        let Some(engine) = ctx.engine.as_deref_mut() else {
            return Ok(());
        };
        let receiver = engine.subscribe(self.id)?;
        engine.sync_global_slots(&*ctx.host);
        self.engine_events = Some(receiver);
        if self.is_enabled {
            self.load_device(ctx, midi_messages_fn);
            self.send_grid(ctx, midi_messages_fn);
        }
        self.poll_engine(ctx, midi_messages_fn);
        Ok(())
    }

    /// Unsubscribes from the context's binding engine.
    pub fn detach(&mut self, ctx: &mut SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        if self.engine_events.take().is_none() {
            return;
        }
        if let Some(engine) = ctx.engine.as_deref_mut() {
            engine.set_mod_state(false);
            let _ = engine.unsubscribe(self.id);
        }
        self.held_template = None;
        if self.is_enabled {
            self.send_grid(ctx, midi_messages_fn);
        }
    }

    /// Turns the surface on (full render) or off (everything dark).
    pub fn set_enabled(
        &mut self,
        ctx: &mut SurfaceContext,
        enabled: bool,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if self.is_enabled == enabled {
            return;
        }
        self.is_enabled = enabled;
        log::info!(
            target: "surface",
            "surface {} (supermod {})",
            if enabled { "enabled" } else { "disabled" },
            crate::app_version()
        );
        if enabled {
            for index in 0..ctx.host.channel_count() {
                self.scroll_to_focus(ctx, index);
            }
            self.device = ctx.host.focused_device();
            self.load_device(ctx, midi_messages_fn);
            self.send_all(ctx, midi_messages_fn);
        } else {
            self.shift = false;
            self.held_template = None;
            self.device = None;
            self.knobs.clear();
            Self::clear_surface(midi_messages_fn);
        }
    }

    /// Re-sends every LED, for a surface that was unplugged and came back.
    pub fn reconnect(&mut self, ctx: &mut SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        if self.is_enabled {
            self.send_all(ctx, midi_messages_fn);
        }
    }

    /// Shows or hides the binding overlay.
    pub fn set_binding_mode_enabled(
        &mut self,
        ctx: &mut SurfaceContext,
        enabled: bool,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if self.settings.binding_mode_enabled == enabled {
            return;
        }
        self.settings.set_binding_mode_enabled(enabled);
        self.held_template = None;
        if let Some(engine) = ctx.engine.as_deref_mut() {
            engine.set_mod_state(false);
        }
        if self.is_enabled {
            self.send_mode_buttons(midi_messages_fn);
            self.send_grid(ctx, midi_messages_fn);
        }
    }

    /// Switches what the parameter grid edits.
    pub fn set_parameter_grid_target(
        &mut self,
        ctx: &mut SurfaceContext,
        target: ParameterGridTarget,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        self.settings.set_parameter_grid_target(target);
        if self.is_enabled && self.shows(GridMode::Parameters) {
            self.send_parameters(ctx, midi_messages_fn);
        }
    }

    /// Shows a grid mode.
    pub fn set_grid_mode(
        &mut self,
        ctx: &mut SurfaceContext,
        mode: GridMode,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if self.grid_mode == mode {
            return;
        }
        self.grid_mode = mode;
        log::debug!(target: "surface", "grid mode {mode}");
        if self.is_enabled {
            self.send_mode_buttons(midi_messages_fn);
            self.send_grid(ctx, midi_messages_fn);
        }
    }

    fn toggle_grid_mode(
        &mut self,
        ctx: &mut SurfaceContext,
        mode: GridMode,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        let next = if self.grid_mode == mode {
            GridMode::Patterns
        } else {
            mode
        };
        self.set_grid_mode(ctx, next, midi_messages_fn);
    }

    /// Handles raw MIDI from the surface.
    pub fn handle_midi_message(
        &mut self,
        ctx: &mut SurfaceContext,
        channel: MidiChannel,
        message: MidiMessage,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        match SurfaceInput::from_midi(channel, &message) {
            Some(input) => self.handle_input(ctx, input, midi_messages_fn),
            None => log::debug!(target: "surface", "ignoring {message:?}"),
        }
    }

    /// Handles one decoded input event.
    pub fn handle_input(
        &mut self,
        ctx: &mut SurfaceContext,
        input: SurfaceInput,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if !self.is_enabled {
            return;
        }
        match input {
            SurfaceInput::Button {
                code,
                pressed,
                channel,
            } => self.on_button(ctx, code, pressed, channel, midi_messages_fn),
            SurfaceInput::Control { code, value } => self.on_control(ctx, code, value),
        }
        self.poll_engine(ctx, midi_messages_fn);
    }

    fn on_button(
        &mut self,
        ctx: &mut SurfaceContext,
        code: u8,
        pressed: bool,
        channel: MidiChannel,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        let zone = match Zone::of(code) {
            Ok(zone) => zone,
            Err(e) => {
                log::warn!(target: "surface", "{e}");
                return;
            }
        };
        if self.is_overlay_active() && self.on_binding_button(ctx, code, pressed, midi_messages_fn)
        {
            return;
        }
        match zone {
            Zone::Shift => {
                self.shift = pressed;
                self.send_channel_button_row(ctx, midi_messages_fn);
                if !pressed {
                    // The momentary stop-all light shares 119 with the mode toggle.
                    self.send_mode_buttons(midi_messages_fn);
                }
            }
            Zone::Grid(note) => {
                if pressed {
                    self.on_grid_button(ctx, note);
                }
            }
            Zone::ChannelButton(_) if self.shift => {
                self.on_shifted_channel_button(ctx, code, pressed, channel, midi_messages_fn)
            }
            Zone::ChannelButton(index) => {
                if pressed {
                    self.on_channel_button(ctx, index);
                }
            }
            Zone::SceneLaunch(_) if self.shift => {
                if code <= SELECT {
                    send_perimeter(midi_messages_fn, code, PerimeterLed::lit(pressed), channel);
                }
            }
            Zone::SceneLaunch(scene) => {
                send_perimeter(midi_messages_fn, code, PerimeterLed::lit(pressed), channel);
                if pressed {
                    report(ctx.host.launch_scene(scene), "launching scene");
                }
            }
            Zone::ToggleClips if self.shift => {}
            Zone::ToggleClips => {
                if pressed {
                    self.toggle_grid_mode(ctx, GridMode::Clips, midi_messages_fn);
                }
            }
            Zone::ToggleParameters if self.shift => {
                send_perimeter(midi_messages_fn, code, PerimeterLed::lit(pressed), channel);
                if pressed {
                    ctx.host.stop_all_clips();
                }
            }
            Zone::ToggleParameters => {
                if pressed {
                    self.toggle_grid_mode(ctx, GridMode::Parameters, midi_messages_fn);
                }
            }
        }
    }

    // Returns true if the overlay consumed the button.
    fn on_binding_button(
        &mut self,
        ctx: &mut SurfaceContext,
        code: u8,
        pressed: bool,
        midi_messages_fn: &mut MidiMessagesFn,
    ) -> bool {
        let Some(engine) = ctx.engine.as_deref_mut() else {
            return false;
        };
        if code == self.settings.binding_hold_button {
            engine.set_mod_state(pressed);
            return false;
        }
        if let Some((column, variant)) = template_cell(code) {
            engine.set_mod_state(pressed);
            if pressed {
                self.held_template = Some(code);
                engine.set_template(column, variant);
            } else if self.held_template == Some(code) {
                self.held_template = None;
            }
            let is_global = engine.is_template_global(column);
            self.send_template(code, is_global, midi_messages_fn);
            return true;
        }
        if let Some(index) = indicator_index(code) {
            if pressed {
                if let Some(device) = self.device {
                    if let Err(e) = engine.clear(&mut *ctx.host, device, index) {
                        log::warn!(target: "surface", "clearing binding {index} failed: {e}");
                    }
                }
            }
            return true;
        }
        false
    }

    fn on_shifted_channel_button(
        &mut self,
        ctx: &mut SurfaceContext,
        code: u8,
        pressed: bool,
        channel: MidiChannel,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if let Some(mode) = ChannelButtonMode::from_shifted_code(code) {
            if pressed {
                self.channel_button_mode = mode;
                log::debug!(target: "surface", "channel buttons now {mode}");
                self.send_channel_button_row(ctx, midi_messages_fn);
            }
            return;
        }
        send_perimeter(midi_messages_fn, code, PerimeterLed::lit(pressed), channel);
        if !pressed || self.settings.shift_navigation == ShiftNavigation::Reduced {
            return;
        }
        match code {
            SELECT_UP => self.step_focused_pattern(ctx, Direction::Previous),
            SELECT_DOWN => self.step_focused_pattern(ctx, Direction::Next),
            SELECT_LEFT | SELECT_RIGHT => {
                let direction = if code == SELECT_LEFT {
                    Direction::Previous
                } else {
                    Direction::Next
                };
                if self.grid_mode == GridMode::Parameters {
                    self.step_device(ctx, direction, midi_messages_fn);
                } else {
                    self.step_focused_channel(ctx, direction);
                }
            }
            _ => {}
        }
    }

    fn step_focused_pattern(&mut self, ctx: &mut SurfaceContext, direction: Direction) {
        let Some(index) = ctx.host.focused_channel() else {
            return;
        };
        let Some(patterns) = ctx.host.channel(index).and_then(|c| c.patterns) else {
            return;
        };
        if let Some(pattern) = direction.step(patterns.focused, patterns.count) {
            report(ctx.host.focus_pattern(index, pattern), "focusing pattern");
        }
    }

    fn step_focused_channel(&mut self, ctx: &mut SurfaceContext, direction: Direction) {
        let count = ctx.host.channel_count();
        let next = match ctx.host.focused_channel() {
            Some(index) => direction.step(index, count),
            None => (count > 0).then_some(0),
        };
        if let Some(index) = next {
            report(ctx.host.focus_channel(index), "focusing channel");
        }
    }

    fn step_device(
        &mut self,
        ctx: &mut SurfaceContext,
        direction: Direction,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        let Some(device) = self.device else {
            return;
        };
        if let Some(next) = ctx.host.adjacent_device(device, direction) {
            self.register_device(ctx, Some(next), midi_messages_fn);
        }
    }

    fn on_grid_button(&mut self, ctx: &mut SurfaceContext, note: u8) {
        if self.grid_mode == GridMode::Parameters {
            self.on_parameter_button(ctx, note);
            return;
        }
        let Some((y, index)) = grid_coordinates(note) else {
            return;
        };
        let Some(channel) = ctx.host.channel(index) else {
            log::debug!(target: "surface", "no channel at {index}");
            return;
        };
        match self.grid_mode {
            GridMode::Patterns => {
                let Some(patterns) = channel.patterns else {
                    return;
                };
                let pattern = y + self.focus_offset(channel.uid);
                if pattern >= patterns.count {
                    return;
                }
                report(ctx.host.focus_pattern(index, pattern), "focusing pattern");
                if !self.shift {
                    report(ctx.host.go_pattern(index, pattern), "starting pattern");
                }
            }
            GridMode::Clips => {
                let slot = y;
                match ctx.host.clip(index, slot) {
                    None => report(ctx.host.add_clip(index, slot), "adding clip"),
                    Some(clip) if clip.running => {
                        report(ctx.host.stop_clip(index, slot), "stopping clip")
                    }
                    Some(_) => {
                        report(ctx.host.trigger_clip(index, slot), "triggering clip");
                        report(ctx.host.focus_clip(index, slot), "focusing clip");
                    }
                }
            }
            GridMode::Parameters => {}
        }
    }

    fn on_parameter_button(&mut self, ctx: &mut SurfaceContext, note: u8) {
        let Some((slot, role)) = parameter_cell(note) else {
            return;
        };
        let nudge = match role {
            ParameterRole::Increment => Some(Nudge::Up),
            ParameterRole::Decrement => Some(Nudge::Down),
            ParameterRole::Reset => None,
            ParameterRole::Spare => return,
        };
        match self.settings.parameter_grid_target {
            ParameterGridTarget::Values => {
                let Some(parameter) = self.knobs.get(slot).copied().flatten() else {
                    return;
                };
                let Some(control) = ctx.host.remote_control(parameter) else {
                    return;
                };
                let result = match nudge {
                    Some(nudge) => ctx
                        .host
                        .set_parameter(parameter, control.kind.nudge(control.value, nudge)),
                    None => ctx.host.reset_parameter(parameter),
                };
                report(result, "editing parameter");
            }
            ParameterGridTarget::Modulation => {
                let (Some(engine), Some(device)) = (ctx.engine.as_deref_mut(), self.device) else {
                    return;
                };
                let delta = ParameterKind::CONTINUOUS_INCREMENT;
                let result = match nudge {
                    Some(Nudge::Up) => engine
                        .touch(&mut *ctx.host, device, slot, TouchValue::Delta(delta))
                        .map(|_| ()),
                    Some(Nudge::Down) => engine
                        .touch(&mut *ctx.host, device, slot, TouchValue::Delta(-delta))
                        .map(|_| ()),
                    None => engine.clear(&mut *ctx.host, device, slot),
                };
                if let Err(e) = result {
                    log::warn!(target: "surface", "editing binding {slot} failed: {e}");
                }
            }
        }
    }

    fn on_channel_button(&mut self, ctx: &mut SurfaceContext, index: usize) {
        if ctx.host.channel(index).is_none() {
            return;
        }
        let result = match self.channel_button_mode {
            ChannelButtonMode::Focus => ctx.host.focus_channel(index),
            ChannelButtonMode::CrossfadeGroup => ctx.host.cycle_crossfade_group(index),
            mode => match mode.flag() {
                Some(flag) => ctx.host.toggle_channel_flag(index, flag),
                None => Ok(()),
            },
        };
        report(result, "channel button");
    }

    fn on_control(&mut self, ctx: &mut SurfaceContext, code: u8, value: Normal) {
        match Fader::of(code) {
            Ok(Fader::Master) if self.settings.master_fader_enabled => {
                ctx.host.set_master_fader(value)
            }
            Ok(Fader::Channel(index))
                if self.settings.channel_faders_enabled && index < ctx.host.channel_count() =>
            {
                report(ctx.host.set_channel_fader(index, value), "moving fader")
            }
            Ok(fader) => log::debug!(target: "surface", "ignoring {fader:?}"),
            Err(e) => log::warn!(target: "surface", "{e}"),
        }
    }

    /// Re-renders whatever a host change affects.
    pub fn handle_model_event(
        &mut self,
        ctx: &mut SurfaceContext,
        event: &ModelEvent,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if !self.is_enabled {
            return;
        }
        match event {
            ModelEvent::ChannelAdded { .. }
            | ModelEvent::ChannelRemoved { .. }
            | ModelEvent::ChannelMoved { .. } => {
                if let ModelEvent::ChannelRemoved { uid, .. } = event {
                    self.focus_offsets.remove(uid);
                }
                if let ModelEvent::ChannelAdded { index } = event {
                    self.scroll_to_focus(ctx, *index);
                }
                self.send_channel_button_row(ctx, midi_messages_fn);
                if self.shows(GridMode::Patterns) || self.shows(GridMode::Clips) {
                    self.send_grid(ctx, midi_messages_fn);
                }
            }
            ModelEvent::FocusedChannelChanged => {
                if self.channel_button_mode == ChannelButtonMode::Focus && !self.shift {
                    self.send_channel_button_row(ctx, midi_messages_fn);
                }
                self.follow_focused_device(ctx, midi_messages_fn);
            }
            ModelEvent::ChannelFlagChanged { index, flag } => {
                if !self.shift && self.channel_button_mode.flag() == Some(*flag) {
                    self.send_channel_button(ctx, *index, midi_messages_fn);
                }
                if *flag == ChannelFlag::Arm && self.shows(GridMode::Clips) {
                    self.send_channel_clips(ctx, *index, midi_messages_fn);
                }
            }
            ModelEvent::CrossfadeGroupChanged { index } => {
                if !self.shift && self.channel_button_mode == ChannelButtonMode::CrossfadeGroup {
                    self.send_channel_button(ctx, *index, midi_messages_fn);
                }
            }
            ModelEvent::PatternsChanged { index } | ModelEvent::PatternFocusChanged { index } => {
                self.scroll_to_focus(ctx, *index);
                if self.shows(GridMode::Patterns) {
                    self.send_channel_patterns(ctx, *index, midi_messages_fn);
                }
                if ctx.host.focused_channel() == Some(*index) {
                    self.follow_focused_device(ctx, midi_messages_fn);
                }
            }
            ModelEvent::ActivePatternChanged { index } => {
                if self.shows(GridMode::Patterns) {
                    self.send_channel_patterns(ctx, *index, midi_messages_fn);
                }
            }
            ModelEvent::ClipAdded { index, slot } | ModelEvent::ClipStateChanged { index, slot } => {
                if self.shows(GridMode::Clips) {
                    self.send_clip(ctx, *index, *slot, midi_messages_fn);
                }
            }
            ModelEvent::ClipRemoved { index, .. } => {
                if self.shows(GridMode::Clips) {
                    self.send_channel_clips(ctx, *index, midi_messages_fn);
                }
            }
            ModelEvent::ParameterChanged { parameter } => {
                if self.shows(GridMode::Parameters)
                    && self.settings.parameter_grid_target == ParameterGridTarget::Values
                {
                    let slots: Vec<usize> = self
                        .knobs
                        .iter()
                        .enumerate()
                        .filter(|(_, knob)| **knob == Some(*parameter))
                        .map(|(slot, _)| slot)
                        .collect();
                    for slot in slots {
                        self.send_parameter_role(ctx, slot, ParameterRole::Reset, midi_messages_fn);
                    }
                }
            }
            ModelEvent::RemoteControlsChanged { device } => {
                if self.device == Some(*device) {
                    self.load_device(ctx, midi_messages_fn);
                }
            }
            ModelEvent::DeviceRemoved { device } => {
                if self.device == Some(*device) {
                    let focused = ctx.host.focused_device();
                    self.register_device(ctx, focused, midi_messages_fn);
                }
            }
        }
        self.poll_engine(ctx, midi_messages_fn);
    }

    /// Drains and renders the binding engine's notifications.
    pub fn poll_engine(&mut self, ctx: &mut SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        let events: Vec<EngineEvent> = match &self.engine_events {
            Some(receiver) => receiver.try_iter().collect(),
            None => return,
        };
        for event in events {
            self.on_engine_event(ctx, event, midi_messages_fn);
        }
    }

    fn on_engine_event(
        &mut self,
        ctx: &mut SurfaceContext,
        event: EngineEvent,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if event == EngineEvent::WillDispose {
            self.engine_events = None;
            self.held_template = None;
            if self.is_enabled {
                self.send_grid(ctx, midi_messages_fn);
            }
            return;
        }
        if !self.is_enabled {
            return;
        }
        let modulation_grid = self.shows(GridMode::Parameters)
            && self.settings.parameter_grid_target == ParameterGridTarget::Modulation;
        match event {
            EngineEvent::TemplatesChanged => {
                if self.is_overlay_active() {
                    self.send_templates(ctx, midi_messages_fn);
                }
            }
            EngineEvent::BindingChanged { device, index } if self.device == Some(device) => {
                if self.is_overlay_active() && index < INDICATOR_COUNT {
                    self.send_indicator(ctx, index, midi_messages_fn);
                }
                if modulation_grid && index < PARAMETER_COUNT {
                    self.send_parameter(ctx, index, midi_messages_fn);
                }
            }
            EngineEvent::BindingsReplaced { device } if self.device == Some(device) => {
                if self.is_overlay_active() {
                    self.send_indicators(ctx, midi_messages_fn);
                }
                if modulation_grid {
                    self.send_parameters(ctx, midi_messages_fn);
                }
            }
            _ => {}
        }
    }

    fn scroll_to_focus(&mut self, ctx: &SurfaceContext, index: usize) {
        let Some(channel) = ctx.host.channel(index) else {
            return;
        };
        let Some(patterns) = channel.patterns else {
            return;
        };
        let offset = self.focus_offsets.entry(channel.uid).or_default();
        if patterns.count <= GRID_ROWS {
            *offset = 0;
            return;
        }
        if patterns.focused < *offset {
            *offset = patterns.focused;
        } else if patterns.focused >= *offset + GRID_ROWS {
            *offset = patterns.focused + 1 - GRID_ROWS;
        }
        *offset = (*offset).min(patterns.count - GRID_ROWS);
    }

    fn follow_focused_device(
        &mut self,
        ctx: &mut SurfaceContext,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        let device = ctx.host.focused_device();
        if device != self.device {
            self.register_device(ctx, device, midi_messages_fn);
        }
    }

    fn register_device(
        &mut self,
        ctx: &mut SurfaceContext,
        device: Option<DeviceUid>,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        self.device = device;
        log::debug!(target: "surface", "following device {device:?}");
        self.load_device(ctx, midi_messages_fn);
    }

    fn load_device(&mut self, ctx: &mut SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        self.knobs = self
            .device
            .and_then(|device| ctx.host.remote_controls(device))
            .map(|mut controls| {
                controls.truncate(PARAMETER_COUNT);
                controls
            })
            .unwrap_or_default();
        if let (Some(engine), Some(device), true) = (
            ctx.engine.as_deref_mut(),
            self.device,
            self.engine_events.is_some(),
        ) {
            if let Err(e) = engine.refresh(&*ctx.host, device) {
                log::warn!(target: "surface", "couldn't refresh bindings: {e}");
            }
        }
        if !self.is_enabled {
            return;
        }
        if self.shows(GridMode::Parameters) {
            self.send_parameters(ctx, midi_messages_fn);
        }
        if self.is_overlay_active() {
            self.send_indicators(ctx, midi_messages_fn);
        }
    }

    fn send_all(&self, ctx: &SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        self.send_mode_buttons(midi_messages_fn);
        self.send_channel_button_row(ctx, midi_messages_fn);
        self.send_grid(ctx, midi_messages_fn);
    }

    fn clear_surface(midi_messages_fn: &mut MidiMessagesFn) {
        for note in 0..=GRID_LAST {
            send_led(midi_messages_fn, note, SurfaceLed::Blank);
        }
        for index in 0..CHANNEL_BUTTON_COUNT {
            let code = CHANNEL_BUTTON_FIRST + index as u8;
            send_perimeter(midi_messages_fn, code, PerimeterLed::Off, PerimeterLed::CHANNEL);
        }
        for code in [TOGGLE_CLIPS, TOGGLE_PARAMETERS] {
            send_perimeter(midi_messages_fn, code, PerimeterLed::Off, PerimeterLed::CHANNEL);
        }
    }

    fn send_mode_buttons(&self, midi_messages_fn: &mut MidiMessagesFn) {
        for (code, mode) in [
            (TOGGLE_CLIPS, GridMode::Clips),
            (TOGGLE_PARAMETERS, GridMode::Parameters),
        ] {
            let led = PerimeterLed::lit(self.grid_mode == mode);
            send_perimeter(midi_messages_fn, code, led, PerimeterLed::CHANNEL);
        }
    }

    fn send_grid(&self, ctx: &SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        if self.is_overlay_active() {
            self.send_templates(ctx, midi_messages_fn);
            self.send_indicators(ctx, midi_messages_fn);
            return;
        }
        match self.grid_mode {
            GridMode::Patterns => {
                for index in 0..GRID_COLUMNS {
                    self.send_channel_patterns(ctx, index, midi_messages_fn);
                }
            }
            GridMode::Clips => {
                for index in 0..GRID_COLUMNS {
                    self.send_channel_clips(ctx, index, midi_messages_fn);
                }
            }
            GridMode::Parameters => self.send_parameters(ctx, midi_messages_fn),
        }
    }

    fn pattern_led(patterns: &PatternState, pattern: usize) -> SurfaceLed {
        if pattern >= patterns.count {
            SurfaceLed::Blank
        } else if patterns.active == Some(pattern) {
            SurfaceLed::PatternActive
        } else if patterns.next == Some(pattern) {
            SurfaceLed::PatternTransition
        } else if patterns.focused == pattern {
            SurfaceLed::PatternFocused
        } else {
            SurfaceLed::PatternInactive
        }
    }

    fn send_channel_patterns(
        &self,
        ctx: &SurfaceContext,
        index: usize,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        let channel = ctx.host.channel(index);
        let offset = channel.as_ref().map_or(0, |c| self.focus_offset(c.uid));
        let patterns = channel.and_then(|c| c.patterns);
        for y in 0..GRID_ROWS {
            let led = patterns
                .as_ref()
                .map_or(SurfaceLed::Blank, |p| Self::pattern_led(p, y + offset));
            if let Some(note) = grid_note(y, index) {
                send_led(midi_messages_fn, note, led);
            }
        }
    }

    fn send_channel_clips(
        &self,
        ctx: &SurfaceContext,
        index: usize,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        for slot in 0..GRID_ROWS {
            self.send_clip(ctx, index, slot, midi_messages_fn);
        }
    }

    fn send_clip(
        &self,
        ctx: &SurfaceContext,
        index: usize,
        slot: usize,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        let Some(note) = grid_note(slot, index) else {
            return;
        };
        let led = match (ctx.host.channel(index), ctx.host.clip(index, slot)) {
            (Some(channel), Some(clip)) => match (channel.arm, clip.running) {
                (true, true) => SurfaceLed::ClipRecording,
                (true, false) => SurfaceLed::ClipArmed,
                (false, true) => SurfaceLed::ClipPlaying,
                (false, false) => SurfaceLed::ClipInactive,
            },
            _ => SurfaceLed::Blank,
        };
        send_led(midi_messages_fn, note, led);
    }

    // Some(is_default) if something backs the slot.
    fn parameter_state(&self, ctx: &SurfaceContext, slot: usize) -> Option<bool> {
        match self.settings.parameter_grid_target {
            ParameterGridTarget::Values => {
                let parameter = self.knobs.get(slot).copied().flatten()?;
                ctx.host
                    .remote_control(parameter)
                    .map(|control| control.is_default())
            }
            ParameterGridTarget::Modulation => {
                let engine = ctx.engine.as_deref()?;
                let proxy = engine.proxy(self.device?, slot)?;
                Some(proxy.is_default(&*ctx.host))
            }
        }
    }

    fn send_parameters(&self, ctx: &SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        for slot in 0..PARAMETER_COUNT {
            self.send_parameter(ctx, slot, midi_messages_fn);
        }
    }

    fn send_parameter(&self, ctx: &SurfaceContext, slot: usize, midi_messages_fn: &mut MidiMessagesFn) {
        for role in [
            ParameterRole::Increment,
            ParameterRole::Decrement,
            ParameterRole::Reset,
            ParameterRole::Spare,
        ] {
            self.send_parameter_role(ctx, slot, role, midi_messages_fn);
        }
    }

    fn send_parameter_role(
        &self,
        ctx: &SurfaceContext,
        slot: usize,
        role: ParameterRole,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        let Some(note) = parameter_note(slot, role) else {
            return;
        };
        let led = match (self.parameter_state(ctx, slot), role) {
            (None, _) | (_, ParameterRole::Spare) => SurfaceLed::Blank,
            (Some(_), ParameterRole::Increment) => SurfaceLed::ParameterIncrement,
            (Some(_), ParameterRole::Decrement) => SurfaceLed::ParameterDecrement,
            (Some(true), ParameterRole::Reset) => SurfaceLed::ParameterIsDefault,
            (Some(false), ParameterRole::Reset) => SurfaceLed::ParameterReset,
        };
        send_led(midi_messages_fn, note, led);
    }

    fn send_templates(&self, ctx: &SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        let engine = ctx.engine.as_deref();
        for column in 0..Template::COLUMN_COUNT {
            let is_global = engine.is_some_and(|e| e.is_template_global(column));
            for variant in 0..TEMPLATE_ROWS {
                if let Some(note) = template_note(column, variant) {
                    self.send_template(note, is_global, midi_messages_fn);
                }
            }
        }
    }

    fn send_template(&self, note: u8, is_global: bool, midi_messages_fn: &mut MidiMessagesFn) {
        let led = if self.held_template == Some(note) {
            SurfaceLed::TemplateActive
        } else if is_global {
            SurfaceLed::TemplateInactiveGlobal
        } else {
            SurfaceLed::TemplateInactiveLocal
        };
        send_led(midi_messages_fn, note, led);
    }

    fn send_indicators(&self, ctx: &SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        for index in 0..INDICATOR_COUNT {
            self.send_indicator(ctx, index, midi_messages_fn);
        }
    }

    fn send_indicator(&self, ctx: &SurfaceContext, index: usize, midi_messages_fn: &mut MidiMessagesFn) {
        let Some(note) = indicator_note(index) else {
            return;
        };
        let led = match (ctx.engine.as_deref(), self.device) {
            (Some(engine), Some(device)) if engine.proxy(device, index).is_some() => {
                match engine.classify(&*ctx.host, device, index) {
                    BindingState::Unbound => SurfaceLed::ModulationNone,
                    BindingState::SelfOwned => SurfaceLed::ModulationSelfOwned,
                    BindingState::Foreign => SurfaceLed::ModulationForeign,
                }
            }
            _ => SurfaceLed::Blank,
        };
        send_led(midi_messages_fn, note, led);
    }

    fn send_channel_button_row(&self, ctx: &SurfaceContext, midi_messages_fn: &mut MidiMessagesFn) {
        for index in 0..CHANNEL_BUTTON_COUNT {
            self.send_channel_button(ctx, index, midi_messages_fn);
        }
    }

    fn send_channel_button(
        &self,
        ctx: &SurfaceContext,
        index: usize,
        midi_messages_fn: &mut MidiMessagesFn,
    ) {
        if index >= CHANNEL_BUTTON_COUNT {
            return;
        }
        let code = CHANNEL_BUTTON_FIRST + index as u8;
        let lit = if self.shift {
            self.channel_button_mode.shifted_code() == Some(code)
        } else {
            match ctx.host.channel(index) {
                None => false,
                Some(channel) => match self.channel_button_mode {
                    ChannelButtonMode::Focus => ctx.host.focused_channel() == Some(index),
                    ChannelButtonMode::CrossfadeGroup => false,
                    mode => mode.flag().is_some_and(|flag| channel.flag(flag)),
                },
            }
        };
        send_perimeter(
            midi_messages_fn,
            code,
            PerimeterLed::lit(lit),
            PerimeterLed::CHANNEL,
        );
    }
}
