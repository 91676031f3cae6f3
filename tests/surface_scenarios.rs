// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use more_asserts::assert_gt;
use supermod::{
    prelude::*,
    surface::{address, PerimeterLed},
    types::u7,
};

/// A host, an optional binding engine and a surface, wired together the way
/// a real host loop would: every recorded host event is routed to the engine
/// and then to the surface, and every LED message is captured.
struct Rig {
    host: MemoryHost,
    engine: Option<BindingEngine>,
    surface: SurfaceController,
    sent: Vec<(MidiChannel, MidiMessage)>,
}
impl Rig {
    fn new(host: MemoryHost, settings: SurfaceSettings, engine: Option<BindingEngine>) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            host,
            engine,
            surface: SurfaceController::new_with(SubscriberId(1), settings),
            sent: Vec::default(),
        }
    }

    fn enable(&mut self) {
        let _ = self.host.take_events();
        let mut ctx = SurfaceContext::new(&mut self.host, self.engine.as_mut());
        let sent = &mut self.sent;
        if ctx.engine.is_some() {
            self.surface
                .attach(&mut ctx, &mut |c, m| sent.push((c, m)))
                .unwrap();
        }
        self.surface
            .set_enabled(&mut ctx, true, &mut |c, m| sent.push((c, m)));
    }

    fn message(&mut self, message: MidiMessage) {
        let mut ctx = SurfaceContext::new(&mut self.host, self.engine.as_mut());
        let sent = &mut self.sent;
        self.surface.handle_midi_message(
            &mut ctx,
            MidiChannel::new(0),
            message,
            &mut |c, m| sent.push((c, m)),
        );
        self.route();
    }

    fn button(&mut self, code: u8, pressed: bool) {
        self.message(SurfaceInput::button_message(code, pressed));
    }

    fn click(&mut self, code: u8) {
        self.button(code, true);
        self.button(code, false);
    }

    fn shifted_click(&mut self, code: u8) {
        self.button(address::SHIFT, true);
        self.click(code);
        self.button(address::SHIFT, false);
    }

    fn fader(&mut self, code: u8, value: u8) {
        self.message(MidiMessage::Controller {
            controller: u7::from(code),
            value: u7::from(value),
        });
    }

    fn route(&mut self) {
        loop {
            let events = self.host.take_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                match event {
                    HostEvent::Modulation(event) => {
                        if let Some(engine) = self.engine.as_mut() {
                            engine.handle_modulation_event(&event);
                        }
                    }
                    HostEvent::Model(event) => {
                        if let Some(engine) = self.engine.as_mut() {
                            engine.handle_model_event(&self.host, &event);
                        }
                        let mut ctx = SurfaceContext::new(&mut self.host, self.engine.as_mut());
                        let sent = &mut self.sent;
                        self.surface.handle_model_event(&mut ctx, &event, &mut |c, m| {
                            sent.push((c, m))
                        });
                    }
                }
            }
        }
        let mut ctx = SurfaceContext::new(&mut self.host, self.engine.as_mut());
        let sent = &mut self.sent;
        self.surface
            .poll_engine(&mut ctx, &mut |c, m| sent.push((c, m)));
    }

    /// The last encoding sent to a grid LED.
    fn grid(&self, note: u8) -> Option<LedEncoding> {
        self.sent.iter().rev().find_map(|(channel, message)| {
            LedEncoding::decode(*channel, message)
                .filter(|(key, _)| *key == note)
                .map(|(_, encoding)| encoding)
        })
    }

    /// The last velocity sent to a perimeter LED.
    fn perimeter(&self, code: u8) -> Option<u8> {
        self.sent.iter().rev().find_map(|(_, message)| match message {
            MidiMessage::NoteOn { key, vel } if key.as_int() == code => Some(vel.as_int()),
            _ => None,
        })
    }
}

fn note(y: usize, x: usize) -> u8 {
    address::grid_note(y, x).unwrap()
}

const ON: Option<u8> = Some(PerimeterLed::On as u8);
const OFF: Option<u8> = Some(PerimeterLed::Off as u8);

#[test]
fn parameter_increment_binds_an_unbound_continuous_parameter() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("lasers", 1);
    let device = host.pattern_device(0, 0).unwrap();
    let speed = host
        .add_remote_control(device, "Speed", ParameterKind::Continuous, Normal::default())
        .unwrap();
    host.focus_channel(0).unwrap();

    let mut settings = SurfaceSettings::default();
    settings.set_binding_mode_enabled(false);
    settings.set_parameter_grid_target(ParameterGridTarget::Modulation);
    let mut engine = BindingEngine::default();
    engine.set_template(2, 0);
    assert!(!engine.is_template_global(2));

    let mut rig = Rig::new(host, settings, Some(engine));
    rig.enable();
    assert_eq!(rig.surface.device(), Some(device));
    rig.click(address::TOGGLE_PARAMETERS);
    assert_eq!(rig.surface.grid_mode(), GridMode::Parameters);
    let reset = address::parameter_note(0, address::ParameterRole::Reset).unwrap();
    assert_eq!(reset, 40);
    assert_eq!(
        rig.grid(reset),
        Some(SurfaceLed::ParameterIsDefault.encoding()),
        "an unbound proxy is at its default"
    );

    rig.click(address::parameter_note(0, address::ParameterRole::Increment).unwrap());

    let edges = rig.host.modulations_of_target(speed);
    assert_eq!(edges.len(), 1, "touching should create exactly one edge");
    let edge = rig.host.modulation(edges[0]).unwrap();
    let modulator = rig.host.modulator(edge.source).unwrap();
    assert_eq!(modulator.label, "SM_Speed");
    assert_eq!(modulator.scope, ModulationScope::Device(device));
    assert!(modulator.running, "a synthesized modulator should be running");
    assert_eq!(
        rig.host.modulator_spec(edge.source).unwrap().tempo,
        TempoDivision::Half
    );
    assert!(approx_eq!(f64, Normal::from(edge.range).0, 0.6, epsilon = 1e-9));
    assert_eq!(
        rig.engine.as_ref().unwrap().classify(&rig.host, device, 0),
        BindingState::SelfOwned
    );
    assert_eq!(
        rig.grid(reset),
        Some(SurfaceLed::ParameterReset.encoding()),
        "the reset cell should show the not-default indicator"
    );

    rig.click(reset);
    assert_eq!(rig.host.modulator_count(), 0, "clearing removes what touching made");
    assert_eq!(rig.grid(reset), Some(SurfaceLed::ParameterIsDefault.encoding()));
}

#[test]
fn parameter_grid_edits_values_directly() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("lasers", 1);
    let device = host.pattern_device(0, 0).unwrap();
    let strobe = host
        .add_remote_control(device, "Strobe", ParameterKind::Boolean, Normal::default())
        .unwrap();
    let speed = host
        .add_remote_control(device, "Speed", ParameterKind::Continuous, Normal::default())
        .unwrap();
    host.focus_channel(0).unwrap();

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    rig.click(address::TOGGLE_PARAMETERS);

    rig.click(address::parameter_note(0, address::ParameterRole::Increment).unwrap());
    assert_eq!(rig.host.remote_control(strobe).unwrap().value, Normal::maximum());
    rig.click(address::parameter_note(1, address::ParameterRole::Increment).unwrap());
    rig.click(address::parameter_note(1, address::ParameterRole::Increment).unwrap());
    let value = rig.host.remote_control(speed).unwrap().value;
    assert!(approx_eq!(f64, value.0, 0.2, epsilon = 1e-9), "got {value}");
    assert_eq!(
        rig.grid(address::parameter_note(1, address::ParameterRole::Reset).unwrap()),
        Some(SurfaceLed::ParameterReset.encoding())
    );

    rig.click(address::parameter_note(1, address::ParameterRole::Reset).unwrap());
    assert_eq!(rig.host.remote_control(speed).unwrap().value, Normal::default());
    assert_eq!(
        rig.grid(address::parameter_note(1, address::ParameterRole::Reset).unwrap()),
        Some(SurfaceLed::ParameterIsDefault.encoding())
    );
    assert_eq!(
        rig.grid(address::parameter_note(2, address::ParameterRole::Increment).unwrap()),
        Some(SurfaceLed::Blank.encoding()),
        "a slot without a control is dark"
    );
}

#[test]
fn arming_a_channel_recolors_its_clip_column() {
    let mut host = MemoryHost::default();
    for label in ["a", "b", "c", "d"] {
        host.add_pattern_channel(label, 1);
    }
    for slot in 0..address::GRID_ROWS {
        host.add_clip(3, slot).unwrap();
    }
    host.trigger_clip(3, 0).unwrap();

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    rig.click(address::TOGGLE_CLIPS);
    assert_eq!(rig.surface.grid_mode(), GridMode::Clips);
    assert_eq!(rig.grid(note(1, 3)), Some(SurfaceLed::ClipInactive.encoding()));

    rig.shifted_click(address::ARM_MODE);
    assert_eq!(rig.surface.channel_button_mode(), ChannelButtonMode::Arm);

    rig.sent.clear();
    rig.click(address::CHANNEL_BUTTON_FIRST + 3);
    assert!(rig.host.channel(3).unwrap().arm);
    assert_eq!(rig.perimeter(address::CHANNEL_BUTTON_FIRST + 3), ON);
    assert_eq!(rig.grid(note(0, 3)), Some(SurfaceLed::ClipRecording.encoding()));
    for slot in 1..address::GRID_ROWS {
        assert_eq!(
            rig.grid(note(slot, 3)),
            Some(SurfaceLed::ClipArmed.encoding()),
            "slot {slot} should use the armed color"
        );
    }
    assert_eq!(rig.grid(note(0, 2)), None, "other columns shouldn't re-render");
}

#[test]
fn shift_stop_all_is_momentary() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    host.add_clip(0, 0).unwrap();
    host.trigger_clip(0, 0).unwrap();

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    rig.button(address::SHIFT, true);
    rig.button(address::STOP_ALL_CLIPS, true);
    assert_eq!(rig.host.stop_all_count(), 1);
    assert_eq!(rig.perimeter(address::STOP_ALL_CLIPS), ON, "lit while held");
    assert!(!rig.host.clip(0, 0).unwrap().running);

    rig.button(address::STOP_ALL_CLIPS, false);
    assert_eq!(rig.perimeter(address::STOP_ALL_CLIPS), OFF, "dark on release");
    assert_eq!(rig.host.stop_all_count(), 1, "release must not stop again");
    rig.button(address::SHIFT, false);
    assert_eq!(rig.surface.grid_mode(), GridMode::Patterns);
    assert_eq!(rig.perimeter(address::STOP_ALL_CLIPS), OFF);

    rig.click(address::TOGGLE_PARAMETERS);
    assert_eq!(rig.surface.grid_mode(), GridMode::Parameters);
    assert_eq!(rig.perimeter(address::TOGGLE_PARAMETERS), ON);
    rig.button(address::SHIFT, true);
    rig.button(address::STOP_ALL_CLIPS, true);
    assert_eq!(rig.host.stop_all_count(), 2);
    rig.button(address::STOP_ALL_CLIPS, false);
    assert_eq!(
        rig.perimeter(address::STOP_ALL_CLIPS),
        OFF,
        "dark on release even in Parameters mode"
    );
    rig.button(address::SHIFT, false);
    assert_eq!(
        rig.perimeter(address::TOGGLE_PARAMETERS),
        ON,
        "releasing shift restores the mode toggle"
    );
    assert_eq!(rig.surface.grid_mode(), GridMode::Parameters);
}

#[test]
fn flags_beyond_the_button_row_stay_off_the_perimeter() {
    let mut host = MemoryHost::default();
    for index in 0..13 {
        host.add_pattern_channel(&format!("ch{index}"), 1);
    }

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    rig.shifted_click(address::ARM_MODE);
    assert_eq!(rig.surface.channel_button_mode(), ChannelButtonMode::Arm);

    rig.sent.clear();
    rig.host.toggle_channel_flag(12, ChannelFlag::Arm).unwrap();
    rig.route();
    assert!(rig.host.channel(12).unwrap().arm);
    assert_eq!(
        rig.perimeter(address::CHANNEL_BUTTON_FIRST + 12),
        None,
        "channel 12 has no button, so nothing should light in its place"
    );

    rig.shifted_click(address::CUE_MODE);
    rig.sent.clear();
    rig.host.toggle_channel_flag(11, ChannelFlag::Cue).unwrap();
    rig.route();
    assert_eq!(rig.perimeter(address::CHANNEL_BUTTON_FIRST + 11), None);
    assert_eq!(rig.perimeter(address::CHANNEL_BUTTON_FIRST + 3), None);
}

#[test]
fn pattern_presses_focus_and_transition() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 3);
    host.add_bus("fx");

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    assert_eq!(rig.grid(note(0, 0)), Some(SurfaceLed::PatternActive.encoding()));
    assert_eq!(rig.grid(note(1, 0)), Some(SurfaceLed::PatternInactive.encoding()));
    assert_eq!(rig.grid(note(3, 0)), Some(SurfaceLed::Blank.encoding()));
    assert_eq!(
        rig.grid(note(0, 1)),
        Some(SurfaceLed::Blank.encoding()),
        "a bus has no patterns"
    );

    rig.click(note(1, 0));
    assert_eq!(rig.grid(note(1, 0)), Some(SurfaceLed::PatternTransition.encoding()));
    rig.host.complete_transition(0).unwrap();
    rig.route();
    assert_eq!(rig.grid(note(1, 0)), Some(SurfaceLed::PatternActive.encoding()));
    assert_eq!(rig.grid(note(0, 0)), Some(SurfaceLed::PatternInactive.encoding()));

    rig.shifted_click(note(2, 0));
    let patterns = rig.host.channel(0).unwrap().patterns.unwrap();
    assert_eq!(patterns.focused, 2);
    assert_eq!(patterns.next, None, "shift only focuses");
    assert_eq!(rig.grid(note(2, 0)), Some(SurfaceLed::PatternFocused.encoding()));
}

#[test]
fn long_pattern_lists_scroll_with_focus() {
    let mut host = MemoryHost::default();
    let uid = host.add_pattern_channel("long", 12);
    host.focus_channel(0).unwrap();

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    for _ in 0..9 {
        rig.shifted_click(address::SELECT_DOWN);
    }
    assert_eq!(rig.host.channel(0).unwrap().patterns.unwrap().focused, 9);
    assert_eq!(rig.surface.focus_offset(uid), 2);
    assert_eq!(
        rig.grid(note(7, 0)),
        Some(SurfaceLed::PatternFocused.encoding()),
        "the focused pattern sits in the bottom row"
    );
    rig.shifted_click(address::SELECT_UP);
    assert_eq!(rig.host.channel(0).unwrap().patterns.unwrap().focused, 8);
}

#[test]
fn reduced_navigation_only_lights() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 4);
    host.add_pattern_channel("b", 4);
    host.focus_channel(0).unwrap();
    let mut settings = SurfaceSettings::default();
    settings.set_shift_navigation(ShiftNavigation::Reduced);

    let mut rig = Rig::new(host, settings, None);
    rig.enable();
    rig.button(address::SHIFT, true);
    rig.button(address::SELECT_RIGHT, true);
    assert_eq!(rig.perimeter(address::SELECT_RIGHT), ON);
    rig.button(address::SELECT_RIGHT, false);
    assert_eq!(rig.perimeter(address::SELECT_RIGHT), OFF);
    rig.button(address::SHIFT, false);
    assert_eq!(rig.host.focused_channel(), Some(0));
}

#[test]
fn channel_buttons_follow_their_mode() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    host.add_pattern_channel("b", 1);

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    rig.click(address::CHANNEL_BUTTON_FIRST + 1);
    assert_eq!(rig.host.focused_channel(), Some(1));
    assert_eq!(rig.perimeter(address::CHANNEL_BUTTON_FIRST + 1), ON);
    assert_eq!(rig.perimeter(address::CHANNEL_BUTTON_FIRST), OFF);

    rig.button(address::SHIFT, true);
    assert_eq!(rig.perimeter(address::FOCUS_MODE), ON, "shift shows the mode");
    rig.click(address::CUE_MODE);
    assert_eq!(rig.perimeter(address::CUE_MODE), ON);
    assert_eq!(rig.perimeter(address::FOCUS_MODE), OFF);
    rig.button(address::SHIFT, false);

    rig.click(address::CHANNEL_BUTTON_FIRST);
    assert!(rig.host.channel(0).unwrap().cue);
    assert_eq!(rig.perimeter(address::CHANNEL_BUTTON_FIRST), ON);
    assert_eq!(
        rig.perimeter(address::CHANNEL_BUTTON_FIRST + 5),
        OFF,
        "a missing channel is dark"
    );
}

#[test]
fn scene_buttons_launch_and_light_while_held() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();

    rig.button(address::SCENE_LAUNCH_FIRST + 2, true);
    assert_eq!(rig.perimeter(address::SCENE_LAUNCH_FIRST + 2), ON);
    rig.button(address::SCENE_LAUNCH_FIRST + 2, false);
    assert_eq!(rig.perimeter(address::SCENE_LAUNCH_FIRST + 2), OFF);
    assert_eq!(rig.host.scenes_launched(), &[2]);
}

#[test]
fn faders_respect_their_settings() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();

    rig.fader(address::CHANNEL_FADER_FIRST, 127);
    assert_eq!(rig.host.channel(0).unwrap().fader, Normal::maximum());
    rig.fader(address::MASTER_FADER, 64);
    assert_gt!(rig.host.master_fader().0, 0.5);

    rig.surface.settings_mut().set_master_fader_enabled(false);
    rig.fader(address::MASTER_FADER, 0);
    assert_gt!(rig.host.master_fader().0, 0.5, "a disabled fader is ignored");
    rig.fader(address::CHANNEL_FADER_FIRST + 4, 0);
    rig.fader(9, 0);
}

#[test]
fn unmapped_input_changes_nothing() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    rig.sent.clear();

    rig.click(109);
    rig.click(121);
    assert!(rig.sent.is_empty(), "nothing should be re-rendered");
    assert_eq!(rig.surface.grid_mode(), GridMode::Patterns);
    assert!(!rig.surface.is_shifted());
}

#[test]
fn binding_overlay_selects_templates_and_shows_ownership() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("lasers", 1);
    let device = host.pattern_device(0, 0).unwrap();
    let speed = host
        .add_remote_control(device, "Speed", ParameterKind::Continuous, Normal::default())
        .unwrap();
    host.add_remote_control(device, "Hue", ParameterKind::Continuous, Normal::default())
        .unwrap();
    host.focus_channel(0).unwrap();

    let mut rig = Rig::new(host, SurfaceSettings::default(), Some(BindingEngine::default()));
    rig.enable();
    assert!(rig.surface.is_attached());
    let template = address::template_note(0, 0).unwrap();
    assert_eq!(
        rig.grid(template),
        Some(SurfaceLed::TemplateInactiveLocal.encoding())
    );
    let first = address::indicator_note(0).unwrap();
    let second = address::indicator_note(1).unwrap();
    assert_eq!(rig.grid(first), Some(SurfaceLed::ModulationNone.encoding()));
    assert_eq!(
        rig.grid(address::indicator_note(2).unwrap()),
        Some(SurfaceLed::Blank.encoding()),
        "no control, no indicator"
    );

    // A user modulator named for slot 1 makes column 0 global.
    rig.host.add_global_modulator("SM_1");
    rig.route();
    assert_eq!(
        rig.grid(template),
        Some(SurfaceLed::TemplateInactiveGlobal.encoding())
    );

    // Holding a template selects it and asserts the hold state.
    let held = address::template_note(2, 2).unwrap();
    rig.button(held, true);
    assert!(rig.engine.as_ref().unwrap().is_mod());
    assert_eq!(rig.engine.as_ref().unwrap().template(), Template::new(2, 2));
    assert_eq!(rig.grid(held), Some(SurfaceLed::TemplateActive.encoding()));
    rig.button(held, false);
    assert!(!rig.engine.as_ref().unwrap().is_mod());
    assert_eq!(rig.grid(held), Some(SurfaceLed::TemplateInactiveLocal.encoding()));

    // A self-owned binding shows red and clears completely.
    rig.engine
        .as_mut()
        .unwrap()
        .touch(&mut rig.host, device, 1, TouchValue::Delta(0.2))
        .unwrap();
    rig.route();
    assert_eq!(rig.grid(second), Some(SurfaceLed::ModulationSelfOwned.encoding()));
    rig.click(second);
    assert_eq!(rig.host.modulator_count(), 1, "only the user's modulator remains");
    assert_eq!(rig.grid(second), Some(SurfaceLed::ModulationNone.encoding()));

    // A foreign binding shows yellow and clearing only resets its range.
    let lfo = rig.host.add_global_modulator("LFO");
    let edge = rig.host.add_modulation(lfo, speed).unwrap();
    rig.host
        .set_modulation_range(edge, BipolarNormal::from(Normal::new(0.9)))
        .unwrap();
    rig.route();
    assert_eq!(rig.grid(first), Some(SurfaceLed::ModulationForeign.encoding()));
    rig.click(first);
    assert!(rig.host.modulator(lfo).is_some(), "a foreign modulator survives");
    assert!(rig.host.modulation(edge).is_some(), "and so does its edge");
    assert_eq!(rig.grid(first), Some(SurfaceLed::ModulationForeign.encoding()));
    assert!(rig.engine.as_ref().unwrap().proxy(device, 0).unwrap().is_default(&rig.host));
}

#[test]
fn hold_button_keeps_its_shift_meaning() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    let mut rig = Rig::new(host, SurfaceSettings::default(), Some(BindingEngine::default()));
    rig.enable();

    rig.button(address::SHIFT, true);
    assert!(rig.engine.as_ref().unwrap().is_mod());
    assert!(rig.surface.is_shifted());
    rig.button(address::SHIFT, false);
    assert!(!rig.engine.as_ref().unwrap().is_mod());
    assert!(!rig.surface.is_shifted());
}

#[test]
fn toggling_binding_mode_swaps_the_grid() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 2);
    let mut rig = Rig::new(host, SurfaceSettings::default(), Some(BindingEngine::default()));
    rig.enable();
    let top_left = note(0, 0);
    assert_eq!(rig.grid(top_left), Some(SurfaceLed::TemplateInactiveLocal.encoding()));

    let mut ctx = SurfaceContext::new(&mut rig.host, rig.engine.as_mut());
    let sent = &mut rig.sent;
    rig.surface
        .set_binding_mode_enabled(&mut ctx, false, &mut |c, m| sent.push((c, m)));
    assert_eq!(rig.grid(top_left), Some(SurfaceLed::PatternActive.encoding()));
}

#[test]
fn disposing_the_engine_returns_the_grid() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 2);
    let mut rig = Rig::new(host, SurfaceSettings::default(), Some(BindingEngine::default()));
    rig.enable();

    rig.engine.as_mut().unwrap().dispose();
    rig.route();
    assert!(!rig.surface.is_attached());
    assert_eq!(rig.grid(note(0, 0)), Some(SurfaceLed::PatternActive.encoding()));
}

#[test]
fn following_the_focused_device() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    host.add_pattern_channel("b", 1);
    let first = host.pattern_device(0, 0).unwrap();
    let second = host.pattern_device(1, 0).unwrap();
    let effect = host.add_effect(1).unwrap();
    host.focus_channel(0).unwrap();

    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    assert_eq!(rig.surface.device(), Some(first));
    rig.click(address::CHANNEL_BUTTON_FIRST + 1);
    assert_eq!(rig.surface.device(), Some(second));

    rig.click(address::TOGGLE_PARAMETERS);
    rig.shifted_click(address::SELECT_RIGHT);
    assert_eq!(rig.surface.device(), Some(effect), "right walks the device chain");
    rig.shifted_click(address::SELECT_RIGHT);
    assert_eq!(rig.surface.device(), Some(effect), "and stops at its end");
}

#[test]
fn channel_removal_blanks_the_column() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    host.add_pattern_channel("b", 1);
    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();
    assert_eq!(rig.grid(note(0, 1)), Some(SurfaceLed::PatternActive.encoding()));

    rig.host.remove_channel(1).unwrap();
    rig.route();
    assert_eq!(rig.grid(note(0, 1)), Some(SurfaceLed::Blank.encoding()));
}

#[test]
fn disable_darkens_and_reconnect_restores() {
    let mut host = MemoryHost::default();
    host.add_pattern_channel("a", 1);
    let mut rig = Rig::new(host, SurfaceSettings::default(), None);
    rig.enable();

    let mut ctx = SurfaceContext::new(&mut rig.host, None);
    let sent = &mut rig.sent;
    rig.surface
        .set_enabled(&mut ctx, false, &mut |c, m| sent.push((c, m)));
    for n in 0..=address::GRID_LAST {
        assert_eq!(rig.grid(n), Some(SurfaceLed::Blank.encoding()));
    }
    assert_eq!(rig.perimeter(address::TOGGLE_CLIPS), OFF);

    rig.click(address::TOGGLE_CLIPS);
    assert_eq!(rig.surface.grid_mode(), GridMode::Patterns, "disabled input is ignored");

    let mut ctx = SurfaceContext::new(&mut rig.host, None);
    let sent = &mut rig.sent;
    rig.surface
        .set_enabled(&mut ctx, true, &mut |c, m| sent.push((c, m)));
    rig.sent.clear();
    let mut ctx = SurfaceContext::new(&mut rig.host, None);
    let sent = &mut rig.sent;
    rig.surface
        .reconnect(&mut ctx, &mut |c, m| sent.push((c, m)));
    assert_eq!(rig.grid(note(0, 0)), Some(SurfaceLed::PatternActive.encoding()));
}
