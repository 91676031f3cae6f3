// Copyright (c) 2024 Mike Tsao

use super::types::{ChannelFlag, ModulationScope};
use crate::types::{ChannelUid, DeviceUid, ModulationUid, ModulatorUid, ParameterUid};

/// A change in the mixer or device model that a surface may need to show.
/// Channel and pattern positions are the positions after the change.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelEvent {
    #[allow(missing_docs)]
    ChannelAdded { index: usize },
    #[allow(missing_docs)]
    ChannelRemoved { uid: ChannelUid, index: usize },
    #[allow(missing_docs)]
    ChannelMoved { from: usize, to: usize },
    /// A different channel (or none) has focus.
    FocusedChannelChanged,
    #[allow(missing_docs)]
    ChannelFlagChanged { index: usize, flag: ChannelFlag },
    #[allow(missing_docs)]
    CrossfadeGroupChanged { index: usize },
    /// Patterns were added, removed or reordered.
    #[allow(missing_docs)]
    PatternsChanged { index: usize },
    #[allow(missing_docs)]
    PatternFocusChanged { index: usize },
    /// The playing pattern changed or a transition started or finished.
    #[allow(missing_docs)]
    ActivePatternChanged { index: usize },
    #[allow(missing_docs)]
    ClipAdded { index: usize, slot: usize },
    #[allow(missing_docs)]
    ClipRemoved { index: usize, slot: usize },
    #[allow(missing_docs)]
    ClipStateChanged { index: usize, slot: usize },
    #[allow(missing_docs)]
    ParameterChanged { parameter: ParameterUid },
    /// The device's remote-control list changed length or membership.
    #[allow(missing_docs)]
    RemoteControlsChanged { device: DeviceUid },
    #[allow(missing_docs)]
    DeviceRemoved { device: DeviceUid },
}

/// A change in the modulation graph.
#[derive(Clone, Debug, PartialEq)]
pub enum ModulationEvent {
    #[allow(missing_docs)]
    ModulatorAdded {
        uid: ModulatorUid,
        scope: ModulationScope,
        label: String,
    },
    #[allow(missing_docs)]
    ModulatorRemoved {
        uid: ModulatorUid,
        scope: ModulationScope,
    },
    #[allow(missing_docs)]
    ModulatorRelabeled {
        uid: ModulatorUid,
        scope: ModulationScope,
        label: String,
    },
    #[allow(missing_docs)]
    ModulationAdded {
        uid: ModulationUid,
        source: ModulatorUid,
        target: ParameterUid,
    },
    #[allow(missing_docs)]
    ModulationRemoved {
        uid: ModulationUid,
        source: ModulatorUid,
        target: ParameterUid,
    },
    #[allow(missing_docs)]
    ModulationRangeChanged {
        uid: ModulationUid,
        target: ParameterUid,
    },
}

/// Everything a host reports, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    #[allow(missing_docs)]
    Model(ModelEvent),
    #[allow(missing_docs)]
    Modulation(ModulationEvent),
}
