// Copyright (c) 2024 Mike Tsao

use super::slots::is_owned_label;
use crate::{
    model::ModulationHost,
    types::{ModulationUid, Normal, ParameterUid},
};
use strum_macros::{Display, IntoStaticStr};

/// Who, if anyone, is modulating a proxy's target.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, IntoStaticStr)]
pub enum BindingState {
    /// No edge.
    Unbound,
    /// The edge's source was made by this engine.
    SelfOwned,
    /// The edge's source belongs to someone else.
    Foreign,
}
impl BindingState {
    /// Classifies from the label of the edge's source modulator, or [None] if
    /// there is no edge.
    pub fn classify(source_label: Option<&str>) -> Self {
        match source_label {
            None => Self::Unbound,
            Some(label) if is_owned_label(label) => Self::SelfOwned,
            Some(_) => Self::Foreign,
        }
    }
}

/// A stand-in for "the modulation applied to one remote control." It tracks at
/// most one edge into its target.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingProxy {
    target: ParameterUid,
    label: String,
    edge: Option<ModulationUid>,
}
impl BindingProxy {
    pub(crate) fn new(target: ParameterUid, label: String, edge: Option<ModulationUid>) -> Self {
        Self {
            target,
            label,
            edge,
        }
    }

    /// The remote control this proxy stands in for.
    pub fn target(&self) -> ParameterUid {
        self.target
    }

    /// The target's display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The tracked edge, if any.
    pub fn edge(&self) -> Option<ModulationUid> {
        self.edge
    }

    pub(crate) fn set_edge(&mut self, edge: Option<ModulationUid>) {
        self.edge = edge;
    }

    /// The tracked edge, if the host still has it.
    pub fn live_edge<H: ModulationHost + ?Sized>(&self, host: &H) -> Option<ModulationUid> {
        self.edge.filter(|edge| host.modulation(*edge).is_some())
    }

    #[allow(missing_docs)]
    pub fn state<H: ModulationHost + ?Sized>(&self, host: &H) -> BindingState {
        let source_label = self
            .edge
            .and_then(|edge| host.modulation(edge))
            .and_then(|modulation| host.modulator(modulation.source))
            .map(|modulator| modulator.label);
        BindingState::classify(source_label.as_deref())
    }

    /// The edge's range as a normalized value. An unbound proxy sits at the
    /// center.
    pub fn value<H: ModulationHost + ?Sized>(&self, host: &H) -> Normal {
        self.edge
            .and_then(|edge| host.modulation(edge))
            .map(|modulation| Normal::from(modulation.range))
            .unwrap_or(Normal::CENTER)
    }

    /// Whether the proxy's value is its default.
    pub fn is_default<H: ModulationHost + ?Sized>(&self, host: &H) -> bool {
        (self.value(host).0 - Normal::CENTER.0).abs() < f64::EPSILON
    }
}
