// Copyright (c) 2024 Mike Tsao

use crate::{
    types::{DeviceUid, ParameterUid, SourceId},
    util::SubscriptionError,
};
use thiserror::Error;

/// Errors from the binding engine. None of them leaves the engine in a
/// partially updated state.
#[derive(Debug, Error)]
pub enum BindingError {
    #[allow(missing_docs)]
    #[error("no binding proxy at position {index} of device {device}")]
    NoProxy { device: DeviceUid, index: usize },
    #[allow(missing_docs)]
    #[error("device {0} no longer exists")]
    UnknownDevice(DeviceUid),
    /// The host wouldn't build the modulator.
    #[error("couldn't create modulator {label}: {reason}")]
    #[allow(missing_docs)]
    ModulatorRejected { label: String, reason: String },
    /// The host wouldn't link the modulator to the target.
    #[error("couldn't modulate parameter {target}: {reason}")]
    #[allow(missing_docs)]
    EdgeRejected { target: ParameterUid, reason: String },
    /// The host refused some other change.
    #[error("host refused the change: {0}")]
    Host(String),
    #[allow(missing_docs)]
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
    #[allow(missing_docs)]
    #[error("modulator source {0} is already registered")]
    DuplicateSource(SourceId),
    #[allow(missing_docs)]
    #[error("modulator source {0} is not registered")]
    UnknownSource(SourceId),
    #[allow(missing_docs)]
    #[error("the binding engine has been disposed")]
    Disposed,
}
impl BindingError {
    pub(crate) fn host(error: anyhow::Error) -> Self {
        Self::Host(error.to_string())
    }
}
