// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{HasSettings, JsonSettings, Subscribers};
}

pub use channels::{CrossbeamChannel, SubscriptionError, Subscribers};
pub use settings::{HasSettings, JsonSettings};

mod channels;
mod settings;
