// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Supermod drives an 8x8 pad grid controller for a clip-and-pattern mixer,
//! and binds the controller's parameter grid to modulators.
//!
//! * [SurfaceController](surface::SurfaceController) turns pad, button and
//! fader input into host edits, and host notifications into LED messages.
//! * [BindingEngine](binding::BindingEngine) keeps a binding proxy for each
//! remote control of a device. Touching an unbound proxy creates a modulator
//! and an edge; clearing it removes only what the engine created.
//! * The host is anything that implements [Host](model::Host).
//! [MemoryHost](model::MemoryHost) is a complete one that lives in memory.

/// A collection of imports that are useful to users of this crate. `use
/// supermod::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        binding::prelude::*, model::prelude::*, surface::prelude::*, types::prelude::*,
        util::prelude::*,
    };
}

pub use version::app_version;
pub use {
    binding::BindingEngine,
    model::{Host, MemoryHost},
    surface::SurfaceController,
};

pub mod binding;
pub mod model;
pub mod surface;
pub mod types;
pub mod util;

mod version;
