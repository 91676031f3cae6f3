// Copyright (c) 2024 Mike Tsao

use thiserror::Error;

/// Input the surface couldn't place. These are logged and dropped.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SurfaceError {
    /// A button code outside every known zone.
    #[error("unmapped note {0}")]
    UnmappedNote(u8),
    /// A controller number that isn't a fader.
    #[error("unmapped control change {0}")]
    UnmappedControl(u8),
}
