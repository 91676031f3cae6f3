// Copyright (c) 2024 Mike Tsao

//! Support for structs that hold configuration information and are intended
//! to be serialized.

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Tracks whether a settings struct has changed since it was last persisted.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved to disk.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load() or a save().
    fn mark_clean(&mut self);
}

/// JSON persistence for any [HasSettings] struct.
pub trait JsonSettings: HasSettings + Serialize + DeserializeOwned + Sized {
    /// Parses settings from JSON. The result is clean.
    fn from_json(json: &str) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.mark_clean();
        Ok(settings)
    }

    /// Serializes settings to JSON and marks them clean.
    fn to_json(&mut self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        self.mark_clean();
        Ok(json)
    }
}
impl<T: HasSettings + Serialize + DeserializeOwned> JsonSettings for T {}
