// Copyright (c) 2024 Mike Tsao

use super::template::Template;
use crate::{types::TempoDivision, util::HasSettings};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Persistent binding-engine settings.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct BindingSettings {
    /// The tempo division each template column clocks its LFOs to.
    #[derivative(Default(value = "Self::DEFAULT_TEMPO_DIVISIONS"))]
    tempo_divisions: [TempoDivision; Template::COLUMN_COUNT],

    #[serde(skip)]
    has_been_saved: bool,
}
impl HasSettings for BindingSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl BindingSettings {
    #[allow(missing_docs)]
    pub const DEFAULT_TEMPO_DIVISIONS: [TempoDivision; Template::COLUMN_COUNT] = [
        TempoDivision::Sixteenth,
        TempoDivision::Quarter,
        TempoDivision::Half,
        TempoDivision::Whole,
        TempoDivision::Double,
        TempoDivision::Four,
        TempoDivision::Eight,
        TempoDivision::Sixteen,
    ];

    /// The tempo division of a template column. Out-of-range columns read
    /// the last one.
    pub fn tempo_division(&self, column: usize) -> TempoDivision {
        self.tempo_divisions[column.min(Template::COLUMN_COUNT - 1)]
    }

    /// Changes a column's tempo division. Out-of-range columns are ignored.
    pub fn set_tempo_division(&mut self, column: usize, division: TempoDivision) {
        if let Some(slot) = self.tempo_divisions.get_mut(column) {
            if *slot != division {
                *slot = division;
                self.needs_save();
            }
        }
    }
}
