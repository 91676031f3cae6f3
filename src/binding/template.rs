// Copyright (c) 2024 Mike Tsao

use crate::model::Waveshape;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::EnumCount;

/// A (tempo column, waveshape) choice from the 8x4 template matrix. It
/// decides what kind of modulator an unbound proxy synthesizes when it is
/// first touched.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[display(fmt = "{}/{:?}", column, waveshape)]
#[serde(rename_all = "kebab-case")]
pub struct Template {
    column: usize,
    waveshape: Waveshape,
}
impl Template {
    /// Number of tempo columns.
    pub const COLUMN_COUNT: usize = 8;
    /// Number of waveshape variants.
    pub const VARIANT_COUNT: usize = Waveshape::COUNT;

    /// Builds a template, clamping the column and falling back to the
    /// default waveshape for an unknown variant.
    pub fn new(column: usize, variant: usize) -> Self {
        Self {
            column: column.min(Self::COLUMN_COUNT - 1),
            waveshape: Waveshape::from_repr(variant).unwrap_or_default(),
        }
    }

    #[allow(missing_docs)]
    pub fn column(&self) -> usize {
        self.column
    }

    /// The waveshape's row in the matrix.
    pub fn variant(&self) -> usize {
        self.waveshape as usize
    }

    #[allow(missing_docs)]
    pub fn waveshape(&self) -> Waveshape {
        self.waveshape
    }
}
