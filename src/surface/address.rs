// Copyright (c) 2024 Mike Tsao

//! The note map of the grid surface, and the pure coordinate transforms of its
//! four addressing schemes. Grid rows are counted from the top (`y = 0` is the
//! top row); the device numbers its notes from the bottom-left.

use strum_macros::FromRepr;

/// Rows of the button matrix.
pub const GRID_ROWS: usize = 8;
/// Columns of the button matrix.
pub const GRID_COLUMNS: usize = 8;
/// The highest grid note.
pub const GRID_LAST: u8 = 63;

/// The first of eight channel buttons under the grid.
pub const CHANNEL_BUTTON_FIRST: u8 = 100;
/// How many channel buttons there are.
pub const CHANNEL_BUTTON_COUNT: usize = 8;
/// Shift + this code selects [Focus](super::ChannelButtonMode::Focus).
pub const FOCUS_MODE: u8 = 100;
/// Shift + this code selects [Enabled](super::ChannelButtonMode::Enabled).
pub const ENABLED_MODE: u8 = 101;
/// Shift + this code selects [Cue](super::ChannelButtonMode::Cue).
pub const CUE_MODE: u8 = 102;
/// Shift + this code selects [Arm](super::ChannelButtonMode::Arm).
pub const ARM_MODE: u8 = 103;
#[allow(missing_docs)]
pub const SELECT_UP: u8 = 104;
#[allow(missing_docs)]
pub const SELECT_DOWN: u8 = 105;
#[allow(missing_docs)]
pub const SELECT_LEFT: u8 = 106;
#[allow(missing_docs)]
pub const SELECT_RIGHT: u8 = 107;

/// The first of the scene-launch buttons beside the grid.
pub const SCENE_LAUNCH_FIRST: u8 = 112;
/// How many scene-launch buttons there are.
pub const SCENE_LAUNCH_COUNT: usize = 6;
#[allow(missing_docs)]
pub const CLIP_STOP: u8 = 112;
#[allow(missing_docs)]
pub const SOLO: u8 = 113;
#[allow(missing_docs)]
pub const MUTE: u8 = 114;
#[allow(missing_docs)]
pub const REC_ARM: u8 = 115;
#[allow(missing_docs)]
pub const SELECT: u8 = 116;
/// Unshifted, toggles the clip grid.
pub const TOGGLE_CLIPS: u8 = 118;
/// Unshifted, toggles the parameter grid. Shifted, stops all clips.
pub const TOGGLE_PARAMETERS: u8 = 119;
#[allow(missing_docs)]
pub const STOP_ALL_CLIPS: u8 = 119;
#[allow(missing_docs)]
pub const SHIFT: u8 = 122;

/// The controller number of the first channel fader.
pub const CHANNEL_FADER_FIRST: u8 = 48;
/// How many channel faders there are.
pub const CHANNEL_FADER_COUNT: usize = 8;
#[allow(missing_docs)]
pub const MASTER_FADER: u8 = 56;

/// How many remote controls the parameter grid shows.
pub const PARAMETER_COUNT: usize = 16;
const PARAMETER_ANCHOR: i32 = 56;
const PARAMETER_COLUMNS: usize = 8;
const PARAMETER_COLUMN_STRIDE: i32 = 1;
const PARAMETER_ROW_STRIDE: i32 = -4;
const PARAMETER_STACK: usize = 4;

/// How many modulation indicators the binding overlay shows.
pub const INDICATOR_COUNT: usize = 32;
const INDICATOR_NOTES: [u8; INDICATOR_COUNT] = [
    24, 25, 26, 27, 16, 17, 18, 19, 8, 9, 10, 11, 0, 1, 2, 3, //
    28, 29, 30, 31, 20, 21, 22, 23, 12, 13, 14, 15, 4, 5, 6, 7,
];

/// The lowest note of the template rows (the top half of the grid).
pub const TEMPLATE_FIRST: u8 = 32;
/// Template rows; one per waveshape variant.
pub const TEMPLATE_ROWS: usize = 4;

/// What one button in a parameter's four-button stack does.
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
pub enum ParameterRole {
    #[allow(missing_docs)]
    Increment,
    #[allow(missing_docs)]
    Decrement,
    /// Resets the parameter; lit when it isn't at its default.
    Reset,
    /// Unused.
    Spare,
}

/// The note at grid row `y` (from the top) and column `x`.
pub fn grid_note(y: usize, x: usize) -> Option<u8> {
    (y < GRID_ROWS && x < GRID_COLUMNS).then(|| (GRID_COLUMNS * (GRID_ROWS - 1 - y) + x) as u8)
}

/// The (y, x) grid coordinates of `note`.
pub fn grid_coordinates(note: u8) -> Option<(usize, usize)> {
    (note <= GRID_LAST).then(|| {
        let note = note as usize;
        (GRID_ROWS - 1 - note / GRID_COLUMNS, note % GRID_COLUMNS)
    })
}

/// The anchor (increment) note of a parameter slot. Slots fill 8 columns,
/// and each following row of slots sits one four-button stack lower.
pub fn parameter_anchor(slot: usize) -> Option<u8> {
    if slot >= PARAMETER_COUNT {
        return None;
    }
    let row = (slot / PARAMETER_COLUMNS) as i32;
    let column = (slot % PARAMETER_COLUMNS) as i32;
    let note = PARAMETER_ANCHOR
        + row * GRID_COLUMNS as i32 * PARAMETER_ROW_STRIDE
        + column * PARAMETER_COLUMN_STRIDE;
    u8::try_from(note).ok()
}

/// The note of one button in a parameter's stack.
pub fn parameter_note(slot: usize, role: ParameterRole) -> Option<u8> {
    let anchor = parameter_anchor(slot)? as usize;
    anchor
        .checked_sub(GRID_COLUMNS * role as usize)
        .map(|note| note as u8)
}

/// The parameter slot and role of a grid note.
pub fn parameter_cell(note: u8) -> Option<(usize, ParameterRole)> {
    let (y, x) = grid_coordinates(note)?;
    let slot = (y / PARAMETER_STACK) * PARAMETER_COLUMNS + x;
    let role = ParameterRole::from_repr(y % PARAMETER_STACK)?;
    (slot < PARAMETER_COUNT).then_some((slot, role))
}

/// The note of a modulation indicator. Indicators 0..16 fill the left 4x4
/// block of the bottom half, 16..32 the right block.
pub fn indicator_note(index: usize) -> Option<u8> {
    if index >= INDICATOR_COUNT {
        return None;
    }
    let set = index / 16;
    let residual = index % 16;
    let row = residual / 4;
    let column = residual % 4 + 4 * set;
    Some(((3 - row) * GRID_COLUMNS + column) as u8)
}

/// The modulation indicator at `note`, found through the fixed table.
pub fn indicator_index(note: u8) -> Option<usize> {
    INDICATOR_NOTES.iter().position(|n| *n == note)
}

/// The note of a template button.
pub fn template_note(column: usize, variant: usize) -> Option<u8> {
    if variant >= TEMPLATE_ROWS {
        return None;
    }
    grid_note(variant, column)
}

/// The (column, variant) of a template button.
pub fn template_cell(note: u8) -> Option<(usize, usize)> {
    if !(TEMPLATE_FIRST..=GRID_LAST).contains(&note) {
        return None;
    }
    let offset = (note - TEMPLATE_FIRST) as usize;
    Some((offset % GRID_COLUMNS, TEMPLATE_ROWS - 1 - offset / GRID_COLUMNS))
}
