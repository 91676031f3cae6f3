// Copyright (c) 2024 Mike Tsao

//! Global template slots, discovered from modulator labels.

use super::template::Template;
use crate::types::ModulatorUid;

/// The label prefix that marks a modulator as created and owned by the
/// binding engine. Followed by 1..=8, it names a global slot.
pub const OWNERSHIP_PREFIX: &str = "SM_";

/// Returns the global slot a label claims, if any: the ownership prefix
/// followed by an integer 1..=8 claims slot `n - 1`.
pub fn parse_slot_label(label: &str) -> Option<usize> {
    let number: i64 = label.strip_prefix(OWNERSHIP_PREFIX)?.parse().ok()?;
    (1..=Template::COLUMN_COUNT as i64)
        .contains(&number)
        .then(|| (number - 1) as usize)
}

/// Whether a label carries the ownership prefix.
pub fn is_owned_label(label: &str) -> bool {
    label.starts_with(OWNERSHIP_PREFIX)
}

/// Which global modulator, if any, occupies each of the eight template slots.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlobalSlotRegistry {
    slots: [Option<ModulatorUid>; Template::COLUMN_COUNT],
}
impl GlobalSlotRegistry {
    /// Re-derives `uid`'s slot from `label`. Returns whether occupancy
    /// changed.
    pub fn update(&mut self, uid: ModulatorUid, label: &str) -> bool {
        match parse_slot_label(label) {
            Some(slot) => self.assign(uid, slot),
            None => self.remove(uid),
        }
    }

    /// Puts `uid` in `slot`, evicting the previous occupant and vacating any
    /// other slot `uid` held.
    fn assign(&mut self, uid: ModulatorUid, slot: usize) -> bool {
        if self.slots[slot] == Some(uid) {
            return false;
        }
        self.remove(uid);
        if let Some(evicted) = self.slots[slot].replace(uid) {
            log::debug!(target: "binding", "modulator {evicted} evicted from slot {slot}");
        }
        true
    }

    /// Vacates every slot `uid` held. Returns whether any did.
    pub fn remove(&mut self, uid: ModulatorUid) -> bool {
        let mut changed = false;
        for slot in self.slots.iter_mut().filter(|s| **s == Some(uid)) {
            *slot = None;
            changed = true;
        }
        changed
    }

    /// Rebuilds the table from scratch, in the order given.
    pub fn rebuild<'a>(&mut self, modulators: impl IntoIterator<Item = (ModulatorUid, &'a str)>) -> bool {
        let before = self.slots;
        self.slots = Default::default();
        for (uid, label) in modulators {
            self.update(uid, label);
        }
        before != self.slots
    }

    /// The modulator in `slot`, if any.
    pub fn occupant(&self, slot: usize) -> Option<ModulatorUid> {
        self.slots.get(slot).copied().flatten()
    }

    /// Whether `slot` is occupied.
    pub fn is_occupied(&self, slot: usize) -> bool {
        self.occupant(slot).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_labels_parse() {
        assert_eq!(parse_slot_label("SM_1"), Some(0));
        assert_eq!(parse_slot_label("SM_3"), Some(2));
        assert_eq!(parse_slot_label("SM_8"), Some(7));
        assert_eq!(parse_slot_label("SM_03"), Some(2), "leading zeros are still a number");
        assert_eq!(parse_slot_label("SM_0"), None, "zero is out of range");
        assert_eq!(parse_slot_label("SM_9"), None, "nine is out of range");
        assert_eq!(parse_slot_label("SM_-1"), None);
        assert_eq!(parse_slot_label("SM_Speed"), None);
        assert_eq!(parse_slot_label("SM_"), None);
        assert_eq!(parse_slot_label("LFO 3"), None);
        assert_eq!(parse_slot_label("sm_3"), None, "the prefix is case sensitive");
    }

    #[test]
    fn ownership_is_a_prefix_match() {
        assert!(is_owned_label("SM_Speed"));
        assert!(is_owned_label("SM_3"));
        assert!(!is_owned_label("LFO"));
    }

    #[test]
    fn relabel_out_of_range_evicts_without_reassigning() {
        let mut registry = GlobalSlotRegistry::default();
        let m = ModulatorUid(10);
        assert!(registry.update(m, "SM_3"));
        assert_eq!(registry.occupant(2), Some(m), "SM_3 should land in slot 2");

        assert!(registry.update(m, "SM_9"), "leaving a slot is a change");
        assert_eq!(registry.occupant(2), None);
        assert!((0..8).all(|s| !registry.is_occupied(s)), "SM_9 claims nothing");
    }

    #[test]
    fn second_claimant_wins_the_slot() {
        let mut registry = GlobalSlotRegistry::default();
        let first = ModulatorUid(1);
        let second = ModulatorUid(2);
        registry.update(first, "SM_1");
        registry.update(second, "SM_1");
        assert_eq!(registry.occupant(0), Some(second));
        assert_eq!(
            (0..8).filter(|s| registry.is_occupied(*s)).count(),
            1,
            "the evicted modulator shouldn't reappear elsewhere"
        );
    }

    #[test]
    fn moving_between_slots_vacates_the_old_one() {
        let mut registry = GlobalSlotRegistry::default();
        let m = ModulatorUid(4);
        registry.update(m, "SM_2");
        registry.update(m, "SM_5");
        assert_eq!(registry.occupant(1), None);
        assert_eq!(registry.occupant(4), Some(m));
        assert!(!registry.update(m, "SM_5"), "same label again changes nothing");
    }

    #[test]
    fn rebuild_reports_changes() {
        let mut registry = GlobalSlotRegistry::default();
        assert!(registry.rebuild([(ModulatorUid(1), "SM_1"), (ModulatorUid(2), "other")]));
        assert!(!registry.rebuild([(ModulatorUid(1), "SM_1")]));
        assert!(registry.rebuild(std::iter::empty()));
    }
}
