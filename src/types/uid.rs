// Copyright (c) 2024 Mike Tsao

//! Unique identifiers for the things a surface and a binding engine talk
//! about, and factories that help ensure they are in fact unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// An optional Uid trait.
pub trait IsUid: Eq + Hash + Clone + From<usize> {
    /// Returns the raw uid.
    fn as_usize(&self) -> usize;
}

macro_rules! uid_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Synonym, Derivative, Serialize, Deserialize)]
        #[derivative(Default)]
        #[synonym(skip(Default))]
        #[serde(rename_all = "kebab-case")]
        pub struct $name(#[derivative(Default(value = "1"))] pub usize);
        impl IsUid for $name {
            fn as_usize(&self) -> usize {
                self.0
            }
        }
    };
}

uid_type!(
    /// Identifies a mixer channel, independent of its current position.
    ChannelUid
);
uid_type!(
    /// Identifies a device (a pattern or an effect) that exposes remote
    /// controls.
    DeviceUid
);
uid_type!(
    /// Identifies one remote-control parameter of a device.
    ParameterUid
);
uid_type!(
    /// Identifies a modulator, a numeric signal source.
    ModulatorUid
);
uid_type!(
    /// Identifies a modulation, the edge from a modulator to a target
    /// parameter.
    ModulationUid
);
uid_type!(
    /// Identifies a subscriber to binding-engine events.
    SubscriberId
);
uid_type!(
    /// Identifies a registered modulator source plugin.
    SourceId
);

/// Generates unique uids.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UidFactory<U: IsUid> {
    pub(crate) next_uid_value: AtomicUsize,
    #[serde(skip)]
    pub(crate) _phantom: PhantomData<U>,
}
impl<U: IsUid> Default for UidFactory<U> {
    fn default() -> Self {
        Self::new(1)
    }
}
impl<U: IsUid> UidFactory<U> {
    /// Creates a new [UidFactory] starting with the given value.
    pub fn new(first_uid: usize) -> Self {
        Self {
            next_uid_value: AtomicUsize::new(first_uid),
            _phantom: Default::default(),
        }
    }

    /// Generates the next unique uid.
    pub fn mint_next(&self) -> U {
        let uid_value = self.next_uid_value.fetch_add(1, Ordering::Relaxed);
        U::from(uid_value)
    }

    /// Notifies the factory that a uid exists that might have been created
    /// elsewhere (for example, by a host that restored a saved show). This
    /// gives the factory an opportunity to adjust `next_uid_value` to stay
    /// consistent with all known uids.
    pub fn notify_externally_minted_uid(&self, uid: U) {
        if uid.as_usize() >= self.next_uid_value.load(Ordering::Relaxed) {
            self.next_uid_value
                .store(uid.as_usize() + 1, Ordering::Relaxed);
        }
    }
}
impl<U: IsUid> PartialEq for UidFactory<U> {
    fn eq(&self, other: &Self) -> bool {
        self.next_uid_value.load(Ordering::Relaxed) == other.next_uid_value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uid_factory_mints_distinct_uids() {
        let f = UidFactory::<ModulatorUid>::default();

        let uid_1 = f.mint_next();
        let uid_2 = f.mint_next();
        assert_ne!(uid_1, uid_2, "Minted Uids should not repeat");

        let uid_3 = ModulatorUid(uid_2.0 + 1);
        let uid_3_expected_duplicate = f.mint_next();
        assert_eq!(
            uid_3, uid_3_expected_duplicate,
            "Minted Uids will repeat if factory doesn't know about them all"
        );

        let mut ids: HashSet<ModulatorUid> = Default::default();
        for _ in 0..64 {
            let uid = f.mint_next();
            assert!(ids.insert(uid), "every minted modulator uid should be new");
        }
    }

    #[test]
    fn uid_factory_with_notify_works() {
        let f = UidFactory::<ModulationUid>::default();

        let uid_1 = f.mint_next();
        let uid_2 = f.mint_next();
        assert_ne!(uid_1, uid_2, "Minted Uids should not repeat");

        let uid_3 = ModulationUid(uid_2.0 + 1);
        f.notify_externally_minted_uid(uid_3);
        let uid_4 = f.mint_next();
        assert_ne!(
            uid_3, uid_4,
            "Notifying factory should cause it to skip past."
        );

        f.notify_externally_minted_uid(uid_3);
        let uid_5 = f.mint_next();
        assert_eq!(
            uid_5.0,
            uid_4.0 + 1,
            "Notifying factory about value below next should be no-op."
        );
    }

    #[test]
    fn default_uids_start_at_one() {
        assert_eq!(DeviceUid::default().0, 1);
        assert_eq!(UidFactory::<ChannelUid>::default().mint_next(), ChannelUid(1));
    }
}
