// Copyright (c) 2024 Mike Tsao

use crate::types::SubscriberId;
use crossbeam::channel::{Receiver, Sender};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// A convenience struct to bundle both halves of a crossbeam channel together.
#[derive(Debug)]
pub struct CrossbeamChannel<T> {
    #[allow(missing_docs)]
    pub sender: Sender<T>,
    #[allow(missing_docs)]
    pub receiver: Receiver<T>,
}
impl<T> Default for CrossbeamChannel<T> {
    fn default() -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded();
        Self { sender, receiver }
    }
}

/// Misuse of a [Subscribers] registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The same subscription was registered twice.
    #[error("subscriber {0} is already registered")]
    Duplicate(SubscriberId),
    /// A subscription was released that was never registered.
    #[error("subscriber {0} is not registered")]
    Unknown(SubscriberId),
}

/// A listener registry. Each subscription is a [SubscriberId] handle that owns
/// the receiving half of its own channel; broadcasting clones the event into
/// every live channel.
#[derive(Debug)]
pub struct Subscribers<E> {
    senders: FxHashMap<SubscriberId, Sender<E>>,
}
impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            senders: Default::default(),
        }
    }
}
impl<E: Clone> Subscribers<E> {
    /// Registers `id` and returns the receiver its events will arrive on.
    pub fn subscribe(&mut self, id: SubscriberId) -> Result<Receiver<E>, SubscriptionError> {
        if self.senders.contains_key(&id) {
            return Err(SubscriptionError::Duplicate(id));
        }
        let channel = CrossbeamChannel::default();
        self.senders.insert(id, channel.sender);
        Ok(channel.receiver)
    }

    /// Releases `id`. Its receiver sees a disconnected channel afterward.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> Result<(), SubscriptionError> {
        self.senders
            .remove(&id)
            .map(|_| ())
            .ok_or(SubscriptionError::Unknown(id))
    }

    /// Sends `event` to every subscriber. A subscriber whose receiver was
    /// dropped without unsubscribing is forgotten.
    pub fn broadcast(&mut self, event: E) {
        self.senders.retain(|id, sender| {
            let delivered = sender.send(event.clone()).is_ok();
            if !delivered {
                log::debug!(target: "subscribers", "dropping subscriber {id}: receiver is gone");
            }
            delivered
        });
    }

    /// Sends `event` to a single subscriber.
    pub fn send_to(&self, id: SubscriberId, event: E) -> Result<(), SubscriptionError> {
        let sender = self
            .senders
            .get(&id)
            .ok_or(SubscriptionError::Unknown(id))?;
        let _ = sender.send(event);
        Ok(())
    }

    /// Forgets every subscriber.
    pub fn clear(&mut self) {
        self.senders.clear();
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
