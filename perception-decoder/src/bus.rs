//! Notification bus
//!
//! Typed multicast dispatcher. Subscribers register a callback and get back a
//! [`SubscriptionId`] that is later used to unregister. `fire` calls every
//! callback synchronously, in registration order, with the same payload.
//!
//! `fire` takes `&mut self`, so a callback cannot register or unregister
//! subscribers on the bus that is dispatching to it.

use std::collections::BTreeMap;
use std::fmt;

/// Token identifying one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Subscriber callback. The return value is reserved and currently ignored.
pub type Callback<T> = Box<dyn FnMut(&T) -> bool>;

pub struct EventBus<T> {
    // Ids are handed out in increasing order, so key order is registration order
    handlers: BTreeMap<SubscriptionId, Callback<T>>,
    next_id: u64,
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn register<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) -> bool + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.insert(id, Box::new(callback));

        log::debug!("Registered subscriber {}", id);
        id
    }

    /// Remove a subscriber; `false` if the id is not registered
    pub fn unregister(&mut self, id: SubscriptionId) -> bool {
        let removed = self.handlers.remove(&id).is_some();
        if removed {
            log::debug!("Unregistered subscriber {}", id);
        } else {
            log::warn!("Unregister of unknown subscriber {}", id);
        }
        removed
    }

    /// Deliver `payload` to every subscriber; returns how many were called
    pub fn fire(&mut self, payload: &T) -> usize {
        for (id, handler) in self.handlers.iter_mut() {
            let reserved = handler(payload);
            log::trace!("Subscriber {} returned {}", id, reserved);
        }
        self.handlers.len()
    }

    pub fn is_registered(&self, id: SubscriptionId) -> bool {
        self.handlers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
