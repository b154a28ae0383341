//! Plane event bus.
//!
//! An explicit observer registry owned by the host. Providers publish into
//! it, visualizers subscribe and drain their own mailbox once per frame.
//! Events published while nobody is subscribed are dropped.

use ar_events::{BoundedPlane, PlaneEvent};
use bevy_ecs::prelude::*;
use std::collections::{BTreeMap, VecDeque};

/// Handle returned by [`PlaneEventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Registry of plane event subscribers.
#[derive(Resource, Debug, Default)]
pub struct PlaneEventBus {
    next_id: u64,
    mailboxes: BTreeMap<SubscriptionId, VecDeque<PlaneEvent>>,
    published: u64,
}

impl PlaneEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. It only sees events published afterwards.
    pub fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.mailboxes.insert(id, VecDeque::new());
        id
    }

    /// Remove a subscriber and discard its pending events.
    ///
    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.mailboxes.remove(&id).is_some()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.mailboxes.contains_key(&id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.mailboxes.len()
    }

    /// Total number of events published over the bus lifetime.
    pub fn published_count(&self) -> u64 {
        self.published
    }

    /// Deliver an event to every current subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&mut self, event: PlaneEvent) -> usize {
        self.published += 1;
        for mailbox in self.mailboxes.values_mut() {
            mailbox.push_back(event.clone());
        }
        self.mailboxes.len()
    }

    pub fn plane_added(&mut self, plane: BoundedPlane) -> usize {
        self.publish(PlaneEvent::Added(plane))
    }

    pub fn plane_updated(&mut self, plane: BoundedPlane) -> usize {
        self.publish(PlaneEvent::Updated(plane))
    }

    pub fn plane_removed(&mut self, plane: BoundedPlane) -> usize {
        self.publish(PlaneEvent::Removed(plane))
    }

    /// Take every pending event for a subscriber, oldest first.
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<PlaneEvent> {
        self.mailboxes
            .get_mut(&id)
            .map(|mailbox| mailbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Number of events waiting for a subscriber.
    pub fn pending(&self, id: SubscriptionId) -> usize {
        self.mailboxes.get(&id).map_or(0, VecDeque::len)
    }
}
