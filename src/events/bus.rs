//! # Lifecycle event channel of one registry.
//!
//! Task threads, the reaper and the registry itself publish into the same
//! [`Bus`]; the registry's subscriber listener is its usual reader, and
//! [`Registry::events`](crate::Registry::events) hands out extra receivers.
//!
//! ```text
//! task threads ──┐
//! reaper       ──┼──► Bus (broadcast ring) ──► subscriber listener ──► SubscriberSet
//! registry     ──┘                         └─► Registry::events() receivers
//! ```
//!
//! Publishing is a plain call usable from OS threads. A receiver that falls
//! more than `Config::bus_capacity` events behind skips the oldest ones.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publishing handle over a broadcast ring of [`Event`]s.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus keeping up to `capacity` (at least 1) undelivered events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev`; with no receiver attached it is discarded.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::TaskStarted));
    }

    #[test]
    fn test_receiver_sees_events_after_subscribe() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::TaskStarted));
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TaskReaped).with_task("t"));

        let ev = rx.try_recv().expect("event");
        assert_eq!(ev.kind, EventKind::TaskReaped);
        assert!(rx.try_recv().is_err());
    }
}
