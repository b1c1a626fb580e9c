//! # Event bus.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]: the supervisor
//! publishes, any number of observers subscribe through
//! [`Dispatcher::subscribe`](crate::Dispatcher::subscribe).
//!
//! ## Rules
//! - **Non-blocking publish**: the supervisor never waits on an observer.
//! - **Bounded**: one ring buffer shared by all receivers; slow receivers get
//!   `RecvError::Lagged(n)` and skip the `n` oldest events.
//! - **No persistence**: events published while nobody listens are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for dispatcher events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus; `capacity` is clamped to a minimum of 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers; returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = Bus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Online).with_attempt(1));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::Online);
        assert_eq!(ev.attempt, Some(1));
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        Bus::new(4).publish(Event::new(EventKind::Stopped));
    }
}
