//! # Dispatcher events.
//!
//! [`EventKind`] classifies what the supervisor loop just did; [`Event`]
//! carries the metadata (client, attempt, delay, error).
//!
//! ## One reconnect round
//! ```text
//! BackoffScheduled{delay} → ConnectAttempt{attempt} → ConnectFailed{error}
//!                                                   → Online → [CarriedResent] → ... → SendFailed{error} → Offline
//!                                                                                    → Offline
//! ```
//!
//! ## Ordering guarantees
//! `seq` is global and strictly increasing; use it to restore order when
//! events from several dispatchers are merged.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use linkvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_client("sensor-1")
//!     .with_attempt(3)
//!     .with_delay(Duration::from_millis(40));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.client.as_deref(), Some("sensor-1"));
//! assert_eq!(ev.delay, Some(Duration::from_millis(40)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of dispatcher events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A connection is about to be created.
    ///
    /// Sets `attempt` (1-based, counts every attempt of this dispatcher).
    ConnectAttempt,

    /// Creating a connection failed; a reconnect will follow.
    ///
    /// Sets `attempt`, `error`.
    ConnectFailed,

    /// A connection was established and the send loop is running on it.
    ///
    /// Sets `attempt`.
    Online,

    /// The send loop left its connection (lost or shutting down); the connection is closed.
    ///
    /// Sets `attempt`.
    Offline,

    /// The supervisor is waiting before the next attempt.
    ///
    /// Sets `attempt` (the attempt about to follow), `delay`.
    BackoffScheduled,

    /// Sending a message failed; the message is carried to the next connection.
    ///
    /// Sets `attempt`, `error`.
    SendFailed,

    /// The carried message was delivered on a fresh connection.
    ///
    /// Sets `attempt`.
    CarriedResent,

    /// `close` was called.
    ShutdownRequested,

    /// The supervisor returned; no connection is left open.
    Stopped,
}

/// Dispatcher event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Client identifier of the emitting dispatcher.
    pub client: Option<Arc<str>>,
    /// Connection attempt number (starting from 1).
    pub attempt: Option<u64>,
    /// Delay before the next attempt.
    pub delay: Option<Duration>,
    /// Human-readable error.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            client: None,
            attempt: None,
            delay: None,
            error: None,
        }
    }

    /// Attaches the client identifier.
    #[inline]
    pub fn with_client(mut self, client: impl Into<Arc<str>>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay.
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Attaches an error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::ConnectAttempt);
        let b = Event::new(EventKind::Online);
        assert!(b.seq > a.seq);
    }
}
