//! # Client configuration.
//!
//! [`ClientInfo`] carries everything one dispatcher needs: the endpoint
//! parameters handed to the connection collaborator on every attempt, the
//! outbound queue capacity and the reconnect backoff bounds.
//!
//! It is immutable once a [`Dispatcher`](crate::Dispatcher) is built from it.
//!
//! ## Sentinel values
//! - `buffer_size = 0` → clamped to 1 (a channel cannot have zero capacity)
//! - `interval < min_interval` → every reconnect waits `interval`

use std::time::Duration;

use crate::policies::{BackoffPolicy, JitterPolicy};

/// A topic subscription the connection establishes after connecting.
///
/// The dispatcher never interprets it; it is passed through to the
/// [`Connector`](crate::Connector).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    /// Topic filter.
    pub topic: String,
    /// Requested quality of service (0, 1 or 2).
    pub qos: u8,
}

impl Subscription {
    /// Creates a subscription.
    pub fn new(topic: impl Into<String>, qos: u8) -> Self {
        Self {
            topic: topic.into(),
            qos,
        }
    }
}

/// Connection parameters for one remote endpoint.
///
/// ## Field semantics
/// - `address`, `client_id`, `username`, `password`, `clean_session`,
///   `keepalive`, `timeout`, `subscriptions`: consumed by the connector only
/// - `buffer_size`: outbound queue capacity
/// - `interval`: maximum delay between reconnect attempts
/// - `min_interval`, `backoff_factor`: start and growth of the reconnect delay
/// - `jitter`: randomization of each reconnect delay
/// - `reset_backoff_on_connect`: restart the delay sequence after every
///   successful connect (off by default: the sequence only ever grows)
#[derive(Clone, Debug)]
pub struct ClientInfo {
    /// Remote endpoint, e.g. `tcp://127.0.0.1:1883`.
    pub address: String,
    /// Client identifier; also tagged on every log line.
    pub client_id: String,
    /// Optional user name.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Ask the remote to discard session state on connect.
    pub clean_session: bool,
    /// Keepalive period the connection should negotiate.
    pub keepalive: Duration,
    /// Per-operation timeout the connection should apply.
    pub timeout: Duration,
    /// Maximum reconnect delay.
    pub interval: Duration,
    /// First reconnect delay.
    pub min_interval: Duration,
    /// Reconnect delay growth factor.
    pub backoff_factor: f64,
    /// Reconnect delay randomization.
    pub jitter: JitterPolicy,
    /// Outbound queue capacity.
    pub buffer_size: usize,
    /// Subscriptions to establish on every connection.
    pub subscriptions: Vec<Subscription>,
    /// Restart the reconnect delay sequence after each successful connect.
    pub reset_backoff_on_connect: bool,
}

impl ClientInfo {
    /// Returns the outbound queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn buffer_size_clamped(&self) -> usize {
        self.buffer_size.max(1)
    }

    /// Builds the reconnect backoff policy from `min_interval`, `interval`,
    /// `backoff_factor` and `jitter`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use linkvisor::ClientInfo;
    ///
    /// let info = ClientInfo {
    ///     interval: Duration::from_secs(5),
    ///     ..ClientInfo::default()
    /// };
    /// let policy = info.backoff_policy();
    /// assert_eq!(policy.min, Duration::from_millis(500));
    /// assert_eq!(policy.max, Duration::from_secs(5));
    /// ```
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            min: self.min_interval,
            max: self.interval,
            factor: self.backoff_factor,
            jitter: self.jitter,
        }
    }

    /// Sets the client identifier.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Sets the remote address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }
}

impl Default for ClientInfo {
    /// Default configuration:
    ///
    /// - `address = "tcp://127.0.0.1:1883"`, empty `client_id`, no credentials
    /// - `clean_session = true`, `keepalive = 30s`, `timeout = 30s`
    /// - `interval = 60s`, `min_interval = 500ms`, `backoff_factor = 2.0`, no jitter
    /// - `buffer_size = 10`, no subscriptions, no backoff reset
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:1883".to_string(),
            client_id: String::new(),
            username: None,
            password: None,
            clean_session: true,
            keepalive: Duration::from_secs(30),
            timeout: Duration::from_secs(30),
            interval: Duration::from_secs(60),
            min_interval: Duration::from_millis(500),
            backoff_factor: 2.0,
            jitter: JitterPolicy::None,
            buffer_size: 10,
            subscriptions: Vec::new(),
            reset_backoff_on_connect: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_buffer_is_clamped() {
        let info = ClientInfo {
            buffer_size: 0,
            ..ClientInfo::default()
        };
        assert_eq!(info.buffer_size_clamped(), 1);
    }

    #[test]
    fn test_backoff_policy_follows_fields() {
        let info = ClientInfo {
            min_interval: Duration::from_millis(10),
            interval: Duration::from_millis(100),
            backoff_factor: 3.0,
            ..ClientInfo::default()
        };
        let p = info.backoff_policy();
        assert_eq!(p.next(0), Duration::from_millis(10));
        assert_eq!(p.next(1), Duration::from_millis(30));
        assert_eq!(p.next(2), Duration::from_millis(90));
        assert_eq!(p.next(3), Duration::from_millis(100));
    }

    #[test]
    fn test_jitter_reaches_policy() {
        let info = ClientInfo {
            min_interval: Duration::from_millis(10),
            interval: Duration::from_millis(100),
            jitter: JitterPolicy::Full,
            ..ClientInfo::default()
        };
        let p = info.backoff_policy();
        assert_eq!(p.jitter, JitterPolicy::Full);
        for attempt in 0..8 {
            assert!(p.next(attempt) <= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_builders() {
        let info = ClientInfo::default()
            .with_client_id("sensor-1")
            .with_address("tcp://broker:1883");
        assert_eq!(info.client_id, "sensor-1");
        assert_eq!(info.address, "tcp://broker:1883");
    }
}
