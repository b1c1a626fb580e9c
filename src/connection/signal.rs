//! # One-shot death signal.
//!
//! A [`DeathSignal`] is how a connection tells the dispatcher it has failed on
//! its own (keepalive timeout, remote close) without a failed send. It fires at
//! most once; every clone observes the same firing.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Broadcastable one-time event. Cheap to clone.
///
/// ```rust
/// use linkvisor::DeathSignal;
///
/// let signal = DeathSignal::new();
/// let observer = signal.clone();
/// assert!(!observer.is_fired());
///
/// signal.fire();
/// signal.fire(); // no-op
/// assert!(observer.is_fired());
/// ```
#[derive(Clone, Debug, Default)]
pub struct DeathSignal {
    token: CancellationToken,
}

impl DeathSignal {
    /// Creates an unfired signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Later calls do nothing.
    pub fn fire(&self) {
        self.token.cancel();
    }

    /// Whether the signal has fired.
    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired (immediately if it already has).
    pub fn fired(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fire_wakes_waiter() {
        let signal = DeathSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.fired().await });

        signal.fire();
        handle.await.unwrap();
        assert!(signal.is_fired());
    }
}
