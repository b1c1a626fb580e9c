//! # Reconnect backoff.
//!
//! [`BackoffPolicy`] is the pure part: given an attempt number it returns the
//! delay before the next reconnect. [`Backoff`] wraps a policy with the attempt
//! counter the supervisor advances on every failed round.
//!
//! The delay for attempt `n` is `min × factor^n`, clamped to `max`, then jitter
//! is applied. The base is derived from the attempt number alone, so jitter
//! output never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use linkvisor::{Backoff, BackoffPolicy, JitterPolicy};
//!
//! let mut backoff = Backoff::new(BackoffPolicy {
//!     min: Duration::from_millis(10),
//!     max: Duration::from_millis(100),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! });
//!
//! assert_eq!(backoff.next_delay(), Duration::from_millis(10));
//! assert_eq!(backoff.next_delay(), Duration::from_millis(20));
//! assert_eq!(backoff.next_delay(), Duration::from_millis(40));
//! assert_eq!(backoff.next_delay(), Duration::from_millis(80));
//! assert_eq!(backoff.next_delay(), Duration::from_millis(100));
//! assert_eq!(backoff.attempt(), 5);
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Reconnect backoff parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay returned for attempt 0.
    pub min: Duration,
    /// Upper bound for every delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `min = 500ms`, `max = 60s`, `factor = 2.0`, no jitter.
    fn default() -> Self {
        Self {
            min: Duration::from_millis(500),
            max: Duration::from_secs(60),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// ### Notes
    /// - `min > max` yields `max` for every attempt.
    /// - Overflowing or non-finite products clamp to `max`.
    /// - `factor == 1.0` keeps the delay constant at `min`.
    pub fn next(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped = self.min.as_secs_f64() * self.factor.powi(exp);

        let base = if !unclamped.is_finite() || unclamped < 0.0 || unclamped > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(unclamped)
        };

        self.jitter.apply(base, self.min.min(self.max), self.max)
    }
}

/// Stateful backoff: a [`BackoffPolicy`] plus the attempt counter.
///
/// The counter only moves forward; the dispatcher builds one `Backoff` per
/// lifetime and never resets it unless configured to.
#[derive(Clone, Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    /// Creates a backoff starting at attempt 0.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Returns the delay for the current attempt and advances the counter.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.policy.next(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Number of delays handed out since construction (or the last reset).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Restarts the sequence at `min`.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(min_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn test_attempt_zero_returns_min() {
        assert_eq!(policy(10, 100, 2.0).next(0), Duration::from_millis(10));
    }

    #[test]
    fn test_exponential_growth_then_clamp() {
        let p = policy(100, 1_000, 2.0);
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(2), Duration::from_millis(400));
        assert_eq!(p.next(3), Duration::from_millis(800));
        assert_eq!(p.next(4), Duration::from_millis(1_000));
        assert_eq!(p.next(40), Duration::from_millis(1_000));
    }

    #[test]
    fn test_min_exceeds_max() {
        assert_eq!(policy(10_000, 5_000, 2.0).next(0), Duration::from_millis(5_000));
    }

    #[test]
    fn test_non_finite_overflow_clamps_to_max() {
        assert_eq!(
            policy(100, 10_000, 2.0).next(u32::MAX),
            Duration::from_millis(10_000)
        );
    }

    #[test]
    fn test_stateful_delays_non_decreasing_and_bounded() {
        let mut backoff = Backoff::new(policy(10, 100, 2.0));
        let mut prev = Duration::ZERO;
        for _ in 0..32 {
            let delay = backoff.next_delay();
            assert!(delay >= prev, "{delay:?} < {prev:?}");
            assert!(delay <= Duration::from_millis(100));
            prev = delay;
        }
        assert_eq!(backoff.attempt(), 32);
    }

    #[test]
    fn test_reset_restarts_at_min() {
        let mut backoff = Backoff::new(policy(10, 100, 2.0));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_full_jitter_stays_under_base() {
        let p = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..policy(100, 30_000, 2.0)
        };
        for attempt in 0..12 {
            let base = p.min.as_secs_f64() * 2f64.powi(attempt as i32);
            let base = Duration::from_secs_f64(base).min(p.max);
            assert!(p.next(attempt) <= base);
        }
    }

    #[test]
    fn test_decorrelated_jitter_respects_bounds() {
        let p = BackoffPolicy {
            jitter: JitterPolicy::Decorrelated,
            ..policy(100, 30_000, 2.0)
        };
        for _ in 0..100 {
            let delay = p.next(8);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(30_000));
        }
    }
}
