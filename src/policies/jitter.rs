//! # Jitter for reconnect delays.
//!
//! Many dispatchers pointed at the same broker tend to lose their connections
//! together (broker restart, network partition). Without jitter they also come
//! back together. [`JitterPolicy`] spreads those reconnects out.

use std::time::Duration;

use rand::Rng;

/// Randomization applied to a backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Exact delay. Deterministic; the default.
    #[default]
    None,

    /// Uniform in `[0, delay]`.
    Full,

    /// Uniform in `[delay / 2, delay]`.
    Equal,

    /// Uniform in `[floor, min(delay × 3, cap)]`.
    Decorrelated,
}

impl JitterPolicy {
    /// Randomizes `delay`.
    ///
    /// `floor` and `cap` only bound the `Decorrelated` spread; the other
    /// variants never exceed `delay`. A zero delay stays zero.
    pub fn apply(&self, delay: Duration, floor: Duration, cap: Duration) -> Duration {
        if delay.is_zero() {
            return delay;
        }
        let mut rng = rand::rng();
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => rng.random_range(Duration::ZERO..=delay),
            JitterPolicy::Equal => {
                let half = delay / 2;
                half + rng.random_range(Duration::ZERO..=delay - half)
            }
            JitterPolicy::Decorrelated => {
                let upper = delay.saturating_mul(3).min(cap).max(floor);
                if floor >= upper {
                    floor
                } else {
                    rng.random_range(floor..=upper)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: Duration = Duration::from_millis(100);
    const CAP: Duration = Duration::from_secs(30);

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(1234);
        assert_eq!(JitterPolicy::None.apply(d, FLOOR, CAP), d);
        assert_eq!(JitterPolicy::default(), JitterPolicy::None);
    }

    #[test]
    fn test_equal_bounds() {
        for _ in 0..50 {
            let d = JitterPolicy::Equal.apply(Duration::from_millis(1001), FLOOR, CAP);
            assert!(d >= Duration::from_micros(500_500));
            assert!(d <= Duration::from_millis(1001));
        }
    }

    #[test]
    fn test_decorrelated_spreads_above_delay() {
        for _ in 0..50 {
            let d = JitterPolicy::Decorrelated.apply(Duration::from_secs(20), FLOOR, CAP);
            assert!(d >= FLOOR);
            assert!(d <= CAP);
        }
    }

    #[test]
    fn test_zero_delay_stays_zero() {
        for jitter in [JitterPolicy::Full, JitterPolicy::Equal, JitterPolicy::Decorrelated] {
            assert_eq!(jitter.apply(Duration::ZERO, FLOOR, CAP), Duration::ZERO);
        }
    }
}
