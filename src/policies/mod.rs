//! Reconnect policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how reconnect delays evolve (min / factor / max + jitter)
//! - [`Backoff`]       the policy plus the attempt counter the supervisor advances
//! - [`JitterPolicy`]  randomization to avoid synchronized reconnects
//!
//! ## Wiring
//! ```text
//! ClientInfo { min_interval, interval, backoff_factor }
//!      └─► ClientInfo::backoff_policy() ─► Backoff::new(policy)
//!            └─► supervisor: backoff.next_delay() before every reconnect but the first
//! ```

mod backoff;
mod jitter;

pub use backoff::{Backoff, BackoffPolicy};
pub use jitter::JitterPolicy;
