//! Dispatcher state machine.
//!
//! ```text
//! Idle ──start()──► Running ──close()──► Stopping ──wait done──► Stopped
//!   └──────────────────close()──────────────┘
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::DispatchError;

/// Externally observable dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Built, not started. Messages may already be enqueued.
    Idle,
    /// Supervisor running.
    Running,
    /// `close` called, supervisor not yet joined.
    Stopping,
    /// Supervisor joined; terminal.
    Stopped,
}

impl DispatcherState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => DispatcherState::Idle,
            1 => DispatcherState::Running,
            2 => DispatcherState::Stopping,
            _ => DispatcherState::Stopped,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(DispatcherState::Idle as u8))
    }

    pub(crate) fn get(&self) -> DispatcherState {
        DispatcherState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// `Idle → Running`.
    pub(crate) fn start(&self) -> Result<(), DispatchError> {
        match self.0.compare_exchange(
            DispatcherState::Idle as u8,
            DispatcherState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(()),
            Err(v) if DispatcherState::from_u8(v) == DispatcherState::Running => {
                Err(DispatchError::AlreadyStarted)
            }
            Err(_) => Err(DispatchError::Closed),
        }
    }

    /// `Idle | Running → Stopping`; `true` only for the call that made the transition.
    pub(crate) fn begin_stop(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                match DispatcherState::from_u8(v) {
                    DispatcherState::Idle | DispatcherState::Running => {
                        Some(DispatcherState::Stopping as u8)
                    }
                    _ => None,
                }
            })
            .is_ok()
    }

    pub(crate) fn finish_stop(&self) {
        self.0
            .store(DispatcherState::Stopped as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), DispatcherState::Idle);

        cell.start().unwrap();
        assert_eq!(cell.start(), Err(DispatchError::AlreadyStarted));

        assert!(cell.begin_stop());
        assert!(!cell.begin_stop());
        assert_eq!(cell.get(), DispatcherState::Stopping);
        assert_eq!(cell.start(), Err(DispatchError::Closed));

        cell.finish_stop();
        assert_eq!(cell.get(), DispatcherState::Stopped);
    }
}
