//! Error types used by the dispatcher, its lifecycle and connection collaborators.
//!
//! [`DispatchError`] covers both faults reported synchronously to the caller
//! (double start, enqueue after close, full queue) and the steady-state faults
//! that the supervisor absorbs and retries (connect, send, close).
//!
//! Every variant carries only owned strings so the error is `Clone`: the
//! terminal outcome of a dispatcher is recorded once and handed to every
//! caller of [`Dispatcher::close`](crate::Dispatcher::close).

use thiserror::Error;

/// # Errors produced by the dispatcher and its collaborators.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// `start` was called on a dispatcher (or lifecycle) that already runs a unit.
    #[error("already started")]
    AlreadyStarted,

    /// The dispatcher is shutting down or stopped; no more messages are accepted.
    #[error("dispatcher closed")]
    Closed,

    /// Non-blocking enqueue found the outbound queue at capacity.
    #[error("outbound queue full")]
    QueueFull,

    /// Establishing a connection failed (always retried with backoff).
    #[error("connect failed: {error}")]
    Connect {
        /// The underlying error message.
        error: String,
    },

    /// Sending one message on a live connection failed; the connection is considered dead.
    #[error("send failed: {error}")]
    Send {
        /// The underlying error message.
        error: String,
    },

    /// Releasing a connection failed.
    #[error("close failed: {error}")]
    Close {
        /// The underlying error message.
        error: String,
    },

    /// An inbound handler rejected a message.
    #[error("handler failed: {error}")]
    Handler {
        /// The underlying error message.
        error: String,
    },

    /// The managed unit panicked.
    #[error("panicked: {error}")]
    Panicked {
        /// Panic payload rendered as text.
        error: String,
    },

    /// Explicit shutdown reason passed to [`Lifecycle::kill`](crate::Lifecycle::kill).
    #[error("shutdown: {reason}")]
    Shutdown {
        /// Why shutdown was requested.
        reason: String,
    },
}

impl DispatchError {
    /// Shorthand for [`DispatchError::Connect`].
    pub fn connect(error: impl ToString) -> Self {
        Self::Connect {
            error: error.to_string(),
        }
    }

    /// Shorthand for [`DispatchError::Send`].
    pub fn send(error: impl ToString) -> Self {
        Self::Send {
            error: error.to_string(),
        }
    }

    /// Shorthand for [`DispatchError::Close`].
    pub fn close(error: impl ToString) -> Self {
        Self::Close {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use linkvisor::DispatchError;
    ///
    /// assert_eq!(DispatchError::connect("refused").as_label(), "connect_failed");
    /// assert_eq!(DispatchError::QueueFull.as_label(), "queue_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::AlreadyStarted => "already_started",
            DispatchError::Closed => "closed",
            DispatchError::QueueFull => "queue_full",
            DispatchError::Connect { .. } => "connect_failed",
            DispatchError::Send { .. } => "send_failed",
            DispatchError::Close { .. } => "close_failed",
            DispatchError::Handler { .. } => "handler_failed",
            DispatchError::Panicked { .. } => "panicked",
            DispatchError::Shutdown { .. } => "shutdown",
        }
    }

    /// Indicates whether the supervisor recovers from this error on its own.
    ///
    /// Returns `true` for connection-level faults ([`Connect`](Self::Connect),
    /// [`Send`](Self::Send), [`Close`](Self::Close)), which only cost a reconnect.
    ///
    /// ```
    /// use linkvisor::DispatchError;
    ///
    /// assert!(DispatchError::send("broken pipe").is_transient());
    /// assert!(!DispatchError::AlreadyStarted.is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DispatchError::Connect { .. } | DispatchError::Send { .. } | DispatchError::Close { .. }
        )
    }
}
