//! # Lifecycle: one cancellable, joinable background unit.
//!
//! [`Lifecycle`] runs a single async function as a tokio task and exposes the
//! three things a supervisor needs from it:
//!
//! - **kill**: request cooperative shutdown (idempotent, never blocks);
//! - **dying**: a future that resolves once shutdown was requested, meant to be
//!   one branch of every `select!` inside the unit;
//! - **wait**: join the unit and obtain its terminal outcome.
//!
//! ```text
//!   go(f) ──► tokio::spawn(f(token)) ──► Ok / Err / panic
//!                    ▲                          │
//!   kill(reason) ──► token.cancel()             ▼
//!                                     record first error, cancel token,
//!   wait() ◄──────────────────────────── exited = true
//! ```
//!
//! ## Outcome rules
//! - The first non-`None` kill reason wins; otherwise the unit's own error; otherwise `Ok(())`.
//! - A panic inside the unit is caught and recorded as [`DispatchError::Panicked`].
//! - When the unit exits on its own the lifecycle becomes dying too.
//! - `wait()` can be called any number of times and always yields the same outcome.
//! - `wait()` on a lifecycle that never started a unit resolves immediately.
//!
//! ## Example
//! ```rust
//! use linkvisor::{DispatchError, Lifecycle};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let lc = Lifecycle::new();
//!     lc.go(|token| async move {
//!         token.cancelled().await;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//!     lc.kill(Some(DispatchError::Shutdown { reason: "bye".into() }));
//!     assert_eq!(
//!         lc.wait().await,
//!         Err(DispatchError::Shutdown { reason: "bye".into() })
//!     );
//! }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::DispatchError;

/// Cooperative cancellation and join handle for one background unit.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone, Debug)]
pub struct Lifecycle {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    reason: Mutex<Option<DispatchError>>,
    started: AtomicBool,
    exited: watch::Sender<bool>,
}

impl Inner {
    fn record(&self, err: DispatchError) {
        let mut reason = self.reason.lock();
        if reason.is_none() {
            *reason = Some(err);
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Creates an alive lifecycle with no unit running.
    pub fn new() -> Self {
        let (exited, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                reason: Mutex::new(None),
                started: AtomicBool::new(false),
                exited,
            }),
        }
    }

    /// Starts `f` as the managed unit.
    ///
    /// `f` receives the lifecycle's cancellation token; it should select on
    /// `token.cancelled()` wherever it may wait indefinitely.
    ///
    /// # Errors
    /// [`DispatchError::AlreadyStarted`] if a unit was already started on this lifecycle.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime. If `f` or the spawn
    /// panics, the lifecycle still ends up exited with
    /// [`DispatchError::Panicked`], so `wait()` returns.
    pub fn go<F, Fut>(&self, f: F) -> Result<(), DispatchError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return Err(DispatchError::AlreadyStarted);
        }

        // Building the future or spawning it may panic; the unit then counts as exited.
        let guard = StartGuard {
            inner: &self.inner,
            armed: true,
        };
        let fut = f(self.inner.token.clone());
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let res = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res,
                Err(payload) => Err(DispatchError::Panicked {
                    error: panic_message(payload.as_ref()),
                }),
            };
            if let Err(e) = res {
                inner.record(e);
            }
            inner.token.cancel();
            inner.exited.send_replace(true);
        });
        guard.disarm();
        Ok(())
    }

    /// Requests shutdown. Idempotent; never blocks.
    ///
    /// `reason` is recorded only if no reason has been recorded yet.
    pub fn kill(&self, reason: Option<DispatchError>) {
        if let Some(reason) = reason {
            self.inner.record(reason);
        }
        self.inner.token.cancel();
    }

    /// Resolves once shutdown was requested or the unit has exited.
    pub fn dying(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// Whether shutdown was requested or the unit has exited.
    pub fn is_dying(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Whether a unit was started and has not returned yet.
    pub fn is_alive(&self) -> bool {
        self.inner.started.load(Ordering::Acquire) && !*self.inner.exited.borrow()
    }

    /// Waits for the unit to return and yields the terminal outcome.
    ///
    /// # Errors
    /// The first recorded kill reason, else the unit's own error.
    pub async fn wait(&self) -> Result<(), DispatchError> {
        if self.inner.started.load(Ordering::Acquire) {
            let mut rx = self.inner.exited.subscribe();
            // The sender lives in `inner`, which we hold: this cannot observe a closed channel.
            let _ = rx.wait_for(|exited| *exited).await;
        }
        match self.inner.reason.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Marks the unit exited if `go` unwinds before the unit was spawned.
struct StartGuard<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl StartGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.inner.record(DispatchError::Panicked {
            error: "managed unit panicked before it was spawned".to_string(),
        });
        self.inner.token.cancel();
        self.inner.exited.send_replace(true);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
