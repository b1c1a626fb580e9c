//! # Inbound message handler.
//!
//! Every live connection hands the messages it receives to a [`Handler`].
//! Protocol decoding and business logic live there; the dispatcher only passes
//! the handler through to each new connection.
//!
//! [`HandlerFn`] wraps a closure producing one future per message, so no state
//! is shared between invocations unless the closure captures it explicitly.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchError;

/// Shared handler handle.
pub type HandlerRef<M> = Arc<dyn Handler<M>>;

/// Receives inbound messages from the current connection.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use linkvisor::{DispatchError, Handler};
///
/// struct Printer;
///
/// #[async_trait]
/// impl Handler<String> for Printer {
///     async fn on_message(&self, msg: String) -> Result<(), DispatchError> {
///         println!("inbound: {msg}");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<M: Send + 'static>: Send + Sync + 'static {
    /// Processes one inbound message.
    async fn on_message(&self, msg: M) -> Result<(), DispatchError>;

    /// Called by the connection for faults it detects outside of a send.
    fn on_error(&self, _err: &DispatchError) {}

    /// Handler name, for logs.
    fn name(&self) -> &str {
        "handler"
    }
}

/// Function-backed handler.
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    ///
    /// ```rust
    /// use linkvisor::{DispatchError, HandlerFn, HandlerRef};
    ///
    /// let h: HandlerRef<Vec<u8>> = HandlerFn::arc("sink", |_msg: Vec<u8>| async {
    ///     Ok::<_, DispatchError>(())
    /// });
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<M, F, Fut> Handler<M> for HandlerFn<F>
where
    M: Send + 'static,
    F: Fn(M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
{
    async fn on_message(&self, msg: M) -> Result<(), DispatchError> {
        (self.f)(msg).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_handler_fn_invokes_closure() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let h: HandlerRef<u32> = HandlerFn::arc("count", move |n: u32| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(n as usize, Ordering::SeqCst);
                Ok(())
            }
        });

        h.on_message(2).await.unwrap();
        h.on_message(3).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 5);
        assert_eq!(h.name(), "count");
    }

    #[test]
    fn test_default_name() {
        struct Sink;

        #[async_trait]
        impl Handler<u32> for Sink {
            async fn on_message(&self, _msg: u32) -> Result<(), DispatchError> {
                Ok(())
            }
        }

        let h: HandlerRef<u32> = Arc::new(Sink);
        assert_eq!(h.name(), "handler");
    }
}
