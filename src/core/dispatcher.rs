//! # Dispatcher: public face of the supervised session.
//!
//! The [`Dispatcher`] owns the outbound queue, the [`Lifecycle`] of the
//! supervisor task and the event [`Bus`]. Producers enqueue through
//! [`send`](Dispatcher::send) / [`try_send`](Dispatcher::try_send) from any
//! task; the supervisor is the only consumer.
//!
//! ## Wiring
//! ```text
//!   producers ──send()──► [mpsc, cap = buffer_size] ──► Supervisor::run ──► Connection::send
//!                                                          ▲
//!   start(handler) ──► lifecycle.go(supervisor) ───────────┘
//!   close()        ──► lifecycle.kill(None) ──► lifecycle.wait()
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use linkvisor::{ClientInfo, Connector, Dispatcher, DispatchError, HandlerFn, HandlerRef, Outbound};
//!
//! async fn run<C: Connector<Inbound = Vec<u8>>>(
//!     connector: C,
//!     msg: Outbound<C>,
//! ) -> Result<(), DispatchError> {
//!     let info = ClientInfo::default().with_client_id("sensor-1");
//!     let dispatcher = Dispatcher::new(info, connector);
//!
//!     let handler: HandlerRef<Vec<u8>> = HandlerFn::arc("inbound", |_msg: Vec<u8>| async { Ok::<_, DispatchError>(()) });
//!     dispatcher.start(handler)?;
//!
//!     dispatcher.send(msg).await?;
//!     dispatcher.close().await
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{Instrument, Span, info, info_span};

use crate::{
    config::ClientInfo,
    connection::{Connector, HandlerRef, Outbound},
    core::{
        builder::DispatcherBuilder,
        state::{DispatcherState, StateCell},
        supervisor::Supervisor,
    },
    error::DispatchError,
    events::{Bus, Event, EventKind},
    lifecycle::Lifecycle,
    policies::{Backoff, BackoffPolicy},
};

/// Keeps a pub/sub session alive across reconnects and queues outbound
/// messages while no connection exists.
pub struct Dispatcher<C: Connector> {
    info: Arc<ClientInfo>,
    client: Arc<str>,
    connector: Arc<C>,
    backoff: BackoffPolicy,
    tx: mpsc::Sender<Outbound<C>>,
    /// Consumer end; moved into the supervisor by `start`, dropped by `close`.
    rx: Mutex<Option<mpsc::Receiver<Outbound<C>>>>,
    lifecycle: Lifecycle,
    state: StateCell,
    bus: Bus,
    span: Span,
}

impl<C: Connector> Dispatcher<C> {
    /// Creates an idle dispatcher with default logging context and the backoff
    /// policy from `info`.
    pub fn new(info: ClientInfo, connector: C) -> Self {
        Self::builder(info, connector).build()
    }

    /// Returns a builder for optional settings.
    pub fn builder(info: ClientInfo, connector: C) -> DispatcherBuilder<C> {
        DispatcherBuilder::new(info, connector)
    }

    pub(super) fn from_builder(b: DispatcherBuilder<C>) -> Self {
        let backoff = b.backoff.unwrap_or_else(|| b.info.backoff_policy());
        let (tx, rx) = mpsc::channel(b.info.buffer_size_clamped());
        let client: Arc<str> = Arc::from(b.info.client_id.as_str());

        let span = match &b.parent {
            Some(parent) => info_span!(
                parent: parent,
                "dispatcher",
                cid = %client,
                component = "dispatcher"
            ),
            None => info_span!("dispatcher", cid = %client, component = "dispatcher"),
        };

        Self {
            info: Arc::new(b.info),
            client,
            connector: Arc::new(b.connector),
            backoff,
            tx,
            rx: Mutex::new(Some(rx)),
            lifecycle: Lifecycle::new(),
            state: StateCell::new(),
            bus: Bus::new(b.bus_capacity),
            span,
        }
    }

    /// Starts the supervisor; `handler` receives inbound messages from every connection.
    ///
    /// # Errors
    /// - [`DispatchError::AlreadyStarted`] if called twice;
    /// - [`DispatchError::Closed`] after `close`.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn start(&self, handler: HandlerRef<C::Inbound>) -> Result<(), DispatchError> {
        // Held across `go` so a concurrent `close` waits for the unit to exist.
        let mut rx = self.rx.lock();
        self.state.start()?;
        let queue = rx.take().ok_or(DispatchError::AlreadyStarted)?;

        let handler_name = handler.name().to_string();
        let supervisor = Supervisor {
            info: Arc::clone(&self.info),
            client: Arc::clone(&self.client),
            connector: Arc::clone(&self.connector),
            handler,
            queue,
            backoff: Backoff::new(self.backoff),
            bus: self.bus.clone(),
        };
        let bus = self.bus.clone();
        let client = Arc::clone(&self.client);
        let span = self.span.clone();

        self.lifecycle.go(move |token| {
            async move {
                let res = supervisor.run(token).await;
                info!("dispatcher stopped");
                bus.publish(Event::new(EventKind::Stopped).with_client(client));
                res
            }
            .instrument(span)
        })?;

        info!(
            parent: &self.span,
            address = %self.info.address,
            handler = %handler_name,
            "dispatcher started"
        );
        Ok(())
    }

    /// Enqueues one message, waiting while the queue is full.
    ///
    /// # Errors
    /// [`DispatchError::Closed`] once shutdown was requested, including for a
    /// producer already waiting on a full queue.
    pub async fn send(&self, msg: Outbound<C>) -> Result<(), DispatchError> {
        if self.lifecycle.is_dying() {
            return Err(DispatchError::Closed);
        }
        tokio::select! {
            biased;
            _ = self.lifecycle.dying() => Err(DispatchError::Closed),
            res = self.tx.send(msg) => res.map_err(|_| DispatchError::Closed),
        }
    }

    /// Enqueues one message without waiting.
    ///
    /// # Errors
    /// - [`DispatchError::QueueFull`] if the queue is at capacity;
    /// - [`DispatchError::Closed`] once shutdown was requested.
    pub fn try_send(&self, msg: Outbound<C>) -> Result<(), DispatchError> {
        if self.lifecycle.is_dying() {
            return Err(DispatchError::Closed);
        }
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Requests shutdown and waits until the supervisor has exited and its
    /// connection, if any, is closed.
    ///
    /// Messages still queued are discarded. Calling `close` again returns the
    /// same outcome.
    ///
    /// # Errors
    /// The supervisor's terminal error, if it failed (e.g. panicked).
    pub async fn close(&self) -> Result<(), DispatchError> {
        if self.state.begin_stop() {
            info!(parent: &self.span, "dispatcher closing");
            self.bus
                .publish(Event::new(EventKind::ShutdownRequested).with_client(Arc::clone(&self.client)));
        }
        self.lifecycle.kill(None);
        drop(self.rx.lock().take());

        let res = self.lifecycle.wait().await;
        self.state.finish_stop();
        res
    }

    /// Current state.
    pub fn state(&self) -> DispatcherState {
        self.state.get()
    }

    /// Client identifier from the configuration.
    pub fn client_id(&self) -> &str {
        &self.client
    }

    /// Configuration this dispatcher was built with.
    pub fn info(&self) -> &ClientInfo {
        &self.info
    }

    /// Subscribes to dispatcher events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

impl<C: Connector> Drop for Dispatcher<C> {
    fn drop(&mut self) {
        self.lifecycle.kill(None);
    }
}
