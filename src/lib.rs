//! # linkvisor
//!
//! **Linkvisor** keeps a logical publish/subscribe session alive over an
//! unreliable transport. It reconnects with bounded exponential backoff,
//! queues outbound messages in a bounded mailbox while no connection exists,
//! and resends the one message whose send failed before anything newer.
//!
//! The wire protocol and the transport are not part of this crate: they plug
//! in through the [`Connector`] / [`Connection`] traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer   producer   producer
//!      │          │          │        Dispatcher::send / try_send
//!      ▼          ▼          ▼
//! ┌───────────────────────────────────────────────┐
//! │ outbound queue (mpsc, capacity = buffer_size) │
//! └──────────────────────┬────────────────────────┘
//!                        ▼ (sole consumer)
//! ┌───────────────────────────────────────────────┐
//! │ Supervisor (Lifecycle's managed unit)         │
//! │  - Backoff (attempt counter, never shared)    │
//! │  - carried message slot (at most one)         │──► Bus ──► Dispatcher::subscribe()
//! └──────────────────────┬────────────────────────┘
//!                        ▼ one per attempt
//!              Connector::connect(info, handler)
//!                        ▼
//!              Connection ── send() ──► remote
//!                   │  └── inbound ──► Handler::on_message
//!                   └── dying(): DeathSignal
//! ```
//!
//! ### Lifecycle
//! ```text
//! Dispatcher::start(handler) ──► Lifecycle::go(Supervisor::run)
//!
//! loop {
//!   ├─► (not first) sleep(backoff.next_delay())    ◄─ cancellable
//!   ├─► connector.connect()                        ◄─ cancellable
//!   │       └─ Err ─► log, continue
//!   ├─► session: send carried, then select! {
//!   │       shutdown           ─► close conn, return
//!   │       connection dying   ─► close conn, continue
//!   │       next queued message ─► send; Err ─► carry it, close conn, continue
//!   │   }
//! }
//!
//! Dispatcher::close() ──► Lifecycle::kill(None) ──► Lifecycle::wait()
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types                                  |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Dispatch**      | Supervised session, bounded queue, carried message.           | [`Dispatcher`], [`DispatcherBuilder`]      |
//! | **Boundary**      | Transport/protocol plug-in points.                            | [`Connector`], [`Connection`], [`Handler`] |
//! | **Lifecycle**     | Cancellable, joinable background unit.                        | [`Lifecycle`], [`DeathSignal`]             |
//! | **Policies**      | Reconnect delays.                                             | [`BackoffPolicy`], [`Backoff`], [`JitterPolicy`] |
//! | **Events**        | Observe reconnects, failures and shutdown.                    | [`Event`], [`EventKind`], [`Bus`]          |
//! | **Errors**        | Typed errors with stable labels.                              | [`DispatchError`]                          |
//! | **Configuration** | Endpoint, queue and backoff settings.                         | [`ClientInfo`]                             |
//!
//! ## Logging
//! Everything the dispatcher does is logged through [`tracing`] inside a
//! `dispatcher` span carrying `cid` (client id) and `component` fields.
//! Install any `tracing` subscriber to see it.
//!
//! ## Example
//! See `demos/loopback.rs` for a complete in-memory connector.

mod config;
mod connection;
mod core;
mod error;
mod events;
mod lifecycle;
mod policies;

// ---- Public re-exports ----

pub use config::{ClientInfo, Subscription};
pub use connection::{
    Connection, Connector, DeathSignal, Handler, HandlerFn, HandlerRef, Outbound,
};
pub use crate::core::{Dispatcher, DispatcherBuilder, DispatcherState};
pub use error::DispatchError;
pub use events::{Bus, Event, EventKind};
pub use lifecycle::Lifecycle;
pub use policies::{Backoff, BackoffPolicy, JitterPolicy};
