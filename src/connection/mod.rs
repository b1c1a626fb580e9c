//! # Connection boundary.
//!
//! The dispatcher does not speak any wire protocol itself. It consumes two
//! traits implemented by the transport/protocol layer:
//!
//! - [`Connector`] builds one fresh [`Connection`] per attempt;
//! - [`Connection`] sends outbound messages, reports its own death through a
//!   [`DeathSignal`], and is closed by the dispatcher when it is done with it.
//!
//! ```text
//! Connector::connect(info, handler) ──► Connection ──► send()* ──► close()
//!                                          │
//!                                          └─► dying(): fires once on keepalive
//!                                              timeout / remote close / I/O error
//! ```
//!
//! ## Rules
//! - A connection is never reused once the dispatcher has closed it.
//! - `send` failing means the connection is dead, whether or not its signal fired.
//! - `close` is called exactly once per successfully created connection.
//! - The dispatcher's `tracing` span is current while `connect` runs.

mod handler;
mod signal;

pub use handler::{Handler, HandlerFn, HandlerRef};
pub use signal::DeathSignal;

use async_trait::async_trait;

use crate::config::ClientInfo;
use crate::error::DispatchError;

/// One live session with the remote endpoint.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Outbound protocol message.
    type Message: Send + Sync + 'static;

    /// Transmits one message.
    ///
    /// # Errors
    /// Any error marks the connection dead; the dispatcher keeps the message
    /// and resends it first on the next connection.
    async fn send(&mut self, msg: &Self::Message) -> Result<(), DispatchError>;

    /// The connection's one-shot death signal.
    fn dying(&self) -> DeathSignal;

    /// Releases the connection's resources.
    ///
    /// # Errors
    /// Logged by the dispatcher and otherwise ignored.
    async fn close(&mut self) -> Result<(), DispatchError>;
}

/// Factory for connections, invoked once per (re)connect attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Inbound protocol message, delivered to the dispatcher's [`Handler`].
    type Inbound: Send + 'static;
    /// Connection type produced by this connector.
    type Conn: Connection;

    /// Establishes one session.
    ///
    /// # Errors
    /// Treated as transient: logged, then retried after a backoff delay.
    async fn connect(
        &self,
        info: &ClientInfo,
        handler: HandlerRef<Self::Inbound>,
    ) -> Result<Self::Conn, DispatchError>;
}

/// Outbound message type of a connector.
pub type Outbound<C> = <<C as Connector>::Conn as Connection>::Message;
