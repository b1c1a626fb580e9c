//! # Session: drive one live connection.
//!
//! Feeds the outbound queue into a single [`Connection`] until the connection
//! dies or shutdown is requested, then closes it.
//!
//! ## Flow
//! ```text
//! carried? ──► send(carried) ──Err──► Lost { carried: Some(carried) }
//!                  │Ok
//!                  ▼
//! loop select! (biased) {
//!   token.cancelled()   ──► Shutdown
//!   conn.dying().fired() ──► Lost { carried: None }
//!   queue.recv()        ──► send(msg) ──Err──► Lost { carried: Some(msg) }
//!                           None      ──► Shutdown (every producer is gone)
//! }
//! always: conn.close()
//! ```
//!
//! ## Rules
//! - The carried message is always sent before anything new from the queue.
//! - A send in progress is abandoned when shutdown is requested.
//! - The connection is closed on **every** exit path, exactly once.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    connection::Connection,
    error::DispatchError,
    events::{Bus, Event, EventKind},
};

/// Why a session ended.
#[derive(Debug)]
pub(crate) enum SessionEnd<M> {
    /// The connection died; `carried` must be sent first on the next one.
    Lost { carried: Option<M> },
    /// Shutdown requested; the supervisor must not reconnect.
    Shutdown,
}

/// Per-session context for event publishing.
pub(crate) struct SessionCtx<'a> {
    pub bus: &'a Bus,
    pub client: &'a Arc<str>,
    pub attempt: u64,
}

impl SessionCtx<'_> {
    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind)
            .with_client(Arc::clone(self.client))
            .with_attempt(self.attempt)
    }
}

/// Runs the send loop on `conn`, then closes it.
pub(crate) async fn run<T: Connection>(
    mut conn: T,
    carried: Option<T::Message>,
    queue: &mut mpsc::Receiver<T::Message>,
    token: &CancellationToken,
    ctx: &SessionCtx<'_>,
) -> SessionEnd<T::Message> {
    let end = pump(&mut conn, carried, queue, token, ctx).await;
    if let Err(e) = conn.close().await {
        warn!(attempt = ctx.attempt, error = %e, "failed to close client");
    }
    end
}

async fn pump<T: Connection>(
    conn: &mut T,
    carried: Option<T::Message>,
    queue: &mut mpsc::Receiver<T::Message>,
    token: &CancellationToken,
    ctx: &SessionCtx<'_>,
) -> SessionEnd<T::Message> {
    if let Some(msg) = carried {
        match deliver(conn, &msg, token).await {
            Delivery::Sent => ctx.bus.publish(ctx.event(EventKind::CarriedResent)),
            Delivery::Failed(e) => {
                report_send_failure(ctx, &e);
                return SessionEnd::Lost { carried: Some(msg) };
            }
            Delivery::Interrupted => return SessionEnd::Shutdown,
        }
    }

    let dying = conn.dying();
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return SessionEnd::Shutdown,
            _ = dying.fired() => return SessionEnd::Lost { carried: None },
            next = queue.recv() => {
                let Some(msg) = next else {
                    return SessionEnd::Shutdown;
                };
                match deliver(conn, &msg, token).await {
                    Delivery::Sent => {}
                    Delivery::Failed(e) => {
                        report_send_failure(ctx, &e);
                        return SessionEnd::Lost { carried: Some(msg) };
                    }
                    Delivery::Interrupted => return SessionEnd::Shutdown,
                }
            }
        }
    }
}

enum Delivery {
    Sent,
    Failed(DispatchError),
    Interrupted,
}

async fn deliver<T: Connection>(
    conn: &mut T,
    msg: &T::Message,
    token: &CancellationToken,
) -> Delivery {
    tokio::select! {
        biased;
        _ = token.cancelled() => Delivery::Interrupted,
        res = conn.send(msg) => match res {
            Ok(()) => Delivery::Sent,
            Err(e) => Delivery::Failed(e),
        },
    }
}

fn report_send_failure(ctx: &SessionCtx<'_>, err: &DispatchError) {
    warn!(attempt = ctx.attempt, error = %err, "failed to send message, carrying it over");
    ctx.bus
        .publish(ctx.event(EventKind::SendFailed).with_error(err.to_string()));
}
