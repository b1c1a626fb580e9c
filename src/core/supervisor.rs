//! # Supervisor: the reconnect loop.
//!
//! Keeps one logical session alive: builds a connection, hands it to
//! [`session::run`], and when the connection is lost builds another after a
//! backoff delay. Runs as the [`Lifecycle`](crate::Lifecycle)'s managed unit.
//!
//! ## Architecture
//! ```text
//! loop {
//!   ├─► first round: go on immediately
//!   │   later rounds: delay = backoff.next_delay()
//!   │                 publish BackoffScheduled
//!   │                 select! { sleep(delay), token.cancelled() → return }
//!   ├─► attempt += 1, publish ConnectAttempt
//!   ├─► select! { connector.connect(), token.cancelled() → return }
//!   │     └─ Err ──► log error, publish ConnectFailed, continue
//!   ├─► publish Online
//!   ├─► session::run(conn, carried.take(), queue, token)
//!   │     ├─ Lost { carried } ──► keep carried, publish Offline, continue
//!   │     └─ Shutdown        ──► publish Offline, return
//! }
//! ```
//!
//! ## Rules
//! - Connect failures are never escalated; they are retried until shutdown.
//! - The backoff counter is never reset unless `ClientInfo::reset_backoff_on_connect`.
//! - The carried message and the backoff are owned by this loop alone.

use std::sync::Arc;

use tokio::{select, sync::mpsc, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::{
    config::ClientInfo,
    connection::{Connector, HandlerRef, Outbound},
    core::session::{self, SessionCtx, SessionEnd},
    error::DispatchError,
    events::{Bus, Event, EventKind},
    policies::Backoff,
};

/// Everything the reconnect loop owns for the lifetime of a started dispatcher.
pub(crate) struct Supervisor<C: Connector> {
    pub info: Arc<ClientInfo>,
    pub client: Arc<str>,
    pub connector: Arc<C>,
    pub handler: HandlerRef<C::Inbound>,
    pub queue: mpsc::Receiver<Outbound<C>>,
    pub backoff: Backoff,
    pub bus: Bus,
}

impl<C: Connector> Supervisor<C> {
    /// Runs until `token` is cancelled (or every producer is gone).
    ///
    /// Shutdown is not an error: this returns `Ok(())` on every exit path, the
    /// terminal outcome is decided by the lifecycle's kill reason.
    pub(crate) async fn run(mut self, token: CancellationToken) -> Result<(), DispatchError> {
        let mut first = true;
        let mut attempt: u64 = 0;
        let mut carried: Option<Outbound<C>> = None;

        loop {
            if first {
                first = false;
            } else {
                let delay = self.backoff.next_delay();
                debug!(?delay, "delay reconnect");
                self.bus.publish(
                    self.event(EventKind::BackoffScheduled)
                        .with_attempt(attempt + 1)
                        .with_delay(delay),
                );

                let sleep = time::sleep(delay);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = token.cancelled() => break,
                }
            }

            attempt += 1;
            debug!(attempt, "next reconnect");
            self.bus
                .publish(self.event(EventKind::ConnectAttempt).with_attempt(attempt));

            let connecting = self
                .connector
                .connect(&self.info, Arc::clone(&self.handler));
            let conn = select! {
                biased;
                _ = token.cancelled() => break,
                res = connecting => match res {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!(attempt, error = %e, "failed to create new client");
                        self.bus.publish(
                            self.event(EventKind::ConnectFailed)
                                .with_attempt(attempt)
                                .with_error(e.to_string()),
                        );
                        continue;
                    }
                },
            };

            if self.info.reset_backoff_on_connect {
                self.backoff.reset();
            }

            debug!(attempt, carried = carried.is_some(), "client online");
            self.bus
                .publish(self.event(EventKind::Online).with_attempt(attempt));

            let ctx = SessionCtx {
                bus: &self.bus,
                client: &self.client,
                attempt,
            };
            let end = session::run(conn, carried.take(), &mut self.queue, &token, &ctx).await;

            debug!(attempt, "client offline");
            self.bus
                .publish(self.event(EventKind::Offline).with_attempt(attempt));

            match end {
                SessionEnd::Lost { carried: next } => carried = next,
                SessionEnd::Shutdown => break,
            }
        }
        Ok(())
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_client(Arc::clone(&self.client))
    }
}
