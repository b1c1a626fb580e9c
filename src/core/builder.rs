use tracing::Span;

use crate::{
    config::ClientInfo,
    connection::Connector,
    policies::BackoffPolicy,
};

use super::dispatcher::Dispatcher;

/// Default capacity of the event bus ring buffer.
const DEFAULT_BUS_CAPACITY: usize = 256;

/// Builder for a [`Dispatcher`] with optional logging context and policy overrides.
pub struct DispatcherBuilder<C> {
    pub(super) info: ClientInfo,
    pub(super) connector: C,
    pub(super) parent: Option<Span>,
    pub(super) backoff: Option<BackoffPolicy>,
    pub(super) bus_capacity: usize,
}

impl<C: Connector> DispatcherBuilder<C> {
    /// Creates a new builder with the given configuration and connector.
    pub fn new(info: ClientInfo, connector: C) -> Self {
        Self {
            info,
            connector,
            parent: None,
            backoff: None,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }

    /// Nests the dispatcher's `tracing` span under `parent`.
    ///
    /// Without it the span is attached to whatever span is current at `build()`.
    pub fn with_span(mut self, parent: Span) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Overrides the backoff policy derived from [`ClientInfo::backoff_policy`].
    pub fn with_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = Some(policy);
        self
    }

    /// Sets the event bus capacity (min 1).
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Builds the dispatcher in the `Idle` state.
    pub fn build(self) -> Dispatcher<C> {
        Dispatcher::from_builder(self)
    }
}
