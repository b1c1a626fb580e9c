//! Dispatcher events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] what the supervisor did, with metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: the supervisor loop and its per-connection session, plus
//!   `Dispatcher::close` (`ShutdownRequested`).
//! - **Consumers**: anything holding a receiver from `Dispatcher::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
