//! Runtime core: the dispatcher and its reconnect loop.
//!
//! The public API from this module is [`Dispatcher`] (with its builder and
//! state). Internal modules:
//! - [`dispatcher`]: queue ownership, start/send/close, state transitions;
//! - [`supervisor`]: the reconnect loop with backoff and the carried message;
//! - [`session`]: drives one live connection until it dies or shutdown;
//! - [`builder`]: optional settings (span, backoff override, bus capacity);
//! - [`state`]: the `Idle → Running → Stopping → Stopped` cell.

mod builder;
mod dispatcher;
mod session;
mod state;
mod supervisor;


pub use builder::DispatcherBuilder;
pub use dispatcher::Dispatcher;
pub use state::DispatcherState;
