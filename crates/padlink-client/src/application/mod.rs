//! Application layer of the host client.
//!
//! - **`dispatch`** – decides what an inbound frame means and queues the
//!   resulting key combination for the injected [`dispatch::KeyInjector`].
//! - **`backoff`** – the reconnect delay curve.
//! - **`notify`** – state, log and button notifications published to
//!   observers such as the UI bridge.
//!
//! Nothing here touches sockets or OS input APIs directly.

pub mod backoff;
pub mod dispatch;
pub mod notify;
