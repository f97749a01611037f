//! padlink-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The host client keeps a persistent WebSocket link to a touch-panel
//! controller on the local network:
//!
//! 1. Dials `ws://<host>:8081` and keeps the connection alive with pings.
//! 2. Decodes each `button_press` frame and translates the scan code and
//!    modifier mask into a key combination.
//! 3. Hands the combination to a key injector on a dedicated worker.
//! 4. Reconnects with exponential backoff whenever the link drops, unless
//!    the user disconnected explicitly.

/// Application layer: dispatch, backoff, notifications.
pub mod application;

/// Infrastructure layer: link, key injection, settings, UI bridge.
pub mod infrastructure;
