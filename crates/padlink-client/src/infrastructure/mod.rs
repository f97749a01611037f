//! Infrastructure layer of the host client.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `padlink_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`link`** – the WebSocket session with the controller: connection
//!   state machine, keepalive, reconnect backoff and the tokio-tungstenite
//!   transport.
//! - **`input_injection`** – [`KeyInjector`](crate::application::dispatch::KeyInjector)
//!   backends (dry-run logging, in-memory recording for tests).
//! - **`storage`** – TOML settings file and the live [`storage::SettingsStore`].
//! - **`ui_bridge`** – observer state and command handlers for a front end.

pub mod input_injection;
pub mod link;
pub mod storage;
pub mod ui_bridge;
