//! Key injection backends.
//!
//! - **`logging`** – dry-run backend that logs each combination instead of
//!   pressing it.  Used by the `padlink` binary until an OS backend is wired in.
//! - **`recording`** – in-memory backend for tests.

pub mod logging;
pub mod recording;

pub use logging::LoggingInjector;
pub use recording::RecordingInjector;
