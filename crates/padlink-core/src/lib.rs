//! # padlink-core
//!
//! Shared library for the padlink controller link: the scan-code table, the
//! modifier decoding rules, the pure translator that turns a button event
//! into a key combination, and the JSON wire messages.
//!
//! This crate has no dependencies on OS APIs, sockets, or async runtimes, so
//! everything in it can be unit-tested and benchmarked in isolation.
//!
//! # Overview
//!
//! A touch-panel controller on the local network sends
//! `{"type":"button_press","key":4,"modifier":3}` frames.  The host turns
//! each into the key combination `control+shift+a` and asks the OS to press
//! it.  This crate covers the middle of that pipeline:
//!
//! - **`protocol`** – decodes the JSON text frame into an [`InboundMessage`].
//! - **`keymap`** – the fixed scan-code table and modifier bit assignment.
//! - **`translate`** – combines both into an ordered [`KeyCombination`].

pub mod keymap;
pub mod protocol;
pub mod translate;

pub use keymap::{Modifier, ModifierMask};
pub use protocol::{decode_inbound, ButtonEvent, DecodeError, InboundMessage};
pub use translate::{translate, translate_event, KeyCombination, TranslateError};
