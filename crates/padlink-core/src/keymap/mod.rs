//! Key tables for the controller link.
//!
//! The controller speaks USB HID Usage IDs (page 0x07) plus a four-bit
//! modifier mask.  This module holds the fixed lookup assets; the
//! [`translate`](crate::translate) module combines them into key combinations.

pub mod modifier;
pub mod scan_code;

pub use modifier::{Modifier, ModifierMask};
pub use scan_code::{key_name, SCAN_CODE_TABLE};
