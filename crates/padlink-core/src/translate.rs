//! Scan-code translation: controller button events to key combinations.
//!
//! [`translate`] looks the code up in the static
//! [`SCAN_CODE_TABLE`](crate::keymap::SCAN_CODE_TABLE), decodes the modifier
//! mask, and returns an ordered [`KeyCombination`].  [`translate_event`] does
//! the same for a decoded [`ButtonEvent`], whose wire fields may lie outside
//! the table's range.  Both are pure.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::keymap::{key_name, ModifierMask};
use crate::protocol::ButtonEvent;

/// Error returned when a button event cannot be mapped to a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The scan code is not part of the firmware's key table.
    #[error("unknown scan code {0:#04x}")]
    UnknownScanCode(i64),
}

/// An ordered, non-empty set of keys to press together.
///
/// Modifiers come first in the fixed order control, shift, alt, meta; the
/// primary key is always last.  The injection sink may treat the order as
/// press order for chorded input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyCombination {
    keys: Vec<&'static str>,
}

impl KeyCombination {
    /// Builds a combination from its primary key and the held modifiers.
    pub fn new(primary: &'static str, modifiers: ModifierMask) -> Self {
        let mut keys: Vec<&'static str> = modifiers.iter().map(|m| m.key_name()).collect();
        keys.push(primary);
        Self { keys }
    }

    /// All key names, modifiers first, primary key last.
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// The non-modifier key.
    pub fn primary(&self) -> &'static str {
        // `new` always pushes the primary key, so the vector is never empty.
        self.keys[self.keys.len() - 1]
    }

    /// The modifier names preceding the primary key.
    pub fn modifiers(&self) -> &[&'static str] {
        &self.keys[..self.keys.len() - 1]
    }

    /// `true` if only the primary key is pressed.
    pub fn is_single_key(&self) -> bool {
        self.keys.len() == 1
    }
}

impl fmt::Display for KeyCombination {
    /// Formats as `control+shift+a`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keys.join("+"))
    }
}

/// Translates a controller scan code and modifier bitmask into a
/// [`KeyCombination`].
///
/// # Errors
///
/// Returns [`TranslateError::UnknownScanCode`] if `code` is not in the
/// scan-code table.  The caller logs and drops the event.
pub fn translate(code: u32, modifier_mask: u32) -> Result<KeyCombination, TranslateError> {
    combine(i64::from(code), ModifierMask(modifier_mask))
}

/// Translates a decoded [`ButtonEvent`].
///
/// A key outside the `u32` range is treated like any other code missing from
/// the table.
///
/// # Errors
///
/// Returns [`TranslateError::UnknownScanCode`] if the key is not in the
/// scan-code table.
pub fn translate_event(event: &ButtonEvent) -> Result<KeyCombination, TranslateError> {
    combine(event.key, ModifierMask::from(event.modifier))
}

fn combine(code: i64, modifiers: ModifierMask) -> Result<KeyCombination, TranslateError> {
    let primary = u32::try_from(code)
        .ok()
        .and_then(key_name)
        .ok_or(TranslateError::UnknownScanCode(code))?;
    Ok(KeyCombination::new(primary, modifiers))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
