//! Modifier bitmask decoding.
//!
//! The controller sends the held modifier keys as a small bitmask alongside
//! each button press.  The bit positions are part of the firmware contract:
//!
//! | Bit | Value | Modifier |
//! |-----|-------|----------|
//! | 0   | 0x01  | control  |
//! | 1   | 0x02  | shift    |
//! | 2   | 0x04  | alt      |
//! | 3   | 0x08  | meta (Win / Command / Super) |
//!
//! Bits above bit 3 carry no meaning and are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single modifier key, in press order.
///
/// The declaration order is the order in which modifiers appear in a
/// [`KeyCombination`](crate::translate::KeyCombination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Modifier {
    Control,
    Shift,
    Alt,
    Meta,
}

impl Modifier {
    /// All modifiers in their fixed press order.
    pub const ALL: [Modifier; 4] = [
        Modifier::Control,
        Modifier::Shift,
        Modifier::Alt,
        Modifier::Meta,
    ];

    /// The bit this modifier occupies in the controller's bitmask.
    pub const fn bit(self) -> u32 {
        match self {
            Modifier::Control => ModifierMask::CONTROL,
            Modifier::Shift => ModifierMask::SHIFT,
            Modifier::Alt => ModifierMask::ALT,
            Modifier::Meta => ModifierMask::META,
        }
    }

    /// The symbolic key name handed to the injection sink.
    pub const fn key_name(self) -> &'static str {
        match self {
            Modifier::Control => "control",
            Modifier::Shift => "shift",
            Modifier::Alt => "alt",
            Modifier::Meta => "meta",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// Raw modifier bitmask as sent by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierMask(pub u32);

impl ModifierMask {
    pub const CONTROL: u32 = 1 << 0;
    pub const SHIFT: u32 = 1 << 1;
    pub const ALT: u32 = 1 << 2;
    pub const META: u32 = 1 << 3;

    /// Returns `true` if `modifier`'s bit is set.
    pub fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    /// Iterates over the set modifiers in the fixed order
    /// control, shift, alt, meta.
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }

    /// Returns `true` if no recognised modifier bit is set.
    pub fn is_empty(self) -> bool {
        self.iter().next().is_none()
    }
}

impl From<i64> for ModifierMask {
    /// Keeps the four defined bits of a wire mask.
    fn from(value: i64) -> Self {
        Self((value & 0x0F) as u32)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_assignment_matches_firmware_contract() {
        assert_eq!(Modifier::Control.bit(), 0x01);
        assert_eq!(Modifier::Shift.bit(), 0x02);
        assert_eq!(Modifier::Alt.bit(), 0x04);
        assert_eq!(Modifier::Meta.bit(), 0x08);
    }

    #[test]
    fn test_empty_mask_yields_no_modifiers() {
        let mask = ModifierMask(0);
        assert!(mask.is_empty());
        assert_eq!(mask.iter().count(), 0);
    }

    #[test]
    fn test_control_shift_mask_yields_control_then_shift() {
        // Arrange
        let mask = ModifierMask(0x03);

        // Act
        let mods: Vec<Modifier> = mask.iter().collect();

        // Assert
        assert_eq!(mods, vec![Modifier::Control, Modifier::Shift]);
    }

    #[test]
    fn test_order_is_fixed_regardless_of_bit_pattern() {
        // meta + control: control must still come first
        let mods: Vec<Modifier> = ModifierMask(0x09).iter().collect();
        assert_eq!(mods, vec![Modifier::Control, Modifier::Meta]);
    }

    #[test]
    fn test_high_bits_are_ignored() {
        let mask = ModifierMask(0xF0);
        assert!(mask.is_empty());

        let mods: Vec<Modifier> = ModifierMask(0xF4).iter().collect();
        assert_eq!(mods, vec![Modifier::Alt]);
    }

    #[test]
    fn test_wire_mask_keeps_only_defined_bits() {
        assert_eq!(ModifierMask::from(0x1_0000_0003_i64), ModifierMask(0x03));
        // -1 sets every bit, so all four modifiers are held.
        assert_eq!(ModifierMask::from(-1_i64).iter().count(), 4);
    }

    #[test]
    fn test_key_names() {
        let names: Vec<&str> = Modifier::ALL.iter().map(|m| m.key_name()).collect();
        assert_eq!(names, vec!["control", "shift", "alt", "meta"]);
    }
}
