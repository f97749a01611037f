//! JSON message types spoken by the controller.
//!
//! Every frame is a JSON object with a `"type"` field naming the variant;
//! the remaining fields sit in the same object:
//!
//! ```json
//! {"type":"button_press","key":4,"modifier":3}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles the discriminant.  Any
//! other `type` value deserializes to [`InboundMessage::Unrecognized`] so that
//! newer firmware can add message kinds without breaking older hosts.

use serde::{Deserialize, Serialize};

/// A button on the controller was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    /// USB HID Usage ID of the key assigned to the button.
    ///
    /// Kept as the wire's signed integer so that a value outside the table's
    /// range still decodes and is reported as an unknown scan code.
    pub key: i64,
    /// Modifier bitmask (bit0 control, bit1 shift, bit2 alt, bit3 meta).
    ///
    /// Older firmware omits the field for plain keys, so it defaults to 0.
    #[serde(default)]
    pub modifier: i64,
}

/// All messages the controller can send to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A button event to be turned into a key press.
    ButtonPress(ButtonEvent),
    /// Any `type` this host does not understand; ignored.
    #[serde(other)]
    Unrecognized,
}

impl InboundMessage {
    /// Short type name for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            InboundMessage::ButtonPress(_) => "button_press",
            InboundMessage::Unrecognized => "unrecognized",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
