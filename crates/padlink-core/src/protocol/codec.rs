//! Text-frame decoding for the controller protocol.
//!
//! Decoding never panics.  A frame that is not valid JSON, lacks the `type`
//! field, or carries a `button_press` without an integer `key` returns a
//! [`DecodeError`]; the link logs it and keeps the connection open.  Integer
//! keys outside the table's range decode fine and are rejected later by the
//! translator.

use thiserror::Error;

use super::messages::InboundMessage;

/// Errors that can occur while decoding an inbound frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame was empty or whitespace only.
    #[error("empty frame")]
    Empty,
    /// The frame is not a well-formed message.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decodes one text frame into an [`InboundMessage`].
///
/// # Errors
///
/// Returns [`DecodeError::Empty`] for blank frames and
/// [`DecodeError::Malformed`] for anything serde rejects.
pub fn decode_inbound(text: &str) -> Result<InboundMessage, DecodeError> {
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_str(text)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
