//! Controller wire protocol: JSON text frames over WebSocket.

pub mod codec;
pub mod messages;

pub use codec::{decode_inbound, DecodeError};
pub use messages::{ButtonEvent, InboundMessage};
