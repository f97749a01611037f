//! Inbound frame dispatch and key injection.
//!
//! [`classify_frame`] decides what a text frame from the controller means.
//! [`InjectionQueue`] hands translated combinations to a [`KeyInjector`] on a
//! dedicated worker, so a slow OS call never stalls the link's event loop.
//!
//! The injector is a trait object supplied at construction time; OS-specific
//! implementations live in the infrastructure layer.

use std::sync::Arc;

use padlink_core::{decode_inbound, translate_event, ButtonEvent, DecodeError, InboundMessage};
use padlink_core::{KeyCombination, TranslateError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use super::notify::Notifier;

/// Error type for key injection.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("injection backend error: {0}")]
    Backend(String),
    #[error("key {0:?} is not supported by this backend")]
    UnsupportedKey(String),
}

/// Presses a key combination on the host.
///
/// Implementations may block; they are always called from the blocking pool,
/// one combination at a time.
#[cfg_attr(test, mockall::automock)]
pub trait KeyInjector: Send + Sync {
    /// Presses and releases every key in `combo`, modifiers first.
    fn press(&self, combo: &KeyCombination) -> Result<(), InjectionError>;
}

/// What the link should do with one inbound text frame.
#[derive(Debug)]
pub enum FrameAction {
    /// A button was pressed.  `combo` is the translated combination, or the
    /// reason translation failed.
    Press {
        event: ButtonEvent,
        combo: Result<KeyCombination, TranslateError>,
    },
    /// A well-formed message of a type this host does not handle.
    Ignore { type_name: &'static str },
    /// The frame could not be decoded.
    Malformed(DecodeError),
}

/// Decodes and translates one text frame.  Never fails; every outcome is a
/// [`FrameAction`].
pub fn classify_frame(text: &str) -> FrameAction {
    match decode_inbound(text) {
        Ok(InboundMessage::ButtonPress(event)) => FrameAction::Press {
            event,
            combo: translate_event(&event),
        },
        Ok(other) => FrameAction::Ignore {
            type_name: other.type_name(),
        },
        Err(e) => FrameAction::Malformed(e),
    }
}

/// Bounded FIFO of combinations waiting to be injected.
///
/// Cloning shares the same worker.  The worker stops once every clone has
/// been dropped and the queue has drained.
#[derive(Debug, Clone)]
pub struct InjectionQueue {
    tx: mpsc::Sender<KeyCombination>,
}

impl InjectionQueue {
    /// Spawns the injection worker on the current Tokio runtime.
    pub fn spawn(injector: Arc<dyn KeyInjector>, notifier: Notifier, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<KeyCombination>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(combo) = rx.recv().await {
                let injector = Arc::clone(&injector);
                let pressed = combo.clone();
                let result = tokio::task::spawn_blocking(move || injector.press(&pressed)).await;
                match result {
                    Ok(Ok(())) => notifier.info(format!("pressed {combo}")),
                    Ok(Err(e)) => notifier.warn(format!("failed to press {combo}: {e}")),
                    Err(e) => notifier.warn(format!("key injector panicked on {combo}: {e}")),
                }
            }
            debug!("injection worker stopped");
        });

        Self { tx }
    }

    /// Queues `combo` without waiting.  Returns `false` (and drops the
    /// combination) if the queue is full or the worker has stopped.
    pub fn submit(&self, combo: KeyCombination) -> bool {
        self.tx.try_send(combo).is_ok()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
