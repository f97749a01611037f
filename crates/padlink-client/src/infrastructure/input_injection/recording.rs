//! Recording key injector for tests.
//!
//! Replaces the OS call with in-memory recording.  Every pressed combination
//! is pushed into a `Mutex<Vec<...>>` so assertions can inspect exactly what
//! was pressed and in what order.  Async tests wait for presses with
//! [`RecordingInjector::wait_for_presses`], since injection runs on a worker.
//!
//! Set `should_fail = true` to simulate a backend that rejects every press.

use std::sync::{Mutex, PoisonError};

use padlink_core::KeyCombination;
use tokio::sync::Notify;

use crate::application::dispatch::{InjectionError, KeyInjector};

#[derive(Debug, Default)]
pub struct RecordingInjector {
    presses: Mutex<Vec<KeyCombination>>,
    pressed: Notify,
    /// When `true`, `press` records nothing and returns an error.
    pub should_fail: bool,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector whose every press fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Key names of every recorded press, oldest first.
    pub fn pressed_keys(&self) -> Vec<Vec<&'static str>> {
        self.presses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|combo| combo.keys().to_vec())
            .collect()
    }

    /// Waits until at least `count` presses have been recorded, then returns
    /// their key names.
    pub async fn wait_for_presses(&self, count: usize) -> Vec<Vec<&'static str>> {
        loop {
            let notified = self.pressed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let keys = self.pressed_keys();
            if keys.len() >= count {
                return keys;
            }
            notified.await;
        }
    }
}

impl KeyInjector for RecordingInjector {
    fn press(&self, combo: &KeyCombination) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Backend("simulated failure".to_string()));
        }
        self.presses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(combo.clone());
        self.pressed.notify_waiters();
        Ok(())
    }
}
