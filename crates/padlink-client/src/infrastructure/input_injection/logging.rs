//! Dry-run key injector.

use padlink_core::KeyCombination;
use tracing::info;

use crate::application::dispatch::{InjectionError, KeyInjector};

/// Logs every combination at `info` level and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInjector;

impl LoggingInjector {
    pub fn new() -> Self {
        Self
    }
}

impl KeyInjector for LoggingInjector {
    fn press(&self, combo: &KeyCombination) -> Result<(), InjectionError> {
        info!(keys = ?combo.keys(), "key press (dry run): {combo}");
        Ok(())
    }
}
