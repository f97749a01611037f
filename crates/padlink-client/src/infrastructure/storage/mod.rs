//! Settings storage.
//!
//! [`SettingsStore`] holds the live [`AppConfig`] behind a lock, serves the
//! controller endpoint to the link, and writes changes back to disk.

pub mod config;

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::infrastructure::link::{Endpoint, EndpointProvider};
use config::{save_config_to, AppConfig, ConfigError};

/// Live settings shared between the link, the UI bridge and `main`.
#[derive(Debug)]
pub struct SettingsStore {
    config: RwLock<AppConfig>,
    /// Where changes are persisted.  `None` keeps changes in memory only.
    path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn new(config: AppConfig, path: Option<PathBuf>) -> Self {
        Self {
            config: RwLock::new(config),
            path,
        }
    }

    /// A store that never touches the file system.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, None)
    }

    /// A copy of the current settings.
    pub fn snapshot(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn controller_host(&self) -> String {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .controller
            .host
            .clone()
    }

    /// Changes the controller host and persists it.  The link picks the new
    /// address up on its next connection attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the settings file cannot be written.  The
    /// in-memory value is updated either way.
    pub fn set_controller_host(&self, host: &str) -> Result<(), ConfigError> {
        let host = host.trim().to_string();
        self.update(|cfg| cfg.controller.host = host.clone())?;
        debug!(%host, "controller host updated");
        Ok(())
    }

    pub fn autostart(&self) -> bool {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .app
            .autostart
    }

    /// Records the autostart preference.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the settings file cannot be written.
    pub fn set_autostart(&self, enabled: bool) -> Result<(), ConfigError> {
        self.update(|cfg| cfg.app.autostart = enabled)?;
        debug!(enabled, "autostart preference updated");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut AppConfig)) -> Result<(), ConfigError> {
        let snapshot = {
            let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
            apply(&mut guard);
            guard.clone()
        };
        match &self.path {
            Some(path) => save_config_to(path, &snapshot),
            None => Ok(()),
        }
    }
}

impl EndpointProvider for SettingsStore {
    fn endpoint(&self) -> Endpoint {
        let guard = self.config.read().unwrap_or_else(PoisonError::into_inner);
        Endpoint {
            host: guard.controller.host.clone(),
            port: guard.controller.port,
        }
    }
}
